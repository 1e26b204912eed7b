// src/runtime/mod.rs
//! Object model that patched methods run against

pub mod method;
pub mod object;
pub mod value;

pub use method::{BoundMethod, Method};
pub use object::{Getter, Instance, Member, PropertyDescriptor, PropertyKey, Prototype, Slot, SymbolId};
pub use value::Value;
