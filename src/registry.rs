// src/registry.rs
//! Process-wide prototype table keyed by Rust type
//!
//! Rust types cannot grow members at runtime, so each type gets a side
//! [`Prototype`] here instead. Entries are created on first use and live
//! until the process exits.

use crate::runtime::object::Prototype;
use ahash::HashMap;
use std::any::{type_name, TypeId};
use std::sync::{Mutex, OnceLock, PoisonError};

static PROTOTYPES: OnceLock<Mutex<HashMap<TypeId, Prototype>>> = OnceLock::new();

/// Shared prototype for `T`, named after the type's last path segment
pub fn prototype_of<T: 'static>() -> Prototype {
    let table = PROTOTYPES.get_or_init(|| Mutex::new(HashMap::default()));
    let mut table = table.lock().unwrap_or_else(PoisonError::into_inner);

    table
        .entry(TypeId::of::<T>())
        .or_insert_with(|| Prototype::new(short_type_name::<T>()))
        .clone()
}

fn short_type_name<T>() -> &'static str {
    let full = type_name::<T>();
    // Generic arguments may contain `::` themselves, so cut them first
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
