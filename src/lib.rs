// src/lib.rs
//! # Monkey Patcher
//!
//! Attach a named group of externally defined functions to an existing
//! prototype, so every instance exposes them under one namespace property
//! without touching the type's own definition.
//!
//! ## Example
//!
//! ```rust
//! use monkey_patcher::{Instance, Patcher, Prototype, SourceObject, Value};
//!
//! let sample = Prototype::new("Sample")
//!     .with_method("existingMethod", |_, _| Value::from("Original Method"));
//!
//! let mut patcher = Patcher::new(&sample, "ext");
//! patcher
//!     .patch(&SourceObject::new().with_method("shout", |this, _| {
//!         Value::from(this.get_field("name").as_string().to_uppercase())
//!     }))
//!     .unwrap();
//!
//! let instance = Instance::new(&sample);
//! instance.set_field("name", Value::from("al"));
//!
//! let ext = instance.namespace("ext").unwrap();
//! assert_eq!(ext.call("shout", &[]).unwrap(), Value::from("AL"));
//! ```

pub mod config;
pub mod log;
pub mod patcher;
pub mod registry;
pub mod runtime;
pub mod source;

use thiserror::Error;

pub use config::{ConflictScope, PatcherConfig};
pub use log::{LogSink, MemorySink, StdoutSink};
pub use patcher::{MethodMap, NamespaceProxy, Patcher};
pub use registry::prototype_of;
pub use runtime::{BoundMethod, Instance, Member, Method, PropertyKey, Prototype, SymbolId, Value};
pub use source::{SourceObject, SourceProperty};

/// Errors raised while patching or dispatching through a namespace
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("No methods found in the provided class to patch under namespace [{0}].")]
    NoMethods(String),

    #[error("Namespace [{0}] already exists on the target prototype.")]
    NamespaceConflict(String),

    #[error("Symbol properties are not supported in namespace [{0}].")]
    SymbolNotSupported(String),

    #[error("Method [{method}] not found in namespace [{namespace}].")]
    MethodNotFound { method: String, namespace: String },
}

impl PatchError {
    /// Namespace the failing operation targeted
    pub fn namespace(&self) -> &str {
        match self {
            PatchError::NoMethods(ns)
            | PatchError::NamespaceConflict(ns)
            | PatchError::SymbolNotSupported(ns)
            | PatchError::MethodNotFound { namespace: ns, .. } => ns,
        }
    }
}

/// Errors while loading a [`PatcherConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PatchError::SymbolNotSupported("krauters".into()).to_string(),
            "Symbol properties are not supported in namespace [krauters]."
        );
        assert_eq!(
            PatchError::MethodNotFound {
                method: "nonExistentMethod".into(),
                namespace: "krauters".into(),
            }
            .to_string(),
            "Method [nonExistentMethod] not found in namespace [krauters]."
        );
    }

    #[test]
    fn test_error_namespace_accessor() {
        assert_eq!(PatchError::NoMethods("a".into()).namespace(), "a");
        assert_eq!(
            PatchError::MethodNotFound {
                method: "m".into(),
                namespace: "b".into(),
            }
            .namespace(),
            "b"
        );
    }
}
