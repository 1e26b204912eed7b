// src/patcher/namespace.rs
//! Dynamic-dispatch object returned by a namespace read

use crate::patcher::MethodMap;
use crate::runtime::method::BoundMethod;
use crate::runtime::object::{Instance, PropertyKey};
use crate::{PatchError, Value};
use std::sync::Arc;

/// String-keyed view over a patched method table, bound to the instance
/// the namespace was read through.
///
/// A fresh proxy is built on every namespace read. It has no members of its
/// own: every lookup goes through [`NamespaceProxy::get`].
#[derive(Debug, Clone)]
pub struct NamespaceProxy {
    namespace: Arc<str>,
    methods: Arc<MethodMap>,
    receiver: Instance,
}

impl NamespaceProxy {
    pub(crate) fn new(namespace: Arc<str>, methods: Arc<MethodMap>, receiver: Instance) -> Self {
        Self {
            namespace,
            methods,
            receiver,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Resolve a member to a method bound to the accessing instance
    pub fn get(&self, key: impl Into<PropertyKey>) -> Result<BoundMethod, PatchError> {
        let name = match key.into() {
            PropertyKey::Symbol(_) => {
                return Err(PatchError::SymbolNotSupported(self.namespace.to_string()))
            }
            PropertyKey::String(name) => name,
        };

        match self.methods.get(&name) {
            Some(method) => Ok(BoundMethod::new(self.receiver.clone(), method.clone())),
            None => Err(PatchError::MethodNotFound {
                method: name,
                namespace: self.namespace.to_string(),
            }),
        }
    }

    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, PatchError> {
        Ok(self.get(name)?.call(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::object::{Prototype, SymbolId};
    use crate::source::SourceObject;
    use crate::Patcher;

    fn proxy() -> (NamespaceProxy, Instance) {
        let source = SourceObject::new()
            .with_method("whoami", |this, _| this.get_field("name"));
        let methods = Patcher::get_methods(&source);

        let instance = Instance::new(&Prototype::new("Person"));
        instance.set_field("name", Value::from("Ada"));

        let proxy = NamespaceProxy::new(Arc::from("ext"), Arc::new(methods), instance.clone());
        (proxy, instance)
    }

    #[test]
    fn test_get_binds_receiver() {
        let (proxy, instance) = proxy();
        let bound = proxy.get("whoami").unwrap();
        assert!(bound.receiver().ptr_eq(&instance));
        assert_eq!(bound.call(&[]), Value::from("Ada"));
    }

    #[test]
    fn test_unknown_member() {
        let (proxy, _) = proxy();
        let err = proxy.call("nope", &[]).unwrap_err();
        assert_eq!(
            err,
            PatchError::MethodNotFound {
                method: "nope".to_string(),
                namespace: "ext".to_string(),
            }
        );
    }

    #[test]
    fn test_symbol_rejected() {
        let (proxy, _) = proxy();
        assert_eq!(
            proxy.get(SymbolId(1)).unwrap_err(),
            PatchError::SymbolNotSupported("ext".to_string())
        );
    }
}
