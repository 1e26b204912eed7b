// src/source.rs
//! Extension sources: bags of functions to be grafted onto a prototype

use crate::runtime::method::Method;
use crate::runtime::object::Instance;
use crate::Value;
use std::sync::Arc;

/// Value of a source property
#[derive(Debug, Clone)]
pub enum SourceProperty {
    Function(Method),
    Value(Value),
}

impl SourceProperty {
    pub fn as_function(&self) -> Option<&Method> {
        match self {
            SourceProperty::Function(method) => Some(method),
            SourceProperty::Value(_) => None,
        }
    }
}

/// An object literal or class instance whose functions will be exposed
/// under a namespace.
///
/// Only own properties are ever extracted; anything reachable through
/// `parent` is treated as inherited.
#[derive(Debug, Clone, Default)]
pub struct SourceObject {
    properties: Vec<(String, SourceProperty)>,
    parent: Option<Arc<SourceObject>>,
}

impl SourceObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(mut self, parent: SourceObject) -> Self {
        self.parent = Some(Arc::new(parent));
        self
    }

    pub fn with_method<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.with_property(name, SourceProperty::Function(Method::new(func)))
    }

    pub fn with_value(self, name: impl Into<String>, value: Value) -> Self {
        self.with_property(name, SourceProperty::Value(value))
    }

    /// Assign a property. Re-assigning keeps the original position.
    pub fn with_property(mut self, name: impl Into<String>, property: SourceProperty) -> Self {
        let name = name.into();
        match self.properties.iter().position(|(k, _)| *k == name) {
            Some(idx) => self.properties[idx].1 = property,
            None => self.properties.push((name, property)),
        }
        self
    }

    /// Own properties in assignment order
    pub fn own_properties(&self) -> impl Iterator<Item = (&str, &SourceProperty)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Own property, falling back to the parent chain
    pub fn get(&self, name: &str) -> Option<&SourceProperty> {
        self.properties
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
            .or_else(|| self.parent.as_deref()?.get(name))
    }

    pub fn parent(&self) -> Option<&SourceObject> {
        self.parent.as_deref()
    }
}
