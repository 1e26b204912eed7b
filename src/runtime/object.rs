// src/runtime/object.rs
//! Prototypes, instances and property descriptors
//!
//! A [`Prototype`] is the shared behaviour definition of a family of values.
//! Every [`Instance`] points at one prototype and resolves member reads
//! against its own fields first, then along the prototype chain. Both types
//! are cheap handles: cloning shares identity, it never copies the object.

use crate::patcher::NamespaceProxy;
use crate::runtime::method::{BoundMethod, Method};
use crate::Value;
use ahash::HashMap;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Identifier of a symbol key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

/// A property key: either a string or a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    String(String),
    Symbol(SymbolId),
}

impl PropertyKey {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyKey::String(s) => Some(s),
            PropertyKey::Symbol(_) => None,
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::String(s) => write!(f, "{s}"),
            PropertyKey::Symbol(id) => write!(f, "Symbol({})", id.0),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        PropertyKey::String(s.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        PropertyKey::String(s)
    }
}

impl From<SymbolId> for PropertyKey {
    fn from(id: SymbolId) -> Self {
        PropertyKey::Symbol(id)
    }
}

/// What a data property holds
#[derive(Debug, Clone)]
pub enum Slot {
    Value(Value),
    Method(Method),
}

/// Computed property body, evaluated against the instance being read.
#[derive(Clone)]
pub struct Getter(Arc<dyn Fn(&Instance) -> Member + Send + Sync>);

impl Getter {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Instance) -> Member + Send + Sync + 'static,
    {
        Getter(Arc::new(func))
    }

    #[inline]
    pub fn get(&self, this: &Instance) -> Member {
        (self.0)(this)
    }
}

impl fmt::Debug for Getter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Getter")
    }
}

/// Property descriptor
#[derive(Debug, Clone)]
pub enum PropertyDescriptor {
    Data {
        slot: Slot,
        enumerable: bool,
        configurable: bool,
    },
    Accessor {
        getter: Getter,
        enumerable: bool,
        configurable: bool,
    },
}

impl PropertyDescriptor {
    /// Enumerable, configurable data property
    pub fn value(value: Value) -> Self {
        PropertyDescriptor::Data {
            slot: Slot::Value(value),
            enumerable: true,
            configurable: true,
        }
    }

    /// Class-style method: configurable but hidden from enumeration
    pub fn method(method: Method) -> Self {
        PropertyDescriptor::Data {
            slot: Slot::Method(method),
            enumerable: false,
            configurable: true,
        }
    }

    pub fn is_enumerable(&self) -> bool {
        match self {
            PropertyDescriptor::Data { enumerable, .. }
            | PropertyDescriptor::Accessor { enumerable, .. } => *enumerable,
        }
    }

    pub fn is_configurable(&self) -> bool {
        match self {
            PropertyDescriptor::Data { configurable, .. }
            | PropertyDescriptor::Accessor { configurable, .. } => *configurable,
        }
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self, PropertyDescriptor::Accessor { .. })
    }
}

/// Result of reading a member through an instance
#[derive(Debug, Clone)]
pub enum Member {
    Value(Value),
    Method(BoundMethod),
    Namespace(NamespaceProxy),
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

struct PrototypeData {
    type_name: String,
    parent: Option<Prototype>,
    properties: Vec<(PropertyKey, PropertyDescriptor)>,
}

/// Shared behaviour definition for a family of values.
#[derive(Clone)]
pub struct Prototype {
    inner: Arc<RwLock<PrototypeData>>,
}

impl Prototype {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(PrototypeData {
                type_name: type_name.into(),
                parent: None,
                properties: Vec::new(),
            })),
        }
    }

    /// Builder form of [`Prototype::set_parent`]; a cyclic parent is left unset.
    pub fn with_parent(self, parent: &Prototype) -> Self {
        self.set_parent(parent);
        self
    }

    /// Link `parent` as the next prototype in the chain.
    ///
    /// Returns `false` without changing anything when `self` is already
    /// reachable from `parent`, since the chain would loop.
    pub fn set_parent(&self, parent: &Prototype) -> bool {
        let mut current = Some(parent.clone());
        while let Some(proto) = current {
            if proto.ptr_eq(self) {
                tracing::warn!(
                    target_type = %self.type_name(),
                    parent_type = %parent.type_name(),
                    "refusing cyclic prototype chain"
                );
                return false;
            }
            current = proto.parent();
        }

        write(&self.inner).parent = Some(parent.clone());
        true
    }

    pub fn with_method<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.define_property(
            PropertyKey::String(name.into()),
            PropertyDescriptor::method(Method::new(func)),
        );
        self
    }

    pub fn with_value(self, name: impl Into<String>, value: Value) -> Self {
        self.define_property(
            PropertyKey::String(name.into()),
            PropertyDescriptor::value(value),
        );
        self
    }

    /// Name of the type this prototype was created for
    pub fn type_name(&self) -> String {
        read(&self.inner).type_name.clone()
    }

    pub fn parent(&self) -> Option<Prototype> {
        read(&self.inner).parent.clone()
    }

    pub fn get_own_property(&self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        read(&self.inner)
            .properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, desc)| desc.clone())
    }

    pub fn has_own_property(&self, key: &PropertyKey) -> bool {
        read(&self.inner).properties.iter().any(|(k, _)| k == key)
    }

    /// Resolve a property along the prototype chain
    pub fn lookup(&self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        let mut current = Some(self.clone());
        while let Some(proto) = current {
            if let Some(desc) = proto.get_own_property(key) {
                return Some(desc);
            }
            current = proto.parent();
        }
        None
    }

    /// Own or inherited
    pub fn has_property(&self, key: &PropertyKey) -> bool {
        self.lookup(key).is_some()
    }

    /// All own keys in definition order, enumerable or not
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        read(&self.inner)
            .properties
            .iter()
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Own enumerable string keys in definition order
    pub fn keys(&self) -> Vec<String> {
        read(&self.inner)
            .properties
            .iter()
            .filter(|(_, desc)| desc.is_enumerable())
            .filter_map(|(k, _)| k.as_str().map(str::to_string))
            .collect()
    }

    /// Define or replace an own property.
    ///
    /// Returns `false` and leaves the prototype untouched when an existing
    /// own property with that key is not configurable.
    pub fn define_property(&self, key: PropertyKey, descriptor: PropertyDescriptor) -> bool {
        let mut data = write(&self.inner);
        match data.properties.iter().position(|(k, _)| *k == key) {
            Some(idx) if !data.properties[idx].1.is_configurable() => false,
            Some(idx) => {
                data.properties[idx].1 = descriptor;
                true
            }
            None => {
                data.properties.push((key, descriptor));
                true
            }
        }
    }

    /// Remove an own property. Missing keys count as removed; a
    /// non-configurable property is kept and `false` is returned.
    pub fn delete_property(&self, key: &PropertyKey) -> bool {
        let mut data = write(&self.inner);
        match data.properties.iter().position(|(k, _)| k == key) {
            Some(idx) if !data.properties[idx].1.is_configurable() => false,
            Some(idx) => {
                data.properties.remove(idx);
                true
            }
            None => true,
        }
    }

    pub fn ptr_eq(&self, other: &Prototype) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = read(&self.inner);
        f.debug_struct("Prototype")
            .field("type_name", &data.type_name)
            .field("properties", &data.properties.len())
            .finish()
    }
}

struct InstanceData {
    prototype: Prototype,
    fields: RwLock<HashMap<String, Value>>,
    host: Option<Box<dyn Any + Send + Sync>>,
}

/// One value of a prototype's family.
#[derive(Clone)]
pub struct Instance {
    inner: Arc<InstanceData>,
}

impl Instance {
    pub fn new(prototype: &Prototype) -> Self {
        Self::build(prototype.clone(), None)
    }

    /// Wrap a Rust value, using the registered prototype for its type
    pub fn wrap<T: Any + Send + Sync>(value: T) -> Self {
        Self::build(crate::registry::prototype_of::<T>(), Some(Box::new(value)))
    }

    fn build(prototype: Prototype, host: Option<Box<dyn Any + Send + Sync>>) -> Self {
        Self {
            inner: Arc::new(InstanceData {
                prototype,
                fields: RwLock::new(HashMap::default()),
                host,
            }),
        }
    }

    pub fn prototype(&self) -> &Prototype {
        &self.inner.prototype
    }

    /// The wrapped Rust value, if this instance was created with [`Instance::wrap`]
    pub fn host<T: Any>(&self) -> Option<&T> {
        self.inner.host.as_deref()?.downcast_ref::<T>()
    }

    pub fn get_field(&self, name: &str) -> Value {
        read(&self.inner.fields)
            .get(name)
            .cloned()
            .unwrap_or(Value::Null)
    }

    pub fn set_field(&self, name: impl Into<String>, value: Value) {
        write(&self.inner.fields).insert(name.into(), value);
    }

    /// Read a member: own fields shadow the prototype chain.
    pub fn get(&self, key: impl Into<PropertyKey>) -> Option<Member> {
        let key = key.into();

        if let PropertyKey::String(name) = &key {
            if let Some(value) = read(&self.inner.fields).get(name) {
                return Some(Member::Value(value.clone()));
            }
        }

        // Descriptor is cloned out so no lock is held while user code runs
        let member = match self.inner.prototype.lookup(&key)? {
            PropertyDescriptor::Data { slot: Slot::Value(value), .. } => Member::Value(value),
            PropertyDescriptor::Data { slot: Slot::Method(method), .. } => {
                Member::Method(BoundMethod::new(self.clone(), method))
            }
            PropertyDescriptor::Accessor { getter, .. } => getter.get(self),
        };
        Some(member)
    }

    /// Call a method reachable through this instance
    pub fn call(&self, name: &str, args: &[Value]) -> Option<Value> {
        match self.get(name)? {
            Member::Method(bound) => Some(bound.call(args)),
            _ => None,
        }
    }

    /// Read a namespace property installed by a patcher
    pub fn namespace(&self, name: &str) -> Option<NamespaceProxy> {
        match self.get(name)? {
            Member::Namespace(proxy) => Some(proxy),
            _ => None,
        }
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("prototype", &self.inner.prototype)
            .field("fields", &*read(&self.inner.fields))
            .finish()
    }
}
