// src/patcher/mod.rs
//! Installs a namespace of extension methods on a prototype

pub mod namespace;

pub use namespace::NamespaceProxy;

use crate::config::{ConflictScope, PatcherConfig};
use crate::log::{LogSink, StdoutSink};
use crate::runtime::method::Method;
use crate::runtime::object::{Getter, Member, PropertyDescriptor, PropertyKey, Prototype};
use crate::source::SourceObject;
use crate::PatchError;
use std::sync::Arc;

/// Ordered table of extracted methods
#[derive(Debug, Clone, Default)]
pub struct MethodMap {
    entries: Vec<(String, Method)>,
}

impl MethodMap {
    pub fn get(&self, name: &str) -> Option<&Method> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, m)| m)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Method)> {
        self.entries.iter().map(|(k, m)| (k.as_str(), m))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Attaches the functions of a [`SourceObject`] to a [`Prototype`] under a
/// single namespace property.
///
/// ```rust
/// use monkey_patcher::{Instance, MemorySink, Patcher, Prototype, SourceObject, Value};
///
/// let proto = Prototype::new("Sample");
/// let sink = MemorySink::new();
/// let mut patcher = Patcher::new(&proto, "ext").with_sink(sink.clone());
///
/// patcher
///     .patch(&SourceObject::new().with_method("greet", |_, args| {
///         Value::from(format!("hi {}", args[0].as_string()))
///     }))
///     .unwrap();
///
/// let sample = Instance::new(&proto);
/// let ext = sample.namespace("ext").unwrap();
/// assert_eq!(ext.call("greet", &[Value::from("Al")]).unwrap(), Value::from("hi Al"));
/// assert_eq!(patcher.method_names(), ["greet"]);
/// ```
pub struct Patcher {
    prototype: Prototype,
    namespace: String,
    target_name: String,
    method_names: Vec<String>,
    config: PatcherConfig,
    sink: Arc<dyn LogSink>,
}

impl Patcher {
    pub fn new(prototype: &Prototype, namespace: impl Into<String>) -> Self {
        Self {
            prototype: prototype.clone(),
            namespace: namespace.into(),
            target_name: prototype.type_name(),
            method_names: Vec::new(),
            config: PatcherConfig::default(),
            sink: Arc::new(StdoutSink),
        }
    }

    pub fn with_config(mut self, config: PatcherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn prototype(&self) -> &Prototype {
        &self.prototype
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Names installed by the last successful patch, empty before that
    pub fn method_names(&self) -> &[String] {
        &self.method_names
    }

    /// Collect the own function-valued properties of `source`, skipping
    /// `constructor`, in the order they were assigned.
    pub fn get_methods(source: &SourceObject) -> MethodMap {
        let entries = source
            .own_properties()
            .filter(|(name, _)| *name != "constructor")
            .filter_map(|(name, prop)| Some((name.to_string(), prop.as_function()?.clone())))
            .collect();

        MethodMap { entries }
    }

    /// Install `source`'s methods under this patcher's namespace.
    ///
    /// Both guards run before the prototype is touched, so a failed call
    /// leaves it exactly as it was.
    pub fn patch(&mut self, source: &SourceObject) -> Result<(), PatchError> {
        let methods = Self::get_methods(source);
        tracing::debug!(
            namespace = %self.namespace,
            count = methods.len(),
            "extracted extension methods"
        );

        if methods.is_empty() {
            tracing::debug!(namespace = %self.namespace, "nothing to patch");
            return Err(PatchError::NoMethods(self.namespace.clone()));
        }

        let key = PropertyKey::String(self.namespace.clone());
        let taken = match self.config.conflict_scope {
            ConflictScope::PrototypeChain => self.prototype.has_property(&key),
            ConflictScope::OwnOnly => self.prototype.has_own_property(&key),
        };
        if taken {
            tracing::debug!(
                namespace = %self.namespace,
                target_type = %self.target_name,
                "namespace already present"
            );
            return Err(PatchError::NamespaceConflict(self.namespace.clone()));
        }

        let method_names = methods.names();
        let namespace: Arc<str> = Arc::from(self.namespace.as_str());
        let methods = Arc::new(methods);
        let getter = Getter::new(move |this| {
            Member::Namespace(NamespaceProxy::new(
                Arc::clone(&namespace),
                Arc::clone(&methods),
                this.clone(),
            ))
        });

        self.install(key, getter)?;

        self.method_names = method_names;
        tracing::info!(
            target_type = %self.target_name,
            namespace = %self.namespace,
            methods = ?self.method_names,
            "prototype patched"
        );
        self.log(&format!(
            "Patched [{}] with methods [{}] under namespace [{}].",
            self.target_name,
            self.method_names.join(", "),
            self.namespace
        ));

        Ok(())
    }

    /// Define the namespace accessor. Fails if a non-configurable property
    /// took the key after the conflict check.
    fn install(&self, key: PropertyKey, getter: Getter) -> Result<(), PatchError> {
        let descriptor = PropertyDescriptor::Accessor {
            getter,
            enumerable: false,
            configurable: true,
        };

        if self.prototype.define_property(key, descriptor) {
            Ok(())
        } else {
            tracing::debug!(namespace = %self.namespace, "namespace held by a non-configurable property");
            Err(PatchError::NamespaceConflict(self.namespace.clone()))
        }
    }

    /// Write `message` to the log sink behind the configured prefix
    pub fn log(&self, message: &str) {
        self.sink
            .write_line(&format!("{}{}", self.config.log_prefix, message));
    }
}

impl std::fmt::Debug for Patcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Patcher")
            .field("target_name", &self.target_name)
            .field("namespace", &self.namespace)
            .field("method_names", &self.method_names)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::MemorySink;
    use crate::runtime::object::Instance;
    use crate::Value;

    fn sample_prototype() -> Prototype {
        Prototype::new("SampleClass")
            .with_method("existingMethod", |_, _| Value::from("Original Method"))
            .with_method("anotherExistingMethod", |_, _| {
                Value::from("Another Original Method")
            })
    }

    fn new_methods() -> SourceObject {
        SourceObject::new()
            .with_method("newMethod", |_, args| {
                Value::from(format!("New Method called with {}", args[0].as_string()))
            })
            .with_method("anotherMethod", |_, _| Value::from("Another New Method"))
    }

    #[test]
    fn test_constructor_state() {
        let proto = sample_prototype();
        let patcher = Patcher::new(&proto, "krauters");

        assert!(patcher.prototype().ptr_eq(&proto));
        assert_eq!(patcher.namespace(), "krauters");
        assert_eq!(patcher.target_name(), "SampleClass");
        assert!(patcher.method_names().is_empty());
    }

    #[test]
    fn test_get_methods_filters() {
        let source = SourceObject::new()
            .with_method("method1", |_, _| Value::Null)
            .with_value("property1", Value::from("value"))
            .with_method("method2", |_, _| Value::Null)
            .with_value("property2", Value::Int(123))
            .with_method("constructor", |_, _| Value::Null);

        let methods = Patcher::get_methods(&source);
        assert_eq!(methods.names(), vec!["method1", "method2"]);
        assert!(!methods.contains("constructor"));
        assert!(!methods.contains("property1"));
    }

    #[test]
    fn test_get_methods_ignores_inherited() {
        let source = SourceObject::new()
            .with_method("own", |_, _| Value::Null)
            .with_parent(SourceObject::new().with_method("inherited", |_, _| Value::Null));

        assert_eq!(Patcher::get_methods(&source).names(), vec!["own"]);
    }

    #[test]
    fn test_patch_logs_and_records_names() {
        let proto = sample_prototype();
        let sink = MemorySink::new();
        let mut patcher = Patcher::new(&proto, "krauters").with_sink(sink.clone());

        patcher.patch(&new_methods()).unwrap();

        assert_eq!(patcher.method_names(), ["newMethod", "anotherMethod"]);
        assert_eq!(
            sink.lines(),
            vec!["[MonkeyPatcher] Patched [SampleClass] with methods [newMethod, anotherMethod] under namespace [krauters]."]
        );
    }

    #[test]
    fn test_installed_property_shape() {
        let proto = sample_prototype();
        let mut patcher = Patcher::new(&proto, "krauters").with_sink(MemorySink::new());
        patcher.patch(&new_methods()).unwrap();

        let desc = proto
            .get_own_property(&PropertyKey::from("krauters"))
            .unwrap();
        assert!(desc.is_accessor());
        assert!(!desc.is_enumerable());
        assert!(desc.is_configurable());
    }

    #[test]
    fn test_empty_source_fails_without_mutation() {
        let proto = sample_prototype();
        let sink = MemorySink::new();
        let mut patcher = Patcher::new(&proto, "krauters").with_sink(sink.clone());
        let before = proto.own_keys();

        let err = patcher.patch(&SourceObject::new()).unwrap_err();
        assert_eq!(err, PatchError::NoMethods("krauters".to_string()));
        assert_eq!(
            err.to_string(),
            "No methods found in the provided class to patch under namespace [krauters]."
        );
        assert_eq!(proto.own_keys(), before);
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_second_patch_conflicts() {
        let proto = sample_prototype();
        let mut patcher = Patcher::new(&proto, "krauters").with_sink(MemorySink::new());
        patcher.patch(&new_methods()).unwrap();

        let other = SourceObject::new().with_method("different", |_, _| Value::Null);
        let err = patcher.patch(&other).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Namespace [krauters] already exists on the target prototype."
        );
        assert_eq!(patcher.method_names(), ["newMethod", "anotherMethod"]);
    }

    #[test]
    fn test_conflict_leaves_prototype_untouched() {
        let proto = sample_prototype();
        let sink = MemorySink::new();
        let mut patcher = Patcher::new(&proto, "krauters").with_sink(sink.clone());
        patcher.patch(&new_methods()).unwrap();
        let keys = proto.own_keys();

        let other = SourceObject::new().with_method("different", |_, _| Value::Null);
        assert!(patcher.patch(&other).is_err());

        assert_eq!(proto.own_keys(), keys);
        assert_eq!(sink.lines().len(), 1);
        let ns = Instance::new(&proto).namespace("krauters").unwrap();
        assert_eq!(ns.call("anotherMethod", &[]), Ok(Value::from("Another New Method")));
        assert_eq!(
            ns.get("different").unwrap_err(),
            PatchError::MethodNotFound {
                method: "different".to_string(),
                namespace: "krauters".to_string(),
            }
        );
    }

    #[test]
    fn test_install_over_non_configurable_fails() {
        let proto = sample_prototype();
        let key = PropertyKey::from("krauters");
        proto.define_property(
            key.clone(),
            PropertyDescriptor::Data {
                slot: crate::runtime::object::Slot::Value(Value::Int(1)),
                enumerable: false,
                configurable: false,
            },
        );

        let patcher = Patcher::new(&proto, "krauters").with_sink(MemorySink::new());
        let getter = Getter::new(|_| Member::Value(Value::Null));
        assert_eq!(
            patcher.install(key.clone(), getter),
            Err(PatchError::NamespaceConflict("krauters".to_string()))
        );
        assert!(!proto.get_own_property(&key).unwrap().is_accessor());
    }

    #[test]
    fn test_existing_member_name_conflicts() {
        let proto = sample_prototype();
        let mut patcher = Patcher::new(&proto, "existingMethod").with_sink(MemorySink::new());
        assert_eq!(
            patcher.patch(&new_methods()),
            Err(PatchError::NamespaceConflict("existingMethod".to_string()))
        );
    }

    #[test]
    fn test_conflict_scope_own_only_allows_shadowing() {
        let base = sample_prototype();
        let derived = Prototype::new("Derived").with_parent(&base);
        let source = new_methods();

        let mut strict = Patcher::new(&derived, "existingMethod").with_sink(MemorySink::new());
        assert!(strict.patch(&source).is_err());

        let config = PatcherConfig {
            conflict_scope: ConflictScope::OwnOnly,
            ..PatcherConfig::default()
        };
        let mut relaxed = Patcher::new(&derived, "existingMethod")
            .with_config(config)
            .with_sink(MemorySink::new());
        relaxed.patch(&source).unwrap();

        let instance = Instance::new(&derived);
        assert!(instance.namespace("existingMethod").is_some());
        assert_eq!(
            Instance::new(&base).call("existingMethod", &[]),
            Some(Value::from("Original Method"))
        );
    }

    #[test]
    fn test_custom_prefix() {
        let sink = MemorySink::new();
        let config = PatcherConfig {
            log_prefix: "patch: ".to_string(),
            ..PatcherConfig::default()
        };
        let patcher = Patcher::new(&Prototype::new("T"), "ns")
            .with_config(config)
            .with_sink(sink.clone());

        patcher.log("hello");
        assert_eq!(sink.lines(), vec!["patch: hello"]);
    }
}
