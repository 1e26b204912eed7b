// src/runtime/method.rs
//! Callable values with an explicit receiver

use crate::runtime::object::Instance;
use crate::Value;
use std::fmt;
use std::sync::Arc;

type NativeFn = dyn Fn(&Instance, &[Value]) -> Value + Send + Sync;

/// A function that receives the instance it is invoked on as its first
/// argument instead of relying on an implicit `this`.
#[derive(Clone)]
pub struct Method {
    func: Arc<NativeFn>,
}

impl Method {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }

    /// Invoke with an explicit receiver
    #[inline]
    pub fn invoke(&self, this: &Instance, args: &[Value]) -> Value {
        (self.func)(this, args)
    }

    /// True when both handles point at the same function
    pub fn ptr_eq(&self, other: &Method) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Method({:p})", Arc::as_ptr(&self.func))
    }
}

/// A method paired with the receiver captured when it was read.
#[derive(Debug, Clone)]
pub struct BoundMethod {
    receiver: Instance,
    method: Method,
}

impl BoundMethod {
    pub fn new(receiver: Instance, method: Method) -> Self {
        Self { receiver, method }
    }

    pub fn call(&self, args: &[Value]) -> Value {
        self.method.invoke(&self.receiver, args)
    }

    pub fn receiver(&self) -> &Instance {
        &self.receiver
    }

    pub fn method(&self) -> &Method {
        &self.method
    }
}
