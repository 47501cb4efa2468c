use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::number::Number;
use crate::sequence::Sequence;

/// A dynamically typed host value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Nil,
    Boolean(bool),
    Number(Number),
    /// Host strings are byte strings: they may hold NUL and need not be UTF-8.
    String(Vec<u8>),
    Other(Opaque),
}

impl Value {
    /// The host-facing name of the value's kind, as used in argument errors.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Other(o) => o.type_name(),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_opaque(&self) -> Option<&Opaque> {
        match self {
            Value::Other(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&dyn Sequence> {
        self.as_opaque()?.sequence()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::Integer(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Number::Integer(n.into()))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(Number::Float(n))
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into_bytes())
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::String(b.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::String(b)
    }
}

impl From<Opaque> for Value {
    fn from(o: Opaque) -> Self {
        Value::Other(o)
    }
}

/// Render hook: a value that supplies its own replacement for default rendering.
pub trait Renderable: Send + Sync {
    fn render(&self) -> Value;
}

/// An object owned by the host. Capabilities are optional and checked at call time.
pub trait HostObject: Send + Sync {
    fn type_name(&self) -> &str;

    fn as_renderable(&self) -> Option<&dyn Renderable> {
        None
    }

    fn as_sequence(&self) -> Option<&dyn Sequence> {
        None
    }
}

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Identity token of an opaque object. Only ever displayed, never compared by the library.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    pub fn next() -> Self {
        Handle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn from_raw(raw: u64) -> Self {
        Handle(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// A host object together with its identity handle.
///
/// Clones share both the object and the handle, so a value keeps one identity however
/// many times it is passed around.
#[derive(Clone)]
pub struct Opaque {
    handle: Handle,
    object: Arc<dyn HostObject>,
}

impl Opaque {
    pub fn new(object: impl HostObject + 'static) -> Self {
        Self::with_handle(Handle::next(), object)
    }

    /// Wraps an object whose identity was assigned by the host.
    pub fn with_handle(handle: Handle, object: impl HostObject + 'static) -> Self {
        Opaque {
            handle,
            object: Arc::new(object),
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn type_name(&self) -> &str {
        self.object.type_name()
    }

    pub fn renderable(&self) -> Option<&dyn Renderable> {
        self.object.as_renderable()
    }

    pub fn sequence(&self) -> Option<&dyn Sequence> {
        self.object.as_sequence()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.object, &other.object)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opaque")
            .field("type_name", &self.type_name())
            .field("handle", &self.handle)
            .field("renderable", &self.renderable().is_some())
            .field("sequence", &self.sequence().is_some())
            .finish()
    }
}

/// A plain host object: a type label and, optionally, the value its render hook yields.
#[derive(Clone, Debug)]
pub struct Object {
    type_name: Cow<'static, str>,
    rendered: Option<Value>,
}

impl Object {
    pub fn new(type_name: impl Into<Cow<'static, str>>) -> Self {
        Object {
            type_name: type_name.into(),
            rendered: None,
        }
    }

    pub fn with_render(type_name: impl Into<Cow<'static, str>>, rendered: Value) -> Self {
        Object {
            type_name: type_name.into(),
            rendered: Some(rendered),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Other(Opaque::new(self))
    }
}

impl Renderable for Object {
    fn render(&self) -> Value {
        self.rendered.clone().unwrap_or_default()
    }
}

impl HostObject for Object {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn as_renderable(&self) -> Option<&dyn Renderable> {
        self.rendered.as_ref().map(|_| self as &dyn Renderable)
    }
}
