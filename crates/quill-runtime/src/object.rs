//! Heap objects
//!
//! Every heap-allocated value is a [`HeapObject`]: a property table, an optional
//! prototype and an [`ObjectKind`] saying whether (and how) the object can be
//! called.

use crate::error::{EngineError, EngineResult};
use crate::function::{BoundFunction, NativeFunction, ScriptFunction};
use crate::value::{ObjectRef, Shared, Value};
use std::collections::HashMap;
use std::fmt;

/// Prototype chains longer than this are treated as corrupt.
pub const PROTOTYPE_CHAIN_SANITY: usize = 10_000;

/// What a heap object is
#[derive(Clone)]
pub enum ObjectKind {
    Plain,
    Script(ScriptFunction),
    Native(NativeFunction),
    Bound(BoundFunction),
}

pub struct HeapObject {
    kind: ObjectKind,
    properties: HashMap<String, Value>,
    prototype: Option<ObjectRef>,
}

impl HeapObject {
    pub fn plain() -> Self {
        Self::with_kind(ObjectKind::Plain)
    }

    pub fn with_kind(kind: ObjectKind) -> Self {
        Self {
            kind,
            properties: HashMap::new(),
            prototype: None,
        }
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ObjectKind {
        &mut self.kind
    }

    pub fn get_own(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn set_own(&mut self, key: impl Into<String>, value: Value) {
        self.properties.insert(key.into(), value);
    }

    pub fn prototype(&self) -> Option<&ObjectRef> {
        self.prototype.as_ref()
    }

    pub fn set_prototype(&mut self, prototype: Option<ObjectRef>) {
        self.prototype = prototype;
    }

    pub fn is_callable(&self) -> bool {
        !matches!(self.kind, ObjectKind::Plain)
    }

    pub fn is_constructable(&self) -> bool {
        match &self.kind {
            ObjectKind::Plain => false,
            ObjectKind::Script(f) => f.is_constructable(),
            ObjectKind::Native(f) => f.is_constructable(),
            ObjectKind::Bound(b) => b.target().value().is_constructable(),
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self.kind {
            ObjectKind::Plain => "Object",
            _ => "Function",
        }
    }
}

impl fmt::Debug for HeapObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.properties.keys().collect();
        keys.sort();
        f.debug_struct("HeapObject")
            .field("class", &self.class_name())
            .field("keys", &keys)
            .field("has_prototype", &self.prototype.is_some())
            .finish()
    }
}

impl Shared<HeapObject> {
    pub fn new_plain() -> Self {
        Shared::new(HeapObject::plain())
    }

    /// Look up `key` on this object and then along its prototype chain.
    pub fn get_property(&self, key: &str) -> EngineResult<Option<Value>> {
        let mut current = self.clone();
        for _ in 0..PROTOTYPE_CHAIN_SANITY {
            let (found, next) = current.with(|o| (o.get_own(key).cloned(), o.prototype.clone()));
            if found.is_some() {
                return Ok(found);
            }
            match next {
                Some(proto) => current = proto,
                None => return Ok(None),
            }
        }
        Err(EngineError::range_error("prototype chain limit"))
    }

    pub fn set_property(&self, key: impl Into<String>, value: Value) {
        self.with_mut(|o| o.set_own(key, value));
    }
}
