//! Activation records for running callables

use crate::function::LightFunc;
use crate::value::{ObjectRef, Value};
use std::ops::BitOr;
use std::sync::Arc;

/// Function an activation is running.
///
/// Bound functions are resolved before an activation is created, so they never
/// appear here.
#[derive(Debug, Clone)]
pub enum Callee {
    Object(ObjectRef),
    Light(LightFunc),
}

impl Callee {
    pub fn to_value(&self) -> Value {
        match self {
            Callee::Object(obj) => Value::Object(obj.clone()),
            Callee::Light(lf) => Value::LightFunc(*lf),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivationFlags(u8);

impl ActivationFlags {
    pub const NONE: Self = ActivationFlags(0);
    /// Invoked as a constructor
    pub const CONSTRUCT: Self = ActivationFlags(1 << 0);
    /// Running strict-mode code
    pub const STRICT: Self = ActivationFlags(1 << 1);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ActivationFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        ActivationFlags(self.0 | rhs.0)
    }
}

/// Activation record
///
/// One is pushed for every call that reaches a callable and popped when the
/// call returns or fails.
///
/// ## Stack Layout Example
///
/// ```text
/// caller frame calling "add" with two arguments:
///
/// [x][y] | [add][this][arg1][arg2]
///  ^        ^           ^
///  caller   idx_func    callee bottom
/// ```
///
/// The callee sees `arg1` as index 0. On return the whole region starting at
/// `idx_func` is replaced by the single result.
#[derive(Debug, Clone)]
pub struct Activation {
    /// Function name (for tracing and error messages)
    pub function_name: Arc<str>,
    pub func: Callee,
    pub flags: ActivationFlags,
    /// Absolute index of the function slot
    pub idx_func: usize,
    /// Caller's frame bottom, restored on return
    pub saved_bottom: usize,
}

impl Activation {
    pub fn is_constructor_call(&self) -> bool {
        self.flags.contains(ActivationFlags::CONSTRUCT)
    }

    pub fn is_strict(&self) -> bool {
        self.flags.contains(ActivationFlags::STRICT)
    }
}
