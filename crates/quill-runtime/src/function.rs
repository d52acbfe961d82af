//! Callable kinds
//!
//! Four kinds of value can be called:
//!
//! - [`ScriptFunction`]: interpreted code. The interpreter is reached through the
//!   [`ScriptBody`] seam; this crate only needs its strictness and constructability.
//! - [`NativeFunction`]: a host closure with an optional fixed argument count and a
//!   16-bit magic value.
//! - [`LightFunc`]: a plain function pointer plus a packed 16-bit flag word. It has
//!   no heap identity and carries an 8-bit magic value.
//! - [`BoundFunction`]: a target with a pre-set `this` and leading arguments.
//!
//! All native code sees its arguments on the operand stack of the [`Context`] it
//! receives, starting at index 0. The receiver is not visible on the stack.

use crate::context::Context;
use crate::error::{EngineError, EngineResult};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Host closure callable from the engine
pub type NativeFn = Arc<dyn Fn(&mut Context) -> EngineResult<Value> + Send + Sync>;

/// Function pointer behind a light function
pub type LightFn = fn(&mut Context) -> EngineResult<Value>;

#[derive(Clone)]
pub struct NativeFunction {
    name: Arc<str>,
    func: NativeFn,
    nargs: Option<usize>,
    magic: i16,
    constructable: bool,
}

impl NativeFunction {
    /// `nargs` of `None` means variadic: arguments are passed through as given.
    pub fn new(name: impl Into<Arc<str>>, func: NativeFn, nargs: Option<usize>) -> Self {
        Self {
            name: name.into(),
            func,
            nargs,
            magic: 0,
            constructable: true,
        }
    }

    pub fn with_magic(mut self, magic: i16) -> Self {
        self.magic = magic;
        self
    }

    pub fn with_constructable(mut self, constructable: bool) -> Self {
        self.constructable = constructable;
        self
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn func(&self) -> NativeFn {
        Arc::clone(&self.func)
    }

    pub fn nargs(&self) -> Option<usize> {
        self.nargs
    }

    pub fn magic(&self) -> i16 {
        self.magic
    }

    pub fn set_magic(&mut self, magic: i16) {
        self.magic = magic;
    }

    pub fn is_constructable(&self) -> bool {
        self.constructable
    }
}

/// Entry point into the interpreter for a script function.
pub trait ScriptBody: Send + Sync {
    fn execute(&self, ctx: &mut Context) -> EngineResult<Value>;
}

struct ClosureBody<F>(F);

impl<F> ScriptBody for ClosureBody<F>
where
    F: Fn(&mut Context) -> EngineResult<Value> + Send + Sync,
{
    fn execute(&self, ctx: &mut Context) -> EngineResult<Value> {
        (self.0)(ctx)
    }
}

#[derive(Clone)]
pub struct ScriptFunction {
    name: Arc<str>,
    strict: bool,
    constructable: bool,
    body: Arc<dyn ScriptBody>,
}

impl ScriptFunction {
    /// Non-strict, constructable script function backed by a closure
    pub fn new<F>(name: impl Into<Arc<str>>, body: F) -> Self
    where
        F: Fn(&mut Context) -> EngineResult<Value> + Send + Sync + 'static,
    {
        Self::from_body(name, Arc::new(ClosureBody(body)))
    }

    pub fn from_body(name: impl Into<Arc<str>>, body: Arc<dyn ScriptBody>) -> Self {
        Self {
            name: name.into(),
            strict: false,
            constructable: true,
            body,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn constructable(mut self, constructable: bool) -> Self {
        self.constructable = constructable;
        self
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn is_constructable(&self) -> bool {
        self.constructable
    }

    pub fn body(&self) -> Arc<dyn ScriptBody> {
        Arc::clone(&self.body)
    }
}

/// Light function flag word layout:
///
/// ```text
/// bits 0-3   nargs (15 = variadic)
/// bits 4-7   length
/// bits 8-15  magic (signed 8-bit)
/// ```
pub const LIGHTFUNC_NARGS_VARARGS: u16 = 0x0f;
pub const LIGHTFUNC_NARGS_MAX: u8 = 0x0e;
pub const LIGHTFUNC_LENGTH_MAX: u8 = 0x0f;

#[derive(Clone, Copy)]
pub struct LightFunc {
    func: LightFn,
    flags: u16,
}

impl LightFunc {
    pub fn new(func: LightFn, nargs: Option<u8>, length: u8, magic: i8) -> EngineResult<Self> {
        let nargs_bits = match nargs {
            Some(n) if n > LIGHTFUNC_NARGS_MAX => return Err(EngineError::InvalidArgs),
            Some(n) => n as u16,
            None => LIGHTFUNC_NARGS_VARARGS,
        };
        if length > LIGHTFUNC_LENGTH_MAX {
            return Err(EngineError::InvalidArgs);
        }
        let flags = ((magic as u8 as u16) << 8) | ((length as u16) << 4) | nargs_bits;
        Ok(Self { func, flags })
    }

    pub fn from_flags(func: LightFn, flags: u16) -> Self {
        Self { func, flags }
    }

    pub fn func(&self) -> LightFn {
        self.func
    }

    pub fn flags(&self) -> u16 {
        self.flags
    }

    pub fn nargs(&self) -> Option<usize> {
        match self.flags & 0x0f {
            LIGHTFUNC_NARGS_VARARGS => None,
            n => Some(n as usize),
        }
    }

    pub fn length(&self) -> usize {
        ((self.flags >> 4) & 0x0f) as usize
    }

    /// High byte of the flag word, sign-extended
    pub fn magic(&self) -> i16 {
        ((self.flags >> 8) as u8 as i8) as i16
    }
}

impl PartialEq for LightFunc {
    fn eq(&self, other: &Self) -> bool {
        self.func as usize == other.func as usize && self.flags == other.flags
    }
}

impl fmt::Debug for LightFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LightFunc(flags={:#06x})", self.flags)
    }
}

/// Target of a bound function.
///
/// Only constructed by the binding path, which guarantees the target is callable
/// and never itself a bound function. Bound chains therefore have depth one.
#[derive(Clone, Debug)]
pub struct BoundTarget {
    value: Value,
}

impl BoundTarget {
    pub(crate) fn new(value: Value) -> EngineResult<Self> {
        if !value.is_callable() {
            return Err(EngineError::type_error("not callable"));
        }
        if value.is_bound_function() {
            return Err(EngineError::internal("bound function cannot target a bound function"));
        }
        Ok(Self { value })
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

#[derive(Clone, Debug)]
pub struct BoundFunction {
    target: BoundTarget,
    this: Value,
    args: Vec<Value>,
}

impl BoundFunction {
    pub(crate) fn new(target: BoundTarget, this: Value, args: Vec<Value>) -> Self {
        Self { target, this, args }
    }

    pub fn target(&self) -> &BoundTarget {
        &self.target
    }

    pub fn this_binding(&self) -> &Value {
        &self.this
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }
}
