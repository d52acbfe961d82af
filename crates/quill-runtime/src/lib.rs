//! Quill Runtime - call-invocation core of an embeddable scripting engine
//!
//! Hosts and native functions drive the engine through an explicit operand
//! stack owned by a [`Context`]: push a function and its arguments, invoke one
//! of the call entry points, read the result from the stack.
//!
//! ```rust,no_run
//! use quill_runtime::{CallStatus, Context, EngineResult, NativeFunctionBuilder, Value};
//!
//! let mut ctx = Context::new();
//! let fail = NativeFunctionBuilder::new("fail")
//!     .with_implementation(|ctx: &mut Context| -> EngineResult<Value> {
//!         ctx.throw(Value::string("boom"))
//!     })
//!     .build()
//!     .unwrap();
//!
//! ctx.push_native_function(fail).unwrap();
//! let status = ctx.pcall(0).unwrap();
//! assert_eq!(status, CallStatus::Error);
//! assert_eq!(ctx.require(-1).unwrap(), &Value::string("boom"));
//! ```

pub mod api;
pub mod call;
pub mod context;
pub mod error;
pub mod function;
pub mod object;
pub mod property;
pub mod stack;
pub mod value;
pub mod vm;

pub use api::{BuildError, NativeFunctionBuilder};
pub use context::Context;
pub use error::{CallStatus, EngineError, EngineResult, ErrorKind};
pub use function::{
    BoundFunction, BoundTarget, LightFn, LightFunc, NativeFn, NativeFunction, ScriptBody,
    ScriptFunction,
};
pub use object::{HeapObject, ObjectKind};
pub use quill_config::EngineLimits;
pub use stack::{Idx, ValueStack};
pub use value::{ObjectRef, Shared, Value};
pub use vm::{Activation, ActivationFlags, CallFlags, Callee};

/// Quill runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
