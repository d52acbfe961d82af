//! Native function builder
//!
//! Wraps a Rust closure into a [`NativeFunction`] that can be pushed onto the
//! operand stack and called like any other function. The closure receives the
//! [`Context`] with its arguments at stack indices `0..n`.
//!
//! A fixed arity does not reject calls with the wrong count: the engine pads
//! missing arguments with undefined and drops extras before the closure runs.
//! Variadic functions see exactly what the caller passed.
//!
//! # Examples
//!
//! ```rust,no_run
//! use quill_runtime::api::native::NativeFunctionBuilder;
//! use quill_runtime::{Context, EngineResult, Value};
//!
//! let add = NativeFunctionBuilder::new("add")
//!     .with_arity(2)
//!     .with_implementation(|ctx: &mut Context| -> EngineResult<Value> {
//!         let a = ctx.require_number(0)?;
//!         let b = ctx.require_number(1)?;
//!         Ok(Value::Number(a + b))
//!     })
//!     .build()
//!     .unwrap();
//!
//! let mut ctx = Context::new();
//! ctx.push_native_function(add).unwrap();
//! ctx.push_number(1.0).unwrap();
//! ctx.push_number(2.0).unwrap();
//! ctx.call(2).unwrap();
//! ```

use crate::context::Context;
use crate::error::EngineResult;
use crate::function::{NativeFn, NativeFunction};
use crate::value::Value;
use std::sync::Arc;

/// Builder for native functions
pub struct NativeFunctionBuilder {
    name: String,
    arity: Option<usize>,
    magic: i16,
    constructable: bool,
    implementation: Option<NativeFn>,
}

impl NativeFunctionBuilder {
    /// Create a new builder; the function is variadic until an arity is set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arity: None,
            magic: 0,
            constructable: true,
            implementation: None,
        }
    }

    /// Set the number of arguments the implementation will see
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    /// Pass arguments through unchanged
    pub fn variadic(mut self) -> Self {
        self.arity = None;
        self
    }

    /// Attach a 16-bit magic value, readable with
    /// [`Context::get_current_magic`] while the function runs.
    pub fn with_magic(mut self, magic: i16) -> Self {
        self.magic = magic;
        self
    }

    /// Whether the function may be invoked with `construct`
    pub fn constructable(mut self, constructable: bool) -> Self {
        self.constructable = constructable;
        self
    }

    pub fn with_implementation<F>(mut self, implementation: F) -> Self
    where
        F: Fn(&mut Context) -> EngineResult<Value> + Send + Sync + 'static,
    {
        self.implementation = Some(Arc::new(implementation));
        self
    }

    /// Build the native function
    ///
    /// # Returns
    ///
    /// * `Ok(NativeFunction)` - ready to push with [`Context::push_native_function`]
    /// * `Err(BuildError)` - if no implementation was provided
    pub fn build(self) -> Result<NativeFunction, BuildError> {
        let implementation = self
            .implementation
            .ok_or_else(|| BuildError::MissingImplementation(self.name.clone()))?;

        Ok(NativeFunction::new(self.name, implementation, self.arity)
            .with_magic(self.magic)
            .with_constructable(self.constructable))
    }
}

/// Errors that can occur when building a native function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// No implementation was provided
    MissingImplementation(String),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::MissingImplementation(name) => {
                write!(f, "Native function '{}' missing implementation", name)
            }
        }
    }
}

impl std::error::Error for BuildError {}
