//! Questions a running function can ask about its own call

use crate::context::Context;
use crate::error::{EngineError, EngineResult};
use crate::value::Value;

impl Context {
    /// `false` when nothing is running
    pub fn is_constructor_call(&self) -> bool {
        self.current_activation()
            .is_some_and(|act| act.is_constructor_call())
    }

    /// `true` when nothing is running: host code outside any call is treated
    /// as strict.
    pub fn is_strict_call(&self) -> bool {
        self.current_activation().map_or(true, |act| act.is_strict())
    }

    /// Fail unless the running function was invoked as a constructor
    pub fn require_constructor_call(&self) -> EngineResult<()> {
        if self.is_constructor_call() {
            Ok(())
        } else {
            Err(EngineError::type_error("constructor requires 'new'"))
        }
    }

    /// Push the running function's receiver; undefined with no activation.
    pub fn push_this(&mut self) -> EngineResult<()> {
        let this = self
            .current_activation()
            .and_then(|act| self.stack.get_abs(act.idx_func + 1).cloned())
            .unwrap_or(Value::Undefined);
        self.push(this)
    }

    /// Push the running function itself; undefined with no activation.
    pub fn push_current_function(&mut self) -> EngineResult<()> {
        let func = self
            .current_activation()
            .map(|act| act.func.to_value())
            .unwrap_or(Value::Undefined);
        self.push(func)
    }
}
