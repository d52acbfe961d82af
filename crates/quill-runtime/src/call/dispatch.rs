//! Unprotected call entry points

use crate::context::Context;
use crate::error::{EngineError, EngineResult};
use crate::stack::Idx;
use crate::vm::CallFlags;
use tracing::trace;

impl Context {
    /// `[... func arg1 ... argN] -> [... result]`
    ///
    /// Calls with an undefined receiver.
    pub fn call(&mut self, nargs: Idx) -> EngineResult<()> {
        let idx_func = self.call_get_idx_func(nargs, 1)?;
        self.require_stack(1)?;
        self.insert_undefined(idx_func + 1)?;
        self.handle_call_unprotected(idx_func, CallFlags::NONE)
    }

    /// `[... func this arg1 ... argN] -> [... result]`
    pub fn call_method(&mut self, nargs: Idx) -> EngineResult<()> {
        let idx_func = self.call_get_idx_func(nargs, 2)?;
        self.handle_call_unprotected(idx_func, CallFlags::NONE)
    }

    /// `[... key arg1 ... argN] -> [... result]`
    ///
    /// Looks `key` up on the object at `obj_idx` and calls the result with
    /// that object as the receiver.
    pub fn call_prop(&mut self, obj_idx: Idx, nargs: Idx) -> EngineResult<()> {
        let obj_idx = self.require_normalize_index(obj_idx)?;
        if nargs < 0 {
            return Err(EngineError::InvalidArgs);
        }
        self.call_prop_prep_stack(obj_idx, nargs)?;
        self.call_method(nargs)
    }

    /// Rewrite `[... key args*n]` into `[... func this args*n]`.
    ///
    /// `obj_idx` must already be normalized.
    pub(crate) fn call_prop_prep_stack(&mut self, obj_idx: Idx, nargs: Idx) -> EngineResult<()> {
        self.require_stack(1)?;

        self.dup(-nargs - 1)?;
        self.get_prop(obj_idx)?;
        // [... key args*n func]
        self.replace(-nargs - 2)?;
        // [... func args*n]
        self.dup(obj_idx)?;
        self.insert(-nargs - 1)?;
        // [... func this args*n]
        trace!(obj_idx, nargs, "prepared property call");
        Ok(())
    }

    /// `[... ctor arg1 ... argN] -> [... instance]`
    ///
    /// A fresh object is passed as the receiver. It is the result unless the
    /// constructor returns an object of its own.
    pub fn construct(&mut self, nargs: Idx) -> EngineResult<()> {
        let idx_func = self.call_get_idx_func(nargs, 1)?;
        self.require_stack(1)?;
        self.push_object()?;
        self.insert(idx_func + 1)?;
        self.handle_call_unprotected(idx_func, CallFlags::CONSTRUCT)
    }
}
