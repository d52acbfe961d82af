//! Protected execution boundary

use crate::context::Context;
use crate::error::{CallStatus, EngineError, EngineResult};
use crate::value::Value;
use tracing::{debug, debug_span};

impl Context {
    /// Run `func` inside an error boundary.
    ///
    /// The top `nargs` values are the callback's input; on return that region
    /// is replaced by exactly `nrets` values. The callback runs in the caller's
    /// frame and reports how many values it left on top of the stack: these are
    /// the results, padded with undefined or truncated to `nrets`. If the
    /// callback fails, activations, frame bottom and recursion depth are
    /// restored and the error value takes the first result slot.
    ///
    /// Callers check that the stack holds `nargs` values and has room for
    /// `nrets`; [`Context::safe_call`] does this before getting here.
    pub(crate) fn handle_safe_call<F>(&mut self, func: F, nargs: usize, nrets: usize) -> CallStatus
    where
        F: FnOnce(&mut Context) -> EngineResult<usize>,
    {
        let span = debug_span!("protected_call", nargs, nrets);
        let _enter = span.enter();

        debug_assert!(self.stack.top() >= self.stack.bottom() + nargs);
        let idx_retbase = self.stack.top() - nargs;
        let saved_bottom = self.stack.bottom();
        let saved_activations = self.activations.len();
        let saved_depth = self.call_recursion_depth;

        match self.safe_call_inner(func) {
            Ok(rc) => {
                self.call_recursion_depth = saved_depth;
                let top = self.stack.top();
                let mut from = top - rc;
                // values below the result base belong to the caller
                if top >= idx_retbase && from < idx_retbase {
                    debug!(
                        returned = rc,
                        available = top - idx_retbase,
                        "protected callback over-reported results"
                    );
                    from = idx_retbase;
                }
                let results = self.stack.drain_from(from);
                self.reset_to_retbase(idx_retbase);
                self.push_results(results, nrets);
                debug!(returned = rc, "protected call succeeded");
                CallStatus::Success
            }
            Err(err) => {
                debug!(
                    error = %err,
                    kind = ?err.kind(),
                    restored_top = idx_retbase,
                    nrets,
                    "protected call caught error"
                );
                self.activations.truncate(saved_activations);
                self.stack.set_bottom(saved_bottom);
                self.call_recursion_depth = saved_depth;
                self.reset_to_retbase(idx_retbase);
                self.push_results(vec![err.to_value()], nrets);
                CallStatus::Error
            }
        }
    }

    fn safe_call_inner<F>(&mut self, func: F) -> EngineResult<usize>
    where
        F: FnOnce(&mut Context) -> EngineResult<usize>,
    {
        if self.call_recursion_depth >= self.limits().call_recursion_limit {
            debug!(depth = self.call_recursion_depth, "protected call rejected by recursion limit");
            return Err(EngineError::range_error("C call stack depth limit"));
        }
        self.call_recursion_depth += 1;

        let rc = func(self)?;
        let visible = self.get_top() as usize;
        if rc > visible {
            return Err(EngineError::internal(format!(
                "protected callback returned {} values but only {} are on the stack",
                rc, visible
            )));
        }
        Ok(rc)
    }

    /// Discard everything above `idx_retbase`; if the callback consumed values
    /// below it, pad back up with undefined.
    fn reset_to_retbase(&mut self, idx_retbase: usize) {
        self.stack.truncate_abs(idx_retbase);
        while self.stack.top() < idx_retbase {
            self.stack.push_reserved(Value::Undefined);
        }
    }

    fn push_results(&mut self, results: Vec<Value>, nrets: usize) {
        let mut results = results.into_iter();
        for _ in 0..nrets {
            self.stack
                .push_reserved(results.next().unwrap_or(Value::Undefined));
        }
    }
}
