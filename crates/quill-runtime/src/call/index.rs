//! Function slot resolution for the call entry points

use crate::context::Context;
use crate::error::{EngineError, EngineResult};
use crate::stack::Idx;

impl Context {
    /// Index of the function slot for a call with `nargs` arguments and
    /// `other` extra values between the function and the top (1 for a plain
    /// call, 2 when a receiver is present).
    ///
    /// ```text
    /// [ ... func arg1 ... argN ]            other = 1
    /// [ ... func this arg1 ... argN ]       other = 2
    /// ```
    pub(crate) fn call_get_idx_func(&self, nargs: Idx, other: Idx) -> EngineResult<Idx> {
        let idx_func = self.get_top().saturating_sub(nargs).saturating_sub(other);
        if nargs < 0 || idx_func < 0 {
            return Err(EngineError::InvalidArgs);
        }
        Ok(idx_func)
    }

    /// Unchecked form for protected callbacks whose caller already
    /// validated the counts.
    pub(crate) fn call_get_idx_func_unvalidated(&self, nargs: Idx, other: Idx) -> Idx {
        debug_assert!(nargs >= 0);
        let idx_func = self.get_top() - nargs - other;
        debug_assert!(idx_func >= 0);
        idx_func
    }
}
