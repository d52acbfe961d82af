//! Protected call entry points
//!
//! Every variant validates its counts, then runs the matching unprotected
//! path inside the engine's protected boundary. Argument errors detected before
//! the boundary is entered are returned as `Err` and leave the stack
//! untouched; anything that fails inside the boundary becomes
//! `Ok(CallStatus::Error)` with the error value in the result slot.

use crate::context::Context;
use crate::error::{CallStatus, EngineError, EngineResult};
use crate::stack::Idx;
use crate::vm::CallFlags;

/// Inputs of a protected plain or method call
#[derive(Debug, Clone, Copy)]
struct PcallArgs {
    nargs: Idx,
    call_flags: CallFlags,
}

/// Inputs of a protected property call
#[derive(Debug, Clone, Copy)]
struct PcallPropArgs {
    obj_idx: Idx,
    nargs: Idx,
    call_flags: CallFlags,
}

impl Context {
    /// Run `func` with the top `nargs` values as input; afterwards exactly
    /// `nrets` values replace them.
    ///
    /// The callback returns how many values it left on top of the stack.
    pub fn safe_call<F>(&mut self, func: F, nargs: Idx, nrets: Idx) -> EngineResult<CallStatus>
    where
        F: FnOnce(&mut Context) -> EngineResult<usize>,
    {
        if nargs < 0 || nrets < 0 {
            return Err(EngineError::InvalidArgs);
        }
        let (nargs, nrets) = (nargs as usize, nrets as usize);

        let (top, bottom, end) = (self.stack.top(), self.stack.bottom(), self.stack.end());
        if top < bottom + nargs {
            return Err(EngineError::InvalidArgs);
        }
        if end + nargs < top + nrets {
            return Err(EngineError::InvalidArgs);
        }

        Ok(self.handle_safe_call(func, nargs, nrets))
    }

    /// Protected [`Context::call`]: `[... func args*n] -> [... result|error]`
    pub fn pcall(&mut self, nargs: Idx) -> EngineResult<CallStatus> {
        if nargs < 0 {
            return Err(EngineError::InvalidArgs);
        }
        let args = PcallArgs {
            nargs,
            call_flags: CallFlags::NONE,
        };
        self.safe_call(move |ctx| pcall_raw(ctx, args), consumed(nargs, 1)?, 1)
    }

    /// Protected [`Context::call_method`]
    pub fn pcall_method(&mut self, nargs: Idx) -> EngineResult<CallStatus> {
        self.pcall_method_flags(nargs, CallFlags::NONE)
    }

    /// Protected method call with explicit call flags
    pub fn pcall_method_flags(&mut self, nargs: Idx, call_flags: CallFlags) -> EngineResult<CallStatus> {
        if nargs < 0 {
            return Err(EngineError::InvalidArgs);
        }
        let args = PcallArgs { nargs, call_flags };
        self.safe_call(move |ctx| pcall_method_raw(ctx, args), consumed(nargs, 2)?, 1)
    }

    /// Protected [`Context::call_prop`]
    ///
    /// Only the key and the arguments are consumed; the object stays.
    pub fn pcall_prop(&mut self, obj_idx: Idx, nargs: Idx) -> EngineResult<CallStatus> {
        if nargs < 0 {
            return Err(EngineError::InvalidArgs);
        }
        let args = PcallPropArgs {
            obj_idx,
            nargs,
            call_flags: CallFlags::NONE,
        };
        self.safe_call(move |ctx| pcall_prop_raw(ctx, args), consumed(nargs, 1)?, 1)
    }

    /// Protected [`Context::construct`]
    pub fn pconstruct(&mut self, nargs: Idx) -> EngineResult<CallStatus> {
        if nargs < 0 {
            return Err(EngineError::InvalidArgs);
        }
        self.safe_call(
            move |ctx| {
                ctx.construct(nargs)?;
                Ok(1)
            },
            consumed(nargs, 1)?,
            1,
        )
    }
}

/// Values a protected call consumes: the arguments plus `extra` slots below
/// them. Counts that do not fit an `Idx` are rejected.
fn consumed(nargs: Idx, extra: Idx) -> EngineResult<Idx> {
    nargs.checked_add(extra).ok_or(EngineError::InvalidArgs)
}

fn pcall_raw(ctx: &mut Context, args: PcallArgs) -> EngineResult<usize> {
    let idx_func = ctx.call_get_idx_func_unvalidated(args.nargs, 1);
    ctx.require_stack(1)?;
    ctx.insert_undefined(idx_func + 1)?;
    ctx.handle_call_unprotected(idx_func, args.call_flags)?;
    Ok(1)
}

fn pcall_method_raw(ctx: &mut Context, args: PcallArgs) -> EngineResult<usize> {
    let idx_func = ctx.call_get_idx_func_unvalidated(args.nargs, 2);
    ctx.handle_call_unprotected(idx_func, args.call_flags)?;
    Ok(1)
}

fn pcall_prop_raw(ctx: &mut Context, args: PcallPropArgs) -> EngineResult<usize> {
    let obj_idx = ctx.require_normalize_index(args.obj_idx)?;
    ctx.call_prop_prep_stack(obj_idx, args.nargs)?;
    ctx.handle_call_unprotected_nargs(args.nargs, args.call_flags)?;
    Ok(1)
}
