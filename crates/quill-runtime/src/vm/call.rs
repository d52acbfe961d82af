//! Unprotected call handling
//!
//! Expects `[... func this arg1 ... argN]` with `func` at `idx_func` and leaves
//! `[... result]`: the function slot and everything above it are replaced by
//! one value. Errors propagate to the caller with the stack left as it was at
//! the failure point; protected calls restore it.

use super::{Activation, ActivationFlags, CallFlags, Callee};
use crate::context::Context;
use crate::error::{EngineError, EngineResult};
use crate::function::{LightFn, NativeFn, ScriptBody};
use crate::object::ObjectKind;
use crate::stack::Idx;
use crate::value::{ObjectRef, Value};
use std::sync::Arc;
use tracing::{debug, trace};

/// What actually runs once the callee has been resolved
enum Target {
    Native {
        func: NativeFn,
        nargs: Option<usize>,
    },
    Light {
        func: LightFn,
        nargs: Option<usize>,
    },
    Script {
        body: Arc<dyn ScriptBody>,
        strict: bool,
    },
}

impl Target {
    fn kind_name(&self) -> &'static str {
        match self {
            Target::Native { .. } => "native",
            Target::Light { .. } => "light",
            Target::Script { .. } => "script",
        }
    }
}

impl Context {
    /// Call the function at `idx_func`; receiver at `idx_func + 1`, arguments
    /// above it.
    pub fn handle_call_unprotected(&mut self, idx_func: Idx, flags: CallFlags) -> EngineResult<()> {
        let idx_func = self.stack.require_abs_index(idx_func)?;
        if idx_func + 1 >= self.stack.top() {
            return Err(EngineError::InvalidArgs);
        }

        if !flags.contains(CallFlags::IGNORE_RECURSION_LIMIT)
            && self.call_recursion_depth >= self.limits().call_recursion_limit
        {
            debug!(
                depth = self.call_recursion_depth,
                limit = self.limits().call_recursion_limit,
                "call rejected by recursion limit"
            );
            return Err(EngineError::range_error("C call stack depth limit"));
        }

        self.call_recursion_depth += 1;
        let result = self.call_resolved(idx_func, flags);
        self.call_recursion_depth -= 1;
        result
    }

    /// Same as [`Context::handle_call_unprotected`] with the function slot
    /// located `nargs + 2` below the top (function, receiver, arguments).
    pub fn handle_call_unprotected_nargs(&mut self, nargs: Idx, flags: CallFlags) -> EngineResult<()> {
        let idx_func = self.get_top().saturating_sub(nargs).saturating_sub(2);
        if nargs < 0 || idx_func < 0 {
            return Err(EngineError::InvalidArgs);
        }
        self.handle_call_unprotected(idx_func, flags)
    }

    fn call_resolved(&mut self, idx_func: usize, flags: CallFlags) -> EngineResult<()> {
        let construct = flags.contains(CallFlags::CONSTRUCT);

        self.resolve_bound_in_place(idx_func, construct)?;

        let func = self
            .stack
            .get_abs(idx_func)
            .cloned()
            .ok_or_else(|| EngineError::internal("function slot vanished"))?;
        let (callee, target, name) = classify(&func)?;

        if construct {
            if !func.is_constructable() {
                return Err(EngineError::type_error("not constructable"));
            }
            self.link_default_instance(idx_func, &func)?;
        }
        let default_instance = if construct {
            self.stack.get_abs(idx_func + 1).cloned()
        } else {
            None
        };

        let strict = match &target {
            Target::Script { strict, .. } => *strict,
            _ => true,
        };
        if !strict {
            let this_slot = idx_func + 1;
            if self.stack.get_abs(this_slot).is_some_and(Value::is_nullish) {
                let global = Value::Object(self.global_object().clone());
                self.stack.set_abs(this_slot, global)?;
            }
        }

        let mut act_flags = ActivationFlags::NONE;
        if construct {
            act_flags = act_flags | ActivationFlags::CONSTRUCT;
        }
        if strict {
            act_flags = act_flags | ActivationFlags::STRICT;
        }

        trace!(
            function = %name,
            nargs = self.stack.top() - idx_func - 2,
            flags = flags.bits(),
            kind = target.kind_name(),
            depth = self.activations.len(),
            "entering call"
        );

        let saved_bottom = self.stack.bottom();
        self.activations.push(Activation {
            function_name: name,
            func: callee,
            flags: act_flags,
            idx_func,
            saved_bottom,
        });
        self.stack.set_bottom(idx_func + 2);

        let outcome = self.run_target(target);

        self.activations.pop();
        self.stack.set_bottom(saved_bottom);

        let mut result = outcome?;
        if let Some(instance) = default_instance {
            if !result.is_object_like() {
                result = instance;
            }
        }

        self.stack.truncate_abs(idx_func);
        self.stack.push_reserved(result);
        trace!(depth = self.activations.len(), "returned from call");
        Ok(())
    }

    /// Replace a bound function at `idx_func` with its target, install the
    /// bound receiver (unless constructing) and splice in the bound arguments.
    fn resolve_bound_in_place(&mut self, idx_func: usize, construct: bool) -> EngineResult<()> {
        let bound = match self.stack.get_abs(idx_func) {
            Some(Value::Object(obj)) => obj.with(|o| match o.kind() {
                ObjectKind::Bound(b) => Some(b.clone()),
                _ => None,
            }),
            _ => None,
        };
        let Some(bound) = bound else {
            return Ok(());
        };

        self.stack.require_stack(1 + bound.arg_count())?;
        let func = self.stack.get_abs(idx_func).cloned().unwrap_or(Value::Undefined);
        self.stack.push(func)?;
        self.resolve_nonbound()?;
        let target = self.stack.pop()?;
        self.stack.set_abs(idx_func, target)?;

        if !construct {
            self.stack.set_abs(idx_func + 1, bound.this_binding().clone())?;
        }
        self.stack.insert_many_abs(idx_func + 2, bound.args());

        trace!(bound_args = bound.arg_count(), "resolved bound function");
        Ok(())
    }

    /// Give the default instance the constructor's `prototype` object.
    fn link_default_instance(&mut self, idx_func: usize, func: &Value) -> EngineResult<()> {
        let Some(Value::Object(instance)) = self.stack.get_abs(idx_func + 1).cloned() else {
            return Ok(());
        };
        if let Value::Object(ctor) = func {
            if let Some(Value::Object(proto)) = ctor.get_property("prototype")? {
                instance.with_mut(|o| o.set_prototype(Some(proto)));
            }
        }
        Ok(())
    }

    fn run_target(&mut self, target: Target) -> EngineResult<Value> {
        let reserve = self.limits().value_stack_reserve;
        match target {
            Target::Native { func, nargs } => {
                self.prepare_native_frame(nargs, reserve)?;
                func(self)
            }
            Target::Light { func, nargs } => {
                self.prepare_native_frame(nargs, reserve)?;
                func(self)
            }
            Target::Script { body, .. } => {
                self.stack.require_stack(reserve)?;
                body.execute(self)
            }
        }
    }

    /// Pad or truncate the arguments to a fixed count and reserve headroom.
    fn prepare_native_frame(&mut self, nargs: Option<usize>, reserve: usize) -> EngineResult<()> {
        let present = self.get_top() as usize;
        let grow = nargs.map_or(0, |n| n.saturating_sub(present));
        self.stack.require_stack(grow + reserve)?;
        if let Some(n) = nargs {
            self.stack.set_top(n as Idx)?;
        }
        Ok(())
    }
}

fn classify(func: &Value) -> EngineResult<(Callee, Target, Arc<str>)> {
    match func {
        Value::Object(obj) => {
            let (target, name) = obj.with(|o| match o.kind() {
                ObjectKind::Native(nf) => Some((
                    Target::Native {
                        func: nf.func(),
                        nargs: nf.nargs(),
                    },
                    nf.name().clone(),
                )),
                ObjectKind::Script(sf) => Some((
                    Target::Script {
                        body: sf.body(),
                        strict: sf.is_strict(),
                    },
                    sf.name().clone(),
                )),
                _ => None,
            })
            .ok_or_else(|| EngineError::type_error("not callable"))?;
            Ok((Callee::Object(ObjectRef::clone(obj)), target, name))
        }
        Value::LightFunc(lf) => Ok((
            Callee::Light(*lf),
            Target::Light {
                func: lf.func(),
                nargs: lf.nargs(),
            },
            Arc::from("<light>"),
        )),
        _ => Err(EngineError::type_error("not callable")),
    }
}
