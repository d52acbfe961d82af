//! Bound functions
//!
//! [`Context::bind`] is the only way to create a bound function and it
//! flattens: binding a bound function produces a new bound function over the
//! original target, with the argument lists concatenated. A bound function's
//! target is therefore never itself bound.

use crate::context::Context;
use crate::error::{EngineError, EngineResult};
use crate::function::{BoundFunction, BoundTarget};
use crate::object::{HeapObject, ObjectKind};
use crate::stack::Idx;
use crate::value::{Shared, Value};
use tracing::trace;

fn bound_parts(value: &Value) -> Option<BoundFunction> {
    match value {
        Value::Object(obj) => obj.with(|o| match o.kind() {
            ObjectKind::Bound(b) => Some(b.clone()),
            _ => None,
        }),
        _ => None,
    }
}

impl Context {
    /// Replace a bound function on the stack top with its target.
    ///
    /// Any other value is left alone.
    pub fn resolve_nonbound(&mut self) -> EngineResult<()> {
        let top = self.require(-1)?;
        if let Some(bound) = bound_parts(top) {
            self.push(bound.target().value().clone())?;
            self.replace(-2)?;
        }
        Ok(())
    }

    /// `[... func this arg1 ... argN] -> [... bound]`
    pub fn bind(&mut self, nargs: Idx) -> EngineResult<()> {
        let idx_func = self.call_get_idx_func(nargs, 2)?;
        let func = self.require(idx_func)?.clone();
        if !func.is_callable() {
            return Err(EngineError::type_error("not callable"));
        }

        let start = self.stack.bottom() + idx_func as usize;
        let mut args: Vec<Value> = self.stack.slice_from(start + 2).to_vec();
        let this = self.require(idx_func + 1)?.clone();

        let name = bound_name(&func);
        let bound = match bound_parts(&func) {
            Some(inner) => {
                let mut merged = inner.args().to_vec();
                merged.append(&mut args);
                trace!(merged_args = merged.len(), "flattening bound function");
                BoundFunction::new(inner.target().clone(), inner.this_binding().clone(), merged)
            }
            None => BoundFunction::new(BoundTarget::new(func)?, this, args),
        };

        let mut object = HeapObject::with_kind(ObjectKind::Bound(bound));
        object.set_own("name", Value::string(name));
        self.stack.truncate_abs(start);
        self.push(Value::Object(Shared::new(object)))
    }
}

fn bound_name(target: &Value) -> String {
    let base = match target {
        Value::Object(obj) => obj
            .with(|o| o.get_own("name").and_then(|v| v.as_str().map(str::to_string)))
            .unwrap_or_default(),
        _ => String::new(),
    };
    format!("bound {}", base)
}
