//! Per-function magic values
//!
//! Native functions carry a signed 16-bit magic, light functions a signed
//! 8-bit one packed into their flag word. Values are widened to `i32` on the
//! way out; [`Context::set_magic`] keeps only the low 16 bits.

use crate::context::Context;
use crate::error::{EngineError, EngineResult};
use crate::object::ObjectKind;
use crate::stack::Idx;
use crate::value::Value;
use crate::vm::Callee;

impl Context {
    /// Magic of the running function; 0 with no activation or when the
    /// running function has no magic (script functions).
    pub fn get_current_magic(&self) -> i32 {
        match self.current_activation().map(|act| &act.func) {
            Some(Callee::Object(obj)) => obj.with(|o| match o.kind() {
                ObjectKind::Native(nf) => nf.magic() as i32,
                _ => 0,
            }),
            Some(Callee::Light(lf)) => lf.magic() as i32,
            None => 0,
        }
    }

    /// Magic of the native or light function at `idx`
    pub fn get_magic(&self, idx: Idx) -> EngineResult<i32> {
        let value = self.require(idx)?;
        let magic = match value {
            Value::Object(obj) => obj.with(|o| match o.kind() {
                ObjectKind::Native(nf) => Some(nf.magic() as i32),
                _ => None,
            }),
            Value::LightFunc(lf) => Some(lf.magic() as i32),
            _ => None,
        };
        magic.ok_or(EngineError::UnexpectedType {
            expected: "native function",
            actual: value.type_name(),
        })
    }

    /// Set the magic of the native function at `idx`, truncated to 16 bits.
    ///
    /// Light functions are immutable values and are rejected.
    pub fn set_magic(&mut self, idx: Idx, magic: i32) -> EngineResult<()> {
        let value = self.require(idx)?;
        let updated = match value {
            Value::Object(obj) => obj.with_mut(|o| match o.kind_mut() {
                ObjectKind::Native(nf) => {
                    nf.set_magic(magic as i16);
                    true
                }
                _ => false,
            }),
            _ => false,
        };
        if updated {
            Ok(())
        } else {
            Err(EngineError::UnexpectedType {
                expected: "native function",
                actual: value.type_name(),
            })
        }
    }
}
