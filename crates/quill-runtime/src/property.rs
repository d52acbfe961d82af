//! Property access through the operand stack

use crate::context::Context;
use crate::error::{EngineError, EngineResult};
use crate::stack::Idx;
use crate::value::Value;

impl Context {
    /// `[... key] -> [... value]`
    ///
    /// Looks up the key on the top of the stack in the object at `obj_idx`
    /// (prototype chain included). A missing property yields undefined and
    /// `false`.
    pub fn get_prop(&mut self, obj_idx: Idx) -> EngineResult<bool> {
        let obj_idx = self.require_normalize_index(obj_idx)?;
        let key = self.require(-1)?.to_property_key();
        let base = self.require(obj_idx)?.clone();
        let found = lookup(&base, &key)?;
        let present = found.is_some();
        self.pop()?;
        self.push(found.unwrap_or(Value::Undefined))?;
        Ok(present)
    }

    /// `[... value] -> [... value]`, key given directly
    pub fn get_prop_str(&mut self, obj_idx: Idx, key: &str) -> EngineResult<bool> {
        let obj_idx = self.require_normalize_index(obj_idx)?;
        self.push_string(key)?;
        self.get_prop(obj_idx)
    }

    /// `[... key value] -> [...]`
    pub fn put_prop(&mut self, obj_idx: Idx) -> EngineResult<()> {
        let obj_idx = self.require_normalize_index(obj_idx)?;
        let key = self.require(-2)?.to_property_key();
        let target = match self.require(obj_idx)? {
            Value::Object(obj) => obj.clone(),
            other => {
                return Err(EngineError::type_error(format!(
                    "cannot write property '{}' of {}",
                    key,
                    other.type_name()
                )))
            }
        };
        let value = self.pop()?;
        self.pop()?;
        target.set_property(key, value);
        Ok(())
    }

    /// `[... value] -> [...]`, key given directly
    pub fn put_prop_str(&mut self, obj_idx: Idx, key: &str) -> EngineResult<()> {
        let obj_idx = self.require_normalize_index(obj_idx)?;
        self.push_string(key)?;
        self.insert(-2)?;
        self.put_prop(obj_idx)
    }
}

fn lookup(base: &Value, key: &str) -> EngineResult<Option<Value>> {
    match base {
        Value::Object(obj) => obj.get_property(key),
        Value::LightFunc(lf) => Ok(match key {
            "length" => Some(Value::Number(lf.length() as f64)),
            _ => None,
        }),
        Value::String(s) if key == "length" => Ok(Some(Value::Number(s.chars().count() as f64))),
        Value::Undefined | Value::Null => Err(EngineError::type_error(format!(
            "cannot read property '{}' of {}",
            key,
            base.type_name()
        ))),
        _ => Ok(None),
    }
}
