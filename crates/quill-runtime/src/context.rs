//! Execution context
//!
//! A [`Context`] owns one operand stack, the activation stack and the native
//! recursion counter. Every host API operation is a method on it.

use crate::error::{EngineError, EngineResult};
use crate::function::{LightFunc, LightFn, NativeFunction, ScriptFunction};
use crate::object::{HeapObject, ObjectKind};
use crate::stack::{Idx, ValueStack};
use crate::value::{ObjectRef, Shared, Value};
use crate::vm::Activation;
use quill_config::EngineLimits;

pub struct Context {
    pub(crate) stack: ValueStack,
    pub(crate) activations: Vec<Activation>,
    pub(crate) call_recursion_depth: usize,
    limits: EngineLimits,
    global: ObjectRef,
}

impl Context {
    pub fn new() -> Self {
        Self::with_limits(EngineLimits::default())
    }

    pub fn with_limits(limits: EngineLimits) -> Self {
        tracing::debug!(
            recursion_limit = limits.call_recursion_limit,
            stack_limit = limits.value_stack_limit,
            "creating context"
        );
        Self {
            stack: ValueStack::new(limits.value_stack_initial, limits.value_stack_limit),
            activations: Vec::new(),
            call_recursion_depth: 0,
            limits,
            global: ObjectRef::new_plain(),
        }
    }

    pub fn limits(&self) -> &EngineLimits {
        &self.limits
    }

    pub fn global_object(&self) -> &ObjectRef {
        &self.global
    }

    pub fn stack(&self) -> &ValueStack {
        &self.stack
    }

    pub fn current_activation(&self) -> Option<&Activation> {
        self.activations.last()
    }

    pub fn activation_depth(&self) -> usize {
        self.activations.len()
    }

    pub fn call_recursion_depth(&self) -> usize {
        self.call_recursion_depth
    }

    // ------------------------------------------------------------------
    // Stack views
    // ------------------------------------------------------------------

    pub fn get_top(&self) -> Idx {
        self.stack.get_top()
    }

    pub fn set_top(&mut self, idx: Idx) -> EngineResult<()> {
        self.stack.set_top(idx)
    }

    pub fn normalize_index(&self, idx: Idx) -> Option<Idx> {
        self.stack.normalize_index(idx)
    }

    pub fn require_normalize_index(&self, idx: Idx) -> EngineResult<Idx> {
        self.stack.require_normalize_index(idx)
    }

    pub fn is_valid_index(&self, idx: Idx) -> bool {
        self.stack.is_valid_index(idx)
    }

    pub fn get(&self, idx: Idx) -> Option<&Value> {
        self.stack.get(idx)
    }

    pub fn require(&self, idx: Idx) -> EngineResult<&Value> {
        self.stack.require(idx)
    }

    pub fn check_stack(&mut self, extra: usize) -> bool {
        self.stack.check_stack(extra)
    }

    pub fn require_stack(&mut self, extra: usize) -> EngineResult<()> {
        self.stack.require_stack(extra)
    }

    pub fn require_number(&self, idx: Idx) -> EngineResult<f64> {
        let value = self.require(idx)?;
        value.as_number().ok_or(EngineError::UnexpectedType {
            expected: "number",
            actual: value.type_name(),
        })
    }

    pub fn require_string(&self, idx: Idx) -> EngineResult<&str> {
        let value = self.require(idx)?;
        value.as_str().ok_or(EngineError::UnexpectedType {
            expected: "string",
            actual: value.type_name(),
        })
    }

    // ------------------------------------------------------------------
    // Stack manipulation
    // ------------------------------------------------------------------

    pub fn push(&mut self, value: Value) -> EngineResult<()> {
        self.stack.push(value)
    }

    pub fn push_undefined(&mut self) -> EngineResult<()> {
        self.push(Value::Undefined)
    }

    pub fn push_null(&mut self) -> EngineResult<()> {
        self.push(Value::Null)
    }

    pub fn push_bool(&mut self, b: bool) -> EngineResult<()> {
        self.push(Value::Bool(b))
    }

    pub fn push_number(&mut self, n: f64) -> EngineResult<()> {
        self.push(Value::Number(n))
    }

    pub fn push_string(&mut self, s: &str) -> EngineResult<()> {
        self.push(Value::string(s))
    }

    pub fn push_global_object(&mut self) -> EngineResult<()> {
        self.push(Value::Object(self.global.clone()))
    }

    /// Push a new empty object and return its index
    pub fn push_object(&mut self) -> EngineResult<Idx> {
        self.push(Value::Object(ObjectRef::new_plain()))?;
        Ok(self.get_top() - 1)
    }

    pub fn push_native_function(&mut self, func: NativeFunction) -> EngineResult<Idx> {
        let name = func.name().clone();
        let constructable = func.is_constructable();
        self.push_function_object(ObjectKind::Native(func), &name, constructable)
    }

    pub fn push_script_function(&mut self, func: ScriptFunction) -> EngineResult<Idx> {
        let name = func.name().clone();
        let constructable = func.is_constructable();
        self.push_function_object(ObjectKind::Script(func), &name, constructable)
    }

    pub fn push_light_function(
        &mut self,
        func: LightFn,
        nargs: Option<u8>,
        length: u8,
        magic: i8,
    ) -> EngineResult<Idx> {
        let lf = LightFunc::new(func, nargs, length, magic)?;
        self.push(Value::LightFunc(lf))?;
        Ok(self.get_top() - 1)
    }

    fn push_function_object(
        &mut self,
        kind: ObjectKind,
        name: &str,
        constructable: bool,
    ) -> EngineResult<Idx> {
        let mut object = HeapObject::with_kind(kind);
        object.set_own("name", Value::string(name));
        if constructable {
            object.set_own("prototype", Value::Object(ObjectRef::new_plain()));
        }
        self.push(Value::Object(Shared::new(object)))?;
        Ok(self.get_top() - 1)
    }

    pub fn pop(&mut self) -> EngineResult<Value> {
        self.stack.pop()
    }

    pub fn pop_n(&mut self, count: usize) -> EngineResult<()> {
        self.stack.pop_n(count)
    }

    pub fn dup(&mut self, idx: Idx) -> EngineResult<()> {
        self.stack.dup(idx)
    }

    pub fn insert(&mut self, to_idx: Idx) -> EngineResult<()> {
        self.stack.insert(to_idx)
    }

    pub fn insert_undefined(&mut self, idx: Idx) -> EngineResult<()> {
        self.push_undefined()?;
        self.insert(idx)
    }

    pub fn replace(&mut self, to_idx: Idx) -> EngineResult<()> {
        self.stack.replace(to_idx)
    }

    pub fn remove(&mut self, idx: Idx) -> EngineResult<Value> {
        self.stack.remove(idx)
    }

    /// Raise `value` as an error
    pub fn throw<T>(&self, value: Value) -> EngineResult<T> {
        Err(EngineError::Thrown(value))
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
