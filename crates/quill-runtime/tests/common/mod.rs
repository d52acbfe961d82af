//! Shared test utilities for the call API tests
#![allow(dead_code)]

use quill_runtime::{Context, EngineResult, NativeFunction, NativeFunctionBuilder, Value};
use std::sync::{Arc, Mutex};

/// What a recording function observed on one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub this: Value,
    pub args: Vec<Value>,
    pub constructor: bool,
    pub strict: bool,
}

pub type Log = Arc<Mutex<Vec<Invocation>>>;

/// Build a native function from a closure
pub fn native<F>(name: &str, nargs: Option<usize>, f: F) -> NativeFunction
where
    F: Fn(&mut Context) -> EngineResult<Value> + Send + Sync + 'static,
{
    let builder = NativeFunctionBuilder::new(name).with_implementation(f);
    let builder = match nargs {
        Some(n) => builder.with_arity(n),
        None => builder.variadic(),
    };
    builder.build().unwrap()
}

/// Variadic native that records its receiver and arguments and returns `result`
pub fn recorder(result: Value) -> (NativeFunction, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let func = native("recorder", None, move |ctx: &mut Context| -> EngineResult<Value> {
        let args = ctx.stack().frame().to_vec();
        ctx.push_this()?;
        let this = ctx.pop()?;
        sink.lock().unwrap().push(Invocation {
            this,
            args,
            constructor: ctx.is_constructor_call(),
            strict: ctx.is_strict_call(),
        });
        Ok(result.clone())
    });
    (func, log)
}

/// Push a recorder and return its log
pub fn push_recorder(ctx: &mut Context, result: Value) -> Log {
    let (func, log) = recorder(result);
    ctx.push_native_function(func).unwrap();
    log
}

/// Native that sums its numeric arguments
pub fn push_sum(ctx: &mut Context) {
    let func = native("sum", None, |ctx: &mut Context| -> EngineResult<Value> {
        let mut total = 0.0;
        for i in 0..ctx.get_top() {
            total += ctx.require_number(i)?;
        }
        Ok(Value::Number(total))
    });
    ctx.push_native_function(func).unwrap();
}

/// Native that raises `value`
pub fn push_thrower(ctx: &mut Context, value: Value) {
    let func = native("thrower", None, move |ctx: &mut Context| -> EngineResult<Value> {
        ctx.throw(value.clone())
    });
    ctx.push_native_function(func).unwrap();
}

pub fn push_numbers(ctx: &mut Context, values: &[f64]) {
    for v in values {
        ctx.push_number(*v).unwrap();
    }
}

pub fn frame(ctx: &Context) -> Vec<Value> {
    ctx.stack().frame().to_vec()
}

pub fn num(n: f64) -> Value {
    Value::Number(n)
}
