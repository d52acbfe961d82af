//! Unprotected call entry points: call, call_method, call_prop, construct

mod common;

use common::*;
use pretty_assertions::assert_eq;
use quill_runtime::{
    CallFlags, Context, EngineError, EngineLimits, EngineResult, ErrorKind, ScriptFunction, Value,
};
use rstest::rstest;

// ============================================================================
// Plain and method calls
// ============================================================================

#[test]
fn test_call_replaces_span_with_result() {
    let mut ctx = Context::new();
    ctx.push_string("a").unwrap();
    let log = push_recorder(&mut ctx, Value::string("done"));
    push_numbers(&mut ctx, &[1.0, 2.0]);

    ctx.call(2).unwrap();

    assert_eq!(frame(&ctx), vec![Value::string("a"), Value::string("done")]);
    let calls = log.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].this, Value::Undefined);
    assert_eq!(calls[0].args, vec![num(1.0), num(2.0)]);
    assert!(!calls[0].constructor);
}

#[test]
fn test_call_method_passes_receiver() {
    let mut ctx = Context::new();
    let log = push_recorder(&mut ctx, Value::Null);
    ctx.push_string("me").unwrap();
    ctx.push_number(9.0).unwrap();

    ctx.call_method(1).unwrap();

    assert_eq!(frame(&ctx), vec![Value::Null]);
    let calls = log.lock().unwrap();
    assert_eq!(calls[0].this, Value::string("me"));
    assert_eq!(calls[0].args, vec![num(9.0)]);
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(5)]
fn test_call_with_varying_nargs(#[case] nargs: usize) {
    let mut ctx = Context::new();
    push_sum(&mut ctx);
    for _ in 0..nargs {
        ctx.push_number(1.0).unwrap();
    }

    ctx.call(nargs as isize).unwrap();

    assert_eq!(frame(&ctx), vec![num(nargs as f64)]);
}

#[rstest]
#[case(-1)]
#[case(2)]
#[case(10)]
fn test_call_invalid_nargs_leaves_stack(#[case] nargs: isize) {
    let mut ctx = Context::new();
    push_sum(&mut ctx);
    ctx.push_number(1.0).unwrap();
    let before = frame(&ctx);

    assert_eq!(ctx.call(nargs), Err(EngineError::InvalidArgs));
    assert_eq!(frame(&ctx), before);
}

#[test]
fn test_bad_argument_count_is_distinct_from_type_error() {
    let mut ctx = Context::new();
    push_sum(&mut ctx);

    let bad_count = ctx.call(-1).unwrap_err();
    assert_eq!(bad_count.kind(), ErrorKind::InvalidArgs);

    ctx.push_number(1.0).unwrap();
    let not_callable = ctx.call(0).unwrap_err();
    assert_eq!(not_callable.kind(), ErrorKind::Type);
}

#[test]
fn test_calling_non_callable_is_type_error() {
    let mut ctx = Context::new();
    ctx.push_number(1.0).unwrap();

    let err = ctx.call(0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    insta::assert_snapshot!(err.to_string(), @"TypeError: not callable");
}

#[test]
fn test_native_calling_native() {
    let mut ctx = Context::new();
    let outer = native("outer", Some(1), |ctx: &mut Context| -> EngineResult<Value> {
        push_sum(ctx);
        ctx.dup(0)?;
        ctx.dup(0)?;
        ctx.call(2)?;
        ctx.pop()
    });
    ctx.push_native_function(outer).unwrap();
    ctx.push_number(21.0).unwrap();

    ctx.call(1).unwrap();

    assert_eq!(frame(&ctx), vec![num(42.0)]);
    assert_eq!(ctx.activation_depth(), 0);
    assert_eq!(ctx.call_recursion_depth(), 0);
}

#[test]
fn test_error_propagates_from_unprotected_call() {
    let mut ctx = Context::new();
    push_thrower(&mut ctx, Value::string("bad"));

    let err = ctx.call(0).unwrap_err();

    assert_eq!(err, EngineError::Thrown(Value::string("bad")));
    assert_eq!(ctx.activation_depth(), 0);
    assert_eq!(ctx.call_recursion_depth(), 0);
}

// ============================================================================
// Native argument normalisation and headroom
// ============================================================================

#[test]
fn test_fixed_nargs_pads_missing_arguments() {
    let mut ctx = Context::new();
    let func = native("second", Some(2), |ctx: &mut Context| -> EngineResult<Value> {
        Ok(ctx.require(1)?.clone())
    });
    ctx.push_native_function(func).unwrap();
    ctx.push_number(1.0).unwrap();

    ctx.call(1).unwrap();

    assert_eq!(frame(&ctx), vec![Value::Undefined]);
}

#[test]
fn test_native_has_reserved_headroom() {
    let limits = EngineLimits {
        value_stack_initial: 8,
        value_stack_reserve: 32,
        ..Default::default()
    };
    let mut ctx = Context::with_limits(limits);
    let func = native("fill", None, |ctx: &mut Context| -> EngineResult<Value> {
        for i in 0..32 {
            ctx.push_number(i as f64)?;
        }
        Ok(Value::Number(ctx.get_top() as f64))
    });
    ctx.push_native_function(func).unwrap();

    ctx.call(0).unwrap();

    assert_eq!(frame(&ctx), vec![num(32.0)]);
}

#[test]
fn test_push_without_headroom_fails() {
    let limits = EngineLimits {
        value_stack_initial: 2,
        ..Default::default()
    };
    let mut ctx = Context::with_limits(limits);
    ctx.push_number(1.0).unwrap();
    ctx.push_number(2.0).unwrap();

    let err = ctx.push_number(3.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
    assert!(ctx.check_stack(1));
    ctx.push_number(3.0).unwrap();
}

#[test]
fn test_light_function_call() {
    fn add(ctx: &mut Context) -> EngineResult<Value> {
        Ok(Value::Number(ctx.require_number(0)? + ctx.require_number(1)?))
    }

    let mut ctx = Context::new();
    ctx.push_light_function(add, Some(2), 2, 0).unwrap();
    push_numbers(&mut ctx, &[2.0, 3.0, 100.0]);

    ctx.call(3).unwrap();

    assert_eq!(frame(&ctx), vec![num(5.0)]);
}

// ============================================================================
// Property calls
// ============================================================================

#[test]
fn test_call_prop_uses_object_as_receiver() {
    let mut ctx = Context::new();
    let obj = ctx.push_object().unwrap();
    let log = push_recorder(&mut ctx, Value::Bool(true));
    ctx.put_prop_str(obj, "method").unwrap();
    let obj_value = ctx.require(obj).unwrap().clone();

    ctx.push_string("method").unwrap();
    ctx.push_number(1.0).unwrap();
    ctx.call_prop(obj, 1).unwrap();

    assert_eq!(frame(&ctx), vec![obj_value.clone(), Value::Bool(true)]);
    let calls = log.lock().unwrap();
    assert_eq!(calls[0].this, obj_value);
    assert_eq!(calls[0].args, vec![num(1.0)]);
}

#[test]
fn test_call_prop_with_negative_object_index() {
    let mut ctx = Context::new();
    let obj = ctx.push_object().unwrap();
    push_sum(&mut ctx);
    ctx.put_prop_str(obj, "sum").unwrap();

    ctx.push_string("sum").unwrap();
    push_numbers(&mut ctx, &[4.0, 5.0]);
    ctx.call_prop(-4, 2).unwrap();

    assert_eq!(ctx.get_top(), 2);
    assert_eq!(ctx.require(-1).unwrap(), &num(9.0));
}

#[test]
fn test_call_prop_finds_inherited_method() {
    let mut ctx = Context::new();
    let proto = ctx.push_object().unwrap();
    push_sum(&mut ctx);
    ctx.put_prop_str(proto, "sum").unwrap();
    let proto_ref = ctx.require(proto).unwrap().as_object().unwrap().clone();

    let obj = ctx.push_object().unwrap();
    ctx.require(obj)
        .unwrap()
        .as_object()
        .unwrap()
        .with_mut(|o| o.set_prototype(Some(proto_ref)));

    ctx.push_string("sum").unwrap();
    ctx.push_number(3.0).unwrap();
    ctx.call_prop(obj, 1).unwrap();

    assert_eq!(ctx.require(-1).unwrap(), &num(3.0));
}

#[test]
fn test_call_prop_missing_method() {
    let mut ctx = Context::new();
    let obj = ctx.push_object().unwrap();
    ctx.push_string("nope").unwrap();

    let err = ctx.call_prop(obj, 0).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"TypeError: not callable");
}

#[test]
fn test_call_prop_rejects_bad_arguments() {
    let mut ctx = Context::new();
    ctx.push_object().unwrap();
    ctx.push_string("k").unwrap();

    assert_eq!(ctx.call_prop(0, -1), Err(EngineError::InvalidArgs));
    assert!(matches!(
        ctx.call_prop(7, 0),
        Err(EngineError::InvalidIndex { index: 7 })
    ));
    assert_eq!(ctx.get_top(), 2);
}

// ============================================================================
// Constructor calls
// ============================================================================

#[test]
fn test_construct_returns_default_instance() {
    let mut ctx = Context::new();
    let log = push_recorder(&mut ctx, Value::Undefined);
    let ctor = ctx.require(0).unwrap().as_object().unwrap().clone();

    ctx.construct(0).unwrap();

    assert_eq!(ctx.get_top(), 1);
    let instance = ctx.require(0).unwrap().clone();
    assert_eq!(instance.type_name(), "object");

    let calls = log.lock().unwrap();
    assert!(calls[0].constructor);
    assert_eq!(calls[0].this, instance);

    let proto = ctor.get_property("prototype").unwrap().unwrap();
    let linked = instance
        .as_object()
        .unwrap()
        .with(|o| o.prototype().cloned())
        .map(Value::Object);
    assert_eq!(linked, Some(proto));
}

#[test]
fn test_construct_uses_returned_object() {
    let mut ctx = Context::new();
    let replacement = Value::Object(quill_runtime::ObjectRef::new_plain());
    let returned = replacement.clone();
    let func = native("ctor", None, move |_ctx: &mut Context| -> EngineResult<Value> {
        Ok(returned.clone())
    });
    ctx.push_native_function(func).unwrap();

    ctx.construct(0).unwrap();

    assert_eq!(frame(&ctx), vec![replacement]);
}

#[test]
fn test_construct_ignores_primitive_return() {
    let mut ctx = Context::new();
    push_sum(&mut ctx);
    ctx.push_number(1.0).unwrap();

    ctx.construct(1).unwrap();

    assert_eq!(ctx.require(0).unwrap().type_name(), "object");
}

#[test]
fn test_construct_non_constructable() {
    let mut ctx = Context::new();
    let func = quill_runtime::NativeFunctionBuilder::new("plain")
        .constructable(false)
        .with_implementation(|_ctx: &mut Context| -> EngineResult<Value> { Ok(Value::Null) })
        .build()
        .unwrap();
    ctx.push_native_function(func).unwrap();

    let err = ctx.construct(0).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"TypeError: not constructable");
}

#[test]
fn test_require_constructor_call_guard() {
    let guarded = || {
        native("Guarded", None, |ctx: &mut Context| -> EngineResult<Value> {
            ctx.require_constructor_call()?;
            Ok(Value::Undefined)
        })
    };

    let mut ctx = Context::new();
    ctx.push_native_function(guarded()).unwrap();
    let err = ctx.call(0).unwrap_err();
    assert_eq!(err.to_string(), "TypeError: constructor requires 'new'");

    let mut ctx = Context::new();
    ctx.push_native_function(guarded()).unwrap();
    ctx.construct(0).unwrap();
    assert_eq!(ctx.require(0).unwrap().type_name(), "object");
}

#[test]
fn test_is_constructor_call_scoped_to_construct() {
    let mut ctx = Context::new();
    assert!(!ctx.is_constructor_call());

    let log = push_recorder(&mut ctx, Value::Undefined);
    ctx.dup(0).unwrap();
    ctx.construct(0).unwrap();
    ctx.pop().unwrap();
    ctx.call(0).unwrap();

    let calls = log.lock().unwrap();
    assert!(calls[0].constructor);
    assert!(!calls[1].constructor);
    assert!(!ctx.is_constructor_call());
}

#[test]
fn test_nested_call_inside_constructor_is_not_constructor_call() {
    let mut ctx = Context::new();
    let (inner, log) = recorder(Value::Undefined);
    let outer = native("outer", None, move |ctx: &mut Context| -> EngineResult<Value> {
        ctx.push_native_function(inner.clone())?;
        ctx.call(0)?;
        ctx.pop()?;
        Ok(Value::Undefined)
    });
    ctx.push_native_function(outer).unwrap();

    ctx.construct(0).unwrap();

    assert!(!log.lock().unwrap()[0].constructor);
}

// ============================================================================
// Strictness and receivers
// ============================================================================

#[test]
fn test_natives_are_strict() {
    let mut ctx = Context::new();
    let log = push_recorder(&mut ctx, Value::Undefined);
    ctx.call(0).unwrap();

    let calls = log.lock().unwrap();
    assert!(calls[0].strict);
    assert_eq!(calls[0].this, Value::Undefined);
}

#[rstest]
#[case(false, true)]
#[case(true, false)]
fn test_script_receiver_coercion(#[case] strict: bool, #[case] expect_global: bool) {
    let mut ctx = Context::new();
    let global = Value::Object(ctx.global_object().clone());
    let func = ScriptFunction::new("f", |ctx: &mut Context| -> EngineResult<Value> {
        ctx.push_this()?;
        ctx.pop()
    })
    .strict(strict);
    ctx.push_script_function(func).unwrap();

    ctx.call(0).unwrap();

    let this = ctx.require(0).unwrap().clone();
    assert_eq!(this == global, expect_global);
    if !expect_global {
        assert_eq!(this, Value::Undefined);
    }
}

#[test]
fn test_script_strictness_visible_to_query() {
    let mut ctx = Context::new();
    let func = ScriptFunction::new("sloppy", |ctx: &mut Context| -> EngineResult<Value> {
        Ok(Value::Bool(ctx.is_strict_call()))
    });
    ctx.push_script_function(func).unwrap();

    ctx.call(0).unwrap();

    assert_eq!(frame(&ctx), vec![Value::Bool(false)]);
    assert!(ctx.is_strict_call());
}

// ============================================================================
// Bound functions
// ============================================================================

#[test]
fn test_bound_function_prepends_args_and_fixes_this() {
    let mut ctx = Context::new();
    let log = push_recorder(&mut ctx, Value::Undefined);
    ctx.push_string("bound-this").unwrap();
    ctx.push_number(1.0).unwrap();
    ctx.bind(1).unwrap();

    ctx.push_number(2.0).unwrap();
    ctx.call(1).unwrap();

    let calls = log.lock().unwrap();
    assert_eq!(calls[0].this, Value::string("bound-this"));
    assert_eq!(calls[0].args, vec![num(1.0), num(2.0)]);
}

#[test]
fn test_rebound_function_calls_original_target() {
    let mut ctx = Context::new();
    let log = push_recorder(&mut ctx, Value::Undefined);
    ctx.push_string("first").unwrap();
    ctx.push_number(1.0).unwrap();
    ctx.bind(1).unwrap();
    ctx.push_string("second").unwrap();
    ctx.push_number(2.0).unwrap();
    ctx.bind(1).unwrap();

    ctx.push_number(3.0).unwrap();
    ctx.call(1).unwrap();

    let calls = log.lock().unwrap();
    assert_eq!(calls[0].this, Value::string("first"));
    assert_eq!(calls[0].args, vec![num(1.0), num(2.0), num(3.0)]);
    assert_eq!(ctx.activation_depth(), 0);
}

#[test]
fn test_construct_bound_function_ignores_bound_this() {
    let mut ctx = Context::new();
    let log = push_recorder(&mut ctx, Value::Undefined);
    ctx.push_string("ignored").unwrap();
    ctx.push_number(1.0).unwrap();
    ctx.bind(1).unwrap();

    ctx.construct(0).unwrap();

    let instance = ctx.require(0).unwrap().clone();
    let calls = log.lock().unwrap();
    assert!(calls[0].constructor);
    assert_eq!(calls[0].this, instance);
    assert_eq!(calls[0].args, vec![num(1.0)]);
}

#[test]
fn test_activation_never_holds_bound_function() {
    let mut ctx = Context::new();
    let probe = native("probe", None, |ctx: &mut Context| -> EngineResult<Value> {
        ctx.push_current_function()?;
        let func = ctx.pop()?;
        Ok(Value::Bool(func.is_bound_function()))
    });
    ctx.push_native_function(probe).unwrap();
    ctx.push_undefined().unwrap();
    ctx.bind(0).unwrap();

    ctx.call(0).unwrap();

    assert_eq!(frame(&ctx), vec![Value::Bool(false)]);
}

// ============================================================================
// Recursion limit
// ============================================================================

fn push_recursive(ctx: &mut Context) {
    let func = native("recurse", None, |ctx: &mut Context| -> EngineResult<Value> {
        ctx.push_current_function()?;
        ctx.call(0)?;
        ctx.pop()
    });
    ctx.push_native_function(func).unwrap();
}

#[test]
fn test_recursion_limit_enforced() {
    let limits = EngineLimits {
        call_recursion_limit: 8,
        ..Default::default()
    };
    let mut ctx = Context::with_limits(limits);
    push_recursive(&mut ctx);

    let err = ctx.call(0).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Range);
    insta::assert_snapshot!(err.to_string(), @"RangeError: C call stack depth limit");
    assert_eq!(ctx.call_recursion_depth(), 0);
    assert_eq!(ctx.activation_depth(), 0);
}

#[test]
fn test_ignore_recursion_limit_flag() {
    let limits = EngineLimits {
        call_recursion_limit: 1,
        ..Default::default()
    };
    let mut ctx = Context::with_limits(limits);
    let inner = native("inner", None, |ctx: &mut Context| -> EngineResult<Value> {
        Ok(Value::Number(ctx.call_recursion_depth() as f64))
    });
    let outer = native("outer", None, move |ctx: &mut Context| -> EngineResult<Value> {
        ctx.push_native_function(inner.clone())?;
        ctx.push_undefined()?;
        ctx.handle_call_unprotected(-2, CallFlags::IGNORE_RECURSION_LIMIT)?;
        ctx.pop()
    });
    ctx.push_native_function(outer).unwrap();

    ctx.call(0).unwrap();

    assert_eq!(frame(&ctx), vec![num(2.0)]);
}

#[test]
fn test_handle_call_requires_receiver_slot() {
    let mut ctx = Context::new();
    push_sum(&mut ctx);
    assert_eq!(
        ctx.handle_call_unprotected(0, CallFlags::NONE),
        Err(EngineError::InvalidArgs)
    );
    assert_eq!(
        ctx.handle_call_unprotected_nargs(0, CallFlags::NONE),
        Err(EngineError::InvalidArgs)
    );
}
