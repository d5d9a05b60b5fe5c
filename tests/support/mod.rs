//! Shared host environment for the integration suites.
//!
//! Registers the same globals across every suite: conversion helpers
//! (`i64`, `u64`, `cust`, `numobj`), a string (`howdy`), a tagged object
//! (`user1`), a JSON document (`json`), and a few error-producing entries.
//! Objects and strings also expose chained members (`myfn1`, `myfn2`,
//! `name`, `age`, `err`).

// Each suite pulls in the subset it needs.
#![allow(dead_code)]

use jsexpr::{eval, Arena, Env, Error, Value};

pub const JSON_DOC: &str = concat!(
    "{",
    "\"name\": {\"first\": \"Janet\", \"last\": \"Anderson\"}, ",
    "\"age\": 37,",
    "\"empty\": [],",
    "\"one\": [15],",
    "\"enc\": \"Big\\nBot\",",
    "\"data\": [1,true,false,null,{\"a\":1}]",
    "}"
);

fn first_arg_str<'a>(args: Value<'a>) -> String {
    args.array_at(0).to_string()
}

fn numobj<'a>(_arena: &'a Arena, _recv: Value<'a>, args: Value<'a>) -> Result<Value<'a>, Error<'a>> {
    let d = args.array_at(0).to_f64();
    if d == -80808080.0 {
        return Err(Error::Message("OperatorError: bad news"));
    }
    Ok(Value::Float(d))
}

fn i64_fn<'a>(_arena: &'a Arena, _recv: Value<'a>, args: Value<'a>) -> Result<Value<'a>, Error<'a>> {
    let s = first_arg_str(args);
    Ok(Value::Int(s.trim().parse().unwrap_or(0)))
}

fn u64_fn<'a>(_arena: &'a Arena, _recv: Value<'a>, args: Value<'a>) -> Result<Value<'a>, Error<'a>> {
    let s = first_arg_str(args);
    Ok(Value::Uint(s.trim().parse().unwrap_or(0)))
}

fn cust<'a>(_arena: &'a Arena, _recv: Value<'a>, args: Value<'a>) -> Result<Value<'a>, Error<'a>> {
    let s = first_arg_str(args);
    Ok(Value::Float(s.trim().parse().unwrap_or(0.0)))
}

fn myfn1<'a>(_arena: &'a Arena, recv: Value<'a>, args: Value<'a>) -> Result<Value<'a>, Error<'a>> {
    if args.array_at(0).equals_str("9999") {
        return Err(Error::Message("fantastic"));
    }
    Ok(recv)
}

fn myfn2<'a>(_arena: &'a Arena, _recv: Value<'a>, args: Value<'a>) -> Result<Value<'a>, Error<'a>> {
    let mut sum = 0.0;
    for i in 0..args.array_len() {
        sum += args.array_at(i).to_f64();
    }
    Ok(Value::Float(sum))
}

fn resolve<'a>(arena: &'a Arena, this: Value<'a>, ident: Value<'a>) -> Result<Value<'a>, Error<'a>> {
    if this.is_global() {
        if ident.equals_str("numobj") {
            return Ok(Value::function(&numobj));
        }
        if ident.equals_str("i64") {
            return Ok(Value::function(&i64_fn));
        }
        if ident.equals_str("u64") {
            return Ok(Value::function(&u64_fn));
        }
        if ident.equals_str("cust") {
            return Ok(Value::function(&cust));
        }
        if ident.equals_str("custom_err") {
            return Err(Error::Message("ReferenceError: hiya"));
        }
        if ident.equals_str("howdy") {
            return Ok(Value::str("hiya"));
        }
        if ident.equals_str("user1") {
            return Ok(Value::object(None, 99));
        }
        if ident.equals_str("json") {
            return Value::json(arena, JSON_DOC);
        }
        if ident.equals_str("badj") {
            return Value::json(arena, "\"");
        }
        if ident.equals_str("noj") {
            return Value::json(arena, "");
        }
        if ident.equals_str("bigjson") {
            return Value::json(arena, "{\"a\":123456789012345678901234567890}");
        }
    } else {
        if ident.equals_str("myfn1") {
            return Ok(Value::function(&myfn1));
        }
        if ident.equals_str("myfn2") {
            return Ok(Value::function(&myfn2));
        }
        if this.object_tag() == 99 {
            if ident.equals_str("name") {
                return Ok(Value::str("andy"));
            }
            if ident.equals_str("age") {
                return Ok(Value::Float(51.0));
            }
            if ident.equals_str("err") {
                return Err(Error::Message("oh no"));
            }
        }
    }
    Ok(Value::Undefined)
}

/// Evaluate with the standard host environment, rendering the result (or
/// the error) to its string form.
pub fn eval_str(expr: &str) -> String {
    eval_str_with(expr, false)
}

/// Like [`eval_str`] with case-insensitive string comparison.
pub fn eval_str_nocase(expr: &str) -> String {
    eval_str_with(expr, true)
}

fn eval_str_with(expr: &str, no_case: bool) -> String {
    let arena = Arena::new();
    let env = Env {
        no_case,
        ref_fn: Some(&resolve),
        ..Env::default()
    };
    match eval(&arena, expr, &env) {
        Ok(v) => v.to_string(),
        Err(e) => e.to_string(),
    }
}

/// Assert an expression renders to the expected string under the standard
/// environment.
#[macro_export]
macro_rules! assert_eval {
    ($expr:expr, $expected:expr) => {
        assert_eq!(
            $crate::support::eval_str($expr),
            $expected,
            "expression: {}",
            $expr
        );
    };
}
