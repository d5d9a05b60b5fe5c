//! Binary value combiners.
//!
//! Each combiner takes fully evaluated operands; error propagation happened
//! upstream. Same-kind numeric operands keep their kind (`Int`/`Uint`
//! arithmetic stays integral), everything else coerces through `f64`, per
//! JS semantics with the reference quirks (integer division or modulo by
//! zero is `NaN`, not a trap).

use crate::arena::Arena;
use crate::values::{fmt, Value};
use crate::EvalResult;

pub(crate) fn mul<'a>(a: Value<'a>, b: Value<'a>) -> Value<'a> {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => Value::Float(x * y),
        (Value::Int(x), Value::Int(y)) => Value::Int(x.wrapping_mul(y)),
        (Value::Uint(x), Value::Uint(y)) => Value::Uint(x.wrapping_mul(y)),
        _ => Value::Float(a.to_f64() * b.to_f64()),
    }
}

pub(crate) fn div<'a>(a: Value<'a>, b: Value<'a>) -> Value<'a> {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => Value::Float(x / y),
        (Value::Int(x), Value::Int(y)) => {
            if y == 0 {
                Value::Float(f64::NAN)
            } else {
                Value::Int(x.wrapping_div(y))
            }
        }
        (Value::Uint(x), Value::Uint(y)) => {
            if y == 0 {
                Value::Float(f64::NAN)
            } else {
                Value::Uint(x / y)
            }
        }
        _ => Value::Float(a.to_f64() / b.to_f64()),
    }
}

pub(crate) fn rem<'a>(a: Value<'a>, b: Value<'a>) -> Value<'a> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => {
            if y == 0 {
                Value::Float(f64::NAN)
            } else {
                Value::Int(x.wrapping_rem(y))
            }
        }
        (Value::Uint(x), Value::Uint(y)) => {
            if y == 0 {
                Value::Float(f64::NAN)
            } else {
                Value::Uint(x % y)
            }
        }
        _ => Value::Float(a.to_f64() % b.to_f64()),
    }
}

fn concat<'a>(arena: &'a Arena, a: &str, b: &str) -> EvalResult<'a> {
    let dst = arena.try_alloc_bytes(a.len() + b.len())?;
    dst[..a.len()].copy_from_slice(a.as_bytes());
    dst[a.len()..].copy_from_slice(b.as_bytes());
    Ok(Value::Str(unsafe {
        core::str::from_utf8_unchecked(dst)
    }))
}

/// `+`: numeric addition for number-like operands, string concatenation
/// (stringifying either side as needed) otherwise.
pub(crate) fn add<'a>(arena: &'a Arena, a: Value<'a>, b: Value<'a>) -> EvalResult<'a> {
    if a.same_kind(&b) {
        match (a, b) {
            (Value::Float(x), Value::Float(y)) => return Ok(Value::Float(x + y)),
            (Value::Int(x), Value::Int(y)) => return Ok(Value::Int(x.wrapping_add(y))),
            (Value::Uint(x), Value::Uint(y)) => return Ok(Value::Uint(x.wrapping_add(y))),
            (Value::Str(x), Value::Str(y)) => return concat(arena, x, y),
            (Value::Bool(_) | Value::Undefined | Value::Null, _) => {
                return Ok(Value::Float(a.to_f64() + b.to_f64()))
            }
            _ => {}
        }
    } else if a.is_numeric_like() && b.is_numeric_like() {
        return Ok(Value::Float(a.to_f64() + b.to_f64()));
    }
    let x = fmt::to_str(arena, a)?;
    let y = fmt::to_str(arena, b)?;
    concat(arena, x, y)
}

pub(crate) fn sub<'a>(a: Value<'a>, b: Value<'a>) -> Value<'a> {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => Value::Float(x - y),
        (Value::Int(x), Value::Int(y)) => Value::Int(x.wrapping_sub(y)),
        (Value::Uint(x), Value::Uint(y)) => Value::Uint(x.wrapping_sub(y)),
        _ => Value::Float(a.to_f64() - b.to_f64()),
    }
}

pub(crate) fn band<'a>(a: Value<'a>, b: Value<'a>) -> Value<'a> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(x & y),
        (Value::Uint(x), Value::Uint(y)) => Value::Uint(x & y),
        _ => Value::Float((a.to_i64() & b.to_i64()) as f64),
    }
}

pub(crate) fn bxor<'a>(a: Value<'a>, b: Value<'a>) -> Value<'a> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(x ^ y),
        (Value::Uint(x), Value::Uint(y)) => Value::Uint(x ^ y),
        _ => Value::Float((a.to_i64() ^ b.to_i64()) as f64),
    }
}

pub(crate) fn bor<'a>(a: Value<'a>, b: Value<'a>) -> Value<'a> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Value::Int(x | y),
        (Value::Uint(x), Value::Uint(y)) => Value::Uint(x | y),
        _ => Value::Float((a.to_i64() | b.to_i64()) as f64),
    }
}

fn str_less_insensitive(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let n = a.len().min(b.len());
    for i in 0..n {
        let x = a[i].to_ascii_lowercase();
        let y = b[i].to_ascii_lowercase();
        if x != y {
            return x < y;
        }
    }
    a.len() < b.len()
}

/// `<`: native ordering when kinds match and order (floats, ints, uints,
/// strings byte-wise or case-folded), `f64` ordering otherwise.
pub(crate) fn lt(a: Value<'_>, b: Value<'_>, no_case: bool) -> bool {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => x < y,
        (Value::Int(x), Value::Int(y)) => x < y,
        (Value::Uint(x), Value::Uint(y)) => x < y,
        (Value::Str(x), Value::Str(y)) => {
            if no_case {
                str_less_insensitive(x, y)
            } else {
                x.as_bytes() < y.as_bytes()
            }
        }
        _ => a.to_f64() < b.to_f64(),
    }
}

/// `<=` is `a<b || !(b<a)`. For a NaN on one side every ordering comes out
/// false, but NaN,NaN satisfies `!(b<a)` and compares `<=` (and `==`) true.
pub(crate) fn lte(a: Value<'_>, b: Value<'_>, no_case: bool) -> bool {
    lt(a, b, no_case) || !lt(b, a, no_case)
}

pub(crate) fn gt(a: Value<'_>, b: Value<'_>, no_case: bool) -> bool {
    lt(b, a, no_case)
}

pub(crate) fn gte(a: Value<'_>, b: Value<'_>, no_case: bool) -> bool {
    gt(a, b, no_case) || !gt(b, a, no_case)
}

/// Loose equality: same kind compares by ordering; mixed kinds compare as
/// doubles.
pub(crate) fn eq<'a>(a: Value<'a>, b: Value<'a>, no_case: bool) -> bool {
    if !a.same_kind(&b) {
        return a.to_f64() == b.to_f64();
    }
    !lt(a, b, no_case) && !lt(b, a, no_case)
}

/// Strict equality: kinds must match, then loose equality.
pub(crate) fn seq<'a>(a: Value<'a>, b: Value<'a>, no_case: bool) -> bool {
    a.same_kind(&b) && eq(a, b, no_case)
}

/// `??`: the left side unless it is nullish.
pub(crate) fn coalesce<'a>(a: Value<'a>, b: Value<'a>) -> Value<'a> {
    match a {
        Value::Undefined | Value::Null => b,
        _ => a,
    }
}
