//! Atoms and chain segments.
//!
//! An atom is a numeric literal, a quoted string, a parenthesized group, an
//! array literal, or an identifier. Strings, groups, and identifiers may be
//! followed by chain segments: `.ident`, `?.ident`, `[expr]` computed
//! access, and `(args)` calls.

use crate::errors::Error;
use crate::eval::ladder;
use crate::eval::scan::{as_str, parse_string, read_group, read_ident, trim};
use crate::eval::Context;
use crate::json;
use crate::values::{fmt, Value};
use crate::EvalResult;

/// Evaluate a comma-separated list into an arena slice (array literal
/// elements or call arguments).
fn eval_list<'c, 'a>(
    cx: &Context<'c, 'a>,
    expr: &'a [u8],
    depth: usize,
) -> Result<&'a [Value<'a>], Error<'a>> {
    let expr = trim(expr);
    if expr.is_empty() {
        return Ok(&[]);
    }
    // The list gets its own steps mask, with the comma level forced on so
    // every element reaches the sink.
    let sub = Context {
        arena: cx.arena,
        env: cx.env,
        steps: crate::eval::steps_mask(expr) | crate::eval::level_bit(crate::eval::LVL_COMMA),
    };
    let mut items = cx.arena.vec::<Value<'a>>();
    let mut sink = |v: Value<'a>| items.push(v);
    ladder::eval_expr_with_sink(&sub, expr, depth, &mut sink)?;
    Ok(items.into_slice())
}

/// Resolve a member or root identifier against the receiver.
///
/// JSON receivers project directly and never consult the host. Otherwise
/// the ref callback is invoked with the global sentinel (root) or the
/// receiver (chained). An undefined result on an undefined receiver is the
/// undefined-identifier error, downgraded to `Undefined` under `?.`; errors
/// the host itself returns always propagate.
fn get_ref<'c, 'a>(
    cx: &Context<'c, 'a>,
    chain: bool,
    left: Value<'a>,
    ident: &'a str,
    opt_chain: bool,
) -> EvalResult<'a> {
    if let Value::Json(raw) = left {
        return json::member(cx.arena, raw, ident);
    }
    let Some(ref_fn) = cx.env.ref_fn else {
        return Err(Error::Undefined {
            ident,
            chained: chain,
        });
    };
    let this = if chain { left } else { Value::global() };
    let val = ref_fn(cx.arena, this, Value::Str(ident))?;
    if val.is_undefined() && left.is_undefined() {
        if opt_chain {
            return Ok(Value::Undefined);
        }
        return Err(Error::Undefined {
            ident,
            chained: chain,
        });
    }
    Ok(val)
}

/// Parse an unsigned literal, requiring every byte to be a digit of
/// `radix`. Overflow saturates to `u64::MAX` rather than failing.
fn parse_u64_saturating(s: &str, radix: u32) -> Option<u64> {
    if s.is_empty() {
        return None;
    }
    let mut value: u64 = 0;
    let mut saturated = false;
    for b in s.bytes() {
        let digit = (b as char).to_digit(radix)?;
        if !saturated {
            match value
                .checked_mul(radix as u64)
                .and_then(|v| v.checked_add(digit as u64))
            {
                Some(v) => value = v,
                None => saturated = true,
            }
        }
    }
    Some(if saturated { u64::MAX } else { value })
}

/// Parse a signed decimal literal with an optional leading sign. Overflow
/// saturates to the `i64` extreme of the sign rather than failing.
fn parse_i64_saturating(s: &str) -> Option<i64> {
    let (neg, digits) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    if digits.is_empty() {
        return None;
    }
    // Accumulate negatively so i64::MIN parses without tripping the clamp.
    let mut value: i64 = 0;
    let mut saturated = false;
    for b in digits.bytes() {
        let digit = (b as char).to_digit(10)? as i64;
        if !saturated {
            match value.checked_mul(10).and_then(|v| v.checked_sub(digit)) {
                Some(v) => value = v,
                None => saturated = true,
            }
        }
    }
    if saturated {
        return Some(if neg { i64::MIN } else { i64::MAX });
    }
    if neg {
        Some(value)
    } else if value == i64::MIN {
        // A positive literal one past i64::MAX lands exactly on the
        // negative extreme; clamp it like any other overflow.
        Some(i64::MAX)
    } else {
        Some(-value)
    }
}

fn parse_number<'a>(expr: &'a [u8]) -> EvalResult<'a> {
    let s = as_str(expr);
    if expr.len() > 3 && s.ends_with("64") {
        match expr[expr.len() - 3] {
            b'u' => {
                let x = parse_u64_saturating(&s[..s.len() - 3], 10).ok_or(Error::Syntax)?;
                return Ok(Value::Uint(x));
            }
            b'i' => {
                let x = parse_i64_saturating(&s[..s.len() - 3]).ok_or(Error::Syntax)?;
                return Ok(Value::Int(x));
            }
            _ => {}
        }
    }
    let x = s.parse::<f64>().map_err(|_| Error::Syntax)?;
    Ok(Value::Float(x))
}

pub(crate) fn eval_atom<'c, 'a>(
    cx: &Context<'c, 'a>,
    expr: &'a [u8],
    depth: usize,
) -> EvalResult<'a> {
    let mut expr = trim(expr);
    if expr.is_empty() {
        return Err(Error::Syntax);
    }
    let mut left = Value::Undefined;
    let mut left_ready = false;

    // Non-chainable leads first: numbers return outright.
    match expr[0] {
        b'0' if expr.len() > 1 && (expr[1] == b'x' || expr[1] == b'X') => {
            let x = parse_u64_saturating(as_str(&expr[2..]), 16).ok_or(Error::Syntax)?;
            return Ok(Value::Float(x as f64));
        }
        b'0'..=b'9' | b'-' | b'.' => {
            return parse_number(expr);
        }
        b'"' | b'\'' => {
            let (s, consumed) = parse_string(cx.arena, expr)?;
            left = Value::Str(s);
            left_ready = true;
            expr = &expr[consumed..];
        }
        b'(' | b'{' | b'[' => {
            let g = read_group(expr).ok_or(Error::Syntax)?;
            match expr[0] {
                b'(' => {
                    left = ladder::eval_expr(cx, &g[1..g.len() - 1], depth)?;
                }
                b'[' => {
                    let items = eval_list(cx, &g[1..g.len() - 1], depth)?;
                    left = Value::Array(items);
                }
                // '{' is not allowed as a leading value.
                _ => return Err(Error::Syntax),
            }
            left_ready = true;
            let glen = g.len();
            expr = &expr[glen..];
        }
        _ => {}
    }

    let mut left_ident: &'a str = "";
    if !left_ready {
        let ident_bytes = read_ident(expr).ok_or(Error::Syntax)?;
        let ident = as_str(ident_bytes);
        left = match ident {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            "undefined" => Value::Undefined,
            "NaN" => Value::Float(f64::NAN),
            "Infinity" => Value::Float(f64::INFINITY),
            "in" | "new" | "void" | "await" | "yield" | "typeof" | "function" | "instanceof" => {
                return Err(Error::UnsupportedKeyword { ident });
            }
            _ => get_ref(cx, false, Value::Undefined, ident, false)?,
        };
        expr = &expr[ident.len()..];
        left_ident = ident;
    }

    // The receiver preceding `left`, passed to called functions.
    let mut receiver = Value::Undefined;
    // Once seen, `?.` stays in effect for the rest of the chain.
    let mut opt_chain = false;

    loop {
        expr = trim(expr);
        if expr.is_empty() {
            break;
        }
        match expr[0] {
            b'?' | b'.' => {
                if expr[0] == b'?' {
                    if expr.len() == 1 || expr[1] != b'.' {
                        return Err(Error::Syntax);
                    }
                    expr = &expr[1..];
                    opt_chain = true;
                }
                expr = trim(&expr[1..]);
                let ident_bytes = read_ident(expr).ok_or(Error::Syntax)?;
                let ident = as_str(ident_bytes);
                let val = get_ref(cx, true, left, ident, opt_chain)?;
                receiver = left;
                left = val;
                expr = &expr[ident.len()..];
                left_ident = ident;
            }
            b'(' => {
                let g = read_group(expr).ok_or(Error::Syntax)?;
                let Value::Function(func) = left else {
                    return Err(Error::NotAFunction { ident: left_ident });
                };
                let args = eval_list(cx, &g[1..g.len() - 1], depth)?;
                let val = func(cx.arena, receiver, Value::Array(args))?;
                receiver = left;
                left = val;
                let glen = g.len();
                expr = &expr[glen..];
            }
            b'[' => {
                let g = read_group(expr).ok_or(Error::Syntax)?;
                let key = ladder::eval_expr(cx, &g[1..g.len() - 1], depth)?;
                let ident = fmt::to_str(cx.arena, key)?;
                let val = get_ref(cx, true, left, ident, opt_chain)?;
                receiver = left;
                left = val;
                let glen = g.len();
                expr = &expr[glen..];
            }
            _ => return Err(Error::Syntax),
        }
    }
    Ok(left)
}
