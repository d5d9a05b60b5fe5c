//! The precedence ladder.
//!
//! Every level shares one shape: scan the span left-to-right for this
//! level's operator bytes at depth zero (bracket groups and strings are
//! skipped whole), reduce the accumulated left side by handing each segment
//! to the next tighter level, and combine. A level whose bit is absent from
//! the prescanned steps mask is skipped without scanning.

use crate::errors::Error;
use crate::eval::scan::{is_ws, read_group, trim};
use crate::eval::{atom, ops, Context, Sink};
use crate::eval::{
    level_bit, LVL_BITWISE_AND, LVL_BITWISE_OR, LVL_BITWISE_XOR, LVL_COMMA, LVL_COMPS, LVL_COUNT,
    LVL_EQUALITY, LVL_LOGICAL_AND, LVL_LOGICAL_OR, LVL_SUMS, LVL_TERNS,
};
use crate::values::Value;
use crate::EvalResult;

// Strict-comparison operators are marked by offsetting the operator byte.
const STRICT: u8 = 32;

/// Enter a sub-expression: the only place depth increases.
pub(crate) fn eval_expr<'c, 'a>(cx: &Context<'c, 'a>, expr: &'a [u8], depth: usize) -> EvalResult<'a> {
    eval_from(cx, LVL_COMMA, expr, depth + 1, None)
}

/// Like [`eval_expr`], feeding every comma-level value to `sink` (array
/// literals and call arguments).
pub(crate) fn eval_expr_with_sink<'c, 'a>(
    cx: &Context<'c, 'a>,
    expr: &'a [u8],
    depth: usize,
    sink: Sink<'_, 'a>,
) -> EvalResult<'a> {
    eval_from(cx, LVL_COMMA, expr, depth + 1, Some(sink))
}

/// Dispatch to the first level at or below `level` that the steps mask says
/// can fire; the atom handles whatever remains.
fn eval_from<'c, 'a>(
    cx: &Context<'c, 'a>,
    level: usize,
    expr: &'a [u8],
    depth: usize,
    sink: Option<Sink<'_, 'a>>,
) -> EvalResult<'a> {
    if depth - 1 > cx.env.max_depth {
        return Err(Error::Message("MaxDepthError"));
    }
    for l in level..LVL_COUNT {
        if cx.steps & level_bit(l) == 0 {
            continue;
        }
        return match l {
            LVL_COMMA => eval_comma(cx, expr, depth, sink),
            LVL_TERNS => eval_terns(cx, expr, depth),
            LVL_LOGICAL_OR => eval_logical_or(cx, expr, depth),
            LVL_LOGICAL_AND => eval_logical_and(cx, expr, depth),
            LVL_BITWISE_OR => eval_bitwise_or(cx, expr, depth),
            LVL_BITWISE_XOR => eval_bitwise_xor(cx, expr, depth),
            LVL_BITWISE_AND => eval_bitwise_and(cx, expr, depth),
            LVL_EQUALITY => eval_equality(cx, expr, depth),
            LVL_COMPS => eval_comps(cx, expr, depth),
            LVL_SUMS => eval_sums(cx, expr, depth),
            _ => eval_facts(cx, expr, depth),
        };
    }
    atom::eval_atom(cx, expr, depth)
}

fn eval_comma<'c, 'a>(
    cx: &Context<'c, 'a>,
    expr: &'a [u8],
    depth: usize,
    mut sink: Option<Sink<'_, 'a>>,
) -> EvalResult<'a> {
    let len = expr.len();
    let mut s = 0;
    let mut i = 0;
    while i < len {
        match expr[i] {
            b',' => {
                let res = eval_from(cx, LVL_TERNS, &expr[s..i], depth, None)?;
                if let Some(sink) = sink.as_deref_mut() {
                    sink(res)?;
                }
                s = i + 1;
            }
            b'(' | b'[' | b'{' | b'"' | b'\'' => {
                let g = read_group(&expr[i..]).ok_or(Error::Syntax)?;
                i += g.len() - 1;
            }
            _ => {}
        }
        i += 1;
    }
    let res = eval_from(cx, LVL_TERNS, &expr[s..], depth, None)?;
    if let Some(sink) = sink.as_deref_mut() {
        sink(res)?;
    }
    Ok(res)
}

fn eval_terns<'c, 'a>(cx: &Context<'c, 'a>, expr: &'a [u8], depth: usize) -> EvalResult<'a> {
    let len = expr.len();
    let mut cond: &[u8] = &[];
    let mut s = 0;
    let mut tdepth = 0isize;
    let mut i = 0;
    while i < len {
        match expr[i] {
            b'?' => {
                if i + 1 < len && (expr[i + 1] == b'?' || expr[i + 1] == b'.') {
                    // '??' or '?.', not a ternary
                    i += 1;
                } else {
                    if tdepth == 0 {
                        cond = &expr[..i];
                        s = i + 1;
                    }
                    tdepth += 1;
                }
            }
            b':' => {
                tdepth -= 1;
                if tdepth == 0 {
                    let left = &expr[s..i];
                    let right = &expr[i + 1..];
                    let res = eval_expr(cx, cond, depth)?;
                    return if res.to_bool() {
                        eval_expr(cx, left, depth)
                    } else {
                        eval_expr(cx, right, depth)
                    };
                }
            }
            b'(' | b'[' | b'{' | b'"' | b'\'' => {
                let g = read_group(&expr[i..]).ok_or(Error::Syntax)?;
                i += g.len() - 1;
            }
            _ => {}
        }
        i += 1;
    }
    if tdepth == 0 {
        return eval_from(cx, LVL_TERNS + 1, expr, depth, None);
    }
    Err(Error::Syntax)
}

fn or_combine<'c, 'a>(
    cx: &Context<'c, 'a>,
    left: Value<'a>,
    op: u8,
    expr: &'a [u8],
    depth: usize,
) -> EvalResult<'a> {
    let expr = trim(expr);
    if expr.is_empty() {
        return Err(Error::Syntax);
    }
    match op {
        b'|' => {
            if left.to_bool() {
                return Ok(Value::Bool(true));
            }
            let right = eval_from(cx, LVL_LOGICAL_OR + 1, expr, depth, None)?;
            Ok(Value::Bool(right.to_bool()))
        }
        b'?' => {
            if !matches!(left, Value::Undefined | Value::Null) {
                return Ok(left);
            }
            let right = eval_from(cx, LVL_LOGICAL_OR + 1, expr, depth, None)?;
            Ok(ops::coalesce(left, right))
        }
        _ => eval_from(cx, LVL_LOGICAL_OR + 1, expr, depth, None),
    }
}

fn eval_logical_or<'c, 'a>(cx: &Context<'c, 'a>, expr: &'a [u8], depth: usize) -> EvalResult<'a> {
    let len = expr.len();
    let mut s = 0;
    let mut left = Value::Undefined;
    let mut op = 0u8;
    let mut i = 0;
    while i < len {
        match expr[i] {
            b'?' if i + 1 < len && expr[i + 1] == b'.' => {
                // optional chaining, handled at the atom
                i += 1;
            }
            b'?' | b'|' => {
                if i + 1 == len {
                    return Err(Error::Syntax);
                }
                if expr[i + 1] != expr[i] {
                    // single '|': bitwise; single '?': ternary
                    i += 1;
                } else {
                    left = or_combine(cx, left, op, &expr[s..i], depth)?;
                    op = expr[i];
                    i += 1;
                    s = i + 1;
                }
            }
            b'(' | b'[' | b'{' | b'"' | b'\'' => {
                let g = read_group(&expr[i..]).ok_or(Error::Syntax)?;
                i += g.len() - 1;
            }
            _ => {}
        }
        i += 1;
    }
    or_combine(cx, left, op, &expr[s..], depth)
}

fn and_combine<'c, 'a>(
    cx: &Context<'c, 'a>,
    left: Value<'a>,
    op: u8,
    expr: &'a [u8],
    depth: usize,
) -> EvalResult<'a> {
    let expr = trim(expr);
    if expr.is_empty() {
        return Err(Error::Syntax);
    }
    match op {
        b'&' => {
            if !left.to_bool() {
                return Ok(Value::Bool(false));
            }
            let right = eval_from(cx, LVL_LOGICAL_AND + 1, expr, depth, None)?;
            Ok(Value::Bool(right.to_bool()))
        }
        _ => eval_from(cx, LVL_LOGICAL_AND + 1, expr, depth, None),
    }
}

fn eval_logical_and<'c, 'a>(cx: &Context<'c, 'a>, expr: &'a [u8], depth: usize) -> EvalResult<'a> {
    let len = expr.len();
    let mut s = 0;
    let mut left = Value::Undefined;
    let mut op = 0u8;
    let mut i = 0;
    while i < len {
        match expr[i] {
            b'&' => {
                if i + 1 == len {
                    return Err(Error::Syntax);
                }
                if expr[i + 1] != b'&' {
                    // single '&': bitwise
                    i += 1;
                } else {
                    left = and_combine(cx, left, op, &expr[s..i], depth)?;
                    op = b'&';
                    i += 1;
                    s = i + 1;
                }
            }
            b'(' | b'[' | b'{' | b'"' | b'\'' => {
                let g = read_group(&expr[i..]).ok_or(Error::Syntax)?;
                i += g.len() - 1;
            }
            _ => {}
        }
        i += 1;
    }
    and_combine(cx, left, op, &expr[s..], depth)
}

// The three bitwise levels share their shape; only the operator byte and
// the combiner differ.
macro_rules! bitwise_level {
    ($scan:ident, $combine:ident, $opch:expr, $level:expr, $apply:path) => {
        fn $combine<'c, 'a>(
            cx: &Context<'c, 'a>,
            left: Value<'a>,
            op: u8,
            expr: &'a [u8],
            depth: usize,
        ) -> EvalResult<'a> {
            let expr = trim(expr);
            if expr.is_empty() {
                return Err(Error::Syntax);
            }
            let right = eval_from(cx, $level + 1, expr, depth, None)?;
            if op == $opch {
                Ok($apply(left, right))
            } else {
                Ok(right)
            }
        }

        fn $scan<'c, 'a>(cx: &Context<'c, 'a>, expr: &'a [u8], depth: usize) -> EvalResult<'a> {
            let len = expr.len();
            let mut s = 0;
            let mut left = Value::Undefined;
            let mut op = 0u8;
            let mut i = 0;
            while i < len {
                match expr[i] {
                    b if b == $opch => {
                        left = $combine(cx, left, op, &expr[s..i], depth)?;
                        op = b;
                        s = i + 1;
                    }
                    b'(' | b'[' | b'{' | b'"' | b'\'' => {
                        let g = read_group(&expr[i..]).ok_or(Error::Syntax)?;
                        i += g.len() - 1;
                    }
                    _ => {}
                }
                i += 1;
            }
            $combine(cx, left, op, &expr[s..], depth)
        }
    };
}

bitwise_level!(eval_bitwise_or, bor_combine, b'|', LVL_BITWISE_OR, ops::bor);
bitwise_level!(eval_bitwise_xor, bxor_combine, b'^', LVL_BITWISE_XOR, ops::bxor);
bitwise_level!(eval_bitwise_and, band_combine, b'&', LVL_BITWISE_AND, ops::band);

fn eq_combine<'c, 'a>(
    cx: &Context<'c, 'a>,
    left: Value<'a>,
    op: u8,
    expr: &'a [u8],
    depth: usize,
) -> EvalResult<'a> {
    let mut expr = trim(expr);
    let mut neg = false;
    let mut boolify = false;
    // Leading '!' runs toggle negation and force the operand to a boolean.
    loop {
        if expr.is_empty() {
            return Err(Error::Syntax);
        }
        if expr[0] != b'!' {
            break;
        }
        neg = !neg;
        boolify = true;
        expr = trim(&expr[1..]);
    }
    let mut right = eval_from(cx, LVL_EQUALITY + 1, expr, depth, None)?;
    if boolify {
        let mut t = right.to_bool();
        if neg {
            t = !t;
        }
        right = Value::Bool(t);
    }
    let no_case = cx.env.no_case;
    match op {
        b'=' => Ok(Value::Bool(ops::eq(left, right, no_case))),
        b'!' => Ok(Value::Bool(!ops::eq(left, right, no_case))),
        x if x == b'=' + STRICT => Ok(Value::Bool(ops::seq(left, right, no_case))),
        x if x == b'!' + STRICT => Ok(Value::Bool(!ops::seq(left, right, no_case))),
        _ => Ok(right),
    }
}

fn eval_equality<'c, 'a>(cx: &Context<'c, 'a>, expr: &'a [u8], depth: usize) -> EvalResult<'a> {
    let len = expr.len();
    let mut s = 0;
    let mut left = Value::Undefined;
    let mut op = 0u8;
    let mut i = 0;
    while i < len {
        match expr[i] {
            b'=' | b'!' => {
                let mut opch = expr[i];
                let mut opsz = 1;
                if opch == b'=' {
                    if i > 0 && (expr[i - 1] == b'>' || expr[i - 1] == b'<') {
                        // tail of '>=' or '<='
                        i += 1;
                        continue;
                    }
                    if i == len - 1 || expr[i + 1] != b'=' {
                        return Err(Error::Syntax);
                    }
                    opsz += 1;
                } else {
                    if i == len - 1 || expr[i + 1] != b'=' {
                        // prefix negation, consumed by the combiner
                        i += 1;
                        continue;
                    }
                    opsz += 1;
                }
                if i + 2 < len && expr[i + 2] == b'=' {
                    opch += STRICT;
                    opsz += 1;
                }
                left = eq_combine(cx, left, op, &expr[s..i], depth)?;
                op = opch;
                i += opsz - 1;
                s = i + 1;
            }
            b'(' | b'[' | b'{' | b'"' | b'\'' => {
                let g = read_group(&expr[i..]).ok_or(Error::Syntax)?;
                i += g.len() - 1;
            }
            _ => {}
        }
        i += 1;
    }
    eq_combine(cx, left, op, &expr[s..], depth)
}

fn comp_combine<'c, 'a>(
    cx: &Context<'c, 'a>,
    left: Value<'a>,
    op: u8,
    expr: &'a [u8],
    depth: usize,
) -> EvalResult<'a> {
    let expr = trim(expr);
    if expr.is_empty() {
        return Err(Error::Syntax);
    }
    let right = eval_from(cx, LVL_COMPS + 1, expr, depth, None)?;
    let no_case = cx.env.no_case;
    match op {
        b'<' => Ok(Value::Bool(ops::lt(left, right, no_case))),
        b'>' => Ok(Value::Bool(ops::gt(left, right, no_case))),
        x if x == b'<' + STRICT => Ok(Value::Bool(ops::lte(left, right, no_case))),
        x if x == b'>' + STRICT => Ok(Value::Bool(ops::gte(left, right, no_case))),
        _ => Ok(right),
    }
}

fn eval_comps<'c, 'a>(cx: &Context<'c, 'a>, expr: &'a [u8], depth: usize) -> EvalResult<'a> {
    let len = expr.len();
    let mut s = 0;
    let mut left = Value::Undefined;
    let mut op = 0u8;
    let mut i = 0;
    while i < len {
        match expr[i] {
            b'<' | b'>' => {
                let mut opch = expr[i];
                let mut opsz = 1;
                if i < len - 1 && expr[i + 1] == b'=' {
                    opch += STRICT;
                    opsz += 1;
                }
                left = comp_combine(cx, left, op, &expr[s..i], depth)?;
                op = opch;
                i += opsz - 1;
                s = i + 1;
            }
            b'(' | b'[' | b'{' | b'"' | b'\'' => {
                let g = read_group(&expr[i..]).ok_or(Error::Syntax)?;
                i += g.len() - 1;
            }
            _ => {}
        }
        i += 1;
    }
    comp_combine(cx, left, op, &expr[s..], depth)
}

fn sum_combine<'c, 'a>(
    cx: &Context<'c, 'a>,
    left: Value<'a>,
    op: u8,
    expr: &'a [u8],
    neg: bool,
    depth: usize,
) -> EvalResult<'a> {
    let expr = trim(expr);
    if expr.is_empty() {
        return Err(Error::Syntax);
    }
    let mut right = eval_from(cx, LVL_SUMS + 1, expr, depth, None)?;
    if neg {
        right = ops::mul(right, Value::Float(-1.0));
    }
    match op {
        b'+' => ops::add(cx.arena, left, right),
        b'-' => Ok(ops::sub(left, right)),
        _ => Ok(right),
    }
}

fn eval_sums<'c, 'a>(cx: &Context<'c, 'a>, expr: &'a [u8], depth: usize) -> EvalResult<'a> {
    let len = expr.len();
    let mut s = 0;
    let mut left = Value::Undefined;
    let mut op = 0u8;
    // `fill` marks that the current segment has operand content, so a sign
    // is an operator rather than a prefix.
    let mut fill = false;
    let mut neg = false;
    let mut i = 0;
    while i < len {
        match expr[i] {
            b'-' | b'+' => {
                if !fill {
                    if i > 0 && expr[i - 1] == expr[i] {
                        // '--' and '++' are not supported
                        return Err(Error::Syntax);
                    }
                    if expr[i] == b'-' {
                        neg = !neg;
                    }
                    s = i + 1;
                } else if i > 0 && (expr[i - 1] == b'e' || expr[i - 1] == b'E') {
                    // exponent sign inside a numeric literal
                } else {
                    // Fold a '-' directly abutting a digit back into the
                    // literal, so it keeps its sign through parsing.
                    if neg && s > 0 && s < len && expr[s - 1] == b'-' && expr[s].is_ascii_digit() {
                        s -= 1;
                        neg = false;
                    }
                    left = sum_combine(cx, left, op, &expr[s..i], neg, depth)?;
                    op = expr[i];
                    s = i + 1;
                    fill = false;
                    neg = false;
                }
            }
            b'(' | b'[' | b'{' | b'"' | b'\'' => {
                let g = read_group(&expr[i..]).ok_or(Error::Syntax)?;
                i += g.len() - 1;
                fill = true;
            }
            b => {
                if !fill && !is_ws(b) {
                    fill = true;
                }
            }
        }
        i += 1;
    }
    if neg && s > 0 && s < len && expr[s - 1] == b'-' && expr[s].is_ascii_digit() {
        s -= 1;
        neg = false;
    }
    sum_combine(cx, left, op, &expr[s..], neg, depth)
}

fn fact_combine<'c, 'a>(
    cx: &Context<'c, 'a>,
    left: Value<'a>,
    op: u8,
    expr: &'a [u8],
    depth: usize,
) -> EvalResult<'a> {
    let expr = trim(expr);
    if expr.is_empty() {
        return Err(Error::Syntax);
    }
    let right = atom::eval_atom(cx, expr, depth)?;
    match op {
        b'*' => Ok(ops::mul(left, right)),
        b'/' => Ok(ops::div(left, right)),
        b'%' => Ok(ops::rem(left, right)),
        _ => Ok(right),
    }
}

fn eval_facts<'c, 'a>(cx: &Context<'c, 'a>, expr: &'a [u8], depth: usize) -> EvalResult<'a> {
    let len = expr.len();
    let mut s = 0;
    let mut left = Value::Undefined;
    let mut op = 0u8;
    let mut i = 0;
    while i < len {
        match expr[i] {
            b'*' | b'/' | b'%' => {
                left = fact_combine(cx, left, op, &expr[s..i], depth)?;
                op = expr[i];
                s = i + 1;
            }
            b'(' | b'[' | b'{' | b'"' | b'\'' => {
                let g = read_group(&expr[i..]).ok_or(Error::Syntax)?;
                i += g.len() - 1;
            }
            _ => {}
        }
        i += 1;
    }
    fact_combine(cx, left, op, &expr[s..], depth)
}
