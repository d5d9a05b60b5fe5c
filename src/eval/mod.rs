//! Single-pass expression evaluation.
//!
//! There is no tokenizer and no syntax tree: evaluation is a stack of
//! precedence levels invoked top-down, each scanning the expression bytes
//! left-to-right for its own operator characters (strings and bracket groups
//! are skipped as opaque spans). When a level finds one of its operators it
//! reduces the left side by handing the sub-span to the next tighter level,
//! remembers the operator, and keeps scanning; the atom level at the bottom
//! evaluates literals, groups, identifiers, and chains.
//!
//! Before evaluation starts, one pass over the input ORs together the
//! precedence levels each byte could terminate (the *steps mask*), letting
//! every level that cannot possibly fire skip itself without scanning.
//!
//! ## Design principles
//!
//! - **Never panic**: adversarial input produces a syntax error, not a crash.
//! - **Errors abort**: the first error unwinds the whole ladder by `?`.
//! - **Depth-bounded**: true sub-expression recursion (parens, array
//!   elements, call arguments, computed keys, ternary branches) is counted
//!   and capped; level descent within the ladder is not.

mod atom;
mod ladder;
mod ops;
mod scan;


use crate::arena::Arena;
use crate::errors::Error;
use crate::values::Value;
use crate::EvalResult;

/// Default maximum sub-expression recursion depth.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Host callback resolving identifiers and member accesses.
///
/// Invoked as `ref_fn(arena, this, ident)`: `this` is the global sentinel
/// for a root variable lookup (check with [`Value::is_global`]) or the
/// receiver for a property access; `ident` is a `Str` value. Return
/// `Ok(Value::Undefined)` for "unknown"; an `Err` aborts the evaluation.
pub type RefFn<'a> = dyn Fn(&'a Arena, Value<'a>, Value<'a>) -> EvalResult<'a> + 'a;

/// Host function invoked by call syntax.
///
/// Invoked as `func(arena, receiver, args)`: `receiver` is the value the
/// function was plucked off of (`a` in `a.b(…)`, `Undefined` for a root
/// call) and `args` is an `Array` value of the evaluated arguments.
pub type NativeFn<'a> = dyn Fn(&'a Arena, Value<'a>, Value<'a>) -> EvalResult<'a> + 'a;

/// Evaluation environment.
pub struct Env<'a> {
    /// Compare strings case-insensitively (ASCII).
    pub no_case: bool,
    /// Maximum sub-expression recursion depth.
    pub max_depth: usize,
    /// Identifier/member resolver. `None` means every identifier is
    /// undefined.
    pub ref_fn: Option<&'a RefFn<'a>>,
}

impl Default for Env<'_> {
    fn default() -> Self {
        Self {
            no_case: false,
            max_depth: DEFAULT_MAX_DEPTH,
            ref_fn: None,
        }
    }
}

/// Evaluate an expression.
///
/// All intermediate strings and arrays are carved from `arena`; the result
/// borrows it (and possibly `expr` itself). Blank input evaluates to
/// `Undefined`.
///
/// # Example
///
/// ```
/// use jsexpr::{eval, Arena, Env, Value};
///
/// let arena = Arena::new();
/// let v = eval(&arena, "(1 < 2 && 3 > 2) + 10", &Env::default()).unwrap();
/// assert_eq!(v, Value::Float(11.0));
/// ```
pub fn eval<'a>(arena: &'a Arena, expr: &'a str, env: &Env<'a>) -> EvalResult<'a> {
    let bytes = scan::trim(expr.as_bytes());
    if bytes.is_empty() {
        return Ok(Value::Undefined);
    }
    let cx = Context {
        arena,
        env,
        steps: steps_mask(bytes),
    };
    ladder::eval_expr(&cx, bytes, 0)
}

/// Per-evaluation state threaded through the ladder.
pub(crate) struct Context<'c, 'a> {
    pub(crate) arena: &'a Arena,
    pub(crate) env: &'c Env<'a>,
    pub(crate) steps: u16,
}

/// Sink fed by the comma level when collecting array literals or call
/// arguments.
pub(crate) type Sink<'s, 'a> = &'s mut dyn FnMut(Value<'a>) -> Result<(), Error<'a>>;

// Precedence levels, loosest first. Each entry is the level's bit in the
// steps mask; the atom sits below the last level.
pub(crate) const LVL_COMMA: usize = 0;
pub(crate) const LVL_TERNS: usize = 1;
pub(crate) const LVL_LOGICAL_OR: usize = 2;
pub(crate) const LVL_LOGICAL_AND: usize = 3;
pub(crate) const LVL_BITWISE_OR: usize = 4;
pub(crate) const LVL_BITWISE_XOR: usize = 5;
pub(crate) const LVL_BITWISE_AND: usize = 6;
pub(crate) const LVL_EQUALITY: usize = 7;
pub(crate) const LVL_COMPS: usize = 8;
pub(crate) const LVL_SUMS: usize = 9;
pub(crate) const LVL_FACTS: usize = 10;
pub(crate) const LVL_COUNT: usize = 11;

pub(crate) const fn level_bit(level: usize) -> u16 {
    1 << level
}

/// The precedence levels a byte could terminate a scan at.
fn step_bits(b: u8) -> u16 {
    match b {
        b',' => level_bit(LVL_COMMA),
        b'?' => level_bit(LVL_TERNS) | level_bit(LVL_LOGICAL_OR), // '?:' '??'
        b':' => level_bit(LVL_TERNS),
        b'|' => level_bit(LVL_LOGICAL_OR) | level_bit(LVL_BITWISE_OR), // '||' '|'
        b'&' => level_bit(LVL_LOGICAL_AND) | level_bit(LVL_BITWISE_AND), // '&&' '&'
        b'^' => level_bit(LVL_BITWISE_XOR),
        b'=' => level_bit(LVL_COMPS) | level_bit(LVL_EQUALITY), // '==' '<=' '>='
        b'!' => level_bit(LVL_EQUALITY),                        // '!' '!='
        b'<' | b'>' => level_bit(LVL_COMPS),
        b'+' | b'-' => level_bit(LVL_SUMS),
        b'*' | b'/' | b'%' => level_bit(LVL_FACTS),
        _ => 0,
    }
}

/// Prescan the whole input once, ORing together every level that could
/// possibly fire.
pub(crate) fn steps_mask(expr: &[u8]) -> u16 {
    expr.iter().fold(0, |mask, &b| mask | step_bits(b))
}
