//! Embeddable evaluator for JavaScript-subset expressions.
//!
//! `jsexpr` parses and evaluates an expression in a single pass, producing a
//! typed [`Value`]. Hosts supply variables, member lookups, and functions
//! through a reference callback; intermediate strings and arrays live in a
//! caller-owned [`Arena`] that is reset between evaluations.
//!
//! # Example
//!
//! ```
//! use jsexpr::{eval, Arena, Env};
//!
//! let arena = Arena::new();
//! let env = Env::default();
//! let result = eval(&arena, "1 + 2 * (10 * 20)", &env).unwrap();
//! assert_eq!(result.to_string(), "401");
//! ```
//!
//! # Host extension
//!
//! ```
//! use jsexpr::{eval, Arena, Env, Value};
//!
//! let arena = Arena::new();
//! let ref_fn = |_arena: &Arena, this: Value, ident: Value| {
//!     if this.is_global() && ident.equals_str("pi") {
//!         return Ok(Value::Float(std::f64::consts::PI));
//!     }
//!     Ok(Value::Undefined)
//! };
//! let env = Env {
//!     ref_fn: Some(&ref_fn),
//!     ..Env::default()
//! };
//! let result = eval(&arena, "pi > 3 && pi < 4", &env).unwrap();
//! assert_eq!(result, Value::Bool(true));
//! ```

pub mod arena;
pub mod errors;
pub mod eval;
pub mod json;
pub mod values;

pub use arena::{Arena, MemStats, DEFAULT_SLAB_SIZE};
pub use errors::Error;
pub use eval::{eval, Env, NativeFn, RefFn, DEFAULT_MAX_DEPTH};
pub use values::Value;

/// Shorthand for the result of every evaluation step.
pub type EvalResult<'a> = Result<Value<'a>, Error<'a>>;
