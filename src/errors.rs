//! Evaluation errors.
//!
//! Errors propagate by `Result` and abort the evaluation that produced them;
//! nothing is retried or recovered internally. The `Display` renderings are
//! stable text that existing callers match on, so they must not change.

use core::fmt;

use crate::arena::Arena;

/// An error produced while evaluating an expression, or returned by a host
/// callback.
///
/// Identifier and message payloads borrow either the expression text or the
/// evaluation arena, so an error lives no longer than the evaluation that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<'a> {
    /// Malformed input: bad escape, mismatched bracket, missing operand,
    /// illegal operator adjacency.
    Syntax,
    /// An arena allocation failed.
    OutOfMemory,
    /// An identifier did not resolve. `chained` marks a member access on an
    /// undefined receiver (rendered as a TypeError) as opposed to an unknown
    /// root variable (rendered as a ReferenceError).
    Undefined { ident: &'a str, chained: bool },
    /// Call syntax on a value that is not a function. The payload is the
    /// most recently read identifier.
    NotAFunction { ident: &'a str },
    /// A recognized reserved word appeared as an identifier.
    UnsupportedKeyword { ident: &'a str },
    /// Host-supplied message, or `MaxDepthError`. Rendered verbatim.
    Message(&'a str),
}

impl<'a> Error<'a> {
    /// Create a host error with a custom message, copying it into the arena.
    pub fn message(arena: &'a Arena, msg: &str) -> Error<'a> {
        match arena.try_copy_str(msg) {
            Ok(s) => Error::Message(s),
            Err(_) => Error::OutOfMemory,
        }
    }

    /// True if this error reports memory exhaustion.
    pub fn is_oom(&self) -> bool {
        matches!(self, Error::OutOfMemory)
    }
}

impl fmt::Display for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotAFunction { ident } => {
                write!(f, "TypeError: {ident} is not a function")
            }
            Error::UnsupportedKeyword { ident } => {
                write!(f, "SyntaxError: Unsupported keyword '{ident}'")
            }
            Error::Syntax => write!(f, "SyntaxError"),
            Error::Undefined { ident, chained } => {
                if *chained {
                    write!(
                        f,
                        "TypeError: Cannot read properties of undefined (reading '{ident}')"
                    )
                } else {
                    write!(f, "ReferenceError: Can't find variable: '{ident}'")
                }
            }
            Error::OutOfMemory => write!(f, "MemoryError: Out of memory"),
            Error::Message(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error<'_> {}

#[cfg(test)]
mod errors_test {
    use super::*;

    #[test]
    fn renderings_are_stable() {
        assert_eq!(Error::Syntax.to_string(), "SyntaxError");
        assert_eq!(
            Error::NotAFunction { ident: "howdy" }.to_string(),
            "TypeError: howdy is not a function"
        );
        assert_eq!(
            Error::UnsupportedKeyword { ident: "new" }.to_string(),
            "SyntaxError: Unsupported keyword 'new'"
        );
        assert_eq!(
            Error::Undefined {
                ident: "b",
                chained: true
            }
            .to_string(),
            "TypeError: Cannot read properties of undefined (reading 'b')"
        );
        assert_eq!(
            Error::Undefined {
                ident: "hello",
                chained: false
            }
            .to_string(),
            "ReferenceError: Can't find variable: 'hello'"
        );
        assert_eq!(Error::OutOfMemory.to_string(), "MemoryError: Out of memory");
        assert_eq!(Error::Message("MaxDepthError").to_string(), "MaxDepthError");
        assert_eq!(Error::Message("").to_string(), "");
    }

    #[test]
    fn oom_predicate() {
        assert!(Error::OutOfMemory.is_oom());
        assert!(!Error::Syntax.is_oom());
        assert!(!Error::Message("MemoryError: Out of memory").is_oom());
    }
}
