//! Lazy JSON projection.
//!
//! JSON values hold a raw fragment of host-owned text. Scalars materialize
//! into ordinary values at construction; objects and arrays stay raw and are
//! walked lazily on member access with `serde_json`'s [`RawValue`], so a
//! lookup touches only the prefix of the document it needs and borrows the
//! matched fragment instead of copying it.

use core::fmt;

use serde::de::{IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde_json::value::RawValue;

use crate::arena::Arena;
use crate::errors::Error;
use crate::values::convert;
use crate::values::Value;

fn trim(text: &str) -> &str {
    text.trim_matches([' ', '\t', '\n', '\r'])
}

/// Classify a JSON fragment into a value.
///
/// Strings unescape (into the arena when escapes are present, borrowed
/// otherwise), numbers become floats, `true`/`false`/`null` become their
/// value kinds, and objects/arrays stay raw as [`Value::Json`]. Blank input
/// is `Undefined`; a malformed string fragment degrades to its quoted body.
pub(crate) fn classify<'a>(arena: &'a Arena, text: &'a str) -> Result<Value<'a>, Error<'a>> {
    let t = trim(text);
    let Some(&first) = t.as_bytes().first() else {
        return Ok(Value::Undefined);
    };
    match first {
        b'{' | b'[' => Ok(Value::Json(t)),
        b'"' => classify_string(arena, t),
        b't' | b'f' => {
            if t.starts_with("true") {
                Ok(Value::Bool(true))
            } else if t.starts_with("false") {
                Ok(Value::Bool(false))
            } else {
                Ok(Value::Json(t))
            }
        }
        b'n' => {
            if t.starts_with("null") {
                Ok(Value::Null)
            } else {
                Ok(Value::Json(t))
            }
        }
        b'0'..=b'9' | b'-' | b'+' | b'.' => Ok(Value::Float(parse_f64_prefix(t))),
        _ => Ok(Value::Json(t)),
    }
}

fn classify_string<'a>(arena: &'a Arena, t: &'a str) -> Result<Value<'a>, Error<'a>> {
    // Escape-free strings borrow the body directly.
    if let Ok(s) = serde_json::from_str::<&str>(t) {
        return Ok(Value::Str(s));
    }
    if let Ok(s) = serde_json::from_str::<String>(t) {
        return Ok(Value::Str(arena.try_copy_str(&s)?));
    }
    // Truncated or bare-quote fragment: degrade to the quoted body.
    let inner = &t[1..];
    Ok(Value::Str(inner.strip_suffix('"').unwrap_or(inner)))
}

/// Member access on a JSON fragment.
///
/// Objects are scanned lazily, first match wins. Arrays accept a key that
/// converts to a nonnegative integer index. A miss is `Undefined` — the host
/// ref callback is never consulted for JSON receivers.
pub(crate) fn member<'a>(
    arena: &'a Arena,
    raw: &'a str,
    key: &str,
) -> Result<Value<'a>, Error<'a>> {
    let t = trim(raw);
    match t.as_bytes().first() {
        Some(b'{') => match lookup_object(t, key) {
            Some(found) => classify(arena, found.get()),
            None => Ok(Value::Undefined),
        },
        Some(b'[') => {
            let index = convert::conv_atoi(key);
            if index < 0 {
                return Ok(Value::Undefined);
            }
            match lookup_index(t, index as usize) {
                Some(found) => classify(arena, found.get()),
                None => Ok(Value::Undefined),
            }
        }
        _ => Ok(Value::Undefined),
    }
}

/// Numeric coercion for a raw fragment: an empty array is 0, a one-element
/// array converts through its sole element, everything else follows the
/// scalar rules (objects and longer arrays are NaN).
pub(crate) fn to_f64(raw: &str) -> f64 {
    let t = trim(raw);
    let Some(&first) = t.as_bytes().first() else {
        return f64::NAN;
    };
    match first {
        b'[' => match probe_array(t) {
            ArrayShape::Empty => 0.0,
            ArrayShape::Single(first) => to_f64(first.get()),
            ArrayShape::Many | ArrayShape::Invalid => f64::NAN,
        },
        b'{' => f64::NAN,
        b'"' => match serde_json::from_str::<String>(t) {
            Ok(s) => convert::conv_atof(&s),
            Err(_) => f64::NAN,
        },
        b't' => {
            if t.starts_with("true") {
                1.0
            } else {
                f64::NAN
            }
        }
        b'f' => {
            if t.starts_with("false") {
                0.0
            } else {
                f64::NAN
            }
        }
        b'n' => {
            if t.starts_with("null") {
                0.0
            } else {
                f64::NAN
            }
        }
        b'0'..=b'9' | b'-' | b'+' | b'.' => parse_f64_prefix(t),
        _ => f64::NAN,
    }
}

/// Longest-numeric-prefix parse (strtod-style), NaN when no prefix parses.
fn parse_f64_prefix(s: &str) -> f64 {
    let bytes = s.as_bytes();
    let mut end = 0;
    while end < bytes.len()
        && (bytes[end].is_ascii_digit() || matches!(bytes[end], b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        end += 1;
    }
    let mut end = end;
    while end > 0 {
        if let Ok(x) = s[..end].parse::<f64>() {
            return x;
        }
        end -= 1;
    }
    f64::NAN
}

fn lookup_object<'de>(raw: &'de str, key: &str) -> Option<&'de RawValue> {
    let mut de = serde_json::Deserializer::from_str(raw);
    serde::Deserializer::deserialize_map(&mut de, MemberLookup { key }).unwrap_or(None)
}

fn lookup_index<'de>(raw: &'de str, index: usize) -> Option<&'de RawValue> {
    let mut de = serde_json::Deserializer::from_str(raw);
    serde::Deserializer::deserialize_seq(&mut de, IndexLookup { index }).unwrap_or(None)
}

enum ArrayShape<'de> {
    Empty,
    Single(&'de RawValue),
    Many,
    Invalid,
}

fn probe_array(raw: &str) -> ArrayShape<'_> {
    let mut de = serde_json::Deserializer::from_str(raw);
    serde::Deserializer::deserialize_seq(&mut de, ArrayProbe).unwrap_or(ArrayShape::Invalid)
}

struct MemberLookup<'k> {
    key: &'k str,
}

impl<'de> Visitor<'de> for MemberLookup<'_> {
    type Value = Option<&'de RawValue>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
        while let Some(k) = map.next_key::<String>()? {
            if k == self.key {
                return map.next_value::<&RawValue>().map(Some);
            }
            map.next_value::<IgnoredAny>()?;
        }
        Ok(None)
    }
}

struct IndexLookup {
    index: usize,
}

impl<'de> Visitor<'de> for IndexLookup {
    type Value = Option<&'de RawValue>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON array")
    }

    fn visit_seq<S: SeqAccess<'de>>(self, mut seq: S) -> Result<Self::Value, S::Error> {
        let mut at = 0;
        while let Some(raw) = seq.next_element::<&RawValue>()? {
            if at == self.index {
                return Ok(Some(raw));
            }
            at += 1;
        }
        Ok(None)
    }
}

struct ArrayProbe;

impl<'de> Visitor<'de> for ArrayProbe {
    type Value = ArrayShape<'de>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON array")
    }

    fn visit_seq<S: SeqAccess<'de>>(self, mut seq: S) -> Result<Self::Value, S::Error> {
        let Some(first) = seq.next_element::<&RawValue>()? else {
            return Ok(ArrayShape::Empty);
        };
        if seq.next_element::<IgnoredAny>()?.is_some() {
            return Ok(ArrayShape::Many);
        }
        Ok(ArrayShape::Single(first))
    }
}
