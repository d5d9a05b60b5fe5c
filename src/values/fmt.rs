//! Value stringification.
//!
//! Floats render with ECMAScript `Number::toString` notation: shortest
//! round-trip digits (via `ryu`) laid out in plain notation for decimal
//! exponents in `(-7, 21]` and as `d.ddde±X` outside that window, with the
//! `Infinity`/`-Infinity`/`NaN` spellings.

use core::fmt::{self, Write};

use crate::arena::Arena;
use crate::errors::Error;
use crate::values::Value;

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(t) => f.write_str(if *t { "true" } else { "false" }),
            Value::Float(x) => write_f64(f, *x),
            Value::Int(i) => write!(f, "{i}"),
            Value::Uint(u) => write!(f, "{u}"),
            Value::Str(s) => f.write_str(s),
            Value::Function(_) => f.write_str("[Function]"),
            Value::Object(_) => f.write_str("[Object]"),
            Value::Json(raw) => f.write_str(raw),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

/// Write `x` in JS notation.
pub(crate) fn write_f64<W: Write>(w: &mut W, x: f64) -> fmt::Result {
    if x.is_nan() {
        return w.write_str("NaN");
    }
    if x.is_infinite() {
        return w.write_str(if x > 0.0 { "Infinity" } else { "-Infinity" });
    }
    if x == 0.0 {
        return w.write_str("0");
    }
    if x < 0.0 {
        w.write_char('-')?;
        return write_f64(w, -x);
    }

    // Shortest digits from ryu, renotated per ECMA-262 Number::toString:
    // digits d1..dk with the decimal point after position n.
    let mut buf = ryu::Buffer::new();
    let shortest = buf.format_finite(x);
    let (mantissa, exp) = match shortest.split_once(['e', 'E']) {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (shortest, 0),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };

    let mut digits = [0u8; 32];
    let mut k = 0usize;
    for &b in int_part.as_bytes().iter().chain(frac_part.as_bytes()) {
        digits[k] = b;
        k += 1;
    }
    let mut n = int_part.len() as i32 + exp;
    let mut start = 0usize;
    while start < k && digits[start] == b'0' {
        start += 1;
        n -= 1;
    }
    while k > start && digits[k - 1] == b'0' {
        k -= 1;
    }
    let digits = core::str::from_utf8(&digits[start..k]).expect("ascii digits");
    let k = digits.len() as i32;

    if k <= n && n <= 21 {
        // Integral: digits followed by n-k zeros.
        w.write_str(digits)?;
        for _ in 0..(n - k) {
            w.write_char('0')?;
        }
        Ok(())
    } else if 0 < n && n <= 21 {
        let (head, tail) = digits.split_at(n as usize);
        w.write_str(head)?;
        w.write_char('.')?;
        w.write_str(tail)
    } else if -6 < n && n <= 0 {
        w.write_str("0.")?;
        for _ in 0..-n {
            w.write_char('0')?;
        }
        w.write_str(digits)
    } else {
        let (head, tail) = digits.split_at(1);
        w.write_str(head)?;
        if !tail.is_empty() {
            w.write_char('.')?;
            w.write_str(tail)?;
        }
        let e = n - 1;
        if e >= 0 {
            write!(w, "e+{e}")
        } else {
            write!(w, "e-{}", -e)
        }
    }
}

struct Counter(usize);

impl Write for Counter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

struct SliceWriter<'b> {
    dst: &'b mut [u8],
    at: usize,
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let b = s.as_bytes();
        if self.at + b.len() > self.dst.len() {
            return Err(fmt::Error);
        }
        self.dst[self.at..self.at + b.len()].copy_from_slice(b);
        self.at += b.len();
        Ok(())
    }
}

/// The string form of a value, borrowed when it already is a string,
/// arena-allocated otherwise (count first, then write into an exact-size
/// region).
pub(crate) fn to_str<'a>(arena: &'a Arena, value: Value<'a>) -> Result<&'a str, Error<'a>> {
    if let Value::Str(s) = value {
        return Ok(s);
    }
    let mut counter = Counter(0);
    write!(counter, "{value}").map_err(|_| Error::OutOfMemory)?;
    let dst = arena.try_alloc_bytes(counter.0)?;
    let mut writer = SliceWriter { dst, at: 0 };
    write!(writer, "{value}").map_err(|_| Error::OutOfMemory)?;
    let dst = writer.dst;
    // Display emits UTF-8 only.
    unsafe { Ok(core::str::from_utf8_unchecked(dst)) }
}

/// Arena-allocated string form of a value. Unlike [`to_str`], always copies,
/// so the result never aliases host data.
pub fn to_arena_str<'a>(arena: &'a Arena, value: Value<'a>) -> Result<&'a str, Error<'a>> {
    match value {
        Value::Str(s) => arena.try_copy_str(s),
        _ => to_str(arena, value),
    }
}
