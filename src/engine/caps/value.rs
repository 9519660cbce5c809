//! Field values carried by caps structures.
//!
//! Values mirror the small set of GStreamer value types the export code
//! needs: integers (optionally stepped ranges), fractions and their ranges,
//! bitmasks, booleans, strings and lists.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Rational number used for frame rates and pixel aspect ratios.
///
/// Equality and ordering compare the represented value, so `50/2 == 25/1`.
/// A zero denominator has no value: such fractions are equal only to each
/// other (`0/0 == 5/0`) and order after every finite fraction.
/// Serialized as a two element array `[num, denom]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Fraction {
    pub num: i32,
    pub denom: i32,
}

impl Fraction {
    pub const fn new(num: i32, denom: i32) -> Self {
        Self { num, denom }
    }

    /// Floating point value (0.0 when the denominator is zero)
    pub fn as_f64(&self) -> f64 {
        if self.denom == 0 {
            return 0.0;
        }
        self.num as f64 / self.denom as f64
    }

    fn cross(&self, other: &Fraction) -> (i64, i64) {
        // Normalise signs so the denominator is positive before cross-multiplying
        let (an, ad) = signed(self);
        let (bn, bd) = signed(other);
        (an * bd, bn * ad)
    }
}

fn signed(f: &Fraction) -> (i64, i64) {
    if f.denom < 0 {
        (-(f.num as i64), -(f.denom as i64))
    } else {
        (f.num as i64, f.denom as i64)
    }
}

impl PartialEq for Fraction {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Fraction {}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.denom == 0, other.denom == 0) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let (a, b) = self.cross(other);
                a.cmp(&b)
            }
        }
    }
}

impl From<(i32, i32)> for Fraction {
    fn from((num, denom): (i32, i32)) -> Self {
        Self::new(num, denom)
    }
}

impl From<Fraction> for (i32, i32) {
    fn from(f: Fraction) -> Self {
        (f.num, f.denom)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.denom)
    }
}

/// A single caps field value
#[derive(Debug, Clone, PartialEq)]
pub enum CapsValue {
    Int(i64),
    /// Inclusive integer range holding the multiples of `step` (1 for every integer)
    IntRange { min: i64, max: i64, step: i64 },
    Fraction(Fraction),
    /// Inclusive fraction range
    FractionRange { min: Fraction, max: Fraction },
    /// Fixed bit pattern, e.g. a raw audio `channel-mask`
    Bitmask(u64),
    Bool(bool),
    Str(String),
    /// Any one of the listed values
    List(Vec<CapsValue>),
}

impl CapsValue {
    /// Inclusive range of every integer between `min` and `max`
    pub const fn int_range(min: i64, max: i64) -> Self {
        CapsValue::IntRange { min, max, step: 1 }
    }

    /// Intersect two values, returning `None` when they have nothing in common
    pub fn intersect(&self, other: &CapsValue) -> Option<CapsValue> {
        use CapsValue::*;

        match (self, other) {
            (List(items), _) => intersect_list(items, other, false),
            (_, List(items)) => intersect_list(items, self, true),
            (Int(a), Int(b)) => (a == b).then_some(Int(*a)),
            (Int(v), IntRange { min, max, step }) | (IntRange { min, max, step }, Int(v)) => {
                (min <= v && v <= max && v.checked_rem_euclid(*step) == Some(0)).then_some(Int(*v))
            }
            (
                IntRange { min: amin, max: amax, step: astep },
                IntRange { min: bmin, max: bmax, step: bstep },
            ) => {
                let step = lcm(*astep, *bstep)?;
                let lo = round_up(*amin.max(bmin), step)?;
                let hi = round_down(*amax.min(bmax), step);
                match lo.cmp(&hi) {
                    Ordering::Greater => None,
                    Ordering::Equal => Some(Int(lo)),
                    Ordering::Less => Some(IntRange { min: lo, max: hi, step }),
                }
            }
            (Fraction(a), Fraction(b)) => (a == b).then_some(Fraction(*a)),
            (Fraction(v), FractionRange { min, max }) | (FractionRange { min, max }, Fraction(v)) => {
                (min <= v && v <= max).then_some(Fraction(*v))
            }
            (
                FractionRange { min: amin, max: amax },
                FractionRange { min: bmin, max: bmax },
            ) => {
                let lo = *amin.max(bmin);
                let hi = *amax.min(bmax);
                match lo.cmp(&hi) {
                    Ordering::Greater => None,
                    Ordering::Equal => Some(Fraction(lo)),
                    Ordering::Less => Some(FractionRange { min: lo, max: hi }),
                }
            }
            (Bitmask(a), Bitmask(b)) => (a == b).then_some(Bitmask(*a)),
            (Bool(a), Bool(b)) => (a == b).then_some(Bool(*a)),
            (Str(a), Str(b)) => (a == b).then(|| Str(a.clone())),
            _ => None,
        }
    }

    /// GStreamer type name used when rendering a cast
    pub fn type_name(&self) -> &'static str {
        match self {
            CapsValue::Int(_) | CapsValue::IntRange { .. } => "int",
            CapsValue::Fraction(_) | CapsValue::FractionRange { .. } => "fraction",
            CapsValue::Bitmask(_) => "bitmask",
            CapsValue::Bool(_) => "boolean",
            CapsValue::Str(_) => "string",
            CapsValue::List(items) => items.first().map(|v| v.type_name()).unwrap_or("string"),
        }
    }

    fn fmt_bare(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapsValue::Int(v) => write!(f, "{}", v),
            CapsValue::IntRange { min, max, step: 1 } => write!(f, "[ {}, {} ]", min, max),
            CapsValue::IntRange { min, max, step } => {
                write!(f, "[ {}, {}, {} ]", min, max, step)
            }
            CapsValue::Fraction(v) => write!(f, "{}", v),
            CapsValue::FractionRange { min, max } => write!(f, "[ {}, {} ]", min, max),
            CapsValue::Bitmask(v) => write!(f, "0x{:016x}", v),
            CapsValue::Bool(v) => write!(f, "{}", v),
            CapsValue::Str(s) => {
                if needs_quotes(s) {
                    write!(f, "\"{}\"", s.replace('"', "\\\""))
                } else {
                    write!(f, "{}", s)
                }
            }
            CapsValue::List(items) => {
                write!(f, "{{ ")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt_bare(f)?;
                }
                write!(f, " }}")
            }
        }
    }
}

/// `None` for a non-positive step or when the multiple overflows
fn lcm(a: i64, b: i64) -> Option<i64> {
    if a <= 0 || b <= 0 {
        return None;
    }
    let (mut x, mut y) = (a, b);
    while y != 0 {
        (x, y) = (y, x % y);
    }
    (a / x).checked_mul(b)
}

fn round_up(v: i64, step: i64) -> Option<i64> {
    match v.rem_euclid(step) {
        0 => Some(v),
        r => v.checked_add(step - r),
    }
}

fn round_down(v: i64, step: i64) -> i64 {
    v - v.rem_euclid(step)
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.chars()
            .any(|c| c.is_whitespace() || matches!(c, ',' | ';' | '=' | '[' | ']' | '{' | '}' | '"'))
}

/// `flipped` keeps the non-list operand on the left so scalar/range rules apply symmetrically
fn intersect_list(items: &[CapsValue], other: &CapsValue, flipped: bool) -> Option<CapsValue> {
    let mut out: Vec<CapsValue> = Vec::new();
    for item in items {
        let hit = if flipped {
            other.intersect(item)
        } else {
            item.intersect(other)
        };
        match hit {
            Some(CapsValue::List(nested)) => {
                for v in nested {
                    if !out.contains(&v) {
                        out.push(v);
                    }
                }
            }
            Some(v) => {
                if !out.contains(&v) {
                    out.push(v);
                }
            }
            None => {}
        }
    }

    match out.len() {
        0 => None,
        1 => out.pop(),
        _ => Some(CapsValue::List(out)),
    }
}

impl fmt::Display for CapsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.type_name())?;
        self.fmt_bare(f)
    }
}

impl From<i64> for CapsValue {
    fn from(v: i64) -> Self {
        CapsValue::Int(v)
    }
}

impl From<u32> for CapsValue {
    fn from(v: u32) -> Self {
        CapsValue::Int(v as i64)
    }
}

impl From<Fraction> for CapsValue {
    fn from(v: Fraction) -> Self {
        CapsValue::Fraction(v)
    }
}

impl From<&str> for CapsValue {
    fn from(v: &str) -> Self {
        CapsValue::Str(v.to_string())
    }
}
