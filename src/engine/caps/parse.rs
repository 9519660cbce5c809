//! Parser for the textual caps syntax.
//!
//! Accepts both the terse form used when building caps by hand
//! (`video/x-raw-yuv,width=720,framerate=25/1`) and the typed form produced
//! by `Display` (`video/x-raw-yuv, width=(int)720, framerate=(fraction)25/1`).

use std::str::FromStr;
use thiserror::Error;

use super::value::{CapsValue, Fraction};
use super::{Caps, Structure};

#[derive(Debug, Error, PartialEq)]
pub enum CapsParseError {
    #[error("caps string is empty")]
    EmptyInput,

    #[error("structure '{0}' has no media type name")]
    MissingName(String),

    #[error("field '{0}' has no value")]
    MissingValue(String),

    #[error("field '{field}' has invalid value '{value}'")]
    InvalidValue { field: String, value: String },

    #[error("unterminated group in '{0}'")]
    Unterminated(String),
}

pub(super) fn parse_caps(input: &str) -> Result<Caps, CapsParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CapsParseError::EmptyInput);
    }
    match trimmed {
        "ANY" => return Ok(Caps::Any),
        "EMPTY" | "NONE" => return Ok(Caps::empty()),
        _ => {}
    }

    let mut structures = Vec::new();
    for part in split_top_level(trimmed, ';')? {
        if part.trim().is_empty() {
            continue;
        }
        structures.push(parse_structure(part)?);
    }
    Ok(Caps::Structures(structures))
}

/// Like [`parse_caps`], but a structure that fails to parse is left out and
/// its error returned alongside the caps built from the rest.
pub(super) fn parse_caps_lenient(
    input: &str,
) -> Result<(Caps, Vec<CapsParseError>), CapsParseError> {
    match parse_caps(input) {
        Ok(caps) => return Ok((caps, Vec::new())),
        Err(CapsParseError::EmptyInput) => return Err(CapsParseError::EmptyInput),
        Err(_) => {}
    }

    let mut structures = Vec::new();
    let mut skipped = Vec::new();
    for part in split_top_level(input.trim(), ';')? {
        if part.trim().is_empty() {
            continue;
        }
        match parse_structure(part) {
            Ok(structure) => structures.push(structure),
            Err(e) => skipped.push(e),
        }
    }
    Ok((Caps::Structures(structures), skipped))
}

fn parse_structure(input: &str) -> Result<Structure, CapsParseError> {
    let mut parts = split_top_level(input, ',')?.into_iter();
    let name = parts.next().unwrap_or_default().trim();
    if name.is_empty() || name.contains('=') {
        return Err(CapsParseError::MissingName(input.trim().to_string()));
    }

    let mut structure = Structure::new(name);
    for field in parts {
        let field = field.trim();
        if field.is_empty() {
            continue;
        }
        let (key, raw) = field
            .split_once('=')
            .ok_or_else(|| CapsParseError::MissingValue(field.to_string()))?;
        let key = key.trim();
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CapsParseError::MissingValue(key.to_string()));
        }
        let value = parse_value(key, raw)?;
        structure.set(key, value);
    }
    Ok(structure)
}

fn parse_value(key: &str, raw: &str) -> Result<CapsValue, CapsParseError> {
    let (cast, body) = strip_cast(raw);
    let invalid = || CapsParseError::InvalidValue {
        field: key.to_string(),
        value: raw.to_string(),
    };

    if let Some(inner) = body.strip_prefix('[') {
        let inner = inner
            .strip_suffix(']')
            .ok_or_else(|| CapsParseError::Unterminated(raw.to_string()))?;
        let bounds = split_top_level(inner, ',')?;
        if !(2..=3).contains(&bounds.len()) {
            return Err(invalid());
        }
        let min = parse_scalar(cast, bounds[0].trim()).ok_or_else(invalid)?;
        let max = parse_scalar(cast, bounds[1].trim()).ok_or_else(invalid)?;
        let step = match bounds.get(2) {
            Some(step) => Some(parse_scalar(cast, step.trim()).ok_or_else(invalid)?),
            None => None,
        };
        return match (min, max, step) {
            (CapsValue::Int(min), CapsValue::Int(max), None) => Ok(CapsValue::int_range(min, max)),
            // Bounds of a stepped range are multiples of the step
            (CapsValue::Int(min), CapsValue::Int(max), Some(CapsValue::Int(step)))
                if step > 0 && min % step == 0 && max % step == 0 =>
            {
                Ok(CapsValue::IntRange { min, max, step })
            }
            (CapsValue::Fraction(min), CapsValue::Fraction(max), None) => {
                Ok(CapsValue::FractionRange { min, max })
            }
            _ => Err(invalid()),
        };
    }

    if let Some(inner) = body.strip_prefix('{') {
        let inner = inner
            .strip_suffix('}')
            .ok_or_else(|| CapsParseError::Unterminated(raw.to_string()))?;
        let mut items = Vec::new();
        for item in split_top_level(inner, ',')? {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let (item_cast, item_body) = strip_cast(item);
            let scalar = parse_scalar(item_cast.or(cast), item_body).ok_or_else(invalid)?;
            items.push(scalar);
        }
        if items.is_empty() {
            return Err(invalid());
        }
        return Ok(CapsValue::List(items));
    }

    parse_scalar(cast, body).ok_or_else(invalid)
}

/// Splits `(type)rest` into the cast and the remaining text
fn strip_cast(raw: &str) -> (Option<&str>, &str) {
    let raw = raw.trim();
    if let Some(rest) = raw.strip_prefix('(') {
        if let Some((cast, body)) = rest.split_once(')') {
            return (Some(cast.trim()), body.trim());
        }
    }
    (None, raw)
}

fn parse_scalar(cast: Option<&str>, text: &str) -> Option<CapsValue> {
    match cast {
        Some("int" | "i" | "uint" | "gint" | "guint") => text.parse().ok().map(CapsValue::Int),
        Some("bitmask" | "GstBitmask") => parse_bitmask(text).map(CapsValue::Bitmask),
        Some("fraction" | "GstFraction") => parse_fraction(text).map(CapsValue::Fraction),
        Some("boolean" | "bool" | "b") => parse_bool(text).map(CapsValue::Bool),
        Some("string" | "str" | "s") => Some(CapsValue::Str(unquote(text))),
        Some(_) => None,
        None => {
            if let Ok(v) = text.parse::<i64>() {
                Some(CapsValue::Int(v))
            } else if let Some(f) = parse_fraction(text) {
                Some(CapsValue::Fraction(f))
            } else if let Some(b) = parse_bool(text) {
                Some(CapsValue::Bool(b))
            } else if text.is_empty() {
                None
            } else {
                Some(CapsValue::Str(unquote(text)))
            }
        }
    }
}

/// `0x`-prefixed hex as GStreamer prints it, or plain decimal
fn parse_bitmask(text: &str) -> Option<u64> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

fn parse_fraction(text: &str) -> Option<Fraction> {
    let (num, denom) = text.split_once('/')?;
    Some(Fraction::new(num.trim().parse().ok()?, denom.trim().parse().ok()?))
}

/// `NUM/DENOM`, or a bare integer meaning `NUM/1`
impl FromStr for Fraction {
    type Err = CapsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        parse_fraction(text)
            .or_else(|| text.parse().ok().map(|num| Fraction::new(num, 1)))
            .ok_or_else(|| CapsParseError::InvalidValue {
                field: "fraction".to_string(),
                value: s.to_string(),
            })
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "true" | "TRUE" | "yes" => Some(true),
        "false" | "FALSE" | "no" => Some(false),
        _ => None,
    }
}

fn unquote(text: &str) -> String {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .map(|t| t.replace("\\\"", "\""))
        .unwrap_or_else(|| text.to_string())
}

/// Split on `sep` outside of `[]`, `{}`, `()` and double quotes
fn split_top_level(input: &str, sep: char) -> Result<Vec<&str>, CapsParseError> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;

    for (idx, c) in input.char_indices() {
        if in_quotes {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            '[' | '{' | '(' => depth += 1,
            ']' | '}' | ')' => depth -= 1,
            _ if c == sep && depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
        if depth < 0 {
            return Err(CapsParseError::Unterminated(input.to_string()));
        }
    }

    if depth != 0 || in_quotes {
        return Err(CapsParseError::Unterminated(input.to_string()));
    }
    parts.push(&input[start..]);
    Ok(parts)
}
