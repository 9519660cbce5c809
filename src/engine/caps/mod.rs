//! Media capability descriptors ("caps").
//!
//! Caps describe the formats a pad can accept or produce as a disjunction of
//! structures. Intersection is the negotiation primitive every compatibility
//! query in this crate is built on.

mod parse;
mod value;

pub use parse::CapsParseError;
pub use value::{CapsValue, Fraction};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A media type name plus an ordered set of field constraints
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    name: String,
    fields: Vec<(String, CapsValue)>,
}

impl Structure {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style field setter
    pub fn with(mut self, key: &str, value: impl Into<CapsValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace a field, keeping the original position on replace
    pub fn set(&mut self, key: &str, value: impl Into<CapsValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&CapsValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &CapsValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field-wise intersection; `None` when names differ or a shared field conflicts
    pub fn intersect(&self, other: &Structure) -> Option<Structure> {
        if self.name != other.name {
            return None;
        }

        let mut out = Structure::new(self.name.clone());
        for (key, value) in &self.fields {
            match other.get(key) {
                Some(theirs) => out.fields.push((key.clone(), value.intersect(theirs)?)),
                None => out.fields.push((key.clone(), value.clone())),
            }
        }
        for (key, value) in &other.fields {
            if self.get(key).is_none() {
                out.fields.push((key.clone(), value.clone()));
            }
        }
        Some(out)
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for (key, value) in &self.fields {
            write!(f, ", {}={}", key, value)?;
        }
        Ok(())
    }
}

/// Capability descriptor
#[derive(Debug, Clone, PartialEq)]
pub enum Caps {
    /// Accepts every format
    Any,
    /// Accepts any one of the listed structures; an empty list is `EMPTY`
    Structures(Vec<Structure>),
}

impl Caps {
    pub fn empty() -> Self {
        Caps::Structures(Vec::new())
    }

    pub fn new(structure: Structure) -> Self {
        Caps::Structures(vec![structure])
    }

    pub fn many(structures: impl IntoIterator<Item = Structure>) -> Self {
        Caps::Structures(structures.into_iter().collect())
    }

    /// Parse caps, leaving out structures that do not parse.
    ///
    /// Returns the caps built from the remaining structures together with
    /// one error per structure left out. Errors that affect the whole string
    /// (empty input, unbalanced brackets) are still returned as `Err`.
    pub fn parse_lenient(text: &str) -> Result<(Caps, Vec<CapsParseError>), CapsParseError> {
        parse::parse_caps_lenient(text)
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Caps::Any)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Caps::Structures(s) if s.is_empty())
    }

    /// Structures of fixed caps (empty for `ANY`)
    pub fn structures(&self) -> &[Structure] {
        match self {
            Caps::Any => &[],
            Caps::Structures(s) => s,
        }
    }

    /// Set intersection of two caps.
    ///
    /// Structures are combined pairwise in `self`-major order; exact duplicates
    /// in the result are dropped.
    pub fn intersect(&self, other: &Caps) -> Caps {
        match (self, other) {
            (Caps::Any, _) => other.clone(),
            (_, Caps::Any) => self.clone(),
            (Caps::Structures(ours), Caps::Structures(theirs)) => {
                let mut out: Vec<Structure> = Vec::new();
                for a in ours {
                    for b in theirs {
                        if let Some(s) = a.intersect(b) {
                            if !out.contains(&s) {
                                out.push(s);
                            }
                        }
                    }
                }
                Caps::Structures(out)
            }
        }
    }

    /// True when the intersection with `other` is non-empty
    pub fn can_intersect(&self, other: &Caps) -> bool {
        match (self, other) {
            (Caps::Any, c) | (c, Caps::Any) => !c.is_empty(),
            (Caps::Structures(ours), Caps::Structures(theirs)) => ours
                .iter()
                .any(|a| theirs.iter().any(|b| a.intersect(b).is_some())),
        }
    }
}

impl Default for Caps {
    fn default() -> Self {
        Caps::empty()
    }
}

impl From<Structure> for Caps {
    fn from(s: Structure) -> Self {
        Caps::new(s)
    }
}

impl FromStr for Caps {
    type Err = CapsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse::parse_caps(s)
    }
}

impl fmt::Display for Caps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Caps::Any => write!(f, "ANY"),
            Caps::Structures(s) if s.is_empty() => write!(f, "EMPTY"),
            Caps::Structures(s) => {
                for (i, structure) in s.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", structure)?;
                }
                Ok(())
            }
        }
    }
}

// Registry snapshots store caps in their textual form
impl Serialize for Caps {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Caps {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
