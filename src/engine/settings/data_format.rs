//! Generic string-keyed persistence mapping.
//!
//! Objects contribute their own fields on top of a base record that only
//! carries the `datatype` tag.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::engine::caps::Fraction;

/// String-keyed mapping shared with the persistence layer
pub type DataFormat = Map<String, Value>;

/// Per-codec or per-container settings
pub type CodecSettings = BTreeMap<String, Value>;

pub const DATATYPE_KEY: &str = "datatype";

#[derive(Debug, Error, PartialEq)]
pub enum DataFormatError {
    #[error("missing required key '{0}'")]
    MissingKey(String),

    #[error("key '{key}' should hold {expected}")]
    InvalidType { key: String, expected: &'static str },

    #[error("expected datatype '{expected}', found '{found}'")]
    WrongDataType { expected: String, found: String },
}

/// Objects that round-trip through a [`DataFormat`]
pub trait Serializable {
    const DATA_TYPE: &'static str;

    fn to_data_format(&self) -> DataFormat;

    fn from_data_format(&mut self, obj: &DataFormat) -> Result<(), DataFormatError>;
}

/// Base record: the datatype tag only
pub fn base_data_format(data_type: &str) -> DataFormat {
    let mut ret = Map::new();
    ret.insert(DATATYPE_KEY.to_string(), Value::from(data_type));
    ret
}

/// Reject records tagged with another datatype (an untagged record is accepted)
pub fn check_data_type(obj: &DataFormat, expected: &str) -> Result<(), DataFormatError> {
    match obj.get(DATATYPE_KEY) {
        None => Ok(()),
        Some(Value::String(found)) if found == expected => Ok(()),
        Some(other) => Err(DataFormatError::WrongDataType {
            expected: expected.to_string(),
            found: other.as_str().map(str::to_string).unwrap_or_else(|| other.to_string()),
        }),
    }
}

fn required<'a>(obj: &'a DataFormat, key: &str) -> Result<&'a Value, DataFormatError> {
    obj.get(key)
        .ok_or_else(|| DataFormatError::MissingKey(key.to_string()))
}

fn invalid(key: &str, expected: &'static str) -> DataFormatError {
    DataFormatError::InvalidType {
        key: key.to_string(),
        expected,
    }
}

pub fn get_u32(obj: &DataFormat, key: &str) -> Result<u32, DataFormatError> {
    required(obj, key)?
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| invalid(key, "an unsigned integer"))
}

pub fn get_string(obj: &DataFormat, key: &str) -> Result<String, DataFormatError> {
    required(obj, key)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(key, "a string"))
}

pub fn get_fraction(obj: &DataFormat, key: &str) -> Result<Fraction, DataFormatError> {
    serde_json::from_value(required(obj, key)?.clone())
        .map_err(|_| invalid(key, "a [numerator, denominator] pair"))
}

/// Optional mapping: `Ok(None)` when the key is absent
pub fn get_settings(obj: &DataFormat, key: &str) -> Result<Option<CodecSettings>, DataFormatError> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(
            map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        )),
        Some(_) => Err(invalid(key, "a mapping")),
    }
}

pub fn settings_value(settings: &CodecSettings) -> Value {
    Value::Object(
        settings
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}
