/// Strict field access for service responses
/// A field that is absent or null is missing; nothing is defaulted.

use serde_json::Value;

use crate::error::{Error, Result};

pub(crate) fn get_json_field<'a>(json: &'a Value, field: &'static str) -> Result<&'a Value> {
    match json.get(field) {
        None | Some(Value::Null) => Err(Error::MissingField(field)),
        Some(value) => Ok(value),
    }
}

pub(crate) fn get_json_str<'a>(json: &'a Value, field: &'static str) -> Result<&'a str> {
    get_json_field(json, field)?
        .as_str()
        .ok_or(Error::InvalidField {
            field,
            expected: "a string",
        })
}

pub(crate) fn get_json_array<'a>(json: &'a Value, field: &'static str) -> Result<&'a Vec<Value>> {
    get_json_field(json, field)?
        .as_array()
        .ok_or(Error::InvalidField {
            field,
            expected: "an array",
        })
}
