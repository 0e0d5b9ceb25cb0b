//! Tagged byte values inside JSON documents.
//!
//! JSON has no byte strings, so raw bytes are stored as a marker object:
//!
//! ```json
//! {"__class__": "bytes", "__value__": "aGVsbG8=\n"}
//! ```
//!
//! The payload is base64 in MIME line layout: 76 characters per line, every
//! line terminated by `\n`. Decoding ignores whitespace inside the payload.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use thiserror::Error;

const CLASS_KEY: &str = "__class__";
const VALUE_KEY: &str = "__value__";
const BYTES_CLASS: &str = "bytes";
const LINE_WIDTH: usize = 76;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("bytes marker without a string __value__ field")]
    MissingPayload,
    #[error("bytes payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// A JSON value that may also hold raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Setting {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<Setting>),
    Object(BTreeMap<String, Setting>),
}

impl Setting {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Setting::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Setting::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

pub fn encode(setting: &Setting) -> Value {
    match setting {
        Setting::Null => Value::Null,
        Setting::Bool(b) => Value::Bool(*b),
        Setting::Number(n) => Value::Number(n.clone()),
        Setting::String(s) => Value::String(s.clone()),
        Setting::Bytes(bytes) => {
            let mut marker = Map::new();
            marker.insert(CLASS_KEY.to_string(), Value::String(BYTES_CLASS.to_string()));
            marker.insert(VALUE_KEY.to_string(), Value::String(encode_lines(bytes)));
            Value::Object(marker)
        }
        Setting::Array(items) => Value::Array(items.iter().map(encode).collect()),
        Setting::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), encode(v)))
                .collect(),
        ),
    }
}

pub fn decode(value: Value) -> Result<Setting, CodecError> {
    Ok(match value {
        Value::Null => Setting::Null,
        Value::Bool(b) => Setting::Bool(b),
        Value::Number(n) => Setting::Number(n),
        Value::String(s) => Setting::String(s),
        Value::Array(items) => Setting::Array(
            items
                .into_iter()
                .map(decode)
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(mut fields) => {
            if fields.get(CLASS_KEY).and_then(Value::as_str) == Some(BYTES_CLASS) {
                let payload = match fields.remove(VALUE_KEY) {
                    Some(Value::String(payload)) => payload,
                    _ => return Err(CodecError::MissingPayload),
                };
                return Ok(Setting::Bytes(decode_lines(&payload)?));
            }

            Setting::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| decode(v).map(|v| (k, v)))
                    .collect::<Result<_, _>>()?,
            )
        }
    })
}

fn encode_lines(bytes: &[u8]) -> String {
    let flat = BASE64.encode(bytes);
    let mut out = String::with_capacity(flat.len() + flat.len() / LINE_WIDTH + 1);

    // base64 output is ASCII, so byte chunks are char boundaries
    for line in flat.as_bytes().chunks(LINE_WIDTH) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }

    out
}

fn decode_lines(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    BASE64.decode(compact)
}

impl Serialize for Setting {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        encode(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Setting {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        decode(value).map_err(serde::de::Error::custom)
    }
}
