//! JSON parameters of a batch and the JSON report a receiver prints.
//!
//! Keys are kept in `BTreeMap`s: sender and receiver walk them in the same
//! lexicographic order, which is what lines up the n-th message sent with
//! the n-th message received.
use std::{collections::BTreeMap, fmt};

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::{
    error::ShimError,
    headers::{HeaderEntry, ReceiveFlags},
    properties::PropertyEntry,
    ShimResult,
};

fn argument(reason: impl Into<String>) -> ShimError {
    ShimError::Argument(reason.into())
}

fn as_object<'a>(value: &'a JsonValue, what: &str) -> ShimResult<&'a JsonMap<String, JsonValue>> {
    value
        .as_object()
        .ok_or_else(|| argument(format!("{} must be a JSON object, found {}", what, value)))
}

fn as_str<'a>(value: &'a JsonValue, what: &str) -> ShimResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| argument(format!("{} must be a JSON string, found {}", what, value)))
}

/// Splits `{"<tag>": "<text>"}`, the tagged form of headers and properties.
fn tagged<'a>(name: &str, value: &'a JsonValue) -> ShimResult<(&'a str, &'a str)> {
    let map = as_object(value, name)?;
    let mut entries = map.iter();
    match (entries.next(), entries.next()) {
        (Some((tag, text)), None) => Ok((tag.as_str(), as_str(text, name)?)),
        _ => Err(argument(format!(
            "{} must hold exactly one tagged value, found {}",
            name, value
        ))),
    }
}

fn parse_values(value: &JsonValue) -> ShimResult<BTreeMap<String, Vec<String>>> {
    let mut values = BTreeMap::new();
    for (key, list) in as_object(value, "test values")? {
        let list = list
            .as_array()
            .ok_or_else(|| argument(format!("values of \"{}\" must be a JSON array", key)))?;
        let canonical = list
            .iter()
            .map(|item| as_str(item, key).map(str::to_owned))
            .collect::<ShimResult<Vec<_>>>()?;
        values.insert(key.clone(), canonical);
    }
    Ok(values)
}

fn parse_counts(value: &JsonValue) -> ShimResult<BTreeMap<String, usize>> {
    let mut counts = BTreeMap::new();
    for (key, count) in as_object(value, "test value counts")? {
        let count = count.as_u64().ok_or_else(|| {
            argument(format!(
                "count of \"{}\" must be a non-negative integer, found {}",
                key, count
            ))
        })?;
        counts.insert(key.clone(), count as usize);
    }
    Ok(counts)
}

/// What a sender transmits: values per key plus the headers and properties
/// every message carries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendRequest {
    pub values: BTreeMap<String, Vec<String>>,
    pub headers: Vec<HeaderEntry>,
    pub properties: Vec<PropertyEntry>,
}

impl SendRequest {
    /// A request for the values of one key
    pub fn single(key: impl Into<String>, values: Vec<String>) -> Self {
        let mut request = SendRequest::default();
        request.values.insert(key.into(), values);
        request
    }

    /// Parses `[values, headers, properties]`, or the legacy bare values
    /// object.
    pub fn parse(json: &str) -> ShimResult<Self> {
        let document: JsonValue = serde_json::from_str(json)?;
        match &document {
            JsonValue::Object(_) => Ok(SendRequest {
                values: parse_values(&document)?,
                ..SendRequest::default()
            }),
            JsonValue::Array(parts) if parts.len() == 3 => {
                let mut headers = Vec::new();
                for (name, value) in as_object(&parts[1], "test headers")? {
                    let (encoding, text) = tagged(name, value)?;
                    headers.push(HeaderEntry::parse(name, encoding, text)?);
                }
                let mut properties = Vec::new();
                for (name, value) in as_object(&parts[2], "test properties")? {
                    let (type_name, text) = tagged(name, value)?;
                    properties.push(PropertyEntry::parse(name, type_name, text)?);
                }
                Ok(SendRequest {
                    values: parse_values(&parts[0])?,
                    headers,
                    properties,
                })
            }
            other => Err(argument(format!(
                "sender parameters must be [values, headers, properties] or a values object, found {}",
                other
            ))),
        }
    }

    /// Number of messages the request produces
    pub fn message_count(&self) -> usize {
        self.values.values().map(Vec::len).sum()
    }
}

/// What a receiver expects: a message count per key plus the flags shaping
/// the header report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceiveRequest {
    pub counts: BTreeMap<String, usize>,
    pub flags: ReceiveFlags,
    pub legacy: bool,
}

impl ReceiveRequest {
    pub fn single(key: impl Into<String>, count: usize) -> Self {
        let mut request = ReceiveRequest {
            legacy: true,
            ..ReceiveRequest::default()
        };
        request.counts.insert(key.into(), count);
        request
    }

    /// Parses `[counts, flags]`, or the legacy bare counts object.
    pub fn parse(json: &str) -> ShimResult<Self> {
        let document: JsonValue = serde_json::from_str(json)?;
        match &document {
            JsonValue::Object(_) => Ok(ReceiveRequest {
                counts: parse_counts(&document)?,
                flags: ReceiveFlags::default(),
                legacy: true,
            }),
            JsonValue::Array(parts) if parts.len() == 2 => {
                let mut flags = ReceiveFlags::default();
                for (name, value) in as_object(&parts[1], "receiver flags")? {
                    let value = value.as_bool().ok_or_else(|| {
                        argument(format!("flag \"{}\" must be a boolean, found {}", name, value))
                    })?;
                    flags.set(name, value);
                }
                Ok(ReceiveRequest {
                    counts: parse_counts(&parts[0])?,
                    flags,
                    legacy: false,
                })
            }
            other => Err(argument(format!(
                "receiver parameters must be [counts, flags] or a counts object, found {}",
                other
            ))),
        }
    }
}

/// Everything a receiver read, assembled once the batch is complete
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceiveReport {
    values: BTreeMap<String, Vec<JsonValue>>,
    headers: BTreeMap<String, (String, String)>,
    properties: BTreeMap<String, (String, String)>,
    legacy: bool,
}

impl ReceiveReport {
    pub fn new(legacy: bool) -> Self {
        ReceiveReport {
            legacy,
            ..ReceiveReport::default()
        }
    }

    /// Adds `key` with no values yet; a key expecting zero messages still
    /// shows up in the report.
    pub fn open_key(&mut self, key: &str) {
        self.values.entry(key.to_owned()).or_default();
    }

    pub fn push_value(&mut self, key: &str, value: JsonValue) {
        self.values.entry(key.to_owned()).or_default().push(value);
    }

    /// Records the headers of a message; later messages overwrite earlier
    /// ones.
    pub fn record_headers(&mut self, entries: &[HeaderEntry]) {
        for entry in entries {
            self.headers.insert(
                entry.name.to_string(),
                (entry.value.encoding().to_owned(), entry.value.text()),
            );
        }
    }

    pub fn record_properties(&mut self, entries: &[PropertyEntry]) -> ShimResult<()> {
        for entry in entries {
            self.properties.insert(
                entry.name.clone(),
                (entry.subtype().to_string(), entry.canonical()?),
            );
        }
        Ok(())
    }

    pub fn values(&self, key: &str) -> Option<&[JsonValue]> {
        self.values.get(key).map(Vec::as_slice)
    }

    pub fn header(&self, name: &str) -> Option<(&str, &str)> {
        self.headers
            .get(name)
            .map(|(encoding, text)| (encoding.as_str(), text.as_str()))
    }

    pub fn property(&self, name: &str) -> Option<(&str, &str)> {
        self.properties
            .get(name)
            .map(|(type_name, text)| (type_name.as_str(), text.as_str()))
    }

    fn tagged_map(entries: &BTreeMap<String, (String, String)>) -> JsonValue {
        let mut map = JsonMap::new();
        for (name, (tag, text)) in entries {
            let mut inner = JsonMap::new();
            inner.insert(tag.clone(), JsonValue::String(text.clone()));
            map.insert(name.clone(), JsonValue::Object(inner));
        }
        JsonValue::Object(map)
    }

    /// `[values, headers, properties]`, or the bare values object for the
    /// legacy protocol
    pub fn to_json(&self) -> JsonValue {
        let values = JsonValue::Object(
            self.values
                .iter()
                .map(|(key, list)| (key.clone(), JsonValue::Array(list.clone())))
                .collect(),
        );
        if self.legacy {
            return values;
        }
        JsonValue::Array(vec![
            values,
            Self::tagged_map(&self.headers),
            Self::tagged_map(&self.properties),
        ])
    }
}

impl fmt::Display for ReceiveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
