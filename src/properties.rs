//! Test properties ride as AMQP application properties named
//! `XXXX_<type>_<suffix>`, e.g. `prop_int_max`. Anything else a broker adds
//! is left alone.
use interop_shims_protocol::message::{Message, MessageBuilder};
use tracing::trace;

use crate::{
    codec::{self, NativeValue},
    error::ShimError,
    subtype::Subtype,
    ShimResult,
};

/// Subtypes a property value may have
pub const PROPERTY_SUBTYPES: [Subtype; 8] = [
    Subtype::Boolean,
    Subtype::Byte,
    Subtype::Short,
    Subtype::Int,
    Subtype::Long,
    Subtype::Float,
    Subtype::Double,
    Subtype::String,
];

fn property_subtype(name: &str) -> Option<Subtype> {
    name.parse()
        .ok()
        .filter(|subtype| PROPERTY_SUBTYPES.contains(subtype))
}

/// Type named by a test property name, `None` when the name does not follow
/// the pattern or names an unknown type.
pub fn type_of(name: &str) -> Option<Subtype> {
    let first = name.find('_')?;
    if first != 4 {
        return None;
    }
    let rest = &name[first + 1..];
    let second = rest.find('_')?;
    if second == 0 {
        return None;
    }
    property_subtype(&rest[..second])
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyEntry {
    pub name: String,
    pub value: NativeValue,
}

impl PropertyEntry {
    /// Reads one `{"<type>": "<canonical>"}` entry of the sender's property
    /// map.
    pub fn parse(name: &str, type_name: &str, canonical: &str) -> ShimResult<PropertyEntry> {
        let subtype = property_subtype(type_name).ok_or_else(|| {
            ShimError::Argument(format!(
                "unknown or unsupported message property type \"{}\"",
                type_name
            ))
        })?;
        Ok(PropertyEntry {
            name: name.to_owned(),
            value: codec::decode(subtype, canonical)?,
        })
    }

    pub fn subtype(&self) -> Subtype {
        self.value.subtype()
    }

    /// Canonical text of the value
    pub fn canonical(&self) -> ShimResult<String> {
        codec::encode(self.subtype(), &self.value)
    }
}

/// Adds `entries` to the application properties of the message being built.
pub fn attach(builder: MessageBuilder, entries: &[PropertyEntry]) -> ShimResult<MessageBuilder> {
    if entries.is_empty() {
        return Ok(builder);
    }
    let mut properties = builder.application_properties();
    for entry in entries {
        properties = properties.insert(entry.name.as_str(), entry.value.to_amqp()?);
    }
    Ok(properties.message_builder())
}

/// Test properties of a received message, read as the type their name
/// declares. Values of a narrower type are widened; mismatches and names
/// outside the pattern are skipped.
pub fn extract(message: &Message) -> Vec<PropertyEntry> {
    let properties = match message.application_properties() {
        Some(properties) => properties,
        None => return Vec::new(),
    };

    let mut entries = Vec::with_capacity(properties.len());
    for (name, value) in properties.iter() {
        let value = type_of(name).and_then(|subtype| NativeValue::from_amqp(subtype, value));
        match value {
            Some(value) => entries.push(PropertyEntry {
                name: name.clone(),
                value,
            }),
            None => trace!("Skipping property {}", name),
        }
    }
    entries
}
