//! Message shapes a test value can travel in.
//!
//! A [`ShapeWriter`] collects values into one message and seals it into a
//! [`MessageBuilder`]; a [`ShapeReader`] hands the values of a received
//! message back, each slot at most once.
use std::{fmt, str::FromStr};

use interop_shims_protocol::{
    jms::{JmsMessageType, JMS_MSG_TYPE},
    message::{Message, MessageBuilder},
};

use crate::{
    codec::{self, NativeValue},
    error::ShimError,
    subtype::Subtype,
    ShimResult,
};

mod map;
mod raw_bytes;
mod single;
mod stream;

use self::{
    map::{MapReader, MapWriter},
    raw_bytes::{RawBytesReader, RawBytesWriter},
    single::{ObjectReader, ObjectWriter, PlainReader, PlainWriter, TextReader, TextWriter},
    stream::{StreamReader, StreamWriter},
};

/// Rendered for a stream `bytes` slot read past the end of the body
pub const BYTES_ERROR: &str = "<bytes error>";
/// Rendered for a raw bytes `object` slot read past the end of the body
pub const OBJECT_ERROR: &str = "<object error>";

/// Structural kind of a message body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageShape {
    /// No body value at all
    Plain,
    RawBytes,
    OrderedMap,
    SingleObject,
    Stream,
    Text,
}

impl MessageShape {
    pub const ALL: [MessageShape; 6] = [
        MessageShape::Plain,
        MessageShape::RawBytes,
        MessageShape::OrderedMap,
        MessageShape::SingleObject,
        MessageShape::Stream,
        MessageShape::Text,
    ];

    /// Command line name of the shape
    pub fn token(&self) -> &'static str {
        match self {
            MessageShape::Plain => "JMS_MESSAGE_TYPE",
            MessageShape::RawBytes => "JMS_BYTESMESSAGE_TYPE",
            MessageShape::OrderedMap => "JMS_MAPMESSAGE_TYPE",
            MessageShape::SingleObject => "JMS_OBJECTMESSAGE_TYPE",
            MessageShape::Stream => "JMS_STREAMMESSAGE_TYPE",
            MessageShape::Text => "JMS_TEXTMESSAGE_TYPE",
        }
    }

    /// Value of the `x-opt-jms-msg-type` annotation
    pub fn jms_type(&self) -> JmsMessageType {
        match self {
            MessageShape::Plain => JmsMessageType::Message,
            MessageShape::RawBytes => JmsMessageType::Bytes,
            MessageShape::OrderedMap => JmsMessageType::Map,
            MessageShape::SingleObject => JmsMessageType::Object,
            MessageShape::Stream => JmsMessageType::Stream,
            MessageShape::Text => JmsMessageType::Text,
        }
    }

    pub fn supports(&self, subtype: Subtype) -> bool {
        match self {
            MessageShape::Plain => subtype == Subtype::Null,
            MessageShape::RawBytes => {
                subtype.is_jms()
                    || matches!(
                        subtype,
                        Subtype::Null
                            | Subtype::Ubyte
                            | Subtype::Ushort
                            | Subtype::Uint
                            | Subtype::Ulong
                            | Subtype::Timestamp
                            | Subtype::Binary
                            | Subtype::Symbol
                    )
            }
            MessageShape::OrderedMap | MessageShape::Stream => subtype.is_jms(),
            MessageShape::SingleObject => subtype == Subtype::Object,
            MessageShape::Text => subtype == Subtype::String,
        }
    }

    pub fn check(&self, subtype: Subtype) -> ShimResult<()> {
        if self.supports(subtype) {
            Ok(())
        } else {
            Err(ShimError::unsupported(
                subtype.as_str(),
                format!("{} messages", self.token()),
            ))
        }
    }

    /// A fresh, empty message of this shape
    pub fn writer(&self) -> Box<dyn ShapeWriter> {
        match self {
            MessageShape::Plain => Box::new(PlainWriter::default()),
            MessageShape::RawBytes => Box::new(RawBytesWriter::default()),
            MessageShape::OrderedMap => Box::new(MapWriter::default()),
            MessageShape::SingleObject => Box::new(ObjectWriter::default()),
            MessageShape::Stream => Box::new(StreamWriter::default()),
            MessageShape::Text => Box::new(TextWriter::default()),
        }
    }

    /// Opens a received message, failing when it is not of this shape.
    pub fn reader(&self, message: &Message) -> ShimResult<Box<dyn ShapeReader>> {
        if let Some(annotation) = message.annotation(JMS_MSG_TYPE) {
            match JmsMessageType::from_annotation(annotation) {
                Some(kind) if kind == self.jms_type() => {}
                Some(kind) => {
                    return Err(ShimError::shape(
                        self.token(),
                        format!("{:?} message", kind),
                    ))
                }
                None => {
                    return Err(ShimError::shape(
                        self.token(),
                        format!("{} annotation {:?}", JMS_MSG_TYPE, annotation),
                    ))
                }
            }
        }

        let reader: Box<dyn ShapeReader> = match self {
            MessageShape::Plain => Box::new(PlainReader::open(message)?),
            MessageShape::RawBytes => Box::new(RawBytesReader::open(message)?),
            MessageShape::OrderedMap => Box::new(MapReader::open(message)?),
            MessageShape::SingleObject => Box::new(ObjectReader::open(message)?),
            MessageShape::Stream => Box::new(StreamReader::open(message)?),
            MessageShape::Text => Box::new(TextReader::open(message)?),
        };
        Ok(reader)
    }

    /// Canonical text of a reading, including the sentinels for reads past
    /// the end of the body.
    pub fn render(&self, subtype: Subtype, reading: &Reading) -> ShimResult<String> {
        match (reading, self, subtype) {
            (Reading::Value(value), _, _) => codec::encode(subtype, value),
            (Reading::Exhausted, MessageShape::RawBytes, Subtype::Bytes)
            | (Reading::Exhausted, MessageShape::RawBytes, Subtype::Binary) => Ok(String::new()),
            (Reading::Exhausted, MessageShape::RawBytes, Subtype::Object) => {
                Ok(OBJECT_ERROR.to_owned())
            }
            (Reading::Exhausted, MessageShape::Stream, Subtype::Bytes) => Ok(BYTES_ERROR.to_owned()),
            (Reading::Exhausted, _, _) => Err(end_of_body(subtype)),
        }
    }
}

impl fmt::Display for MessageShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for MessageShape {
    type Err = ShimError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        MessageShape::ALL
            .iter()
            .find(|shape| shape.token() == token)
            .copied()
            .ok_or_else(|| ShimError::Argument(format!("unsupported message type \"{}\"", token)))
    }
}

/// Position of a value: its subtype and its index within that subtype's
/// values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub subtype: Subtype,
    pub index: usize,
}

impl Slot {
    pub fn new(subtype: Subtype, index: usize) -> Self {
        Slot { subtype, index }
    }

    /// Map key of the slot, e.g. `int002`
    pub fn key(&self) -> String {
        format!("{}{:03}", self.subtype, self.index)
    }
}

/// Outcome of reading a slot
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Value(NativeValue),
    /// No data left where a byte count was expected, a `-1` read
    Exhausted,
}

pub trait ShapeWriter: Send {
    fn write(&mut self, slot: Slot, value: &NativeValue) -> ShimResult<()>;

    /// Finishes the body and stamps the message type annotation.
    fn seal(self: Box<Self>) -> ShimResult<MessageBuilder>;
}

pub trait ShapeReader: Send {
    fn read(&mut self, slot: Slot) -> ShimResult<Reading>;
}

/// Stamps the message type annotation on a sealed body.
pub(crate) fn annotate(builder: MessageBuilder, kind: JmsMessageType) -> MessageBuilder {
    builder
        .message_annotations()
        .insert(JMS_MSG_TYPE, kind)
        .message_builder()
}

/// Rejects a value whose subtype differs from its slot or that the shape
/// cannot carry.
pub(crate) fn admit(shape: MessageShape, slot: Slot, value: &NativeValue) -> ShimResult<()> {
    shape.check(slot.subtype)?;
    if value.subtype() != slot.subtype {
        return Err(ShimError::malformed(
            slot.subtype.as_str(),
            format!("{:?}", value),
            format!("a {} value in a {} slot", value.subtype(), slot.subtype),
        ));
    }
    Ok(())
}

pub(crate) fn end_of_body(subtype: Subtype) -> ShimError {
    ShimError::malformed(subtype.as_str(), "", "read past the end of the message body")
}

pub(crate) fn single_value_only(shape: MessageShape) -> ShimError {
    ShimError::Argument(format!("{} carries exactly one value", shape.token()))
}
