//! Annotations and content types used by AMQP JMS clients to describe the
//! JMS message type and destination kinds of an AMQP message.
use std::convert::TryFrom;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::message::{SimpleValue, Value};

pub const JMS_MSG_TYPE: &str = "x-opt-jms-msg-type";
pub const JMS_DEST: &str = "x-opt-jms-dest";
pub const JMS_REPLY_TO: &str = "x-opt-jms-reply-to";

pub const OCTET_STREAM_CONTENT_TYPE: &str = "application/octet-stream";
/// Content type of a `data` body holding a serialized object
pub const SERIALIZED_OBJECT_CONTENT_TYPE: &str = "application/x-interop-object";

/// Value of the `x-opt-jms-msg-type` annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(i8)]
pub enum JmsMessageType {
    Message = 0,
    Object = 1,
    Map = 2,
    Bytes = 3,
    Stream = 4,
    Text = 5,
}

/// Value of the `x-opt-jms-dest` and `x-opt-jms-reply-to` annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(i8)]
pub enum JmsDestinationType {
    Queue = 0,
    Topic = 1,
    TemporaryQueue = 2,
    TemporaryTopic = 3,
}

fn annotation_byte(value: &Value) -> Option<i8> {
    match value.as_simple()? {
        SimpleValue::Byte(byte) => Some(*byte),
        SimpleValue::Ubyte(byte) => i8::try_from(*byte).ok(),
        _ => None,
    }
}

impl JmsMessageType {
    pub fn from_annotation(value: &Value) -> Option<Self> {
        annotation_byte(value).and_then(|code| Self::try_from(code).ok())
    }
}

impl JmsDestinationType {
    pub fn from_annotation(value: &Value) -> Option<Self> {
        annotation_byte(value).and_then(|code| Self::try_from(code).ok())
    }

    pub fn is_temporary(&self) -> bool {
        matches!(
            self,
            JmsDestinationType::TemporaryQueue | JmsDestinationType::TemporaryTopic
        )
    }

    pub fn is_topic(&self) -> bool {
        matches!(
            self,
            JmsDestinationType::Topic | JmsDestinationType::TemporaryTopic
        )
    }
}

impl From<JmsMessageType> for Value {
    fn from(kind: JmsMessageType) -> Self {
        Value::from(i8::from(kind))
    }
}

impl From<JmsDestinationType> for Value {
    fn from(kind: JmsDestinationType) -> Self {
        Value::from(i8::from(kind))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{JmsDestinationType, JmsMessageType};
    use crate::message::{SimpleValue, Value};

    #[test]
    fn message_type_reads_byte_and_ubyte() {
        assert_eq!(
            Some(JmsMessageType::Text),
            JmsMessageType::from_annotation(&Value::from(5i8))
        );
        assert_eq!(
            Some(JmsMessageType::Map),
            JmsMessageType::from_annotation(&Value::Simple(SimpleValue::Ubyte(2)))
        );
        assert_eq!(None, JmsMessageType::from_annotation(&Value::from(9i8)));
        assert_eq!(None, JmsMessageType::from_annotation(&Value::from("5")));
    }

    #[test]
    fn destination_type_round_trips_through_annotation() {
        let value = Value::from(JmsDestinationType::TemporaryTopic);
        let kind = JmsDestinationType::from_annotation(&value).unwrap();
        assert_eq!(JmsDestinationType::TemporaryTopic, kind);
        assert!(kind.is_temporary());
        assert!(kind.is_topic());
    }
}
