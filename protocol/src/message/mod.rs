use std::convert::TryFrom;
use std::sync::Arc;

mod amqp;
mod builder;

use crate::codec::{Decoder, Encoder};
use crate::error::{DecodeError, EncodeError};

pub use self::amqp::{
    AmqpDecodeError, AmqpDecoder, AmqpEncodeError, AmqpEncoder, AmqpMessage, AnnotationKey,
    Annotations, ApplicationProperties, Binary, CollectionValue, Decimal128, Decimal32, Decimal64,
    DeliveryAnnotations, DescribedValue, Descriptor, Double, Float, Footer, Header, List, Map,
    MessageAnnotations, MessageBody, MessageId, Properties, SimpleValue, Str, Symbol, Timestamp,
    TypeCode, Uuid, Value,
};

pub use self::builder::{
    AnnotationBuilder, ApplicationPropertiesBuilder, MessageBuilder, PropertiesBuilder,
};

/// API for inbound and outbound messages
#[derive(Debug, PartialEq, Clone)]
pub struct Message(Arc<AmqpMessage>);

impl Encoder for Message {
    fn encoded_size(&self) -> u32 {
        self.0.encoded_size()
    }

    fn encode(&self, writer: &mut impl std::io::Write) -> Result<(), EncodeError> {
        self.0.encode(writer)?;
        Ok(())
    }
}

impl Message {
    /// Builder for creating [`Message`]
    pub fn builder() -> MessageBuilder {
        MessageBuilder(AmqpMessage::default())
    }

    /// Extract a value as reference from the `amqp-value` section of the body if present
    pub fn value_ref<'a, T>(&'a self) -> Result<Option<T>, DecodeError>
    where
        T: TryFrom<&'a Value, Error = DecodeError>,
    {
        self.0
            .body()
            .value()
            .map(|value| T::try_from(value))
            .transpose()
    }

    /// Get the `amqp-value` section of the body if any
    pub fn value(&self) -> Option<&Value> {
        self.0.body().value()
    }

    /// Get the data associated to the message if any
    pub fn data(&self) -> Option<&[u8]> {
        self.0.body().data().map(|data| data.as_slice())
    }

    /// Get the first `amqp-sequence` section of the body if any
    pub fn sequence(&self) -> Option<&List> {
        self.0.body().sequence()
    }

    /// Get the properties of the message
    pub fn properties(&self) -> Option<&Properties> {
        self.0.properties()
    }
    /// Get the header of the message
    pub fn header(&self) -> Option<&Header> {
        self.0.header()
    }

    /// Get the annotations of the message
    pub fn message_annotations(&self) -> Option<&MessageAnnotations> {
        self.0.message_annotations()
    }

    /// Get a symbol keyed message annotation
    pub fn annotation(&self, key: &str) -> Option<&Value> {
        self.message_annotations()
            .and_then(|annotations| annotations.get_symbol(key))
    }

    /// Get the application properties of the message
    pub fn application_properties(&self) -> Option<&ApplicationProperties> {
        self.0.application_properties()
    }

    /// Get the delivery annotations of the message
    pub fn delivery_annotations(&self) -> Option<&DeliveryAnnotations> {
        self.0.delivery_annotations()
    }

    /// Encode the whole message into a fresh buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        Encoder::to_bytes(self)
    }

    /// Decode a message that must span the whole input
    pub fn from_bytes(input: &[u8]) -> Result<Message, DecodeError> {
        match Message::decode(input)? {
            (remaining, message) if remaining.is_empty() => Ok(message),
            (remaining, _) => Err(DecodeError::MessageParse(format!(
                "{} trailing bytes after message",
                remaining.len()
            ))),
        }
    }
}

impl Decoder for Message {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), DecodeError> {
        let (remaining, message) = AmqpMessage::decode(input)?;
        Ok((remaining, Message(Arc::new(message))))
    }
}

impl From<AmqpMessage> for Message {
    fn from(message: AmqpMessage) -> Self {
        Message(Arc::new(message))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Message, SimpleValue, Value};

    #[test]
    fn builder_sets_every_section() {
        let message = Message::builder()
            .durable(true)
            .priority(7)
            .value("hello")
            .properties()
            .subject("kind")
            .correlation_id("corr-1")
            .message_builder()
            .message_annotations()
            .insert("x-opt-jms-msg-type", 5i8)
            .message_builder()
            .application_properties()
            .insert("prop_int_1", 12)
            .message_builder()
            .build();

        let decoded = Message::from_bytes(&message.to_bytes().unwrap()).unwrap();

        assert_eq!(message, decoded);
        assert_eq!(Some(&Value::from("hello")), decoded.value());
        assert_eq!(7, decoded.header().unwrap().priority);
        assert!(decoded.header().unwrap().durable);
        assert_eq!(
            Some("kind"),
            decoded.properties().unwrap().subject.as_deref()
        );
        assert_eq!(
            Some(&Value::Simple(SimpleValue::Byte(5))),
            decoded.annotation("x-opt-jms-msg-type")
        );
        assert_eq!(
            Some(&SimpleValue::Int(12)),
            decoded.application_properties().unwrap().get("prop_int_1")
        );
    }

    #[test]
    fn value_ref_casts_amqp_value() {
        let message = Message::builder().value("text").build();
        let text: Option<&String> = message.value_ref().unwrap();
        assert_eq!(Some(&"text".to_string()), text);

        let message = Message::builder().body(b"raw".to_vec()).build();
        assert_eq!(Some(&b"raw"[..]), message.data());
        let missing: Option<&String> = message.value_ref().unwrap();
        assert_eq!(None, missing);
    }

    #[test]
    fn from_bytes_rejects_trailing_bytes() {
        let mut bytes = Message::builder().value(1).build().to_bytes().unwrap();
        bytes.push(0x40);
        // a lone null is not a section descriptor
        assert!(Message::from_bytes(&bytes).is_err());
    }

    #[test]
    fn corrupt_sequence_count_is_a_decode_error() {
        let corrupt = [0x00, 0x53, 0x76, 0xd0, 0x00, 0x00, 0x00, 0x04, 0xff, 0xff, 0xff, 0xff];
        assert!(Message::from_bytes(&corrupt).is_err());
    }
}
