//! Shapes carrying at most one value: plain, text and object messages.
use interop_shims_protocol::{
    jms::{JmsMessageType, SERIALIZED_OBJECT_CONTENT_TYPE},
    message::{Message, MessageBuilder, SimpleValue, Value},
};

use super::{
    admit, annotate, single_value_only, MessageShape, Reading, ShapeReader, ShapeWriter, Slot,
};
use crate::{codec::NativeValue, error::ShimError, object::ObjectValue, ShimResult};

fn consumed(shape: MessageShape) -> ShimError {
    ShimError::Argument(format!("the value of a {} was already read", shape.token()))
}

/// Body is an `amqp-value` null
#[derive(Default)]
pub(crate) struct PlainWriter {
    written: bool,
}

impl ShapeWriter for PlainWriter {
    fn write(&mut self, slot: Slot, value: &NativeValue) -> ShimResult<()> {
        admit(MessageShape::Plain, slot, value)?;
        if self.written {
            return Err(single_value_only(MessageShape::Plain));
        }
        self.written = true;
        Ok(())
    }

    fn seal(self: Box<Self>) -> ShimResult<MessageBuilder> {
        Ok(annotate(
            Message::builder().value(Value::null()),
            JmsMessageType::Message,
        ))
    }
}

pub(crate) struct PlainReader {
    pending: bool,
}

impl PlainReader {
    pub(crate) fn open(message: &Message) -> ShimResult<Self> {
        match message.value() {
            None if message.data().is_none() && message.sequence().is_none() => {}
            Some(value) if value.is_null() => {}
            _ => {
                return Err(ShimError::shape(
                    MessageShape::Plain.token(),
                    "a message with a body",
                ))
            }
        }
        Ok(PlainReader { pending: true })
    }
}

impl ShapeReader for PlainReader {
    fn read(&mut self, slot: Slot) -> ShimResult<Reading> {
        MessageShape::Plain.check(slot.subtype)?;
        if !self.pending {
            return Err(consumed(MessageShape::Plain));
        }
        self.pending = false;
        Ok(Reading::Value(NativeValue::Null))
    }
}

/// Body is an `amqp-value` string
#[derive(Default)]
pub(crate) struct TextWriter {
    text: Option<String>,
}

impl ShapeWriter for TextWriter {
    fn write(&mut self, slot: Slot, value: &NativeValue) -> ShimResult<()> {
        admit(MessageShape::Text, slot, value)?;
        match (value, &self.text) {
            (NativeValue::String(text), None) => {
                self.text = Some(text.clone());
                Ok(())
            }
            _ => Err(single_value_only(MessageShape::Text)),
        }
    }

    fn seal(self: Box<Self>) -> ShimResult<MessageBuilder> {
        let text = self.text.ok_or_else(|| single_value_only(MessageShape::Text))?;
        Ok(annotate(Message::builder().value(text), JmsMessageType::Text))
    }
}

pub(crate) struct TextReader {
    text: Option<String>,
}

impl TextReader {
    pub(crate) fn open(message: &Message) -> ShimResult<Self> {
        match message.value() {
            Some(Value::Simple(SimpleValue::String(text))) => Ok(TextReader {
                text: Some(text.clone()),
            }),
            other => Err(ShimError::shape(
                MessageShape::Text.token(),
                format!("body {:?}", other),
            )),
        }
    }
}

impl ShapeReader for TextReader {
    fn read(&mut self, slot: Slot) -> ShimResult<Reading> {
        MessageShape::Text.check(slot.subtype)?;
        self.text
            .take()
            .map(|text| Reading::Value(NativeValue::String(text)))
            .ok_or_else(|| consumed(MessageShape::Text))
    }
}

/// Body is one `data` section holding a serialized object
#[derive(Default)]
pub(crate) struct ObjectWriter {
    object: Option<ObjectValue>,
}

impl ShapeWriter for ObjectWriter {
    fn write(&mut self, slot: Slot, value: &NativeValue) -> ShimResult<()> {
        admit(MessageShape::SingleObject, slot, value)?;
        match (value, &self.object) {
            (NativeValue::Object(object), None) => {
                self.object = Some(object.clone());
                Ok(())
            }
            _ => Err(single_value_only(MessageShape::SingleObject)),
        }
    }

    fn seal(self: Box<Self>) -> ShimResult<MessageBuilder> {
        let object = self
            .object
            .ok_or_else(|| single_value_only(MessageShape::SingleObject))?;
        let builder = Message::builder()
            .body(object.serialize()?)
            .properties()
            .content_type(SERIALIZED_OBJECT_CONTENT_TYPE)
            .message_builder();
        Ok(annotate(builder, JmsMessageType::Object))
    }
}

pub(crate) struct ObjectReader {
    object: Option<ObjectValue>,
}

impl ObjectReader {
    pub(crate) fn open(message: &Message) -> ShimResult<Self> {
        let content_type = message
            .properties()
            .and_then(|properties| properties.content_type.as_ref());
        match (message.data(), content_type) {
            (Some(data), Some(kind)) if kind.as_str() == SERIALIZED_OBJECT_CONTENT_TYPE => {
                Ok(ObjectReader {
                    object: Some(ObjectValue::deserialize(data)?),
                })
            }
            (data, kind) => Err(ShimError::shape(
                format!(
                    "{} with content type {}",
                    MessageShape::SingleObject.token(),
                    SERIALIZED_OBJECT_CONTENT_TYPE
                ),
                format!(
                    "{} body with content type {:?}",
                    if data.is_some() { "data" } else { "non-data" },
                    kind.map(|kind| kind.as_str())
                ),
            )),
        }
    }
}

impl ShapeReader for ObjectReader {
    fn read(&mut self, slot: Slot) -> ShimResult<Reading> {
        MessageShape::SingleObject.check(slot.subtype)?;
        self.object
            .take()
            .map(|object| Reading::Value(NativeValue::Object(object)))
            .ok_or_else(|| consumed(MessageShape::SingleObject))
    }
}

#[cfg(test)]
mod tests {
    use interop_shims_protocol::message::Message;
    use pretty_assertions::assert_eq;

    use crate::{
        codec::{decode, NativeValue},
        error::ShimError,
        shape::{MessageShape, Reading, Slot},
        subtype::Subtype,
    };

    #[test]
    fn object_messages_carry_one_object() {
        let slot = Slot::new(Subtype::Object, 0);
        let value = decode(Subtype::Object, "java.lang.Character:\\x41").unwrap();

        let mut writer = MessageShape::SingleObject.writer();
        writer.write(slot, &value).unwrap();
        assert!(writer.write(slot, &value).is_err());
        let message = writer.seal().unwrap().build();

        let mut reader = MessageShape::SingleObject.reader(&message).unwrap();
        let reading = reader.read(slot).unwrap();
        assert_eq!(
            "java.lang.Character:A",
            MessageShape::SingleObject.render(Subtype::Object, &reading).unwrap()
        );
        assert!(reader.read(slot).is_err());
    }

    #[test]
    fn empty_text_writer_cannot_seal() {
        assert!(matches!(
            MessageShape::Text.writer().seal(),
            Err(ShimError::Argument(_))
        ));
    }

    #[test]
    fn plain_messages_read_as_null() {
        let mut writer = MessageShape::Plain.writer();
        writer
            .write(Slot::new(Subtype::Null, 0), &NativeValue::Null)
            .unwrap();
        let message = writer.seal().unwrap().build();

        let mut reader = MessageShape::Plain.reader(&message).unwrap();
        assert_eq!(
            Reading::Value(NativeValue::Null),
            reader.read(Slot::new(Subtype::Null, 0)).unwrap()
        );
        assert!(MessageShape::Plain
            .reader(&Message::builder().body(vec![1u8]).build())
            .is_err());
    }

    #[test]
    fn object_body_without_content_type_is_rejected() {
        let message = Message::builder().body(vec![1u8, 2, 3]).build();
        assert!(matches!(
            MessageShape::SingleObject.reader(&message),
            Err(ShimError::UnexpectedShape { .. })
        ));
    }
}
