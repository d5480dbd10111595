use std::collections::VecDeque;

use interop_shims_protocol::{
    jms::JmsMessageType,
    message::{List, Message, MessageBuilder, Value},
};

use super::{admit, annotate, end_of_body, MessageShape, Reading, ShapeReader, ShapeWriter, Slot};
use crate::{codec::NativeValue, error::ShimError, subtype::Subtype, ShimResult};

/// Typed elements of a single `amqp-sequence` section
#[derive(Default)]
pub(crate) struct StreamWriter {
    elements: List,
}

impl ShapeWriter for StreamWriter {
    fn write(&mut self, slot: Slot, value: &NativeValue) -> ShimResult<()> {
        admit(MessageShape::Stream, slot, value)?;
        self.elements.push(value.to_amqp()?);
        Ok(())
    }

    fn seal(self: Box<Self>) -> ShimResult<MessageBuilder> {
        Ok(annotate(
            Message::builder().sequence(self.elements),
            JmsMessageType::Stream,
        ))
    }
}

pub(crate) struct StreamReader {
    elements: VecDeque<Value>,
}

impl StreamReader {
    pub(crate) fn open(message: &Message) -> ShimResult<Self> {
        match message.sequence() {
            Some(list) => Ok(StreamReader {
                elements: list.iter().cloned().collect(),
            }),
            None => Err(ShimError::shape(
                MessageShape::Stream.token(),
                "a message without an amqp-sequence section",
            )),
        }
    }
}

impl ShapeReader for StreamReader {
    fn read(&mut self, slot: Slot) -> ShimResult<Reading> {
        let subtype = slot.subtype;
        MessageShape::Stream.check(subtype)?;

        let element = match self.elements.pop_front() {
            Some(element) if subtype == Subtype::Bytes && element.is_null() => {
                return Ok(Reading::Exhausted)
            }
            Some(element) => element,
            None if subtype == Subtype::Bytes => return Ok(Reading::Exhausted),
            None => return Err(end_of_body(subtype)),
        };

        element
            .as_simple()
            .and_then(|simple| NativeValue::from_amqp(subtype, simple))
            .map(Reading::Value)
            .ok_or_else(|| {
                ShimError::malformed(
                    subtype.as_str(),
                    format!("{:?}", element),
                    format!("stream element cannot be read as {}", subtype),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use interop_shims_protocol::message::{List, Message, Value};
    use pretty_assertions::assert_eq;

    use crate::{
        codec::NativeValue,
        shape::{MessageShape, Reading, Slot, BYTES_ERROR},
        subtype::Subtype,
    };

    #[test]
    fn elements_are_read_in_order() {
        let mut writer = MessageShape::Stream.writer();
        writer
            .write(Slot::new(Subtype::Long, 0), &NativeValue::Long(i64::MIN))
            .unwrap();
        writer
            .write(Slot::new(Subtype::Char, 0), &NativeValue::Char(u16::from(b'x')))
            .unwrap();
        writer
            .write(Slot::new(Subtype::Float, 0), &NativeValue::Float(f32::NAN))
            .unwrap();
        let message = writer.seal().unwrap().build();
        assert_eq!(3, message.sequence().unwrap().len());

        let mut reader = MessageShape::Stream.reader(&message).unwrap();
        assert_eq!(
            Reading::Value(NativeValue::Long(i64::MIN)),
            reader.read(Slot::new(Subtype::Long, 0)).unwrap()
        );
        assert_eq!(
            Reading::Value(NativeValue::Char(u16::from(b'x'))),
            reader.read(Slot::new(Subtype::Char, 0)).unwrap()
        );
        assert_eq!(
            Reading::Value(NativeValue::Float(f32::NAN)),
            reader.read(Slot::new(Subtype::Float, 0)).unwrap()
        );
        assert!(reader.read(Slot::new(Subtype::Int, 0)).is_err());
    }

    #[test]
    fn bytes_past_the_end_render_the_sentinel() {
        let mut elements = List::new();
        elements.push(Value::null());
        let message = Message::builder().sequence(elements).build();

        let mut reader = MessageShape::Stream.reader(&message).unwrap();
        let null_read = reader.read(Slot::new(Subtype::Bytes, 0)).unwrap();
        let end_read = reader.read(Slot::new(Subtype::Bytes, 1)).unwrap();
        for reading in [null_read, end_read].iter() {
            assert_eq!(
                BYTES_ERROR,
                MessageShape::Stream.render(Subtype::Bytes, reading).unwrap()
            );
        }
    }

    #[test]
    fn surrogate_chars_cannot_be_streamed() {
        let mut writer = MessageShape::Stream.writer();
        assert!(writer
            .write(Slot::new(Subtype::Char, 0), &NativeValue::Char(0xd800))
            .is_err());
    }
}
