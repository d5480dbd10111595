use bytes::{Buf, BufMut, Bytes, BytesMut};
use interop_shims_protocol::{
    jms::{JmsMessageType, OCTET_STREAM_CONTENT_TYPE},
    message::{Message, MessageBuilder},
};

use super::{admit, annotate, end_of_body, MessageShape, Reading, ShapeReader, ShapeWriter, Slot};
use crate::{codec::NativeValue, error::ShimError, object::ObjectValue, subtype::Subtype, ShimResult};

/// Big-endian data stream in a single `data` section
#[derive(Default)]
pub(crate) struct RawBytesWriter {
    body: BytesMut,
}

fn put_utf(body: &mut BytesMut, subtype: Subtype, text: &str) -> ShimResult<()> {
    if text.len() > u16::MAX as usize {
        return Err(ShimError::malformed(
            subtype.as_str(),
            format!("{}...", text.chars().take(16).collect::<String>()),
            "longer than 65535 bytes",
        ));
    }
    body.put_u16(text.len() as u16);
    body.put_slice(text.as_bytes());
    Ok(())
}

impl ShapeWriter for RawBytesWriter {
    fn write(&mut self, slot: Slot, value: &NativeValue) -> ShimResult<()> {
        admit(MessageShape::RawBytes, slot, value)?;
        let body = &mut self.body;
        match value {
            NativeValue::Null => {}
            NativeValue::Boolean(value) => body.put_u8(u8::from(*value)),
            NativeValue::Byte(value) => body.put_i8(*value),
            NativeValue::Short(value) => body.put_i16(*value),
            NativeValue::Char(unit) => body.put_u16(*unit),
            NativeValue::Int(value) => body.put_i32(*value),
            NativeValue::Long(value) => body.put_i64(*value),
            NativeValue::Float(value) => body.put_u32(value.to_bits()),
            NativeValue::Double(value) => body.put_u64(value.to_bits()),
            NativeValue::Bytes(bytes) | NativeValue::Binary(bytes) => body.put_slice(bytes),
            NativeValue::String(text) | NativeValue::Symbol(text) => {
                put_utf(body, slot.subtype, text)?
            }
            NativeValue::Object(object) => body.put_slice(&object.serialize()?),
            NativeValue::Ubyte(value) => body.put_u8(*value),
            NativeValue::Ushort(value) => body.put_u16(*value),
            NativeValue::Uint(value) => body.put_u32(*value),
            NativeValue::Ulong(value) => body.put_u64(*value),
            NativeValue::Timestamp(millis) => body.put_i64(*millis),
            other => return Err(ShimError::unsupported(other.subtype().as_str(), "raw bytes")),
        }
        Ok(())
    }

    fn seal(self: Box<Self>) -> ShimResult<MessageBuilder> {
        let builder = Message::builder()
            .body(self.body.to_vec())
            .properties()
            .content_type(OCTET_STREAM_CONTENT_TYPE)
            .message_builder();
        Ok(annotate(builder, JmsMessageType::Bytes))
    }
}

pub(crate) struct RawBytesReader {
    body: Bytes,
}

impl RawBytesReader {
    pub(crate) fn open(message: &Message) -> ShimResult<Self> {
        if message.value().is_some() || message.sequence().is_some() {
            return Err(ShimError::shape(
                MessageShape::RawBytes.token(),
                "a message without a data section",
            ));
        }
        Ok(RawBytesReader {
            body: Bytes::copy_from_slice(message.data().unwrap_or_default()),
        })
    }

    fn need(&self, subtype: Subtype, len: usize) -> ShimResult<()> {
        if self.body.remaining() < len {
            Err(end_of_body(subtype))
        } else {
            Ok(())
        }
    }

    fn get_utf(&mut self, subtype: Subtype) -> ShimResult<String> {
        self.need(subtype, 2)?;
        let len = self.body.get_u16() as usize;
        self.need(subtype, len)?;
        let bytes = self.body.split_to(len);
        String::from_utf8(bytes.to_vec())
            .map_err(|err| ShimError::malformed(subtype.as_str(), "", err.to_string()))
    }
}

impl ShapeReader for RawBytesReader {
    fn read(&mut self, slot: Slot) -> ShimResult<Reading> {
        let subtype = slot.subtype;
        MessageShape::RawBytes.check(subtype)?;

        let width = match subtype {
            Subtype::Boolean | Subtype::Byte | Subtype::Ubyte => 1,
            Subtype::Short | Subtype::Char | Subtype::Ushort => 2,
            Subtype::Int | Subtype::Float | Subtype::Uint => 4,
            Subtype::Long | Subtype::Double | Subtype::Ulong | Subtype::Timestamp => 8,
            _ => 0,
        };
        self.need(subtype, width)?;

        let value = match subtype {
            Subtype::Null => NativeValue::Null,
            Subtype::Boolean => NativeValue::Boolean(self.body.get_u8() != 0),
            Subtype::Byte => NativeValue::Byte(self.body.get_i8()),
            Subtype::Short => NativeValue::Short(self.body.get_i16()),
            Subtype::Char => NativeValue::Char(self.body.get_u16()),
            Subtype::Int => NativeValue::Int(self.body.get_i32()),
            Subtype::Long => NativeValue::Long(self.body.get_i64()),
            Subtype::Float => NativeValue::Float(f32::from_bits(self.body.get_u32())),
            Subtype::Double => NativeValue::Double(f64::from_bits(self.body.get_u64())),
            Subtype::Ubyte => NativeValue::Ubyte(self.body.get_u8()),
            Subtype::Ushort => NativeValue::Ushort(self.body.get_u16()),
            Subtype::Uint => NativeValue::Uint(self.body.get_u32()),
            Subtype::Ulong => NativeValue::Ulong(self.body.get_u64()),
            Subtype::Timestamp => NativeValue::Timestamp(self.body.get_i64()),
            Subtype::String => NativeValue::String(self.get_utf(subtype)?),
            Subtype::Symbol => NativeValue::Symbol(self.get_utf(subtype)?),
            Subtype::Bytes | Subtype::Binary | Subtype::Object if !self.body.has_remaining() => {
                return Ok(Reading::Exhausted)
            }
            Subtype::Bytes => NativeValue::Bytes(self.body.split_off(0).to_vec()),
            Subtype::Binary => NativeValue::Binary(self.body.split_off(0).to_vec()),
            Subtype::Object => {
                let rest = self.body.split_off(0);
                NativeValue::Object(ObjectValue::deserialize(&rest)?)
            }
            other => return Err(ShimError::unsupported(other.as_str(), "raw bytes")),
        };
        Ok(Reading::Value(value))
    }
}

#[cfg(test)]
mod tests {
    use interop_shims_protocol::jms::{JmsMessageType, JMS_MSG_TYPE};
    use pretty_assertions::assert_eq;

    use crate::{
        codec::{decode, NativeValue},
        object::ObjectValue,
        shape::{MessageShape, Reading, Slot},
        subtype::Subtype,
    };

    fn sealed(values: &[(Subtype, NativeValue)]) -> interop_shims_protocol::message::Message {
        let mut writer = MessageShape::RawBytes.writer();
        for (index, (subtype, value)) in values.iter().enumerate() {
            writer.write(Slot::new(*subtype, index), value).unwrap();
        }
        writer.seal().unwrap().build()
    }

    #[test]
    fn values_come_back_in_write_order() {
        let values = vec![
            (Subtype::Boolean, NativeValue::Boolean(true)),
            (Subtype::Short, NativeValue::Short(-2)),
            (Subtype::Char, NativeValue::Char(0xffff)),
            (Subtype::Double, NativeValue::Double(-0.0)),
            (Subtype::String, NativeValue::String("héllo".to_owned())),
            (Subtype::Ulong, NativeValue::Ulong(u64::MAX)),
            (Subtype::Bytes, NativeValue::Bytes(vec![1, 2, 3])),
        ];
        let message = sealed(&values);
        assert_eq!(
            Some(JmsMessageType::Bytes),
            message
                .annotation(JMS_MSG_TYPE)
                .and_then(JmsMessageType::from_annotation)
        );

        let mut reader = MessageShape::RawBytes.reader(&message).unwrap();
        for (index, (subtype, value)) in values.into_iter().enumerate() {
            assert_eq!(
                Reading::Value(value),
                reader.read(Slot::new(subtype, index)).unwrap()
            );
        }
        assert_eq!(
            Reading::Exhausted,
            reader.read(Slot::new(Subtype::Bytes, 1)).unwrap()
        );
    }

    #[test]
    fn objects_use_the_versioned_encoding() {
        let object = ObjectValue::construct("java.lang.Integer", "12").unwrap();
        let message = sealed(&[(Subtype::Object, NativeValue::Object(object.clone()))]);
        assert_eq!(0x01, message.data().unwrap()[0]);

        let mut reader = MessageShape::RawBytes.reader(&message).unwrap();
        assert_eq!(
            Reading::Value(NativeValue::Object(object)),
            reader.read(Slot::new(Subtype::Object, 0)).unwrap()
        );
        assert_eq!(
            Reading::Exhausted,
            reader.read(Slot::new(Subtype::Object, 1)).unwrap()
        );
    }

    #[test]
    fn empty_bytes_and_null_bodies() {
        let message = sealed(&[(Subtype::Bytes, decode(Subtype::Bytes, "").unwrap())]);
        let mut reader = MessageShape::RawBytes.reader(&message).unwrap();
        let reading = reader.read(Slot::new(Subtype::Bytes, 0)).unwrap();
        assert_eq!("", MessageShape::RawBytes.render(Subtype::Bytes, &reading).unwrap());

        let message = sealed(&[(Subtype::Null, NativeValue::Null)]);
        let mut reader = MessageShape::RawBytes.reader(&message).unwrap();
        assert_eq!(
            Reading::Value(NativeValue::Null),
            reader.read(Slot::new(Subtype::Null, 0)).unwrap()
        );
    }

    #[test]
    fn short_body_is_an_error() {
        let message = sealed(&[(Subtype::Short, NativeValue::Short(1))]);
        let mut reader = MessageShape::RawBytes.reader(&message).unwrap();
        assert!(reader.read(Slot::new(Subtype::Long, 0)).is_err());
    }
}
