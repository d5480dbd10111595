use std::collections::HashMap;

use interop_shims_protocol::{
    jms::JmsMessageType,
    message::{CollectionValue, Map, Message, MessageBuilder, SimpleValue, Value},
};

use super::{admit, annotate, MessageShape, Reading, ShapeReader, ShapeWriter, Slot};
use crate::{codec::NativeValue, error::ShimError, ShimResult};

/// `amqp-value` map keyed by `<subtype><NNN>`
#[derive(Default)]
pub(crate) struct MapWriter {
    entries: Map<Value, Value>,
}

impl ShapeWriter for MapWriter {
    fn write(&mut self, slot: Slot, value: &NativeValue) -> ShimResult<()> {
        admit(MessageShape::OrderedMap, slot, value)?;
        let key = slot.key();
        if self.entries.contains_key(&Value::from(key.as_str())) {
            return Err(ShimError::Argument(format!("map key {} written twice", key)));
        }
        self.entries.insert(key, value.to_amqp()?);
        Ok(())
    }

    fn seal(self: Box<Self>) -> ShimResult<MessageBuilder> {
        Ok(annotate(
            Message::builder().value(self.entries),
            JmsMessageType::Map,
        ))
    }
}

pub(crate) struct MapReader {
    entries: HashMap<String, Value>,
}

impl MapReader {
    pub(crate) fn open(message: &Message) -> ShimResult<Self> {
        let map = match message.value() {
            Some(Value::Collection(CollectionValue::Map(map))) => map,
            other => {
                return Err(ShimError::shape(
                    MessageShape::OrderedMap.token(),
                    format!("body {:?}", other),
                ))
            }
        };

        let mut entries = HashMap::with_capacity(map.len());
        for (key, value) in map.iter() {
            match key {
                Value::Simple(SimpleValue::String(key)) => {
                    entries.insert(key.clone(), value.clone());
                }
                other => {
                    return Err(ShimError::shape(
                        "string map keys",
                        format!("key {:?}", other),
                    ))
                }
            }
        }
        Ok(MapReader { entries })
    }
}

impl ShapeReader for MapReader {
    fn read(&mut self, slot: Slot) -> ShimResult<Reading> {
        MessageShape::OrderedMap.check(slot.subtype)?;
        let key = slot.key();
        let entry = self.entries.remove(&key).ok_or_else(|| {
            ShimError::malformed(slot.subtype.as_str(), "", format!("no map entry {}", key))
        })?;

        entry
            .as_simple()
            .and_then(|simple| NativeValue::from_amqp(slot.subtype, simple))
            .map(Reading::Value)
            .ok_or_else(|| {
                ShimError::malformed(
                    slot.subtype.as_str(),
                    format!("{:?}", entry),
                    format!("map entry {} cannot be read as {}", key, slot.subtype),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use interop_shims_protocol::message::{Message, SimpleValue, Value};
    use pretty_assertions::assert_eq;

    use crate::{
        codec::{decode, NativeValue},
        error::ShimError,
        shape::{MessageShape, Reading, Slot},
        subtype::Subtype,
    };

    #[test]
    fn values_are_keyed_by_subtype_and_index() {
        let mut writer = MessageShape::OrderedMap.writer();
        writer
            .write(Slot::new(Subtype::Int, 2), &decode(Subtype::Int, "-0x1").unwrap())
            .unwrap();
        writer
            .write(
                Slot::new(Subtype::Object, 0),
                &decode(Subtype::Object, "java.lang.Short:7").unwrap(),
            )
            .unwrap();
        let message = writer.seal().unwrap().build();

        let map = match message.value() {
            Some(Value::Collection(interop_shims_protocol::message::CollectionValue::Map(map))) => {
                map.clone()
            }
            other => panic!("unexpected body {:?}", other),
        };
        assert_eq!(
            Some(&Value::Simple(SimpleValue::Int(-1))),
            map.get(&Value::from("int002"))
        );
        assert_eq!(
            Some(&Value::Simple(SimpleValue::Short(7))),
            map.get(&Value::from("object000"))
        );

        let mut reader = MessageShape::OrderedMap.reader(&message).unwrap();
        assert_eq!(
            Reading::Value(NativeValue::Int(-1)),
            reader.read(Slot::new(Subtype::Int, 2)).unwrap()
        );
        assert_eq!(
            "java.lang.Short:7",
            MessageShape::OrderedMap
                .render(
                    Subtype::Object,
                    &reader.read(Slot::new(Subtype::Object, 0)).unwrap()
                )
                .unwrap()
        );
    }

    #[test]
    fn slots_are_consumed_once() {
        let mut writer = MessageShape::OrderedMap.writer();
        let slot = Slot::new(Subtype::Boolean, 0);
        writer.write(slot, &NativeValue::Boolean(true)).unwrap();
        assert!(matches!(
            writer.write(slot, &NativeValue::Boolean(false)),
            Err(ShimError::Argument(_))
        ));

        let message = writer.seal().unwrap().build();
        let mut reader = MessageShape::OrderedMap.reader(&message).unwrap();
        assert!(reader.read(slot).is_ok());
        assert!(reader.read(slot).is_err());
    }

    #[test]
    fn non_map_body_is_rejected() {
        let message = Message::builder().value("text").build();
        assert!(matches!(
            MessageShape::OrderedMap.reader(&message),
            Err(ShimError::UnexpectedShape { .. })
        ));
    }
}
