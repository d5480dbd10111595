use std::{
    convert::{TryFrom, TryInto},
    hash::Hash,
    io::Write,
};

use super::{
    Binary, Boolean, Byte, Char, Decimal128, Decimal32, Decimal64, Double, Float, Int, List, Long,
    Map, Short, SimpleValue, Str, Timestamp, UByte, UInt, ULong, UShort, Uuid,
};
use crate::{
    codec::decoder::MapDecoded,
    error::DecodeError,
    message::amqp::{
        codec::constants::TypeCode, types::Descriptor, AmqpDecodeError, AmqpDecoder,
        AmqpEncodeError, AmqpEncoder, Symbol,
    },
};
use derive_more::From;

#[cfg(test)]
use fake::Fake;

/// AMQP 1.0 data types
#[derive(Debug, Eq, PartialEq, Hash, Clone)]
#[cfg_attr(test, derive(fake::Dummy))]
pub enum Value {
    Simple(SimpleValue),
    Collection(CollectionValue),
    Described(DescribedValue),
}

impl Value {
    pub fn null() -> Value {
        Value::Simple(SimpleValue::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Simple(SimpleValue::Null))
    }

    pub fn as_simple(&self) -> Option<&SimpleValue> {
        match self {
            Value::Simple(simple) => Some(simple),
            _ => None,
        }
    }
}

#[derive(Debug, Eq, PartialEq, Hash, Clone)]
#[cfg_attr(test, derive(fake::Dummy))]
pub struct DescribedValue {
    descriptor: Descriptor,
    value: Box<Value>,
}

impl DescribedValue {
    pub fn new(descriptor: Descriptor, value: impl Into<Value>) -> Self {
        DescribedValue {
            descriptor,
            value: Box::new(value.into()),
        }
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// The descriptor carries the `0x00` constructor, so a described value is
/// just the descriptor followed by the value.
impl AmqpEncoder for DescribedValue {
    fn encoded_size(&self) -> u32 {
        self.descriptor.encoded_size() + self.value.encoded_size()
    }

    fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
        self.descriptor.encode(writer)?;
        self.value.encode(writer)
    }
}

impl AmqpDecoder for DescribedValue {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        let (input, descriptor) = Descriptor::decode(input)?;
        let (input, value) = Value::decode(input)?;
        Ok((input, DescribedValue::new(descriptor, value)))
    }
}

#[derive(Debug, Eq, PartialEq, Hash, Clone, From)]
#[cfg_attr(test, derive(fake::Dummy))]
pub enum CollectionValue {
    List(List),
    Map(Map<Value, Value>),
}

impl AmqpDecoder for CollectionValue {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        match TypeCode::decode(input)? {
            (_, TypeCode::List0) | (_, TypeCode::List8) | (_, TypeCode::List32) => {
                List::decode(input).map_decoded(CollectionValue::List)
            }
            (_, TypeCode::Map8) | (_, TypeCode::Map32) => {
                Map::decode(input).map_decoded(CollectionValue::Map)
            }
            (_, code) => Err(Self::invalid_type_code(code)),
        }
    }
}

impl AmqpEncoder for CollectionValue {
    fn encoded_size(&self) -> u32 {
        match self {
            CollectionValue::List(list) => list.encoded_size(),
            CollectionValue::Map(map) => map.encoded_size(),
        }
    }

    fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
        match self {
            CollectionValue::List(list) => list.encode(writer),
            CollectionValue::Map(map) => map.encode(writer),
        }
    }
}

// Map equality ignores entry order, so only the length is hashed.
impl Hash for Map<Value, Value> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.len().hash(state);
    }
}

impl AmqpDecoder for Value {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        let (_, code) = TypeCode::decode(input)?;
        match code {
            TypeCode::Described => DescribedValue::decode(input).map_decoded(Value::Described),
            TypeCode::List0
            | TypeCode::List8
            | TypeCode::List32
            | TypeCode::Map8
            | TypeCode::Map32 => CollectionValue::decode(input).map_decoded(Value::Collection),
            TypeCode::Array8 | TypeCode::Array32 => Err(AmqpDecodeError::parse_error(
                "array values are not supported".to_owned(),
            )),
            _ => SimpleValue::decode(input).map_decoded(Value::Simple),
        }
    }
}

impl AmqpEncoder for Value {
    fn encoded_size(&self) -> u32 {
        match self {
            Value::Simple(simple) => simple.encoded_size(),
            Value::Collection(collection) => collection.encoded_size(),
            Value::Described(described) => described.encoded_size(),
        }
    }

    fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
        match self {
            Value::Simple(simple) => simple.encode(writer),
            Value::Collection(collection) => collection.encode(writer),
            Value::Described(described) => described.encode(writer),
        }
    }
}

/// `From<T> for Value` and `TryFrom<&Value> for &T` for every simple type.
macro_rules! simple_conversions {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Value {
                    Value::Simple(value.into())
                }
            }

            impl<'a> TryFrom<&'a Value> for &'a $ty {
                type Error = DecodeError;

                fn try_from(value: &'a Value) -> Result<Self, Self::Error> {
                    let simple = value.as_simple().ok_or_else(|| {
                        DecodeError::MessageParse(format!("{:?} is not a simple value", value))
                    })?;
                    simple
                        .try_into()
                        .map_err(|err| DecodeError::MessageParse(format!("{}", err)))
                }
            }
        )+
    };
}

simple_conversions!(
    Boolean, UByte, UShort, UInt, ULong, Byte, Short, Int, Long, Float, Double, Decimal32,
    Decimal64, Decimal128, Char, Timestamp, Uuid, Binary, Str, Symbol,
);

impl From<&str> for Value {
    fn from(value: &str) -> Value {
        Value::Simple(value.into())
    }
}

impl From<SimpleValue> for Value {
    fn from(value: SimpleValue) -> Value {
        Value::Simple(value)
    }
}

impl From<List> for Value {
    fn from(value: List) -> Value {
        Value::Collection(value.into())
    }
}

impl From<Map<Value, Value>> for Value {
    fn from(value: Map<Value, Value>) -> Value {
        Value::Collection(value.into())
    }
}

impl From<DescribedValue> for Value {
    fn from(value: DescribedValue) -> Value {
        Value::Described(value)
    }
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use pretty_assertions::assert_eq;

    use super::{DescribedValue, Value};
    use crate::message::amqp::{types::Descriptor, AmqpDecoder, AmqpEncoder};

    #[test]
    fn described_value_has_one_constructor() {
        let described = DescribedValue::new(Descriptor::Ulong(0x77), "payload");
        let mut buffer = vec![];
        Value::from(described.clone()).encode(&mut buffer).unwrap();
        assert_eq!(&[0x00, 0x53, 0x77, 0xa1], &buffer[..4]);

        let (remaining, decoded) = Value::decode(&buffer).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(Value::Described(described), decoded);
    }

    #[test]
    fn simple_values_borrow_out() {
        let value = Value::from(-5i64);
        assert_eq!(-5, *<&i64>::try_from(&value).unwrap());
        assert!(<&String>::try_from(&value).is_err());
    }
}
