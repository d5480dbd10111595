use std::io::Write;

#[cfg(test)]
use fake::Fake;

use super::{Map, Symbol, ULong, Value};
use crate::{
    codec::decoder::MapDecoded,
    message::amqp::{
        codec::constants::TypeCode, AmqpDecodeError, AmqpDecoder, AmqpEncodeError, AmqpEncoder,
    },
};

/// Key of an annotation map, either a symbol or a numeric descriptor
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
#[cfg_attr(test, derive(fake::Dummy))]
pub enum AnnotationKey {
    Symbol(Symbol),
    ULong(ULong),
}

pub type Annotations = Map<AnnotationKey, Value>;

impl Annotations {
    pub fn put<K, V>(&mut self, key: K, value: V) -> Option<Value>
    where
        K: Into<AnnotationKey>,
        V: Into<Value>,
    {
        self.0.insert(key.into(), value.into())
    }

    /// Looks up a symbol keyed annotation
    pub fn get_symbol(&self, key: &str) -> Option<&Value> {
        self.0.get(&AnnotationKey::from(key))
    }
}

impl From<&str> for AnnotationKey {
    fn from(string: &str) -> Self {
        AnnotationKey::Symbol(Symbol::from(string))
    }
}

impl From<String> for AnnotationKey {
    fn from(string: String) -> Self {
        AnnotationKey::Symbol(Symbol::from(string))
    }
}
impl From<u64> for AnnotationKey {
    fn from(number: u64) -> Self {
        AnnotationKey::ULong(number)
    }
}

impl AmqpDecoder for AnnotationKey {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        match TypeCode::decode(input)? {
            (_, TypeCode::Symbol8) | (_, TypeCode::Symbol32) => {
                Symbol::decode(input).map_decoded(AnnotationKey::Symbol)
            }
            (_, TypeCode::ULong0) | (_, TypeCode::ULongSmall) | (_, TypeCode::ULong) => {
                ULong::decode(input).map_decoded(AnnotationKey::ULong)
            }
            (_, code) => Err(Self::invalid_type_code(code)),
        }
    }
}

impl AmqpEncoder for AnnotationKey {
    fn encoded_size(&self) -> u32 {
        match self {
            AnnotationKey::Symbol(symbol) => symbol.encoded_size(),
            AnnotationKey::ULong(code) => code.encoded_size(),
        }
    }

    fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
        match self {
            AnnotationKey::Symbol(symbol) => symbol.encode(writer),
            AnnotationKey::ULong(code) => code.encode(writer),
        }
    }
}
