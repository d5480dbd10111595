use std::io::Write;

#[cfg(test)]
use fake::Fake;

use super::{primitives::ULong, symbol::Symbol};
use crate::message::amqp::{
    codec::{constants::TypeCode, AmqpDecoder, AmqpEncoder},
    error::{AmqpDecodeError, AmqpEncodeError},
};

/// Descriptor of a described type, numeric for the message sections.
/// Encodes with its `0x00` constructor.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
#[cfg_attr(test, derive(fake::Dummy))]
pub enum Descriptor {
    Ulong(u64),
    Symbol(Symbol),
}

impl AmqpEncoder for Descriptor {
    fn encoded_size(&self) -> u32 {
        TypeCode::Described.encoded_size()
            + match self {
                Descriptor::Ulong(code) => code.encoded_size(),
                Descriptor::Symbol(name) => name.encoded_size(),
            }
    }

    fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
        TypeCode::Described.encode(writer)?;
        match self {
            Descriptor::Ulong(code) => code.encode(writer),
            Descriptor::Symbol(name) => name.encode(writer),
        }
    }
}

impl AmqpDecoder for Descriptor {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        let input = match TypeCode::decode(input)? {
            (input, TypeCode::Described) => input,
            (_, code) => return Err(Self::invalid_type_code(code)),
        };
        match TypeCode::decode(input)? {
            (_, TypeCode::ULong0) | (_, TypeCode::ULongSmall) | (_, TypeCode::ULong) => {
                let (input, code) = ULong::decode(input)?;
                Ok((input, Descriptor::Ulong(code)))
            }
            (_, TypeCode::Symbol8) | (_, TypeCode::Symbol32) => {
                let (input, name) = Symbol::decode(input)?;
                Ok((input, Descriptor::Symbol(name)))
            }
            (_, code) => Err(Self::invalid_type_code(code)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Descriptor;
    use crate::message::amqp::{tests::type_encode_decode_test_fuzzy, AmqpDecoder};

    #[test]
    fn descriptor_round_trip() {
        type_encode_decode_test_fuzzy::<Descriptor>()
    }

    #[test]
    fn symbolic_descriptor() {
        let input = [0x00, 0xa3, 0x03, b'a', b':', b'b'];
        let (remaining, descriptor) = Descriptor::decode(&input).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(Descriptor::Symbol("a:b".into()), descriptor);
    }
}
