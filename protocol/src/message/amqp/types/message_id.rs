use std::io::Write;

use derive_more::{From, TryInto};
#[cfg(test)]
use fake::Fake;

use super::{Binary, Long, Str, ULong, Uuid};
use crate::{
    codec::decoder::MapDecoded,
    message::amqp::{
        codec::{constants::TypeCode, AmqpDecoder, AmqpEncoder},
        error::{AmqpDecodeError, AmqpEncodeError},
    },
};

/// Identifier carried by `message-id` and `correlation-id`
#[derive(Debug, Eq, PartialEq, Clone, From, TryInto)]
#[try_into(owned, ref, ref_mut)]
#[cfg_attr(test, derive(fake::Dummy))]
pub enum MessageId {
    ULong(ULong),
    Long(Long),
    Uuid(Uuid),
    Binary(Binary),
    String(Str),
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        MessageId::String(id.to_owned())
    }
}

macro_rules! with_id {
    ($id:expr, $inner:ident => $body:expr) => {
        match $id {
            MessageId::ULong($inner) => $body,
            MessageId::Long($inner) => $body,
            MessageId::Uuid($inner) => $body,
            MessageId::Binary($inner) => $body,
            MessageId::String($inner) => $body,
        }
    };
}

impl AmqpEncoder for MessageId {
    fn encoded_size(&self) -> u32 {
        with_id!(self, id => id.encoded_size())
    }

    fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
        with_id!(self, id => id.encode(writer))
    }
}

impl AmqpDecoder for MessageId {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        match TypeCode::decode(input)? {
            (_, TypeCode::ULong0) | (_, TypeCode::ULongSmall) | (_, TypeCode::ULong) => {
                ULong::decode(input).map_decoded(MessageId::ULong)
            }
            (_, TypeCode::LongSmall) | (_, TypeCode::Long) => {
                Long::decode(input).map_decoded(MessageId::Long)
            }
            (_, TypeCode::Uuid) => Uuid::decode(input).map_decoded(MessageId::Uuid),
            (_, TypeCode::Binary8) | (_, TypeCode::Binary32) => {
                Binary::decode(input).map_decoded(MessageId::Binary)
            }
            (_, TypeCode::String8) | (_, TypeCode::String32) => {
                Str::decode(input).map_decoded(MessageId::String)
            }
            (_, code) => Err(Self::invalid_type_code(code)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MessageId;
    use crate::message::amqp::tests::type_encode_decode_test_fuzzy;

    #[test]
    fn message_id_round_trip() {
        type_encode_decode_test_fuzzy::<MessageId>()
    }
}
