use std::io::Write;

use super::Value;
use crate::message::amqp::{
    codec::{
        compound_header_size, constants::TypeCode, read_compound_count, write_compound_header,
    },
    types::Descriptor,
    AmqpDecodeError, AmqpDecoder, AmqpEncodeError, AmqpEncoder,
};

/// AMQP list, also the payload of an `amqp-sequence` body section
#[derive(Debug, PartialEq, Eq, Clone, Hash, Default)]
pub struct List(pub Vec<Value>);

impl List {
    pub fn new() -> Self {
        Self(vec![])
    }

    pub fn push(&mut self, elem: impl Into<Value>) {
        self.0.push(elem.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    fn content_size(&self) -> u32 {
        self.0.iter().map(Value::encoded_size).sum()
    }
}

/// Consumes a list constructor and returns the element count.
pub(crate) fn read_list_header(input: &[u8]) -> Result<(&[u8], u32), AmqpDecodeError> {
    match TypeCode::decode(input)? {
        (input, TypeCode::List0) => Ok((input, 0)),
        (input, code) => {
            read_compound_count::<List>(input, code, TypeCode::List8, TypeCode::List32)
        }
    }
}

impl AmqpEncoder for List {
    fn encoded_size(&self) -> u32 {
        let content_size = self.content_size();
        compound_header_size(content_size) + content_size
    }

    fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
        write_compound_header(
            writer,
            TypeCode::List8,
            TypeCode::List32,
            self.content_size(),
            self.0.len() as u32,
        )?;
        self.0.iter().try_for_each(|item| item.encode(writer))
    }
}

impl AmqpDecoder for List {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        let (mut input, count) = read_list_header(input)?;
        let mut list = List::new();
        for _ in 0..count {
            let (remaining, elem) = Value::decode(input)?;
            list.0.push(elem);
            input = remaining;
        }
        Ok((input, list))
    }
}

impl From<Vec<Value>> for List {
    fn from(values: Vec<Value>) -> Self {
        List(values)
    }
}

/// Field of a described list such as the header or properties section.
pub(crate) trait ListField: Sized {
    /// Decodes the field; `None` keeps the field's default.
    fn decode_field(input: &[u8]) -> Result<(&[u8], Option<Self>), AmqpDecodeError>;
}

impl<T: AmqpDecoder> ListField for Option<T> {
    fn decode_field(input: &[u8]) -> Result<(&[u8], Option<Self>), AmqpDecodeError> {
        let (input, value) = Option::<T>::decode(input)?;
        Ok((input, Some(value)))
    }
}

macro_rules! defaulted_field {
    ($($ty:ty),*) => {
        $(
            impl ListField for $ty {
                fn decode_field(input: &[u8]) -> Result<(&[u8], Option<Self>), AmqpDecodeError> {
                    Option::<$ty>::decode(input)
                }
            }
        )*
    };
}

defaulted_field!(bool, u8, u32);

pub(crate) fn decode_field<'a, F: ListField>(
    input: &'a [u8],
    field: &mut F,
) -> Result<&'a [u8], AmqpDecodeError> {
    let (input, value) = F::decode_field(input)?;
    if let Some(value) = value {
        *field = value;
    }
    Ok(input)
}

pub(crate) fn expect_descriptor<'a, T: AmqpDecoder>(
    input: &'a [u8],
    expected: &Descriptor,
) -> Result<&'a [u8], AmqpDecodeError> {
    match Descriptor::decode(input)? {
        (input, ref descriptor) if descriptor == expected => Ok(input),
        (_, descriptor) => Err(AmqpDecodeError::MessageParse(format!(
            "{} cannot be described by {:?}",
            std::any::type_name::<T>(),
            descriptor
        ))),
    }
}

/// Implements the codec of a described list. Fields are written in
/// declaration order; fields missing from the input keep their
/// `Default` value and unknown trailing fields are skipped.
macro_rules! described_list {
    ($ty:ident, $descriptor:expr, [$($field:ident),+ $(,)?]) => {
        impl $ty {
            const FIELD_COUNT: u32 = [$(stringify!($field)),+].len() as u32;

            fn content_size(&self) -> u32 {
                0 $(+ $crate::message::amqp::AmqpEncoder::encoded_size(&self.$field))+
            }
        }

        impl $crate::message::amqp::AmqpEncoder for $ty {
            fn encoded_size(&self) -> u32 {
                let content_size = self.content_size();
                $crate::message::amqp::AmqpEncoder::encoded_size(&$descriptor)
                    + $crate::message::amqp::codec::compound_header_size(content_size)
                    + content_size
            }

            fn encode(
                &self,
                writer: &mut impl std::io::Write,
            ) -> Result<(), $crate::message::amqp::AmqpEncodeError> {
                use $crate::message::amqp::{AmqpEncoder, TypeCode};
                AmqpEncoder::encode(&$descriptor, writer)?;
                $crate::message::amqp::codec::write_compound_header(
                    writer,
                    TypeCode::List8,
                    TypeCode::List32,
                    self.content_size(),
                    Self::FIELD_COUNT,
                )?;
                $(AmqpEncoder::encode(&self.$field, writer)?;)+
                Ok(())
            }
        }

        impl $crate::message::amqp::AmqpDecoder for $ty {
            fn decode(
                input: &[u8],
            ) -> Result<(&[u8], Self), $crate::message::amqp::AmqpDecodeError> {
                use $crate::message::amqp::{
                    types::{decode_field, expect_descriptor, read_list_header},
                    AmqpDecoder, Value,
                };
                let input = expect_descriptor::<Self>(input, &$descriptor)?;
                let (mut input, mut remaining) = read_list_header(input)?;
                let mut decoded = $ty::default();
                $(
                    if remaining > 0 {
                        input = decode_field(input, &mut decoded.$field)?;
                        remaining -= 1;
                    }
                )+
                for _ in 0..remaining {
                    input = <Value as AmqpDecoder>::decode(input)?.0;
                }
                Ok((input, decoded))
            }
        }
    };
}

pub(crate) use described_list;

#[cfg(test)]
mod tests {
    use std::ops::Range;

    use fake::{Dummy, Fake, Faker};
    use pretty_assertions::assert_eq;

    use crate::message::amqp::{
        tests::type_encode_decode_test_fuzzy,
        types::{SimpleValue, Value},
        AmqpDecoder, AmqpEncoder,
    };

    use super::List;
    const DEFAULT_LEN_RANGE: Range<usize> = 0..10;

    impl Dummy<Faker> for List {
        fn dummy_with_rng<R: fake::rand::Rng + ?Sized>(config: &Faker, rng: &mut R) -> Self {
            let len: usize = DEFAULT_LEN_RANGE.fake_with_rng(rng);
            let mut list = List::new();
            for _ in 0..len {
                let simple: SimpleValue = config.fake_with_rng(rng);
                list.push(Value::Simple(simple));
            }
            list
        }
    }

    #[test]
    fn list_encode_decode_test() {
        type_encode_decode_test_fuzzy::<List>()
    }

    #[test]
    fn empty_list_accepts_list0() {
        let (remaining, decoded) = List::decode(&[0x45, 0x40]).unwrap();
        assert_eq!(&[0x40], remaining);
        assert!(decoded.is_empty());
    }

    #[test]
    fn large_list_uses_list32() {
        let mut list = List::new();
        for idx in 0..100 {
            list.push(format!("element-{}", idx));
        }

        let mut buffer = vec![];
        list.encode(&mut buffer).unwrap();
        assert_eq!(0xd0, buffer[0]);
        assert_eq!(buffer.len() as u32, list.encoded_size());

        let (remaining, decoded) = List::decode(&buffer).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(list, decoded);
    }

    #[test]
    fn count_beyond_the_input_is_a_decode_error() {
        let corrupt = [0xd0, 0x00, 0x00, 0x00, 0x04, 0xff, 0xff, 0xff, 0xff];
        assert!(List::decode(&corrupt).is_err());
    }
}
