use std::{convert::TryFrom, io::Write};

use byteorder::{BigEndian, WriteBytesExt};
use chrono::{DateTime, Utc};
use derive_more::{From, TryInto};
use ordered_float::OrderedFloat;

use crate::{
    codec::decoder::{
        read_exact, read_f32, read_f64, read_i16, read_i32, read_i64, read_i8, read_u16, read_u32,
        read_u64, read_u8, MapDecoded,
    },
    message::amqp::{
        codec::{constants::TypeCode, AmqpEncoder},
        error::AmqpEncodeError,
        types::Symbol,
        AmqpDecodeError, AmqpDecoder,
    },
};

#[cfg(test)]
use fake::Fake;

/// Primitive AMQP 1.0 data type
#[derive(Debug, Eq, PartialEq, Hash, Clone, From, TryInto)]
#[try_into(owned, ref, ref_mut)]
#[cfg_attr(test, derive(fake::Dummy))]
pub enum SimpleValue {
    Null,
    Boolean(Boolean),
    Ubyte(UByte),
    Ushort(UShort),
    Uint(UInt),
    Ulong(ULong),
    Byte(Byte),
    Short(Short),
    Int(Int),
    Long(Long),
    Float(Float),
    Double(Double),
    Decimal32(Decimal32),
    Decimal64(Decimal64),
    Decimal128(Decimal128),
    Char(Char),
    Timestamp(Timestamp),
    Uuid(Uuid),
    Binary(Binary),
    String(Str),
    Symbol(Symbol),
}

/// Applies `$body` to the payload of every non-null variant.
macro_rules! with_payload {
    ($value:expr, $payload:ident => $body:expr, null => $null:expr) => {
        match $value {
            SimpleValue::Null => $null,
            SimpleValue::Boolean($payload) => $body,
            SimpleValue::Ubyte($payload) => $body,
            SimpleValue::Ushort($payload) => $body,
            SimpleValue::Uint($payload) => $body,
            SimpleValue::Ulong($payload) => $body,
            SimpleValue::Byte($payload) => $body,
            SimpleValue::Short($payload) => $body,
            SimpleValue::Int($payload) => $body,
            SimpleValue::Long($payload) => $body,
            SimpleValue::Float($payload) => $body,
            SimpleValue::Double($payload) => $body,
            SimpleValue::Decimal32($payload) => $body,
            SimpleValue::Decimal64($payload) => $body,
            SimpleValue::Decimal128($payload) => $body,
            SimpleValue::Char($payload) => $body,
            SimpleValue::Timestamp($payload) => $body,
            SimpleValue::Uuid($payload) => $body,
            SimpleValue::Binary($payload) => $body,
            SimpleValue::String($payload) => $body,
            SimpleValue::Symbol($payload) => $body,
        }
    };
}

impl From<&str> for SimpleValue {
    fn from(string: &str) -> Self {
        SimpleValue::String(string.into())
    }
}

impl AmqpEncoder for SimpleValue {
    fn encoded_size(&self) -> u32 {
        with_payload!(self, payload => payload.encoded_size(), null => 1)
    }

    fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
        with_payload!(self, payload => payload.encode(writer), null => TypeCode::Null.encode(writer))
    }
}

impl AmqpDecoder for SimpleValue {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        let (_, code) = TypeCode::decode(input)?;
        match code {
            TypeCode::Null => TypeCode::decode(input).map_decoded(|_| SimpleValue::Null),
            TypeCode::Boolean | TypeCode::BooleanFalse | TypeCode::BooleanTrue => {
                bool::decode(input).map_decoded(SimpleValue::Boolean)
            }
            TypeCode::UByte => u8::decode(input).map_decoded(SimpleValue::Ubyte),
            TypeCode::UShort => u16::decode(input).map_decoded(SimpleValue::Ushort),
            TypeCode::UInt0 | TypeCode::UIntSmall | TypeCode::UInt => {
                u32::decode(input).map_decoded(SimpleValue::Uint)
            }
            TypeCode::ULong0 | TypeCode::ULongSmall | TypeCode::ULong => {
                u64::decode(input).map_decoded(SimpleValue::Ulong)
            }
            TypeCode::Byte => i8::decode(input).map_decoded(SimpleValue::Byte),
            TypeCode::Short => i16::decode(input).map_decoded(SimpleValue::Short),
            TypeCode::IntSmall | TypeCode::Int => i32::decode(input).map_decoded(SimpleValue::Int),
            TypeCode::LongSmall | TypeCode::Long => {
                i64::decode(input).map_decoded(SimpleValue::Long)
            }
            TypeCode::Float => Float::decode(input).map_decoded(SimpleValue::Float),
            TypeCode::Double => Double::decode(input).map_decoded(SimpleValue::Double),
            TypeCode::Decimal32 => Decimal32::decode(input).map_decoded(SimpleValue::Decimal32),
            TypeCode::Decimal64 => Decimal64::decode(input).map_decoded(SimpleValue::Decimal64),
            TypeCode::Decimal128 => {
                Decimal128::decode(input).map_decoded(SimpleValue::Decimal128)
            }
            TypeCode::Char => char::decode(input).map_decoded(SimpleValue::Char),
            TypeCode::Timestamp => Timestamp::decode(input).map_decoded(SimpleValue::Timestamp),
            TypeCode::Uuid => Uuid::decode(input).map_decoded(SimpleValue::Uuid),
            TypeCode::Binary8 | TypeCode::Binary32 => {
                Binary::decode(input).map_decoded(SimpleValue::Binary)
            }
            TypeCode::String8 | TypeCode::String32 => {
                Str::decode(input).map_decoded(SimpleValue::String)
            }
            TypeCode::Symbol8 | TypeCode::Symbol32 => {
                Symbol::decode(input).map_decoded(SimpleValue::Symbol)
            }
            _ => Err(Self::invalid_type_code(code)),
        }
    }
}

pub type Boolean = bool;
pub type UByte = u8;
pub type UShort = u16;
pub type UInt = u32;
pub type ULong = u64;
pub type Byte = i8;
pub type Short = i16;
pub type Int = i32;
pub type Long = i64;
pub type Char = char;
pub type Uuid = uuid::Uuid;
pub type Binary = Vec<u8>;
pub type Str = String;

/// Scalars with exactly one format code and a fixed payload width.
macro_rules! fixed_width {
    ($ty:ty, $code:ident, $width:expr, $read:expr, |$writer:ident, $value:ident| $write:expr) => {
        impl AmqpEncoder for $ty {
            fn encoded_size(&self) -> u32 {
                1 + $width
            }

            fn encode(&self, $writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
                TypeCode::$code.encode($writer)?;
                let $value = *self;
                $write?;
                Ok(())
            }
        }

        impl AmqpDecoder for $ty {
            fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
                match TypeCode::decode(input)? {
                    (input, TypeCode::$code) => Ok(($read)(input)?),
                    (_, code) => Err(Self::invalid_type_code(code)),
                }
            }
        }
    };
}

fixed_width!(u8, UByte, 1, read_u8, |writer, value| writer.write_u8(value));
fixed_width!(i8, Byte, 1, read_i8, |writer, value| writer.write_i8(value));
fixed_width!(u16, UShort, 2, read_u16, |writer, value| {
    writer.write_u16::<BigEndian>(value)
});
fixed_width!(i16, Short, 2, read_i16, |writer, value| {
    writer.write_i16::<BigEndian>(value)
});
fixed_width!(
    Float,
    Float,
    4,
    |input| read_f32(input).map_decoded(Float::from),
    |writer, value| writer.write_f32::<BigEndian>(value.value())
);
fixed_width!(
    Double,
    Double,
    8,
    |input| read_f64(input).map_decoded(Double::from),
    |writer, value| writer.write_f64::<BigEndian>(value.value())
);
fixed_width!(
    Timestamp,
    Timestamp,
    8,
    |input| read_i64(input).map_decoded(Timestamp),
    |writer, value| writer.write_i64::<BigEndian>(value.0)
);
fixed_width!(
    Uuid,
    Uuid,
    16,
    |input| read_exact(input, 16).map_decoded(|bytes| {
        let mut raw = [0u8; 16];
        raw.copy_from_slice(bytes);
        Uuid::from_bytes(raw)
    }),
    |writer, value| writer.write_all(value.as_bytes())
);

/// Unsigned integers with a zero-width form and a one byte form.
macro_rules! compact_unsigned {
    ($ty:ty, $zero:ident, $small:ident, $full:ident, $width:expr, $read:ident, $write:ident) => {
        impl AmqpEncoder for $ty {
            fn encoded_size(&self) -> u32 {
                match u8::try_from(*self) {
                    Ok(0) => 1,
                    Ok(_) => 2,
                    Err(_) => 1 + $width,
                }
            }

            fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
                match u8::try_from(*self) {
                    Ok(0) => TypeCode::$zero.encode(writer)?,
                    Ok(small) => {
                        TypeCode::$small.encode(writer)?;
                        writer.write_u8(small)?;
                    }
                    Err(_) => {
                        TypeCode::$full.encode(writer)?;
                        writer.$write::<BigEndian>(*self)?;
                    }
                }
                Ok(())
            }
        }

        impl AmqpDecoder for $ty {
            fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
                match TypeCode::decode(input)? {
                    (input, TypeCode::$zero) => Ok((input, 0)),
                    (input, TypeCode::$small) => Ok(read_u8(input).map_decoded(<$ty>::from)?),
                    (input, TypeCode::$full) => Ok($read(input)?),
                    (_, code) => Err(Self::invalid_type_code(code)),
                }
            }
        }
    };
}

compact_unsigned!(u32, UInt0, UIntSmall, UInt, 4, read_u32, write_u32);
compact_unsigned!(u64, ULong0, ULongSmall, ULong, 8, read_u64, write_u64);

/// Signed integers with a one byte form for values that fit an `i8`.
macro_rules! compact_signed {
    ($ty:ty, $small:ident, $full:ident, $width:expr, $read:ident, $write:ident) => {
        impl AmqpEncoder for $ty {
            fn encoded_size(&self) -> u32 {
                if i8::try_from(*self).is_ok() {
                    2
                } else {
                    1 + $width
                }
            }

            fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
                match i8::try_from(*self) {
                    Ok(small) => {
                        TypeCode::$small.encode(writer)?;
                        writer.write_i8(small)?;
                    }
                    Err(_) => {
                        TypeCode::$full.encode(writer)?;
                        writer.$write::<BigEndian>(*self)?;
                    }
                }
                Ok(())
            }
        }

        impl AmqpDecoder for $ty {
            fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
                match TypeCode::decode(input)? {
                    (input, TypeCode::$small) => Ok(read_i8(input).map_decoded(<$ty>::from)?),
                    (input, TypeCode::$full) => Ok($read(input)?),
                    (_, code) => Err(Self::invalid_type_code(code)),
                }
            }
        }
    };
}

compact_signed!(i32, IntSmall, Int, 4, read_i32, write_i32);
compact_signed!(i64, LongSmall, Long, 8, read_i64, write_i64);

impl AmqpEncoder for bool {
    fn encoded_size(&self) -> u32 {
        1
    }

    fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
        if *self {
            TypeCode::BooleanTrue.encode(writer)
        } else {
            TypeCode::BooleanFalse.encode(writer)
        }
    }
}

impl AmqpDecoder for bool {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        match TypeCode::decode(input)? {
            (input, TypeCode::BooleanTrue) => Ok((input, true)),
            (input, TypeCode::BooleanFalse) => Ok((input, false)),
            (input, TypeCode::Boolean) => Ok(read_u8(input).map_decoded(|byte| byte != 0)?),
            (_, code) => Err(Self::invalid_type_code(code)),
        }
    }
}

/// UTF-32 code point; surrogates and values past `char::MAX` are rejected.
impl AmqpEncoder for char {
    fn encoded_size(&self) -> u32 {
        5
    }

    fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
        TypeCode::Char.encode(writer)?;
        writer.write_u32::<BigEndian>(u32::from(*self))?;
        Ok(())
    }
}

impl AmqpDecoder for char {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        match TypeCode::decode(input)? {
            (input, TypeCode::Char) => {
                let (input, point) = read_u32(input)?;
                let c = char::from_u32(point).ok_or_else(|| {
                    AmqpDecodeError::parse_error(format!("0x{:x} is not a char", point))
                })?;
                Ok((input, c))
            }
            (_, code) => Err(Self::invalid_type_code(code)),
        }
    }
}

impl<T: AmqpEncoder> AmqpEncoder for Option<T> {
    fn encoded_size(&self) -> u32 {
        self.as_ref().map_or(1, T::encoded_size)
    }

    fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
        match self {
            Some(value) => value.encode(writer),
            None => TypeCode::Null.encode(writer),
        }
    }
}

impl<T: AmqpDecoder> AmqpDecoder for Option<T> {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        match TypeCode::decode(input)? {
            (input, TypeCode::Null) => Ok((input, None)),
            _ => T::decode(input).map_decoded(Some),
        }
    }
}

/// Size of a variable width encoding: constructor, length prefix and payload.
pub(crate) fn variable_width_size(len: usize) -> u32 {
    let prefix = if len > u8::MAX as usize { 5 } else { 2 };
    prefix + len as u32
}

/// Writes `payload` with the one byte length form when it fits.
pub(crate) fn write_variable_width(
    writer: &mut impl Write,
    short: TypeCode,
    long: TypeCode,
    payload: &[u8],
) -> Result<(), AmqpEncodeError> {
    match u8::try_from(payload.len()) {
        Ok(len) => {
            short.encode(writer)?;
            writer.write_u8(len)?;
        }
        Err(_) => {
            long.encode(writer)?;
            writer.write_u32::<BigEndian>(payload.len() as u32)?;
        }
    }
    writer.write_all(payload)?;
    Ok(())
}

/// Reads the payload of a variable width encoding constructed by `short`
/// or `long`.
pub(crate) fn read_variable_width<T: AmqpDecoder>(
    input: &[u8],
    short: TypeCode,
    long: TypeCode,
) -> Result<(&[u8], &[u8]), AmqpDecodeError> {
    let (input, code) = TypeCode::decode(input)?;
    let (input, len) = if code == short {
        read_u8(input).map_decoded(usize::from)?
    } else if code == long {
        read_u32(input).map_decoded(|len| len as usize)?
    } else {
        return Err(T::invalid_type_code(code));
    };
    Ok(read_exact(input, len)?)
}

pub(crate) fn read_utf8<T: AmqpDecoder>(
    input: &[u8],
    short: TypeCode,
    long: TypeCode,
) -> Result<(&[u8], String), AmqpDecodeError> {
    let (input, bytes) = read_variable_width::<T>(input, short, long)?;
    Ok((input, String::from_utf8(bytes.to_vec())?))
}

impl AmqpEncoder for Binary {
    fn encoded_size(&self) -> u32 {
        variable_width_size(self.len())
    }

    fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
        write_variable_width(writer, TypeCode::Binary8, TypeCode::Binary32, self)
    }
}

impl AmqpDecoder for Binary {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        read_variable_width::<Self>(input, TypeCode::Binary8, TypeCode::Binary32)
            .map_decoded(<[u8]>::to_vec)
    }
}

impl AmqpEncoder for Str {
    fn encoded_size(&self) -> u32 {
        variable_width_size(self.len())
    }

    fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
        write_variable_width(writer, TypeCode::String8, TypeCode::String32, self.as_bytes())
    }
}

impl AmqpDecoder for Str {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        read_utf8::<Self>(input, TypeCode::String8, TypeCode::String32)
    }
}

/// `float` wrapper comparing NaN payloads as equal so values can key maps
#[derive(Debug, PartialEq, Hash, Eq, Clone, Copy)]
pub struct Float(OrderedFloat<f32>);

impl Float {
    pub fn value(&self) -> f32 {
        self.0 .0
    }
}

impl From<f32> for Float {
    fn from(float: f32) -> Self {
        Float(float.into())
    }
}

#[derive(Debug, PartialEq, Hash, Eq, Clone, Copy)]
pub struct Double(OrderedFloat<f64>);

impl Double {
    pub fn value(&self) -> f64 {
        self.0 .0
    }
}

impl From<f64> for Double {
    fn from(double: f64) -> Self {
        Double(double.into())
    }
}

/// Milliseconds since the unix epoch. Kept as raw millis so every 64-bit
/// pattern survives a round trip, including those outside chrono's range.
#[derive(Debug, PartialEq, Hash, Eq, Clone, Copy)]
#[cfg_attr(test, derive(fake::Dummy))]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Timestamp(Utc::now().timestamp_millis())
    }

    pub fn millis(&self) -> i64 {
        self.0
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Timestamp(datetime.timestamp_millis())
    }
}

macro_rules! decimal {
    ($name:ident, $code:ident, $width:expr) => {
        /// IEEE 754 decimal kept as its raw big-endian encoding
        #[derive(Debug, PartialEq, Hash, Eq, Clone, Copy)]
        pub struct $name(pub [u8; $width]);

        impl $name {
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }
        }

        impl std::convert::TryFrom<&[u8]> for $name {
            type Error = AmqpDecodeError;

            fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
                let raw = <[u8; $width]>::try_from(bytes).map_err(|_| {
                    AmqpDecodeError::parse_error(format!(
                        "{} needs {} bytes, got {}",
                        stringify!($name),
                        $width,
                        bytes.len()
                    ))
                })?;
                Ok($name(raw))
            }
        }

        impl AmqpEncoder for $name {
            fn encoded_size(&self) -> u32 {
                1 + $width
            }

            fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
                TypeCode::$code.encode(writer)?;
                writer.write_all(&self.0)?;
                Ok(())
            }
        }

        impl AmqpDecoder for $name {
            fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
                match TypeCode::decode(input)? {
                    (input, TypeCode::$code) => {
                        let (input, bytes) = read_exact(input, $width)?;
                        let mut raw = [0u8; $width];
                        raw.copy_from_slice(bytes);
                        Ok((input, $name(raw)))
                    }
                    (_, code) => Err(Self::invalid_type_code(code)),
                }
            }
        }
    };
}

decimal!(Decimal32, Decimal32, 4);
decimal!(Decimal64, Decimal64, 8);
decimal!(Decimal128, Decimal128, 16);

#[cfg(test)]
mod tests {

    use fake::{Dummy, Fake, Faker};
    use ordered_float::OrderedFloat;
    use pretty_assertions::assert_eq;

    use super::{Decimal128, Decimal32, Decimal64, Double, Float, Int, Long, Timestamp};
    use crate::message::amqp::{
        tests::type_encode_decode_test_fuzzy, types::SimpleValue, AmqpDecoder, AmqpEncoder,
    };

    impl Dummy<Faker> for Float {
        fn dummy_with_rng<R: fake::rand::Rng + ?Sized>(config: &Faker, rng: &mut R) -> Self {
            let num: f32 = config.fake_with_rng(rng);
            Float(OrderedFloat::from(num))
        }
    }
    impl Dummy<Faker> for Double {
        fn dummy_with_rng<R: fake::rand::Rng + ?Sized>(config: &Faker, rng: &mut R) -> Self {
            let num: f64 = config.fake_with_rng(rng);
            Double(OrderedFloat::from(num))
        }
    }

    macro_rules! dummy_decimal {
        ($name:ident, $width:expr) => {
            impl Dummy<Faker> for $name {
                fn dummy_with_rng<R: fake::rand::Rng + ?Sized>(_: &Faker, rng: &mut R) -> Self {
                    let mut raw = [0u8; $width];
                    rng.fill_bytes(&mut raw);
                    $name(raw)
                }
            }
        };
    }

    dummy_decimal!(Decimal32, 4);
    dummy_decimal!(Decimal64, 8);
    dummy_decimal!(Decimal128, 16);

    fn round_trip<T: AmqpEncoder + AmqpDecoder>(value: &T) -> (usize, T) {
        let mut buffer = vec![];
        value.encode(&mut buffer).unwrap();
        assert_eq!(buffer.len() as u32, value.encoded_size());
        let (remaining, decoded) = T::decode(&buffer).unwrap();
        assert!(remaining.is_empty());
        (buffer.len(), decoded)
    }

    #[test]
    fn simple_value_encode_decode_test() {
        type_encode_decode_test_fuzzy::<SimpleValue>()
    }

    #[test]
    fn small_negative_int_keeps_sign() {
        let (size, decoded) = round_trip::<Int>(&-1);
        assert_eq!(2, size);
        assert_eq!(-1, decoded);

        let (size, decoded) = round_trip::<Int>(&i32::MIN);
        assert_eq!(5, size);
        assert_eq!(i32::MIN, decoded);
    }

    #[test]
    fn small_long_uses_two_bytes() {
        let (size, decoded) = round_trip::<Long>(&-100);
        assert_eq!(2, size);
        assert_eq!(-100, decoded);
    }

    #[test]
    fn timestamp_keeps_out_of_range_millis() {
        let (_, decoded) = round_trip(&Timestamp(i64::MIN));
        assert_eq!(Timestamp(i64::MIN), decoded);
        assert!(decoded.as_datetime().is_none());
    }

    #[test]
    fn float_keeps_nan_payload() {
        let nan = f32::from_bits(0x7fc0_0001);
        let (_, decoded) = round_trip(&Float::from(nan));
        assert_eq!(0x7fc0_0001, decoded.value().to_bits());

        let (_, decoded) = round_trip(&Double::from(-0.0));
        assert_eq!((-0.0f64).to_bits(), decoded.value().to_bits());
    }

    #[test]
    fn decimal_from_wrong_width_fails() {
        use std::convert::TryFrom;
        assert!(Decimal64::try_from(&[0u8; 4][..]).is_err());
        assert_eq!(
            Decimal32([1, 2, 3, 4]),
            Decimal32::try_from(&[1u8, 2, 3, 4][..]).unwrap()
        );
    }
}
