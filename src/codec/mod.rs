//! Canonical text form of a typed test value.
//!
//! [`encode`] and [`decode`] are exact inverses for every subtype but
//! `object`, whose text form goes through the object registry. Floating
//! point values keep their bit pattern, so `-0.0` and every NaN payload
//! survive a round trip.
use std::convert::TryFrom;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use interop_shims_protocol::message::{
    Decimal128, Decimal32, Decimal64, Double, Float, SimpleValue, Symbol, Timestamp,
};
use uuid::Uuid;

use crate::{error::ShimError, object::ObjectValue, subtype::Subtype, ShimResult};

pub(crate) mod character;
pub(crate) mod number;

use self::{
    character::{decode_char, encode_char},
    number::{parse_signed, parse_unsigned, parse_wide, signed_hex, unsigned_hex, wide_hex},
};

pub const TRUE: &str = "True";
pub const FALSE: &str = "False";
pub const NONE: &str = "None";

/// Native value of a subtype
#[derive(Debug, Clone)]
pub enum NativeValue {
    Null,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// One UTF-16 code unit
    Char(u16),
    Bytes(Vec<u8>),
    String(String),
    Object(ObjectValue),
    Ubyte(u8),
    Ushort(u16),
    Uint(u32),
    Ulong(u64),
    Decimal32([u8; 4]),
    Decimal64([u8; 8]),
    Decimal128([u8; 16]),
    /// Milliseconds since the Unix epoch
    Timestamp(i64),
    Uuid(Uuid),
    Binary(Vec<u8>),
    Symbol(String),
}

impl PartialEq for NativeValue {
    fn eq(&self, other: &Self) -> bool {
        use NativeValue as V;
        match (self, other) {
            (V::Null, V::Null) => true,
            (V::Boolean(a), V::Boolean(b)) => a == b,
            (V::Byte(a), V::Byte(b)) => a == b,
            (V::Short(a), V::Short(b)) => a == b,
            (V::Int(a), V::Int(b)) => a == b,
            (V::Long(a), V::Long(b)) => a == b,
            // bit equality: -0.0 differs from 0.0, NaN payloads compare
            (V::Float(a), V::Float(b)) => a.to_bits() == b.to_bits(),
            (V::Double(a), V::Double(b)) => a.to_bits() == b.to_bits(),
            (V::Char(a), V::Char(b)) => a == b,
            (V::Bytes(a), V::Bytes(b)) => a == b,
            (V::String(a), V::String(b)) => a == b,
            (V::Object(a), V::Object(b)) => a == b,
            (V::Ubyte(a), V::Ubyte(b)) => a == b,
            (V::Ushort(a), V::Ushort(b)) => a == b,
            (V::Uint(a), V::Uint(b)) => a == b,
            (V::Ulong(a), V::Ulong(b)) => a == b,
            (V::Decimal32(a), V::Decimal32(b)) => a == b,
            (V::Decimal64(a), V::Decimal64(b)) => a == b,
            (V::Decimal128(a), V::Decimal128(b)) => a == b,
            (V::Timestamp(a), V::Timestamp(b)) => a == b,
            (V::Uuid(a), V::Uuid(b)) => a == b,
            (V::Binary(a), V::Binary(b)) => a == b,
            (V::Symbol(a), V::Symbol(b)) => a == b,
            _ => false,
        }
    }
}

impl NativeValue {
    pub fn subtype(&self) -> Subtype {
        match self {
            NativeValue::Null => Subtype::Null,
            NativeValue::Boolean(_) => Subtype::Boolean,
            NativeValue::Byte(_) => Subtype::Byte,
            NativeValue::Short(_) => Subtype::Short,
            NativeValue::Int(_) => Subtype::Int,
            NativeValue::Long(_) => Subtype::Long,
            NativeValue::Float(_) => Subtype::Float,
            NativeValue::Double(_) => Subtype::Double,
            NativeValue::Char(_) => Subtype::Char,
            NativeValue::Bytes(_) => Subtype::Bytes,
            NativeValue::String(_) => Subtype::String,
            NativeValue::Object(_) => Subtype::Object,
            NativeValue::Ubyte(_) => Subtype::Ubyte,
            NativeValue::Ushort(_) => Subtype::Ushort,
            NativeValue::Uint(_) => Subtype::Uint,
            NativeValue::Ulong(_) => Subtype::Ulong,
            NativeValue::Decimal32(_) => Subtype::Decimal32,
            NativeValue::Decimal64(_) => Subtype::Decimal64,
            NativeValue::Decimal128(_) => Subtype::Decimal128,
            NativeValue::Timestamp(_) => Subtype::Timestamp,
            NativeValue::Uuid(_) => Subtype::Uuid,
            NativeValue::Binary(_) => Subtype::Binary,
            NativeValue::Symbol(_) => Subtype::Symbol,
        }
    }

    /// Typed AMQP element carrying this value inside a map, a sequence or
    /// an application property.
    pub fn to_amqp(&self) -> ShimResult<SimpleValue> {
        let value = match self {
            NativeValue::Null => SimpleValue::Null,
            NativeValue::Boolean(value) => SimpleValue::Boolean(*value),
            NativeValue::Byte(value) => SimpleValue::Byte(*value),
            NativeValue::Short(value) => SimpleValue::Short(*value),
            NativeValue::Int(value) => SimpleValue::Int(*value),
            NativeValue::Long(value) => SimpleValue::Long(*value),
            NativeValue::Float(value) => SimpleValue::Float(Float::from(*value)),
            NativeValue::Double(value) => SimpleValue::Double(Double::from(*value)),
            NativeValue::Char(unit) => {
                SimpleValue::Char(char::from_u32(u32::from(*unit)).ok_or_else(|| {
                    ShimError::malformed(
                        Subtype::Char.as_str(),
                        encode_char(*unit),
                        "surrogate code unit has no AMQP char form",
                    )
                })?)
            }
            NativeValue::Bytes(bytes) | NativeValue::Binary(bytes) => {
                SimpleValue::Binary(bytes.clone())
            }
            NativeValue::String(text) => SimpleValue::String(text.clone()),
            NativeValue::Object(object) => object.value().clone(),
            NativeValue::Ubyte(value) => SimpleValue::Ubyte(*value),
            NativeValue::Ushort(value) => SimpleValue::Ushort(*value),
            NativeValue::Uint(value) => SimpleValue::Uint(*value),
            NativeValue::Ulong(value) => SimpleValue::Ulong(*value),
            NativeValue::Decimal32(bytes) => SimpleValue::Decimal32(Decimal32(*bytes)),
            NativeValue::Decimal64(bytes) => SimpleValue::Decimal64(Decimal64(*bytes)),
            NativeValue::Decimal128(bytes) => SimpleValue::Decimal128(Decimal128(*bytes)),
            NativeValue::Timestamp(millis) => SimpleValue::Timestamp(Timestamp(*millis)),
            NativeValue::Uuid(uuid) => SimpleValue::Uuid(*uuid),
            NativeValue::Symbol(text) => SimpleValue::Symbol(Symbol::from(text.as_str())),
        };
        Ok(value)
    }

    /// Reads a typed AMQP element as `subtype`, allowing the widening
    /// conversions a JMS getter performs (byte to short to int to long,
    /// float to double). `None` when the element cannot be read that way.
    pub fn from_amqp(subtype: Subtype, value: &SimpleValue) -> Option<NativeValue> {
        let native = match (subtype, value) {
            (Subtype::Null, SimpleValue::Null) => NativeValue::Null,
            (Subtype::Boolean, SimpleValue::Boolean(value)) => NativeValue::Boolean(*value),
            (Subtype::Byte, SimpleValue::Byte(value)) => NativeValue::Byte(*value),
            (Subtype::Short, SimpleValue::Byte(value)) => NativeValue::Short(i16::from(*value)),
            (Subtype::Short, SimpleValue::Short(value)) => NativeValue::Short(*value),
            (Subtype::Int, SimpleValue::Byte(value)) => NativeValue::Int(i32::from(*value)),
            (Subtype::Int, SimpleValue::Short(value)) => NativeValue::Int(i32::from(*value)),
            (Subtype::Int, SimpleValue::Int(value)) => NativeValue::Int(*value),
            (Subtype::Long, SimpleValue::Byte(value)) => NativeValue::Long(i64::from(*value)),
            (Subtype::Long, SimpleValue::Short(value)) => NativeValue::Long(i64::from(*value)),
            (Subtype::Long, SimpleValue::Int(value)) => NativeValue::Long(i64::from(*value)),
            (Subtype::Long, SimpleValue::Long(value)) => NativeValue::Long(*value),
            (Subtype::Float, SimpleValue::Float(value)) => NativeValue::Float(value.value()),
            (Subtype::Double, SimpleValue::Float(value)) => {
                NativeValue::Double(f64::from(value.value()))
            }
            (Subtype::Double, SimpleValue::Double(value)) => NativeValue::Double(value.value()),
            (Subtype::Char, SimpleValue::Char(value)) => {
                NativeValue::Char(u16::try_from(u32::from(*value)).ok()?)
            }
            (Subtype::Bytes, SimpleValue::Binary(bytes)) => NativeValue::Bytes(bytes.clone()),
            (Subtype::Binary, SimpleValue::Binary(bytes)) => NativeValue::Binary(bytes.clone()),
            (Subtype::String, SimpleValue::String(text)) => NativeValue::String(text.clone()),
            (Subtype::Symbol, SimpleValue::Symbol(text)) => {
                NativeValue::Symbol(text.as_str().to_string())
            }
            (Subtype::Object, value) => NativeValue::Object(ObjectValue::from_amqp(value.clone()).ok()?),
            (Subtype::Ubyte, SimpleValue::Ubyte(value)) => NativeValue::Ubyte(*value),
            (Subtype::Ushort, SimpleValue::Ushort(value)) => NativeValue::Ushort(*value),
            (Subtype::Uint, SimpleValue::Uint(value)) => NativeValue::Uint(*value),
            (Subtype::Ulong, SimpleValue::Ulong(value)) => NativeValue::Ulong(*value),
            (Subtype::Decimal32, SimpleValue::Decimal32(value)) => NativeValue::Decimal32(value.0),
            (Subtype::Decimal64, SimpleValue::Decimal64(value)) => NativeValue::Decimal64(value.0),
            (Subtype::Decimal128, SimpleValue::Decimal128(value)) => {
                NativeValue::Decimal128(value.0)
            }
            (Subtype::Timestamp, SimpleValue::Timestamp(value)) => {
                NativeValue::Timestamp(value.millis())
            }
            (Subtype::Uuid, SimpleValue::Uuid(uuid)) => NativeValue::Uuid(*uuid),
            _ => return None,
        };
        Some(native)
    }
}

fn check_supported(subtype: Subtype) -> ShimResult<()> {
    if subtype.is_compound() {
        Err(ShimError::unsupported(subtype.as_str(), "the scalar codec"))
    } else {
        Ok(())
    }
}

/// Canonical text of `value`, which must be of `subtype`.
pub fn encode(subtype: Subtype, value: &NativeValue) -> ShimResult<String> {
    check_supported(subtype)?;
    if value.subtype() != subtype {
        return Err(ShimError::malformed(
            subtype.as_str(),
            format!("{:?}", value),
            format!("a {} value cannot be encoded as {}", value.subtype(), subtype),
        ));
    }

    let text = match value {
        NativeValue::Null => NONE.to_string(),
        NativeValue::Boolean(true) => TRUE.to_string(),
        NativeValue::Boolean(false) => FALSE.to_string(),
        NativeValue::Byte(value) => signed_hex(i64::from(*value)),
        NativeValue::Short(value) => signed_hex(i64::from(*value)),
        NativeValue::Int(value) => signed_hex(i64::from(*value)),
        NativeValue::Long(value) => signed_hex(*value),
        NativeValue::Float(value) => format!("0x{:08x}", value.to_bits()),
        NativeValue::Double(value) => format!("0x{:016x}", value.to_bits()),
        NativeValue::Char(unit) => encode_char(*unit),
        NativeValue::Bytes(bytes) | NativeValue::Binary(bytes) => STANDARD.encode(bytes),
        NativeValue::String(text) | NativeValue::Symbol(text) => text.clone(),
        NativeValue::Object(object) => object.canonical(),
        NativeValue::Ubyte(value) => unsigned_hex(u64::from(*value)),
        NativeValue::Ushort(value) => unsigned_hex(u64::from(*value)),
        NativeValue::Uint(value) => unsigned_hex(u64::from(*value)),
        NativeValue::Ulong(value) => wide_hex(value.to_be_bytes()),
        NativeValue::Timestamp(millis) => wide_hex(millis.to_be_bytes()),
        NativeValue::Decimal32(bytes) => format!("0x{}", hex::encode(bytes)),
        NativeValue::Decimal64(bytes) => format!("0x{}", hex::encode(bytes)),
        NativeValue::Decimal128(bytes) => format!("0x{}", hex::encode(bytes)),
        NativeValue::Uuid(uuid) => uuid.hyphenated().to_string(),
    };
    Ok(text)
}

fn fixed_hex<const N: usize>(subtype: Subtype, text: &str) -> ShimResult<[u8; N]> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .ok_or_else(|| ShimError::malformed(subtype.as_str(), text, "missing 0x prefix"))?;
    if digits.len() != N * 2 {
        return Err(ShimError::malformed(
            subtype.as_str(),
            text,
            format!("expected exactly {} hex digits", N * 2),
        ));
    }
    let mut bytes = [0u8; N];
    hex::decode_to_slice(digits, &mut bytes)
        .map_err(|err| ShimError::malformed(subtype.as_str(), text, err.to_string()))?;
    Ok(bytes)
}

fn decode_base64(subtype: Subtype, text: &str) -> ShimResult<Vec<u8>> {
    STANDARD
        .decode(text)
        .map_err(|err| ShimError::malformed(subtype.as_str(), text, err.to_string()))
}

/// Native value of the canonical `text` of `subtype`.
pub fn decode(subtype: Subtype, text: &str) -> ShimResult<NativeValue> {
    check_supported(subtype)?;

    let value = match subtype {
        Subtype::Null => {
            if text.is_empty() || text == NONE {
                NativeValue::Null
            } else {
                return Err(ShimError::malformed(
                    subtype.as_str(),
                    text,
                    "a null value must be empty or \"None\"",
                ));
            }
        }
        Subtype::Boolean => match text {
            TRUE => NativeValue::Boolean(true),
            FALSE => NativeValue::Boolean(false),
            other => NativeValue::Boolean(other.parse::<bool>().map_err(|err| {
                ShimError::malformed(subtype.as_str(), text, err.to_string())
            })?),
        },
        Subtype::Byte => NativeValue::Byte(parse_signed(subtype, text, 8)? as i8),
        Subtype::Short => NativeValue::Short(parse_signed(subtype, text, 16)? as i16),
        Subtype::Int => NativeValue::Int(parse_signed(subtype, text, 32)? as i32),
        Subtype::Long => NativeValue::Long(parse_signed(subtype, text, 64)?),
        Subtype::Float => {
            NativeValue::Float(f32::from_bits(u32::from_be_bytes(fixed_hex::<4>(subtype, text)?)))
        }
        Subtype::Double => {
            NativeValue::Double(f64::from_bits(u64::from_be_bytes(fixed_hex::<8>(subtype, text)?)))
        }
        Subtype::Char => NativeValue::Char(decode_char(text)?),
        Subtype::Bytes => NativeValue::Bytes(decode_base64(subtype, text)?),
        Subtype::Binary => NativeValue::Binary(decode_base64(subtype, text)?),
        Subtype::String => NativeValue::String(text.to_string()),
        Subtype::Symbol => NativeValue::Symbol(text.to_string()),
        Subtype::Object => NativeValue::Object(ObjectValue::parse(text)?),
        Subtype::Ubyte => NativeValue::Ubyte(parse_unsigned(subtype, text, 8)? as u8),
        Subtype::Ushort => NativeValue::Ushort(parse_unsigned(subtype, text, 16)? as u16),
        Subtype::Uint => NativeValue::Uint(parse_unsigned(subtype, text, 32)? as u32),
        Subtype::Ulong => NativeValue::Ulong(u64::from_be_bytes(parse_wide(subtype, text)?)),
        Subtype::Timestamp => {
            NativeValue::Timestamp(i64::from_be_bytes(parse_wide(subtype, text)?))
        }
        Subtype::Decimal32 => NativeValue::Decimal32(fixed_hex::<4>(subtype, text)?),
        Subtype::Decimal64 => NativeValue::Decimal64(fixed_hex::<8>(subtype, text)?),
        Subtype::Decimal128 => NativeValue::Decimal128(fixed_hex::<16>(subtype, text)?),
        Subtype::Uuid => NativeValue::Uuid(
            Uuid::parse_str(text)
                .map_err(|err| ShimError::malformed(subtype.as_str(), text, err.to_string()))?,
        ),
        Subtype::List | Subtype::Map | Subtype::Array => {
            return Err(ShimError::unsupported(subtype.as_str(), "the scalar codec"))
        }
    };
    Ok(value)
}
