//! Closed registry of object types a test value can name.
//!
//! An object is built from `"<type-name>:<constructor-argument>"`, carried as
//! a primitive AMQP value and serialized with a small versioned envelope:
//! `[version][AMQP string type name][AMQP value]`.
use std::fmt;

use interop_shims_protocol::{
    error::{DecodeError, EncodeError},
    message::{AmqpDecoder, AmqpEncoder, Decimal128, Decimal32, Decimal64, Double, Float, SimpleValue, Str},
};
use uuid::Uuid;

use crate::{codec::character::decode_char_escape, error::ShimError, subtype::Subtype, ShimResult};

pub const OBJECT_ENCODING_VERSION: u8 = 0x01;

pub const BOOLEAN_TYPE: &str = "java.lang.Boolean";
pub const BYTE_TYPE: &str = "java.lang.Byte";
pub const SHORT_TYPE: &str = "java.lang.Short";
pub const INTEGER_TYPE: &str = "java.lang.Integer";
pub const LONG_TYPE: &str = "java.lang.Long";
pub const FLOAT_TYPE: &str = "java.lang.Float";
pub const DOUBLE_TYPE: &str = "java.lang.Double";
pub const CHARACTER_TYPE: &str = "java.lang.Character";
pub const STRING_TYPE: &str = "java.lang.String";
pub const UUID_TYPE: &str = "java.util.UUID";
pub const DECIMAL32_TYPE: &str = "decimal32";
pub const DECIMAL64_TYPE: &str = "decimal64";
pub const DECIMAL128_TYPE: &str = "decimal128";

/// Every type name the registry can construct
pub const REGISTERED_TYPES: [&str; 13] = [
    BOOLEAN_TYPE,
    BYTE_TYPE,
    SHORT_TYPE,
    INTEGER_TYPE,
    LONG_TYPE,
    FLOAT_TYPE,
    DOUBLE_TYPE,
    CHARACTER_TYPE,
    STRING_TYPE,
    UUID_TYPE,
    DECIMAL32_TYPE,
    DECIMAL64_TYPE,
    DECIMAL128_TYPE,
];

/// A registered object: its type name and the AMQP value backing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectValue {
    type_name: &'static str,
    value: SimpleValue,
}

pub fn is_registered(type_name: &str) -> bool {
    REGISTERED_TYPES.contains(&type_name)
}

fn malformed(value: impl Into<String>, reason: impl Into<String>) -> ShimError {
    ShimError::malformed(Subtype::Object.as_str(), value, reason)
}

/// Registered type name of a primitive AMQP value
fn type_name_of(value: &SimpleValue) -> Option<&'static str> {
    let name = match value {
        SimpleValue::Boolean(_) => BOOLEAN_TYPE,
        SimpleValue::Byte(_) => BYTE_TYPE,
        SimpleValue::Short(_) => SHORT_TYPE,
        SimpleValue::Int(_) => INTEGER_TYPE,
        SimpleValue::Long(_) => LONG_TYPE,
        SimpleValue::Float(_) => FLOAT_TYPE,
        SimpleValue::Double(_) => DOUBLE_TYPE,
        SimpleValue::Char(_) => CHARACTER_TYPE,
        SimpleValue::String(_) => STRING_TYPE,
        SimpleValue::Uuid(_) => UUID_TYPE,
        SimpleValue::Decimal32(_) => DECIMAL32_TYPE,
        SimpleValue::Decimal64(_) => DECIMAL64_TYPE,
        SimpleValue::Decimal128(_) => DECIMAL128_TYPE,
        _ => return None,
    };
    Some(name)
}

fn parse_number<T>(argument: &str) -> ShimResult<T>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    argument
        .trim()
        .parse::<T>()
        .map_err(|err| malformed(argument, err.to_string()))
}

fn parse_decimal<const N: usize>(argument: &str) -> ShimResult<[u8; N]> {
    let digits = argument
        .strip_prefix("0x")
        .or_else(|| argument.strip_prefix("0X"))
        .unwrap_or(argument);
    if digits.len() != N * 2 {
        return Err(malformed(
            argument,
            format!("expected {} hex digits", N * 2),
        ));
    }
    let mut bytes = [0u8; N];
    hex::decode_to_slice(digits, &mut bytes).map_err(|err| malformed(argument, err.to_string()))?;
    Ok(bytes)
}

fn construct_character(argument: &str) -> ShimResult<char> {
    let mut chars = argument.chars();
    let unit = match (chars.next(), chars.next()) {
        (Some(single), None) => return Ok(single),
        _ => decode_char_escape(argument)
            .ok_or_else(|| malformed(argument, "expected one character or a \\x escape"))?,
    };
    char::from_u32(u32::from(unit))
        .ok_or_else(|| malformed(argument, "surrogate code unit has no character value"))
}

impl ObjectValue {
    /// Builds an object from its single string constructor argument.
    pub fn construct(type_name: &str, argument: &str) -> ShimResult<ObjectValue> {
        let value = match type_name {
            // Boolean(String) is true only for a case-insensitive "true"
            BOOLEAN_TYPE => SimpleValue::Boolean(argument.eq_ignore_ascii_case("true")),
            BYTE_TYPE => SimpleValue::Byte(parse_number::<i8>(argument)?),
            SHORT_TYPE => SimpleValue::Short(parse_number::<i16>(argument)?),
            INTEGER_TYPE => SimpleValue::Int(parse_number::<i32>(argument)?),
            LONG_TYPE => SimpleValue::Long(parse_number::<i64>(argument)?),
            FLOAT_TYPE => SimpleValue::Float(Float::from(parse_number::<f32>(argument)?)),
            DOUBLE_TYPE => SimpleValue::Double(Double::from(parse_number::<f64>(argument)?)),
            CHARACTER_TYPE => SimpleValue::Char(construct_character(argument)?),
            STRING_TYPE => SimpleValue::String(argument.to_string()),
            UUID_TYPE => SimpleValue::Uuid(
                Uuid::parse_str(argument).map_err(|err| malformed(argument, err.to_string()))?,
            ),
            DECIMAL32_TYPE => SimpleValue::Decimal32(Decimal32(parse_decimal::<4>(argument)?)),
            DECIMAL64_TYPE => SimpleValue::Decimal64(Decimal64(parse_decimal::<8>(argument)?)),
            DECIMAL128_TYPE => SimpleValue::Decimal128(Decimal128(parse_decimal::<16>(argument)?)),
            other => return Err(malformed(other, "unregistered object type")),
        };
        ObjectValue::from_amqp(value)
    }

    /// Parses the `"<type-name>:<constructor-argument>"` form.
    pub fn parse(text: &str) -> ShimResult<ObjectValue> {
        let (type_name, argument) = text
            .split_once(':')
            .ok_or_else(|| malformed(text, "expected \"<type-name>:<argument>\""))?;
        ObjectValue::construct(type_name, argument)
    }

    /// Wraps a primitive AMQP value whose type has a registry entry.
    pub fn from_amqp(value: SimpleValue) -> ShimResult<ObjectValue> {
        match type_name_of(&value) {
            Some(type_name) => Ok(ObjectValue { type_name, value }),
            None => Err(malformed(
                format!("{:?}", value),
                "AMQP type has no registered object type",
            )),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn value(&self) -> &SimpleValue {
        &self.value
    }

    pub fn into_value(self) -> SimpleValue {
        self.value
    }

    /// The `toString` form of the object
    pub fn describe(&self) -> String {
        match &self.value {
            SimpleValue::Boolean(value) => value.to_string(),
            SimpleValue::Byte(value) => value.to_string(),
            SimpleValue::Short(value) => value.to_string(),
            SimpleValue::Int(value) => value.to_string(),
            SimpleValue::Long(value) => value.to_string(),
            SimpleValue::Float(value) => java_float_string(value.value(), f64::from(value.value())),
            SimpleValue::Double(value) => java_float_string(value.value(), value.value()),
            SimpleValue::Char(value) => value.to_string(),
            SimpleValue::String(value) => value.clone(),
            SimpleValue::Uuid(value) => value.hyphenated().to_string(),
            SimpleValue::Decimal32(value) => format!("0x{}", hex::encode(value.as_bytes())),
            SimpleValue::Decimal64(value) => format!("0x{}", hex::encode(value.as_bytes())),
            SimpleValue::Decimal128(value) => format!("0x{}", hex::encode(value.as_bytes())),
            other => format!("{:?}", other),
        }
    }

    /// `"<type-name>:<describe>"`
    pub fn canonical(&self) -> String {
        format!("{}:{}", self.type_name, self.describe())
    }

    pub fn serialize(&self) -> ShimResult<Vec<u8>> {
        let type_name: Str = self.type_name.to_string();
        let mut buffer = Vec::with_capacity(
            1 + (type_name.encoded_size() + self.value.encoded_size()) as usize,
        );
        buffer.push(OBJECT_ENCODING_VERSION);
        type_name.encode(&mut buffer).map_err(EncodeError::from)?;
        self.value.encode(&mut buffer).map_err(EncodeError::from)?;
        Ok(buffer)
    }

    pub fn deserialize(bytes: &[u8]) -> ShimResult<ObjectValue> {
        let encoded = || base64_preview(bytes);
        let (version, input) = bytes
            .split_first()
            .ok_or_else(|| malformed(encoded(), "empty object encoding"))?;
        if *version != OBJECT_ENCODING_VERSION {
            return Err(malformed(
                encoded(),
                format!("unknown object encoding version {}", version),
            ));
        }
        let (input, type_name) = Str::decode(input).map_err(DecodeError::from)?;
        let (input, value) = SimpleValue::decode(input).map_err(DecodeError::from)?;
        if !input.is_empty() {
            return Err(malformed(
                encoded(),
                format!("{} trailing bytes after object", input.len()),
            ));
        }

        let object = ObjectValue::from_amqp(value)?;
        if object.type_name != type_name {
            return Err(malformed(
                encoded(),
                format!(
                    "type name {} does not match a {} value",
                    type_name, object.type_name
                ),
            ));
        }
        Ok(object)
    }
}

impl fmt::Display for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

fn base64_preview(bytes: &[u8]) -> String {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    STANDARD.encode(bytes)
}

/// Decimal notation for magnitudes in `[1e-3, 1e7)`, `d.dddE±n` otherwise,
/// always with at least one fractional digit.
fn java_float_string<T>(value: T, wide: f64) -> String
where
    T: fmt::Display + fmt::LowerExp,
{
    if wide.is_nan() {
        return "NaN".to_string();
    }
    if wide.is_infinite() {
        return if wide > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = wide.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        let plain = value.to_string();
        return if plain.contains('.') {
            plain
        } else {
            format!("{}.0", plain)
        };
    }

    let scientific = format!("{:e}", value);
    match scientific.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => {
            format!("{}E{}", mantissa, exponent)
        }
        Some((mantissa, exponent)) => format!("{}.0E{}", mantissa, exponent),
        None => scientific,
    }
}

#[cfg(test)]
mod tests {
    use interop_shims_protocol::message::{Double, SimpleValue};
    use pretty_assertions::assert_eq;

    use super::{java_float_string, ObjectValue, REGISTERED_TYPES};

    #[test]
    fn construct_and_describe_wrapper_types() {
        let cases = [
            ("java.lang.Boolean", "TRUE", "true"),
            ("java.lang.Boolean", "yes", "false"),
            ("java.lang.Byte", "-128", "-128"),
            ("java.lang.Short", "1234", "1234"),
            ("java.lang.Integer", "-2147483648", "-2147483648"),
            ("java.lang.Long", "9223372036854775807", "9223372036854775807"),
            ("java.lang.Float", "1.5", "1.5"),
            ("java.lang.Double", "100", "100.0"),
            ("java.lang.Character", "x", "x"),
            ("java.lang.Character", "\\x41", "A"),
            ("java.lang.String", "hello: world", "hello: world"),
            (
                "java.util.UUID",
                "6BA7B810-9DAD-11D1-80B4-00C04FD430C8",
                "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
            ),
            ("decimal32", "0x3040000a", "0x3040000a"),
        ];
        for (type_name, argument, described) in cases.iter() {
            let object = ObjectValue::construct(type_name, argument).unwrap();
            assert_eq!(*type_name, object.type_name());
            assert_eq!(*described, object.describe());
        }
    }

    #[test]
    fn parse_splits_on_first_colon() {
        let object = ObjectValue::parse("java.lang.String:a:b").unwrap();
        assert_eq!("java.lang.String:a:b", object.canonical());
        assert!(ObjectValue::parse("java.lang.String").is_err());
    }

    #[test]
    fn unregistered_and_bad_arguments_fail() {
        assert!(ObjectValue::construct("java.util.Date", "0").is_err());
        assert!(ObjectValue::construct("java.lang.Byte", "128").is_err());
        assert!(ObjectValue::construct("java.lang.Character", "ab").is_err());
        assert!(ObjectValue::construct("java.lang.Character", "\\xD800").is_err());
        assert!(ObjectValue::construct("decimal64", "0x00").is_err());
    }

    #[test]
    fn serialization_round_trips_every_registered_type() {
        let arguments = [
            "true",
            "7",
            "-7",
            "70000",
            "-1",
            "0.25",
            "-3.5e300",
            "z",
            "text",
            "00000000-0000-0000-0000-000000000001",
            "0x00000001",
            "0x0000000000000001",
            "0x00000000000000000000000000000001",
        ];
        for (type_name, argument) in REGISTERED_TYPES.iter().zip(arguments.iter()) {
            let object = ObjectValue::construct(type_name, argument).unwrap();
            let bytes = object.serialize().unwrap();
            assert_eq!(0x01, bytes[0]);
            assert_eq!(object, ObjectValue::deserialize(&bytes).unwrap());
        }
    }

    #[test]
    fn deserialize_rejects_bad_envelopes() {
        let mut bytes = ObjectValue::construct("java.lang.Integer", "5")
            .unwrap()
            .serialize()
            .unwrap();
        assert!(ObjectValue::deserialize(&[]).is_err());

        let mut trailing = bytes.clone();
        trailing.push(0);
        assert!(ObjectValue::deserialize(&trailing).is_err());

        bytes[0] = 0x02;
        assert!(ObjectValue::deserialize(&bytes).is_err());
    }

    #[test]
    fn java_float_formatting() {
        assert_eq!("1.0", java_float_string(1.0f64, 1.0));
        assert_eq!("-0.0", java_float_string(-0.0f64, -0.0));
        assert_eq!("0.001", java_float_string(0.001f64, 0.001));
        assert_eq!("1.0E7", java_float_string(1e7f64, 1e7));
        assert_eq!("1.5E-5", java_float_string(1.5e-5f64, 1.5e-5));
        assert_eq!("NaN", java_float_string(f64::NAN, f64::NAN));
        assert_eq!("-Infinity", java_float_string(f64::NEG_INFINITY, f64::NEG_INFINITY));

        let object = ObjectValue::from_amqp(SimpleValue::Double(Double::from(2.5))).unwrap();
        assert_eq!("java.lang.Double:2.5", object.canonical());
    }
}
