use std::{fmt, str::FromStr};

use crate::error::ShimError;

/// Primitive type of a test value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subtype {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Bytes,
    String,
    Object,
    Null,
    Ubyte,
    Ushort,
    Uint,
    Ulong,
    Decimal32,
    Decimal64,
    Decimal128,
    Timestamp,
    Uuid,
    Binary,
    Symbol,
    List,
    Map,
    Array,
}

impl Subtype {
    pub const ALL: [Subtype; 26] = [
        Subtype::Boolean,
        Subtype::Byte,
        Subtype::Short,
        Subtype::Int,
        Subtype::Long,
        Subtype::Float,
        Subtype::Double,
        Subtype::Char,
        Subtype::Bytes,
        Subtype::String,
        Subtype::Object,
        Subtype::Null,
        Subtype::Ubyte,
        Subtype::Ushort,
        Subtype::Uint,
        Subtype::Ulong,
        Subtype::Decimal32,
        Subtype::Decimal64,
        Subtype::Decimal128,
        Subtype::Timestamp,
        Subtype::Uuid,
        Subtype::Binary,
        Subtype::Symbol,
        Subtype::List,
        Subtype::Map,
        Subtype::Array,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subtype::Boolean => "boolean",
            Subtype::Byte => "byte",
            Subtype::Short => "short",
            Subtype::Int => "int",
            Subtype::Long => "long",
            Subtype::Float => "float",
            Subtype::Double => "double",
            Subtype::Char => "char",
            Subtype::Bytes => "bytes",
            Subtype::String => "string",
            Subtype::Object => "object",
            Subtype::Null => "null",
            Subtype::Ubyte => "ubyte",
            Subtype::Ushort => "ushort",
            Subtype::Uint => "uint",
            Subtype::Ulong => "ulong",
            Subtype::Decimal32 => "decimal32",
            Subtype::Decimal64 => "decimal64",
            Subtype::Decimal128 => "decimal128",
            Subtype::Timestamp => "timestamp",
            Subtype::Uuid => "uuid",
            Subtype::Binary => "binary",
            Subtype::Symbol => "symbol",
            Subtype::List => "list",
            Subtype::Map => "map",
            Subtype::Array => "array",
        }
    }

    /// Subtypes a JMS message body or property can carry
    pub fn is_jms(&self) -> bool {
        matches!(
            self,
            Subtype::Boolean
                | Subtype::Byte
                | Subtype::Short
                | Subtype::Int
                | Subtype::Long
                | Subtype::Float
                | Subtype::Double
                | Subtype::Char
                | Subtype::Bytes
                | Subtype::String
                | Subtype::Object
        )
    }

    /// Recognized names with no codec behind them
    pub fn is_compound(&self) -> bool {
        matches!(self, Subtype::List | Subtype::Map | Subtype::Array)
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subtype {
    type Err = ShimError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Subtype::ALL
            .iter()
            .find(|subtype| subtype.as_str() == name)
            .copied()
            .ok_or_else(|| ShimError::Argument(format!("unknown subtype \"{}\"", name)))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Subtype;

    #[test]
    fn names_round_trip() {
        for subtype in Subtype::ALL.iter() {
            assert_eq!(*subtype, subtype.as_str().parse::<Subtype>().unwrap());
        }
    }

    #[test]
    fn unknown_name_is_an_argument_error() {
        assert!("Int".parse::<Subtype>().is_err());
        assert!("".parse::<Subtype>().is_err());
    }

    #[test]
    fn jms_family_is_closed() {
        let jms: Vec<&str> = Subtype::ALL
            .iter()
            .filter(|subtype| subtype.is_jms())
            .map(|subtype| subtype.as_str())
            .collect();
        assert_eq!(
            vec!["boolean", "byte", "short", "int", "long", "float", "double", "char", "bytes", "string", "object"],
            jms
        );
    }
}
