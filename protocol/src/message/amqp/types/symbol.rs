use std::{fmt, io::Write, ops::Deref};

#[cfg(test)]
use fake::Fake;

use super::{
    primitives::{read_utf8, variable_width_size, write_variable_width},
    Str,
};
use crate::message::amqp::{
    codec::{constants::TypeCode, AmqpDecoder, AmqpEncoder},
    error::{AmqpDecodeError, AmqpEncodeError},
};

/// ASCII name with its own format codes; used for content types,
/// annotation keys and descriptors
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(fake::Dummy))]
pub struct Symbol(Str);

impl Deref for Symbol {
    type Target = Str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AmqpEncoder for Symbol {
    fn encoded_size(&self) -> u32 {
        variable_width_size(self.0.len())
    }

    fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError> {
        write_variable_width(writer, TypeCode::Symbol8, TypeCode::Symbol32, self.0.as_bytes())
    }
}

impl AmqpDecoder for Symbol {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError> {
        read_utf8::<Self>(input, TypeCode::Symbol8, TypeCode::Symbol32)
            .map(|(input, name)| (input, Symbol(name)))
    }
}

impl From<Str> for Symbol {
    fn from(string: Str) -> Self {
        Symbol(string)
    }
}

impl From<&str> for Symbol {
    fn from(string: &str) -> Self {
        Symbol(string.to_string())
    }
}

impl Symbol {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
