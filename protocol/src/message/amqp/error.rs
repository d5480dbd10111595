use std::{fmt, string::FromUtf8Error};

use crate::error::{DecodeError, EncodeError, IncompleteError};

use super::codec::constants::TypeCode;

#[derive(Debug)]
pub enum AmqpEncodeError {
    Io(std::io::Error),
}

impl From<std::io::Error> for AmqpEncodeError {
    fn from(err: std::io::Error) -> Self {
        AmqpEncodeError::Io(err)
    }
}

#[derive(Debug)]
pub enum AmqpDecodeError {
    InvalidTypeCode(u8),
    InvalidTypeCodeFor { target: String, code: TypeCode },
    MessageParse(String),
    Incomplete(IncompleteError),
    Utf8Error(FromUtf8Error),
}

impl AmqpDecodeError {
    pub fn parse_error(msg: impl Into<String>) -> AmqpDecodeError {
        AmqpDecodeError::MessageParse(msg.into())
    }
}

impl fmt::Display for AmqpDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmqpDecodeError::InvalidTypeCode(code) => write!(f, "unknown type code {:#04x}", code),
            AmqpDecodeError::InvalidTypeCodeFor { target, code } => {
                write!(f, "type code {:?} cannot be decoded as {}", code, target)
            }
            AmqpDecodeError::MessageParse(msg) => write!(f, "{}", msg),
            AmqpDecodeError::Incomplete(IncompleteError(needed)) => {
                write!(f, "incomplete input, {} bytes needed", needed)
            }
            AmqpDecodeError::Utf8Error(err) => write!(f, "{}", err),
        }
    }
}

impl From<IncompleteError> for AmqpDecodeError {
    fn from(err: IncompleteError) -> Self {
        AmqpDecodeError::Incomplete(err)
    }
}

impl From<FromUtf8Error> for AmqpDecodeError {
    fn from(err: FromUtf8Error) -> Self {
        AmqpDecodeError::Utf8Error(err)
    }
}

impl From<AmqpEncodeError> for EncodeError {
    fn from(err: AmqpEncodeError) -> Self {
        match err {
            AmqpEncodeError::Io(err) => EncodeError::Io(err),
        }
    }
}

impl From<AmqpDecodeError> for DecodeError {
    fn from(err: AmqpDecodeError) -> Self {
        match err {
            AmqpDecodeError::InvalidTypeCode(code) => DecodeError::InvalidFormatCode(code),
            AmqpDecodeError::MessageParse(err) => DecodeError::MessageParse(err),
            AmqpDecodeError::Incomplete(err) => DecodeError::Incomplete(err),
            AmqpDecodeError::Utf8Error(err) => DecodeError::Utf8Error(err),
            AmqpDecodeError::InvalidTypeCodeFor { target, code } => {
                DecodeError::MessageParse(format!("Invalid type code {:?} for {}", code, target))
            }
        }
    }
}
