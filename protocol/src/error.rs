use std::string::FromUtf8Error;

#[derive(Debug)]
pub struct IncompleteError(pub usize);

#[derive(Debug)]
pub enum DecodeError {
    Incomplete(IncompleteError),
    MessageParse(String),
    InvalidFormatCode(u8),
    Utf8Error(FromUtf8Error),
}

#[derive(Debug)]
pub enum EncodeError {
    Io(std::io::Error),
}

impl From<std::io::Error> for EncodeError {
    fn from(err: std::io::Error) -> Self {
        EncodeError::Io(err)
    }
}

impl From<IncompleteError> for DecodeError {
    fn from(err: IncompleteError) -> Self {
        DecodeError::Incomplete(err)
    }
}

impl From<FromUtf8Error> for DecodeError {
    fn from(err: FromUtf8Error) -> Self {
        DecodeError::Utf8Error(err)
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Incomplete(IncompleteError(needed)) => {
                write!(f, "incomplete input, {} bytes needed", needed)
            }
            DecodeError::MessageParse(msg) => write!(f, "{}", msg),
            DecodeError::InvalidFormatCode(code) => write!(f, "invalid format code {:#04x}", code),
            DecodeError::Utf8Error(err) => write!(f, "{}", err),
        }
    }
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for DecodeError {}
impl std::error::Error for EncodeError {}
