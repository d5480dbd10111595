use std::io::Write;

use crate::error::{DecodeError, EncodeError};

pub mod decoder;

/// Frame-level encoding of a complete message.
pub trait Encoder {
    fn encoded_size(&self) -> u32;
    fn encode(&self, writer: &mut impl Write) -> Result<(), EncodeError>;

    fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut buffer = Vec::with_capacity(self.encoded_size() as usize);
        self.encode(&mut buffer)?;
        Ok(buffer)
    }
}

/// Frame-level decoding of a complete message.
pub trait Decoder
where
    Self: Sized,
{
    fn decode(input: &[u8]) -> Result<(&[u8], Self), DecodeError>;
}
