use std::{any::type_name, io::Write};

use byteorder::{BigEndian, WriteBytesExt};

use self::constants::TypeCode;
use super::error::{AmqpDecodeError, AmqpEncodeError};
use crate::codec::decoder::{read_u32, read_u8, MapDecoded};

pub mod constants;

pub trait AmqpEncoder {
    fn encoded_size(&self) -> u32;
    fn encode(&self, writer: &mut impl Write) -> Result<(), AmqpEncodeError>;
}

pub trait AmqpDecoder
where
    Self: Sized,
{
    fn decode(input: &[u8]) -> Result<(&[u8], Self), AmqpDecodeError>;

    fn invalid_type_code(code: TypeCode) -> AmqpDecodeError {
        AmqpDecodeError::InvalidTypeCodeFor {
            target: type_name::<Self>().to_string(),
            code,
        }
    }
}

fn is_short_compound(content_size: u32) -> bool {
    content_size < u8::MAX as u32
}

/// Size of the constructor plus the size and count fields of a list or map
/// holding `content_size` bytes of elements.
pub(crate) fn compound_header_size(content_size: u32) -> u32 {
    if is_short_compound(content_size) {
        3
    } else {
        9
    }
}

/// Writes the constructor, size and count of a list or map. The size field
/// counts the count field too.
pub(crate) fn write_compound_header(
    writer: &mut impl Write,
    short: TypeCode,
    long: TypeCode,
    content_size: u32,
    count: u32,
) -> Result<(), AmqpEncodeError> {
    if is_short_compound(content_size) {
        short.encode(writer)?;
        writer.write_u8((content_size + 1) as u8)?;
        writer.write_u8(count as u8)?;
    } else {
        long.encode(writer)?;
        writer.write_u32::<BigEndian>(content_size + 4)?;
        writer.write_u32::<BigEndian>(count)?;
    }
    Ok(())
}

/// Reads the header of a list or map whose constructor is already
/// consumed and returns the element count.
pub(crate) fn read_compound_count<T: AmqpDecoder>(
    input: &[u8],
    code: TypeCode,
    short: TypeCode,
    long: TypeCode,
) -> Result<(&[u8], u32), AmqpDecodeError> {
    if code == short {
        let (input, _size) = read_u8(input)?;
        Ok(read_u8(input).map_decoded(u32::from)?)
    } else if code == long {
        let (input, _size) = read_u32(input)?;
        Ok(read_u32(input)?)
    } else {
        Err(T::invalid_type_code(code))
    }
}
