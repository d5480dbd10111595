use byteorder::ByteOrder;

use crate::error::IncompleteError;

/// Maps the value half of a `(remaining, value)` decode result.
pub(crate) trait MapDecoded<'a, T, E> {
    fn map_decoded<U>(self, mapper: impl FnOnce(T) -> U) -> Result<(&'a [u8], U), E>;
}

impl<'a, T, E> MapDecoded<'a, T, E> for Result<(&'a [u8], T), E> {
    fn map_decoded<U>(self, mapper: impl FnOnce(T) -> U) -> Result<(&'a [u8], U), E> {
        self.map(|(remaining, value)| (remaining, mapper(value)))
    }
}

pub fn check_len(input: &[u8], size: usize) -> Result<(), IncompleteError> {
    if input.len() < size {
        return Err(IncompleteError(size));
    }
    Ok(())
}

macro_rules! reader {
    ( $fn:ident, $size:expr, $ret:ty) => {
        #[allow(unused)]
        pub fn $fn(input: &[u8]) -> Result<(&[u8], $ret), IncompleteError> {
            check_len(input, $size)?;
            let x = byteorder::BigEndian::$fn(input);
            Ok((&input[$size..], x))
        }
    };
}

pub fn read_u8(input: &[u8]) -> Result<(&[u8], u8), IncompleteError> {
    check_len(input, 1)?;
    Ok((&input[1..], input[0]))
}

pub fn read_i8(input: &[u8]) -> Result<(&[u8], i8), IncompleteError> {
    read_u8(input).map(|(input, value)| (input, value as i8))
}

pub fn read_exact(input: &[u8], len: usize) -> Result<(&[u8], &[u8]), IncompleteError> {
    check_len(input, len)?;
    let (bytes, remaining) = input.split_at(len);
    Ok((remaining, bytes))
}

reader!(read_i16, 2, i16);
reader!(read_u16, 2, u16);
reader!(read_u32, 4, u32);
reader!(read_i32, 4, i32);
reader!(read_u64, 8, u64);
reader!(read_i64, 8, i64);
reader!(read_f32, 4, f32);
reader!(read_f64, 8, f64);

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{read_exact, read_i16, read_i8, read_u32};

    #[test]
    fn read_signed_byte_keeps_sign() {
        let (remaining, value) = read_i8(&[0xff, 0x01]).unwrap();
        assert_eq!(-1, value);
        assert_eq!(&[0x01], remaining);
    }

    #[test]
    fn read_reports_missing_bytes() {
        let err = read_u32(&[0x00, 0x01]).unwrap_err();
        assert_eq!(4, err.0);
        assert!(read_i16(&[]).is_err());
    }

    #[test]
    fn read_exact_splits_input() {
        let (remaining, bytes) = read_exact(b"abcdef", 4).unwrap();
        assert_eq!(b"abcd", bytes);
        assert_eq!(b"ef", remaining);
        assert!(read_exact(b"ab", 3).is_err());
    }
}
