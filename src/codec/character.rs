//! A char is one UTF-16 code unit. Letters and digits travel as
//! themselves, anything else as base64 of its big-endian bytes with
//! leading zero bytes dropped.
use std::convert::TryFrom;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::{error::ShimError, subtype::Subtype, ShimResult};

pub fn encode_char(unit: u16) -> String {
    match char::from_u32(u32::from(unit)) {
        Some(c) if c.is_alphanumeric() => c.to_string(),
        _ => {
            let bytes = unit.to_be_bytes();
            let minimal = if bytes[0] == 0 { &bytes[1..] } else { &bytes[..] };
            STANDARD.encode(minimal)
        }
    }
}

/// Accepts a single code point, a `\xNN`/`\xNNNN` escape or base64 of one
/// or two bytes.
pub fn decode_char(text: &str) -> ShimResult<u16> {
    let malformed = |reason: &str| ShimError::malformed(Subtype::Char.as_str(), text, reason);

    let mut chars = text.chars();
    if let (Some(single), None) = (chars.next(), chars.next()) {
        let code = u32::from(single);
        return u16::try_from(code).map_err(|_| malformed("outside the basic multilingual plane"));
    }

    if text.starts_with("\\x") {
        return decode_char_escape(text).ok_or_else(|| malformed("escape needs one to four hex digits"));
    }

    let bytes = STANDARD
        .decode(text)
        .map_err(|err| malformed(&err.to_string()))?;
    match bytes.as_slice() {
        [low] => Ok(u16::from(*low)),
        [high, low] => Ok(u16::from_be_bytes([*high, *low])),
        _ => Err(malformed("base64 must carry one or two bytes")),
    }
}

/// Value of a `\xNN` or `\xNNNN` escape
pub fn decode_char_escape(text: &str) -> Option<u16> {
    let hex = text.strip_prefix("\\x")?;
    if hex.is_empty() || hex.len() > 4 {
        return None;
    }
    u16::from_str_radix(hex, 16).ok()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{decode_char, encode_char};

    #[test]
    fn alphanumerics_are_literal() {
        assert_eq!("a", encode_char(u16::from(b'a')));
        assert_eq!("Z", encode_char(u16::from(b'Z')));
        assert_eq!("7", encode_char(u16::from(b'7')));
        assert_eq!("é", encode_char(0x00e9));
    }

    #[test]
    fn other_units_are_base64() {
        assert_eq!("//8=", encode_char(0xffff));
        assert_eq!("AA==", encode_char(0));
        assert_eq!("IA==", encode_char(u16::from(b' ')));
        assert_eq!("2AA=", encode_char(0xd800));
    }

    #[test]
    fn every_accepted_form_decodes() {
        assert_eq!(0xffff, decode_char("\\xFFFF").unwrap());
        assert_eq!(0x41, decode_char("\\x41").unwrap());
        assert_eq!(0xffff, decode_char("//8=").unwrap());
        assert_eq!(0x20, decode_char("IA==").unwrap());
        assert_eq!(u16::from(b'q'), decode_char("q").unwrap());
        assert_eq!(0x00e9, decode_char("é").unwrap());
    }

    #[test]
    fn round_trip_through_canonical_form() {
        for unit in [0u16, 0x20, 0x41, 0x7f, 0xe9, 0x3a9, 0xd800, 0xfffe, 0xffff].iter() {
            assert_eq!(*unit, decode_char(&encode_char(*unit)).unwrap());
        }
    }

    #[test]
    fn bad_input_is_rejected() {
        assert!(decode_char("").is_err());
        assert!(decode_char("\\x").is_err());
        assert!(decode_char("\\x12345").is_err());
        assert!(decode_char("AAAA").is_err());
        assert!(decode_char("😀").is_err());
    }
}
