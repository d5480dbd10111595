//! Integer text forms: sign-magnitude hex for the signed JMS types, plain
//! hex for the unsigned AMQP types and fixed width big-endian hex for the
//! 64-bit wire values.
use crate::{error::ShimError, subtype::Subtype, ShimResult};

/// `-0x<hex>` or `0x<hex>` of the magnitude, never two's complement.
pub fn signed_hex(value: i64) -> String {
    if value < 0 {
        format!("-0x{:x}", value.unsigned_abs())
    } else {
        format!("0x{:x}", value)
    }
}

pub fn unsigned_hex(value: u64) -> String {
    format!("0x{:x}", value)
}

/// Exactly 16 hex digits, the big-endian layout of the 8 wire bytes.
pub fn wide_hex(bytes: [u8; 8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn split_sign(text: &str) -> (bool, &str) {
    match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    }
}

fn hex_digits(text: &str) -> Option<&str> {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .or_else(|| text.strip_prefix('#'))
}

/// Magnitude of a hex (`0x`, `#`) or decimal literal
fn parse_magnitude(subtype: Subtype, original: &str, digits: &str) -> ShimResult<u64> {
    let parsed = match hex_digits(digits) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => digits.parse::<u64>(),
    };
    parsed.map_err(|err| ShimError::malformed(subtype.as_str(), original, err.to_string()))
}

/// Parses a sign-magnitude literal and range checks it against `bits`.
pub fn parse_signed(subtype: Subtype, text: &str, bits: u32) -> ShimResult<i64> {
    let (negative, digits) = split_sign(text.trim());
    let magnitude = parse_magnitude(subtype, text, digits)?;
    let limit = 1u64 << (bits - 1);

    if negative {
        if magnitude > limit {
            return Err(ShimError::malformed(
                subtype.as_str(),
                text,
                format!("below the {}-bit range", bits),
            ));
        }
        Ok((magnitude as i64).wrapping_neg())
    } else if magnitude >= limit {
        Err(ShimError::malformed(
            subtype.as_str(),
            text,
            format!("above the {}-bit range", bits),
        ))
    } else {
        Ok(magnitude as i64)
    }
}

/// Parses a non-negative hex or decimal literal that must fit in `bits`.
pub fn parse_unsigned(subtype: Subtype, text: &str, bits: u32) -> ShimResult<u64> {
    let text = text.trim();
    if text.starts_with('-') {
        return Err(ShimError::malformed(
            subtype.as_str(),
            text,
            "negative value for an unsigned type",
        ));
    }
    let magnitude = parse_magnitude(subtype, text, text.trim_start_matches('+'))?;
    if bits < 64 && magnitude >> bits != 0 {
        return Err(ShimError::malformed(
            subtype.as_str(),
            text,
            format!("above the {}-bit range", bits),
        ));
    }
    Ok(magnitude)
}

/// Reads a hex or arbitrary precision decimal literal into 8 big-endian
/// bytes. Bytes above the low 8 are dropped and shorter values are zero
/// padded on the left.
pub fn parse_wide(subtype: Subtype, text: &str) -> ShimResult<[u8; 8]> {
    let text = text.trim();
    let malformed = |reason: &str| ShimError::malformed(subtype.as_str(), text, reason);

    let big_endian = match hex_digits(text) {
        Some(hex) => {
            if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(malformed("invalid hex digits"));
            }
            let padded = if hex.len() % 2 == 1 {
                format!("0{}", hex)
            } else {
                hex.to_string()
            };
            hex::decode(padded).map_err(|err| malformed(&err.to_string()))?
        }
        None => {
            if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
                return Err(malformed("expected hex or decimal digits"));
            }
            decimal_to_big_endian(text)
        }
    };

    let mut wide = [0u8; 8];
    let keep = big_endian.len().min(8);
    wide[8 - keep..].copy_from_slice(&big_endian[big_endian.len() - keep..]);
    Ok(wide)
}

fn decimal_to_big_endian(digits: &str) -> Vec<u8> {
    // little-endian accumulator, multiplied by ten per digit
    let mut acc: Vec<u8> = vec![0];
    for digit in digits.bytes().map(|b| b - b'0') {
        let mut carry = u32::from(digit);
        for byte in acc.iter_mut() {
            let value = u32::from(*byte) * 10 + carry;
            *byte = (value & 0xff) as u8;
            carry = value >> 8;
        }
        while carry > 0 {
            acc.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }
    acc.reverse();
    acc
}
