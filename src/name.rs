//! EOSIO `name` encoding and decoding.
//!
//! A `name` is a 64-bit identifier packed from up to 13 characters of the
//! alphabet `.12345abcdefghijklmnopqrstuvwxyz`, 5 bits per character except
//! the final (13th) character which only contributes 4 bits — see
//! [`validate`] for the exact grammar.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

const ALPHABET: &[u8] = b".12345abcdefghijklmnopqrstuvwxyz";

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[.1-5a-z]{0,12}[.1-5a-j]?$").unwrap());

/// Validates a name string against the EOSIO name grammar.
pub fn validate(name: &str) -> Result<()> {
    if name.len() > 13 || !NAME_RE.is_match(name) {
        return Err(Error::UnsupportedType(format!("invalid name: {name:?}")));
    }
    Ok(())
}

fn char_to_symbol(c: u8) -> Result<u64> {
    ALPHABET
        .iter()
        .position(|&a| a == c)
        .map(|i| i as u64)
        .ok_or_else(|| Error::UnsupportedType(format!("invalid name character: {}", c as char)))
}

fn symbol_to_char(v: u64) -> u8 {
    ALPHABET[v as usize]
}

/// Packs a validated name into its 64-bit wire value.
///
/// Each of the first 12 characters contributes 5 bits, most-significant
/// first; the 13th (if present) contributes only its low 4 bits. Missing
/// characters contribute zero bits.
pub fn encode(name: &str) -> Result<u64> {
    validate(name)?;
    let bytes = name.as_bytes();
    let mut value: u64 = 0;
    for i in 0..13 {
        let c = if i < bytes.len() {
            char_to_symbol(bytes[i])?
        } else {
            0
        };
        if i < 12 {
            value |= (c & 0x1f) << (64 - 5 * (i + 1));
        } else {
            value |= c & 0x0f;
        }
    }
    Ok(value)
}

/// Unpacks a 64-bit wire value back into its name string, trimming the
/// trailing `.` padding produced by names shorter than 13 characters.
pub fn decode(value: u64) -> String {
    let mut chars = Vec::with_capacity(13);
    for i in 0..13 {
        let v = if i < 12 {
            (value >> (64 - 5 * (i + 1))) & 0x1f
        } else {
            value & 0x0f
        };
        if v == 0 && chars.is_empty() {
            // leading zero-value slots still decode to '.', kept for now and
            // trimmed below along with trailing padding
        }
        chars.push(symbol_to_char(v));
    }
    let mut s = String::from_utf8(chars).expect("alphabet is ASCII");
    while s.ends_with('.') {
        s.pop();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_eosio() {
        let value = encode("eosio").unwrap();
        assert_eq!(value.to_le_bytes(), [0x00, 0x00, 0x00, 0x00, 0x00, 0xea, 0x30, 0x55]);
    }

    #[test]
    fn encodes_eosio_token() {
        let value = encode("eosio.token").unwrap();
        assert_eq!(
            value.to_le_bytes(),
            [0x00, 0xa6, 0x82, 0x34, 0x03, 0xea, 0x30, 0x55]
        );
    }

    #[test]
    fn roundtrips_for_all_valid_names() {
        for name in ["eosio", "eosio.token", "a", "zzzzzzzzzzzzj", "bidname"] {
            let value = encode(name).unwrap();
            assert_eq!(decode(value), name);
        }
    }

    #[test]
    fn rejects_invalid_last_char() {
        // 13th char restricted to .1-5a-j; 'z' is outside that range.
        assert!(validate("aaaaaaaaaaaaz").is_err());
    }

    #[test]
    fn rejects_too_long() {
        assert!(validate("aaaaaaaaaaaaaa").is_err());
    }
}
