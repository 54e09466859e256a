//! Row decoding for `get_table_rows` (component E support).
//!
//! Table rows come back from a node already as parsed JSON when
//! `json: true` is requested, except for a handful of wide-integer types
//! nodes commonly leave as hex-encoded strings. This module only concerns
//! itself with decoding those: `name`, `int64`, and `uint64`.

use crate::error::{Error, Result};
use crate::name;

/// Decodes a little-endian wire value back into its logical form for
/// `type_name`. `raw` must be exactly the wire width for the type.
pub fn decode_field(raw: &[u8], type_name: &str) -> Result<serde_json::Value> {
    match type_name {
        "name" => {
            let bytes: [u8; 8] = raw
                .try_into()
                .map_err(|_| Error::UnsupportedType("name field must be 8 bytes".to_string()))?;
            Ok(serde_json::Value::String(name::decode(u64::from_le_bytes(bytes))))
        }
        "uint64" => {
            let bytes: [u8; 8] = raw
                .try_into()
                .map_err(|_| Error::UnsupportedType("uint64 field must be 8 bytes".to_string()))?;
            Ok(serde_json::Value::Number(u64::from_le_bytes(bytes).into()))
        }
        "int64" => {
            let bytes: [u8; 8] = raw
                .try_into()
                .map_err(|_| Error::UnsupportedType("int64 field must be 8 bytes".to_string()))?;
            Ok(serde_json::Value::Number(i64::from_le_bytes(bytes).into()))
        }
        other => Err(Error::UnsupportedType(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_name_field() {
        let raw = name::encode("eosio").unwrap().to_le_bytes();
        let value = decode_field(&raw, "name").unwrap();
        assert_eq!(value, serde_json::json!("eosio"));
    }

    #[test]
    fn decodes_uint64_field() {
        let raw = 123_456_789u64.to_le_bytes();
        let value = decode_field(&raw, "uint64").unwrap();
        assert_eq!(value, serde_json::json!(123_456_789u64));
    }

    #[test]
    fn decodes_negative_int64_field() {
        let raw = (-42i64).to_le_bytes();
        let value = decode_field(&raw, "int64").unwrap();
        assert_eq!(value, serde_json::json!(-42));
    }

    #[test]
    fn rejects_unsupported_type() {
        assert!(matches!(decode_field(&[0; 8], "float64"), Err(Error::UnsupportedType(_))));
    }
}
