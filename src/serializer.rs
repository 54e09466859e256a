//! ABI-driven canonical binary serialization (component C).
//!
//! A single recursive entry point, [`serialize`], interprets a `type`
//! string as a tiny DSL mirroring on-chain ABI descriptions: a trailing
//! `[]` means "array of", a handful of literal names are wire primitives,
//! and anything else is looked up as a struct in the supplied [`Abi`].
//!
//! Per the REDESIGN FLAG in SPEC_FULL.md §4.2, array and `bytes` lengths
//! are emitted as `varuint32`, not as a single byte — this is the one
//! place this implementation's wire format diverges from the distilled
//! spec's literal (buggy) source behavior.

use serde_json::Value as Json;

use crate::abi::Abi;
use crate::error::{Error, Result};
use crate::name;
use crate::varint;

/// Extra parameters threaded through a `serialize` call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerializeArgs {
    /// When true, the struct's packed bytes are themselves wrapped as a
    /// length-prefixed `bytes` blob (used for an action's `data` field).
    pub as_bytes: bool,
}

/// Serializes `value` under the ABI type DSL described in SPEC_FULL.md §4.2.
pub fn serialize(value: &Json, type_name: &str, args: SerializeArgs, abi: &Abi) -> Result<Vec<u8>> {
    if let Some(prefix) = type_name.strip_suffix("[]") {
        return serialize_array(value, prefix, abi);
    }

    match type_name {
        "uint8" => serialize_uint(value, "uint8", u8::MAX as i128, 1),
        "uint16" => serialize_uint(value, "uint16", u16::MAX as i128, 2),
        "uint32" => serialize_uint(value, "uint32", u32::MAX as i128, 4),
        "varuint32" => serialize_varuint32(value),
        "time_point_sec" => serialize_time_point_sec(value),
        "bytes" => serialize_bytes(value),
        "string" => serialize_string(value),
        "name" => serialize_name(value),
        other => serialize_struct_by_name(value, other, args, abi),
    }
}

fn as_u128(value: &Json, type_name: &str) -> Result<i128> {
    value
        .as_u64()
        .map(|v| v as i128)
        .or_else(|| value.as_i64().map(|v| v as i128))
        .ok_or_else(|| Error::OutOfRange {
            type_name: type_name.to_string(),
            value: 0,
        })
}

fn serialize_uint(value: &Json, type_name: &str, max: i128, width: usize) -> Result<Vec<u8>> {
    let n = as_u128(value, type_name)?;
    if n < 0 || n > max {
        return Err(Error::OutOfRange {
            type_name: type_name.to_string(),
            value: n,
        });
    }
    let bytes = (n as u64).to_le_bytes();
    Ok(bytes[..width].to_vec())
}

fn serialize_varuint32(value: &Json) -> Result<Vec<u8>> {
    let n = as_u128(value, "varuint32")?;
    if n < 0 || n > u32::MAX as i128 {
        return Err(Error::OutOfRange {
            type_name: "varuint32".to_string(),
            value: n,
        });
    }
    Ok(varint::encode(n as u32))
}

fn serialize_time_point_sec(value: &Json) -> Result<Vec<u8>> {
    let s = value.as_str().ok_or_else(|| Error::UnsupportedType("time_point_sec expects a string".to_string()))?;
    let dt = chrono::DateTime::parse_from_rfc3339(s)
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(|naive| naive.and_utc().fixed_offset()))
        .map_err(|_| Error::InvalidTimestamp(s.to_string()))?;
    let secs = dt.timestamp();
    if !(0..=u32::MAX as i64).contains(&secs) {
        return Err(Error::OutOfRange {
            type_name: "time_point_sec".to_string(),
            value: secs as i128,
        });
    }
    Ok((secs as u32).to_le_bytes().to_vec())
}

fn serialize_bytes(value: &Json) -> Result<Vec<u8>> {
    let raw = match value {
        Json::String(s) => hex::decode(s.strip_prefix("0x").unwrap_or(s))?,
        Json::Array(items) => items
            .iter()
            .map(|v| v.as_u64().map(|n| n as u8))
            .collect::<Option<Vec<u8>>>()
            .ok_or_else(|| Error::UnsupportedType("bytes array must contain u8 values".to_string()))?,
        _ => return Err(Error::UnsupportedType("bytes expects a hex string or byte array".to_string())),
    };
    Ok(length_prefixed(&raw))
}

fn serialize_string(value: &Json) -> Result<Vec<u8>> {
    let s = value.as_str().ok_or_else(|| Error::UnsupportedType("string expects a string".to_string()))?;
    Ok(length_prefixed(s.as_bytes()))
}

fn serialize_name(value: &Json) -> Result<Vec<u8>> {
    let s = value.as_str().ok_or_else(|| Error::UnsupportedType("name expects a string".to_string()))?;
    let packed = name::encode(s)?;
    Ok(packed.to_le_bytes().to_vec())
}

fn serialize_array(value: &Json, elem_type: &str, abi: &Abi) -> Result<Vec<u8>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::UnsupportedType(format!("{elem_type}[] expects an array")))?;
    let mut out = varint::encode(items.len() as u32);
    for item in items {
        out.extend(serialize(item, elem_type, SerializeArgs::default(), abi)?);
    }
    Ok(out)
}

fn serialize_struct_by_name(value: &Json, struct_name: &str, args: SerializeArgs, abi: &Abi) -> Result<Vec<u8>> {
    let def = abi.find_struct(struct_name).ok_or_else(|| Error::UnsupportedType(struct_name.to_string()))?;
    let obj = value
        .as_object()
        .ok_or_else(|| Error::UnsupportedType(format!("{struct_name} expects an object")))?;

    let mut out = Vec::new();
    for field in &def.fields {
        let field_value = obj.get(&field.name).ok_or_else(|| Error::MissingField {
            struct_name: struct_name.to_string(),
            field: field.name.clone(),
        })?;
        out.extend(serialize(field_value, &field.type_name, SerializeArgs::default(), abi)?);
    }

    if args.as_bytes {
        Ok(length_prefixed(&out))
    } else {
        Ok(out)
    }
}

/// `varuint32 len || raw` — the shared framing for `bytes` and for a
/// struct wrapped with `args.as_bytes == true`.
fn length_prefixed(raw: &[u8]) -> Vec<u8> {
    let mut out = varint::encode(raw.len() as u32);
    out.extend_from_slice(raw);
    out
}

/// `pair<T, U>`: `varuint32 count || s(value[0], T) || s(value[1], U)`.
/// `count` must be 0 (empty pair) or 2.
pub fn serialize_pair(
    values: &[Json; 2],
    type0: &str,
    type1: &str,
    abi: &Abi,
) -> Result<Vec<u8>> {
    let mut out = varint::encode(2);
    out.extend(serialize(&values[0], type0, SerializeArgs::default(), abi)?);
    out.extend(serialize(&values[1], type1, SerializeArgs::default(), abi)?);
    Ok(out)
}
