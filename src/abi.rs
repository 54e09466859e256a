//! ABI types, as returned by `/v1/chain/get_abi`.
//!
//! Only `abi.structs` is consumed, per spec.md §3 — the rest of the ABI
//! response (actions, tables, ricardian clauses, …) is not modeled.

use serde::Deserialize;

/// A single field declaration within an ABI struct.
#[derive(Debug, Clone, Deserialize)]
pub struct AbiField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// A struct definition from `abi.structs`.
#[derive(Debug, Clone, Deserialize)]
pub struct AbiStruct {
    pub name: String,
    #[serde(default)]
    pub base: String,
    pub fields: Vec<AbiField>,
}

/// The `abi` object nested in a `get_abi` response.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AbiDefinition {
    #[serde(default)]
    pub structs: Vec<AbiStruct>,
}

/// Top-level shape of a `get_abi` response: `{"account_name": ..., "abi": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Abi {
    pub account_name: String,
    #[serde(default)]
    pub abi: AbiDefinition,
}

impl Abi {
    /// Finds a struct definition by name.
    pub fn find_struct(&self, name: &str) -> Option<&AbiStruct> {
        self.abi.structs.iter().find(|s| s.name == name)
    }

    /// Names of every struct known to this ABI, used to build a helpful
    /// `UnknownAction` error message.
    pub fn struct_names(&self) -> Vec<String> {
        self.abi.structs.iter().map(|s| s.name.clone()).collect()
    }
}

/// Capability for fetching a contract's ABI, injected into the serializer
/// so it stays free of network concerns (spec.md §9: "Keep this out of the
/// pure serializer by making the serializer take an `AbiProvider`
/// capability").
pub trait AbiProvider {
    fn abi_for(&self, account: &str) -> crate::error::Result<Abi>;
}
