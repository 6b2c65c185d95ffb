//! The read-only symbol table this core consumes.
//!
//! Collection happens upstream (out of scope per the system overview); what
//! lands here is the finished, queryable result: which names are scopes,
//! enums, structs, bitmaps, or registers, and the structural facts about
//! each (field widths, register addresses, access modes, function shapes)
//! that the classifier and handlers need to pick and emit the right C.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Hardware access mode of a register member, driving which handlers are
/// even reachable for it (a write-only member can never be classified into
/// a read path) and whether a `0` literal write needs special handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegisterAccess {
    ReadOnly,
    ReadWrite,
    WriteOnly,
    /// Write-1-to-set: writing 0 is a silent no-op, not a clear.
    Write1Set,
    /// Write-1-to-clear: writing 0 is a silent no-op; writing literal 0 is
    /// almost always a mistake the diagnostic in spec.md §7 flags.
    Write1Clear,
}

impl RegisterAccess {
    pub fn is_readable(self) -> bool {
        matches!(self, RegisterAccess::ReadOnly | RegisterAccess::ReadWrite)
    }

    pub fn is_write_only(self) -> bool {
        matches!(
            self,
            RegisterAccess::WriteOnly | RegisterAccess::Write1Set | RegisterAccess::Write1Clear
        )
    }
}

/// One bit-field within a bitmap type: its offset and width in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitField {
    pub offset: u32,
    pub width: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamInfo {
    pub name: String,
    pub base_type_name: String,
    pub is_const: bool,
    pub is_array: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub params: Vec<ParamInfo>,
    pub return_type_name: String,
    pub is_public: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackSignature {
    pub param_type_names: Vec<String>,
    pub return_type_name: String,
}

/// A fully-collected, read-only symbol table. Every map is keyed exactly as
/// the wire contract names it; a driver assembling this from its own symbol
/// collection pass should populate it once per compilation unit and never
/// mutate it afterward (§5).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    pub bitmap_fields: HashMap<String, HashMap<String, BitField>>,
    pub bitmap_bit_width: HashMap<String, u32>,

    pub register_member_access: HashMap<String, RegisterAccess>,
    pub register_member_types: HashMap<String, String>,
    pub register_base_addresses: HashMap<String, u64>,
    pub register_member_offsets: HashMap<String, u64>,

    pub known_scopes: HashSet<String>,
    pub known_enums: HashSet<String>,
    pub known_structs: HashSet<String>,
    pub known_bitmaps: HashSet<String>,
    pub known_registers: HashSet<String>,

    pub scope_private_const_values: HashMap<String, String>,
    pub scope_member_visibility: HashMap<String, HashMap<String, Visibility>>,

    pub struct_fields: HashMap<String, HashMap<String, String>>,
    pub struct_field_dimensions: HashMap<String, HashMap<String, Vec<u32>>>,
    pub struct_field_arrays: HashMap<String, HashSet<String>>,
    /// Fixed capacity of a struct field declared as a string, keyed the same
    /// way as `struct_field_dimensions` — struct type name, then field name.
    pub struct_field_string_capacity: HashMap<String, HashMap<String, u32>>,

    pub function_signatures: HashMap<String, FunctionSignature>,
    pub callback_types: HashMap<String, CallbackSignature>,
    pub callback_compatible_functions: HashMap<String, String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// `scope.member`'s visibility, defaulting to `Public` for scopes that
    /// never recorded an explicit visibility (e.g. a scope with no private
    /// section at all).
    pub fn visibility_of(&self, scope: &str, member: &str) -> Visibility {
        self.scope_member_visibility
            .get(scope)
            .and_then(|m| m.get(member))
            .copied()
            .unwrap_or(Visibility::Public)
    }

    pub fn register_access(&self, qualified_member: &str) -> Option<RegisterAccess> {
        self.register_member_access.get(qualified_member).copied()
    }

    pub fn bitmap_field(&self, bitmap_type: &str, field: &str) -> Option<BitField> {
        self.bitmap_fields.get(bitmap_type)?.get(field).copied()
    }

    pub fn struct_field_type(&self, struct_name: &str, field: &str) -> Option<&str> {
        self.struct_fields
            .get(struct_name)?
            .get(field)
            .map(String::as_str)
    }

    pub fn struct_field_string_capacity(&self, struct_name: &str, field: &str) -> Option<u32> {
        self.struct_field_string_capacity.get(struct_name)?.get(field).copied()
    }

    /// Whether `struct_name` declares any field at all named `field` — used
    /// to tell "not a string field" (fall through to another handler) apart
    /// from "no such field" (`UnknownStructField`).
    pub fn struct_has_field(&self, struct_name: &str, field: &str) -> bool {
        self.struct_fields.get(struct_name).is_some_and(|f| f.contains_key(field))
            || self.struct_field_string_capacity(struct_name, field).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_defaults_to_public() {
        let symbols = SymbolTable::new();
        assert_eq!(symbols.visibility_of("Motor", "speed"), Visibility::Public);
    }

    #[test]
    fn write_only_variants_report_write_only() {
        assert!(RegisterAccess::WriteOnly.is_write_only());
        assert!(RegisterAccess::Write1Set.is_write_only());
        assert!(RegisterAccess::Write1Clear.is_write_only());
        assert!(!RegisterAccess::ReadWrite.is_write_only());
    }

    #[test]
    fn bitmap_field_lookup() {
        let mut symbols = SymbolTable::new();
        let mut fields = HashMap::new();
        fields.insert("enable".to_string(), BitField { offset: 0, width: 1 });
        symbols.bitmap_fields.insert("StatusFlags".to_string(), fields);
        assert_eq!(
            symbols.bitmap_field("StatusFlags", "enable"),
            Some(BitField { offset: 0, width: 1 })
        );
        assert_eq!(symbols.bitmap_field("StatusFlags", "missing"), None);
    }
}
