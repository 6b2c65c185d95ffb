//! Type information for the values this core reads and assigns.
//!
//! Unlike the upstream type checker (out of scope here), this module only
//! needs to answer the questions the classifier and handlers actually ask:
//! how wide is it, is it an array, is it a string buffer, is it a bitmap.

/// Scalar base types a variable, field, or register member can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Bool,
}

impl BaseType {
    pub fn bit_width(self) -> u32 {
        match self {
            BaseType::U8 | BaseType::I8 => 8,
            BaseType::U16 | BaseType::I16 => 16,
            BaseType::U32 | BaseType::I32 | BaseType::F32 => 32,
            BaseType::U64 | BaseType::I64 | BaseType::F64 => 64,
            BaseType::Bool => 1,
        }
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            BaseType::U8 | BaseType::U16 | BaseType::U32 | BaseType::U64 | BaseType::Bool
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, BaseType::F32 | BaseType::F64)
    }

    pub fn is_64bit(self) -> bool {
        matches!(self, BaseType::U64 | BaseType::I64 | BaseType::F64)
    }

    /// The MISRA-flavored `<stdint.h>` spelling used in emitted C.
    pub fn c_name(self) -> &'static str {
        match self {
            BaseType::U8 => "uint8_t",
            BaseType::U16 => "uint16_t",
            BaseType::U32 => "uint32_t",
            BaseType::U64 => "uint64_t",
            BaseType::I8 => "int8_t",
            BaseType::I16 => "int16_t",
            BaseType::I32 => "int32_t",
            BaseType::I64 => "int64_t",
            BaseType::F32 => "float",
            BaseType::F64 => "double",
            BaseType::Bool => "bool",
        }
    }

    /// Short suffix used in generated helper names (`cnx_safe_div_u32`,
    /// `cnx_clamp_add_s8`).
    pub fn short_name(self) -> &'static str {
        match self {
            BaseType::U8 => "u8",
            BaseType::U16 => "u16",
            BaseType::U32 => "u32",
            BaseType::U64 => "u64",
            BaseType::I8 => "s8",
            BaseType::I16 => "s16",
            BaseType::I32 => "s32",
            BaseType::I64 => "s64",
            BaseType::F32 => "f32",
            BaseType::F64 => "f64",
            BaseType::Bool => "bool",
        }
    }

    /// Recover a [`BaseType`] from the suffix [`BaseType::short_name`]
    /// produces, the inverse mapping needed wherever a helper key (stored as
    /// `"<op>_<short_name>"` in a used-ops set) must be turned back into a
    /// real C type for rendering a helper body.
    pub fn from_short_name(name: &str) -> Option<BaseType> {
        Some(match name {
            "u8" => BaseType::U8,
            "u16" => BaseType::U16,
            "u32" => BaseType::U32,
            "u64" => BaseType::U64,
            "s8" => BaseType::I8,
            "s16" => BaseType::I16,
            "s32" => BaseType::I32,
            "s64" => BaseType::I64,
            "f32" => BaseType::F32,
            "f64" => BaseType::F64,
            "bool" => BaseType::Bool,
            _ => return None,
        })
    }

    /// Unsigned integer type of the same width, used to build a mask/shift
    /// expression for a value that may itself be signed or floating point.
    pub fn unsigned_carrier(self) -> BaseType {
        match self {
            BaseType::F32 => BaseType::U32,
            BaseType::F64 => BaseType::U64,
            BaseType::I8 => BaseType::U8,
            BaseType::I16 => BaseType::U16,
            BaseType::I32 => BaseType::U32,
            BaseType::I64 => BaseType::U64,
            other => other,
        }
    }
}

/// Full type information for a variable, struct field, or register/bitmap
/// member, as resolved by the local type registry or the symbol table.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    pub base_type: BaseType,
    /// `Some(width)` when this is itself a bitmap-field-like sub-range
    /// rather than a whole scalar (rare; most bit widths are carried by the
    /// bitmap/register symbol maps instead).
    pub bit_width: Option<u32>,
    pub is_array: bool,
    pub array_dimensions: Option<Vec<u32>>,
    pub is_const: bool,
    pub is_atomic: bool,
    pub is_string: bool,
    pub string_capacity: Option<u32>,
    pub is_enum: bool,
    pub enum_type_name: Option<String>,
    pub is_bitmap: bool,
    pub bitmap_type_name: Option<String>,
    /// Target has a clamp/saturate modifier in its declared type — drives
    /// `OVERFLOW_CLAMP` classification. Not named as a standalone field in
    /// the wire contract, but it has to live somewhere; this is the natural
    /// place, alongside the other per-declaration modifiers (documented as
    /// a Decision in DESIGN.md).
    pub is_saturating: bool,
}

impl TypeInfo {
    pub fn scalar(base_type: BaseType) -> Self {
        TypeInfo {
            base_type,
            bit_width: None,
            is_array: false,
            array_dimensions: None,
            is_const: false,
            is_atomic: false,
            is_string: false,
            string_capacity: None,
            is_enum: false,
            enum_type_name: None,
            is_bitmap: false,
            bitmap_type_name: None,
            is_saturating: false,
        }
    }

    pub fn array_of(base_type: BaseType, dimensions: Vec<u32>) -> Self {
        TypeInfo {
            is_array: true,
            array_dimensions: Some(dimensions),
            ..TypeInfo::scalar(base_type)
        }
    }

    pub fn string(capacity: u32) -> Self {
        TypeInfo {
            is_string: true,
            string_capacity: Some(capacity),
            ..TypeInfo::scalar(BaseType::U8)
        }
    }

    pub fn bitmap(type_name: impl Into<String>) -> Self {
        TypeInfo {
            is_bitmap: true,
            bitmap_type_name: Some(type_name.into()),
            ..TypeInfo::scalar(BaseType::U32)
        }
    }

    pub fn with_const(mut self, value: bool) -> Self {
        self.is_const = value;
        self
    }

    pub fn with_atomic(mut self, value: bool) -> Self {
        self.is_atomic = value;
        self
    }

    pub fn with_saturating(mut self, value: bool) -> Self {
        self.is_saturating = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_match_helper_suffix_convention() {
        assert_eq!(BaseType::U32.short_name(), "u32");
        assert_eq!(BaseType::I8.short_name(), "s8");
    }

    #[test]
    fn from_short_name_round_trips_through_short_name() {
        for bt in [
            BaseType::U8,
            BaseType::U16,
            BaseType::U32,
            BaseType::U64,
            BaseType::I8,
            BaseType::I16,
            BaseType::I32,
            BaseType::I64,
            BaseType::F32,
            BaseType::F64,
            BaseType::Bool,
        ] {
            assert_eq!(BaseType::from_short_name(bt.short_name()), Some(bt));
        }
        assert_eq!(BaseType::from_short_name("bogus"), None);
    }

    #[test]
    fn bit_widths_match_stdint_sizes() {
        assert_eq!(BaseType::U8.bit_width(), 8);
        assert_eq!(BaseType::I64.bit_width(), 64);
        assert_eq!(BaseType::F32.bit_width(), 32);
    }

    #[test]
    fn unsigned_carrier_preserves_width() {
        assert_eq!(BaseType::F32.unsigned_carrier(), BaseType::U32);
        assert_eq!(BaseType::I16.unsigned_carrier(), BaseType::U16);
        assert_eq!(BaseType::U8.unsigned_carrier(), BaseType::U8);
    }

    #[test]
    fn array_of_sets_dimensions() {
        let t = TypeInfo::array_of(BaseType::U16, vec![4, 2]);
        assert!(t.is_array);
        assert_eq!(t.array_dimensions, Some(vec![4, 2]));
    }
}
