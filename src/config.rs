//! Compiler configuration.
//!
//! Mirrors the builder shape used elsewhere in the toolchain for
//! compiler-wide extensibility knobs: a small `Default`-able struct with
//! `.with_*()` setters, validated at construction so a bad value fails loud
//! and early rather than silently corrupting emitted output.

use serde::{Deserialize, Serialize};

use crate::target::TargetCapabilities;

/// Validate that a string is safe to splice verbatim into generated C
/// identifiers. Mirrors the LLVM-symbol validation used for external
/// builtins elsewhere in this toolchain: alphanumeric and underscore only,
/// which prevents a configured prefix from injecting arbitrary C tokens
/// (stray semicolons, comment terminators, preprocessor directives) into
/// the output stream.
fn validate_identifier_fragment(s: &str) -> Result<(), String> {
    if s.is_empty() {
        return Err("identifier fragment cannot be empty".to_string());
    }
    for c in s.chars() {
        if !c.is_alphanumeric() && c != '_' {
            return Err(format!(
                "invalid character '{c}' in '{s}': identifier fragments may only contain \
                 alphanumeric characters and underscores"
            ));
        }
    }
    if s.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return Err(format!("'{s}' cannot start with a digit"));
    }
    Ok(())
}

/// Compiler-wide configuration for this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Emit C++ (`Enum::Value`, `->`/`.`, `static_cast<T>`) instead of plain
    /// C (`Enum_Value`, `->`/`.`, C-style casts).
    pub cpp_mode: bool,
    pub target: TargetCapabilities,
    /// Insert MISRA-C:2012 Rule 10.3 narrowing casts and `U`/`ULL` literal
    /// suffixes. Disabling this is only useful for snapshot-comparing the
    /// unadorned expansion against the MISRA one; production output always
    /// leaves it on.
    pub misra_casts: bool,
    /// Prefix for generated helper function names (`cnx_clamp_add_u8`,
    /// `cnx_safe_div_s32`, ...).
    helper_prefix: String,
}

impl CodegenConfig {
    /// Create a config with the default `"cnx"` helper prefix and MISRA
    /// casts enabled.
    pub fn new(target: TargetCapabilities) -> Self {
        CodegenConfig {
            cpp_mode: false,
            target,
            misra_casts: true,
            helper_prefix: "cnx".to_string(),
        }
    }

    pub fn with_cpp_mode(mut self, value: bool) -> Self {
        self.cpp_mode = value;
        self
    }

    pub fn with_misra_casts(mut self, value: bool) -> Self {
        self.misra_casts = value;
        self
    }

    /// Override the helper function prefix.
    ///
    /// # Panics
    ///
    /// Panics if `prefix` contains anything other than alphanumerics and
    /// underscores, or starts with a digit — such a value would otherwise
    /// be spliced directly into emitted C identifiers.
    pub fn with_helper_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        validate_identifier_fragment(&prefix).expect("invalid helper prefix");
        self.helper_prefix = prefix;
        self
    }

    pub fn helper_prefix(&self) -> &str {
        &self.helper_prefix
    }

    /// `cnx_clamp_add_u8`-shaped helper name.
    pub fn clamp_helper_name(&self, op: &str, base_type: &str) -> String {
        format!("{}_clamp_{op}_{base_type}", self.helper_prefix)
    }

    /// `cnx_safe_div_s32`-shaped helper name.
    pub fn safe_div_helper_name(&self, base_type: &str) -> String {
        format!("{}_safe_div_{base_type}", self.helper_prefix)
    }

    /// `cnx_safe_mod_s32`-shaped helper name.
    pub fn safe_mod_helper_name(&self, base_type: &str) -> String {
        format!("{}_safe_mod_{base_type}", self.helper_prefix)
    }

    pub fn member_separator(&self) -> &'static str {
        if self.cpp_mode { "::" } else { "_" }
    }
}

impl Default for CodegenConfig {
    fn default() -> Self {
        CodegenConfig::new(TargetCapabilities::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prefix_is_cnx() {
        let config = CodegenConfig::default();
        assert_eq!(config.helper_prefix(), "cnx");
        assert_eq!(config.clamp_helper_name("add", "u8"), "cnx_clamp_add_u8");
    }

    #[test]
    fn custom_prefix_is_honored() {
        let config = CodegenConfig::default().with_helper_prefix("acme");
        assert_eq!(config.safe_div_helper_name("s32"), "acme_safe_div_s32");
    }

    #[test]
    #[should_panic(expected = "invalid helper prefix")]
    fn rejects_prefix_with_injection_characters() {
        let _ = CodegenConfig::default().with_helper_prefix("cnx; system(\"rm -rf\")");
    }

    #[test]
    #[should_panic(expected = "invalid helper prefix")]
    fn rejects_prefix_starting_with_digit() {
        let _ = CodegenConfig::default().with_helper_prefix("1cnx");
    }

    #[test]
    fn cpp_mode_changes_member_separator() {
        let config = CodegenConfig::default().with_cpp_mode(true);
        assert_eq!(config.member_separator(), "::");
    }

    #[test]
    fn round_trips_through_json() {
        let config = CodegenConfig::default().with_helper_prefix("acme").with_cpp_mode(true);
        let json = serde_json::to_string(&config).unwrap();
        let back: CodegenConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.helper_prefix(), "acme");
        assert!(back.cpp_mode);
    }
}
