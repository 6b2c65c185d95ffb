//! Literal emission: picking the MISRA-correct `U`/`ULL`/`f` suffix.

use crate::ast::{FloatSuffix, IntSuffix};
use crate::config::CodegenConfig;
use crate::state::GenerationState;
use crate::types::BaseType;

fn misra_suffix_for(base: BaseType, config: &CodegenConfig) -> &'static str {
    if !config.misra_casts {
        return "";
    }
    match base {
        BaseType::U8 | BaseType::U16 | BaseType::U32 => "U",
        BaseType::U64 => "ULL",
        BaseType::I64 => "LL",
        BaseType::I8 | BaseType::I16 | BaseType::I32 | BaseType::Bool => "",
        // An integer-literal AST node never carries a decimal point, so a
        // trailing `f` here would be an invalid suffix on an integer
        // constant; the float cast this literal needs is applied at the
        // assignment site instead (see `handlers::simple`).
        BaseType::F32 | BaseType::F64 => "",
    }
}

fn suffix_from_source(suffix: IntSuffix) -> Option<&'static str> {
    match suffix {
        IntSuffix::None => None,
        IntSuffix::U8 | IntSuffix::U16 | IntSuffix::U32 => Some("U"),
        IntSuffix::U64 => Some("ULL"),
        IntSuffix::I8 | IntSuffix::I16 | IntSuffix::I32 => Some(""),
        IntSuffix::I64 => Some("LL"),
    }
}

/// Emit an integer literal, suffixed either from an explicit source suffix
/// or (when absent) from the expected type currently in scope on
/// [`GenerationState`] — the same mechanism the MISRA Rule 10.3 narrowing
/// cast insertion relies on for its target width.
///
/// `i64::MIN` gets its own case: its magnitude overflows `i64`, so it can
/// never arrive here as a negated positive literal the way `INT32_MIN` does
/// in [`super::unary::emit_unary`]; it arrives as the literal value itself.
pub fn emit_int_literal(
    value: i64,
    suffix: IntSuffix,
    state: &mut GenerationState,
    config: &CodegenConfig,
) -> String {
    if value == i64::MIN {
        state.needs_limits = true;
        return "(int64_t)INT64_MIN".to_string();
    }

    let tag = suffix_from_source(suffix).map(str::to_string).unwrap_or_else(|| {
        state
            .expected_type()
            .map(|t| misra_suffix_for(t, config).to_string())
            .unwrap_or_default()
    });

    if value < 0 {
        // A negative literal is only ever emitted in a signed context; the
        // sign itself never takes a `U`/`ULL` suffix.
        format!("{value}")
    } else {
        format!("{value}{tag}")
    }
}

pub fn emit_float_literal(value: f64, suffix: FloatSuffix) -> String {
    match suffix {
        FloatSuffix::F32 => format!("{value}f"),
        FloatSuffix::F64 => format!("{value}"),
    }
}

pub fn emit_bool_literal(value: bool) -> String {
    if value { "true".to_string() } else { "false".to_string() }
}

/// Emit a C string literal, escaping the characters MISRA/C90 care about.
pub fn emit_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_suffix_wins_over_expected_type() {
        let mut state = GenerationState::new();
        let config = CodegenConfig::default();
        state.with_expected_type(Some(BaseType::I32), |s| {
            assert_eq!(emit_int_literal(5, IntSuffix::U32, s, &config), "5U");
        });
    }

    #[test]
    fn expected_type_supplies_misra_suffix() {
        let mut state = GenerationState::new();
        let config = CodegenConfig::default();
        state.with_expected_type(Some(BaseType::U64), |s| {
            assert_eq!(emit_int_literal(1, IntSuffix::None, s, &config), "1ULL");
        });
    }

    #[test]
    fn negative_literal_never_gets_unsigned_suffix() {
        let mut state = GenerationState::new();
        let config = CodegenConfig::default();
        assert_eq!(emit_int_literal(-1, IntSuffix::None, &mut state, &config), "-1");
    }

    #[test]
    fn int64_min_uses_named_constant_with_cast() {
        let mut state = GenerationState::new();
        let config = CodegenConfig::default();
        assert_eq!(emit_int_literal(i64::MIN, IntSuffix::I64, &mut state, &config), "(int64_t)INT64_MIN");
        assert!(state.needs_limits);
    }

    #[test]
    fn misra_casts_disabled_drops_suffix() {
        let mut state = GenerationState::new();
        let config = CodegenConfig::default().with_misra_casts(false);
        state.with_expected_type(Some(BaseType::U32), |s| {
            assert_eq!(emit_int_literal(5, IntSuffix::None, s, &config), "5");
        });
    }

    #[test]
    fn string_literal_escapes_quotes_and_backslashes() {
        assert_eq!(emit_string_literal("a\"b\\c"), "\"a\\\"b\\\\c\"");
    }
}
