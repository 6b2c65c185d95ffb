//! Bit-level read-modify-write expression construction shared by the
//! register, bitmap, and plain-integer bit handlers.

use crate::state::GenerationState;
use crate::types::BaseType;

/// `1U` or `1ULL`, matching the carrier width.
pub fn one_literal(is64: bool) -> &'static str {
    if is64 { "1ULL" } else { "1U" }
}

/// `((1U << width) - 1U)`, the mask for a `width`-bit field starting at bit
/// 0. Callers shift it left by the field's offset themselves so the same
/// mask text can be reused across a family of same-width fields at
/// different offsets.
pub fn width_mask(width: u32, is64: bool) -> String {
    let one = one_literal(is64);
    if width >= if is64 { 64 } else { 32 } {
        // A mask covering the whole carrier: `(1U << 32)` would overflow,
        // so express it directly.
        if is64 {
            "0xFFFFFFFFFFFFFFFFULL".to_string()
        } else {
            "0xFFFFFFFFU".to_string()
        }
    } else {
        format!("(({one} << {width}) - {one})")
    }
}

/// `(mask << offset)`, the mask positioned at `offset`.
pub fn positioned_mask(width: u32, offset: u32, is64: bool) -> String {
    if offset == 0 {
        width_mask(width, is64)
    } else {
        format!("({} << {offset})", width_mask(width, is64))
    }
}

/// Single-bit set/clear via read-modify-write:
/// `target = (target & ~(1U << bit)) | ((value & 1U) << bit);`
/// `value01` must already be an expression evaluating to 0 or 1.
pub fn single_bit_rmw(target: &str, bit_expr: &str, value01: &str, is64: bool) -> String {
    let one = one_literal(is64);
    format!(
        "{target} = (({target} & ~({one} << ({bit_expr}))) | ((({value01}) & {one}) << ({bit_expr})));"
    )
}

/// Multi-bit range set via read-modify-write, clearing the target bits
/// before or-ing in the shifted, masked value:
/// `target = (target & ~(mask << start)) | ((value & mask) << start);`
pub fn bit_range_rmw(target: &str, start_expr: &str, width: u32, value_expr: &str, is64: bool) -> String {
    let mask = width_mask(width, is64);
    format!(
        "{target} = (({target} & ~({mask} << ({start_expr}))) | \
         (({value_expr} & {mask}) << ({start_expr})));"
    )
}

/// [`width_mask`]'s counterpart for a width that isn't known until
/// generation time (a runtime-valued `n` in `x[start, n]`), so there's no
/// constant to special-case the full-carrier mask for; the general
/// `(1 << width) - 1` form is used unconditionally.
pub fn width_mask_expr(width_expr: &str, is64: bool) -> String {
    let one = one_literal(is64);
    format!("(({one} << ({width_expr})) - {one})")
}

/// [`bit_range_rmw`]'s counterpart for a runtime-valued width expression.
pub fn bit_range_rmw_expr(target: &str, start_expr: &str, width_expr: &str, value_expr: &str, is64: bool) -> String {
    let mask = width_mask_expr(width_expr, is64);
    format!(
        "{target} = (({target} & ~({mask} << ({start_expr}))) | \
         (({value_expr} & {mask}) << ({start_expr})));"
    )
}

/// Extract a bit range for reading: `((source >> start) & mask)`.
pub fn bit_range_read(source: &str, start_expr: &str, width: u32, is64: bool) -> String {
    format!("(({source} >> ({start_expr})) & {})", width_mask(width, is64))
}

/// Extract a single bit for reading: `((source >> bit) & 1U)`.
pub fn single_bit_read(source: &str, bit_expr: &str, is64: bool) -> String {
    format!("(({source} >> ({bit_expr})) & {})", one_literal(is64))
}

/// MISRA Rule 10.3-compliant narrowing cast for a value assigned into a
/// narrower target type, e.g. `(uint8_t)(expr)`.
pub fn narrowing_cast(target_type: BaseType, expr: &str) -> String {
    format!("({})({expr})", target_type.c_name())
}

/// A C identifier safe to splice into a shadow variable's name, even when
/// `name` is itself a resolved lvalue chain (`frame.count`, `buf[3]`) rather
/// than a bare identifier.
fn sanitize_for_shadow_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// The shadow union's variable name for a given float lvalue, e.g.
/// `__bits_speed` for `speed`.
pub fn float_shadow_name(name: &str) -> String {
    format!("__bits_{}", sanitize_for_shadow_name(name))
}

/// The once-per-function union declaration backing a float's bit access:
/// `union { float f; uint32_t u; } __bits_speed;` (or `double`/`uint64_t`
/// for an `f64`).
pub fn float_shadow_decl(name: &str, is64: bool) -> String {
    let shadow = float_shadow_name(name);
    if is64 {
        format!("union {{ double f; uint64_t u; }} {shadow};")
    } else {
        format!("union {{ float f; uint32_t u; }} {shadow};")
    }
}

/// Ensures a float-bit shadow union for `name` is hoisted to the enclosing
/// function's temp declarations (once) and its `.f` half reflects `name`'s
/// current value (once per write since the last copy). Returns the shadow
/// variable's name and, when the copy-in is newly needed, the
/// `__bits_name.f = name;` statement to emit ahead of the bit operation.
///
/// Caller is responsible for rejecting this at global scope first (§7's
/// `FloatBitAtGlobalScope`) — this helper assumes it's already inside a
/// function body.
pub fn ensure_float_shadow(name: &str, is64: bool, state: &mut GenerationState) -> (String, Option<String>) {
    let shadow = float_shadow_name(name);
    if state.float_bit_shadows.insert(name.to_string()) {
        state.pending_temp_declarations.push(float_shadow_decl(name, is64));
        state.needs_float_static_assert = true;
    }
    let copy_in = if state.float_shadow_current.insert(name.to_string()) {
        Some(format!("{shadow}.f = {name};"))
    } else {
        None
    };
    (shadow, copy_in)
}

/// The float itself must be written back from the shadow's `.f` half for a
/// bit mutation performed on `.u` to take effect; the shadow stays current
/// afterward since `.f` was just made to match `name` again.
pub fn float_shadow_writeback(name: &str) -> String {
    format!("{name} = {}.f;", float_shadow_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_mask_handles_full_width() {
        assert_eq!(width_mask(32, false), "0xFFFFFFFFU");
        assert_eq!(width_mask(64, true), "0xFFFFFFFFFFFFFFFFULL");
    }

    #[test]
    fn width_mask_partial() {
        assert_eq!(width_mask(4, false), "((1U << 4) - 1U)");
    }

    #[test]
    fn width_mask_expr_uses_runtime_width() {
        assert_eq!(width_mask_expr("n", false), "((1U << (n)) - 1U)");
        assert_eq!(width_mask_expr("n", true), "((1ULL << (n)) - 1ULL)");
    }

    #[test]
    fn bit_range_rmw_expr_shape() {
        let s = bit_range_rmw_expr("flags", "i", "n", "v", false);
        assert!(s.contains("flags & ~(((1U << (n)) - 1U) << (i))"));
        assert!(s.contains("(v & ((1U << (n)) - 1U)) << (i)"));
    }

    #[test]
    fn single_bit_rmw_shape() {
        let s = single_bit_rmw("reg->ODR", "5", "v", false);
        assert!(s.contains("reg->ODR & ~(1U << (5))"));
        assert!(s.contains("((v) & 1U) << (5)"));
    }

    #[test]
    fn bit_range_read_shape() {
        let s = bit_range_read("flags", "2", 3, false);
        assert_eq!(s, "((flags >> (2)) & ((1U << 3) - 1U))");
    }

    #[test]
    fn float_shadow_name_is_sanitized() {
        assert_eq!(float_shadow_name("speed"), "__bits_speed");
        assert_eq!(float_shadow_name("frame.x"), "__bits_frame_x");
    }

    #[test]
    fn float_shadow_decl_picks_width() {
        assert_eq!(
            float_shadow_decl("speed", false),
            "union { float f; uint32_t u; } __bits_speed;"
        );
        assert_eq!(
            float_shadow_decl("accel", true),
            "union { double f; uint64_t u; } __bits_accel;"
        );
    }

    #[test]
    fn ensure_float_shadow_hoists_declaration_once_and_copies_in_once() {
        let mut state = GenerationState::new();
        let (shadow, copy_in) = ensure_float_shadow("speed", false, &mut state);
        assert_eq!(shadow, "__bits_speed");
        assert_eq!(copy_in, Some("__bits_speed.f = speed;".to_string()));
        assert_eq!(state.pending_temp_declarations.len(), 1);
        assert!(state.needs_float_static_assert);

        let (_, second_copy_in) = ensure_float_shadow("speed", false, &mut state);
        assert_eq!(second_copy_in, None);
        assert_eq!(
            state.pending_temp_declarations.len(),
            1,
            "the union declaration is only hoisted once per function"
        );
    }

    #[test]
    fn float_shadow_writeback_shape() {
        assert_eq!(float_shadow_writeback("speed"), "speed = __bits_speed.f;");
    }
}
