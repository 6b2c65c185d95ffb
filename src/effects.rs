//! Materializing accumulated include/helper-usage flags into the output
//! epilogue.
//!
//! Handlers only ever set a flag or insert into a used-ops set on
//! [`GenerationState`] as they go; nothing about `#include` ordering or
//! helper function bodies is decided until the whole statement list for a
//! translation unit has been emitted. This module is where that
//! accumulated usage becomes text, analogous to how a linker resolves
//! symbol usage into the final set of sections it emits.

use crate::config::CodegenConfig;
use crate::state::GenerationState;
use crate::types::BaseType;

/// Render the `#include` block implied by everything touched so far, in a
/// fixed, deterministic order (not insertion order, which would make
/// output depend on statement traversal order).
pub fn render_includes(state: &GenerationState) -> String {
    let mut lines = Vec::new();
    if state.needs_stdint {
        lines.push("#include <stdint.h>".to_string());
    }
    if state.needs_stdbool {
        lines.push("#include <stdbool.h>".to_string());
    }
    if state.needs_string {
        lines.push("#include <string.h>".to_string());
    }
    if state.needs_limits {
        lines.push("#include <limits.h>".to_string());
    }
    if state.needs_cmsis {
        lines.push("#include \"cmsis_compiler.h\"".to_string());
    }
    lines.join("\n")
}

/// Render the helper function definitions for every clamp/safe-div/safe-mod
/// operation actually used, plus the float-bit `_Static_assert` guard when
/// a float shadow was ever taken. Each helper is emitted once no matter how
/// many call sites used it, since `used_*_ops` is a set.
pub fn render_helpers(state: &GenerationState, config: &CodegenConfig) -> String {
    let mut out = String::new();

    if state.needs_float_static_assert {
        out.push_str(
            "_Static_assert(sizeof(float) == sizeof(uint32_t), \"float must be 32 bits\");\n",
        );
        out.push_str(
            "_Static_assert(sizeof(double) == sizeof(uint64_t), \"double must be 64 bits\");\n\n",
        );
    }

    let mut clamp_ops: Vec<&String> = state.used_clamp_ops.iter().collect();
    clamp_ops.sort();
    for key in clamp_ops {
        out.push_str(&render_clamp_helper(key, config));
        out.push('\n');
    }

    let mut div_ops: Vec<&String> = state.used_safe_div_ops.iter().collect();
    div_ops.sort();
    for base_type in div_ops {
        out.push_str(&render_safe_div_helper(base_type, config));
        out.push('\n');
    }

    let mut mod_ops: Vec<&String> = state.used_safe_mod_ops.iter().collect();
    mod_ops.sort();
    for base_type in mod_ops {
        out.push_str(&render_safe_mod_helper(base_type, config));
        out.push('\n');
    }

    out
}

/// `key` is `"<op>_<base_type>"`, e.g. `"add_u8"`, where `base_type` is
/// [`BaseType::short_name`]'s suffix — recovered back to the real
/// [`BaseType`] here so the emitted signature uses its `c_name()` spelling
/// (`uint8_t`) rather than the bare helper-naming suffix (`u8`).
fn render_clamp_helper(key: &str, config: &CodegenConfig) -> String {
    let (op, type_suffix) = key.split_once('_').unwrap_or((key, "u32"));
    let base_type = BaseType::from_short_name(type_suffix).unwrap_or(BaseType::U32);
    let ty = base_type.c_name();
    let name = config.clamp_helper_name(op, type_suffix);
    let (c_op, builtin) = match op {
        "add" => ("+", "__builtin_add_overflow"),
        "sub" => ("-", "__builtin_sub_overflow"),
        "mul" => ("*", "__builtin_mul_overflow"),
        other => (other, "__builtin_add_overflow"),
    };
    format!(
        "static inline {ty} {name}({ty} a, {ty} b) {{\n    \
             {ty} result;\n    \
             if ({builtin}(a, b, &result)) {{\n        \
                 return ({ty})-1 > 0 ? ({ty})0xFFFFFFFFU : ({ty})0x7FFFFFFF;\n    \
             }}\n    \
             return a {c_op} b;\n\
         }}\n",
        ty = ty,
        name = name,
        builtin = builtin,
        c_op = c_op,
    )
}

fn render_safe_div_helper(type_suffix: &str, config: &CodegenConfig) -> String {
    let base_type = BaseType::from_short_name(type_suffix).unwrap_or(BaseType::U32);
    let ty = base_type.c_name();
    let name = config.safe_div_helper_name(type_suffix);
    format!(
        "static inline void {name}({ty} *out, {ty} numerator, {ty} denominator) {{\n    \
             *out = (denominator != 0) ? (numerator / denominator) : 0;\n\
         }}\n"
    )
}

fn render_safe_mod_helper(type_suffix: &str, config: &CodegenConfig) -> String {
    let base_type = BaseType::from_short_name(type_suffix).unwrap_or(BaseType::U32);
    let ty = base_type.c_name();
    let name = config.safe_mod_helper_name(type_suffix);
    format!(
        "static inline void {name}({ty} *out, {ty} numerator, {ty} denominator) {{\n    \
             *out = (denominator != 0) ? (numerator % denominator) : 0;\n\
         }}\n"
    )
}
