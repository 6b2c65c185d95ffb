//! The `AtomicRmw` handler: a compound assignment to a target declared
//! `atomic`.
//!
//! Two lowerings are available, picked by [`crate::target::TargetCapabilities`]:
//! an ARMv7-M/v8-M exclusive-access load/store loop when the target has
//! `LDREX`/`STREX`, otherwise a priority-masking (or, lacking `BASEPRI`,
//! global-interrupt-disable) critical section around a plain compound
//! statement. Both lowerings route through CMSIS intrinsics rather than
//! inline assembly, so both mark `needs_cmsis`.

use crate::classify::AssignmentKind;
use crate::config::CodegenConfig;
use crate::context::AssignmentContext;
use crate::error::CodeGenError;
use crate::handlers::HandlerFn;
use crate::state::GenerationState;
use crate::symbols::SymbolTable;
use crate::types::BaseType;

pub fn entries() -> Vec<(AssignmentKind, HandlerFn)> {
    vec![(AssignmentKind::AtomicRmw, handle as HandlerFn)]
}

/// `__LDREXW`/`__STREXW`-family suffix matching the target's bit width.
/// 64-bit atomics have no exclusive-access doubleword instruction on
/// ARMv7-M, so they always fall through to the critical-section lowering
/// regardless of `has_ldrex_strex`.
fn ldrex_suffix(base_type: BaseType) -> Option<&'static str> {
    match base_type.bit_width() {
        8 => Some("B"),
        16 => Some("H"),
        32 => Some("W"),
        _ => None,
    }
}

fn handle(
    ctx: &AssignmentContext,
    state: &mut GenerationState,
    _symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<String, CodeGenError> {
    let base_type = ctx
        .first_id_type_info
        .as_ref()
        .map(|t| t.base_type)
        .unwrap_or(BaseType::U32);

    state.needs_cmsis = true;
    state.needs_stdint = true;

    let suffix = config.target.has_ldrex_strex.then(|| ldrex_suffix(base_type)).flatten();

    if let Some(suffix) = suffix {
        let tmp = state.fresh_temp("atomic");
        return Ok(format!(
            "{{\n    \
                 {ty} {tmp};\n    \
                 do {{\n        \
                     {tmp} = __LDREX{suffix}((volatile {ty} *)&{target});\n        \
                     {tmp} {op} {value};\n    \
                 }} while (__STREX{suffix}({tmp}, (volatile {ty} *)&{target}) != 0U);\n\
             }}",
            ty = base_type.c_name(),
            tmp = tmp,
            suffix = suffix,
            target = ctx.resolved_target,
            op = ctx.c_op,
            value = ctx.generated_value,
        ));
    }

    state.needs_isr_guard = true;
    if config.target.has_basepri {
        let saved = state.fresh_temp("basepri");
        Ok(format!(
            "{{\n    \
                 uint32_t {saved} = __get_BASEPRI();\n    \
                 __set_BASEPRI(CNX_ATOMIC_PRIORITY);\n    \
                 {target} {op} {value};\n    \
                 __set_BASEPRI({saved});\n\
             }}",
            saved = saved,
            target = ctx.resolved_target,
            op = ctx.c_op,
            value = ctx.generated_value,
        ))
    } else {
        let saved = state.fresh_temp("primask");
        Ok(format!(
            "{{\n    \
                 uint32_t {saved} = __get_PRIMASK();\n    \
                 __disable_irq();\n    \
                 {target} {op} {value};\n    \
                 __set_PRIMASK({saved});\n\
             }}",
            saved = saved,
            target = ctx.resolved_target,
            op = ctx.c_op,
            value = ctx.generated_value,
        ))
    }
}
