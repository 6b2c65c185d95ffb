//! The `OverflowClamp` handler: a compound assignment to a target declared
//! saturating, lowered to a call to a generated `cnx_clamp_<op>_<type>`
//! helper (materialized later, in [`crate::effects`]) rather than the raw
//! operator.
//!
//! A float target has no integer overflow to clamp against, so it keeps the
//! native compound operator. Division and modulo have no clamp helper
//! either — overflow isn't a thing for `/=`/`%=` — so they also fall
//! through to the native compound form.

use crate::classify::AssignmentKind;
use crate::config::CodegenConfig;
use crate::context::AssignmentContext;
use crate::error::CodeGenError;
use crate::handlers::HandlerFn;
use crate::state::GenerationState;
use crate::symbols::SymbolTable;
use crate::types::BaseType;

pub fn entries() -> Vec<(AssignmentKind, HandlerFn)> {
    vec![(AssignmentKind::OverflowClamp, handle as HandlerFn)]
}

/// Map a compound op's base arithmetic symbol to the clamp-helper suffix
/// it corresponds to, when one exists.
fn clamp_op_name(base_op: &str) -> Option<&'static str> {
    match base_op {
        "+" => Some("add"),
        "-" => Some("sub"),
        "*" => Some("mul"),
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

    let op_name = ctx.op.base_op().and_then(clamp_op_name);

    if base_type.is_float() || op_name.is_none() {
        return Ok(format!("{} {} {};", ctx.resolved_target, ctx.c_op, ctx.generated_value));
    }

    let op_name = op_name.unwrap();
    let type_name = base_type.short_name();
    state.used_clamp_ops.insert(format!("{op_name}_{type_name}"));
    let helper_name = config.clamp_helper_name(op_name, type_name);

    Ok(format!(
        "{target} = {helper}({target}, {value});",
        target = ctx.resolved_target,
        helper = helper_name,
        value = ctx.generated_value,
    ))
}
