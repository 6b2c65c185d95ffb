//! Handlers for fixed-capacity string buffer assignment.

use crate::classify::AssignmentKind;
use crate::config::CodegenConfig;
use crate::context::AssignmentContext;
use crate::error::{CodeGenError, HandlerError};
use crate::handlers::HandlerFn;
use crate::state::GenerationState;
use crate::strutils;
use crate::symbols::SymbolTable;

pub fn entries() -> Vec<(AssignmentKind, HandlerFn)> {
    vec![
        (AssignmentKind::StringSimple, handle as HandlerFn),
        (AssignmentKind::StringThisMember, handle as HandlerFn),
        (AssignmentKind::StringGlobal, handle as HandlerFn),
        (AssignmentKind::StringStructField, handle as HandlerFn),
        (AssignmentKind::StringArrayElement, handle as HandlerFn),
        (AssignmentKind::StringStructArrayElement, handle as HandlerFn),
    ]
}

/// A struct-parameter field's capacity, for the `param.field <- "literal"`
/// shape that `first_id_type_info` can't see (it only ever resolves the
/// bare base identifier's own type, not a parameter's member).
fn struct_param_field_capacity(ctx: &AssignmentContext, state: &GenerationState, symbols: &SymbolTable) -> Option<u32> {
    let base = ctx.identifiers.first()?;
    let field = ctx.identifiers.get(1)?;
    let param = state.current_parameters.get(base)?;
    symbols.struct_field_string_capacity(&param.base_type_name, field)
}

fn handle(
    ctx: &AssignmentContext,
    state: &mut GenerationState,
    symbols: &SymbolTable,
    _config: &CodegenConfig,
) -> Result<String, CodeGenError> {
    if ctx.is_compound {
        return Err(HandlerError::CompoundOnBitField { line: ctx.line }.into());
    }
    let capacity = match ctx.first_id_type_info.as_ref().and_then(|t| t.string_capacity) {
        Some(capacity) => capacity,
        None => struct_param_field_capacity(ctx, state, symbols).ok_or_else(|| {
            let base = ctx.identifiers.first().cloned().unwrap_or_default();
            let field = ctx.identifiers.get(1).cloned().unwrap_or_default();
            let struct_name = state
                .current_parameters
                .get(&base)
                .map(|p| p.base_type_name.clone())
                .unwrap_or(base);
            HandlerError::UnknownStructField {
                line: ctx.line,
                struct_name,
                field,
            }
        })?,
    };
    state.needs_string = true;
    Ok(strutils::bounded_string_copy(&ctx.resolved_target, &ctx.generated_value, capacity))
}
