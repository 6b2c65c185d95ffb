//! Handlers for bit-level access on plain integers and struct/array chains
//! that carry no register or bitmap typing of their own — a single `[bit]`
//! index or a `[start, width]` slice applied directly to an integer target.

use crate::classify::AssignmentKind;
use crate::config::CodegenConfig;
use crate::context::AssignmentContext;
use crate::error::{CodeGenError, HandlerError};
use crate::handlers::HandlerFn;
use crate::state::GenerationState;
use crate::symbols::SymbolTable;
use crate::types::BaseType;
use crate::{bitutils, expr};

pub fn entries() -> Vec<(AssignmentKind, HandlerFn)> {
    vec![
        (AssignmentKind::IntegerBit, handle_single_bit as HandlerFn),
        (AssignmentKind::ThisBit, handle_single_bit as HandlerFn),
        (AssignmentKind::StructMemberBit, handle_single_bit as HandlerFn),
        (AssignmentKind::ArrayElementBit, handle_single_bit as HandlerFn),
        (AssignmentKind::IntegerBitRange, handle_range as HandlerFn),
        (AssignmentKind::ThisBitRange, handle_range as HandlerFn),
        (AssignmentKind::StructChainBitRange, handle_range as HandlerFn),
    ]
}

fn base_type(ctx: &AssignmentContext) -> BaseType {
    ctx.first_id_type_info
        .as_ref()
        .map(|t| t.base_type)
        .unwrap_or(BaseType::U32)
}

/// For a float-typed target, reject bit access outside a function body and
/// otherwise ensure its union shadow is declared and current, returning the
/// text the RMW should operate on (the shadow's `.u` half) in place of the
/// float variable itself, plus the copy-in/copy-out statements to wrap the
/// RMW with.
fn float_shadow_wrap(
    ctx: &AssignmentContext,
    state: &mut GenerationState,
) -> Result<Option<(String, Option<String>, String)>, CodeGenError> {
    if !base_type(ctx).is_float() {
        return Ok(None);
    }
    if !state.in_function_body() {
        return Err(HandlerError::FloatBitAtGlobalScope { line: ctx.line }.into());
    }
    let is64 = base_type(ctx).is_64bit();
    let (shadow, copy_in) = bitutils::ensure_float_shadow(&ctx.resolved_target, is64, state);
    let writeback = bitutils::float_shadow_writeback(&ctx.resolved_target);
    Ok(Some((format!("{shadow}.u"), copy_in, writeback)))
}

fn handle_single_bit(
    ctx: &AssignmentContext,
    state: &mut GenerationState,
    symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<String, CodeGenError> {
    if ctx.is_compound {
        return Err(HandlerError::CompoundOnBitField { line: ctx.line }.into());
    }
    let bit = ctx
        .subscripts
        .last()
        .ok_or_else(|| HandlerError::Internal("bit index missing from context".to_string()))?;
    let bit_text = expr::emit_expr(bit, state, symbols, config)?;
    let is64 = base_type(ctx).is_64bit();
    let shadow = float_shadow_wrap(ctx, state)?;
    let carrier = shadow.as_ref().map(|(u, ..)| u.as_str()).unwrap_or(&ctx.resolved_target);
    let rmw = bitutils::single_bit_rmw(carrier, &bit_text, &ctx.generated_value, is64);
    Ok(match shadow {
        Some((_, copy_in, writeback)) => {
            let prefix = copy_in.map(|c| format!("{c} ")).unwrap_or_default();
            format!("{prefix}{rmw} {writeback}")
        }
        None => rmw,
    })
}

fn handle_range(
    ctx: &AssignmentContext,
    state: &mut GenerationState,
    symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<String, CodeGenError> {
    if ctx.is_compound {
        return Err(HandlerError::CompoundOnBitField { line: ctx.line }.into());
    }
    if ctx.subscripts.len() < 2 {
        return Err(HandlerError::Internal("bit range missing start/width".to_string()).into());
    }
    let n = ctx.subscripts.len();
    let start = &ctx.subscripts[n - 2];
    let width_expr = &ctx.subscripts[n - 1];

    // Unlike an `ARRAY_SLICE` length, a bit-range width has no buffer to
    // overrun, so a runtime-valued width is legal here; bounds are only
    // checked when both ends happen to fold to constants.
    let width_const = crate::expr::fold::fold_const_i64(width_expr);
    let start_const = crate::expr::fold::fold_const_i64(start);
    let bt = base_type(ctx);
    let max = bt.bit_width();
    if let (Some(s), Some(w)) = (start_const, width_const) {
        if s < 0 || w < 0 || s + w > i64::from(max) {
            return Err(HandlerError::SliceOutOfBounds {
                line: ctx.line,
                start: s,
                width: w,
                max,
            }
            .into());
        }
    }
    let start_text = expr::emit_expr(start, state, symbols, config)?;
    let shadow = float_shadow_wrap(ctx, state)?;
    let carrier = shadow.as_ref().map(|(u, ..)| u.as_str()).unwrap_or(&ctx.resolved_target);
    let rmw = match width_const {
        Some(w) => bitutils::bit_range_rmw(carrier, &start_text, w as u32, &ctx.generated_value, bt.is_64bit()),
        None => {
            let width_text = expr::emit_expr(width_expr, state, symbols, config)?;
            bitutils::bit_range_rmw_expr(carrier, &start_text, &width_text, &ctx.generated_value, bt.is_64bit())
        }
    };
    Ok(match shadow {
        Some((_, copy_in, writeback)) => {
            let prefix = copy_in.map(|c| format!("{c} ")).unwrap_or_default();
            format!("{prefix}{rmw} {writeback}")
        }
        None => rmw,
    })
}
