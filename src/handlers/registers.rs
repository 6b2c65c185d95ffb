//! Handlers for bit and bit-range access on hardware register members,
//! reached either directly or through a scope (`this`/`global`).
//!
//! A register member additionally carries a [`RegisterAccess`] mode: a
//! write-only member can never be safely read back for a read-modify-write,
//! so a bit or range write against one either collapses to the MMIO direct
//! write fast path (the whole member, byte-aligned) or is rejected.

use crate::classify::AssignmentKind;
use crate::config::CodegenConfig;
use crate::context::AssignmentContext;
use crate::error::{CodeGenError, HandlerError};
use crate::handlers::HandlerFn;
use crate::regutils;
use crate::state::GenerationState;
use crate::symbols::{RegisterAccess, SymbolTable};
use crate::types::BaseType;
use crate::{bitutils, expr};

pub fn entries() -> Vec<(AssignmentKind, HandlerFn)> {
    vec![
        (AssignmentKind::RegisterBit, handle_bit as HandlerFn),
        (AssignmentKind::ScopedRegisterBit, handle_bit as HandlerFn),
        (AssignmentKind::RegisterBitRange, handle_range as HandlerFn),
        (AssignmentKind::ScopedRegisterBitRange, handle_range as HandlerFn),
        (AssignmentKind::GlobalRegisterBit, handle_range as HandlerFn),
    ]
}

fn base_type(ctx: &AssignmentContext) -> BaseType {
    ctx.first_id_type_info
        .as_ref()
        .map(|t| t.base_type)
        .unwrap_or(BaseType::U32)
}

fn access_of(ctx: &AssignmentContext, symbols: &SymbolTable) -> RegisterAccess {
    symbols
        .register_access(&ctx.resolved_base_identifier)
        .unwrap_or(RegisterAccess::ReadWrite)
}

fn handle_bit(
    ctx: &AssignmentContext,
    state: &mut GenerationState,
    symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<String, CodeGenError> {
    if ctx.is_compound {
        return Err(HandlerError::CompoundOnBitField { line: ctx.line }.into());
    }
    let access = access_of(ctx, symbols);
    let bit = ctx
        .subscripts
        .last()
        .ok_or_else(|| HandlerError::Internal("register bit index missing".to_string()))?;
    let bit_text = expr::emit_expr(bit, state, symbols, config)?;
    if access.is_write_only() {
        // Writing old state back never applies here; the old value can't be
        // read. Clearing the bit (`0`/`false`) is meaningless on a register
        // that only sets/acknowledges bits it's told to, so that's rejected;
        // any other value is the one-sided set write.
        if crate::expr::fold::fold_const_i64(&ctx.value_expr) == Some(0) {
            return Err(HandlerError::WriteOnlyClear {
                line: ctx.line,
                member: ctx.resolved_base_identifier.clone(),
            }
            .into());
        }
        let one = bitutils::one_literal(base_type(ctx).is_64bit());
        return Ok(format!("{} = ({one} << {bit_text});", ctx.resolved_target));
    }
    Ok(bitutils::single_bit_rmw(
        &ctx.resolved_target,
        &bit_text,
        &ctx.generated_value,
        base_type(ctx).is_64bit(),
    ))
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
        return Err(HandlerError::Internal("register bit range missing start/width".to_string()).into());
    }
    let n = ctx.subscripts.len();
    let start = &ctx.subscripts[n - 2];
    let width_expr = &ctx.subscripts[n - 1];
    // The MMIO fast path needs a compile-time-constant start/width to pick
    // an address and access width; the general masked RMW fallback below
    // does not, so a runtime width only rules out the fast path, not the
    // write itself.
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
    let access = access_of(ctx, symbols);

    if access.is_write_only() {
        if let (Some(s), Some(w)) = (start_const, width_const) {
            if let (Ok(bit_offset), Some(base)) = (
                u32::try_from(s),
                symbols.register_base_addresses.get(&ctx.resolved_base_identifier).copied(),
            ) {
                let offset = symbols
                    .register_member_offsets
                    .get(&ctx.resolved_base_identifier)
                    .copied()
                    .unwrap_or(0);
                if let Some(stmt) =
                    regutils::mmio_fast_path(base, offset, bit_offset, w as u32, access, &ctx.generated_value)
                {
                    return Ok(stmt);
                }
            }
        }
        // Not byte-aligned/byte-wide (or the base address/width isn't known
        // at generation time): the old contents can't be read back, but
        // there's nothing to preserve in a plain masked-shift write either,
        // since the untouched bits outside `mask << start` are left as zero
        // in the written word.
        let start_text = expr::emit_expr(start, state, symbols, config)?;
        let mask = match width_const {
            Some(w) => bitutils::width_mask(w as u32, bt.is_64bit()),
            None => {
                let width_text = expr::emit_expr(width_expr, state, symbols, config)?;
                bitutils::width_mask_expr(&width_text, bt.is_64bit())
            }
        };
        return Ok(format!(
            "{} = (({} & {mask}) << ({start_text}));",
            ctx.resolved_target, ctx.generated_value
        ));
    }

    let start_text = expr::emit_expr(start, state, symbols, config)?;
    Ok(match width_const {
        Some(w) => bitutils::bit_range_rmw(&ctx.resolved_target, &start_text, w as u32, &ctx.generated_value, bt.is_64bit()),
        None => {
            let width_text = expr::emit_expr(width_expr, state, symbols, config)?;
            bitutils::bit_range_rmw_expr(&ctx.resolved_target, &start_text, &width_text, &ctx.generated_value, bt.is_64bit())
        }
    })
}
