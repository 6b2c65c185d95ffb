//! Unary operator emission.

use crate::ast::{Expr, IntSuffix, UnaryOp};
use crate::config::CodegenConfig;
use crate::error::CodeGenError;
use crate::state::GenerationState;
use crate::symbols::SymbolTable;

/// `-2147483648` doesn't fit in a 32-bit signed int as a positive literal
/// negated; MISRA-conscious C spells it as the named `<limits.h>` minimum,
/// explicitly cast to its target width rather than left to whatever type
/// the bare macro expands to. (`-9223372036854775808`, the 64-bit
/// equivalent, can't even be written as a negated positive `i64` literal,
/// since its magnitude overflows `i64`, so it arrives here as a bare
/// `IntLiteral(i64::MIN, ..)`, not a `Unary(Neg, ..)`, and is handled in
/// [`super::literal::emit_int_literal`] instead.)
const INT32_MIN_MAGNITUDE: i64 = 2_147_483_648;

pub fn emit_unary(
    op: UnaryOp,
    operand: &Expr,
    state: &mut GenerationState,
    symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<String, CodeGenError> {
    if op == UnaryOp::Neg {
        if let Expr::IntLiteral(value, suffix) = operand {
            if *value == INT32_MIN_MAGNITUDE && !matches!(suffix, IntSuffix::I64 | IntSuffix::U64) {
                state.needs_limits = true;
                return Ok("(int32_t)INT32_MIN".to_string());
            }
        }
    }

    let operand_text = super::emit_expr(operand, state, symbols, config)?;
    Ok(match op {
        UnaryOp::Not => format!("(!{operand_text})"),
        UnaryOp::Neg => format!("(-{operand_text})"),
        UnaryOp::BitNot => format!("(~{operand_text})"),
        UnaryOp::AddrOf => format!("(&{operand_text})"),
    })
}
