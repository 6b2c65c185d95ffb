//! Binary operator emission, with precedence-aware parenthesization.

use crate::ast::{BinaryOp, Expr, IntSuffix};
use crate::config::CodegenConfig;
use crate::error::{CodeGenError, HandlerError};
use crate::expr::fold;
use crate::expr::literal;
use crate::state::GenerationState;
use crate::strutils;
use crate::symbols::SymbolTable;

/// A reference to a string buffer, recognized by the same shallow
/// criteria the rest of this core uses for a "simple" LHS: a literal, or a
/// bare identifier the local type registry already knows is a string. A
/// deeper chain (`this.name`, `frame.label`) isn't resolved here, matching
/// the simplification the argument emitter ([`super::calls`]) already
/// makes for pass-by-reference detection.
fn is_string_operand(expr: &Expr, state: &GenerationState) -> bool {
    match expr {
        Expr::StringLiteral(_) => true,
        Expr::Identifier(name) => state.type_registry.get(name).is_some_and(|t| t.is_string),
        _ => false,
    }
}

/// The enum type name of a bare identifier operand, when the local type
/// registry knows it as an enum-typed variable. Same shallow "only a plain
/// identifier" resolution `is_string_operand` above already settles for.
pub(crate) fn enum_type_of(expr: &Expr, state: &GenerationState) -> Option<String> {
    match expr {
        Expr::Identifier(name) => state
            .type_registry
            .get(name)
            .filter(|t| t.is_enum)
            .and_then(|t| t.enum_type_name.clone()),
        _ => None,
    }
}

/// A bare integer literal is always comparable against an enum (it's how
/// sentinel/flag comparisons against a raw constant are written); only two
/// *named* enum types that differ are rejected.
fn is_int_literal(expr: &Expr) -> bool {
    matches!(expr, Expr::IntLiteral(..))
}

fn check_enum_comparability(lhs: &Expr, rhs: &Expr, state: &GenerationState) -> Result<(), CodeGenError> {
    if is_int_literal(lhs) || is_int_literal(rhs) {
        return Ok(());
    }
    if let (Some(left), Some(right)) = (enum_type_of(lhs, state), enum_type_of(rhs, state)) {
        if left != right {
            return Err(HandlerError::EnumComparability { line: None, left, right }.into());
        }
    }
    Ok(())
}

/// Emit a binary expression's operand, parenthesizing it when its own
/// precedence could otherwise be misread against the parent operator (a
/// nested binary of strictly lower precedence, or an equal-precedence
/// nested binary on the right of a non-associative chain).
fn emit_operand(
    expr: &Expr,
    parent_prec: u8,
    is_right_operand: bool,
    state: &mut GenerationState,
    symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<String, CodeGenError> {
    let text = super::emit_expr(expr, state, symbols, config)?;
    let (_, ops) = expr.decompose();
    if !ops.is_empty() {
        return Ok(text);
    }
    match expr {
        Expr::Binary(child_op, ..) => {
            let child_prec = child_op.precedence();
            let needs_parens = child_prec < parent_prec || (child_prec == parent_prec && is_right_operand);
            if needs_parens {
                Ok(format!("({text})"))
            } else {
                Ok(text)
            }
        }
        _ => Ok(text),
    }
}

pub fn emit_binary(
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    state: &mut GenerationState,
    symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<String, CodeGenError> {
    if matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
        if is_string_operand(lhs, state) || is_string_operand(rhs, state) {
            state.needs_string = true;
            let lhs_text = super::emit_expr(lhs, state, symbols, config)?;
            let rhs_text = super::emit_expr(rhs, state, symbols, config)?;
            return Ok(strutils::string_compare(&lhs_text, &rhs_text, op == BinaryOp::Ne));
        }
        check_enum_comparability(lhs, rhs, state)?;
    }

    if op.folds() {
        let whole = Expr::Binary(op, Box::new(lhs.clone()), Box::new(rhs.clone()));
        if let Some(value) = fold::fold_const_i64(&whole) {
            return Ok(literal::emit_int_literal(value, IntSuffix::None, state, config));
        }
    }

    let prec = op.precedence();
    let lhs_text = emit_operand(lhs, prec, false, state, symbols, config)?;
    let rhs_text = emit_operand(rhs, prec, true, state, symbols, config)?;
    Ok(format!("{lhs_text} {} {rhs_text}", op.c_symbol()))
}
