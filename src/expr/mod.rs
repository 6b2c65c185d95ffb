//! The expression emitter: turns a parsed [`Expr`] into a C expression
//! string. This is the read side used for assignment right-hand sides and
//! for every reference inside a postfix chain — the two are the same
//! recursive function, since a subscript index or a call argument is
//! itself just another expression to emit.

mod binary;
pub mod calls;
pub mod fold;
mod literal;
mod postfix;
mod unary;

use crate::ast::Expr;
use crate::config::CodegenConfig;
use crate::error::CodeGenError;
use crate::state::GenerationState;
use crate::symbols::SymbolTable;

pub use literal::{emit_bool_literal, emit_float_literal, emit_int_literal, emit_string_literal};

/// Emit `expr` as a C expression. Dispatches to the literal, unary, binary,
/// or postfix-chain emitter depending on shape; postfix emission recurses
/// back into this function for every subscript index, call argument, and
/// slice bound it encounters.
pub fn emit_expr(
    expr: &Expr,
    state: &mut GenerationState,
    symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<String, CodeGenError> {
    match expr {
        Expr::IntLiteral(value, suffix) => Ok(emit_int_literal(*value, *suffix, state, config)),
        Expr::FloatLiteral(value, suffix) => Ok(emit_float_literal(*value, *suffix)),
        Expr::BoolLiteral(value) => Ok(emit_bool_literal(*value)),
        Expr::StringLiteral(value) => Ok(emit_string_literal(value)),
        Expr::Unary(op, inner) => unary::emit_unary(*op, inner, state, symbols, config),
        Expr::Binary(op, lhs, rhs) => binary::emit_binary(*op, lhs, rhs, state, symbols, config),
        Expr::Identifier(_) | Expr::This | Expr::Global | Expr::Args => {
            postfix::emit_postfix(expr, &[], state, symbols, config)
        }
        Expr::Postfix(base, ops) => postfix::emit_postfix(base, ops, state, symbols, config),
    }
}
