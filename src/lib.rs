//! Assignment-and-access code generation core for a source-to-source
//! compiler from an embedded-systems DSL to MISRA-C:2012-oriented C.
//!
//! This crate owns exactly the slice of a larger compiler described in its
//! design notes: given one already-resolved assignment statement (a left-
//! hand side postfix chain, an operator, and a right-hand side expression)
//! plus a read-only [`symbols::SymbolTable`] and a mutable
//! [`state::GenerationState`], it decides what C statement to emit. The
//! parser, symbol collection, declaration emission, and control-flow
//! statement emission all live upstream, outside this crate.
//!
//! The pipeline for one statement is [`context::build_context`] →
//! [`classify::classify`] → [`handlers::dispatch`]; expression emission
//! ([`expr::emit_expr`]) is the read-side analogue invoked recursively from
//! both the context builder (for the RHS) and the handlers (for subscript
//! indices, call arguments, and slice bounds).

pub mod ast;
pub mod bitutils;
pub mod classify;
pub mod config;
pub mod context;
pub mod effects;
pub mod error;
pub mod expr;
pub mod handlers;
pub mod namemangler;
pub mod regutils;
pub mod state;
pub mod strutils;
pub mod symbols;
pub mod target;
pub mod types;

pub use ast::AssignmentStmt;
pub use classify::AssignmentKind;
pub use config::CodegenConfig;
pub use context::AssignmentContext;
pub use error::{CodeGenError, HandlerError};
pub use state::GenerationState;
pub use symbols::SymbolTable;
pub use target::TargetCapabilities;

/// Generate the C statement for one assignment, end to end: build its
/// context, classify it, and dispatch to the matching handler. This is the
/// single call a driver needs per assignment statement; everything else in
/// this crate exists to make that one call correct.
pub fn generate_assignment(
    stmt: &AssignmentStmt,
    state: &mut GenerationState,
    symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<String, CodeGenError> {
    let ctx = context::build_context(stmt, state, symbols, config)?;
    let kind = classify::classify(&ctx, state, symbols);
    handlers::dispatch(kind, &ctx, state, symbols, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, IntSuffix, SourceOp};

    #[test]
    fn generates_simple_assignment_end_to_end() {
        let mut state = GenerationState::new();
        let symbols = SymbolTable::new();
        let config = CodegenConfig::default();
        let stmt = AssignmentStmt {
            target: Expr::Identifier("speed".to_string()),
            op: SourceOp::Assign,
            value: Expr::IntLiteral(5, IntSuffix::None),
            line: None,
            column: None,
        };
        let out = generate_assignment(&stmt, &mut state, &symbols, &config).unwrap();
        assert_eq!(out, "speed = 5;");
    }

    #[test]
    fn generates_bit_write_end_to_end() {
        use crate::ast::PostfixOp;
        let mut state = GenerationState::new();
        state
            .type_registry
            .insert("flags".to_string(), crate::types::TypeInfo::scalar(crate::types::BaseType::U32));
        let symbols = SymbolTable::new();
        let config = CodegenConfig::default();
        let stmt = AssignmentStmt {
            target: Expr::Postfix(
                Box::new(Expr::Identifier("flags".to_string())),
                vec![PostfixOp::Index(Box::new(Expr::IntLiteral(3, IntSuffix::None)))],
            ),
            op: SourceOp::Assign,
            value: Expr::BoolLiteral(true),
            line: None,
            column: None,
        };
        let out = generate_assignment(&stmt, &mut state, &symbols, &config).unwrap();
        assert!(out.contains("flags & ~(1U << (3))"));
    }
}
