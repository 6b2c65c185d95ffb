//! Handlers for array-element writes and the two-expression `[offset,
//! length]` slice form.
//!
//! Element writes (`ArrayElement`, `MultiDimArrayElement`, `ThisArray`,
//! `GlobalArray`) share one shape: [`crate::context::build_context`] has
//! already folded every subscript into `resolved_target`, so the handler's
//! only remaining job is the compile-time bounds check spec'd for constant
//! indices. A slice (`ArraySlice`) is a different beast entirely — a
//! `memcpy` into a sub-range of the buffer, not a scalar store — so it gets
//! its own handler.

use crate::ast::PostfixOp;
use crate::classify::AssignmentKind;
use crate::config::CodegenConfig;
use crate::context::AssignmentContext;
use crate::error::{CodeGenError, HandlerError};
use crate::expr::fold;
use crate::handlers::HandlerFn;
use crate::state::GenerationState;
use crate::symbols::SymbolTable;

pub fn entries() -> Vec<(AssignmentKind, HandlerFn)> {
    vec![
        (AssignmentKind::ArrayElement, handle_element as HandlerFn),
        (AssignmentKind::MultiDimArrayElement, handle_element as HandlerFn),
        (AssignmentKind::ThisArray, handle_element as HandlerFn),
        (AssignmentKind::GlobalArray, handle_element as HandlerFn),
        (AssignmentKind::ArraySlice, handle_slice as HandlerFn),
    ]
}

/// Check every subscript that folds to a constant against the
/// corresponding declared dimension, left to right. A non-constant
/// subscript (already emitted as an expression by the context builder) is
/// skipped — it can only be checked at runtime, outside this core's scope.
fn check_bounds(ctx: &AssignmentContext) -> Result<(), CodeGenError> {
    let dims = match ctx.first_id_type_info.as_ref().and_then(|t| t.array_dimensions.as_ref()) {
        Some(d) => d,
        None => return Ok(()),
    };
    let indices = ctx.postfix_ops.iter().filter_map(|op| match op {
        PostfixOp::Index(e) => Some(e.as_ref()),
        _ => None,
    });
    for (dim, index_expr) in dims.iter().zip(indices) {
        if let Some(index) = fold::fold_const_i64(index_expr) {
            if index < 0 || index >= i64::from(*dim) {
                return Err(HandlerError::ArrayIndexOutOfBounds {
                    line: ctx.line,
                    index,
                    len: *dim,
                }
                .into());
            }
        }
    }
    Ok(())
}

fn handle_element(
    ctx: &AssignmentContext,
    _state: &mut GenerationState,
    _symbols: &SymbolTable,
    _config: &CodegenConfig,
) -> Result<String, CodeGenError> {
    check_bounds(ctx)?;
    Ok(format!("{} {} {};", ctx.resolved_target, ctx.c_op, ctx.generated_value))
}

fn handle_slice(
    ctx: &AssignmentContext,
    state: &mut GenerationState,
    _symbols: &SymbolTable,
    _config: &CodegenConfig,
) -> Result<String, CodeGenError> {
    if ctx.is_compound {
        return Err(HandlerError::CompoundOnBitField { line: ctx.line }.into());
    }

    let slice = ctx.postfix_ops.iter().rev().find_map(|op| match op {
        PostfixOp::Slice(a, b) => Some((a.as_ref(), b.as_ref())),
        _ => None,
    });
    let (offset_expr, length_expr) = slice
        .ok_or_else(|| HandlerError::Internal("array slice missing its [offset, length] op".to_string()))?;

    let (offset, length) = fold::fold_slice_bounds(offset_expr, length_expr)
        .ok_or(HandlerError::SliceNonConst { line: ctx.line })?;

    let info = ctx.first_id_type_info.as_ref();
    let capacity = if let Some(dims) = info.and_then(|t| t.array_dimensions.as_ref()) {
        if dims.len() != 1 {
            return Err(HandlerError::Internal(
                "array slicing is only defined on a one-dimensional array".to_string(),
            )
            .into());
        }
        i64::from(dims[0])
    } else if let Some(cap) = info.and_then(|t| t.string_capacity) {
        i64::from(cap) + 1
    } else {
        return Err(HandlerError::Internal("slice target has no known capacity".to_string()).into());
    };

    if offset < 0 || length <= 0 || offset + length > capacity {
        return Err(HandlerError::SliceOutOfBounds {
            line: ctx.line,
            start: offset,
            width: length,
            max: capacity as u32,
        }
        .into());
    }

    state.needs_string = true;
    Ok(format!(
        "memcpy(&{}[{offset}], &{}, {length});",
        ctx.resolved_base_identifier, ctx.generated_value
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AssignmentStmt, Expr, IntSuffix, SourceOp};
    use crate::context::build_context;
    use crate::types::{BaseType, TypeInfo};

    #[test]
    fn constant_index_in_bounds_emits_plain_store() {
        let mut state = GenerationState::new();
        state
            .type_registry
            .insert("buf".to_string(), TypeInfo::array_of(BaseType::U8, vec![4]));
        let symbols = SymbolTable::new();
        let config = CodegenConfig::default();
        let stmt = AssignmentStmt {
            target: Expr::Postfix(
                Box::new(Expr::Identifier("buf".to_string())),
                vec![PostfixOp::Index(Box::new(Expr::IntLiteral(2, IntSuffix::None)))],
            ),
            op: SourceOp::Assign,
            value: Expr::IntLiteral(9, IntSuffix::None),
            line: None,
            column: None,
        };
        let ctx = build_context(&stmt, &mut state, &symbols, &config).unwrap();
        let out = handle_element(&ctx, &mut state, &symbols, &config).unwrap();
        assert_eq!(out, "buf[2] = 9;");
    }

    #[test]
    fn constant_index_out_of_bounds_is_rejected() {
        let mut state = GenerationState::new();
        state
            .type_registry
            .insert("buf".to_string(), TypeInfo::array_of(BaseType::U8, vec![4]));
        let symbols = SymbolTable::new();
        let config = CodegenConfig::default();
        let stmt = AssignmentStmt {
            target: Expr::Postfix(
                Box::new(Expr::Identifier("buf".to_string())),
                vec![PostfixOp::Index(Box::new(Expr::IntLiteral(9, IntSuffix::None)))],
            ),
            op: SourceOp::Assign,
            value: Expr::IntLiteral(1, IntSuffix::None),
            line: Some(7),
            column: None,
        };
        let ctx = build_context(&stmt, &mut state, &symbols, &config).unwrap();
        let err = handle_element(&ctx, &mut state, &symbols, &config).unwrap_err();
        assert!(err.to_string().contains("out of bounds"));
    }

    #[test]
    fn valid_slice_emits_memcpy() {
        let mut state = GenerationState::new();
        state
            .type_registry
            .insert("buf".to_string(), TypeInfo::array_of(BaseType::U8, vec![16]));
        let symbols = SymbolTable::new();
        let config = CodegenConfig::default();
        let stmt = AssignmentStmt {
            target: Expr::Postfix(
                Box::new(Expr::Identifier("buf".to_string())),
                vec![PostfixOp::Slice(
                    Box::new(Expr::IntLiteral(0, IntSuffix::None)),
                    Box::new(Expr::IntLiteral(4, IntSuffix::None)),
                )],
            ),
            op: SourceOp::Assign,
            value: Expr::Identifier("source".to_string()),
            line: None,
            column: None,
        };
        let ctx = build_context(&stmt, &mut state, &symbols, &config).unwrap();
        let out = handle_slice(&ctx, &mut state, &symbols, &config).unwrap();
        assert_eq!(out, "memcpy(&buf[0], &source, 4);");
        assert!(state.needs_string);
    }

    #[test]
    fn slice_exceeding_capacity_is_rejected() {
        let mut state = GenerationState::new();
        state
            .type_registry
            .insert("buf".to_string(), TypeInfo::array_of(BaseType::U8, vec![16]));
        let symbols = SymbolTable::new();
        let config = CodegenConfig::default();
        let stmt = AssignmentStmt {
            target: Expr::Postfix(
                Box::new(Expr::Identifier("buf".to_string())),
                vec![PostfixOp::Slice(
                    Box::new(Expr::IntLiteral(0, IntSuffix::None)),
                    Box::new(Expr::IntLiteral(17, IntSuffix::None)),
                )],
            ),
            op: SourceOp::Assign,
            value: Expr::Identifier("source".to_string()),
            line: Some(3),
            column: None,
        };
        let ctx = build_context(&stmt, &mut state, &symbols, &config).unwrap();
        let err = handle_slice(&ctx, &mut state, &symbols, &config).unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn non_const_slice_bounds_are_rejected() {
        let mut state = GenerationState::new();
        state
            .type_registry
            .insert("buf".to_string(), TypeInfo::array_of(BaseType::U8, vec![16]));
        let symbols = SymbolTable::new();
        let config = CodegenConfig::default();
        let stmt = AssignmentStmt {
            target: Expr::Postfix(
                Box::new(Expr::Identifier("buf".to_string())),
                vec![PostfixOp::Slice(
                    Box::new(Expr::Identifier("offset".to_string())),
                    Box::new(Expr::IntLiteral(4, IntSuffix::None)),
                )],
            ),
            op: SourceOp::Assign,
            value: Expr::Identifier("source".to_string()),
            line: Some(1),
            column: None,
        };
        let ctx = build_context(&stmt, &mut state, &symbols, &config).unwrap();
        let err = handle_slice(&ctx, &mut state, &symbols, &config).unwrap_err();
        assert!(err.to_string().contains("compile-time constants"));
    }
}
