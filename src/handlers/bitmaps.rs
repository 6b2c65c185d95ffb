//! Handlers for assignment to a named field of a bitmap-typed value,
//! whichever way that value is reached: a plain variable, a scope member
//! via `this`, an element of an array of bitmaps, or a register member
//! whose declared type happens to be a bitmap.
//!
//! All five kinds in spec.md's table reduce to the same three steps: look
//! up the field's `{offset, width}` in the bitmap's symbol table entry,
//! validate a literal RHS fits in that width, and emit the same
//! single/multi-bit read-modify-write the plain bit handlers use — except
//! against the *host* expression (the bitmap-typed value itself), not the
//! field name, which never appears as C text.

use crate::bitutils;
use crate::classify::AssignmentKind;
use crate::config::CodegenConfig;
use crate::context::AssignmentContext;
use crate::error::{CodeGenError, HandlerError};
use crate::expr::fold;
use crate::handlers::HandlerFn;
use crate::state::GenerationState;
use crate::symbols::{RegisterAccess, SymbolTable};

pub fn entries() -> Vec<(AssignmentKind, HandlerFn)> {
    vec![
        (AssignmentKind::BitmapFieldSingleBit, handle as HandlerFn),
        (AssignmentKind::BitmapFieldMultiBit, handle as HandlerFn),
        (AssignmentKind::BitmapArrayElementField, handle as HandlerFn),
        (AssignmentKind::StructMemberBitmapField, handle as HandlerFn),
        (AssignmentKind::RegisterMemberBitmapField, handle as HandlerFn),
        (AssignmentKind::ScopedRegisterMemberBitmapField, handle as HandlerFn),
    ]
}

/// The host text a field's RMW operates against: `resolved_target` with
/// the trailing `.field` the context builder always appends for a member
/// op stripped back off. This works uniformly for every reachable shape,
/// `flags.Running`, `this.flags.Running`, `flagsArray[2].enable`,
/// `CTRL.field`, because the context builder always renders the field
/// access as a plain `.name` suffix regardless of what precedes it.
fn host_text(ctx: &AssignmentContext, field: &str) -> String {
    let suffix = format!(".{field}");
    ctx.resolved_target
        .strip_suffix(suffix.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| ctx.resolved_base_identifier.clone())
}

fn bitmap_type_of(ctx: &AssignmentContext, symbols: &SymbolTable) -> Option<String> {
    symbols
        .register_member_types
        .get(&ctx.resolved_base_identifier)
        .cloned()
        .or_else(|| ctx.first_id_type_info.as_ref().and_then(|t| t.bitmap_type_name.clone()))
}

fn handle(
    ctx: &AssignmentContext,
    state: &mut GenerationState,
    symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<String, CodeGenError> {
    if ctx.is_compound {
        return Err(HandlerError::CompoundOnBitField { line: ctx.line }.into());
    }

    let field = ctx
        .identifiers
        .last()
        .ok_or_else(|| HandlerError::Internal("bitmap field access has no field name".to_string()))?
        .clone();

    let bitmap_type = bitmap_type_of(ctx, symbols)
        .ok_or_else(|| HandlerError::Internal(format!("'{field}' target has no known bitmap type")))?;

    let bit_field = symbols.bitmap_field(&bitmap_type, &field).ok_or_else(|| HandlerError::UnknownBitmapField {
        line: ctx.line,
        bitmap: bitmap_type.clone(),
        field: field.clone(),
    })?;

    if let Some(literal) = fold::fold_const_i64(&ctx.value_expr) {
        let max = if bit_field.width >= 64 { u64::MAX } else { (1u64 << bit_field.width) - 1 };
        if literal < 0 || (literal as u64) > max {
            return Err(HandlerError::BitmapLiteralOverflow {
                line: ctx.line,
                field: field.clone(),
                width: bit_field.width,
            }
            .into());
        }
    }

    let is64 = symbols.bitmap_bit_width.get(&bitmap_type).is_some_and(|w| *w > 32);
    let host = host_text(ctx, &field);

    let write_only = symbols.register_access(&ctx.resolved_base_identifier).is_some_and(RegisterAccess::is_write_only);

    if write_only {
        // Nothing to preserve on a write-only register: skip the read
        // entirely rather than mask-RMW against a value we can't read back.
        return Ok(format!(
            "{host} = (({} & {}) << {});",
            ctx.generated_value,
            bitutils::width_mask(bit_field.width, is64),
            bit_field.offset
        ));
    }

    let offset_text = bit_field.offset.to_string();
    Ok(if bit_field.width == 1 {
        bitutils::single_bit_rmw(&host, &offset_text, &ctx.generated_value, is64)
    } else {
        bitutils::bit_range_rmw(&host, &offset_text, bit_field.width, &ctx.generated_value, is64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AssignmentStmt, Expr, PostfixOp, SourceOp};
    use crate::context::build_context;
    use crate::symbols::BitField;
    use crate::types::TypeInfo;

    fn status_symbols() -> SymbolTable {
        let mut symbols = SymbolTable::new();
        let mut fields = std::collections::HashMap::new();
        fields.insert("Running".to_string(), BitField { offset: 0, width: 1 });
        fields.insert("Mode".to_string(), BitField { offset: 1, width: 3 });
        symbols.bitmap_fields.insert("Status".to_string(), fields);
        symbols
    }

    #[test]
    fn single_bit_bitmap_field_write() {
        let mut state = GenerationState::new();
        state.type_registry.insert("flags".to_string(), TypeInfo::bitmap("Status"));
        let symbols = status_symbols();
        let config = CodegenConfig::default();
        let stmt = AssignmentStmt {
            target: Expr::Postfix(
                Box::new(Expr::Identifier("flags".to_string())),
                vec![PostfixOp::Member("Running".to_string())],
            ),
            op: SourceOp::Assign,
            value: Expr::BoolLiteral(true),
            line: None,
            column: None,
        };
        let ctx = build_context(&stmt, &mut state, &symbols, &config).unwrap();
        let out = handle(&ctx, &mut state, &symbols, &config).unwrap();
        assert_eq!(out, "flags = ((flags & ~(1U << (0))) | (((true) & 1U) << (0)));");
    }

    #[test]
    fn unknown_field_is_rejected() {
        let mut state = GenerationState::new();
        state.type_registry.insert("flags".to_string(), TypeInfo::bitmap("Status"));
        let symbols = status_symbols();
        let config = CodegenConfig::default();
        let stmt = AssignmentStmt {
            target: Expr::Postfix(
                Box::new(Expr::Identifier("flags".to_string())),
                vec![PostfixOp::Member("Bogus".to_string())],
            ),
            op: SourceOp::Assign,
            value: Expr::BoolLiteral(true),
            line: Some(4),
            column: None,
        };
        let ctx = build_context(&stmt, &mut state, &symbols, &config).unwrap();
        let err = handle(&ctx, &mut state, &symbols, &config).unwrap_err();
        assert!(err.to_string().contains("no field named"));
    }

    #[test]
    fn literal_overflowing_field_width_is_rejected() {
        let mut state = GenerationState::new();
        state.type_registry.insert("flags".to_string(), TypeInfo::bitmap("Status"));
        let symbols = status_symbols();
        let config = CodegenConfig::default();
        let stmt = AssignmentStmt {
            target: Expr::Postfix(
                Box::new(Expr::Identifier("flags".to_string())),
                vec![PostfixOp::Member("Mode".to_string())],
            ),
            op: SourceOp::Assign,
            value: Expr::IntLiteral(9, crate::ast::IntSuffix::None),
            line: Some(2),
            column: None,
        };
        let ctx = build_context(&stmt, &mut state, &symbols, &config).unwrap();
        let err = handle(&ctx, &mut state, &symbols, &config).unwrap_err();
        assert!(err.to_string().contains("does not fit"));
    }

    #[test]
    fn write_only_register_bitmap_field_skips_the_read() {
        let mut state = GenerationState::new();
        state.type_registry.insert("CTRL".to_string(), TypeInfo::bitmap("Status"));
        let mut symbols = status_symbols();
        symbols.register_member_access.insert("CTRL".to_string(), RegisterAccess::WriteOnly);
        let config = CodegenConfig::default();
        let stmt = AssignmentStmt {
            target: Expr::Postfix(
                Box::new(Expr::Identifier("CTRL".to_string())),
                vec![PostfixOp::Member("Running".to_string())],
            ),
            op: SourceOp::Assign,
            value: Expr::BoolLiteral(true),
            line: None,
            column: None,
        };
        let ctx = build_context(&stmt, &mut state, &symbols, &config).unwrap();
        let out = handle(&ctx, &mut state, &symbols, &config).unwrap();
        assert_eq!(out, "CTRL = ((true & 1U) << 0);");
        assert!(!out.contains("& ~"));
    }

    #[test]
    fn bitmap_field_through_this_resolves_scope_prefix() {
        let mut state = GenerationState::new();
        state.current_scope = Some("Motor".to_string());
        state.type_registry.insert("Motor_flags".to_string(), TypeInfo::bitmap("Status"));
        let symbols = status_symbols();
        let config = CodegenConfig::default();
        let stmt = AssignmentStmt {
            target: Expr::Postfix(
                Box::new(Expr::This),
                vec![PostfixOp::Member("flags".to_string()), PostfixOp::Member("Running".to_string())],
            ),
            op: SourceOp::Assign,
            value: Expr::BoolLiteral(true),
            line: None,
            column: None,
        };
        let ctx = build_context(&stmt, &mut state, &symbols, &config).unwrap();
        let out = handle(&ctx, &mut state, &symbols, &config).unwrap();
        assert!(out.starts_with("Motor_flags = "));
    }
}
