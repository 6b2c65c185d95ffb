//! Handlers for assignment shapes with no bit-level, register, bitmap,
//! string-buffer, or array-subscript involvement: plain scalars and struct
//! or scope member chains that are just `lvalue op= rhs;`. Array element
//! and slice writes have their own handlers in [`super::arrays`], since a
//! slice lowers to a `memcpy` rather than a plain assignment.

use crate::ast::{Expr, PostfixOp, UnaryOp};
use crate::bitutils;
use crate::classify::AssignmentKind;
use crate::config::CodegenConfig;
use crate::context::{detect_safe_arith_call, AssignmentContext};
use crate::error::{CodeGenError, HandlerError};
use crate::expr::fold;
use crate::handlers::HandlerFn;
use crate::state::GenerationState;
use crate::symbols::{RegisterAccess, SymbolTable};
use crate::types::BaseType;

pub fn entries() -> Vec<(AssignmentKind, HandlerFn)> {
    vec![
        (AssignmentKind::Simple, handle as HandlerFn),
        (AssignmentKind::MemberChain, handle as HandlerFn),
        (AssignmentKind::ThisMember, handle as HandlerFn),
        (AssignmentKind::GlobalMember, handle as HandlerFn),
    ]
}

/// A literal `0` written whole to a write-1-to-clear register member is
/// almost always a mistake: every flag bit in the register reads as "leave
/// alone" under write-1-to-clear semantics, so the statement is a silent
/// no-op rather than the reset the author likely intended (§7).
fn rejects_literal_zero_clear(ctx: &AssignmentContext, symbols: &SymbolTable) -> Option<HandlerError> {
    if ctx.is_compound {
        return None;
    }
    let access = symbols.register_access(&ctx.resolved_base_identifier)?;
    if access != RegisterAccess::Write1Clear {
        return None;
    }
    if fold::fold_const_i64(&ctx.value_expr) != Some(0) {
        return None;
    }
    Some(HandlerError::WriteOnlyClear {
        line: ctx.line,
        member: ctx.resolved_base_identifier.clone(),
    })
}

/// Whether `expr` is known, without full type inference, to evaluate to an
/// integer rather than a float — conservative by design: an unrecognized
/// shape (a struct-chain read, a call) answers `false` rather than risk
/// inserting a cast around an RHS that's already floating-point.
fn rhs_is_integer_valued(expr: &Expr, state: &GenerationState) -> bool {
    match expr {
        Expr::IntLiteral(..) | Expr::BoolLiteral(_) => true,
        Expr::FloatLiteral(..) => false,
        Expr::Unary(UnaryOp::Neg | UnaryOp::BitNot | UnaryOp::Not, inner) => {
            rhs_is_integer_valued(inner, state)
        }
        Expr::Identifier(name) => state
            .type_registry
            .get(name)
            .map(|t| !t.base_type.is_float())
            .unwrap_or(false),
        Expr::Binary(_, lhs, rhs) => rhs_is_integer_valued(lhs, state) && rhs_is_integer_valued(rhs, state),
        _ => false,
    }
}

fn handle(
    ctx: &AssignmentContext,
    state: &mut GenerationState,
    symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<String, CodeGenError> {
    if let Some(err) = rejects_literal_zero_clear(ctx, symbols) {
        return Err(err.into());
    }
    // A direct (non-bit) write to the target invalidates any float-bit
    // shadow's currency: the union's `.f` half no longer matches the value
    // just stored, so the next bit access must re-copy before reading it.
    state.float_shadow_current.remove(&ctx.resolved_target);
    let base_type = ctx.first_id_type_info.as_ref().map(|t| t.base_type);

    if !ctx.is_compound {
        if let Some(call) = detect_safe_arith_call(&ctx.value_expr, state, symbols, config)? {
            let base_type_name = base_type.map(|t| t.short_name().to_string()).unwrap_or_else(|| "u32".to_string());
            let is_div = call.helper == crate::expr::calls::SAFE_DIV;
            let helper_name = if is_div {
                state.used_safe_div_ops.insert(base_type_name.clone());
                config.safe_div_helper_name(&base_type_name)
            } else {
                state.used_safe_mod_ops.insert(base_type_name.clone());
                config.safe_mod_helper_name(&base_type_name)
            };
            return Ok(format!(
                "{helper_name}(&{}, {}, {});",
                ctx.resolved_target, call.numerator, call.denominator
            ));
        }

        // An integer expression assigned straight into a float target needs
        // an explicit cast — `speed = 5;` is fine in C, but the suffix-free
        // integer literal this core emits for a float-expected context would
        // otherwise read back as an `int` assignment with an implicit
        // conversion MISRA Rule 10.3 forbids.
        if let Some(bt) = base_type {
            if bt.is_float() && rhs_is_integer_valued(&ctx.value_expr, state) {
                let cast = bitutils::narrowing_cast(bt, &ctx.generated_value);
                return Ok(format!("{} {} {};", ctx.resolved_target, ctx.c_op, cast));
            }
        }
    } else if config.misra_casts {
        // MISRA Rule 10.3: a compound op on a target narrower than the `int`
        // it promotes to during arithmetic needs the result cast back down
        // explicitly rather than relying on the implicit narrowing the
        // compound operator itself would otherwise perform.
        if let Some(bt) = base_type {
            if matches!(bt, BaseType::U8 | BaseType::U16 | BaseType::I8 | BaseType::I16) {
                let base_op = ctx.op.base_op().unwrap_or("+");
                let widened = format!("{} {} {}", ctx.resolved_target, base_op, ctx.generated_value);
                let cast = bitutils::narrowing_cast(bt, &widened);
                return Ok(format!("{} = {};", ctx.resolved_target, cast));
            }
        }
    }

    Ok(format!("{} {} {};", ctx.resolved_target, ctx.c_op, ctx.generated_value))
}
