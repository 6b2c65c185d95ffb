//! The Assignment Classifier: a closed, precedence-ordered mapping from an
//! [`AssignmentContext`] to exactly one [`AssignmentKind`].
//!
//! Classification order matters — more specific shapes (a bit range on a
//! register member reached through a scope) are checked before more
//! general ones (a plain struct member chain) so a statement that matches
//! several structurally similar patterns always lands on the most specific
//! one.

use crate::ast::{Expr, PostfixOp};
use crate::context::AssignmentContext;
use crate::state::GenerationState;
use crate::symbols::SymbolTable;

/// The ~30 disjoint assignment shapes this core knows how to emit. Every
/// valid [`AssignmentContext`] classifies into exactly one of these; an
/// unclassifiable context is an upstream bug, not a user error, and
/// surfaces as [`crate::error::HandlerError::Internal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentKind {
    // Direct-RHS builtins, checked before anything else touches the LHS.
    AtomicRmw,
    OverflowClamp,

    // Strings: fixed-capacity buffer copies.
    StringSimple,
    StringThisMember,
    StringGlobal,
    StringStructField,
    StringArrayElement,
    StringStructArrayElement,

    // Hardware registers.
    RegisterBit,
    RegisterBitRange,
    ScopedRegisterBit,
    ScopedRegisterBitRange,
    GlobalRegisterBit,

    // Plain-integer and struct-chain bit-level access.
    IntegerBit,
    IntegerBitRange,
    ThisBit,
    ThisBitRange,
    StructMemberBit,
    ArrayElementBit,
    StructChainBitRange,

    // Bitmap-typed fields.
    BitmapFieldSingleBit,
    BitmapFieldMultiBit,
    BitmapArrayElementField,
    StructMemberBitmapField,
    RegisterMemberBitmapField,
    ScopedRegisterMemberBitmapField,

    // Arrays.
    ArrayElement,
    MultiDimArrayElement,
    ArraySlice,

    // Scope/struct member chains with no bit-level or array involvement.
    GlobalMember,
    GlobalArray,
    ThisMember,
    ThisArray,
    MemberChain,

    // The universal fallback.
    Simple,
}

fn is_register_member(ctx: &AssignmentContext, symbols: &SymbolTable) -> bool {
    let qualified = ctx.resolved_base_identifier.as_str();
    symbols.register_member_access.contains_key(qualified)
}

fn is_bitmap_typed(ctx: &AssignmentContext) -> bool {
    ctx.first_id_type_info.as_ref().is_some_and(|t| t.is_bitmap)
}

fn is_string_typed(ctx: &AssignmentContext) -> bool {
    ctx.first_id_type_info.as_ref().is_some_and(|t| t.is_string)
}

/// A one-hop `param.field <- "literal"` where `param` is the current
/// function's struct-typed parameter. The type registry only ever resolves
/// a bare identifier's own type (`first_id_type_info`), never a parameter's
/// member — so a struct parameter's string field is otherwise invisible to
/// `is_string_typed` and would fall through to the generic member-chain
/// handler, which has no notion of a bounded copy. Scoped to a bare string
/// literal RHS and no subscript, the same shallow one-hop resolution this
/// core already applies to a struct parameter's first member elsewhere.
fn is_struct_param_string_field(ctx: &AssignmentContext, state: &GenerationState) -> bool {
    if ctx.has_this || ctx.has_global {
        return false;
    }
    if !matches!(ctx.value_expr, Expr::StringLiteral(_)) {
        return false;
    }
    if ctx.identifiers.len() != 2 || !ctx.subscripts.is_empty() {
        return false;
    }
    state
        .current_parameters
        .get(&ctx.identifiers[0])
        .is_some_and(|p| p.is_struct)
}

fn is_array_typed(ctx: &AssignmentContext) -> bool {
    ctx.first_id_type_info.as_ref().is_some_and(|t| t.is_array)
}

fn is_atomic(ctx: &AssignmentContext) -> bool {
    ctx.first_id_type_info.as_ref().is_some_and(|t| t.is_atomic)
}

fn is_saturating(ctx: &AssignmentContext) -> bool {
    ctx.first_id_type_info.as_ref().is_some_and(|t| t.is_saturating)
}

fn has_slice(ctx: &AssignmentContext) -> bool {
    ctx.postfix_ops.iter().any(|op| matches!(op, PostfixOp::Slice(..)))
}

fn has_index(ctx: &AssignmentContext) -> bool {
    ctx.postfix_ops.iter().any(|op| matches!(op, PostfixOp::Index(..)))
}

fn member_depth(ctx: &AssignmentContext) -> usize {
    ctx.postfix_ops
        .iter()
        .filter(|op| matches!(op, PostfixOp::Member(_)))
        .count()
}

/// Classify an already-built context into exactly one assignment kind.
pub fn classify(ctx: &AssignmentContext, state: &GenerationState, symbols: &SymbolTable) -> AssignmentKind {
    if is_atomic(ctx) && ctx.is_compound {
        return AssignmentKind::AtomicRmw;
    }
    if is_saturating(ctx) && ctx.is_compound {
        return AssignmentKind::OverflowClamp;
    }

    if is_struct_param_string_field(ctx, state) {
        return AssignmentKind::StringStructField;
    }

    if is_string_typed(ctx) {
        if ctx.is_simple_identifier {
            return AssignmentKind::StringSimple;
        }
        if ctx.is_simple_this_access {
            return AssignmentKind::StringThisMember;
        }
        if ctx.has_global {
            return AssignmentKind::StringGlobal;
        }
        if has_index(ctx) && member_depth(ctx) > 1 {
            return AssignmentKind::StringStructArrayElement;
        }
        if has_index(ctx) {
            return AssignmentKind::StringArrayElement;
        }
        return AssignmentKind::StringStructField;
    }

    let register_member = is_register_member(ctx, symbols);

    if register_member {
        if is_bitmap_typed(ctx) {
            if ctx.has_global {
                return AssignmentKind::RegisterMemberBitmapField;
            }
            return AssignmentKind::ScopedRegisterMemberBitmapField;
        }
        if has_slice(ctx) {
            return if ctx.has_global {
                AssignmentKind::GlobalRegisterBit
            } else if ctx.has_this {
                AssignmentKind::ScopedRegisterBitRange
            } else {
                AssignmentKind::RegisterBitRange
            };
        }
        if has_index(ctx) {
            return if ctx.has_this {
                AssignmentKind::ScopedRegisterBit
            } else {
                AssignmentKind::RegisterBit
            };
        }
    }

    if is_bitmap_typed(ctx) {
        if has_index(ctx) {
            return AssignmentKind::BitmapArrayElementField;
        }
        if member_depth(ctx) > 1 {
            return AssignmentKind::StructMemberBitmapField;
        }
        if has_slice(ctx) {
            return AssignmentKind::BitmapFieldMultiBit;
        }
        return AssignmentKind::BitmapFieldSingleBit;
    }

    if has_slice(ctx) {
        if ctx.has_this {
            return AssignmentKind::ThisBitRange;
        }
        if member_depth(ctx) > 1 {
            return AssignmentKind::StructChainBitRange;
        }
        if is_array_typed(ctx) {
            return AssignmentKind::ArraySlice;
        }
        return AssignmentKind::IntegerBitRange;
    }

    if has_index(ctx) && !is_array_typed(ctx) {
        // A single-bit index applied directly to a scalar target.
        if ctx.has_this {
            return AssignmentKind::ThisBit;
        }
        if member_depth(ctx) > 1 {
            return AssignmentKind::StructMemberBit;
        }
        return AssignmentKind::IntegerBit;
    }

    if is_array_typed(ctx) {
        if has_index(ctx) && member_depth(ctx) > 1 {
            return AssignmentKind::ArrayElementBit;
        }
        let dims = ctx
            .first_id_type_info
            .as_ref()
            .and_then(|t| t.array_dimensions.as_ref())
            .map(Vec::len)
            .unwrap_or(1);
        if ctx.has_global {
            return AssignmentKind::GlobalArray;
        }
        if ctx.has_this {
            return AssignmentKind::ThisArray;
        }
        if dims > 1 {
            return AssignmentKind::MultiDimArrayElement;
        }
        return AssignmentKind::ArrayElement;
    }

    if ctx.has_global {
        return AssignmentKind::GlobalMember;
    }
    if ctx.has_this {
        return AssignmentKind::ThisMember;
    }
    if member_depth(ctx) > 0 {
        return AssignmentKind::MemberChain;
    }

    AssignmentKind::Simple
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AssignmentStmt, Expr, IntSuffix, SourceOp};
    use crate::config::CodegenConfig;
    use crate::context::build_context;

    fn classify_stmt(
        target: Expr,
        symbols: &SymbolTable,
        state: &mut GenerationState,
    ) -> AssignmentKind {
        let stmt = AssignmentStmt {
            target,
            op: SourceOp::Assign,
            value: Expr::IntLiteral(1, IntSuffix::None),
            line: None,
            column: None,
        };
        let config = CodegenConfig::default();
        let ctx = build_context(&stmt, state, symbols, &config).unwrap();
        classify(&ctx, state, symbols)
    }

    #[test]
    fn plain_identifier_is_simple() {
        let symbols = SymbolTable::new();
        let mut state = GenerationState::new();
        let kind = classify_stmt(Expr::Identifier("x".to_string()), &symbols, &mut state);
        assert_eq!(kind, AssignmentKind::Simple);
    }

    #[test]
    fn string_typed_identifier_is_string_simple() {
        let symbols = SymbolTable::new();
        let mut state = GenerationState::new();
        state
            .type_registry
            .insert("name".to_string(), crate::types::TypeInfo::string(16));
        let kind = classify_stmt(Expr::Identifier("name".to_string()), &symbols, &mut state);
        assert_eq!(kind, AssignmentKind::StringSimple);
    }

    #[test]
    fn member_chain_without_special_typing_is_member_chain() {
        use crate::ast::PostfixOp;
        let symbols = SymbolTable::new();
        let mut state = GenerationState::new();
        let target = Expr::Postfix(
            Box::new(Expr::Identifier("frame".to_string())),
            vec![PostfixOp::Member("count".to_string())],
        );
        let kind = classify_stmt(target, &symbols, &mut state);
        assert_eq!(kind, AssignmentKind::MemberChain);
    }

    #[test]
    fn struct_parameter_string_field_literal_is_string_struct_field() {
        use crate::ast::PostfixOp;
        let symbols = SymbolTable::new();
        let mut state = GenerationState::new();
        state.current_parameters.insert(
            "frame".to_string(),
            crate::state::ParamState {
                base_type_name: "Frame".to_string(),
                is_array: false,
                is_struct: true,
                is_const: false,
                is_callback: false,
                is_string: false,
                force_pointer_semantics: false,
            },
        );
        let target = Expr::Postfix(
            Box::new(Expr::Identifier("frame".to_string())),
            vec![PostfixOp::Member("label".to_string())],
        );
        let stmt = AssignmentStmt {
            target,
            op: SourceOp::Assign,
            value: Expr::StringLiteral("hi".to_string()),
            line: None,
            column: None,
        };
        let config = CodegenConfig::default();
        let ctx = build_context(&stmt, &mut state, &symbols, &config).unwrap();
        let kind = classify(&ctx, &state, &symbols);
        assert_eq!(kind, AssignmentKind::StringStructField);
    }

    #[test]
    fn plain_assignment_to_atomic_target_is_not_atomic_rmw() {
        let symbols = SymbolTable::new();
        let mut state = GenerationState::new();
        state.type_registry.insert(
            "counter".to_string(),
            crate::types::TypeInfo::scalar(crate::types::BaseType::U32).with_atomic(true),
        );
        let kind = classify_stmt(Expr::Identifier("counter".to_string()), &symbols, &mut state);
        assert_eq!(kind, AssignmentKind::Simple);
    }

    #[test]
    fn compound_assignment_to_atomic_target_is_atomic_rmw() {
        let symbols = SymbolTable::new();
        let mut state = GenerationState::new();
        state.type_registry.insert(
            "counter".to_string(),
            crate::types::TypeInfo::scalar(crate::types::BaseType::U32).with_atomic(true),
        );
        let config = CodegenConfig::default();
        let stmt = AssignmentStmt {
            target: Expr::Identifier("counter".to_string()),
            op: SourceOp::AddAssign,
            value: Expr::IntLiteral(1, IntSuffix::None),
            line: None,
            column: None,
        };
        let ctx = build_context(&stmt, &mut state, &symbols, &config).unwrap();
        let kind = classify(&ctx, &state, &symbols);
        assert_eq!(kind, AssignmentKind::AtomicRmw);
    }
}
