//! The Context Builder: walks an assignment statement's LHS postfix chain
//! once, resolving scope/this/global prefixes and flattening it into the
//! immutable [`AssignmentContext`] bundle the classifier and every handler
//! read from afterward.

use crate::ast::{AssignmentStmt, Expr, PostfixOp, SourceOp};
use crate::error::{CodeGenError, HandlerError};
use crate::expr::calls::{SAFE_DIV, SAFE_MOD};
use crate::expr::{self, fold};
use crate::namemangler;
use crate::state::GenerationState;
use crate::symbols::SymbolTable;
use crate::config::CodegenConfig;
use crate::types::TypeInfo;

/// The immutable, fully-resolved bundle the classifier and handlers work
/// from. Built once per assignment statement and never mutated afterward —
/// any effect a handler needs to record goes onto [`GenerationState`]
/// instead.
#[derive(Debug, Clone)]
pub struct AssignmentContext {
    /// The LHS chain's names, in order: the base identifier (or the first
    /// member following a `this`/`global` prefix), then each subsequent
    /// `.member`.
    pub identifiers: Vec<String>,
    /// Every subscript expression in the chain, flattened in order; an
    /// `Index` contributes one, a `Slice` contributes two.
    pub subscripts: Vec<Expr>,
    /// The raw postfix operations, for handlers that need to know exact
    /// shape (e.g. whether a slice or a plain index was used).
    pub postfix_ops: Vec<PostfixOp>,
    pub has_this: bool,
    pub has_global: bool,
    pub op: SourceOp,
    pub c_op: &'static str,
    pub is_compound: bool,
    /// The already-emitted RHS C expression text.
    pub generated_value: String,
    /// The RHS AST node, retained for handlers that need to inspect its
    /// shape rather than just its rendered text (e.g. detecting a literal
    /// `0` write to a write-1-to-clear register).
    pub value_expr: Expr,
    pub first_id_type_info: Option<TypeInfo>,
    pub resolved_base_identifier: String,
    pub resolved_target: String,
    pub is_simple_identifier: bool,
    pub is_simple_this_access: bool,
    pub is_simple_global_access: bool,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

/// When the RHS is a direct `safe_div(a, b)`/`safe_mod(a, b)` call, its
/// lowering is a full replacement statement rather than an expression
/// fragment (see [`crate::expr::calls`]); the classifier dispatches on this
/// before anything else.
#[derive(Debug, Clone)]
pub struct SafeArithCall {
    pub helper: &'static str,
    pub numerator: String,
    pub denominator: String,
}

fn decompose_target(target: &Expr) -> (&Expr, &[PostfixOp]) {
    target.decompose()
}

fn resolve_identifier_type(name: &str, state: &GenerationState) -> Option<TypeInfo> {
    state.type_registry.get(name).cloned()
}

pub fn build_context(
    stmt: &AssignmentStmt,
    state: &mut GenerationState,
    symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<AssignmentContext, CodeGenError> {
    let (root, ops) = decompose_target(&stmt.target);

    let mut identifiers = Vec::new();
    let mut subscripts = Vec::new();
    let mut postfix_ops = Vec::new();
    let has_this;
    let has_global;
    let resolved_base_identifier;
    let head_len;

    let mut remaining = ops;

    match root {
        Expr::Identifier(name) if symbols.known_scopes.contains(name) => {
            // A bare `Scope.member` reference, with no `global.` prefix —
            // still a cross-scope access and subject to the same
            // own-scope-by-name and visibility rules as `global.Scope.member`.
            match remaining.split_first() {
                Some((PostfixOp::Member(member), rest)) => {
                    if state.current_scope.as_deref() == Some(name.as_str()) {
                        return Err(HandlerError::OwnScopeByName {
                            line: stmt.line,
                            scope: name.clone(),
                        }
                        .into());
                    }
                    if symbols.visibility_of(name, member) == crate::symbols::Visibility::Private {
                        return Err(HandlerError::CrossScopeInvisible {
                            line: stmt.line,
                            scope: name.clone(),
                            member: member.clone(),
                        }
                        .into());
                    }
                    has_this = false;
                    has_global = false;
                    identifiers.push(name.clone());
                    identifiers.push(member.clone());
                    resolved_base_identifier = namemangler::for_member(name, member, config);
                    postfix_ops.push(PostfixOp::Member(name.clone()));
                    postfix_ops.push(PostfixOp::Member(member.clone()));
                    remaining = rest;
                    head_len = 2;
                }
                _ => {
                    has_this = false;
                    has_global = false;
                    identifiers.push(name.clone());
                    resolved_base_identifier = name.clone();
                    head_len = 0;
                }
            }
        }
        Expr::Identifier(name) => {
            has_this = false;
            has_global = false;
            identifiers.push(name.clone());
            resolved_base_identifier = name.clone();
            head_len = 0;
        }
        Expr::This => {
            has_this = true;
            has_global = false;
            let scope = state
                .current_scope
                .clone()
                .ok_or(HandlerError::ThisOutsideScope { line: stmt.line })?;
            match remaining.split_first() {
                Some((PostfixOp::Member(member), rest)) => {
                    identifiers.push(member.clone());
                    resolved_base_identifier = namemangler::for_member(&scope, member, config);
                    postfix_ops.push(PostfixOp::Member(member.clone()));
                    remaining = rest;
                    head_len = 1;
                }
                _ => {
                    return Err(HandlerError::Internal(
                        "'this' must be followed by a member on an assignment target".to_string(),
                    )
                    .into());
                }
            }
        }
        Expr::Global => {
            has_this = false;
            has_global = true;
            match remaining.split_first() {
                Some((PostfixOp::Member(first), rest)) if symbols.known_scopes.contains(first) => {
                    match rest.split_first() {
                        Some((PostfixOp::Member(member), rest2)) => {
                            if state.current_scope.as_deref() == Some(first.as_str()) {
                                return Err(HandlerError::OwnScopeByName {
                                    line: stmt.line,
                                    scope: first.clone(),
                                }
                                .into());
                            }
                            identifiers.push(first.clone());
                            identifiers.push(member.clone());
                            resolved_base_identifier = namemangler::for_member(first, member, config);
                            postfix_ops.push(PostfixOp::Member(first.clone()));
                            postfix_ops.push(PostfixOp::Member(member.clone()));
                            remaining = rest2;
                            head_len = 2;
                        }
                        _ => {
                            return Err(HandlerError::Internal(
                                "'global.Scope' must be followed by a member".to_string(),
                            )
                            .into());
                        }
                    }
                }
                Some((PostfixOp::Member(name), rest)) => {
                    if state.type_registry.contains_key(name) || state.current_parameters.contains_key(name) {
                        return Err(HandlerError::GlobalShadowed {
                            line: stmt.line,
                            name: name.clone(),
                        }
                        .into());
                    }
                    identifiers.push(name.clone());
                    resolved_base_identifier = name.clone();
                    postfix_ops.push(PostfixOp::Member(name.clone()));
                    remaining = rest;
                    head_len = 1;
                }
                _ => {
                    return Err(HandlerError::Internal(
                        "'global' must be followed by a member on an assignment target".to_string(),
                    )
                    .into());
                }
            }
        }
        other => {
            return Err(HandlerError::Internal(format!(
                "unsupported assignment target root: {other:?}"
            ))
            .into());
        }
    }

    for op in remaining {
        postfix_ops.push(op.clone());
        match op {
            PostfixOp::Member(name) => identifiers.push(name.clone()),
            PostfixOp::Index(e) => subscripts.push((**e).clone()),
            PostfixOp::Slice(a, b) => {
                subscripts.push((**a).clone());
                subscripts.push((**b).clone());
            }
            PostfixOp::Property(_) | PostfixOp::Call(_) => {}
        }
    }

    let first_id_type_info = resolve_identifier_type(&resolved_base_identifier, state);

    // Only an `Index` that consumes a genuine array dimension becomes a `[n]`
    // in the resolved text; once those dimensions are used up, any further
    // `Index` is a bit selector a bit/bitmap handler applies separately and
    // must not be baked into the lvalue text.
    let mut remaining_dims = first_id_type_info
        .as_ref()
        .filter(|t| t.is_array)
        .and_then(|t| t.array_dimensions.as_ref())
        .map(Vec::len)
        .unwrap_or(0);

    // A plain (non-scope/this/global) base that is itself the current
    // function's struct-typed parameter is a pointer in C; its first member
    // hop needs `->`, not `.`. A callback-compatible parameter forces `->`
    // even in C++ mode. Only the first hop off the bare parameter gets this
    // treatment — this core doesn't type-check member access beyond it.
    let base_param = if head_len == 0 {
        state.current_parameters.get(&resolved_base_identifier)
    } else {
        None
    };
    let mut pending_pointer_sep = base_param.is_some_and(|p| p.is_struct || p.force_pointer_semantics);
    let force_pointer_sep = base_param.is_some_and(|p| p.force_pointer_semantics);

    let mut resolved_target = resolved_base_identifier.clone();
    for op in &postfix_ops[head_len..] {
        match op {
            PostfixOp::Member(name) => {
                if pending_pointer_sep {
                    let sep = if force_pointer_sep || !config.cpp_mode { "->" } else { "." };
                    resolved_target.push_str(sep);
                    pending_pointer_sep = false;
                } else {
                    resolved_target.push('.');
                }
                resolved_target.push_str(name);
            }
            PostfixOp::Index(e) => {
                if remaining_dims > 0 {
                    remaining_dims -= 1;
                    // A constant index is rendered literally so bounds checks
                    // downstream can read it back out of the text; a dynamic
                    // index is emitted through the expression emitter like
                    // any other subexpression, rather than silently dropped.
                    let index_text = match fold::fold_const_i64(e) {
                        Some(n) => n.to_string(),
                        None => expr::emit_expr(e, state, symbols, config)?,
                    };
                    resolved_target.push('[');
                    resolved_target.push_str(&index_text);
                    resolved_target.push(']');
                }
            }
            _ => {}
        }
    }

    let is_simple_identifier = !has_this && !has_global && identifiers.len() == 1 && subscripts.is_empty();
    let is_simple_this_access = has_this && identifiers.len() == 1 && subscripts.is_empty();
    let is_simple_global_access = has_global && identifiers.len() <= 2 && subscripts.is_empty();

    let expected_base = first_id_type_info.as_ref().map(|t| t.base_type);
    let (generated_value, value_expr) = state.with_expected_type(expected_base, |s| {
        expr::emit_expr(&stmt.value, s, symbols, config).map(|text| (text, stmt.value.clone()))
    })?;

    Ok(AssignmentContext {
        identifiers,
        subscripts,
        postfix_ops,
        has_this,
        has_global,
        op: stmt.op,
        c_op: stmt.op.c_op(),
        is_compound: stmt.op.is_compound(),
        generated_value,
        value_expr,
        first_id_type_info,
        resolved_base_identifier,
        resolved_target,
        is_simple_identifier,
        is_simple_this_access,
        is_simple_global_access,
        line: stmt.line,
        column: stmt.column,
    })
}

/// Detect a direct `value <- safe_div(a, b)` / `safe_mod(a, b)` shape on
/// the (not-yet-emitted) RHS before the generic expression emitter ever
/// sees it, since these two builtins only have a defined lowering in this
/// exact position.
pub fn detect_safe_arith_call(
    value: &Expr,
    state: &mut GenerationState,
    symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<Option<SafeArithCall>, CodeGenError> {
    let (root, ops) = value.decompose();
    if let Expr::Identifier(name) = root {
        if (name == SAFE_DIV || name == SAFE_MOD) && ops.len() == 1 {
            if let PostfixOp::Call(args) = &ops[0] {
                if args.len() == 2 {
                    let numerator = expr::emit_expr(&args[0], state, symbols, config)?;
                    let denominator = expr::emit_expr(&args[1], state, symbols, config)?;
                    let helper = if name == SAFE_DIV { SAFE_DIV } else { SAFE_MOD };
                    return Ok(Some(SafeArithCall {
                        helper,
                        numerator,
                        denominator,
                    }));
                }
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::IntSuffix;

    fn stmt(target: Expr, value: Expr) -> AssignmentStmt {
        AssignmentStmt {
            target,
            op: SourceOp::Assign,
            value,
            line: Some(10),
            column: Some(1),
        }
    }

    #[test]
    fn dynamic_array_index_is_emitted_not_dropped() {
        let mut state = GenerationState::new();
        state.type_registry.insert(
            "buf".to_string(),
            crate::types::TypeInfo::array_of(crate::types::BaseType::U8, vec![16]),
        );
        let symbols = SymbolTable::new();
        let config = CodegenConfig::default();
        let s = stmt(
            Expr::Postfix(
                Box::new(Expr::Identifier("buf".to_string())),
                vec![PostfixOp::Index(Box::new(Expr::Identifier("i".to_string())))],
            ),
            Expr::IntLiteral(0, IntSuffix::None),
        );
        let ctx = build_context(&s, &mut state, &symbols, &config).unwrap();
        assert_eq!(ctx.resolved_target, "buf[i]");
    }

    #[test]
    fn simple_identifier_context() {
        let mut state = GenerationState::new();
        let symbols = SymbolTable::new();
        let config = CodegenConfig::default();
        let s = stmt(
            Expr::Identifier("speed".to_string()),
            Expr::IntLiteral(5, IntSuffix::None),
        );
        let ctx = build_context(&s, &mut state, &symbols, &config).unwrap();
        assert!(ctx.is_simple_identifier);
        assert_eq!(ctx.identifiers, vec!["speed".to_string()]);
        assert_eq!(ctx.resolved_base_identifier, "speed");
        assert_eq!(ctx.generated_value, "5");
    }

    #[test]
    fn this_member_requires_current_scope() {
        let mut state = GenerationState::new();
        let symbols = SymbolTable::new();
        let config = CodegenConfig::default();
        let s = stmt(
            Expr::Postfix(Box::new(Expr::This), vec![PostfixOp::Member("speed".to_string())]),
            Expr::IntLiteral(1, IntSuffix::None),
        );
        let err = build_context(&s, &mut state, &symbols, &config).unwrap_err();
        assert!(err.to_string().contains("'this' used outside a scope body"));
    }

    #[test]
    fn this_member_resolves_with_scope_prefix() {
        let mut state = GenerationState::new();
        state.current_scope = Some("Motor".to_string());
        let symbols = SymbolTable::new();
        let config = CodegenConfig::default();
        let s = stmt(
            Expr::Postfix(Box::new(Expr::This), vec![PostfixOp::Member("speed".to_string())]),
            Expr::IntLiteral(1, IntSuffix::None),
        );
        let ctx = build_context(&s, &mut state, &symbols, &config).unwrap();
        assert!(ctx.is_simple_this_access);
        assert_eq!(ctx.resolved_base_identifier, "Motor_speed");
    }

    #[test]
    fn compound_op_flags_are_consistent() {
        let mut state = GenerationState::new();
        let symbols = SymbolTable::new();
        let config = CodegenConfig::default();
        let mut s = stmt(
            Expr::Identifier("speed".to_string()),
            Expr::IntLiteral(1, IntSuffix::None),
        );
        s.op = SourceOp::AddAssign;
        let ctx = build_context(&s, &mut state, &symbols, &config).unwrap();
        assert!(ctx.is_compound);
        assert_eq!(ctx.c_op, "+=");
    }

    #[test]
    fn bare_cross_scope_assignment_target_mangles_without_global_prefix() {
        let mut state = GenerationState::new();
        let mut symbols = SymbolTable::new();
        symbols.known_scopes.insert("Motor".to_string());
        let config = CodegenConfig::default();
        let s = stmt(
            Expr::Postfix(
                Box::new(Expr::Identifier("Motor".to_string())),
                vec![PostfixOp::Member("speed".to_string())],
            ),
            Expr::IntLiteral(1, IntSuffix::None),
        );
        let ctx = build_context(&s, &mut state, &symbols, &config).unwrap();
        assert_eq!(ctx.resolved_base_identifier, "Motor_speed");
    }

    #[test]
    fn private_cross_scope_assignment_target_is_rejected() {
        let mut state = GenerationState::new();
        let mut symbols = SymbolTable::new();
        symbols.known_scopes.insert("Motor".to_string());
        symbols
            .scope_member_visibility
            .entry("Motor".to_string())
            .or_default()
            .insert("secret".to_string(), crate::symbols::Visibility::Private);
        let config = CodegenConfig::default();
        let s = stmt(
            Expr::Postfix(
                Box::new(Expr::Identifier("Motor".to_string())),
                vec![PostfixOp::Member("secret".to_string())],
            ),
            Expr::IntLiteral(1, IntSuffix::None),
        );
        let err = build_context(&s, &mut state, &symbols, &config).unwrap_err();
        assert!(err.to_string().contains("not visible"));
    }

    #[test]
    fn struct_parameter_member_target_uses_arrow_in_c_mode() {
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
        let symbols = SymbolTable::new();
        let config = CodegenConfig::default();
        let s = stmt(
            Expr::Postfix(
                Box::new(Expr::Identifier("frame".to_string())),
                vec![PostfixOp::Member("count".to_string())],
            ),
            Expr::IntLiteral(1, IntSuffix::None),
        );
        let ctx = build_context(&s, &mut state, &symbols, &config).unwrap();
        assert_eq!(ctx.resolved_target, "frame->count");
    }

    #[test]
    fn struct_parameter_member_target_uses_dot_in_cpp_mode() {
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
        let symbols = SymbolTable::new();
        let config = CodegenConfig::default().with_cpp_mode(true);
        let s = stmt(
            Expr::Postfix(
                Box::new(Expr::Identifier("frame".to_string())),
                vec![PostfixOp::Member("count".to_string())],
            ),
            Expr::IntLiteral(1, IntSuffix::None),
        );
        let ctx = build_context(&s, &mut state, &symbols, &config).unwrap();
        assert_eq!(ctx.resolved_target, "frame.count");
    }

    #[test]
    fn callback_compatible_parameter_member_target_forces_arrow_in_cpp_mode() {
        let mut state = GenerationState::new();
        state.current_parameters.insert(
            "handler".to_string(),
            crate::state::ParamState {
                base_type_name: "FrameCallback".to_string(),
                is_array: false,
                is_struct: true,
                is_const: false,
                is_callback: true,
                is_string: false,
                force_pointer_semantics: true,
            },
        );
        let symbols = SymbolTable::new();
        let config = CodegenConfig::default().with_cpp_mode(true);
        let s = stmt(
            Expr::Postfix(
                Box::new(Expr::Identifier("handler".to_string())),
                vec![PostfixOp::Member("count".to_string())],
            ),
            Expr::IntLiteral(1, IntSuffix::None),
        );
        let ctx = build_context(&s, &mut state, &symbols, &config).unwrap();
        assert_eq!(ctx.resolved_target, "handler->count");
    }

    #[test]
    fn safe_div_rhs_is_detected() {
        let mut state = GenerationState::new();
        let symbols = SymbolTable::new();
        let config = CodegenConfig::default();
        let value = Expr::Postfix(
            Box::new(Expr::Identifier(SAFE_DIV.to_string())),
            vec![PostfixOp::Call(vec![
                Expr::Identifier("a".to_string()),
                Expr::Identifier("b".to_string()),
            ])],
        );
        let detected = detect_safe_arith_call(&value, &mut state, &symbols, &config)
            .unwrap()
            .unwrap();
        assert_eq!(detected.helper, SAFE_DIV);
        assert_eq!(detected.numerator, "a");
        assert_eq!(detected.denominator, "b");
    }
}
