//! Function call argument handling.
//!
//! `safe_div`/`safe_mod` are intercepted before reaching this module — they
//! only have a defined lowering as the direct right-hand side of an
//! assignment (see [`crate::context::build_context`]), where they expand to
//! a single helper call threading `&target` as an out-parameter. Reaching
//! either name here means one was used in a nested expression position,
//! which this core does not support.

use crate::ast::Expr;
use crate::error::{CodeGenError, HandlerError};
use crate::state::GenerationState;
use crate::symbols::SymbolTable;
use crate::config::CodegenConfig;

pub const SAFE_DIV: &str = "safe_div";
pub const SAFE_MOD: &str = "safe_mod";

pub fn emit_call(
    callee: &Expr,
    args: &[Expr],
    state: &mut GenerationState,
    symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<String, CodeGenError> {
    let name = match callee {
        Expr::Identifier(n) => n.as_str(),
        _ => {
            return Err(HandlerError::Internal(
                "call target must be a simple identifier".to_string(),
            )
            .into());
        }
    };

    if name == SAFE_DIV || name == SAFE_MOD {
        return Err(HandlerError::Internal(format!(
            "'{name}' is only valid as the direct right-hand side of an assignment"
        ))
        .into());
    }

    let mut rendered_args = Vec::with_capacity(args.len());
    for (index, arg) in args.iter().enumerate() {
        rendered_args.push(emit_argument(arg, name, index, state, symbols, config)?);
    }
    Ok(format!("{name}({})", rendered_args.join(", ")))
}

/// True for expression shapes that are plain lvalues and can have `&`
/// taken of them directly (an identifier, `this.field`, a struct/array
/// chain) — as opposed to a literal or a computed temporary.
fn is_plain_lvalue(expr: &Expr) -> bool {
    matches!(expr, Expr::Identifier(_) | Expr::This | Expr::Postfix(_, _))
}

fn emit_argument(
    expr: &Expr,
    callee: &str,
    index: usize,
    state: &mut GenerationState,
    symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<String, CodeGenError> {
    let text = super::emit_expr(expr, state, symbols, config)?;

    // A callback-promoted struct parameter is already a pointer in its own
    // right; it flows through to the callee bare, never dereferenced and
    // never re-`&`-ed, regardless of what the formal otherwise wants.
    if let Expr::Identifier(name) = expr {
        if state
            .current_parameters
            .get(name)
            .is_some_and(|p| p.force_pointer_semantics)
        {
            return Ok(text);
        }
    }

    if let Some(sig) = symbols.function_signatures.get(callee) {
        if let Some(param) = sig.params.get(index) {
            if !param.is_const {
                if let Expr::Identifier(name) = expr {
                    if state.type_registry.get(name).is_some_and(|t| t.is_const) {
                        return Err(HandlerError::ConstToNonConst {
                            line: None,
                            target: name.clone(),
                        }
                        .into());
                    }
                }
            }
            if param.is_array {
                // Arrays already decay to a pointer; pass the name bare.
                return Ok(text);
            }
            if !param.is_const && is_plain_lvalue(expr) {
                return Ok(format!("&{text}"));
            }
            // Pass-by-value: an enum-class actual handed to a plain integer
            // formal needs an explicit conversion in C++ mode (an `enum
            // class` has no implicit conversion to its underlying type).
            if config.cpp_mode
                && !symbols.known_enums.contains(&param.base_type_name)
                && super::binary::enum_type_of(expr, state).is_some()
            {
                return Ok(format!("static_cast<{}>({text})", param.base_type_name));
            }
        }
    }
    Ok(text)
}
