//! The Handler Registry: a lazily-built, total dispatch table from
//! [`AssignmentKind`] to the function that emits it.
//!
//! Each submodule owns a cohesive family of kinds and contributes its
//! `(kind, fn)` pairs through an `entries()` function; [`registry`] merges
//! them once, on first use, behind a [`std::sync::OnceLock`] so module
//! initialization order never matters. [`dispatch`] is the single call site
//! everything else in this crate goes through.

mod arrays;
mod atomic;
mod bitmaps;
mod bits;
mod clamp;
mod registers;
mod simple;
mod strings;

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::classify::AssignmentKind;
use crate::config::CodegenConfig;
use crate::context::AssignmentContext;
use crate::error::{CodeGenError, HandlerError};
use crate::state::GenerationState;
use crate::symbols::SymbolTable;

pub type HandlerFn = fn(
    &AssignmentContext,
    &mut GenerationState,
    &SymbolTable,
    &CodegenConfig,
) -> Result<String, CodeGenError>;

fn build_registry() -> HashMap<AssignmentKind, HandlerFn> {
    let mut map = HashMap::new();
    for (kind, handler) in arrays::entries()
        .into_iter()
        .chain(atomic::entries())
        .chain(bitmaps::entries())
        .chain(bits::entries())
        .chain(clamp::entries())
        .chain(registers::entries())
        .chain(simple::entries())
        .chain(strings::entries())
    {
        map.insert(kind, handler);
    }
    map
}

static REGISTRY: OnceLock<HashMap<AssignmentKind, HandlerFn>> = OnceLock::new();

fn registry() -> &'static HashMap<AssignmentKind, HandlerFn> {
    REGISTRY.get_or_init(build_registry)
}

/// Look up and invoke the handler for `kind`. Failing to find one means a
/// variant was added to [`AssignmentKind`] without a matching registration
/// — an internal bug, not a user-facing error.
pub fn dispatch(
    kind: AssignmentKind,
    ctx: &AssignmentContext,
    state: &mut GenerationState,
    symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<String, CodeGenError> {
    match registry().get(&kind) {
        Some(handler) => handler(ctx, state, symbols, config),
        None => Err(HandlerError::Internal(format!("no handler registered for {kind:?}")).into()),
    }
}
