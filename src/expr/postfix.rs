//! The postfix-chain read emitter: member access, subscripting, calls, and
//! the property pseudo-fields, folded left to right over a tracking state
//! record so later links in the chain can see what kind of thing the
//! earlier links resolved to.

use crate::ast::{Expr, PostfixOp, Property};
use crate::bitutils;
use crate::config::CodegenConfig;
use crate::error::{CodeGenError, HandlerError};
use crate::expr::calls;
use crate::namemangler;
use crate::state::GenerationState;
use crate::strutils;
use crate::symbols::SymbolTable;
use crate::types::TypeInfo;

/// What the chain has resolved to so far: the C text built up to this
/// point, and (when known) its type. `None` type means "keep emitting
/// textually, but no further typed checks (bounds, property validity) are
/// possible" — the fallback for shapes this core doesn't fully model
/// (arbitrary struct-field chains beyond the first hop).
#[derive(Default)]
struct Tracker {
    text: String,
    type_info: Option<TypeInfo>,
    is_bitmap_member: bool,
    bitmap_type: Option<String>,
    /// Set only for the `args` primary; drives `.element_count` resolving to
    /// `argc` instead of requiring an array type.
    is_args: bool,
    /// Set when the base this tracker resolved from is a struct-typed
    /// parameter of the current function — a pointer to its caller's
    /// storage, so the first member hop off of it needs `->` rather than
    /// `.` in C mode. Cleared once that first hop is applied; this core
    /// doesn't type-check deeper chains, the same shallow one-hop
    /// simplification the rest of this module already makes.
    is_pointer_base: bool,
    /// Set alongside `is_pointer_base` for a callback-compatible parameter:
    /// `->` is forced even in C++ mode, since the typedef it satisfies is a
    /// raw pointer regardless of language mode.
    force_pointer_member: bool,
}

/// Entry point: emit a primary expression followed by its postfix chain.
pub fn emit_postfix(
    base: &Expr,
    ops: &[PostfixOp],
    state: &mut GenerationState,
    symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<String, CodeGenError> {
    let (mut tracker, mut remaining) = resolve_root(base, ops, state, symbols, config)?;

    while let Some((op, rest)) = remaining.split_first() {
        apply_op(&mut tracker, op, state, symbols, config)?;
        remaining = rest;
    }

    Ok(tracker.text)
}

fn resolve_root<'a>(
    base: &Expr,
    ops: &'a [PostfixOp],
    state: &mut GenerationState,
    symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<(Tracker, &'a [PostfixOp]), CodeGenError> {
    match base {
        Expr::Identifier(name) if symbols.known_scopes.contains(name) => match ops.split_first() {
            Some((PostfixOp::Member(member), rest)) => {
                if state.current_scope.as_deref() == Some(name.as_str()) {
                    return Err(HandlerError::OwnScopeByName {
                        line: None,
                        scope: name.clone(),
                    }
                    .into());
                }
                if symbols.visibility_of(name, member) == crate::symbols::Visibility::Private {
                    return Err(HandlerError::CrossScopeInvisible {
                        line: None,
                        scope: name.clone(),
                        member: member.clone(),
                    }
                    .into());
                }
                let resolved = namemangler::for_member(name, member, config);
                let type_info = state.type_registry.get(&resolved).cloned();
                let is_bitmap = type_info.as_ref().is_some_and(|t| t.is_bitmap);
                let bitmap_type = type_info.as_ref().and_then(|t| t.bitmap_type_name.clone());
                Ok((
                    Tracker {
                        text: resolved,
                        type_info,
                        is_bitmap_member: is_bitmap,
                        bitmap_type,
                    ..Default::default()
                    },
                    rest,
                ))
            }
            _ => {
                let type_info = state.type_registry.get(name).cloned();
                Ok((
                    Tracker {
                        text: name.clone(),
                        type_info,
                        is_bitmap_member: false,
                        bitmap_type: None,
                    ..Default::default()
                    },
                    ops,
                ))
            }
        },
        Expr::Identifier(name) => {
            let type_info = state.type_registry.get(name).cloned();
            let is_bitmap = type_info.as_ref().is_some_and(|t| t.is_bitmap);
            let bitmap_type = type_info.as_ref().and_then(|t| t.bitmap_type_name.clone());
            let param = state.current_parameters.get(name);
            let is_pointer_base = param.is_some_and(|p| p.is_struct || p.force_pointer_semantics);
            let force_pointer_member = param.is_some_and(|p| p.force_pointer_semantics);
            Ok((
                Tracker {
                    text: name.clone(),
                    type_info,
                    is_bitmap_member: is_bitmap,
                    bitmap_type,
                    is_pointer_base,
                    force_pointer_member,
                ..Default::default()
                },
                ops,
            ))
        }
        Expr::This => {
            let scope = state
                .current_scope
                .clone()
                .ok_or(HandlerError::ThisOutsideScope { line: None })?;
            match ops.split_first() {
                Some((PostfixOp::Member(member), rest)) => {
                    let resolved = namemangler::for_member(&scope, member, config);
                    let type_info = state.type_registry.get(&resolved).cloned();
                    let is_bitmap = type_info.as_ref().is_some_and(|t| t.is_bitmap);
                    let bitmap_type = type_info.as_ref().and_then(|t| t.bitmap_type_name.clone());
                    Ok((
                        Tracker {
                            text: resolved,
                            type_info,
                            is_bitmap_member: is_bitmap,
                            bitmap_type,
                        ..Default::default()
                        },
                        rest,
                    ))
                }
                _ => Err(HandlerError::Internal("'this' must be followed by a member".to_string()).into()),
            }
        }
        Expr::Global => match ops.split_first() {
            Some((PostfixOp::Member(first), rest)) if symbols.known_scopes.contains(first) => {
                match rest.split_first() {
                    Some((PostfixOp::Member(member), rest2)) => {
                        if state.current_scope.as_deref() == Some(first.as_str()) {
                            return Err(HandlerError::OwnScopeByName {
                                line: None,
                                scope: first.clone(),
                            }
                            .into());
                        }
                        let resolved = namemangler::for_member(first, member, config);
                        let type_info = state.type_registry.get(&resolved).cloned();
                        let is_bitmap = type_info.as_ref().is_some_and(|t| t.is_bitmap);
                        let bitmap_type = type_info.as_ref().and_then(|t| t.bitmap_type_name.clone());
                        Ok((
                            Tracker {
                                text: resolved,
                                type_info,
                                is_bitmap_member: is_bitmap,
                                bitmap_type,
                            ..Default::default()
                            },
                            rest2,
                        ))
                    }
                    _ => Err(HandlerError::Internal(
                        "'global.Scope' must be followed by a member".to_string(),
                    )
                    .into()),
                }
            }
            Some((PostfixOp::Member(name), rest)) => {
                if state.type_registry.contains_key(name) || state.current_parameters.contains_key(name) {
                    return Err(HandlerError::GlobalShadowed {
                        line: None,
                        name: name.clone(),
                    }
                    .into());
                }
                let type_info = state.type_registry.get(name).cloned();
                Ok((
                    Tracker {
                        text: name.clone(),
                        type_info,
                        is_bitmap_member: false,
                        bitmap_type: None,
                    ..Default::default()
                    },
                    rest,
                ))
            }
            _ => Err(HandlerError::Internal("'global' must be followed by a member".to_string()).into()),
        },
        Expr::Args => {
            let text = state.main_args_name.clone().unwrap_or_else(|| "args".to_string());
            Ok((
                Tracker {
                    text,
                    type_info: None,
                    is_bitmap_member: false,
                    bitmap_type: None,
                    is_args: true,
                    ..Default::default()
                },
                ops,
            ))
        }
        other => {
            let text = super::emit_expr(other, state, symbols, config)?;
            Ok((
                Tracker {
                    text,
                    type_info: None,
                    is_bitmap_member: false,
                    bitmap_type: None,
                ..Default::default()
                },
                ops,
            ))
        }
    }
}

fn apply_op(
    tracker: &mut Tracker,
    op: &PostfixOp,
    state: &mut GenerationState,
    symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<(), CodeGenError> {
    match op {
        PostfixOp::Member(name) => apply_member(tracker, name, state, symbols, config),
        PostfixOp::Index(index_expr) => apply_index(tracker, index_expr, state, symbols, config),
        PostfixOp::Slice(start, width) => apply_slice(tracker, start, width, state, symbols, config),
        PostfixOp::Call(args) => {
            let callee = Expr::Identifier(tracker.text.clone());
            tracker.text = calls::emit_call(&callee, args, state, symbols, config)?;
            tracker.type_info = None;
            Ok(())
        }
        PostfixOp::Property(p) => apply_property(tracker, *p, state),
    }
}

fn apply_member(
    tracker: &mut Tracker,
    name: &str,
    state: &GenerationState,
    symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<(), CodeGenError> {
    if tracker.is_bitmap_member {
        let bitmap_type = tracker.bitmap_type.clone().unwrap_or_default();
        let field = symbols.bitmap_field(&bitmap_type, name).ok_or_else(|| {
            HandlerError::UnknownBitmapField {
                line: None,
                bitmap: bitmap_type.clone(),
                field: name.to_string(),
            }
        })?;
        let is64 = tracker
            .type_info
            .as_ref()
            .map(|t| t.base_type.is_64bit())
            .unwrap_or(false);
        tracker.text = if field.width == 1 {
            bitutils::single_bit_read(&tracker.text, &field.offset.to_string(), is64)
        } else {
            bitutils::bit_range_read(&tracker.text, &field.offset.to_string(), field.width, is64)
        };
        tracker.is_bitmap_member = false;
        tracker.bitmap_type = None;
        tracker.type_info = None;
        return Ok(());
    }

    // Enum-qualified value: `Enum.Value` -> `Enum_Value`/`Enum::Value`.
    if symbols.known_enums.contains(&tracker.text) {
        tracker.text = namemangler::for_enum_value(&tracker.text, name, config);
        return Ok(());
    }

    // Register member: a `wo`/`w1s`/`w1c` member can never be safely read
    // back, so reading one outright (not just writing one without RMW) is
    // rejected here, before the generic member-join fallback below would
    // otherwise silently emit a plain read of unreadable hardware state.
    let register_candidate = namemangler::for_register_member(&tracker.text, name);
    if let Some(access) = symbols.register_access(&register_candidate) {
        if !access.is_readable() {
            return Err(HandlerError::WriteOnlyRead {
                line: None,
                member: register_candidate,
            }
            .into());
        }
        tracker.type_info = state.type_registry.get(&register_candidate).cloned();
        tracker.is_bitmap_member = tracker.type_info.as_ref().is_some_and(|t| t.is_bitmap);
        tracker.bitmap_type = tracker.type_info.as_ref().and_then(|t| t.bitmap_type_name.clone());
        tracker.text = register_candidate;
        return Ok(());
    }

    // Struct-parameter member: `->` in C mode, `.` in C++ mode, but `->`
    // forced for a callback-compatible parameter regardless of mode.
    if tracker.is_pointer_base {
        let sep = if tracker.force_pointer_member || !config.cpp_mode { "->" } else { "." };
        tracker.text = format!("{}{sep}{name}", tracker.text);
        tracker.type_info = None;
        tracker.is_pointer_base = false;
        tracker.force_pointer_member = false;
        return Ok(());
    }

    tracker.text = format!("{}.{name}", tracker.text);
    tracker.type_info = None;
    Ok(())
}

fn apply_index(
    tracker: &mut Tracker,
    index_expr: &Expr,
    state: &mut GenerationState,
    symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<(), CodeGenError> {
    if tracker.is_bitmap_member {
        return Err(HandlerError::BracketOnBitmapMember {
            line: None,
            member: tracker.text.clone(),
        }
        .into());
    }

    // A single `[i]` on a known non-array, non-string (scalar) target is a
    // bit read, not a subscript; a target the type registry knows to be an
    // array, or a fixed-capacity string (its buffer is byte-indexed like
    // one), keeps `x[i]` text. An unresolved chain (`type_info` is `None`)
    // keeps the array-subscript fallback too, matching this module's
    // existing "no further typed checks past the first hop" simplification.
    let is_known_scalar = tracker.type_info.as_ref().is_some_and(|t| !t.is_array && !t.is_string);
    if is_known_scalar {
        let base_type = tracker.type_info.as_ref().map(|t| t.base_type).unwrap_or(crate::types::BaseType::U32);
        if base_type.is_float() {
            if !state.in_function_body() {
                return Err(HandlerError::FloatBitAtGlobalScope { line: None }.into());
            }
            let (shadow, copy_in) = bitutils::ensure_float_shadow(&tracker.text, base_type.is_64bit(), state);
            let index_text = super::emit_expr(index_expr, state, symbols, config)?;
            let read = bitutils::single_bit_read(&format!("{shadow}.u"), &index_text, base_type.is_64bit());
            tracker.text = match copy_in {
                // A read is an expression, not a statement, so the copy-in
                // rides the C comma operator rather than a leading `;`.
                Some(_) => format!("({shadow}.f = {}, {read})", tracker.text),
                None => read,
            };
        } else {
            let index_text = super::emit_expr(index_expr, state, symbols, config)?;
            tracker.text = bitutils::single_bit_read(&tracker.text, &index_text, base_type.is_64bit());
        }
        tracker.type_info = None;
        return Ok(());
    }

    if let Some(info) = &tracker.type_info {
        if let Some(dims) = &info.array_dimensions {
            if let Some(len) = dims.first() {
                if let Some(index) = crate::expr::fold::fold_const_i64(index_expr) {
                    if index < 0 || index >= i64::from(*len) {
                        return Err(HandlerError::ArrayIndexOutOfBounds {
                            line: None,
                            index,
                            len: *len,
                        }
                        .into());
                    }
                }
            }
        }
    }
    let index_text = super::emit_expr(index_expr, state, symbols, config)?;
    tracker.text = format!("{}[{index_text}]", tracker.text);
    if let Some(info) = &mut tracker.type_info {
        if let Some(dims) = &mut info.array_dimensions {
            if dims.len() > 1 {
                dims.remove(0);
            } else {
                info.is_array = false;
                info.array_dimensions = None;
            }
        }
    }
    Ok(())
}

fn apply_slice(
    tracker: &mut Tracker,
    start: &Expr,
    width: &Expr,
    state: &mut GenerationState,
    symbols: &SymbolTable,
    config: &CodegenConfig,
) -> Result<(), CodeGenError> {
    let (start_c, width_c) = crate::expr::fold::fold_slice_bounds(start, width)
        .ok_or(HandlerError::SliceNonConst { line: None })?;
    let max = tracker
        .type_info
        .as_ref()
        .map(|t| t.base_type.bit_width())
        .unwrap_or(32);
    if start_c < 0 || width_c < 0 || start_c + width_c > i64::from(max) {
        return Err(HandlerError::SliceOutOfBounds {
            line: None,
            start: start_c,
            width: width_c,
            max,
        }
        .into());
    }
    let is_float = tracker.type_info.as_ref().is_some_and(|t| t.base_type.is_float());
    let is64 = tracker.type_info.as_ref().map(|t| t.base_type.is_64bit()).unwrap_or(false);
    let start_text = super::emit_expr(start, state, symbols, config)?;
    if is_float {
        if !state.in_function_body() {
            return Err(HandlerError::FloatBitAtGlobalScope { line: None }.into());
        }
        let (shadow, copy_in) = bitutils::ensure_float_shadow(&tracker.text, is64, state);
        let read = bitutils::bit_range_read(&format!("{shadow}.u"), &start_text, width_c as u32, is64);
        tracker.text = match copy_in {
            Some(_) => format!("({shadow}.f = {}, {read})", tracker.text),
            None => read,
        };
    } else {
        tracker.text = bitutils::bit_range_read(&tracker.text, &start_text, width_c as u32, is64);
        // The read's C type is the usual arithmetic promotion of the shift,
        // `int` — narrower than that when the context expects a narrow
        // target needs an explicit MISRA Rule 10.3 cast back down.
        if config.misra_casts {
            if let Some(expected) = state.expected_type() {
                if matches!(
                    expected,
                    crate::types::BaseType::U8 | crate::types::BaseType::U16 | crate::types::BaseType::I8 | crate::types::BaseType::I16
                ) {
                    tracker.text = bitutils::narrowing_cast(expected, &tracker.text);
                }
            }
        }
    }
    tracker.type_info = None;
    Ok(())
}

fn apply_property(
    tracker: &mut Tracker,
    property: Property,
    state: &mut GenerationState,
) -> Result<(), CodeGenError> {
    match property {
        Property::LegacyLength => return Err(HandlerError::DeprecatedLength { line: None }.into()),
        Property::ElementCount => {
            if tracker.is_args {
                tracker.text = "argc".to_string();
                tracker.type_info = None;
                return Ok(());
            }
            let len: u32 = tracker
                .type_info
                .as_ref()
                .and_then(|t| t.array_dimensions.as_ref())
                .and_then(|d| d.first().copied())
                .ok_or(HandlerError::ElementCountOnNonArray { line: None })?;
            tracker.text = len.to_string();
            tracker.type_info = None;
        }
        Property::CharCount => {
            if !tracker.type_info.as_ref().map(|t| t.is_string).unwrap_or(false) {
                return Err(HandlerError::CharCountOnNonString { line: None }.into());
            }
            if let Some(cached) = state.length_cache.get(&tracker.text) {
                tracker.text = cached.clone();
            } else {
                let temp = state.fresh_temp("len");
                let call = strutils::char_count(&tracker.text);
                state.length_cache.insert(tracker.text.clone(), temp.clone());
                state
                    .pending_temp_declarations
                    .push(format!("size_t {temp} = {call};"));
                tracker.text = temp;
            }
            tracker.type_info = None;
        }
        Property::Capacity => {
            let cap = tracker
                .type_info
                .as_ref()
                .and_then(|t| t.string_capacity)
                .ok_or(HandlerError::CharCountOnNonString { line: None })?;
            tracker.text = cap.to_string();
            tracker.type_info = None;
        }
        Property::Size => {
            let bytes = match &tracker.type_info {
                Some(t) if t.is_string => t
                    .string_capacity
                    .map(|c| c + 1)
                    .ok_or(HandlerError::CharCountOnNonString { line: None })?,
                other => bit_length_of(other.as_ref()) / 8,
            };
            tracker.text = bytes.to_string();
            tracker.type_info = None;
        }
        Property::ByteLength => {
            tracker.text = (bit_length_of(tracker.type_info.as_ref()) / 8).to_string();
            tracker.type_info = None;
        }
        Property::BitLength => {
            tracker.text = bit_length_of(tracker.type_info.as_ref()).to_string();
            tracker.type_info = None;
        }
    }
    Ok(())
}

/// Bit width a `.bit_length`/`.byte_length` reads off: a string buffer's
/// full backing storage including its NUL terminator, an array's element
/// count times its element width (over whatever dimensions the chain
/// hasn't already indexed away), or a scalar's own declared width.
fn bit_length_of(info: Option<&TypeInfo>) -> u32 {
    match info {
        Some(t) if t.is_string => t.string_capacity.unwrap_or(0).saturating_add(1) * 8,
        Some(t) if t.is_array => {
            let elements: u32 = t
                .array_dimensions
                .as_ref()
                .map(|dims| dims.iter().product())
                .unwrap_or(1);
            elements * t.base_type.bit_width()
        }
        Some(t) => t.base_type.bit_width(),
        None => 32,
    }
}
