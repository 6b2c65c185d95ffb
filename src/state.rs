//! Mutable code generation state threaded through a compilation unit.
//!
//! This is the single piece of mutable bookkeeping every handler and the
//! expression emitter read from and write into: the current scope/function,
//! locally declared names, accumulated `#include`/helper usage flags, and
//! the small scoped values (expected type, float-shadow freshness) that
//! need to be saved and restored around nested emission.

use std::collections::{HashMap, HashSet};

use crate::types::BaseType;

/// Shape of a function parameter as seen from inside its own body — the
/// subset `GenerationState` needs once the Context Builder or expression
/// emitter is resolving a bare name against the current function's
/// parameter list rather than the symbol table.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamState {
    pub base_type_name: String,
    pub is_array: bool,
    pub is_struct: bool,
    pub is_const: bool,
    pub is_callback: bool,
    pub is_string: bool,
    /// Declared `&T` in source; forces `*name` / `name->` rather than plain
    /// `name`/`name.` at every use site.
    pub force_pointer_semantics: bool,
}

/// Process-wide (per compilation unit) generation state.
///
/// Construct one per file being compiled, call [`GenerationState::reset`]
/// between independent compilation units if reusing the allocation, and
/// use [`GenerationState::enter_function`]/[`exit_function`] (or the RAII
/// [`FunctionScopeGuard`]) around each function body so locals don't leak
/// across function boundaries.
#[derive(Debug, Default)]
pub struct GenerationState {
    pub current_scope: Option<String>,
    pub current_function_name: Option<String>,
    pub current_parameters: HashMap<String, ParamState>,

    /// Types of locally declared variables, keyed by their bare source
    /// name. Combined with the symbol table's struct/register/bitmap maps,
    /// this is "the local type registry" the Context Builder consults to
    /// resolve `identifiers[0]`'s type.
    pub type_registry: HashMap<String, crate::types::TypeInfo>,
    pub local_arrays: HashSet<String>,

    /// Names of variables that already have a float-bit shadow integer
    /// declared in the current function.
    pub float_bit_shadows: HashSet<String>,
    /// Subset of `float_bit_shadows` whose shadow copy is still current
    /// (no write to the float variable has happened since the last copy).
    pub float_shadow_current: HashSet<String>,

    /// Declarations that must be hoisted to the top of the current
    /// function body rather than emitted inline (temporaries introduced by
    /// a nested safe-div/safe-mod call, bit-range scratch variables).
    pub pending_temp_declarations: Vec<String>,

    pub needs_stdint: bool,
    pub needs_stdbool: bool,
    pub needs_string: bool,
    pub needs_cmsis: bool,
    pub needs_limits: bool,
    pub needs_float_static_assert: bool,
    pub needs_isr_guard: bool,

    pub used_clamp_ops: HashSet<String>,
    pub used_safe_div_ops: HashSet<String>,
    pub used_safe_mod_ops: HashSet<String>,

    /// Expected type of the expression currently being emitted, consulted
    /// by literal emission to pick a suffix and by cast insertion. Scoped
    /// with [`GenerationState::with_expected_type`] rather than set/cleared
    /// by hand so a handler that returns early via `?` can never leave it
    /// stale for the next statement.
    expected_type: Option<BaseType>,

    pub suppress_bare_enum_resolution: bool,

    /// Name bound to `args` in `main`, when `main` declares a parameter
    /// (drives `.element_count`/`.capacity` on `args` resolving to `argc`).
    pub main_args_name: Option<String>,

    /// Cache of `strlen`-holding temporaries already emitted for a given
    /// string variable's `.char_count`, so repeated reads in the same
    /// statement reuse the first computation instead of recomputing it.
    pub length_cache: HashMap<String, String>,

    pub last_array_init_count: Option<u32>,
    pub last_array_fill_value: Option<String>,

    in_function_body: bool,
    temp_counter: usize,
}

impl GenerationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all per-compilation-unit state. The symbol table is a
    /// separate, independently-owned collaborator and is never touched
    /// here.
    pub fn reset(&mut self) {
        *self = GenerationState::default();
    }

    pub fn in_function_body(&self) -> bool {
        self.in_function_body
    }

    /// Generate a fresh, collision-free temporary name with the given
    /// prefix (e.g. `"bits"` -> `"__cnx_bits_3"`).
    pub fn fresh_temp(&mut self, prefix: &str) -> String {
        let n = self.temp_counter;
        self.temp_counter += 1;
        format!("__cnx_{prefix}_{n}")
    }

    /// Begin a function body: clear locals, parameters, and shadow state
    /// left over from a previous function, then install this function's
    /// parameters. Always pair with [`exit_function`], or use
    /// [`FunctionScopeGuard`] to get that pairing for free.
    pub fn enter_function(&mut self, name: impl Into<String>, params: HashMap<String, ParamState>) {
        self.current_function_name = Some(name.into());
        self.current_parameters = params;
        self.type_registry
            .retain(|_, _| false /* locals don't survive a function boundary */);
        self.local_arrays.clear();
        self.float_bit_shadows.clear();
        self.float_shadow_current.clear();
        self.pending_temp_declarations.clear();
        self.length_cache.clear();
        self.last_array_init_count = None;
        self.last_array_fill_value = None;
        self.in_function_body = true;
    }

    pub fn exit_function(&mut self) {
        self.current_function_name = None;
        self.current_parameters.clear();
        self.type_registry.clear();
        self.local_arrays.clear();
        self.float_bit_shadows.clear();
        self.float_shadow_current.clear();
        self.in_function_body = false;
    }

    /// Run `f` with `expected_type` temporarily set, restoring whatever was
    /// there before even if `f` short-circuits by returning early through
    /// `?` inside its own body — the restore runs unconditionally once `f`
    /// returns, like a `finally` block.
    pub fn with_expected_type<R>(
        &mut self,
        expected: Option<BaseType>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let previous = self.expected_type;
        self.expected_type = expected;
        let result = f(self);
        self.expected_type = previous;
        result
    }

    pub fn expected_type(&self) -> Option<BaseType> {
        self.expected_type
    }

    /// Acquire an RAII guard that clears function-local state on entry and
    /// restores the pre-function state when dropped, guaranteeing cleanup
    /// on every exit path including an early return or a panic unwind.
    pub fn enter_function_scoped(
        &mut self,
        name: impl Into<String>,
        params: HashMap<String, ParamState>,
    ) -> FunctionScopeGuard<'_> {
        self.enter_function(name, params);
        FunctionScopeGuard { state: self }
    }
}

/// Restores [`GenerationState`] to its pre-function condition when dropped.
/// See [`GenerationState::enter_function_scoped`].
pub struct FunctionScopeGuard<'a> {
    state: &'a mut GenerationState,
}

impl Drop for FunctionScopeGuard<'_> {
    fn drop(&mut self) {
        self.state.exit_function();
    }
}

impl std::ops::Deref for FunctionScopeGuard<'_> {
    type Target = GenerationState;
    fn deref(&self) -> &GenerationState {
        self.state
    }
}

impl std::ops::DerefMut for FunctionScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut GenerationState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_type_restores_after_scope() {
        let mut state = GenerationState::new();
        state.with_expected_type(Some(BaseType::U32), |s| {
            assert_eq!(s.expected_type(), Some(BaseType::U32));
        });
        assert_eq!(state.expected_type(), None);
    }

    #[test]
    fn expected_type_restores_even_through_nesting() {
        let mut state = GenerationState::new();
        state.with_expected_type(Some(BaseType::U8), |s| {
            s.with_expected_type(Some(BaseType::F32), |s2| {
                assert_eq!(s2.expected_type(), Some(BaseType::F32));
            });
            assert_eq!(s.expected_type(), Some(BaseType::U8));
        });
        assert_eq!(state.expected_type(), None);
    }

    #[test]
    fn fresh_temp_names_never_repeat() {
        let mut state = GenerationState::new();
        let a = state.fresh_temp("bits");
        let b = state.fresh_temp("bits");
        assert_ne!(a, b);
    }

    #[test]
    fn function_scope_guard_clears_locals_on_drop() {
        let mut state = GenerationState::new();
        {
            let mut guard = state.enter_function_scoped("update", HashMap::new());
            guard
                .type_registry
                .insert("x".to_string(), crate::types::TypeInfo::scalar(BaseType::U8));
            assert!(guard.in_function_body());
        }
        assert!(!state.in_function_body());
        assert!(state.type_registry.is_empty());
    }
}
