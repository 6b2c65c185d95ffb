//! String-buffer lowering: the language's strings are fixed-capacity byte
//! arrays, so assignment is a bounded copy, not a pointer rebind.

/// `strncpy`-then-NUL-terminate a fixed-capacity buffer:
/// ```text
/// (void)strncpy(target, value, capacity);
/// target[capacity] = '\0';
/// ```
/// Two statements, joined with a newline, since MISRA's `strncpy` doesn't
/// guarantee NUL-termination when the source is as long as (or longer
/// than) the destination. The backing buffer is declared `capacity + 1`
/// bytes wide, so the terminator at index `capacity` is in bounds.
pub fn bounded_string_copy(target: &str, value_expr: &str, capacity: u32) -> String {
    format!(
        "(void)strncpy({target}, {value_expr}, {capacity}U);\n\
         {target}[{capacity}U] = '\\0';"
    )
}

/// String equality/inequality via `strcmp`.
pub fn string_compare(a: &str, b: &str, negate: bool) -> String {
    if negate {
        format!("(strcmp({a}, {b}) != 0)")
    } else {
        format!("(strcmp({a}, {b}) == 0)")
    }
}

/// `.char_count`: `strlen(value)`, cached by the caller in
/// [`crate::state::GenerationState::length_cache`] so repeated reads in one
/// statement reuse the first computed temporary.
pub fn char_count(value_expr: &str) -> String {
    format!("strlen({value_expr})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_copy_null_terminates_explicitly() {
        let s = bounded_string_copy("buf", "src", 16);
        assert!(s.contains("strncpy(buf, src, 16U)"));
        assert!(s.contains("buf[16U] = '\\0';"));
    }

    #[test]
    fn negated_compare_uses_not_equal() {
        assert_eq!(string_compare("a", "b", true), "(strcmp(a, b) != 0)");
        assert_eq!(string_compare("a", "b", false), "(strcmp(a, b) == 0)");
    }
}
