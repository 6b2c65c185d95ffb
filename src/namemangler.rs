//! Flattening scope-qualified and register-qualified names into single C
//! identifiers.
//!
//! Scopes, registers and bitmap members don't exist as C namespaces; every
//! cross-boundary reference collapses to one flat identifier joined with
//! the configured member separator (`_` in C, `::` in C++ mode).

use crate::config::CodegenConfig;

/// Join a scope name and a member name: `Motor`, `speed` -> `Motor_speed`.
pub fn for_member(scope: &str, member: &str, config: &CodegenConfig) -> String {
    format!("{scope}{}{member}", config.member_separator())
}

/// Join a register base name and member name: `GPIOA`, `ODR` -> `GPIOA_ODR`.
/// Registers are always flattened with `_`, independent of `cpp_mode` —
/// they name a single C struct/union member, not a C++ scope.
pub fn for_register_member(register: &str, member: &str) -> String {
    format!("{register}_{member}")
}

/// A register member additionally qualified by an enclosing scope, as in
/// `this.Motor_ctrl.enable` resolving to a scope-owned register instance:
/// `Motor_scopeName_ctrl_enable`.
pub fn for_scoped_register_member(scope: &str, register: &str, member: &str) -> String {
    format!("{scope}_{register}_{member}")
}

/// `Enum.Value` -> `Enum_Value` (C) or `Enum::Value` (C++).
pub fn for_enum_value(enum_name: &str, value: &str, config: &CodegenConfig) -> String {
    format!("{enum_name}{}{value}", config.member_separator())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_join_respects_cpp_mode() {
        let c = CodegenConfig::default();
        let cpp = CodegenConfig::default().with_cpp_mode(true);
        assert_eq!(for_member("Motor", "speed", &c), "Motor_speed");
        assert_eq!(for_member("Motor", "speed", &cpp), "Motor::speed");
    }

    #[test]
    fn register_member_always_flattens_with_underscore() {
        assert_eq!(for_register_member("GPIOA", "ODR"), "GPIOA_ODR");
    }

    #[test]
    fn scoped_register_member_joins_three_parts() {
        assert_eq!(
            for_scoped_register_member("Drivetrain", "Motor", "ctrl"),
            "Drivetrain_Motor_ctrl"
        );
    }
}
