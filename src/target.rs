//! Target capability flags that change which lowering a handler picks.

use serde::{Deserialize, Serialize};

/// Capabilities of the compilation target, consulted by the register-bit
/// and atomic handlers to pick between a CMSIS intrinsic, an LDREX/STREX
/// loop, or a plain disable-interrupts critical section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetCapabilities {
    /// Native machine word size in bits (32 or 64).
    pub word_size: u32,
    /// ARMv7-M/v8-M exclusive-access instructions are available.
    pub has_ldrex_strex: bool,
    /// Cortex-M `BASEPRI` register is available for priority-masking
    /// critical sections (falls back to `PRIMASK`/global interrupt disable
    /// when absent).
    pub has_basepri: bool,
}

impl TargetCapabilities {
    pub const fn cortex_m4() -> Self {
        TargetCapabilities {
            word_size: 32,
            has_ldrex_strex: true,
            has_basepri: true,
        }
    }

    pub const fn cortex_m0() -> Self {
        TargetCapabilities {
            word_size: 32,
            has_ldrex_strex: false,
            has_basepri: false,
        }
    }

    pub const fn generic_64bit() -> Self {
        TargetCapabilities {
            word_size: 64,
            has_ldrex_strex: false,
            has_basepri: false,
        }
    }
}

impl Default for TargetCapabilities {
    fn default() -> Self {
        TargetCapabilities::cortex_m4()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cortex_m0_lacks_exclusive_access() {
        let t = TargetCapabilities::cortex_m0();
        assert!(!t.has_ldrex_strex);
        assert!(!t.has_basepri);
    }

    #[test]
    fn default_is_cortex_m4() {
        assert_eq!(TargetCapabilities::default(), TargetCapabilities::cortex_m4());
    }

    #[test]
    fn round_trips_through_json() {
        let t = TargetCapabilities::cortex_m0();
        let json = serde_json::to_string(&t).unwrap();
        let back: TargetCapabilities = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
