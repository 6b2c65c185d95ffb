//! Register-specific lowering: MMIO fast paths and access-mode checks.

use crate::symbols::RegisterAccess;

/// A byte-aligned, whole-byte-width write-only register range can skip the
/// read-modify-write dance entirely and write straight through a pointer,
/// since there is nothing to preserve: `*(volatile uint8_t *)(addr) = value;`
/// Returns `None` when the range isn't byte-aligned/byte-wide, in which
/// case the caller falls back to the general RMW path.
pub fn mmio_fast_path(
    base_address: u64,
    member_offset: u64,
    bit_offset: u32,
    bit_width: u32,
    access: RegisterAccess,
    value_expr: &str,
) -> Option<String> {
    if !access.is_write_only() {
        return None;
    }
    if bit_offset % 8 != 0 || !matches!(bit_width, 8 | 16 | 32 | 64) {
        return None;
    }
    let byte_addr = base_address + member_offset + u64::from(bit_offset / 8);
    let carrier = match bit_width {
        8 => "uint8_t",
        16 => "uint16_t",
        32 => "uint32_t",
        64 => "uint64_t",
        _ => unreachable!("checked above"),
    };
    Some(format!(
        "(*(volatile {carrier} *)(0x{byte_addr:08X})) = ({value_expr});"
    ))
}
