//! Control Transfer
//!
//! The final jump to the loaded image. This cannot be an ordinary call: it
//! masks interrupts, issues the memory and instruction barriers that make
//! every store to loaded memory observable, optionally moves the main stack
//! pointer, and branches with the Thumb bit set. It never returns.
//!
//! Register protocol at entry, required by payload startup code:
//! - `r0` holds the handoff descriptor pointer
//! - `pc` is `entry | 1` (Cortex-M executes Thumb only)
//! - `PRIMASK` is set (interrupts masked)

use mimiboot_common::handoff::Handoff;

/// Jump to the payload entry point.
///
/// # Safety
///
/// `entry` must be the validated entry address of an image already loaded
/// into executable memory, and `handoff` must point to a fully built
/// descriptor that stays untouched by the bootloader from here on.
#[cfg(target_arch = "arm")]
pub unsafe fn jump(handoff: *const Handoff, entry: u32) -> ! {
    // Thumb bit: Cortex-M faults on an ARM-state branch target. Set outside
    // the asm body; orr-with-immediate does not encode on ARMv6-M.
    let target = entry | 1;
    core::arch::asm!(
        // Mask interrupts before anything else
        "cpsid i",
        // Make every store to loaded memory globally observable
        "dsb",
        "isb",
        "bx {target}",
        in("r0") handoff,
        target = in(reg) target,
        options(noreturn),
    )
}

/// Jump to the payload entry point with a fresh main stack pointer.
///
/// For payloads that expect `MSP` at a known value (typically top of RAM)
/// instead of setting it up themselves.
///
/// # Safety
///
/// As [`jump`], and `sp` must be a valid stack top for the payload.
#[cfg(target_arch = "arm")]
pub unsafe fn jump_with_sp(handoff: *const Handoff, entry: u32, sp: u32) -> ! {
    let target = entry | 1;
    core::arch::asm!(
        "cpsid i",
        "msr msp, {sp}",
        "dsb",
        "isb",
        "bx {target}",
        in("r0") handoff,
        target = in(reg) target,
        sp = in(reg) sp,
        options(noreturn),
    )
}

/// Host stand-in so the crate builds and tests off-target.
#[cfg(not(target_arch = "arm"))]
pub unsafe fn jump(handoff: *const Handoff, entry: u32) -> ! {
    let _ = handoff;
    panic!("control transfer to 0x{:08X} is only available on ARM targets", entry);
}

/// Host stand-in so the crate builds and tests off-target.
#[cfg(not(target_arch = "arm"))]
pub unsafe fn jump_with_sp(handoff: *const Handoff, entry: u32, sp: u32) -> ! {
    let _ = (handoff, sp);
    panic!("control transfer to 0x{:08X} is only available on ARM targets", entry);
}
