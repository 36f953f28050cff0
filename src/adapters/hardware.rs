//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Implements [`InputPort`], [`SupplyPort`], and [`IrqControl`] over the
//! raw GPIO/ADC helpers in [`hw_init`].  This is the only module besides
//! the drivers that touches actual hardware.  On non-espidf targets the
//! reads come from atomic injection cells so the whole stack runs on the
//! host.

use crate::app::ports::{InputPort, IrqControl, SupplyPort};
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;
use crate::sampling::Level;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, AtomicU64, Ordering};

// ── Host-side injection cells ─────────────────────────────────

/// Bit g = level of GPIO g.  Written by simulation/test code, read by
/// [`InputPort::level`].
#[cfg(not(target_os = "espidf"))]
static SIM_LINE_MASK: AtomicU64 = AtomicU64::new(0);

#[cfg(not(target_os = "espidf"))]
static SIM_SUPPLY_RAW: AtomicU16 = AtomicU16::new(341);

/// Inject a line level (host builds only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_line_level(gpio: i32, level: Level) {
    let bit = 1u64 << gpio;
    if level.is_high() {
        SIM_LINE_MASK.fetch_or(bit, Ordering::Relaxed);
    } else {
        SIM_LINE_MASK.fetch_and(!bit, Ordering::Relaxed);
    }
}

/// Inject a supply conversion code (host builds only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_supply_raw(raw: u16) {
    SIM_SUPPLY_RAW.store(raw, Ordering::Relaxed);
}

// ── Adapter ───────────────────────────────────────────────────

/// Concrete adapter that puts all hardware behind the port traits.
///
/// Stateless: GPIO and ADC access go through the one-shot-initialised
/// peripherals owned by `hw_init`.
pub struct HardwareAdapter;

impl HardwareAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HardwareAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ── InputPort implementation ──────────────────────────────────

impl InputPort for HardwareAdapter {
    #[cfg(target_os = "espidf")]
    fn level(&self, gpio: i32) -> Level {
        Level::from_high(hw_init::gpio_read(gpio))
    }

    #[cfg(not(target_os = "espidf"))]
    fn level(&self, gpio: i32) -> Level {
        Level::from_high(SIM_LINE_MASK.load(Ordering::Relaxed) & (1u64 << gpio) != 0)
    }
}

// ── SupplyPort implementation ─────────────────────────────────

impl SupplyPort for HardwareAdapter {
    #[cfg(target_os = "espidf")]
    fn supply_raw(&mut self, settle_ms: u32) -> u16 {
        // Let the reference settle before the one-shot conversion; the
        // conversion itself busy-waits inside the oneshot driver.
        if settle_ms > 0 {
            std::thread::sleep(std::time::Duration::from_millis(settle_ms.into()));
        }
        hw_init::adc1_read(pins::ADC1_CH_SUPPLY)
    }

    #[cfg(not(target_os = "espidf"))]
    fn supply_raw(&mut self, _settle_ms: u32) -> u16 {
        SIM_SUPPLY_RAW.load(Ordering::Relaxed)
    }
}

// ── IrqControl implementation ─────────────────────────────────

impl IrqControl for HardwareAdapter {
    fn mask_line_irqs(&self) {
        hw_init::mask_line_interrupts();
    }

    fn unmask_line_irqs(&self) {
        hw_init::unmask_line_interrupts();
    }
}
