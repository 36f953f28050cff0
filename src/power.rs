//! Sleep/wake discipline for the report cycle.
//!
//! The node spends nearly all of its life in light sleep, armed with two
//! wake sources: the report-interval timer and a level change on any
//! monitored line.  This module owns the single piece of state shared with
//! interrupt context — the pending-interrupt flag — plus the ISR entry
//! point, the [`PowerManager`] that performs the blocking sleep, and the
//! RAII [`IrqGuard`] that brackets the sampling pass with line interrupts
//! masked.
//!
//! ```text
//! ┌──────────┐ edge  ┌──────────────┐ wake  ┌───────────────────────┐
//! │ line ISR │──────▶│ pending flag │──────▶│ main loop: mask IRQs, │
//! │ (any pin)│       │ (AtomicBool) │       │ sample, publish,      │
//! └──────────┘       └──────────────┘       │ clear flag, re-arm    │
//!                                           └───────────────────────┘
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(not(target_os = "espidf"))]
use log::debug;

use crate::app::ports::{IrqControl, SleepPort};

// ---------------------------------------------------------------------------
// Wake cause
// ---------------------------------------------------------------------------

/// Why the node woke from sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeReason {
    /// The report-interval timer elapsed (periodic heartbeat).
    ReportTimer,
    /// A monitored line changed level while asleep.
    LineInterrupt,
}

// ---------------------------------------------------------------------------
// Pending-interrupt flag
// ---------------------------------------------------------------------------

/// Set by the line-change ISR (or the GPIO wake path), consumed once per
/// cycle by the scheduler.  Invariant: set ⇒ at least one sampling pass is
/// owed before re-sleeping.
static LINE_IRQ_PENDING: AtomicBool = AtomicBool::new(false);

/// ISR entry — registered on every monitored line, any edge.
/// Lock-free; the only work done in interrupt context is this store.
pub fn line_change_isr_handler() {
    LINE_IRQ_PENDING.store(true, Ordering::Release);
}

/// Whether a line change is waiting to be sampled.
pub fn interrupt_pending() -> bool {
    LINE_IRQ_PENDING.load(Ordering::Acquire)
}

/// Mark the pending interrupt as consumed.  Called by the scheduler after
/// the sampling pass it triggered has been published, *before* line
/// interrupts are re-enabled, so an edge arriving during re-arm is kept.
pub fn clear_pending_interrupt() {
    LINE_IRQ_PENDING.store(false, Ordering::Release);
}

// ---------------------------------------------------------------------------
// Scoped interrupt masking
// ---------------------------------------------------------------------------

/// RAII bracket that masks line-change interrupts for the duration of a
/// sampling/reporting pass and guarantees re-enable on every exit path,
/// early returns and panics included.
pub struct IrqGuard<'a, T: IrqControl + ?Sized> {
    gate: &'a T,
}

impl<'a, T: IrqControl + ?Sized> IrqGuard<'a, T> {
    pub fn new(gate: &'a T) -> Self {
        gate.mask_line_irqs();
        Self { gate }
    }
}

impl<T: IrqControl + ?Sized> Drop for IrqGuard<'_, T> {
    fn drop(&mut self) {
        self.gate.unmask_line_irqs();
    }
}

// ---------------------------------------------------------------------------
// PowerManager
// ---------------------------------------------------------------------------

/// Blocking sleep provider.
///
/// On device: ESP-IDF light sleep armed with the report timer and GPIO
/// wake on the monitored lines.  GPIO wakes bypass the ISR path, so the
/// pending flag is raised here before returning.
///
/// On host: sleeps in short slices, waking early when the pending flag is
/// raised by simulation code — the same observable contract.
pub struct PowerManager;

impl PowerManager {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PowerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SleepPort for PowerManager {
    #[cfg(target_os = "espidf")]
    fn sleep_until_next_interval(&mut self, interval_secs: u32) -> WakeReason {
        use esp_idf_svc::sys::{
            esp_light_sleep_start, esp_sleep_enable_timer_wakeup, esp_sleep_get_wakeup_cause,
            esp_sleep_source_t_ESP_SLEEP_WAKEUP_GPIO,
        };

        crate::drivers::hw_init::arm_line_wakeups();

        // SAFETY: sleep configuration and entry are main-task-only calls;
        // light sleep resumes execution here with peripherals retained.
        unsafe {
            esp_sleep_enable_timer_wakeup(u64::from(interval_secs) * 1_000_000);
            esp_light_sleep_start();
        }

        // SAFETY: wakeup-cause query is a plain register read.
        let cause = unsafe { esp_sleep_get_wakeup_cause() };
        if cause == esp_sleep_source_t_ESP_SLEEP_WAKEUP_GPIO {
            // GPIO wake suppresses the normal ISR delivery; raise the flag
            // ourselves so the invariant (flag set ⇒ pass owed) holds.
            line_change_isr_handler();
            WakeReason::LineInterrupt
        } else {
            WakeReason::ReportTimer
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn sleep_until_next_interval(&mut self, interval_secs: u32) -> WakeReason {
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(interval_secs.into());
        while std::time::Instant::now() < deadline {
            if interrupt_pending() {
                debug!("PowerManager(sim): woken by line interrupt");
                return WakeReason::LineInterrupt;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        debug!("PowerManager(sim): report timer elapsed");
        WakeReason::ReportTimer
    }

    fn settle(&mut self, ms: u32) {
        if ms > 0 {
            std::thread::sleep(std::time::Duration::from_millis(ms.into()));
        }
    }
}
