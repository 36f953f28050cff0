//! Mock adapters for integration tests.
//!
//! Record every publish and IRQ-gate call so tests can assert on the full
//! cycle history without touching real GPIO/ADC registers.

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use pulsenode::app::events::AppEvent;
use pulsenode::app::ports::{
    EventSink, InputPort, IrqControl, PublishPort, SleepPort, SupplyPort,
};
use pulsenode::pins::{BINARY_LINE_GPIOS, COUNTER_LINE_GPIOS};
use pulsenode::power::WakeReason;
use pulsenode::registers::RegisterId;
use pulsenode::sampling::Level;

// ── Pending-flag serialisation ────────────────────────────────

/// The pending-interrupt flag is process-global; tests that drive full
/// cycles hold this lock so they cannot observe each other's flag writes.
static FLAG_LOCK: Mutex<()> = Mutex::new(());

pub fn pending_flag_lock() -> MutexGuard<'static, ()> {
    FLAG_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    levels: HashMap<i32, Level>,
    pub supply_raw: u16,
    /// Current IRQ mask depth (mask = +1, unmask = −1).
    pub mask_depth: Cell<i32>,
    pub mask_calls: Cell<u32>,
    pub unmask_calls: Cell<u32>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            levels: HashMap::new(),
            supply_raw: 341, // ≈3.3 V rail
            mask_depth: Cell::new(0),
            mask_calls: Cell::new(0),
            unmask_calls: Cell::new(0),
        }
    }

    pub fn set_level(&mut self, gpio: i32, level: Level) {
        self.levels.insert(gpio, level);
    }

    /// Set a plain-binary line by group index.
    pub fn set_binary_line(&mut self, index: usize, level: Level) {
        self.set_level(BINARY_LINE_GPIOS[index], level);
    }

    /// Set a counter line by group index.
    pub fn set_counter_line(&mut self, index: usize, level: Level) {
        self.set_level(COUNTER_LINE_GPIOS[index], level);
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl InputPort for MockHardware {
    fn level(&self, gpio: i32) -> Level {
        self.levels.get(&gpio).copied().unwrap_or(Level::Low)
    }
}

impl SupplyPort for MockHardware {
    fn supply_raw(&mut self, _settle_ms: u32) -> u16 {
        self.supply_raw
    }
}

impl IrqControl for MockHardware {
    fn mask_line_irqs(&self) {
        self.mask_depth.set(self.mask_depth.get() + 1);
        self.mask_calls.set(self.mask_calls.get() + 1);
    }

    fn unmask_line_irqs(&self) {
        self.mask_depth.set(self.mask_depth.get() - 1);
        self.unmask_calls.set(self.unmask_calls.get() + 1);
    }
}

// ── MockSleep ─────────────────────────────────────────────────

/// Scripted sleep port: each cycle pops the next wake reason; an empty
/// script yields timer wakes.
pub struct MockSleep {
    pub wakes: VecDeque<WakeReason>,
}

#[allow(dead_code)]
impl MockSleep {
    pub fn new() -> Self {
        Self {
            wakes: VecDeque::new(),
        }
    }

    pub fn scripted(wakes: &[WakeReason]) -> Self {
        Self {
            wakes: wakes.iter().copied().collect(),
        }
    }
}

impl Default for MockSleep {
    fn default() -> Self {
        Self::new()
    }
}

impl SleepPort for MockSleep {
    fn sleep_until_next_interval(&mut self, _interval_secs: u32) -> WakeReason {
        self.wakes.pop_front().unwrap_or(WakeReason::ReportTimer)
    }

    fn settle(&mut self, _ms: u32) {}
}

// ── MockLink ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockLink {
    pub published: Vec<(RegisterId, Vec<u8>)>,
}

#[allow(dead_code)]
impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> Vec<RegisterId> {
        self.published.iter().map(|(id, _)| *id).collect()
    }

    pub fn last_payload(&self, id: RegisterId) -> Option<&[u8]> {
        self.published
            .iter()
            .rev()
            .find(|(pid, _)| *pid == id)
            .map(|(_, p)| p.as_slice())
    }
}

impl PublishPort for MockLink {
    fn publish(&mut self, id: RegisterId, payload: &[u8]) {
        self.published.push((id, payload.to_vec()));
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet_wakes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::QuietWake))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
