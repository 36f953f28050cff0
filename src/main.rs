//! PulseNode Firmware — Main Entry Point
//!
//! Hexagonal architecture around an event-driven light-sleep cycle.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   ReportLink    LogEventSink   NvsAdapter     │
//! │  (Input+Supply+    (PublishPort) (EventSink)    (ConfigPort)   │
//! │   IrqControl)                                                  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              NodeService (pure logic)                  │    │
//! │  │  cycle FSM · LineRegistry · publish plan               │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  PowerManager (light sleep + pending flag + IRQ guard)         │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{debug, info, warn};

use pulsenode::adapters::hardware::HardwareAdapter;
use pulsenode::adapters::log_sink::LogEventSink;
use pulsenode::adapters::nvs::NvsAdapter;
use pulsenode::adapters::report_link::ReportLink;
use pulsenode::adapters::time::TimeAdapter;
use pulsenode::app::ports::ConfigPort;
use pulsenode::app::service::NodeService;
use pulsenode::config::NodeConfig;
use pulsenode::drivers::hw_init;
use pulsenode::drivers::watchdog::Watchdog;
use pulsenode::power::PowerManager;

/// TWDT bound for the awake portion of a cycle (sample + publish).
const WATCHDOG_TIMEOUT_MS: u32 = 30_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("PulseNode v{} starting", env!("CARGO_PKG_VERSION"));

    // ── 2. Peripheral bring-up ────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    let watchdog = Watchdog::new(WATCHDOG_TIMEOUT_MS);

    // ── 3. Load config from NVS (or defaults) ─────────────────
    let config = match NvsAdapter::new() {
        Ok(nvs) => nvs.load().unwrap_or_else(|e| {
            warn!("stored config unusable ({}), using defaults", e);
            NodeConfig::default()
        }),
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            NodeConfig::default()
        }
    };
    info!(
        "config: report every {}s, active level {:?}",
        config.report_interval_secs, config.active_level
    );

    // ── 4. Wire adapters and seed the service ─────────────────
    let mut hw = HardwareAdapter::new();
    let mut link = ReportLink::new();
    let mut sink = LogEventSink::new();
    let mut power = PowerManager::new();
    let time = TimeAdapter::new();

    let mut service = NodeService::new(config);

    // Startup sequence runs with line interrupts still disabled: seed the
    // registry, publish voltage + binary states + counters once.
    service.start(&mut hw, &mut link, &mut sink);

    // ── 5. Enable line-change interrupts, enter the steady loop ──
    if let Err(e) = hw_init::init_isr_service() {
        log::error!("ISR service init failed: {} — running on heartbeat only", e);
    }

    loop {
        service.run_cycle(&mut hw, &mut power, &mut link, &mut sink);
        watchdog.feed();
        debug!(
            "cycle {} done | uptime {}s | counters {:?}",
            service.cycles_completed(),
            time.uptime_secs(),
            service.counters()
        );
    }
}
