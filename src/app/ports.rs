//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ NodeService (domain)
//! ```
//!
//! Driven adapters (line inputs, supply ADC, the publish link, sleep/wake,
//! event sinks, config storage) implement these traits.  The
//! [`NodeService`](super::service::NodeService) consumes them via generics,
//! so the domain core never touches hardware directly.

use crate::config::NodeConfig;
use crate::power::WakeReason;
use crate::registers::RegisterId;
use crate::sampling::Level;

// ───────────────────────────────────────────────────────────────
// Line input port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the sampling engine reads line levels through this.
///
/// A read is pure and side-effect-free — the locator is statically valid by
/// construction, so there is no error path — and must be safe to call while
/// line interrupts are masked.
pub trait InputPort {
    /// Instantaneous logic level of the line at `gpio`.
    fn level(&self, gpio: i32) -> Level;
}

// ───────────────────────────────────────────────────────────────
// Supply measurement port
// ───────────────────────────────────────────────────────────────

/// One-shot supply-rail conversion.
pub trait SupplyPort {
    /// Run a conversion of the internal reference and return the raw code.
    /// Blocks (bounded, short) for `settle_ms` plus the conversion itself.
    fn supply_raw(&mut self, settle_ms: u32) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Publish port (driven adapter: domain → communication stack)
// ───────────────────────────────────────────────────────────────

/// Hand a register's current payload to the external transport.
/// Fire-and-forget: the transport owns reliability, the domain never
/// observes a publish failure.
pub trait PublishPort {
    fn publish(&mut self, id: RegisterId, payload: &[u8]);
}

// ───────────────────────────────────────────────────────────────
// Sleep/wake port
// ───────────────────────────────────────────────────────────────

/// Blocking low-power wait.  This is the power-saving point of the whole
/// node — the call returns only when the report interval elapses or a
/// monitored line fires.
pub trait SleepPort {
    fn sleep_until_next_interval(&mut self, interval_secs: u32) -> WakeReason;

    /// Short blocking delay used for debounce settling after a wake.
    fn settle(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Line interrupt gate
// ───────────────────────────────────────────────────────────────

/// Mask/unmask the line-change interrupt sources.  Used through
/// [`IrqGuard`](crate::power::IrqGuard) so the unmask can never be skipped.
///
/// `&self` receivers: these are hardware interrupt-controller writes, not
/// adapter state changes, and the guard must coexist with concurrent
/// [`InputPort`] reads on the same adapter.
pub trait IrqControl {
    fn mask_line_irqs(&self);
    fn unmask_line_irqs(&self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, test
/// recorder, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists node configuration.
///
/// Implementations MUST validate config values before persisting; invalid
/// ranges are rejected with [`ConfigError::ValidationFailed`], not silently
/// clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`NodeConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<NodeConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &NodeConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
