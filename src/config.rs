//! System configuration parameters
//!
//! All tunable parameters for the PulseNode system.
//! Values can be overridden via NVS; the report interval is additionally
//! settable at runtime by the external register layer.

use serde::{Deserialize, Serialize};

use crate::sampling::Level;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    // --- Reporting ---
    /// Heartbeat interval (seconds).  Every interval the node wakes and
    /// publishes counters + binary states even if nothing changed.
    pub report_interval_secs: u32,

    // --- Counting ---
    /// Logic level that registers a pulse on a counter line.
    pub active_level: Level,
    /// Count a pulse on the very first observation after boot when a counter
    /// line already rests at the active level.  Deployed fleets expect
    /// `true`; `false` suppresses the startup count (the line is still
    /// reported as changed).
    pub count_initial_active: bool,

    // --- Timing ---
    /// Settle delay (milliseconds) between waking and sampling, to let
    /// contact bounce die down.  0 disables the delay.
    pub settle_ms: u32,
    /// Settle delay (milliseconds) for the ADC reference before the
    /// supply-voltage conversion.
    pub adc_settle_ms: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            // Reporting
            report_interval_secs: 600, // 10 min heartbeat

            // Counting
            active_level: Level::High,
            count_initial_active: true,

            // Timing
            settle_ms: 0,
            adc_settle_ms: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = NodeConfig::default();
        assert!(c.report_interval_secs > 0);
        assert_eq!(c.active_level, Level::High);
        assert!(c.count_initial_active);
        assert!(c.adc_settle_ms > 0);
    }

    #[test]
    fn serde_roundtrip() {
        let c = NodeConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: NodeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.report_interval_secs, c2.report_interval_secs);
        assert_eq!(c.active_level, c2.active_level);
        assert_eq!(c.count_initial_active, c2.count_initial_active);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = NodeConfig {
            report_interval_secs: 60,
            active_level: Level::Low,
            count_initial_active: false,
            settle_ms: 5,
            adc_settle_ms: 2,
        };
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: NodeConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c2.report_interval_secs, 60);
        assert_eq!(c2.active_level, Level::Low);
        assert!(!c2.count_initial_active);
    }
}
