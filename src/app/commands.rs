//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world — in this node's
//! case the external register layer, which can rewrite the report interval
//! over the air and request an immediate report.

/// Commands that external collaborators can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCommand {
    /// Change the heartbeat interval (seconds).  Out-of-range values are
    /// rejected and logged; accepted values take effect from the next sleep.
    SetReportInterval(u32),

    /// Publish counters and binary states immediately, outside the cycle.
    ForceReport,
}

/// Accepted range for the report interval.
pub const REPORT_INTERVAL_RANGE_SECS: core::ops::RangeInclusive<u32> = 10..=86_400;
