//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers — no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!  SLEEPING ──[timer or line interrupt]──▶ SAMPLING
//!      ▲                                      │
//!      │                              [pass classified]
//!      │                                      ▼
//!      └───────[plan flushed]─────────── REPORTING
//! ```
//!
//! The Sampling handler owns the publish decision table:
//!
//! | Wake cause | Classification          | Published                |
//! |------------|-------------------------|--------------------------|
//! | interrupt  | NoChange                | nothing (quiet wake)     |
//! | interrupt  | BinaryChanged           | binary states            |
//! | interrupt  | BinaryAndCounterChanged | counters, binary states  |
//! | timer      | any                     | counters, binary states  |

use super::context::{CycleContext, PublishPlan};
use super::{StateDescriptor, StateId};
use crate::power::WakeReason;
use crate::sampling::Classification;
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Sleeping
        StateDescriptor {
            id: StateId::Sleeping,
            name: "Sleeping",
            on_enter: Some(sleeping_enter),
            on_exit: None,
            on_update: sleeping_update,
        },
        // Index 1 — Sampling
        StateDescriptor {
            id: StateId::Sampling,
            name: "Sampling",
            on_enter: None,
            on_exit: None,
            on_update: sampling_update,
        },
        // Index 2 — Reporting
        StateDescriptor {
            id: StateId::Reporting,
            name: "Reporting",
            on_enter: Some(reporting_enter),
            on_exit: None,
            on_update: reporting_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  SLEEPING state
// ═══════════════════════════════════════════════════════════════════════════

fn sleeping_enter(ctx: &mut CycleContext) {
    debug!(
        "SLEEPING: armed for {}s timer or line interrupt (cycle {})",
        ctx.config.report_interval_secs, ctx.cycles_completed
    );
}

fn sleeping_update(ctx: &mut CycleContext) -> Option<StateId> {
    // The service blocks in the sleep port and records the wake cause
    // before ticking; a recorded cause is the transition trigger.
    ctx.wake.map(|_| StateId::Sampling)
}

// ═══════════════════════════════════════════════════════════════════════════
//  SAMPLING state — one pass of the change/counter engine
// ═══════════════════════════════════════════════════════════════════════════

fn sampling_update(ctx: &mut CycleContext) -> Option<StateId> {
    // Wait until the service has run the engine and recorded the result.
    let classification = ctx.classification?;
    let wake = ctx.wake.unwrap_or(WakeReason::ReportTimer);

    ctx.plan = publish_plan_for(wake, classification);
    Some(StateId::Reporting)
}

/// The publish decision table (see module docs).
///
/// The heartbeat branch ignores the classification on purpose: a timer wake
/// is the periodic keep-alive and always reports counters + binary states.
pub(crate) fn publish_plan_for(wake: WakeReason, classification: Classification) -> PublishPlan {
    match wake {
        WakeReason::ReportTimer => PublishPlan::FULL,
        WakeReason::LineInterrupt => match classification {
            Classification::NoChange => PublishPlan::NONE,
            Classification::BinaryChanged => PublishPlan::BINARY_ONLY,
            Classification::BinaryAndCounterChanged => PublishPlan::FULL,
        },
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  REPORTING state — plan flush in progress
// ═══════════════════════════════════════════════════════════════════════════

fn reporting_enter(ctx: &mut CycleContext) {
    if ctx.plan.is_empty() {
        info!("REPORTING: quiet wake, nothing to publish");
    } else {
        debug!(
            "REPORTING: counters={} binary={}",
            ctx.plan.counters, ctx.plan.binary
        );
    }
}

fn reporting_update(ctx: &mut CycleContext) -> Option<StateId> {
    // The service flushes the plan and calls `complete_cycle()`; the
    // cleared wake cause signals that the cycle is done.
    if ctx.wake.is_none() {
        return Some(StateId::Sleeping);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_table_interrupt_branch() {
        assert_eq!(
            publish_plan_for(WakeReason::LineInterrupt, Classification::NoChange),
            PublishPlan::NONE
        );
        assert_eq!(
            publish_plan_for(WakeReason::LineInterrupt, Classification::BinaryChanged),
            PublishPlan::BINARY_ONLY
        );
        assert_eq!(
            publish_plan_for(
                WakeReason::LineInterrupt,
                Classification::BinaryAndCounterChanged
            ),
            PublishPlan::FULL
        );
    }

    #[test]
    fn decision_table_heartbeat_branch_ignores_classification() {
        for class in [
            Classification::NoChange,
            Classification::BinaryChanged,
            Classification::BinaryAndCounterChanged,
        ] {
            assert_eq!(
                publish_plan_for(WakeReason::ReportTimer, class),
                PublishPlan::FULL
            );
        }
    }
}
