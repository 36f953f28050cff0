//! Application service — the hexagonal core.
//!
//! [`NodeService`] owns the cycle FSM, the line registry, and the shared
//! context.  It exposes a clean, hardware-agnostic API.  All I/O flows
//! through port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!   InputPort ──▶ ┌───────────────────────────┐ ──▶ PublishPort
//!   SleepPort ──▶ │        NodeService        │ ──▶ EventSink
//!  IrqControl ◀── │  FSM · LineRegistry       │
//!                 └───────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::NodeConfig;
use crate::fsm::context::CycleContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::power::{self, IrqGuard, WakeReason};
use crate::registers::{
    BinaryStates, CounterBank, Reportable, SupplyVoltage, MAX_REGISTER_SIZE,
};
use crate::sampling::LineRegistry;

use super::commands::{NodeCommand, REPORT_INTERVAL_RANGE_SECS};
use super::events::AppEvent;
use super::ports::{EventSink, InputPort, IrqControl, PublishPort, SleepPort, SupplyPort};

// ───────────────────────────────────────────────────────────────
// NodeService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates the whole wake/report lifecycle.
pub struct NodeService {
    fsm: Fsm,
    ctx: CycleContext,
    registry: LineRegistry,
}

impl NodeService {
    /// Construct the service from configuration.
    ///
    /// Does **not** seed the line registry — call [`start`] next.
    ///
    /// [`start`]: NodeService::start
    pub fn new(config: NodeConfig) -> Self {
        let registry = LineRegistry::new(&config);
        let ctx = CycleContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::Sleeping);

        Self { fsm, ctx, registry }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Run the boot-time startup sequence: one unconditional sampling pass
    /// to seed every last-known level, then publish supply voltage, binary
    /// states, and counters once, then enter the steady Sleeping state.
    ///
    /// Line interrupts must still be disabled when this runs; the caller
    /// enables them afterwards.
    pub fn start(
        &mut self,
        hw: &mut (impl InputPort + SupplyPort),
        link: &mut impl PublishPort,
        sink: &mut impl EventSink,
    ) {
        let classification = self.registry.sample(&*hw);
        sink.emit(&AppEvent::Started { classification });
        info!("NodeService seeded, initial classification {:?}", classification);

        let raw = hw.supply_raw(self.ctx.config.adc_settle_ms);
        Self::publish(&SupplyVoltage::from_raw(raw), link, sink);
        Self::publish(&BinaryStates::new(self.registry.state_bytes()), link, sink);
        Self::publish(&CounterBank::new(self.registry.counters()), link, sink);

        self.fsm.start(&mut self.ctx);
    }

    // ── Steady-state cycle ────────────────────────────────────

    /// Run one complete sleep → sample → report cycle.
    ///
    /// Blocks in the sleep port until the report timer elapses or a line
    /// interrupt fires.  From wake to re-arm, line interrupts are masked by
    /// an [`IrqGuard`] so no re-entrant sampling can be observed mid-pass.
    pub fn run_cycle(
        &mut self,
        hw: &mut (impl InputPort + IrqControl),
        sleep: &mut impl SleepPort,
        link: &mut impl PublishPort,
        sink: &mut impl EventSink,
    ) {
        let platform_wake =
            sleep.sleep_until_next_interval(self.ctx.config.report_interval_secs);

        // Critical section: no new line interrupt can be observed until the
        // guard drops at the end of the cycle.
        let _gate = IrqGuard::new(&*hw);

        // The pending flag, not the platform wake cause, is the authority:
        // an edge landing in the previous re-arm window still owes a pass.
        let wake = if power::interrupt_pending() {
            WakeReason::LineInterrupt
        } else {
            platform_wake
        };
        sink.emit(&AppEvent::WokeUp { reason: wake });

        if self.ctx.config.settle_ms > 0 {
            sleep.settle(self.ctx.config.settle_ms);
        }

        self.ctx.wake = Some(wake);
        self.fsm.tick(&mut self.ctx); // Sleeping -> Sampling

        let classification = self.registry.sample(&*hw);
        self.ctx.classification = Some(classification);
        sink.emit(&AppEvent::Sampled { classification });
        self.fsm.tick(&mut self.ctx); // Sampling -> Reporting, plan computed

        self.flush_plan(link, sink);

        // Consume the flag before the guard re-enables interrupts: an edge
        // arriving from here on is kept for the next cycle.
        power::clear_pending_interrupt();
        self.ctx.complete_cycle();
        self.fsm.tick(&mut self.ctx); // Reporting -> Sleeping
    }

    // ── Command handling ──────────────────────────────────────

    /// Process a command from the external register layer.
    /// Returns `true` when the configuration changed and should be
    /// persisted by the caller.
    pub fn handle_command(
        &mut self,
        command: NodeCommand,
        link: &mut impl PublishPort,
        sink: &mut impl EventSink,
    ) -> bool {
        match command {
            NodeCommand::SetReportInterval(secs) => {
                if !REPORT_INTERVAL_RANGE_SECS.contains(&secs) {
                    warn!("rejected report interval {}s (out of range)", secs);
                    return false;
                }
                self.ctx.config.report_interval_secs = secs;
                sink.emit(&AppEvent::ReportIntervalChanged { secs });
                info!("report interval set to {}s", secs);
                true
            }
            NodeCommand::ForceReport => {
                Self::publish(&CounterBank::new(self.registry.counters()), link, sink);
                Self::publish(&BinaryStates::new(self.registry.state_bytes()), link, sink);
                false
            }
        }
    }

    // ── Accessors ─────────────────────────────────────────────

    /// Current cycle state.
    pub fn current_state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Current pulse counter values, in line-index order.
    pub fn counters(&self) -> [u32; crate::pins::COUNTER_LINE_COUNT] {
        self.registry.counters()
    }

    /// Completed wake/report cycles since boot.
    pub fn cycles_completed(&self) -> u64 {
        self.ctx.cycles_completed
    }

    /// Currently effective configuration.
    pub fn config(&self) -> &NodeConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    /// Publish the registers selected by the current plan.
    /// Counters go out strictly before binary states — protocol contract.
    fn flush_plan(&self, link: &mut impl PublishPort, sink: &mut impl EventSink) {
        let plan = self.ctx.plan;
        if plan.is_empty() {
            sink.emit(&AppEvent::QuietWake);
            return;
        }
        if plan.counters {
            Self::publish(&CounterBank::new(self.registry.counters()), link, sink);
        }
        if plan.binary {
            Self::publish(&BinaryStates::new(self.registry.state_bytes()), link, sink);
        }
    }

    fn publish(register: &impl Reportable, link: &mut impl PublishPort, sink: &mut impl EventSink) {
        let mut buf = [0u8; MAX_REGISTER_SIZE];
        let n = register.encode(&mut buf);
        link.publish(register.id(), &buf[..n]);
        sink.emit(&AppEvent::Published {
            register: register.id(),
        });
    }
}
