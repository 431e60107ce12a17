/*
 * Scheduler Core - Mechanism Layer
 *
 * This module implements SchedulerCore, the stable mechanism layer that:
 * 1. Holds the active scheduling policy (Box<dyn Scheduler>)
 * 2. Provides the API the driver uses (fork, acquire, release, tick)
 * 3. Translates driver operations into SchedEvents
 * 4. Executes the policy's decision: retires the finished process and
 *    hands the CPU to the chosen one
 * 5. Keeps dispatch statistics
 *
 * The SchedulerCore separates "mechanism" (how the CPU changes hands) from
 * "policy" (which process runs next). Policies only move ProcessIds around
 * and return a choice; RUNNING status and the current pointer are written
 * here and nowhere else.
 */

use alloc::boxed::Box;
use alloc::collections::VecDeque;

use super::{
    context::SchedContext,
    error::SchedError,
    events::SchedEvent,
    policies::PolicyKind,
    process::{Process, ProcessId},
    traits::Scheduler,
    types::ResourceId,
};
use crate::config::TraceFlags;

/// Counters maintained by the mechanism layer
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    /// Total ticks elapsed
    pub total_ticks: u64,

    /// Ticks in which no process occupied the CPU
    pub idle_ticks: u64,

    /// Number of times the CPU changed hands to a different process
    pub context_switches: u64,

    /// acquire() calls that left the caller blocked
    pub blocked_acquires: u64,
}

/// Outcome of one reschedule
#[derive(Debug)]
pub struct DispatchDecision {
    /// Process now occupying the CPU, None when idle
    pub next: Option<ProcessId>,

    /// The previous process, if it finished and was retired
    pub retired: Option<Process>,
}

/// Scheduler Core - The Mechanism Layer
pub struct SchedulerCore {
    /// The active scheduling policy, fixed for the whole run
    policy: Box<dyn Scheduler>,

    stats: DispatchStats,
}

impl SchedulerCore {
    /// Create a new SchedulerCore with the given policy
    pub fn new(policy: Box<dyn Scheduler>) -> Self {
        log::info!("SchedulerCore initialized with policy: {}", policy.name());
        Self {
            policy,
            stats: DispatchStats::default(),
        }
    }

    pub fn with_kind(kind: PolicyKind) -> Self {
        Self::new(kind.build())
    }

    /// Get the name of the active policy
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// The active policy's private holding queue
    pub fn auxiliary(&self) -> Option<&VecDeque<ProcessId>> {
        self.policy.auxiliary()
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    pub fn initialize(&mut self, ctx: &mut SchedContext) -> Result<(), SchedError> {
        self.policy.initialize(ctx)
    }

    pub fn finalize(&mut self, ctx: &mut SchedContext) {
        self.policy.finalize(ctx);
        log::info!(
            "[{}] finalized: {} ticks, {} idle, {} switches",
            self.policy.name(),
            self.stats.total_ticks,
            self.stats.idle_ticks,
            self.stats.context_switches
        );
    }

    /// Admit a newly arrived process and tell the policy about it
    pub fn process_forked(&mut self, ctx: &mut SchedContext, process: Process) -> Result<ProcessId, SchedError> {
        let pid = ctx.admit(process)?;
        if ctx.traces(TraceFlags::LIFECYCLE) {
            log::info!("{} forked at tick {}", pid, ctx.ticks());
        }
        self.notify(ctx, SchedEvent::ProcessForked { pid });
        Ok(pid)
    }

    /// Retire a finished process
    ///
    /// The process must not hold a resource or sit in any queue.
    pub fn process_exiting(&mut self, ctx: &mut SchedContext, pid: ProcessId) -> Result<Process, SchedError> {
        if ctx.resources().owned_by(pid).next().is_some() {
            return Err(SchedError::QueuePartition(pid));
        }
        self.notify(ctx, SchedEvent::ProcessExiting { pid });
        let process = ctx.retire(pid)?;
        if ctx.traces(TraceFlags::LIFECYCLE) {
            log::info!("{} exited at tick {}", pid, ctx.ticks());
        }
        Ok(process)
    }

    /// Forward an event to the policy
    fn notify(&mut self, ctx: &mut SchedContext, event: SchedEvent) {
        if ctx.traces(TraceFlags::SCHEDULE) {
            log::trace!("[{}] {:?}", event.name(), event);
        }
        self.policy.on_event(ctx, event);
    }

    // ========================================================================
    // RESOURCES
    // ========================================================================

    /// The current process asks for `resource`
    pub fn acquire(&mut self, ctx: &mut SchedContext, resource: ResourceId) -> Result<bool, SchedError> {
        let acquired = self.policy.acquire(ctx, resource)?;
        if !acquired {
            self.stats.blocked_acquires += 1;
        }
        Ok(acquired)
    }

    /// The current process gives `resource` back
    pub fn release(&mut self, ctx: &mut SchedContext, resource: ResourceId) -> Result<(), SchedError> {
        self.policy.release(ctx, resource)
    }

    // ========================================================================
    // DISPATCH
    // ========================================================================

    /// Ask the policy who runs this tick and hand the CPU over
    ///
    /// A previous process that finished and was not reselected is retired
    /// before the hand-over.
    pub fn reschedule(&mut self, ctx: &mut SchedContext) -> Result<DispatchDecision, SchedError> {
        let prev = ctx.current();
        let next = self.policy.schedule(ctx)?;

        let mut retired = None;
        if let Some(prev) = prev.filter(|&p| Some(p) != next) {
            let process = ctx.proc(prev)?;
            if process.is_finished() && !process.is_blocked() {
                retired = Some(self.process_exiting(ctx, prev)?);
            }
        }

        ctx.dispatch(next)?;
        if next.is_some() && prev != next {
            self.stats.context_switches += 1;
        }
        if ctx.traces(TraceFlags::SCHEDULE) {
            match next {
                Some(pid) => log::debug!("[{:04}] {} -> {}", ctx.ticks(), self.policy.name(), pid),
                None => log::debug!("[{:04}] {} -> idle", ctx.ticks(), self.policy.name()),
            }
        }
        Ok(DispatchDecision { next, retired })
    }

    /// Close the current tick
    pub fn on_tick(&mut self, ctx: &mut SchedContext) {
        self.stats.total_ticks += 1;
        let current = ctx.current();
        if current.is_none() {
            self.stats.idle_ticks += 1;
        }

        let tick = ctx.ticks();
        ctx.advance_tick();
        self.notify(ctx, SchedEvent::Tick { tick, current });

        if ctx.traces(TraceFlags::STATUS) {
            ctx.dump_status();
        }
    }

    /// Audit queue membership, including the policy's holding queue
    pub fn verify(&self, ctx: &SchedContext) -> Result<(), SchedError> {
        ctx.verify_partition(self.policy.auxiliary())
    }
}

// ============================================================================
// DEBUG IMPLEMENTATION
// ============================================================================

impl core::fmt::Debug for SchedulerCore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SchedulerCore")
            .field("policy", &self.policy.name())
            .field("stats", &self.stats)
            .finish()
    }
}
