/*
 * Round-Robin Scheduling Policy
 *
 * This module implements a preemptive round-robin policy with a one-tick
 * quantum. The running process is expired after every tick it ran and is
 * parked in a private queue of expired processes rather than going straight
 * back to the readyqueue. This splits the ready set into "not yet run this
 * round" (readyqueue) and "already run this round" (expired), so every ready
 * process gets one turn before anyone repeats.
 *
 * When the readyqueue runs dry the expired queue is drained back into it in
 * the order the processes expired, and the next round starts.
 */

use alloc::collections::VecDeque;

use super::super::{
    context::SchedContext,
    error::SchedError,
    events::SchedEvent,
    process::ProcessId,
    protocols::ResourceProtocol,
    traits::Scheduler,
    types::ResourceId,
};
use crate::config::TraceFlags;

/// Round-Robin scheduling policy
pub struct RoundRobinPolicy {
    /// Processes that already ran in the current round, in expiry order
    expired: VecDeque<ProcessId>,

    /// Number of completed rounds
    rounds: u64,
}

impl RoundRobinPolicy {
    /// Create a new Round-Robin policy
    pub fn new() -> Self {
        Self {
            expired: VecDeque::new(),
            rounds: 0,
        }
    }

    /// Number of times the expired queue was drained into the readyqueue
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Start a new round: move every expired process back to the readyqueue
    fn start_round(&mut self, ctx: &mut SchedContext) -> Result<(), SchedError> {
        if ctx.traces(TraceFlags::SCHEDULE) {
            log::debug!("[RR Policy] Round {} over, {} expired", self.rounds, self.expired.len());
        }
        while let Some(pid) = self.expired.pop_front() {
            ctx.enqueue_ready(pid)?;
        }
        self.rounds += 1;
        Ok(())
    }
}

impl Scheduler for RoundRobinPolicy {
    fn name(&self) -> &'static str {
        "Round-Robin"
    }

    fn acquire(&mut self, ctx: &mut SchedContext, resource: ResourceId) -> Result<bool, SchedError> {
        ResourceProtocol::Fcfs.acquire(ctx, resource)
    }

    fn release(&mut self, ctx: &mut SchedContext, resource: ResourceId) -> Result<(), SchedError> {
        ResourceProtocol::Fcfs.release(ctx, resource)
    }

    fn schedule(&mut self, ctx: &mut SchedContext) -> Result<Option<ProcessId>, SchedError> {
        // Quantum is one tick: a still-runnable process always expires
        if let Some(current) = ctx.runnable_current()? {
            ctx.set_ready(current)?;
            self.expired.push_back(current);
        }

        if ctx.readyqueue().is_empty() && !self.expired.is_empty() {
            self.start_round(ctx)?;
        }
        Ok(ctx.pop_ready())
    }

    fn finalize(&mut self, ctx: &mut SchedContext) {
        if !self.expired.is_empty() && self.start_round(ctx).is_err() {
            log::warn!("[RR Policy] Failed to return expired processes on finalize");
        }
    }

    fn on_event(&mut self, _ctx: &mut SchedContext, event: SchedEvent) {
        match event {
            SchedEvent::ProcessExiting { pid } => {
                // Retired processes must not linger in the expired queue
                self.expired.retain(|&id| id != pid);
            }
            _ => {
                // Arrivals go straight to the readyqueue, nothing to track
            }
        }
    }

    fn auxiliary(&self) -> Option<&VecDeque<ProcessId>> {
        Some(&self.expired)
    }
}

impl Default for RoundRobinPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{Priority, Process};

    /// Schedule and dispatch one tick, aging the chosen process
    fn tick(policy: &mut RoundRobinPolicy, ctx: &mut SchedContext) -> Option<ProcessId> {
        let prev = ctx.current();
        let next = policy.schedule(ctx).unwrap();
        if let Some(prev) = prev.filter(|&p| Some(p) != next) {
            if ctx.process(prev).unwrap().is_finished() {
                ctx.retire(prev).unwrap();
            }
        }
        ctx.dispatch(next).unwrap();
        ctx.verify_partition(policy.auxiliary()).unwrap();
        if let Some(pid) = next {
            ctx.process_mut(pid).unwrap().age += 1;
        }
        next
    }

    #[test]
    fn test_everyone_runs_once_per_round() {
        let mut ctx = SchedContext::new(1, Priority::MAX);
        for id in 1..=3 {
            ctx.admit(Process::new(ProcessId(id), 10, Priority(0)))
                .unwrap();
        }
        let mut policy = RoundRobinPolicy::new();

        let order: alloc::vec::Vec<_> = (0..7)
            .map(|_| tick(&mut policy, &mut ctx).unwrap().0)
            .collect();
        assert_eq!(order, [1, 2, 3, 1, 2, 3, 1]);
        assert_eq!(policy.rounds(), 2);
    }

    #[test]
    fn test_lone_process_keeps_running() {
        let mut ctx = SchedContext::new(1, Priority::MAX);
        ctx.admit(Process::new(ProcessId(1), 3, Priority(0))).unwrap();
        let mut policy = RoundRobinPolicy::new();

        for _ in 0..3 {
            assert_eq!(tick(&mut policy, &mut ctx), Some(ProcessId(1)));
        }
        // Finished: not expired again, nothing left to run
        assert_eq!(tick(&mut policy, &mut ctx), None);
        assert!(policy.auxiliary().unwrap().is_empty());
    }

    #[test]
    fn test_late_arrival_joins_current_round() {
        let mut ctx = SchedContext::new(1, Priority::MAX);
        for id in 1..=2 {
            ctx.admit(Process::new(ProcessId(id), 10, Priority(0)))
                .unwrap();
        }
        let mut policy = RoundRobinPolicy::new();

        assert_eq!(tick(&mut policy, &mut ctx), Some(ProcessId(1)));
        ctx.admit(Process::new(ProcessId(3), 10, Priority(0))).unwrap();
        assert_eq!(tick(&mut policy, &mut ctx), Some(ProcessId(2)));
        assert_eq!(tick(&mut policy, &mut ctx), Some(ProcessId(3)));
        assert_eq!(tick(&mut policy, &mut ctx), Some(ProcessId(1)));
    }
}
