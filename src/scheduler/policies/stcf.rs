/*
 * Shortest-Time-to-Complete-First Scheduling Policy
 *
 * Preemptive shortest-remaining-time. Every tick the running process's
 * remaining work is compared against the shortest remaining work in the
 * readyqueue. Only a strictly shorter contender preempts; the preempted
 * process goes back to the readyqueue head.
 */

use super::super::{
    context::SchedContext,
    error::SchedError,
    process::{Process, ProcessId},
    protocols::ResourceProtocol,
    traits::Scheduler,
    types::ResourceId,
};
use crate::config::TraceFlags;

/// Shortest-time-to-complete-first policy
#[derive(Debug, Default)]
pub struct StcfPolicy {
    preemptions: u64,
}

impl StcfPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times a running process lost the CPU to a shorter one
    pub fn preemptions(&self) -> u64 {
        self.preemptions
    }
}

fn shorter(candidate: &Process, best: &Process) -> bool {
    candidate.remaining() < best.remaining()
}

impl Scheduler for StcfPolicy {
    fn name(&self) -> &'static str {
        "Shortest Time-to-Complete First"
    }

    fn acquire(&mut self, ctx: &mut SchedContext, resource: ResourceId) -> Result<bool, SchedError> {
        ResourceProtocol::Fcfs.acquire(ctx, resource)
    }

    fn release(&mut self, ctx: &mut SchedContext, resource: ResourceId) -> Result<(), SchedError> {
        ResourceProtocol::Fcfs.release(ctx, resource)
    }

    fn schedule(&mut self, ctx: &mut SchedContext) -> Result<Option<ProcessId>, SchedError> {
        if let Some(current) = ctx.runnable_current()? {
            let remaining = ctx.proc(current)?.remaining();
            let Some(shortest) = ctx.peek_ready(shorter)? else {
                return Ok(Some(current));
            };
            if ctx.proc(shortest)?.remaining() >= remaining {
                return Ok(Some(current));
            }

            if ctx.traces(TraceFlags::SCHEDULE) {
                log::debug!("[STCF] {} preempted by {}", current, shortest);
            }
            self.preemptions += 1;
            ctx.enqueue_ready_front(current)?;
        }

        ctx.select_ready(shorter)
    }
}
