/*
 * Shortest-Job-First Scheduling Policy
 *
 * Non-preemptive. When the CPU is free, the ready process with the smallest
 * total lifespan runs; the first one found in readyqueue order wins ties.
 */

use super::super::{
    context::SchedContext,
    error::SchedError,
    process::ProcessId,
    protocols::ResourceProtocol,
    traits::Scheduler,
    types::ResourceId,
};

/// Shortest-job-first policy
#[derive(Debug, Default)]
pub struct SjfPolicy;

impl SjfPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for SjfPolicy {
    fn name(&self) -> &'static str {
        "Shortest-Job First"
    }

    fn acquire(&mut self, ctx: &mut SchedContext, resource: ResourceId) -> Result<bool, SchedError> {
        ResourceProtocol::Fcfs.acquire(ctx, resource)
    }

    fn release(&mut self, ctx: &mut SchedContext, resource: ResourceId) -> Result<(), SchedError> {
        ResourceProtocol::Fcfs.release(ctx, resource)
    }

    fn schedule(&mut self, ctx: &mut SchedContext) -> Result<Option<ProcessId>, SchedError> {
        if let Some(current) = ctx.runnable_current()? {
            return Ok(Some(current));
        }
        ctx.select_ready(|candidate, best| candidate.lifespan() < best.lifespan())
    }
}
