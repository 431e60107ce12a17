/*
 * FIFO Scheduling Policy
 *
 * Non-preemptive first-come-first-served. The current process keeps the CPU
 * until it finishes or blocks; then the readyqueue head runs.
 */

use super::super::{
    context::SchedContext,
    error::SchedError,
    process::ProcessId,
    protocols::ResourceProtocol,
    traits::Scheduler,
    types::ResourceId,
};

/// First-come-first-served policy
#[derive(Debug, Default)]
pub struct FifoPolicy;

impl FifoPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for FifoPolicy {
    fn name(&self) -> &'static str {
        "FIFO"
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
        Ok(ctx.pop_ready())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{Priority, Process};

    #[test]
    fn test_runs_in_arrival_order_without_preemption() {
        let mut ctx = SchedContext::new(1, Priority::MAX);
        for (id, lifespan) in [(1, 2), (2, 1)] {
            ctx.admit(Process::new(ProcessId(id), lifespan, Priority(0)))
                .unwrap();
        }
        let mut policy = FifoPolicy::new();

        let first = policy.schedule(&mut ctx).unwrap();
        assert_eq!(first, Some(ProcessId(1)));
        ctx.dispatch(first).unwrap();
        ctx.process_mut(ProcessId(1)).unwrap().age = 1;

        // Still has work left: no preemption
        assert_eq!(policy.schedule(&mut ctx).unwrap(), Some(ProcessId(1)));

        ctx.process_mut(ProcessId(1)).unwrap().age = 2;
        assert_eq!(policy.schedule(&mut ctx).unwrap(), Some(ProcessId(2)));
        assert!(ctx.readyqueue().is_empty());
    }

    #[test]
    fn test_idle_when_nothing_is_ready() {
        let mut ctx = SchedContext::new(1, Priority::MAX);
        assert_eq!(FifoPolicy::new().schedule(&mut ctx), Ok(None));
    }
}
