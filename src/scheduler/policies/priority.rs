/*
 * Priority Scheduling Policies
 *
 * Four policies share one strict-priority skeleton and differ only in the
 * resource protocol they install and, for aging, a per-tick side effect:
 *
 * - Plain:       priority-aware wake-ups
 * - Aging:       every waiting process gains one step per tick; the process
 *                that just ran falls back to its original priority
 * - Ceiling:     resource owners run at the priority ceiling
 * - Inheritance: resource owners inherit their top waiter's priority
 *
 * Each policy owns a private rotation queue. A running process that is
 * still among the highest-priority runnable processes, but has company, is
 * parked there instead of in the readyqueue. The readyqueue therefore holds
 * the processes that have not had their turn in the current round, and
 * equal-priority processes take turns instead of one of them monopolizing
 * the CPU.
 *
 * Selection, each tick:
 * 1. (Aging) reset the process that just ran, boost everyone waiting
 * 2. If the current process is runnable:
 *    - a strictly higher-priority process is ready: current goes to the
 *      readyqueue tail
 *    - nobody else is ready or parked: current keeps the CPU
 *    - otherwise: current is parked in the rotation queue
 * 3. Pick the highest-priority ready process (draining the rotation queue
 *    first if the readyqueue is empty). If the rotation queue's head no
 *    longer matches the pick's priority, the round is over: the rotation
 *    queue is flushed back and the pick is recomputed over everyone.
 */

use alloc::collections::VecDeque;

use super::super::{
    context::SchedContext,
    error::SchedError,
    events::SchedEvent,
    process::{Process, ProcessId},
    protocols::ResourceProtocol,
    traits::Scheduler,
    types::ResourceId,
};
use crate::config::TraceFlags;

/// Which member of the priority family a policy is
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PriorityVariant {
    Plain,
    Aging,
    Ceiling,
    Inheritance,
}

impl PriorityVariant {
    pub fn name(self) -> &'static str {
        match self {
            PriorityVariant::Plain => "Priority",
            PriorityVariant::Aging => "Priority + aging",
            PriorityVariant::Ceiling => "Priority + PCP Protocol",
            PriorityVariant::Inheritance => "Priority + PIP Protocol",
        }
    }

    /// Resource protocol installed by this variant
    pub fn protocol(self) -> ResourceProtocol {
        match self {
            PriorityVariant::Plain | PriorityVariant::Aging => ResourceProtocol::Priority,
            PriorityVariant::Ceiling => ResourceProtocol::Ceiling,
            PriorityVariant::Inheritance => ResourceProtocol::Inheritance,
        }
    }
}

fn higher(candidate: &Process, best: &Process) -> bool {
    candidate.prio() > best.prio()
}

/// Strict priority scheduling with round-robin among equals
pub struct PriorityPolicy {
    variant: PriorityVariant,

    /// Processes that already had their turn in the current round
    rotation: VecDeque<ProcessId>,
}

impl PriorityPolicy {
    pub fn new(variant: PriorityVariant) -> Self {
        Self {
            variant,
            rotation: VecDeque::new(),
        }
    }

    pub fn plain() -> Self {
        Self::new(PriorityVariant::Plain)
    }

    pub fn aging() -> Self {
        Self::new(PriorityVariant::Aging)
    }

    pub fn ceiling() -> Self {
        Self::new(PriorityVariant::Ceiling)
    }

    pub fn inheritance() -> Self {
        Self::new(PriorityVariant::Inheritance)
    }

    pub fn variant(&self) -> PriorityVariant {
        self.variant
    }

    /// Anti-starvation step: the process that just ran drops back to its
    /// original priority, everyone waiting on the CPU gains one step
    fn age_waiting(&mut self, ctx: &mut SchedContext) -> Result<(), SchedError> {
        if let Some(current) = ctx.current() {
            ctx.process_mut(current)?.restore_prio();
        }
        ctx.age_ready()?;

        let ceiling = ctx.max_prio();
        for &pid in &self.rotation {
            let process = ctx.process_mut(pid)?;
            process.prio = process.prio.boosted(ceiling);
        }
        Ok(())
    }

    /// Return the whole rotation queue to the readyqueue tail, in order
    fn flush_rotation(&mut self, ctx: &mut SchedContext) -> Result<(), SchedError> {
        while let Some(pid) = self.rotation.pop_front() {
            ctx.enqueue_ready(pid)?;
        }
        Ok(())
    }

    fn pick_next(&mut self, ctx: &mut SchedContext) -> Result<Option<ProcessId>, SchedError> {
        if ctx.readyqueue().is_empty() {
            self.flush_rotation(ctx)?;
        }

        let Some(next) = ctx.select_ready(higher)? else {
            return Ok(None);
        };

        if let Some(&head) = self.rotation.front() {
            if ctx.proc(head)?.prio() != ctx.proc(next)?.prio() {
                // Priorities moved since the round started
                if ctx.traces(TraceFlags::SCHEDULE) {
                    log::debug!(
                        "[{}] {} outranked rotation, restarting round",
                        self.variant.name(),
                        next
                    );
                }
                self.flush_rotation(ctx)?;
                ctx.enqueue_ready_front(next)?;
                return ctx.select_ready(higher);
            }
        }
        Ok(Some(next))
    }
}

impl Scheduler for PriorityPolicy {
    fn name(&self) -> &'static str {
        self.variant.name()
    }

    fn acquire(&mut self, ctx: &mut SchedContext, resource: ResourceId) -> Result<bool, SchedError> {
        self.variant.protocol().acquire(ctx, resource)
    }

    fn release(&mut self, ctx: &mut SchedContext, resource: ResourceId) -> Result<(), SchedError> {
        self.variant.protocol().release(ctx, resource)
    }

    fn schedule(&mut self, ctx: &mut SchedContext) -> Result<Option<ProcessId>, SchedError> {
        if self.variant == PriorityVariant::Aging {
            self.age_waiting(ctx)?;
        }

        if let Some(current) = ctx.runnable_current()? {
            let prio = ctx.proc(current)?.prio();
            match ctx.highest_ready_prio()? {
                Some(top) if top > prio => {
                    if ctx.traces(TraceFlags::SCHEDULE) {
                        log::debug!("[{}] {} preempted at prio {}", self.variant.name(), current, prio);
                    }
                    ctx.enqueue_ready(current)?;
                }
                _ if ctx.readyqueue().is_empty() && self.rotation.is_empty() => {
                    return Ok(Some(current));
                }
                _ => {
                    ctx.set_ready(current)?;
                    self.rotation.push_back(current);
                }
            }
        }

        self.pick_next(ctx)
    }

    fn finalize(&mut self, ctx: &mut SchedContext) {
        if self.flush_rotation(ctx).is_err() {
            log::warn!("[{}] Failed to return parked processes on finalize", self.variant.name());
        }
    }

    fn on_event(&mut self, _ctx: &mut SchedContext, event: SchedEvent) {
        if let SchedEvent::ProcessExiting { pid } = event {
            self.rotation.retain(|&id| id != pid);
        }
    }

    fn auxiliary(&self) -> Option<&VecDeque<ProcessId>> {
        Some(&self.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{Priority, Tick};
    use alloc::vec::Vec;

    const R0: ResourceId = ResourceId(0);

    fn ctx_with(specs: &[(u32, Tick, u32)]) -> SchedContext {
        let mut ctx = SchedContext::new(1, Priority::MAX);
        for &(id, lifespan, prio) in specs {
            ctx.admit(Process::new(ProcessId(id), lifespan, Priority(prio)))
                .unwrap();
        }
        ctx
    }

    fn tick(policy: &mut PriorityPolicy, ctx: &mut SchedContext) -> Option<ProcessId> {
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

    fn run(ctx: &mut SchedContext, pid: u32) {
        ctx.take_ready(ProcessId(pid));
        ctx.dispatch(Some(ProcessId(pid))).unwrap();
    }

    #[test]
    fn test_equal_priorities_rotate_and_lower_starves() {
        let mut ctx = ctx_with(&[(1, 10, 5), (2, 10, 5), (3, 10, 1)]);
        let mut policy = PriorityPolicy::plain();

        let order: Vec<_> = (0..6)
            .map(|_| tick(&mut policy, &mut ctx).unwrap().0)
            .collect();
        assert_eq!(order, [1, 2, 1, 2, 1, 2]);
    }

    #[test]
    fn test_higher_priority_arrival_preempts_to_tail() {
        let mut ctx = ctx_with(&[(1, 10, 2)]);
        let mut policy = PriorityPolicy::plain();

        assert_eq!(tick(&mut policy, &mut ctx), Some(ProcessId(1)));
        ctx.admit(Process::new(ProcessId(2), 10, Priority(7))).unwrap();
        assert_eq!(tick(&mut policy, &mut ctx), Some(ProcessId(2)));
        assert_eq!(ctx.readyqueue(), &[ProcessId(1)]);
        assert!(policy.auxiliary().unwrap().is_empty());
    }

    #[test]
    fn test_lone_process_keeps_running() {
        let mut ctx = ctx_with(&[(1, 2, 2)]);
        let mut policy = PriorityPolicy::plain();
        assert_eq!(tick(&mut policy, &mut ctx), Some(ProcessId(1)));
        assert_eq!(tick(&mut policy, &mut ctx), Some(ProcessId(1)));
        assert_eq!(tick(&mut policy, &mut ctx), None);
    }

    #[test]
    fn test_aging_lets_low_priority_run() {
        let mut ctx = ctx_with(&[(1, 50, 10), (2, 50, 1)]);
        let mut policy = PriorityPolicy::aging();

        let mut last_b = Priority::MIN;
        let mut first_b_tick = None;
        for t in 0..20 {
            let next = tick(&mut policy, &mut ctx);
            if next == Some(ProcessId(2)) {
                first_b_tick = Some(t);
                break;
            }
            // B keeps gaining while it waits
            let b = ctx.process(ProcessId(2)).unwrap().prio();
            assert!(b >= last_b);
            last_b = b;
        }
        assert_eq!(first_b_tick, Some(8));

        // Once B has run, the next schedule drops it back to its original
        // priority and A, which gained while parked, takes over
        assert_eq!(tick(&mut policy, &mut ctx), Some(ProcessId(1)));
        assert_eq!(ctx.process(ProcessId(2)).unwrap().prio(), Priority(1));
    }

    #[test]
    fn test_inheritance_keeps_owner_ahead_of_medium() {
        for (variant, expected) in [
            (PriorityVariant::Plain, ProcessId(3)),
            (PriorityVariant::Inheritance, ProcessId(1)),
        ] {
            // Owner O=1 (prio 1), waiter W=2 (prio 5), medium M=3 (prio 3)
            let mut ctx = ctx_with(&[(1, 10, 1), (2, 10, 5), (3, 10, 3)]);
            let mut policy = PriorityPolicy::new(variant);

            run(&mut ctx, 1);
            assert_eq!(policy.acquire(&mut ctx, R0), Ok(true));
            run(&mut ctx, 2);
            assert_eq!(policy.acquire(&mut ctx, R0), Ok(false));
            run(&mut ctx, 1);

            let next = policy.schedule(&mut ctx).unwrap();
            assert_eq!(next, Some(expected), "{}", variant.name());
            ctx.dispatch(next).unwrap();
            ctx.verify_partition(policy.auxiliary()).unwrap();
        }
    }

    #[test]
    fn test_ceiling_owner_runs_until_release() {
        let mut ctx = ctx_with(&[(1, 10, 2), (2, 10, 50)]);
        let mut policy = PriorityPolicy::ceiling();

        run(&mut ctx, 1);
        assert_eq!(policy.acquire(&mut ctx, R0), Ok(true));
        assert_eq!(policy.schedule(&mut ctx).unwrap(), Some(ProcessId(1)));
        ctx.dispatch(Some(ProcessId(1))).unwrap();

        policy.release(&mut ctx, R0).unwrap();
        assert_eq!(ctx.process(ProcessId(1)).unwrap().prio(), Priority(2));
        assert_eq!(policy.schedule(&mut ctx).unwrap(), Some(ProcessId(2)));
    }

    #[test]
    fn test_finalize_returns_parked_processes() {
        let mut ctx = ctx_with(&[(1, 10, 5), (2, 10, 5)]);
        let mut policy = PriorityPolicy::plain();
        tick(&mut policy, &mut ctx);
        tick(&mut policy, &mut ctx);
        assert_eq!(policy.auxiliary().unwrap().len(), 1);

        policy.finalize(&mut ctx);
        assert!(policy.auxiliary().unwrap().is_empty());
        assert_eq!(ctx.readyqueue(), &[ProcessId(1)]);
    }
}
