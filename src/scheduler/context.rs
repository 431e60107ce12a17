/*
 * Scheduling Context
 *
 * SchedContext is the explicit state every policy operates on:
 * - the process arena (ProcessId -> Process)
 * - the readyqueue (ProcessIds, arrival order)
 * - the current process
 * - the resource table
 * - the tick counter
 *
 * There are no global singletons. A context is created per run and passed
 * by &mut to every policy call, so independent runs can execute side by
 * side (e.g. in parallel tests).
 *
 * Queue membership is tracked only by the containers: the readyqueue, each
 * resource's waitqueue and the active policy's private holding queue. A
 * ProcessId is moved between them, never copied into two at once;
 * verify_partition() audits that after every dispatch.
 */

use alloc::collections::{BTreeMap, VecDeque};

use crate::config::{SimConfig, TraceFlags};

use super::{
    error::SchedError,
    process::{Process, ProcessId, ProcessStatus},
    resource::{Resource, ResourceTable},
    types::{Priority, ResourceId, Tick},
};

/// Simulation state shared by the mechanism and the active policy
pub struct SchedContext {
    processes: BTreeMap<ProcessId, Process>,
    readyqueue: VecDeque<ProcessId>,
    current: Option<ProcessId>,
    resources: ResourceTable,
    ticks: Tick,
    max_prio: Priority,
    trace: TraceFlags,
}

impl SchedContext {
    /// Create an empty context with `nr_resources` free resources
    pub fn new(nr_resources: usize, max_prio: Priority) -> Self {
        Self {
            processes: BTreeMap::new(),
            readyqueue: VecDeque::new(),
            current: None,
            resources: ResourceTable::new(nr_resources),
            ticks: 0,
            max_prio,
            trace: TraceFlags::empty(),
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        let mut ctx = Self::new(config.nr_resources, config.max_prio);
        ctx.trace = config.trace;
        ctx
    }

    // ========== QUERY OPERATIONS ==========

    pub fn ticks(&self) -> Tick {
        self.ticks
    }

    /// Priority ceiling for this run
    pub fn max_prio(&self) -> Priority {
        self.max_prio
    }

    /// Process occupying the CPU (may be blocked right after a failed acquire)
    pub fn current(&self) -> Option<ProcessId> {
        self.current
    }

    pub fn process(&self, pid: ProcessId) -> Option<&Process> {
        self.processes.get(&pid)
    }

    /// All live processes, ordered by id
    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.processes.values()
    }

    pub fn live_count(&self) -> usize {
        self.processes.len()
    }

    pub fn readyqueue(&self) -> &VecDeque<ProcessId> {
        &self.readyqueue
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    pub fn resource(&self, id: ResourceId) -> Result<&Resource, SchedError> {
        self.resources.get(id)
    }

    /// Check whether a class of debug traces is enabled
    pub fn traces(&self, flags: TraceFlags) -> bool {
        self.trace.contains(flags)
    }

    /// Look up a process that must exist
    pub(crate) fn proc(&self, pid: ProcessId) -> Result<&Process, SchedError> {
        self.processes
            .get(&pid)
            .ok_or(SchedError::UnknownProcess(pid))
    }

    pub(crate) fn process_mut(&mut self, pid: ProcessId) -> Result<&mut Process, SchedError> {
        self.processes
            .get_mut(&pid)
            .ok_or(SchedError::UnknownProcess(pid))
    }

    pub(crate) fn resource_mut(&mut self, id: ResourceId) -> Result<&mut Resource, SchedError> {
        self.resources.get_mut(id)
    }

    /// The current process if it may keep the CPU: present, not blocked and
    /// with work left
    pub(crate) fn runnable_current(&self) -> Result<Option<ProcessId>, SchedError> {
        let Some(pid) = self.current else {
            return Ok(None);
        };
        let process = self.proc(pid)?;
        if process.is_blocked() || process.is_finished() {
            return Ok(None);
        }
        Ok(Some(pid))
    }

    /// Highest effective priority in the readyqueue
    pub fn highest_ready_prio(&self) -> Result<Option<Priority>, SchedError> {
        let mut highest = None;
        for &pid in &self.readyqueue {
            let prio = self.proc(pid)?.prio();
            if highest.is_none_or(|h| prio > h) {
                highest = Some(prio);
            }
        }
        Ok(highest)
    }

    // ========== ARENA / LIFECYCLE ==========

    /// Admit a newly arrived process: READY, appended to the readyqueue
    pub fn admit(&mut self, mut process: Process) -> Result<ProcessId, SchedError> {
        let pid = process.id();
        if self.processes.contains_key(&pid) {
            return Err(SchedError::DuplicateProcess(pid));
        }
        process.status = ProcessStatus::Ready;
        self.processes.insert(pid, process);
        self.readyqueue.push_back(pid);
        Ok(pid)
    }

    /// Retire a finished process and drop it from the arena
    pub(crate) fn retire(&mut self, pid: ProcessId) -> Result<Process, SchedError> {
        if self.readyqueue.contains(&pid) || self.resources.waiting_on(pid).is_some() {
            return Err(SchedError::QueuePartition(pid));
        }
        let mut process = self
            .processes
            .remove(&pid)
            .ok_or(SchedError::UnknownProcess(pid))?;
        process.status = ProcessStatus::Terminated;
        if self.current == Some(pid) {
            self.current = None;
        }
        Ok(process)
    }

    /// Hand the CPU to `next` (or leave it idle)
    pub(crate) fn dispatch(&mut self, next: Option<ProcessId>) -> Result<(), SchedError> {
        if let Some(pid) = next {
            if self.readyqueue.contains(&pid) {
                return Err(SchedError::QueuePartition(pid));
            }
            let process = self.process_mut(pid)?;
            if process.is_blocked() {
                return Err(SchedError::InvalidState {
                    pid,
                    expected: ProcessStatus::Ready,
                    found: ProcessStatus::Blocked,
                });
            }
            process.status = ProcessStatus::Running;
        }
        self.current = next;
        Ok(())
    }

    pub(crate) fn advance_tick(&mut self) {
        self.ticks += 1;
    }

    // ========== READYQUEUE ==========

    /// Mark a process READY without queueing it (the caller parks it in a
    /// policy-private queue)
    pub(crate) fn set_ready(&mut self, pid: ProcessId) -> Result<(), SchedError> {
        self.process_mut(pid)?.status = ProcessStatus::Ready;
        Ok(())
    }

    /// Append to the readyqueue tail
    pub(crate) fn enqueue_ready(&mut self, pid: ProcessId) -> Result<(), SchedError> {
        self.set_ready(pid)?;
        self.readyqueue.push_back(pid);
        Ok(())
    }

    /// Insert at the readyqueue head
    pub(crate) fn enqueue_ready_front(&mut self, pid: ProcessId) -> Result<(), SchedError> {
        self.set_ready(pid)?;
        self.readyqueue.push_front(pid);
        Ok(())
    }

    /// Unlink `pid` from the readyqueue, wherever it sits
    pub(crate) fn take_ready(&mut self, pid: ProcessId) -> bool {
        match self.readyqueue.iter().position(|&p| p == pid) {
            Some(idx) => self.readyqueue.remove(idx).is_some(),
            None => false,
        }
    }

    /// Remove the readyqueue head (earliest arrival)
    pub(crate) fn pop_ready(&mut self) -> Option<ProcessId> {
        self.readyqueue.pop_front()
    }

    /// Scan the readyqueue and return the best entry without removing it.
    ///
    /// `better(candidate, best)` must be a strict comparison, so the first
    /// entry found wins ties.
    pub(crate) fn peek_ready<F>(&self, better: F) -> Result<Option<ProcessId>, SchedError>
    where
        F: FnMut(&Process, &Process) -> bool,
    {
        Ok(self
            .scan(&self.readyqueue, better)?
            .map(|idx| self.readyqueue[idx]))
    }

    /// Like peek_ready(), but removes the selected entry
    pub(crate) fn select_ready<F>(&mut self, better: F) -> Result<Option<ProcessId>, SchedError>
    where
        F: FnMut(&Process, &Process) -> bool,
    {
        match self.scan(&self.readyqueue, better)? {
            Some(idx) => Ok(self.readyqueue.remove(idx)),
            None => Ok(None),
        }
    }

    /// Index of the best entry of `queue`, first-found wins ties
    fn scan<F>(&self, queue: &VecDeque<ProcessId>, mut better: F) -> Result<Option<usize>, SchedError>
    where
        F: FnMut(&Process, &Process) -> bool,
    {
        let mut best: Option<(usize, &Process)> = None;
        for (idx, &pid) in queue.iter().enumerate() {
            let candidate = self.proc(pid)?;
            match best {
                Some((_, current_best)) if !better(candidate, current_best) => {}
                _ => best = Some((idx, candidate)),
            }
        }
        Ok(best.map(|(idx, _)| idx))
    }

    /// Raise every readyqueue entry by one step, clamped at the ceiling
    pub(crate) fn age_ready(&mut self) -> Result<(), SchedError> {
        let ceiling = self.max_prio;
        for &pid in &self.readyqueue {
            let process = self
                .processes
                .get_mut(&pid)
                .ok_or(SchedError::UnknownProcess(pid))?;
            process.prio = process.prio.boosted(ceiling);
        }
        Ok(())
    }

    // ========== WAITQUEUES ==========

    /// Block `pid` on `resource`, appending it to the waitqueue tail
    pub(crate) fn block_on(&mut self, pid: ProcessId, resource: ResourceId) -> Result<(), SchedError> {
        if let Some(other) = self.resources.waiting_on(pid) {
            log::warn!("{} is already waiting on {}", pid, other);
            return Err(SchedError::QueuePartition(pid));
        }
        self.resources.get_mut(resource)?.waitqueue.push_back(pid);
        self.process_mut(pid)?.status = ProcessStatus::Blocked;
        Ok(())
    }

    /// Earliest waiter on `resource`
    pub(crate) fn first_waiter(&self, resource: ResourceId) -> Result<Option<ProcessId>, SchedError> {
        Ok(self.resources.get(resource)?.waitqueue.front().copied())
    }

    /// Waiter with the highest effective priority, earliest arrival wins ties
    pub(crate) fn highest_waiter(&self, resource: ResourceId) -> Result<Option<ProcessId>, SchedError> {
        let waitqueue = &self.resources.get(resource)?.waitqueue;
        Ok(self
            .scan(waitqueue, |candidate, best| candidate.prio() > best.prio())?
            .map(|idx| waitqueue[idx]))
    }

    /// Move a waiter from `resource`'s waitqueue to the readyqueue tail
    pub(crate) fn wake(&mut self, resource: ResourceId, pid: ProcessId) -> Result<(), SchedError> {
        let found = self.proc(pid)?.status();
        if found != ProcessStatus::Blocked {
            return Err(SchedError::InvalidState {
                pid,
                expected: ProcessStatus::Blocked,
                found,
            });
        }
        let waitqueue = &mut self.resources.get_mut(resource)?.waitqueue;
        let idx = waitqueue
            .iter()
            .position(|&w| w == pid)
            .ok_or(SchedError::QueuePartition(pid))?;
        waitqueue.remove(idx);
        self.enqueue_ready(pid)
    }

    // ========== INVARIANTS ==========

    /// Check that every live process sits in exactly the collection its
    /// status demands.
    ///
    /// `auxiliary` is the active policy's private holding queue, if any.
    pub fn verify_partition(&self, auxiliary: Option<&VecDeque<ProcessId>>) -> Result<(), SchedError> {
        // (ready-side links, waitqueue links) per process
        let mut links: BTreeMap<ProcessId, (usize, usize)> = BTreeMap::new();

        let ready_side = self.readyqueue.iter().chain(auxiliary.into_iter().flatten());
        for &pid in ready_side {
            self.proc(pid)?;
            links.entry(pid).or_default().0 += 1;
        }
        for resource in self.resources.iter() {
            for &pid in &resource.waitqueue {
                self.proc(pid)?;
                links.entry(pid).or_default().1 += 1;
            }
            if let Some(owner) = resource.owner {
                self.proc(owner)?;
            }
        }

        for process in self.processes.values() {
            let pid = process.id();
            let (ready, waiting) = links.get(&pid).copied().unwrap_or_default();
            let consistent = match process.status() {
                ProcessStatus::Running => ready == 0 && waiting == 0 && self.current == Some(pid),
                ProcessStatus::Ready => ready == 1 && waiting == 0,
                ProcessStatus::Blocked => ready == 0 && waiting == 1,
                ProcessStatus::Terminated => false,
            };
            if !consistent {
                return Err(SchedError::QueuePartition(pid));
            }
        }
        Ok(())
    }

    /// Write the current process, the readyqueue and resource ownership to
    /// the trace log
    pub fn dump_status(&self) {
        match self.current.and_then(|pid| self.processes.get(&pid)) {
            Some(p) => log::trace!(
                "[{:04}] current {} age {}/{} prio {} ({})",
                self.ticks,
                p.id(),
                p.age(),
                p.lifespan(),
                p.prio(),
                p.prio_orig()
            ),
            None => log::trace!("[{:04}] current idle", self.ticks),
        }
        for &pid in &self.readyqueue {
            if let Some(p) = self.processes.get(&pid) {
                log::trace!(
                    "       ready {} age {}/{} prio {} ({})",
                    p.id(),
                    p.age(),
                    p.lifespan(),
                    p.prio(),
                    p.prio_orig()
                );
            }
        }
        for resource in self.resources.iter() {
            if let Some(owner) = resource.owner {
                log::trace!(
                    "       {} owned by {}, {} waiting",
                    resource.id(),
                    owner,
                    resource.waitqueue.len()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with(specs: &[(u32, Tick, u32)]) -> SchedContext {
        let mut ctx = SchedContext::new(4, Priority::MAX);
        for &(id, lifespan, prio) in specs {
            ctx.admit(Process::new(ProcessId(id), lifespan, Priority(prio)))
                .unwrap();
        }
        ctx
    }

    #[test]
    fn test_admit_rejects_duplicates() {
        let mut ctx = ctx_with(&[(1, 5, 0)]);
        assert_eq!(
            ctx.admit(Process::new(ProcessId(1), 3, Priority(0))),
            Err(SchedError::DuplicateProcess(ProcessId(1)))
        );
        assert_eq!(ctx.readyqueue().len(), 1);
    }

    #[test]
    fn test_select_ready_first_found_wins_ties() {
        let mut ctx = ctx_with(&[(1, 5, 3), (2, 5, 7), (3, 5, 7)]);
        let picked = ctx.select_ready(|c, b| c.prio() > b.prio()).unwrap();
        assert_eq!(picked, Some(ProcessId(2)));
        assert_eq!(ctx.readyqueue(), &[ProcessId(1), ProcessId(3)]);
    }

    #[test]
    fn test_dispatch_and_partition() {
        let mut ctx = ctx_with(&[(1, 5, 0), (2, 5, 0)]);
        assert!(ctx.verify_partition(None).is_ok());

        let pid = ctx.pop_ready().unwrap();
        // Popped but not dispatched: READY yet linked nowhere
        assert_eq!(ctx.verify_partition(None), Err(SchedError::QueuePartition(pid)));

        ctx.dispatch(Some(pid)).unwrap();
        assert_eq!(ctx.process(pid).unwrap().status(), ProcessStatus::Running);
        assert!(ctx.verify_partition(None).is_ok());

        // Linked twice: readyqueue and a holding queue
        let mut aux = VecDeque::new();
        aux.push_back(ProcessId(2));
        assert_eq!(
            ctx.verify_partition(Some(&aux)),
            Err(SchedError::QueuePartition(ProcessId(2)))
        );
    }

    #[test]
    fn test_block_and_wake() {
        let mut ctx = ctx_with(&[(1, 5, 1), (2, 5, 9), (3, 5, 4)]);
        let r = ResourceId(0);
        for pid in [ProcessId(1), ProcessId(2), ProcessId(3)] {
            ctx.readyqueue.retain(|&p| p != pid);
            ctx.block_on(pid, r).unwrap();
        }
        assert!(ctx.verify_partition(None).is_ok());
        assert_eq!(ctx.first_waiter(r).unwrap(), Some(ProcessId(1)));
        assert_eq!(ctx.highest_waiter(r).unwrap(), Some(ProcessId(2)));

        // A process cannot wait on two resources
        assert_eq!(
            ctx.block_on(ProcessId(1), ResourceId(1)),
            Err(SchedError::QueuePartition(ProcessId(1)))
        );

        ctx.wake(r, ProcessId(2)).unwrap();
        assert_eq!(ctx.readyqueue(), &[ProcessId(2)]);
        assert_eq!(ctx.process(ProcessId(2)).unwrap().status(), ProcessStatus::Ready);
        assert!(ctx.verify_partition(None).is_ok());

        // Waking a READY process is a protocol violation
        assert!(matches!(
            ctx.wake(r, ProcessId(2)),
            Err(SchedError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_age_ready_clamps() {
        let mut ctx = SchedContext::new(1, Priority(5));
        ctx.admit(Process::new(ProcessId(1), 5, Priority(4))).unwrap();
        ctx.age_ready().unwrap();
        ctx.age_ready().unwrap();
        assert_eq!(ctx.process(ProcessId(1)).unwrap().prio(), Priority(5));
    }
}
