/*
 * Simulation Driver
 *
 * The driver owns one SchedContext and one SchedulerCore and advances them
 * tick by tick. Each tick:
 *
 * 1. Fork every process whose arrival tick has come (workload order)
 * 2. Ask the policy who runs; retire the previous process if it finished
 * 3. If nobody runs, either the run is over (nothing alive, nothing left to
 *    arrive), deadlocked (everyone alive is blocked, nothing left to arrive)
 *    or the CPU idles
 * 4. Run the chosen process for one tick: acquire every resource its script
 *    asks for at this age. A failed acquire blocks it and the tick is lost.
 *    Otherwise it ages by one and releases every hold that ends there.
 * 5. Close the tick
 *
 * Any SchedError aborts the run. After that step() keeps returning the same
 * outcome and the state is left as it was for inspection.
 */

use alloc::collections::{BTreeMap, VecDeque};
use alloc::vec::Vec;

use super::workload::{ProcessSpec, ResourceUse, Workload};
use crate::config::{SimConfig, TraceFlags};
use crate::scheduler::{
    DispatchStats, Process, ProcessId, SchedContext, SchedError, SchedulerCore, Tick,
};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every process finished
    Completed,
    /// Processes are alive, none can run and no arrival is pending
    Deadlocked,
    /// The configured tick limit was reached
    TickLimit,
    /// A scheduling operation failed
    Aborted(SchedError),
}

/// Progress of one scripted resource hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UseState {
    Pending,
    Held,
    Done,
}

#[derive(Debug, Clone, Copy)]
struct ScriptedUse {
    usage: ResourceUse,
    state: UseState,
}

/// Which process occupied the CPU in each tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    slots: Vec<Option<ProcessId>>,
}

impl Timeline {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, tick: Tick) -> Option<ProcessId> {
        usize::try_from(tick)
            .ok()
            .and_then(|idx| self.slots.get(idx).copied().flatten())
    }

    pub fn slots(&self) -> &[Option<ProcessId>] {
        &self.slots
    }

    /// Processes in the order they held the CPU, consecutive ticks merged,
    /// idle ticks skipped
    pub fn order(&self) -> Vec<ProcessId> {
        let mut order: Vec<ProcessId> = Vec::new();
        for pid in self.slots.iter().flatten() {
            if order.last() != Some(pid) {
                order.push(*pid);
            }
        }
        order
    }

    /// Number of ticks `pid` occupied the CPU
    pub fn ticks_of(&self, pid: ProcessId) -> usize {
        self.slots.iter().filter(|&&slot| slot == Some(pid)).count()
    }

    fn push(&mut self, slot: Option<ProcessId>) {
        self.slots.push(slot);
    }
}

/// Per-process accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessReport {
    pub arrival: Tick,
    pub lifespan: Tick,
    pub first_run: Option<Tick>,
    pub completion: Option<Tick>,
}

impl ProcessReport {
    /// Ticks from arrival to completion
    pub fn turnaround(&self) -> Option<Tick> {
        self.completion.map(|done| done - self.arrival)
    }

    /// Ticks from arrival to the first time on the CPU
    pub fn response(&self) -> Option<Tick> {
        self.first_run.map(|first| first - self.arrival)
    }
}

/// Run statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimStats {
    pub dispatch: DispatchStats,
    pub processes: BTreeMap<ProcessId, ProcessReport>,
}

impl SimStats {
    pub fn report(&self, pid: ProcessId) -> Option<&ProcessReport> {
        self.processes.get(&pid)
    }

    pub fn completed(&self) -> usize {
        self.processes
            .values()
            .filter(|r| r.completion.is_some())
            .count()
    }

    pub fn average_turnaround(&self) -> Option<f64> {
        let turnarounds: Vec<Tick> = self
            .processes
            .values()
            .filter_map(ProcessReport::turnaround)
            .collect();
        if turnarounds.is_empty() {
            return None;
        }
        Some(turnarounds.iter().sum::<Tick>() as f64 / turnarounds.len() as f64)
    }
}

/// One simulation run
pub struct Simulation {
    config: SimConfig,
    ctx: SchedContext,
    core: SchedulerCore,

    /// Specs not forked yet, by arrival tick
    pending: VecDeque<ProcessSpec>,

    /// Resource scripts of live processes
    scripts: BTreeMap<ProcessId, Vec<ScriptedUse>>,

    timeline: Timeline,
    stats: SimStats,
    initialized: bool,
    outcome: Option<RunOutcome>,
}

impl Simulation {
    /// Validate the configuration and the workload and set up a run
    pub fn new(config: SimConfig, workload: &Workload) -> Result<Self, SchedError> {
        config.validate()?;
        workload.validate(&config)?;

        let mut specs: Vec<ProcessSpec> = workload.specs().to_vec();
        specs.sort_by_key(|spec| spec.arrival);

        Ok(Self {
            ctx: SchedContext::from_config(&config),
            core: SchedulerCore::with_kind(config.policy),
            config,
            pending: specs.into(),
            scripts: BTreeMap::new(),
            timeline: Timeline::default(),
            stats: SimStats::default(),
            initialized: false,
            outcome: None,
        })
    }

    // ========== ACCESSORS ==========

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn context(&self) -> &SchedContext {
        &self.ctx
    }

    pub fn policy_name(&self) -> &'static str {
        self.core.policy_name()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Outcome, once the run has ended
    pub fn outcome(&self) -> Option<RunOutcome> {
        self.outcome
    }

    /// Audit queue membership, including the policy's holding queue
    pub fn verify(&self) -> Result<(), SchedError> {
        self.core.verify(&self.ctx)
    }

    // ========== EXECUTION ==========

    /// Run until the simulation ends
    pub fn run(&mut self) -> RunOutcome {
        loop {
            if let Some(outcome) = self.step() {
                return outcome;
            }
        }
    }

    /// Advance by one tick
    ///
    /// Returns the outcome once the run has ended.
    pub fn step(&mut self) -> Option<RunOutcome> {
        if self.outcome.is_some() {
            return self.outcome;
        }

        let result = self.try_step();
        self.stats.dispatch = self.core.stats();

        let outcome = match result {
            Ok(None) => return None,
            Ok(Some(outcome)) => {
                self.core.finalize(&mut self.ctx);
                outcome
            }
            Err(err) => {
                log::warn!("[{:04}] Simulation aborted: {}", self.ctx.ticks(), err);
                RunOutcome::Aborted(err)
            }
        };

        match outcome {
            RunOutcome::Deadlocked => {
                log::warn!(
                    "[{:04}] Deadlock: {} process(es) blocked forever",
                    self.ctx.ticks(),
                    self.ctx.live_count()
                );
            }
            _ => log::info!(
                "[{}] Run ended at tick {}: {:?}",
                self.core.policy_name(),
                self.ctx.ticks(),
                outcome
            ),
        }
        self.outcome = Some(outcome);
        self.outcome
    }

    fn try_step(&mut self) -> Result<Option<RunOutcome>, SchedError> {
        if !self.initialized {
            self.core.initialize(&mut self.ctx)?;
            self.initialized = true;
        }
        if self.ctx.ticks() >= self.config.max_ticks {
            return Ok(Some(RunOutcome::TickLimit));
        }

        let now = self.ctx.ticks();
        self.fork_arrivals(now)?;

        let decision = self.core.reschedule(&mut self.ctx)?;
        if let Some(process) = decision.retired {
            self.record_exit(&process, now);
        }
        self.core.verify(&self.ctx)?;

        let Some(pid) = decision.next else {
            if self.pending.is_empty() {
                if self.ctx.live_count() == 0 {
                    return Ok(Some(RunOutcome::Completed));
                }
                return Ok(Some(RunOutcome::Deadlocked));
            }
            self.timeline.push(None);
            self.core.on_tick(&mut self.ctx);
            return Ok(None);
        };

        if let Some(report) = self.stats.processes.get_mut(&pid) {
            report.first_run.get_or_insert(now);
        }
        self.timeline.push(Some(pid));
        self.run_current(pid)?;
        self.core.on_tick(&mut self.ctx);
        Ok(None)
    }

    fn fork_arrivals(&mut self, now: Tick) -> Result<(), SchedError> {
        while self.pending.front().is_some_and(|spec| spec.arrival <= now) {
            let Some(spec) = self.pending.pop_front() else {
                break;
            };
            let process = Process::new(spec.pid, spec.lifespan, spec.prio);
            let pid = self.core.process_forked(&mut self.ctx, process)?;

            let script = spec
                .resources
                .iter()
                .map(|&usage| ScriptedUse {
                    usage,
                    state: UseState::Pending,
                })
                .collect();
            self.scripts.insert(pid, script);
            self.stats.processes.insert(
                pid,
                ProcessReport {
                    arrival: now,
                    lifespan: spec.lifespan,
                    first_run: None,
                    completion: None,
                },
            );
        }
        Ok(())
    }

    fn record_exit(&mut self, process: &Process, now: Tick) {
        self.scripts.remove(&process.id());
        if let Some(report) = self.stats.processes.get_mut(&process.id()) {
            report.completion = Some(now);
        }
    }

    /// Execute one tick of the current process
    fn run_current(&mut self, pid: ProcessId) -> Result<(), SchedError> {
        let age = self.ctx.proc(pid)?.age();
        let trace = self.ctx.traces(TraceFlags::RESOURCE);

        if let Some(script) = self.scripts.get_mut(&pid) {
            for entry in script.iter_mut() {
                if entry.state != UseState::Pending || entry.usage.at != age {
                    continue;
                }
                if !self.core.acquire(&mut self.ctx, entry.usage.resource)? {
                    if trace {
                        log::debug!("[{:04}] {} stalls on {}", self.ctx.ticks(), pid, entry.usage.resource);
                    }
                    return Ok(());
                }
                entry.state = UseState::Held;
            }
        }

        let process = self.ctx.process_mut(pid)?;
        process.age += 1;
        let age = process.age;

        if let Some(script) = self.scripts.get_mut(&pid) {
            for entry in script.iter_mut() {
                if entry.state == UseState::Held && entry.usage.end() == age {
                    self.core.release(&mut self.ctx, entry.usage.resource)?;
                    entry.state = UseState::Done;
                }
            }
        }
        Ok(())
    }
}
