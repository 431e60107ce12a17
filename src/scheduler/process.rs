/*
 * Process Abstraction
 *
 * This module implements the Process record the scheduler reads and writes.
 * A Process in the simulator is a synthetic workload unit:
 * - It arrives with a predetermined lifespan (ticks of work it needs)
 * - It carries an original priority fixed at creation
 * - Its effective priority may be changed by resource protocols and aging
 *
 * Processes never link themselves into queues. They live in the context's
 * arena and every queue holds ProcessIds, so queue membership is a property
 * of the containers, not of the record.
 */

use core::fmt;

use super::types::{Priority, Tick};

/// Unique identifier for a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(pub u32);

impl ProcessId {
    /// Create a new ProcessId
    pub fn new(id: u32) -> Self {
        ProcessId(id)
    }

    /// Get the raw ID value
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Process({})", self.0)
    }
}

/// Process state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Runnable, waiting in the readyqueue or a policy's holding queue
    Ready,
    /// Occupying the CPU this tick
    Running,
    /// Waiting in exactly one resource's waitqueue
    Blocked,
    /// Retired by the driver
    Terminated,
}

/// A simulated process
pub struct Process {
    id: ProcessId,

    /// Current process state
    pub(crate) status: ProcessStatus,

    /// Ticks of work consumed so far
    pub(crate) age: Tick,

    /// Total ticks of work the process needs
    lifespan: Tick,

    /// Effective priority
    pub(crate) prio: Priority,

    /// Baseline priority the effective priority is restored to
    prio_orig: Priority,
}

impl Process {
    /// Create a new ready process that has not run yet
    pub fn new(id: ProcessId, lifespan: Tick, prio: Priority) -> Self {
        Process {
            id,
            status: ProcessStatus::Ready,
            age: 0,
            lifespan,
            prio,
            prio_orig: prio,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn status(&self) -> ProcessStatus {
        self.status
    }

    pub fn age(&self) -> Tick {
        self.age
    }

    pub fn lifespan(&self) -> Tick {
        self.lifespan
    }

    /// Effective priority
    pub fn prio(&self) -> Priority {
        self.prio
    }

    /// Original (baseline) priority
    pub fn prio_orig(&self) -> Priority {
        self.prio_orig
    }

    /// Ticks of work left before the process is eligible for retirement
    pub fn remaining(&self) -> Tick {
        self.lifespan.saturating_sub(self.age)
    }

    /// Check if the process has consumed its whole lifespan
    pub fn is_finished(&self) -> bool {
        self.age >= self.lifespan
    }

    pub fn is_blocked(&self) -> bool {
        self.status == ProcessStatus::Blocked
    }

    /// Drop every protocol or aging boost
    pub(crate) fn restore_prio(&mut self) {
        self.prio = self.prio_orig;
    }
}

impl fmt::Debug for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Process")
            .field("id", &self.id)
            .field("status", &self.status)
            .field("age", &self.age)
            .field("lifespan", &self.lifespan)
            .field("prio", &self.prio)
            .field("prio_orig", &self.prio_orig)
            .finish()
    }
}
