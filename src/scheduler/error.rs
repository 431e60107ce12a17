/*
 * Scheduler Errors
 *
 * Every scheduling operation is a one-shot synchronous decision, so errors
 * are never retried. They fall in two groups:
 * - Protocol violations: a broken invariant (release by a non-owner, a
 *   process linked in two queues, ...). These abort the run.
 * - Caller/configuration errors: bad resource ids, malformed workloads,
 *   unknown policy names.
 *
 * An idle tick (no runnable process) is not an error; schedule() reports it
 * as Ok(None).
 */

use core::fmt;

use super::{
    process::{ProcessId, ProcessStatus},
    types::ResourceId,
};

/// Scheduler error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedError {
    /// Resource id outside the resource table
    InvalidResource(ResourceId),
    /// Release invoked by a process that does not own the resource
    NotOwner {
        resource: ResourceId,
        caller: ProcessId,
    },
    /// Owner tried to acquire a resource it already holds
    AlreadyOwner {
        resource: ResourceId,
        caller: ProcessId,
    },
    /// acquire/release invoked while no process occupies the CPU
    NoCurrentProcess,
    /// A queue refers to a process missing from the arena
    UnknownProcess(ProcessId),
    /// A process is not in the state the operation requires
    InvalidState {
        pid: ProcessId,
        expected: ProcessStatus,
        found: ProcessStatus,
    },
    /// A process is linked in zero or several collections
    QueuePartition(ProcessId),
    /// Process id already present in the arena
    DuplicateProcess(ProcessId),
    /// Workload or configuration rejected before the run
    InvalidWorkload(&'static str),
    /// No policy with that name
    UnknownPolicy,
}

impl SchedError {
    /// Check if this error means the simulation state can no longer be trusted
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SchedError::NotOwner { .. }
                | SchedError::AlreadyOwner { .. }
                | SchedError::NoCurrentProcess
                | SchedError::UnknownProcess(_)
                | SchedError::InvalidState { .. }
                | SchedError::QueuePartition(_)
        )
    }
}

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedError::InvalidResource(r) => write!(f, "Invalid resource id {}", r.0),
            SchedError::NotOwner { resource, caller } => {
                write!(f, "{} released {} without owning it", caller, resource)
            }
            SchedError::AlreadyOwner { resource, caller } => {
                write!(f, "{} already owns {}", caller, resource)
            }
            SchedError::NoCurrentProcess => write!(f, "No current process"),
            SchedError::UnknownProcess(pid) => write!(f, "{} not found", pid),
            SchedError::InvalidState {
                pid,
                expected,
                found,
            } => write!(f, "{} is {:?}, expected {:?}", pid, found, expected),
            SchedError::QueuePartition(pid) => {
                write!(f, "{} is not linked in exactly one queue", pid)
            }
            SchedError::DuplicateProcess(pid) => write!(f, "{} already exists", pid),
            SchedError::InvalidWorkload(reason) => write!(f, "Invalid workload: {}", reason),
            SchedError::UnknownPolicy => write!(f, "Unknown scheduling policy"),
        }
    }
}
