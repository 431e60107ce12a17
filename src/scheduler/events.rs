/*
 * Scheduler Event Definitions
 *
 * This module defines the events that the driver reports to scheduling
 * policies through SchedulerCore. Most policies ignore them; they exist so
 * a policy can track arrivals and exits without the driver knowing about
 * the policy's private structures.
 */

use super::{process::ProcessId, types::Tick};

/// Events that the mechanism reports to policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedEvent {
    /// A new process arrived and was appended to the readyqueue
    ProcessForked { pid: ProcessId },

    /// A finished process is about to be retired
    ///
    /// The policy should drop the process from all its structures.
    ProcessExiting { pid: ProcessId },

    /// A tick completed
    Tick {
        tick: Tick,
        current: Option<ProcessId>,
    },
}

impl SchedEvent {
    /// Get a short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            SchedEvent::ProcessForked { .. } => "ProcessForked",
            SchedEvent::ProcessExiting { .. } => "ProcessExiting",
            SchedEvent::Tick { .. } => "Tick",
        }
    }
}
