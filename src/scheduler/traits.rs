/*
 * Scheduler Trait Definitions
 *
 * This module defines the capability interface every scheduling policy
 * implements. A policy bundles three behaviors:
 *
 * - acquire/release: the resource arbitration protocol it installs
 * - schedule: which process occupies the CPU this tick
 *
 * plus optional setup/teardown and event hooks. Exactly one policy is active
 * for a whole run; the SchedulerCore holds it as a Box<dyn Scheduler>.
 *
 * Policies never own processes. They read and move ProcessIds through the
 * SchedContext passed to every call, and may keep a private holding queue
 * of ProcessIds (exposed through auxiliary() so the mechanism can audit
 * queue membership).
 */

use alloc::collections::VecDeque;

use super::{
    context::SchedContext, error::SchedError, events::SchedEvent, process::ProcessId,
    types::ResourceId,
};

/// Scheduling policy trait
pub trait Scheduler: Send {
    /// Get the policy name for logging
    fn name(&self) -> &'static str;

    /// One-time setup, called before the first tick
    fn initialize(&mut self, _ctx: &mut SchedContext) -> Result<(), SchedError> {
        Ok(())
    }

    /// Teardown, called once after the last tick
    fn finalize(&mut self, _ctx: &mut SchedContext) {}

    /// The current process asks for `resource`
    ///
    /// # Returns
    /// - `Ok(true)`: the current process now owns the resource
    /// - `Ok(false)`: the current process is BLOCKED on the resource; the
    ///   caller must invoke schedule() to pick someone else
    fn acquire(&mut self, ctx: &mut SchedContext, resource: ResourceId) -> Result<bool, SchedError>;

    /// The current process gives `resource` back
    ///
    /// Releasing a resource the current process does not own is a protocol
    /// violation.
    fn release(&mut self, ctx: &mut SchedContext, resource: ResourceId) -> Result<(), SchedError>;

    /// Choose the process that occupies the CPU this tick
    ///
    /// # Returns
    /// - `Ok(Some(pid))`: run `pid` (possibly the current process again)
    /// - `Ok(None)`: nothing is runnable, the CPU idles
    fn schedule(&mut self, ctx: &mut SchedContext) -> Result<Option<ProcessId>, SchedError>;

    /// React to a lifecycle event
    fn on_event(&mut self, _ctx: &mut SchedContext, _event: SchedEvent) {}

    /// The policy's private holding queue, if it keeps one
    fn auxiliary(&self) -> Option<&VecDeque<ProcessId>> {
        None
    }
}
