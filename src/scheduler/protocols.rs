/*
 * Resource Arbitration Protocols
 *
 * The acquire/release pairs installed by the scheduling policies:
 *
 * - Fcfs: waiters are woken in arrival order
 * - Priority: the highest-priority waiter is woken (linear scan of the
 *   arrival-ordered waitqueue, earliest waiter wins ties)
 * - Ceiling: like Priority, and an owner runs at the priority ceiling for as
 *   long as it holds the resource
 * - Inheritance: like Priority, and an owner inherits the priority of the
 *   highest-priority process blocked on its resource
 *
 * Release never hands ownership to the woken waiter. The waiter goes back to
 * the readyqueue and must win a later acquire().
 */

use super::{
    context::SchedContext,
    error::SchedError,
    process::ProcessId,
    types::ResourceId,
};
use crate::config::TraceFlags;

/// Resource acquire/release discipline
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResourceProtocol {
    Fcfs,
    Priority,
    Ceiling,
    Inheritance,
}

impl ResourceProtocol {
    pub fn name(self) -> &'static str {
        match self {
            ResourceProtocol::Fcfs => "FCFS",
            ResourceProtocol::Priority => "Priority",
            ResourceProtocol::Ceiling => "Priority Ceiling",
            ResourceProtocol::Inheritance => "Priority Inheritance",
        }
    }

    /// Whether ownership changes the owner's effective priority
    fn boosts_owner(self) -> bool {
        matches!(self, ResourceProtocol::Ceiling | ResourceProtocol::Inheritance)
    }

    /// The current process asks for `resource`
    pub fn acquire(self, ctx: &mut SchedContext, resource: ResourceId) -> Result<bool, SchedError> {
        let caller = ctx.current().ok_or(SchedError::NoCurrentProcess)?;
        let trace = ctx.traces(TraceFlags::RESOURCE);

        let Some(owner) = ctx.resource(resource)?.owner() else {
            // This resource is not owned by any one. Take it!
            ctx.resource_mut(resource)?.owner = Some(caller);
            if self == ResourceProtocol::Ceiling {
                let ceiling = ctx.max_prio();
                ctx.process_mut(caller)?.prio = ceiling;
            }
            if trace {
                log::debug!("[{}] {} acquired {}", self.name(), caller, resource);
            }
            return Ok(true);
        };

        if owner == caller {
            return Err(SchedError::AlreadyOwner { resource, caller });
        }

        ctx.block_on(caller, resource)?;
        if trace {
            log::debug!(
                "[{}] {} blocked on {} (owner {})",
                self.name(),
                caller,
                resource,
                owner
            );
        }

        if self == ResourceProtocol::Inheritance {
            self.inherit(ctx, resource, caller, owner)?;
        }
        Ok(false)
    }

    /// Raise `owner` to `caller`'s priority if the caller is now the
    /// highest-priority waiter. Never lowers the owner.
    fn inherit(
        self,
        ctx: &mut SchedContext,
        resource: ResourceId,
        caller: ProcessId,
        owner: ProcessId,
    ) -> Result<(), SchedError> {
        let caller_prio = ctx.proc(caller)?.prio();
        let top = ctx
            .highest_waiter(resource)?
            .ok_or(SchedError::QueuePartition(caller))?;
        if ctx.proc(top)?.prio() != caller_prio {
            return Ok(());
        }

        let trace = ctx.traces(TraceFlags::RESOURCE);
        let owner_process = ctx.process_mut(owner)?;
        if owner_process.prio < caller_prio {
            if trace {
                log::debug!(
                    "[{}] {} inherits prio {} from {}",
                    self.name(),
                    owner,
                    caller_prio,
                    caller
                );
            }
            owner_process.prio = caller_prio;
        }
        Ok(())
    }

    /// The current process gives `resource` back and wakes one waiter
    pub fn release(self, ctx: &mut SchedContext, resource: ResourceId) -> Result<(), SchedError> {
        let caller = ctx.current().ok_or(SchedError::NoCurrentProcess)?;

        // Ensure that the owner process is releasing the resource
        if ctx.resource(resource)?.owner() != Some(caller) {
            return Err(SchedError::NotOwner { resource, caller });
        }

        if self.boosts_owner() {
            ctx.process_mut(caller)?.restore_prio();
        }
        ctx.resource_mut(resource)?.owner = None;

        let waiter = match self {
            ResourceProtocol::Fcfs => ctx.first_waiter(resource)?,
            _ => ctx.highest_waiter(resource)?,
        };

        let trace = ctx.traces(TraceFlags::RESOURCE);
        match waiter {
            Some(pid) => {
                ctx.wake(resource, pid)?;
                if trace {
                    log::debug!(
                        "[{}] {} released {}, woke {}",
                        self.name(),
                        caller,
                        resource,
                        pid
                    );
                }
            }
            None if trace => {
                log::debug!("[{}] {} released {}", self.name(), caller, resource);
            }
            None => {}
        }
        Ok(())
    }
}
