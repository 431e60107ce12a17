/*
 * Scheduler Subsystem
 *
 * This module implements the scheduling core of the simulator: a single
 * simulated CPU shared by processes that also contend for exclusive
 * resources.
 *
 * ARCHITECTURE:
 * =============
 *
 * The subsystem follows a strict policy/mechanism split:
 *
 * - Mechanism (SchedulerCore, SchedContext): owns the process arena, the
 *   readyqueue, the resource table and the current pointer. It retires
 *   finished processes, marks the chosen one RUNNING and audits queue
 *   membership.
 * - Policy (Scheduler trait, policies/): decides which process runs next and
 *   how contended resources are handed out. Exactly one policy is active for
 *   a run.
 *
 * PROCESS LIFECYCLE:
 * ==================
 *
 *   fork -> Ready -> Running -> (finished) -> Terminated
 *             ^        |
 *             |        v
 *             +---- Blocked (on one resource's waitqueue)
 *
 * A Ready process sits in the readyqueue or in the active policy's holding
 * queue, a Blocked process in exactly one waitqueue, and the Running process
 * in no queue at all.
 */

pub mod context;
pub mod error;
pub mod events;
pub mod policies;
pub mod process;
pub mod protocols;
pub mod resource;
pub mod sched_core;
pub mod traits;
pub mod types;

pub use context::SchedContext;
pub use error::SchedError;
pub use events::SchedEvent;
pub use policies::PolicyKind;
pub use process::{Process, ProcessId, ProcessStatus};
pub use protocols::ResourceProtocol;
pub use resource::{Resource, ResourceTable};
pub use sched_core::{DispatchDecision, DispatchStats, SchedulerCore};
pub use traits::Scheduler;
pub use types::{MAX_PRIO, NR_RESOURCES, Priority, ResourceId, Tick};
