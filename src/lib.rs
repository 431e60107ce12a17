/*
 * CLUU Scheduling Simulator
 *
 * A discrete-time model of a single-CPU kernel scheduler. Processes arrive
 * with a fixed amount of work and a priority, run one tick at a time, and
 * contend for exclusive resources. Eight scheduling policies are available,
 * each bundled with the resource arbitration protocol it uses:
 *
 * - FIFO, SJF, STCF, Round-Robin: first-come-first-served wake-ups
 * - Priority, Priority + aging: highest-priority wake-ups
 * - Priority + PCP: priority ceiling protocol
 * - Priority + PIP: priority inheritance protocol
 *
 * Layout:
 * - scheduler: mechanism (context, core) and policies
 * - sim:       workload scripts and the tick driver
 * - config:    run parameters and trace selection
 * - utils:     logger and its ring buffer
 *
 * The crate is no_std + alloc so the policies keep the shape of the kernel
 * scheduler they model; tests run with std.
 */

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod config;
pub mod scheduler;
pub mod sim;
pub mod utils;

#[cfg(test)]
mod tests;

pub use config::{SimConfig, TraceFlags};
pub use scheduler::{
    PolicyKind, Priority, Process, ProcessId, ProcessStatus, ResourceId, SchedContext, SchedError,
    Scheduler, SchedulerCore, Tick,
};
pub use sim::{RunOutcome, Simulation, Workload};
