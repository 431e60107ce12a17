/*
 * Test Suite for the Scheduling Simulator
 *
 * Crate-level tests that exercise several modules together. Unit tests live
 * next to the code they cover.
 *
 * - `scenarios`: hand-built situations with a known expected decision, one
 *   per policy and protocol, plus end-to-end driver runs
 * - `properties`: invariants checked on every tick of synthetic workloads,
 *   across all eight policies
 */

mod properties;

use crate::scheduler::{Priority, Process, ProcessId, SchedContext, Tick};

/// Context with one process per `(pid, lifespan, prio)`, all READY
fn context_with(nr_resources: usize, specs: &[(u32, Tick, u32)]) -> SchedContext {
    let mut ctx = SchedContext::new(nr_resources, Priority::MAX);
    for &(id, lifespan, prio) in specs {
        ctx.admit(Process::new(ProcessId(id), lifespan, Priority(prio)))
            .unwrap();
    }
    ctx
}

/// Put `pid` on the CPU directly, bypassing the policy
fn put_on_cpu(ctx: &mut SchedContext, pid: u32) {
    ctx.take_ready(ProcessId(pid));
    ctx.dispatch(Some(ProcessId(pid))).unwrap();
}
