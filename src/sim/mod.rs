/*
 * Simulation Harness
 *
 * Everything outside the scheduler proper: the scripted workload, the tick
 * loop that forks, schedules and runs processes, and the deterministic
 * generator used for synthetic workloads.
 */

pub mod driver;
pub mod rng;
pub mod workload;

pub use driver::{ProcessReport, RunOutcome, SimStats, Simulation, Timeline};
pub use rng::SimRng;
pub use workload::{ProcessSpec, ResourceUse, Workload};
