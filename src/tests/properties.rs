/*
 * Property Tests
 *
 * Synthetic workloads from fixed seeds, run under every policy. After each
 * tick the state is checked against the invariants that must hold at all
 * times. The driver itself audits queue membership after every dispatch and
 * aborts on a violation, so a run that ends in Completed has passed that
 * audit on every tick.
 */

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::config::SimConfig;
use crate::scheduler::{PolicyKind, Priority, ProcessId, ProcessStatus, SchedContext};
use crate::sim::{RunOutcome, Simulation, Workload};

const SEEDS: u64 = 24;
const PROCESSES: usize = 10;

fn config(kind: PolicyKind) -> SimConfig {
    let mut config = SimConfig::with_policy(kind).quiet();
    config.nr_resources = 3;
    config.max_prio = Priority(30);
    config
}

/// Run `workload` one tick at a time, calling `check` after every tick
fn run_checked<F>(kind: PolicyKind, workload: &Workload, mut check: F) -> Simulation
where
    F: FnMut(&Simulation),
{
    let mut sim = Simulation::new(config(kind), workload).unwrap();
    loop {
        let outcome = sim.step();
        if let Some(RunOutcome::Aborted(err)) = outcome {
            panic!("{} aborted: {}", kind, err);
        }
        check(&sim);
        if outcome.is_some() {
            return sim;
        }
    }
}

fn effective_prios(ctx: &SchedContext) -> BTreeMap<ProcessId, Priority> {
    ctx.processes().map(|p| (p.id(), p.prio())).collect()
}

/// Owners are live and never wait on their own resource
fn check_mutual_exclusion(ctx: &SchedContext) {
    for resource in ctx.resources().iter() {
        if let Some(owner) = resource.owner() {
            let process = ctx.process(owner).expect("owner must be alive");
            assert_ne!(process.status(), ProcessStatus::Terminated);
            assert!(!resource.waiters().contains(&owner));
        }
    }
}

#[test]
fn test_every_policy_completes_random_workloads() {
    for kind in PolicyKind::ALL {
        for seed in 0..SEEDS {
            let workload = Workload::random(seed, PROCESSES, &config(kind));
            let sim = run_checked(kind, &workload, |sim| {
                sim.verify().unwrap();
                check_mutual_exclusion(sim.context());
            });

            assert_eq!(sim.outcome(), Some(RunOutcome::Completed), "{} seed {}", kind, seed);
            assert_eq!(sim.context().live_count(), 0);
            assert_eq!(sim.stats().completed(), PROCESSES);
            for spec in workload.specs() {
                let report = sim.stats().report(spec.pid).unwrap();
                assert!(report.first_run.is_some());
                // A lost tick per failed acquire, never less than the work
                assert!(sim.timeline().ticks_of(spec.pid) as u64 >= spec.lifespan);
                assert!(report.turnaround().unwrap() >= spec.lifespan);
            }
        }
    }
}

#[test]
fn test_priority_restored_when_nothing_is_held() {
    for kind in [PolicyKind::PriorityCeiling, PolicyKind::PriorityInheritance] {
        for seed in 0..SEEDS {
            let workload = Workload::random(seed, PROCESSES, &config(kind));
            run_checked(kind, &workload, |sim| {
                let ctx = sim.context();
                for process in ctx.processes() {
                    let holds = ctx.resources().owned_by(process.id()).next().is_some();
                    if !holds {
                        assert_eq!(process.prio(), process.prio_orig(), "{} seed {}", kind, seed);
                    } else if kind == PolicyKind::PriorityCeiling {
                        assert_eq!(process.prio(), ctx.max_prio());
                    } else {
                        assert!(process.prio() >= process.prio_orig());
                    }
                }
            });
        }
    }
}

#[test]
fn test_aging_is_monotonic_until_selected() {
    let kind = PolicyKind::PriorityAging;
    for seed in 0..SEEDS {
        let workload = Workload::random(seed, PROCESSES, &config(kind));
        let mut before = BTreeMap::new();
        let mut last_runner: Option<ProcessId> = None;

        run_checked(kind, &workload, |sim| {
            let ctx = sim.context();
            let after = effective_prios(ctx);

            for (&pid, &prio) in &after {
                let process = ctx.process(pid).unwrap();
                if Some(pid) == last_runner {
                    // Selection in the previous tick resets the priority
                    assert_eq!(prio, process.prio_orig(), "seed {}", seed);
                } else if let Some(&old) = before.get(&pid) {
                    assert!(prio >= old, "seed {}: {} dropped", seed, pid);
                }
                assert!(prio <= ctx.max_prio());
            }

            last_runner = sim
                .timeline()
                .len()
                .checked_sub(1)
                .and_then(|tick| sim.timeline().get(tick as u64));
            before = after;
        });
    }
}

#[test]
fn test_runs_are_reproducible() {
    for kind in PolicyKind::ALL {
        let workload = Workload::random(7, PROCESSES, &config(kind));
        let timelines: Vec<_> = (0..2)
            .map(|_| {
                let mut sim = Simulation::new(config(kind), &workload).unwrap();
                sim.run();
                sim.timeline().clone()
            })
            .collect();
        assert_eq!(timelines[0], timelines[1], "{}", kind);
    }
}
