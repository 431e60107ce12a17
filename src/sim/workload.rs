/*
 * Workload Description
 *
 * A workload is the scripted input of a run: which processes arrive when,
 * how much work each needs, its original priority, and which resources it
 * holds during which part of its life.
 *
 * Resource use is expressed in process age, not wall ticks: a use with
 * `at = 2, duration = 3` is acquired when the process starts its third tick
 * of work and released once it has completed its fifth.
 */

use alloc::vec::Vec;

use super::rng::SimRng;
use crate::config::SimConfig;
use crate::scheduler::{Priority, ProcessId, ResourceId, SchedError, Tick};

/// One scripted hold of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceUse {
    pub resource: ResourceId,

    /// Age at which the resource is acquired
    pub at: Tick,

    /// Ticks of work done while holding it
    pub duration: Tick,
}

impl ResourceUse {
    /// Age at which the resource is released
    pub fn end(&self) -> Tick {
        self.at + self.duration
    }

    fn overlaps(&self, other: &ResourceUse) -> bool {
        self.at < other.end() && other.at < self.end()
    }
}

/// Blueprint of a process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub pid: ProcessId,
    pub arrival: Tick,
    pub lifespan: Tick,
    pub prio: Priority,
    pub resources: Vec<ResourceUse>,
}

impl ProcessSpec {
    /// A process arriving at tick 0 with no resource use
    pub fn new(pid: u32, lifespan: Tick, prio: u32) -> Self {
        Self {
            pid: ProcessId(pid),
            arrival: 0,
            lifespan,
            prio: Priority(prio),
            resources: Vec::new(),
        }
    }

    pub fn arrives_at(mut self, tick: Tick) -> Self {
        self.arrival = tick;
        self
    }

    /// Hold `resource` from age `at` for `duration` ticks
    pub fn uses(mut self, resource: usize, at: Tick, duration: Tick) -> Self {
        self.resources.push(ResourceUse {
            resource: ResourceId(resource),
            at,
            duration,
        });
        self
    }

    fn validate(&self, config: &SimConfig) -> Result<(), SchedError> {
        if self.lifespan == 0 {
            return Err(SchedError::InvalidWorkload("lifespan must be at least one tick"));
        }
        if self.prio > config.max_prio {
            return Err(SchedError::InvalidWorkload("priority above the ceiling"));
        }
        for (i, usage) in self.resources.iter().enumerate() {
            if usage.resource.as_usize() >= config.nr_resources {
                return Err(SchedError::InvalidResource(usage.resource));
            }
            if usage.duration == 0 {
                return Err(SchedError::InvalidWorkload("resource held for zero ticks"));
            }
            if usage.end() > self.lifespan {
                return Err(SchedError::InvalidWorkload("resource held past the end of life"));
            }
            let reentrant = self.resources[..i]
                .iter()
                .any(|earlier| earlier.resource == usage.resource && earlier.overlaps(usage));
            if reentrant {
                return Err(SchedError::InvalidWorkload("overlapping holds of one resource"));
            }
        }
        Ok(())
    }
}

/// Ordered collection of process blueprints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workload {
    specs: Vec<ProcessSpec>,
}

impl Workload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a process; processes arriving on the same tick fork in the
    /// order they were added
    pub fn with(mut self, spec: ProcessSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn push(&mut self, spec: ProcessSpec) {
        self.specs.push(spec);
    }

    pub fn specs(&self) -> &[ProcessSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Sum of all lifespans
    pub fn total_work(&self) -> Tick {
        self.specs.iter().map(|s| s.lifespan).sum()
    }

    /// Reject workloads the driver cannot run
    pub fn validate(&self, config: &SimConfig) -> Result<(), SchedError> {
        for (i, spec) in self.specs.iter().enumerate() {
            if self.specs[..i].iter().any(|earlier| earlier.pid == spec.pid) {
                return Err(SchedError::DuplicateProcess(spec.pid));
            }
            spec.validate(config)?;
        }
        Ok(())
    }

    /// Reproducible synthetic workload of `count` processes
    ///
    /// Each process holds at most one resource at a time, so generated
    /// workloads can starve but never deadlock.
    pub fn random(seed: u64, count: usize, config: &SimConfig) -> Self {
        let mut rng = SimRng::new(seed);
        let resource_span = config.nr_resources.min(4) as u64;
        let prio_span = u64::from(config.max_prio.get().min(20)) + 1;
        let arrival_span = count as u64 * 2 + 1;

        let mut workload = Workload::new();
        for pid in 1..=count as u32 {
            let lifespan = rng.range(1, 13);
            let mut spec = ProcessSpec::new(pid, lifespan, rng.range(0, prio_span) as u32)
                .arrives_at(rng.range(0, arrival_span));

            let mut cursor = 0;
            for _ in 0..2 {
                if cursor >= lifespan || !rng.chance(1, 2) {
                    break;
                }
                let at = rng.range(cursor, lifespan);
                let duration = rng.range(1, lifespan - at + 1);
                let resource = rng.range(0, resource_span) as usize;
                spec = spec.uses(resource, at, duration);
                cursor = at + duration;
            }
            workload.push(spec);
        }
        workload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SimConfig {
        let mut config = SimConfig::default();
        config.nr_resources = 4;
        config.max_prio = Priority(10);
        config
    }

    #[test]
    fn test_valid_workload() {
        let workload = Workload::new()
            .with(ProcessSpec::new(1, 5, 3).uses(0, 0, 2).uses(0, 2, 3))
            .with(ProcessSpec::new(2, 1, 10).arrives_at(4));
        assert!(workload.validate(&config()).is_ok());
        assert_eq!(workload.total_work(), 6);
    }

    #[test]
    fn test_rejections() {
        let cfg = config();
        let cases = [
            (ProcessSpec::new(1, 0, 0), "zero lifespan"),
            (ProcessSpec::new(1, 5, 11), "priority above ceiling"),
            (ProcessSpec::new(1, 5, 0).uses(0, 0, 0), "zero duration"),
            (ProcessSpec::new(1, 5, 0).uses(0, 3, 3), "hold past end of life"),
            (ProcessSpec::new(1, 5, 0).uses(0, 0, 3).uses(0, 2, 1), "reentrant hold"),
        ];
        for (spec, what) in cases {
            let workload = Workload::new().with(spec);
            assert!(
                matches!(workload.validate(&cfg), Err(SchedError::InvalidWorkload(_))),
                "{}",
                what
            );
        }

        let bad_id = Workload::new().with(ProcessSpec::new(1, 5, 0).uses(4, 0, 1));
        assert_eq!(
            bad_id.validate(&cfg),
            Err(SchedError::InvalidResource(ResourceId(4)))
        );

        let dup = Workload::new()
            .with(ProcessSpec::new(1, 5, 0))
            .with(ProcessSpec::new(1, 2, 0));
        assert_eq!(dup.validate(&cfg), Err(SchedError::DuplicateProcess(ProcessId(1))));
    }

    #[test]
    fn test_random_workloads_are_valid_and_reproducible() {
        let cfg = config();
        for seed in 0..32 {
            let workload = Workload::random(seed, 8, &cfg);
            assert_eq!(workload.len(), 8);
            assert!(workload.validate(&cfg).is_ok(), "seed {}", seed);
            assert_eq!(workload, Workload::random(seed, 8, &cfg));
        }
    }
}
