/*
 * Simulation Configuration
 *
 * Everything a run is parameterized by: the active policy, the size of the
 * resource table, the priority ceiling, a run-away guard and the set of
 * debug traces to emit.
 */

use bitflags::bitflags;

use crate::scheduler::{MAX_PRIO, NR_RESOURCES, PolicyKind, Priority, SchedError, Tick};

bitflags! {
    /// Debug trace classes
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TraceFlags: u8 {
        /// Scheduling decisions and preemptions
        const SCHEDULE = 1;
        /// Acquire, block, release and wake-ups
        const RESOURCE = 1 << 1;
        /// Process arrival and exit
        const LIFECYCLE = 1 << 2;
        /// Full status dump after every tick
        const STATUS = 1 << 3;
    }
}

/// Default run-away guard
pub const DEFAULT_MAX_TICKS: Tick = 100_000;

/// Parameters of one simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    pub policy: PolicyKind,

    /// Number of resources in the table
    pub nr_resources: usize,

    /// Priority ceiling (ceiling protocol target, aging clamp)
    pub max_prio: Priority,

    /// The run stops with TickLimit after this many ticks
    pub max_ticks: Tick,

    pub trace: TraceFlags,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            nr_resources: NR_RESOURCES,
            max_prio: Priority(MAX_PRIO),
            max_ticks: DEFAULT_MAX_TICKS,
            trace: TraceFlags::LIFECYCLE,
        }
    }
}

impl SimConfig {
    pub fn with_policy(policy: PolicyKind) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Disable every debug trace
    pub fn quiet(mut self) -> Self {
        self.trace = TraceFlags::empty();
        self
    }

    pub fn validate(&self) -> Result<(), SchedError> {
        if self.nr_resources == 0 {
            return Err(SchedError::InvalidWorkload("resource table is empty"));
        }
        if self.max_prio == Priority::MIN {
            return Err(SchedError::InvalidWorkload("priority ceiling is zero"));
        }
        if self.max_ticks == 0 {
            return Err(SchedError::InvalidWorkload("tick limit is zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.nr_resources, NR_RESOURCES);
        assert_eq!(config.max_prio, Priority::MAX);
    }

    #[test]
    fn test_rejects_degenerate_tables() {
        let mut config = SimConfig::with_policy(PolicyKind::RoundRobin);
        config.nr_resources = 0;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.max_prio = Priority(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_quiet_clears_traces() {
        let config = SimConfig::default().quiet();
        assert!(config.trace.is_empty());
        assert!(!TraceFlags::all().is_empty());
    }
}
