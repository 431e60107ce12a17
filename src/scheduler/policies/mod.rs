/*
 * Scheduling Policies Module
 *
 * This module contains the scheduling policy implementations. Each policy
 * implements the Scheduler trait and is plugged into the SchedulerCore once,
 * before the first tick.
 *
 * Available policies:
 * - Fifo:       non-preemptive first-come-first-served
 * - Sjf:        non-preemptive shortest total lifespan
 * - Stcf:       preemptive shortest remaining time
 * - RoundRobin: one-tick quantum, expired queue per round
 * - Priority family (plain, aging, ceiling, inheritance)
 */

pub mod fifo;
pub mod priority;
pub mod round_robin;
pub mod sjf;
pub mod stcf;

use alloc::boxed::Box;
use core::{fmt, str::FromStr};

pub use fifo::FifoPolicy;
pub use priority::{PriorityPolicy, PriorityVariant};
pub use round_robin::RoundRobinPolicy;
pub use sjf::SjfPolicy;
pub use stcf::StcfPolicy;

use super::{error::SchedError, protocols::ResourceProtocol, traits::Scheduler};

/// The closed set of policies a run can select
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    #[default]
    Fifo,
    Sjf,
    Stcf,
    RoundRobin,
    Priority,
    PriorityAging,
    PriorityCeiling,
    PriorityInheritance,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 8] = [
        PolicyKind::Fifo,
        PolicyKind::Sjf,
        PolicyKind::Stcf,
        PolicyKind::RoundRobin,
        PolicyKind::Priority,
        PolicyKind::PriorityAging,
        PolicyKind::PriorityCeiling,
        PolicyKind::PriorityInheritance,
    ];

    /// Display name, identical to the built policy's Scheduler::name()
    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::Fifo => "FIFO",
            PolicyKind::Sjf => "Shortest-Job First",
            PolicyKind::Stcf => "Shortest Time-to-Complete First",
            PolicyKind::RoundRobin => "Round-Robin",
            PolicyKind::Priority => PriorityVariant::Plain.name(),
            PolicyKind::PriorityAging => PriorityVariant::Aging.name(),
            PolicyKind::PriorityCeiling => PriorityVariant::Ceiling.name(),
            PolicyKind::PriorityInheritance => PriorityVariant::Inheritance.name(),
        }
    }

    /// Short command-line alias
    pub fn alias(self) -> &'static str {
        match self {
            PolicyKind::Fifo => "fifo",
            PolicyKind::Sjf => "sjf",
            PolicyKind::Stcf => "stcf",
            PolicyKind::RoundRobin => "rr",
            PolicyKind::Priority => "prio",
            PolicyKind::PriorityAging => "pa",
            PolicyKind::PriorityCeiling => "pcp",
            PolicyKind::PriorityInheritance => "pip",
        }
    }

    /// Resource protocol the policy installs
    pub fn protocol(self) -> ResourceProtocol {
        match self {
            PolicyKind::Fifo | PolicyKind::Sjf | PolicyKind::Stcf | PolicyKind::RoundRobin => {
                ResourceProtocol::Fcfs
            }
            PolicyKind::Priority | PolicyKind::PriorityAging => ResourceProtocol::Priority,
            PolicyKind::PriorityCeiling => ResourceProtocol::Ceiling,
            PolicyKind::PriorityInheritance => ResourceProtocol::Inheritance,
        }
    }

    /// Whether the policy ranks processes by effective priority
    pub fn is_priority_based(self) -> bool {
        self.protocol() != ResourceProtocol::Fcfs
    }

    /// Instantiate a fresh policy
    pub fn build(self) -> Box<dyn Scheduler> {
        match self {
            PolicyKind::Fifo => Box::new(FifoPolicy::new()),
            PolicyKind::Sjf => Box::new(SjfPolicy::new()),
            PolicyKind::Stcf => Box::new(StcfPolicy::new()),
            PolicyKind::RoundRobin => Box::new(RoundRobinPolicy::new()),
            PolicyKind::Priority => Box::new(PriorityPolicy::plain()),
            PolicyKind::PriorityAging => Box::new(PriorityPolicy::aging()),
            PolicyKind::PriorityCeiling => Box::new(PriorityPolicy::ceiling()),
            PolicyKind::PriorityInheritance => Box::new(PriorityPolicy::inheritance()),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PolicyKind {
    type Err = SchedError;

    /// Accepts either the display name or the alias (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        PolicyKind::ALL
            .into_iter()
            .find(|kind| kind.alias().eq_ignore_ascii_case(s) || kind.name().eq_ignore_ascii_case(s))
            .ok_or(SchedError::UnknownPolicy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_policy_reports_kind_name() {
        for kind in PolicyKind::ALL {
            assert_eq!(kind.build().name(), kind.name());
        }
    }

    #[test]
    fn test_parse_names_and_aliases() {
        for kind in PolicyKind::ALL {
            assert_eq!(kind.alias().parse::<PolicyKind>(), Ok(kind));
            assert_eq!(kind.name().parse::<PolicyKind>(), Ok(kind));
        }
        assert_eq!(" PIP ".parse::<PolicyKind>(), Ok(PolicyKind::PriorityInheritance));
        assert_eq!("lottery".parse::<PolicyKind>(), Err(SchedError::UnknownPolicy));
    }

    #[test]
    fn test_protocol_mapping() {
        assert_eq!(PolicyKind::RoundRobin.protocol(), ResourceProtocol::Fcfs);
        assert_eq!(PolicyKind::PriorityAging.protocol(), ResourceProtocol::Priority);
        assert!(!PolicyKind::Stcf.is_priority_based());
        assert!(PolicyKind::PriorityCeiling.is_priority_based());
    }
}
