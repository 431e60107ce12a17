/*
 * Scheduler Type Definitions
 *
 * This module defines the core types used throughout the scheduler subsystem.
 * These types are designed to be lightweight, Copy-able, and suitable for
 * use in both policy and mechanism layers.
 */

use core::fmt;

/// Highest effective priority a process can reach
///
/// The priority ceiling protocol boosts resource owners to this value and
/// aging clamps at it.
pub const MAX_PRIO: u32 = 100;

/// Number of exclusive resources in the default resource table
pub const NR_RESOURCES: usize = 32;

/// Simulation time, in ticks
///
/// Every tick the CPU runs at most one process for exactly one unit of work.
pub type Tick = u64;

/// Process priority
///
/// Higher values indicate higher priority. Policies compare priorities
/// numerically; ties are broken by scan order, never by this type.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub u32);

impl Priority {
    /// Minimum priority
    pub const MIN: Priority = Priority(0);

    /// Default ceiling (see [`MAX_PRIO`])
    pub const MAX: Priority = Priority(MAX_PRIO);

    /// Get the value as u32
    pub fn get(self) -> u32 {
        self.0
    }

    /// One step higher, clamped at `ceiling`
    pub fn boosted(self, ceiling: Priority) -> Priority {
        Priority(self.0.saturating_add(1)).min(ceiling)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resource identifier
///
/// Index into the fixed-size resource table of a simulation context.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(pub usize);

impl ResourceId {
    /// Get the ID as a usize for indexing
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}
