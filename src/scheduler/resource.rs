/*
 * Resource Table
 *
 * Exclusive, non-reentrant resources. Each resource has at most one owner
 * and a waitqueue kept in arrival order. Priority-aware protocols never
 * reorder the waitqueue; they scan it when a wake-up decision is needed.
 */

use alloc::{collections::VecDeque, vec::Vec};

use super::{error::SchedError, process::ProcessId, types::ResourceId};

/// A single exclusive resource
#[derive(Debug)]
pub struct Resource {
    id: ResourceId,

    /// Process holding the resource, if any
    pub(crate) owner: Option<ProcessId>,

    /// Processes blocked on this resource, in arrival order
    pub(crate) waitqueue: VecDeque<ProcessId>,
}

impl Resource {
    fn new(id: ResourceId) -> Self {
        Self {
            id,
            owner: None,
            waitqueue: VecDeque::new(),
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn owner(&self) -> Option<ProcessId> {
        self.owner
    }

    pub fn is_free(&self) -> bool {
        self.owner.is_none()
    }

    /// Blocked processes, oldest first
    pub fn waiters(&self) -> &VecDeque<ProcessId> {
        &self.waitqueue
    }
}

/// Fixed-size table of resources, indexed by ResourceId
#[derive(Debug)]
pub struct ResourceTable {
    resources: Vec<Resource>,
}

impl ResourceTable {
    /// Create a table with `count` free resources
    pub fn new(count: usize) -> Self {
        let resources = (0..count).map(|i| Resource::new(ResourceId(i))).collect();
        Self { resources }
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Look up a resource; out-of-range ids are an error, never a no-op
    pub fn get(&self, id: ResourceId) -> Result<&Resource, SchedError> {
        self.resources
            .get(id.as_usize())
            .ok_or(SchedError::InvalidResource(id))
    }

    pub(crate) fn get_mut(&mut self, id: ResourceId) -> Result<&mut Resource, SchedError> {
        self.resources
            .get_mut(id.as_usize())
            .ok_or(SchedError::InvalidResource(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    /// Resources currently owned by `pid`
    pub fn owned_by(&self, pid: ProcessId) -> impl Iterator<Item = &Resource> {
        self.resources
            .iter()
            .filter(move |r| r.owner == Some(pid))
    }

    /// The resource `pid` is waiting on, if it is blocked
    pub fn waiting_on(&self, pid: ProcessId) -> Option<ResourceId> {
        self.resources
            .iter()
            .find(|r| r.waitqueue.contains(&pid))
            .map(|r| r.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_lookup_fails() {
        let table = ResourceTable::new(4);
        assert_eq!(table.len(), 4);
        assert!(table.get(ResourceId(3)).is_ok());
        assert_eq!(
            table.get(ResourceId(4)).unwrap_err(),
            SchedError::InvalidResource(ResourceId(4))
        );
    }

    #[test]
    fn test_ownership_queries() {
        let mut table = ResourceTable::new(3);
        table.get_mut(ResourceId(1)).unwrap().owner = Some(ProcessId(7));
        table
            .get_mut(ResourceId(2))
            .unwrap()
            .waitqueue
            .push_back(ProcessId(8));

        let owned: Vec<_> = table.owned_by(ProcessId(7)).map(|r| r.id()).collect();
        assert_eq!(owned, [ResourceId(1)]);
        assert_eq!(table.waiting_on(ProcessId(8)), Some(ResourceId(2)));
        assert_eq!(table.waiting_on(ProcessId(7)), None);
        assert!(table.get(ResourceId(0)).unwrap().is_free());
    }
}
