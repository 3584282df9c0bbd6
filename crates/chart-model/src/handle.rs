// Opaque entity handles and the table that resolves them to buckets.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::BucketIndex;
use crate::bucket::Bucket;

/// Stable identity of an entity stored in a chart.
///
/// Ids are handed out by the chart on insertion and survive moves,
/// revaluations and undo/redo. A value that was never inserted carries
/// [`EntityId::NONE`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct EntityId(u64);

impl EntityId {
    pub const NONE: EntityId = EntityId(0);

    pub fn is_assigned(self) -> bool {
        self != Self::NONE
    }

    #[cfg(test)]
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// Maps entity ids to the bucket currently owning them.
#[derive(Debug, Default)]
pub(crate) struct HandleTable {
    next: u64,
    locations: HashMap<EntityId, BucketIndex>,
}

impl HandleTable {
    pub fn allocate(&mut self, bucket: BucketIndex) -> EntityId {
        self.next += 1;
        let id = EntityId(self.next);
        self.locations.insert(id, bucket);
        id
    }

    pub fn relocate(&mut self, id: EntityId, bucket: BucketIndex) {
        if id.is_assigned() {
            self.locations.insert(id, bucket);
        }
    }

    pub fn release(&mut self, id: EntityId) {
        self.locations.remove(&id);
    }

    pub fn locate(&self, id: EntityId) -> Option<BucketIndex> {
        self.locations.get(&id).copied()
    }

    /// Drop every id of `bucket` that still points at it.
    pub fn forget_bucket(&mut self, bucket: &Bucket) {
        for id in bucket.entity_ids() {
            if self.locations.get(&id) == Some(&bucket.index()) {
                self.locations.remove(&id);
            }
        }
    }

    /// Point every id of `bucket` at it.
    pub fn adopt_bucket(&mut self, bucket: &Bucket) {
        for id in bucket.entity_ids() {
            self.locations.insert(id, bucket.index());
        }
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_is_monotonic() {
        let mut table = HandleTable::default();
        let a = table.allocate(0);
        let b = table.allocate(3);
        assert!(a.is_assigned());
        assert!(b > a);
        assert_eq!(table.locate(a), Some(0));
        assert_eq!(table.locate(b), Some(3));
    }

    #[test]
    fn test_release_and_relocate() {
        let mut table = HandleTable::default();
        let a = table.allocate(1);
        table.relocate(a, 5);
        assert_eq!(table.locate(a), Some(5));
        table.release(a);
        assert_eq!(table.locate(a), None);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_none_is_never_tracked() {
        let mut table = HandleTable::default();
        table.relocate(EntityId::NONE, 2);
        assert_eq!(table.locate(EntityId::NONE), None);
        assert!(!EntityId::default().is_assigned());
    }
}
