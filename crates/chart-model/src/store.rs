// Sparse, lazily populated map of time buckets.

use std::collections::BTreeMap;

use crate::bucket::Bucket;
use crate::{BucketIndex, Time};

/// Partitions the timeline into fixed-width buckets.
///
/// Buckets are created on first access and never deleted, only emptied.
#[derive(Debug, Clone)]
pub struct BucketStore {
    width: Time,
    buckets: BTreeMap<BucketIndex, Bucket>,
}

impl BucketStore {
    /// `width` must be positive; the chart validates it through its config.
    pub fn new(width: Time) -> Self {
        Self {
            width,
            buckets: BTreeMap::new(),
        }
    }

    pub fn width(&self) -> Time {
        self.width
    }

    /// Bucket index owning `time` (floor division).
    pub fn index_of(&self, time: Time) -> BucketIndex {
        time.div_euclid(self.width)
    }

    /// Start time of the bucket owning `time`.
    pub fn bucket_time(&self, time: Time) -> Time {
        self.index_of(time) * self.width
    }

    pub fn get(&self, time: Time) -> Option<&Bucket> {
        self.buckets.get(&self.index_of(time))
    }

    pub fn get_by_index(&self, index: BucketIndex) -> Option<&Bucket> {
        self.buckets.get(&index)
    }

    pub fn get_or_create(&mut self, time: Time) -> &mut Bucket {
        let index = self.index_of(time);
        self.get_or_create_index(index)
    }

    pub fn get_or_create_index(&mut self, index: BucketIndex) -> &mut Bucket {
        let width = self.width;
        self.buckets
            .entry(index)
            .or_insert_with(|| Bucket::new(index, width))
    }

    /// Bucket indices from the bucket of `begin` to the bucket of `end`,
    /// inclusive. Descending when `begin > end`.
    pub fn indices_in_range(&self, begin: Time, end: Time) -> Vec<BucketIndex> {
        let first = self.index_of(begin);
        let last = self.index_of(end);
        if begin > end {
            (last..=first).rev().collect()
        } else {
            (first..=last).collect()
        }
    }

    /// Visit every bucket overlapping `begin..=end`, creating missing ones.
    ///
    /// Works at bucket granularity: callers filter entities by exact time.
    pub fn for_each_in_range(
        &mut self,
        begin: Time,
        end: Time,
        mut visitor: impl FnMut(&mut Bucket),
    ) {
        for index in self.indices_in_range(begin, end) {
            visitor(self.get_or_create_index(index));
        }
    }

    /// Existing buckets overlapping `begin..=end`, ascending. Never creates.
    pub fn range(&self, begin: Time, end: Time) -> impl DoubleEndedIterator<Item = &Bucket> + '_ {
        let first = self.index_of(begin.min(end));
        let last = self.index_of(begin.max(end));
        self.buckets.range(first..=last).map(|(_, bucket)| bucket)
    }

    /// Existing buckets at or before the bucket of `time`, latest first.
    pub fn range_back_from(&self, time: Time) -> impl Iterator<Item = &Bucket> + '_ {
        let index = self.index_of(time);
        self.buckets.range(..=index).rev().map(|(_, bucket)| bucket)
    }

    /// Existing buckets at or after the bucket of `time`, earliest first.
    pub fn range_from(&self, time: Time) -> impl Iterator<Item = &Bucket> + '_ {
        let index = self.index_of(time);
        self.buckets.range(index..).map(|(_, bucket)| bucket)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Bucket> + '_ {
        self.buckets.values()
    }

    /// Swap in a full bucket, returning the previous content (empty if absent).
    pub(crate) fn replace(&mut self, bucket: Bucket) -> Bucket {
        let index = bucket.index();
        self.buckets
            .insert(index, bucket)
            .unwrap_or_else(|| Bucket::new(index, self.width))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
