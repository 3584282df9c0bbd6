// Undo/redo stacks of whole-bucket snapshot batches.

use std::collections::VecDeque;

use log::debug;

use crate::BucketIndex;
use crate::bucket::Bucket;

/// One undo/redo unit: pre-images of every bucket an edit touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    buckets: Vec<Bucket>,
}

impl Batch {
    pub fn contains(&self, index: BucketIndex) -> bool {
        self.buckets.iter().any(|bucket| bucket.index() == index)
    }

    /// Add a snapshot unless this batch already holds one for its index.
    pub fn push(&mut self, bucket: Bucket) -> bool {
        if self.contains(bucket.index()) {
            return false;
        }
        self.buckets.push(bucket);
        true
    }

    /// Caller guarantees the index is not present yet.
    pub(crate) fn push_unchecked(&mut self, bucket: Bucket) {
        self.buckets.push(bucket);
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub(crate) fn into_buckets(self) -> Vec<Bucket> {
        self.buckets
    }
}

/// Two stacks of batches with an optional cap on the undo depth.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Batch>,
    redo: Vec<Batch>,
    capacity: Option<usize>,
}

impl History {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            capacity,
        }
    }

    /// Record a new edit. Invalidates everything that could be redone.
    pub fn push(&mut self, batch: Batch) {
        if batch.is_empty() {
            return;
        }
        self.redo.clear();
        self.undo.push_back(batch);
        self.evict();
    }

    /// Fold `batch` into the latest undo batch. Buckets the latest batch
    /// already holds keep their earlier pre-image.
    pub(crate) fn extend_last(&mut self, batch: Batch) {
        let Some(last) = self.undo.back_mut() else {
            self.push(batch);
            return;
        };
        for bucket in batch.into_buckets() {
            last.push(bucket);
        }
        self.redo.clear();
    }

    pub(crate) fn pop_undo(&mut self) -> Option<Batch> {
        self.undo.pop_back()
    }

    pub(crate) fn pop_redo(&mut self) -> Option<Batch> {
        self.redo.pop()
    }

    pub(crate) fn push_redo(&mut self, batch: Batch) {
        self.redo.push(batch);
    }

    /// Put a redone batch back on the undo stack without touching redo.
    pub(crate) fn push_undo_keep_redo(&mut self, batch: Batch) {
        self.undo.push_back(batch);
        self.evict();
    }

    fn evict(&mut self) {
        let Some(capacity) = self.capacity else {
            return;
        };
        while self.undo.len() > capacity {
            self.undo.pop_front();
            debug!("history full ({capacity} batches), dropped oldest batch");
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
