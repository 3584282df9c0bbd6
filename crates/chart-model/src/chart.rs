// Chart document: bucket store + history + handles + change notification.
//
// Every mutation runs inside an edit batch. The first time a batch touches a
// bucket, the bucket's pre-image is captured; when the outermost batch ends
// the captured pre-images become one undo step and every touched bucket is
// notified once.

use std::collections::BTreeSet;
use std::fmt;

use log::{debug, warn};

use crate::bucket::Bucket;
use crate::config::ChartConfig;
use crate::error::ChartError;
use crate::handle::HandleTable;
use crate::history::{Batch, History};
use crate::note::Note;
use crate::store::BucketStore;
use crate::timing::{ScrollVelocity, StopPoint, TempoPoint};
use crate::{BucketIndex, Column, Time};

/// Single-subscriber hook invoked with every structurally altered bucket.
pub type ChangeCallback = Box<dyn FnMut(&Bucket)>;

#[derive(Debug, Default)]
struct EditScope {
    depth: usize,
    captured: Batch,
    captured_indices: BTreeSet<BucketIndex>,
    dirty: BTreeSet<BucketIndex>,
}

pub struct Chart {
    config: ChartConfig,
    pub(crate) store: BucketStore,
    history: History,
    pub(crate) handles: HandleTable,
    on_change: Option<ChangeCallback>,
    scope: EditScope,
    /// A standalone `register_history*` batch waiting for the edit it
    /// belongs to.
    registered_pending: bool,
}

impl fmt::Debug for Chart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chart")
            .field("config", &self.config)
            .field("buckets", &self.store.len())
            .field("undo", &self.history.undo_len())
            .field("redo", &self.history.redo_len())
            .field("batch_depth", &self.scope.depth)
            .finish_non_exhaustive()
    }
}

impl Default for Chart {
    fn default() -> Self {
        Self::from_valid_config(ChartConfig::default())
    }
}

impl Chart {
    /// Empty chart with `key_count` columns and default settings.
    pub fn new(key_count: usize) -> Result<Self, ChartError> {
        Self::with_config(ChartConfig::with_key_count(key_count))
    }

    pub fn with_config(config: ChartConfig) -> Result<Self, ChartError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: ChartConfig) -> Self {
        Self {
            store: BucketStore::new(config.bucket_width),
            history: History::new(config.history_capacity),
            handles: HandleTable::default(),
            on_change: None,
            scope: EditScope::default(),
            registered_pending: false,
            config,
        }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn key_count(&self) -> usize {
        self.config.key_count
    }

    pub fn bucket_width(&self) -> Time {
        self.store.width()
    }

    pub fn store(&self) -> &BucketStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub(crate) fn accepts_column(&self, column: Column) -> bool {
        column < self.config.key_count
    }

    // -----------------------------------------------------------------------
    // Change notification
    // -----------------------------------------------------------------------

    /// Replace the change subscriber.
    pub fn set_change_callback(&mut self, callback: impl FnMut(&Bucket) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    pub fn clear_change_callback(&mut self) {
        self.on_change = None;
    }

    fn notify(&mut self, index: BucketIndex) {
        let bucket = self.store.get_or_create_index(index);
        if let Some(callback) = self.on_change.as_mut() {
            callback(bucket);
        }
    }

    /// Notify every bucket in `begin..=end`. Inside a batch the sweep is
    /// deferred to the end of the outermost batch.
    pub fn notify_range(&mut self, begin: Time, end: Time) {
        let indices = self.store.indices_in_range(begin, end);
        if self.scope.depth > 0 {
            self.scope.dirty.extend(indices);
            return;
        }
        for index in indices {
            self.notify(index);
        }
    }

    // -----------------------------------------------------------------------
    // Edit batches
    // -----------------------------------------------------------------------

    pub fn begin_edit_batch(&mut self) {
        self.scope.depth += 1;
    }

    /// Close a batch. Closing the outermost batch records one undo step (if
    /// anything was captured) and fires the deferred notifications.
    pub fn end_edit_batch(&mut self) {
        if self.scope.depth == 0 {
            warn!("end_edit_batch called without an open batch");
            return;
        }
        self.scope.depth -= 1;
        if self.scope.depth > 0 {
            return;
        }

        let batch = std::mem::take(&mut self.scope.captured);
        self.scope.captured_indices.clear();
        let dirty = std::mem::take(&mut self.scope.dirty);

        if !batch.is_empty() {
            debug!("recorded history batch of {} bucket(s)", batch.len());
            if std::mem::take(&mut self.registered_pending) {
                self.history.extend_last(batch);
            } else {
                self.history.push(batch);
            }
        }
        for index in dirty {
            self.notify(index);
        }
    }

    /// Run `edit` inside an edit batch.
    pub fn edit_batch<R>(&mut self, edit: impl FnOnce(&mut Self) -> R) -> R {
        self.begin_edit_batch();
        let result = edit(self);
        self.end_edit_batch();
        result
    }

    pub fn is_batch_open(&self) -> bool {
        self.scope.depth > 0
    }

    fn capture(&mut self, index: BucketIndex) {
        if self.scope.depth == 0 || !self.scope.captured_indices.insert(index) {
            return;
        }
        let snapshot = self.store.get_or_create_index(index).clone();
        self.scope.captured.push_unchecked(snapshot);
    }

    /// Mutable bucket for an edit: captures its pre-image and marks it dirty.
    pub(crate) fn edit_bucket(&mut self, index: BucketIndex) -> &mut Bucket {
        debug_assert!(self.scope.depth > 0, "bucket edited outside an edit batch");
        self.capture(index);
        self.scope.dirty.insert(index);
        self.store.get_or_create_index(index)
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Snapshot the bucket owning `time` ahead of an edit.
    pub fn register_history(&mut self, time: Time) {
        self.register_history_ranged(time, time);
    }

    /// Snapshot every bucket in `begin..=end` ahead of an edit.
    ///
    /// Inside a batch the snapshots join the open batch. Outside, they are
    /// pushed as a batch of their own and the redo stack is cleared; the
    /// next edit then folds into that batch, so registering and editing is
    /// a single undo step.
    pub fn register_history_ranged(&mut self, begin: Time, end: Time) {
        let indices = self.store.indices_in_range(begin, end);
        if self.scope.depth > 0 {
            for index in indices {
                self.capture(index);
            }
            return;
        }

        let mut batch = Batch::default();
        for index in indices {
            batch.push_unchecked(self.store.get_or_create_index(index).clone());
        }
        self.history.push(batch);
        self.registered_pending = true;
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn clear_history(&mut self) {
        self.registered_pending = false;
        self.history.clear();
    }

    /// Restore the buckets of the latest batch. False when nothing to undo.
    pub fn undo(&mut self) -> bool {
        if self.scope.depth > 0 {
            warn!("undo refused while an edit batch is open");
            return false;
        }
        self.registered_pending = false;
        let Some(batch) = self.history.pop_undo() else {
            return false;
        };
        let inverse = self.restore(batch);
        self.history.push_redo(inverse);
        true
    }

    /// Re-apply the latest undone batch. False when nothing to redo.
    pub fn redo(&mut self) -> bool {
        if self.scope.depth > 0 {
            warn!("redo refused while an edit batch is open");
            return false;
        }
        self.registered_pending = false;
        let Some(batch) = self.history.pop_redo() else {
            return false;
        };
        let inverse = self.restore(batch);
        self.history.push_undo_keep_redo(inverse);
        true
    }

    /// Overwrite live buckets with snapshots, returning their current state.
    fn restore(&mut self, batch: Batch) -> Batch {
        let mut inverse = Batch::default();
        for snapshot in batch.into_buckets() {
            let index = snapshot.index();
            let previous = self.store.replace(snapshot);
            self.handles.forget_bucket(&previous);
            if let Some(restored) = self.store.get_by_index(index) {
                self.handles.adopt_bucket(restored);
            }
            inverse.push_unchecked(previous);
            self.notify(index);
        }
        inverse
    }

    // -----------------------------------------------------------------------
    // Bucket access and iteration
    // -----------------------------------------------------------------------

    /// Bucket owning `time`, created empty if absent.
    pub fn get_or_create_bucket(&mut self, time: Time) -> &Bucket {
        self.store.get_or_create(time)
    }

    pub fn bucket(&self, time: Time) -> Option<&Bucket> {
        self.store.get(time)
    }

    /// Visit buckets from the bucket of `begin` to the bucket of `end`
    /// (descending when `begin > end`), creating missing ones.
    pub fn for_each_bucket_in_range(
        &mut self,
        begin: Time,
        end: Time,
        mut visitor: impl FnMut(&Bucket),
    ) {
        self.store.for_each_in_range(begin, end, |bucket| visitor(&*bucket));
    }

    pub fn buckets(&self) -> impl Iterator<Item = &Bucket> + '_ {
        self.store.iter()
    }

    /// Existing buckets overlapping `begin..=end`, ascending.
    pub fn buckets_in_range(&self, begin: Time, end: Time) -> impl Iterator<Item = &Bucket> + '_ {
        self.store.range(begin, end)
    }

    /// Every note of the chart, bucket by bucket.
    pub fn notes(&self) -> impl Iterator<Item = (Column, &Note)> + '_ {
        self.store.iter().flat_map(Bucket::all_notes)
    }

    pub fn tempo_points(&self) -> impl Iterator<Item = &TempoPoint> + '_ {
        self.store.iter().flat_map(|bucket| bucket.tempo_points().iter())
    }

    pub fn stops(&self) -> impl Iterator<Item = &StopPoint> + '_ {
        self.store.iter().flat_map(|bucket| bucket.stops().iter())
    }

    pub fn svs(&self) -> impl Iterator<Item = &ScrollVelocity> + '_ {
        self.store.iter().flat_map(|bucket| bucket.svs().iter())
    }

    pub fn note_count(&self) -> usize {
        self.store.iter().map(Bucket::note_count).sum()
    }
}
