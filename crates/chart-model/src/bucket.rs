// Time bucket: fixed-width slice of the timeline owning every entity inside it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::handle::EntityId;
use crate::note::Note;
use crate::timing::{ScrollVelocity, StopPoint, TempoPoint, TimedEntity};
use crate::{BucketIndex, Column, Time};

/// All entities whose time falls in `[time, time + width)`.
///
/// Every list is kept sorted ascending by time. Buckets are only mutated
/// through the chart, which keeps history and handles consistent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Bucket {
    index: BucketIndex,
    time: Time,
    pub(crate) notes: BTreeMap<Column, Vec<Note>>,
    pub(crate) tempo_points: Vec<TempoPoint>,
    pub(crate) stops: Vec<StopPoint>,
    pub(crate) svs: Vec<ScrollVelocity>,
}

impl Bucket {
    pub fn new(index: BucketIndex, width: Time) -> Self {
        Self {
            index,
            time: index * width,
            ..Self::default()
        }
    }

    pub fn index(&self) -> BucketIndex {
        self.index
    }

    /// Start time of the bucket in milliseconds
    pub fn time(&self) -> Time {
        self.time
    }

    /// Notes of one column, sorted by time.
    pub fn notes(&self, column: Column) -> &[Note] {
        self.notes.get(&column).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every note of the bucket with its column, column by column.
    pub fn all_notes(&self) -> impl Iterator<Item = (Column, &Note)> + '_ {
        self.notes
            .iter()
            .flat_map(|(&column, notes)| notes.iter().map(move |note| (column, note)))
    }

    pub fn tempo_points(&self) -> &[TempoPoint] {
        &self.tempo_points
    }

    pub fn stops(&self) -> &[StopPoint] {
        &self.stops
    }

    pub fn svs(&self) -> &[ScrollVelocity] {
        &self.svs
    }

    pub fn note_count(&self) -> usize {
        self.notes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.note_count() == 0
            && self.tempo_points.is_empty()
            && self.stops.is_empty()
            && self.svs.is_empty()
    }

    pub fn find_note(&self, time: Time, column: Column) -> Option<&Note> {
        self.notes(column).iter().find(|note| note.time == time)
    }

    pub(crate) fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.notes
            .values()
            .flatten()
            .map(|note| note.id)
            .chain(self.tempo_points.iter().map(|point| point.id))
            .chain(self.stops.iter().map(|stop| stop.id))
            .chain(self.svs.iter().map(|sv| sv.id))
    }

    pub(crate) fn insert_note(&mut self, column: Column, note: Note) {
        let notes = self.notes.entry(column).or_default();
        let at = notes.partition_point(|n| n.time <= note.time);
        notes.insert(at, note);
    }

    pub(crate) fn take_note(&mut self, time: Time, column: Column) -> Option<Note> {
        let notes = self.notes.get_mut(&column)?;
        let at = notes.iter().position(|note| note.time == time)?;
        let note = notes.remove(at);
        if notes.is_empty() {
            self.notes.remove(&column);
        }
        Some(note)
    }

    pub(crate) fn insert_timed<T: TimedEntity>(&mut self, value: T) {
        let list = T::list_mut(self);
        let at = list.partition_point(|v| v.time() <= value.time());
        list.insert(at, value);
    }

    pub(crate) fn take_timed<T: TimedEntity>(&mut self, value: &T) -> Option<T> {
        let list = T::list_mut(self);
        let at = list.iter().position(|v| v.same_entity(value))?;
        Some(list.remove(at))
    }
}
