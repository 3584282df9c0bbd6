// Tempo, stop and scroll velocity editing.

use log::debug;

use crate::chart::Chart;
use crate::handle::EntityId;
use crate::timing::{ScrollVelocity, StopPoint, TempoPoint, TimedEntity};
use crate::{BucketIndex, Time};

impl Chart {
    // -----------------------------------------------------------------------
    // Tempo points
    // -----------------------------------------------------------------------

    /// Insert a tempo point. Any id the value carries is replaced.
    pub fn insert_tempo_point(&mut self, point: TempoPoint) -> Option<EntityId> {
        if !point.is_valid() {
            debug!("rejected tempo point with bpm {}", point.bpm());
            return None;
        }
        Some(self.insert_timed(point))
    }

    pub fn remove_tempo_point(&mut self, point: &TempoPoint) -> bool {
        self.remove_timed(point)
    }

    pub fn move_tempo_point(&mut self, point: &TempoPoint, to: Time) -> bool {
        self.move_timed(point, to)
    }

    /// Replace `former` with `current`, keeping the id of the stored point.
    pub fn revaluate_tempo_point(&mut self, former: &TempoPoint, current: TempoPoint) -> bool {
        if !current.is_valid() {
            debug!("rejected tempo point with bpm {}", current.bpm());
            return false;
        }
        self.revaluate_timed(former, current)
    }

    pub fn tempo_point(&self, id: EntityId) -> Option<&TempoPoint> {
        self.timed_by_id(id)
    }

    // -----------------------------------------------------------------------
    // Stops
    // -----------------------------------------------------------------------

    pub fn insert_stop(&mut self, stop: StopPoint) -> Option<EntityId> {
        if !is_valid_stop(&stop) {
            debug!("rejected stop with length {}", stop.length);
            return None;
        }
        Some(self.insert_timed(stop))
    }

    pub fn remove_stop(&mut self, stop: &StopPoint) -> bool {
        self.remove_timed(stop)
    }

    pub fn move_stop(&mut self, stop: &StopPoint, to: Time) -> bool {
        self.move_timed(stop, to)
    }

    pub fn revaluate_stop(&mut self, former: &StopPoint, current: StopPoint) -> bool {
        if !is_valid_stop(&current) {
            return false;
        }
        self.revaluate_timed(former, current)
    }

    pub fn stop(&self, id: EntityId) -> Option<&StopPoint> {
        self.timed_by_id(id)
    }

    // -----------------------------------------------------------------------
    // Scroll velocities
    // -----------------------------------------------------------------------

    pub fn insert_sv(&mut self, sv: ScrollVelocity) -> Option<EntityId> {
        if !sv.multiplier.is_finite() {
            debug!("rejected scroll velocity with multiplier {}", sv.multiplier);
            return None;
        }
        Some(self.insert_timed(sv))
    }

    pub fn remove_sv(&mut self, sv: &ScrollVelocity) -> bool {
        self.remove_timed(sv)
    }

    pub fn move_sv(&mut self, sv: &ScrollVelocity, to: Time) -> bool {
        self.move_timed(sv, to)
    }

    pub fn revaluate_sv(&mut self, former: &ScrollVelocity, current: ScrollVelocity) -> bool {
        if !current.multiplier.is_finite() {
            return false;
        }
        self.revaluate_timed(former, current)
    }

    pub fn sv(&self, id: EntityId) -> Option<&ScrollVelocity> {
        self.timed_by_id(id)
    }

    // -----------------------------------------------------------------------
    // Shared plumbing
    // -----------------------------------------------------------------------

    fn insert_timed<T: TimedEntity>(&mut self, mut value: T) -> EntityId {
        value.set_id(EntityId::NONE);
        self.edit_batch(|chart| chart.place_timed(value))
    }

    fn remove_timed<T: TimedEntity>(&mut self, value: &T) -> bool {
        let Some(index) = self.locate_timed(value) else {
            debug!("no {} at {} to remove", T::LABEL, value.time());
            return false;
        };
        self.edit_batch(|chart| chart.take_timed(index, value)).is_some()
    }

    fn move_timed<T: TimedEntity>(&mut self, value: &T, to: Time) -> bool {
        let Some(index) = self.locate_timed(value) else {
            return false;
        };
        let Some(mut moved) = self
            .store
            .get_by_index(index)
            .and_then(|bucket| T::list(bucket).iter().find(|v| v.same_entity(value)))
            .copied()
        else {
            return false;
        };
        moved.set_time(to);
        self.revaluate_timed(value, moved)
    }

    /// Take `former` out and place `current` under the same id, relocating
    /// it when its time changed bucket.
    fn revaluate_timed<T: TimedEntity>(&mut self, former: &T, mut current: T) -> bool {
        let Some(index) = self.locate_timed(former) else {
            debug!("no {} at {} to revaluate", T::LABEL, former.time());
            return false;
        };
        self.edit_batch(|chart| {
            let Some(taken) = chart.take_timed(index, former) else {
                return false;
            };
            current.set_id(taken.id());
            chart.place_timed(current);
            true
        })
    }

    /// Store a timing entity, allocating an id unless it already has one.
    pub(crate) fn place_timed<T: TimedEntity>(&mut self, mut value: T) -> EntityId {
        let index = self.store.index_of(value.time());
        let id = if value.id().is_assigned() {
            self.handles.relocate(value.id(), index);
            value.id()
        } else {
            self.handles.allocate(index)
        };
        value.set_id(id);
        self.edit_bucket(index).insert_timed(value);
        id
    }

    pub(crate) fn take_timed<T: TimedEntity>(&mut self, index: BucketIndex, value: &T) -> Option<T> {
        let taken = self.edit_bucket(index).take_timed(value)?;
        self.handles.release(taken.id());
        Some(taken)
    }

    /// Bucket holding `value`: the handle's bucket first, then the bucket
    /// owning its time.
    pub(crate) fn locate_timed<T: TimedEntity>(&self, value: &T) -> Option<BucketIndex> {
        let by_handle = if value.id().is_assigned() {
            self.handles.locate(value.id())
        } else {
            None
        };
        by_handle
            .into_iter()
            .chain(std::iter::once(self.store.index_of(value.time())))
            .find(|&index| {
                self.store
                    .get_by_index(index)
                    .is_some_and(|bucket| T::list(bucket).iter().any(|v| v.same_entity(value)))
            })
    }

    fn timed_by_id<T: TimedEntity>(&self, id: EntityId) -> Option<&T> {
        let bucket = self.store.get_by_index(self.handles.locate(id)?)?;
        T::list(bucket).iter().find(|value| value.id() == id)
    }
}

fn is_valid_stop(stop: &StopPoint) -> bool {
    stop.length.is_finite() && stop.length >= 0.0
}
