// Read-only timing and note lookups.

use crate::bucket::Bucket;
use crate::chart::Chart;
use crate::note::Note;
use crate::timing::{ScrollVelocity, StopPoint, TempoPoint, TimedEntity};
use crate::{Column, Time};

impl Chart {
    /// Latest tempo point at or before `time`.
    pub fn previous_tempo_point(&self, time: Time) -> Option<&TempoPoint> {
        self.previous_timed(time)
    }

    /// Earliest tempo point strictly after `time`.
    pub fn next_tempo_point(&self, time: Time) -> Option<&TempoPoint> {
        self.next_timed(time)
    }

    /// Tempo in effect at `time`. Times before the first tempo point fall
    /// back to the earliest one.
    pub fn governing_tempo_point(&self, time: Time) -> Option<&TempoPoint> {
        self.previous_tempo_point(time)
            .or_else(|| self.tempo_points().next())
    }

    pub fn previous_stop(&self, time: Time) -> Option<&StopPoint> {
        self.previous_timed(time)
    }

    pub fn next_stop(&self, time: Time) -> Option<&StopPoint> {
        self.next_timed(time)
    }

    pub fn previous_sv(&self, time: Time) -> Option<&ScrollVelocity> {
        self.previous_timed(time)
    }

    pub fn next_sv(&self, time: Time) -> Option<&ScrollVelocity> {
        self.next_timed(time)
    }

    /// Tempo points relevant to drawing `begin..=end`.
    ///
    /// Works at bucket granularity and reaches back to the closest bucket
    /// with a tempo point before the range, so the tempo governing `begin`
    /// is included. When nothing exists at or before the range, the bucket
    /// holding the next tempo point after it is returned instead.
    pub fn tempo_points_in_range(&self, begin: Time, end: Time) -> Vec<TempoPoint> {
        let (begin, end) = (begin.min(end), begin.max(end));
        let reach = begin - self.bucket_width();
        let lower = self
            .store
            .range_back_from(reach)
            .find(|bucket| !bucket.tempo_points().is_empty())
            .map_or(reach, Bucket::time);

        let points: Vec<TempoPoint> = self
            .store
            .range(lower, end)
            .flat_map(|bucket| bucket.tempo_points().iter().copied())
            .collect();
        if !points.is_empty() {
            return points;
        }

        self.store
            .range_from(end)
            .find(|bucket| !bucket.tempo_points().is_empty())
            .map(|bucket| bucket.tempo_points().to_vec())
            .unwrap_or_default()
    }

    /// Stops with `begin <= time <= end`.
    pub fn stops_in_range(&self, begin: Time, end: Time) -> Vec<StopPoint> {
        self.timed_in_range(begin, end)
    }

    /// Scroll velocities with `begin <= time <= end`.
    pub fn svs_in_range(&self, begin: Time, end: Time) -> Vec<ScrollVelocity> {
        self.timed_in_range(begin, end)
    }

    /// Notes with `begin <= time <= end`, every segment included.
    pub fn notes_in_range(&self, begin: Time, end: Time) -> Vec<(Column, Note)> {
        let (begin, end) = (begin.min(end), begin.max(end));
        self.store
            .range(begin, end)
            .flat_map(Bucket::all_notes)
            .filter(|(_, note)| begin <= note.time && note.time <= end)
            .map(|(column, note)| (column, *note))
            .collect()
    }

    /// Beat position of `time`, counted from the first tempo point.
    ///
    /// Stops are ignored. Times before the first tempo point extrapolate
    /// backwards with its beat length.
    pub fn beat_at(&self, time: Time) -> Option<f64> {
        let mut points = self.tempo_points();
        let first = *points.next()?;
        if time <= first.time {
            return Some((time - first.time) as f64 / first.beat_length());
        }

        let mut beats = 0.0;
        let mut current = first;
        for next in points {
            if next.time >= time {
                break;
            }
            beats += (next.time - current.time) as f64 / current.beat_length();
            current = *next;
        }
        Some(beats + (time - current.time) as f64 / current.beat_length())
    }

    /// Earliest and latest time occupied by any note or tempo point. Sustains
    /// count up to their end.
    pub fn time_bounds(&self) -> Option<(Time, Time)> {
        let note_times = self
            .notes()
            .flat_map(|(_, note)| [note.time, note.end_time()]);
        let tempo_times = self.tempo_points().map(|point| point.time);
        note_times
            .chain(tempo_times)
            .fold(None, |bounds, time| match bounds {
                None => Some((time, time)),
                Some((min, max)) => Some((min.min(time), max.max(time))),
            })
    }

    fn previous_timed<T: TimedEntity>(&self, time: Time) -> Option<&T> {
        self.store
            .range_back_from(time)
            .find_map(|bucket| T::list(bucket).iter().rev().find(|v| v.time() <= time))
    }

    fn next_timed<T: TimedEntity>(&self, time: Time) -> Option<&T> {
        self.store
            .range_from(time)
            .find_map(|bucket| T::list(bucket).iter().find(|v| v.time() > time))
    }

    fn timed_in_range<T: TimedEntity>(&self, begin: Time, end: Time) -> Vec<T> {
        let (begin, end) = (begin.min(end), begin.max(end));
        self.store
            .range(begin, end)
            .flat_map(|bucket| T::list(bucket).iter().copied())
            .filter(|v| begin <= v.time() && v.time() <= end)
            .collect()
    }
}
