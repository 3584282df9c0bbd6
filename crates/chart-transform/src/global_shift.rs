// Whole-chart offset: every note and timing entity moves by the same delta.

use chart_model::{Chart, Column, Note, ScrollVelocity, StopPoint, TempoPoint, Time};
use log::{debug, warn};

/// Moves the entire chart by `delta` milliseconds. Negative results are
/// allowed. Timing entities keep their handles; notes are reinserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalShift {
    pub delta: Time,
}

impl GlobalShift {
    pub fn new(delta: Time) -> Self {
        Self { delta }
    }

    /// Apply the shift as one undo step. Returns the number of entities
    /// moved; an empty chart or zero delta is a no-op.
    pub fn apply(&self, chart: &mut Chart) -> usize {
        let delta = self.delta;
        let Some((min, max)) = chart.time_bounds() else {
            debug!("global shift: empty chart");
            return 0;
        };
        if delta == 0 {
            return 0;
        }

        let mut selection = chart.select_all();
        let notes: Vec<(Column, Note)> = selection
            .iter()
            .map(|(column, note)| (column, note.shifted(delta)))
            .collect();
        let tempo_points: Vec<TempoPoint> = chart.tempo_points().copied().collect();
        let stops: Vec<StopPoint> = chart.stops().copied().collect();
        let svs: Vec<ScrollVelocity> = chart.svs().copied().collect();

        let width = chart.bucket_width();
        let (begin, end) = (min.min(min + delta) - width, max.max(max + delta) + width);

        let moved = chart.edit_batch(|chart| {
            chart.register_history_ranged(begin, end);
            let removed = chart.bulk_remove_notes(&mut selection);
            let placed = chart.bulk_insert_notes(&notes);
            if placed < removed {
                warn!("global shift lost {} note(s)", removed - placed);
            }

            let mut moved = placed;
            moved += tempo_points
                .iter()
                .filter(|point| chart.move_tempo_point(point, point.time + delta))
                .count();
            moved += stops
                .iter()
                .filter(|stop| chart.move_stop(stop, stop.time + delta))
                .count();
            moved += svs
                .iter()
                .filter(|sv| chart.move_sv(sv, sv.time + delta))
                .count();

            chart.notify_range(begin, end);
            moved
        });
        debug!("global shift by {delta} ms moved {moved} entities");
        moved
    }
}
