// Time-axis rewrites: scale around the selection start, reverse within it.

use chart_model::{Chart, Column, Note, Selection, Time};

use crate::transform::{SelectionTransform, map_selection};

/// Stretches or compresses the selection around its earliest note.
///
/// `new = pivot + (old - pivot) * factor`, rounded to the nearest ms.
/// Sustain ends scale the same way. Beat snaps are dropped because the
/// notes no longer sit on the subdivision they were placed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub factor: f64,
}

impl Scale {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }

    fn scale(&self, pivot: Time, time: Time) -> Time {
        pivot + ((time - pivot) as f64 * self.factor).round() as Time
    }
}

impl SelectionTransform for Scale {
    fn name(&self) -> &'static str {
        "scale"
    }

    /// Zero, negative and non-finite factors are refused.
    fn is_applicable(&self, _chart: &Chart) -> bool {
        self.factor.is_finite() && self.factor > 0.0
    }

    fn rewrite(&mut self, _chart: &Chart, selection: &Selection) -> Vec<(Column, Note)> {
        let Some(pivot) = selection.min_time() else {
            return Vec::new();
        };
        map_selection(selection, |column, note| {
            let begin = self.scale(pivot, note.time);
            let end = self.scale(pivot, note.end_time());
            (column, note.respanned(begin, end).without_snaps())
        })
    }
}

/// Mirrors the selection in time: `new = max + min - old`.
///
/// A sustain flips direction, its new head being the mirror of its old end.
/// Bounds are preserved, so reversing twice restores every note.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reverse;

impl SelectionTransform for Reverse {
    fn name(&self) -> &'static str {
        "reverse"
    }

    fn rewrite(&mut self, _chart: &Chart, selection: &Selection) -> Vec<(Column, Note)> {
        let Some((min, max)) = selection.bounds() else {
            return Vec::new();
        };
        let flip = |time: Time| max + min - time;
        map_selection(selection, |column, note| {
            let begin = flip(note.end_time());
            let end = flip(note.time);
            (column, note.respanned(begin, end).without_snaps())
        })
    }
}
