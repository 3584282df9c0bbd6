// Transient groups of head-level note copies, the input of bulk operations.

use std::collections::BTreeMap;

use crate::chart::Chart;
use crate::note::Note;
use crate::{Column, Time};

/// Copies of head-level notes grouped by column, with cached time bounds.
///
/// A selection holds values, not references: once a bulk operation has
/// consumed it the copies no longer match the chart and it is cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    columns: BTreeMap<Column, Vec<Note>>,
    bounds: Option<(Time, Time)>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a note copy. Intermediate and end segments are refused; their
    /// head stands for the whole sustain.
    pub fn add(&mut self, column: Column, note: Note) -> bool {
        if !note.is_head() {
            return false;
        }
        let (begin, end) = (note.time, note.end_time());
        self.bounds = Some(match self.bounds {
            None => (begin, end),
            Some((min, max)) => (min.min(begin), max.max(end)),
        });
        let notes = self.columns.entry(column).or_default();
        let at = notes.partition_point(|n| n.time <= note.time);
        notes.insert(at, note);
        true
    }

    pub fn len(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Earliest head and latest covered time (sustain ends included).
    pub fn bounds(&self) -> Option<(Time, Time)> {
        self.bounds
    }

    pub fn min_time(&self) -> Option<Time> {
        self.bounds.map(|(min, _)| min)
    }

    pub fn max_time(&self) -> Option<Time> {
        self.bounds.map(|(_, max)| max)
    }

    /// Highest column index holding a selected note.
    pub fn highest_column(&self) -> Option<Column> {
        self.columns.keys().next_back().copied()
    }

    /// Number of columns spanned, `highest_column + 1`.
    pub fn highest_column_count(&self) -> usize {
        self.highest_column().map_or(0, |column| column + 1)
    }

    /// Whether a note at `time` in `column` is selected.
    pub fn contains(&self, column: Column, time: Time) -> bool {
        self.notes(column).iter().any(|note| note.time == time)
    }

    pub fn notes(&self, column: Column) -> &[Note] {
        self.columns.get(&column).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Column, &Note)> + '_ {
        self.columns
            .iter()
            .flat_map(|(&column, notes)| notes.iter().map(move |note| (column, note)))
    }

    pub fn clear(&mut self) {
        self.columns.clear();
        self.bounds = None;
    }
}

impl FromIterator<(Column, Note)> for Selection {
    fn from_iter<I: IntoIterator<Item = (Column, Note)>>(iter: I) -> Self {
        let mut selection = Selection::new();
        for (column, note) in iter {
            selection.add(column, note);
        }
        selection
    }
}

impl Chart {
    /// Every head-level note of the chart.
    pub fn select_all(&self) -> Selection {
        self.notes()
            .filter(|(_, note)| note.is_head())
            .map(|(column, note)| (column, *note))
            .collect()
    }

    /// Head-level notes whose time lies in `begin..=end`.
    pub fn select_range(&self, begin: Time, end: Time) -> Selection {
        let (begin, end) = (begin.min(end), begin.max(end));
        self.buckets_in_range(begin, end)
            .flat_map(|bucket| bucket.all_notes())
            .filter(|(_, note)| note.is_head() && begin <= note.time && note.time <= end)
            .map(|(column, note)| (column, *note))
            .collect()
    }

    /// Head-level notes in `begin..=end` that `selection` does not hold.
    pub fn invert_selection(&self, selection: &Selection, begin: Time, end: Time) -> Selection {
        self.select_range(begin, end)
            .iter()
            .filter(|(column, note)| !selection.contains(*column, note.time))
            .map(|(column, note)| (column, *note))
            .collect()
    }
}
