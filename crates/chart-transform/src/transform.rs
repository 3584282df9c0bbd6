// Selection transform foundation: the trait and the shared apply driver.
//
// Every bulk edit runs the same way: snapshot the affected range, remove the
// selected notes, reinsert their rewritten copies, notify the range once and
// clear the selection. The whole sequence is a single undo step.

use chart_model::{Chart, Column, Note, Selection, Time};
use log::debug;

/// A rewrite of every head-level note of a selection.
pub trait SelectionTransform {
    /// Short label used in log output.
    fn name(&self) -> &'static str;

    /// False when the parameters make the transform a guarded no-op.
    fn is_applicable(&self, _chart: &Chart) -> bool {
        true
    }

    /// Replacement notes for the selection. Runs before anything is removed,
    /// so the chart still holds the originals.
    fn rewrite(&mut self, chart: &Chart, selection: &Selection) -> Vec<(Column, Note)>;
}

/// Replace the notes of `selection` with the transform's rewrite.
///
/// Returns the number of notes placed. An empty selection or inapplicable
/// parameters leave the chart and the selection untouched and return 0.
pub fn apply_transform(
    chart: &mut Chart,
    selection: &mut Selection,
    transform: &mut impl SelectionTransform,
) -> usize {
    let Some(bounds) = selection.bounds() else {
        debug!("{}: empty selection", transform.name());
        return 0;
    };
    if !transform.is_applicable(chart) {
        debug!("{}: parameters make this a no-op", transform.name());
        return 0;
    }

    let replacement = transform.rewrite(chart, selection);
    let (begin, end) = affected_span(bounds, &replacement);
    let width = chart.bucket_width();

    let placed = chart.edit_batch(|chart| {
        chart.register_history_ranged(begin - width, end + width);
        for (column, note) in selection.iter() {
            chart.remove_note(note.time, column);
        }
        let placed = chart.bulk_insert_notes(&replacement);
        chart.notify_range(begin - width, end + width);
        placed
    });
    debug!(
        "{}: placed {placed} of {} note(s) over {begin}..{end}",
        transform.name(),
        replacement.len()
    );

    selection.clear();
    placed
}

fn affected_span(bounds: (Time, Time), notes: &[(Column, Note)]) -> (Time, Time) {
    notes.iter().fold(bounds, |(min, max), (_, note)| {
        (min.min(note.time), max.max(note.end_time()))
    })
}

/// Apply `rewrite` to every selected note.
pub(crate) fn map_selection(
    selection: &Selection,
    mut rewrite: impl FnMut(Column, &Note) -> (Column, Note),
) -> Vec<(Column, Note)> {
    selection
        .iter()
        .map(|(column, note)| rewrite(column, note))
        .collect()
}
