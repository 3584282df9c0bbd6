// Note kind conversion: taps to holds/rolls and back.

use chart_model::{Chart, Column, Note, NoteKind, Selection, SustainKind, Time};

use crate::transform::{SelectionTransform, map_selection};

/// Turns every selected note into a hold or roll of fixed length.
///
/// Notes that already sustain are re-lengthened. The head keeps its snap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertToSustains {
    pub sustain: SustainKind,
    /// Length in milliseconds; zero or negative makes this a no-op
    pub length: Time,
}

impl ConvertToSustains {
    pub fn holds(length: Time) -> Self {
        Self {
            sustain: SustainKind::Hold,
            length,
        }
    }

    pub fn rolls(length: Time) -> Self {
        Self {
            sustain: SustainKind::Roll,
            length,
        }
    }
}

impl SelectionTransform for ConvertToSustains {
    fn name(&self) -> &'static str {
        "convert to sustains"
    }

    fn is_applicable(&self, _chart: &Chart) -> bool {
        self.length > 0
    }

    fn rewrite(&mut self, _chart: &Chart, selection: &Selection) -> Vec<(Column, Note)> {
        map_selection(selection, |column, note| {
            let head = Note::sustain_head(self.sustain, note.time, note.time + self.length)
                .with_beat_snap(note.beat_snap);
            (column, head)
        })
    }
}

/// Collapses every selected note into a tap at its head.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertToTaps;

impl SelectionTransform for ConvertToTaps {
    fn name(&self) -> &'static str {
        "convert to taps"
    }

    fn rewrite(&mut self, _chart: &Chart, selection: &Selection) -> Vec<(Column, Note)> {
        map_selection(selection, |column, note| {
            (column, Note::new(note.time, NoteKind::Tap).with_beat_snap(note.beat_snap))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::apply_transform;
    use chart_model::{NoteType, TimeSpan};

    #[test]
    fn test_taps_become_holds() {
        let mut chart = Chart::new(4).unwrap();
        chart.insert_note(100, 0, NoteType::Tap, Some(8)).unwrap();
        chart.insert_roll(200, 300, 1, None, None).unwrap();

        let mut selection = chart.select_all();
        let placed = apply_transform(&mut chart, &mut selection, &mut ConvertToSustains::holds(1500));
        assert_eq!(placed, 2);
        let head = chart.find_note(100, 0).unwrap();
        assert_eq!(head.note_type(), NoteType::HoldBegin);
        assert_eq!(head.span(), Some(TimeSpan::new(100, 1600)));
        assert_eq!(head.beat_snap, Some(8));
        assert_eq!(chart.find_note(1000, 0).map(Note::note_type), Some(NoteType::HoldIntermediate));
        assert_eq!(chart.find_note(1700, 1).map(Note::note_type), Some(NoteType::HoldEnd));
        assert!(chart.find_note(300, 1).is_none());
    }

    #[test]
    fn test_non_positive_length_is_noop() {
        let mut chart = Chart::new(4).unwrap();
        chart.insert_note(100, 0, NoteType::Tap, None).unwrap();
        let mut selection = chart.select_all();
        assert_eq!(apply_transform(&mut chart, &mut selection, &mut ConvertToSustains::rolls(0)), 0);
        assert_eq!(chart.find_note(100, 0).map(Note::note_type), Some(NoteType::Tap));
    }

    #[test]
    fn test_sustains_become_taps() {
        let mut chart = Chart::new(4).unwrap();
        chart.insert_hold(500, 2500, 2, Some(4), None).unwrap();
        chart.insert_note(700, 3, NoteType::Mine, None).unwrap();

        let mut selection = chart.select_all();
        assert_eq!(apply_transform(&mut chart, &mut selection, &mut ConvertToTaps), 2);
        assert_eq!(chart.note_count(), 2);
        assert_eq!(chart.find_note(500, 2).map(Note::note_type), Some(NoteType::Tap));
        assert_eq!(chart.find_note(500, 2).and_then(|n| n.beat_snap), Some(4));
        assert_eq!(chart.find_note(700, 3).map(Note::note_type), Some(NoteType::Tap));
    }
}
