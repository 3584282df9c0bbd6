// Snap selected notes to the beat grid of their governing tempo.

use chart_model::{Chart, Column, Note, Selection, TempoPoint, Time};

use crate::transform::{SelectionTransform, map_selection};

/// Snaps every note to the nearest `1/divisor` measure subdivision.
///
/// The grid is anchored at the governing tempo point of each time (the
/// earliest tempo point for times before it), `4 / divisor` beats wide. A
/// sustain snaps both ends independently; if its end would not land after
/// its head, it is pushed one grid step past the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantize {
    pub divisor: u32,
}

impl Quantize {
    pub fn new(divisor: u32) -> Self {
        Self { divisor }
    }

    fn grid(&self) -> f64 {
        4.0 / f64::from(self.divisor)
    }

    fn grid_length(&self, tempo: &TempoPoint) -> Time {
        (tempo.beat_length() * self.grid()).round() as Time
    }

    /// Nearest grid time to `time`. `None` without any tempo point.
    pub fn snap(&self, chart: &Chart, time: Time) -> Option<Time> {
        let tempo = chart.governing_tempo_point(time)?;
        Some(self.snap_to(tempo, time))
    }

    fn snap_to(&self, tempo: &TempoPoint, time: Time) -> Time {
        let beat = (time - tempo.time) as f64 / tempo.beat_length();
        let snapped = (beat / self.grid()).round() * self.grid();
        tempo.time + (snapped * tempo.beat_length()).round() as Time
    }
}

impl SelectionTransform for Quantize {
    fn name(&self) -> &'static str {
        "quantize"
    }

    /// A zero divisor or a chart without tempo points is a no-op.
    fn is_applicable(&self, chart: &Chart) -> bool {
        self.divisor > 0 && chart.tempo_points().next().is_some()
    }

    fn rewrite(&mut self, chart: &Chart, selection: &Selection) -> Vec<(Column, Note)> {
        map_selection(selection, |column, note| {
            let Some(head_tempo) = chart.governing_tempo_point(note.time) else {
                return (column, *note);
            };
            let begin = self.snap_to(head_tempo, note.time);
            let mut end = match note.span() {
                Some(span) => self.snap(chart, span.end).unwrap_or(span.end),
                None => begin,
            };
            if note.span().is_some() && end <= begin {
                end = begin + self.grid_length(head_tempo).max(1);
            }
            (column, note.respanned(begin, end).without_snaps())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::apply_transform;
    use chart_model::{NoteType, TimeSpan};

    fn chart_at_120() -> Chart {
        let mut chart = Chart::new(4).unwrap();
        chart.insert_tempo_point(TempoPoint::new(0, 120.0)).unwrap();
        chart
    }

    #[test]
    fn test_snap_to_sixteenths() {
        let chart = chart_at_120();
        let quantize = Quantize::new(16);
        assert_eq!(quantize.snap(&chart, 130), Some(125));
        assert_eq!(quantize.snap(&chart, 190), Some(250));
        assert_eq!(quantize.snap(&chart, -70), Some(-125));
        assert_eq!(Quantize::new(4).snap(&chart, 740), Some(500));
    }

    #[test]
    fn test_snap_uses_governing_tempo() {
        let mut chart = chart_at_120();
        chart.insert_tempo_point(TempoPoint::new(1010, 240.0)).unwrap();
        let quantize = Quantize::new(4);
        assert_eq!(quantize.snap(&chart, 1100), Some(1010));
        assert_eq!(quantize.snap(&chart, 1200), Some(1260));
        assert_eq!(quantize.snap(&chart, 990), Some(1000));
    }

    #[test]
    fn test_quantize_selection() {
        let mut chart = chart_at_120();
        chart.insert_note(130, 0, NoteType::Tap, Some(12)).unwrap();
        chart.insert_hold(260, 880, 1, None, None).unwrap();

        let mut selection = chart.select_all();
        assert_eq!(apply_transform(&mut chart, &mut selection, &mut Quantize::new(8)), 2);
        assert_eq!(chart.find_note(250, 0).map(|n| n.beat_snap), Some(None));
        assert_eq!(chart.find_note(250, 1).and_then(Note::span), Some(TimeSpan::new(250, 1000)));
    }

    #[test]
    fn test_collapsed_sustain_gets_one_grid_step() {
        let mut chart = chart_at_120();
        chart.insert_hold(260, 300, 0, None, None).unwrap();
        let mut selection = chart.select_all();
        apply_transform(&mut chart, &mut selection, &mut Quantize::new(4));
        assert_eq!(chart.find_note(500, 0).and_then(Note::span), Some(TimeSpan::new(500, 1000)));
    }

    #[test]
    fn test_noop_without_tempo_or_divisor() {
        let mut chart = Chart::new(4).unwrap();
        chart.insert_note(130, 0, NoteType::Tap, None).unwrap();
        let mut selection = chart.select_all();
        assert_eq!(apply_transform(&mut chart, &mut selection, &mut Quantize::new(4)), 0);

        let mut chart = chart_at_120();
        chart.insert_note(130, 0, NoteType::Tap, None).unwrap();
        let mut selection = chart.select_all();
        assert_eq!(apply_transform(&mut chart, &mut selection, &mut Quantize::new(0)), 0);
        assert!(chart.find_note(130, 0).is_some());
    }
}
