// Note density metrics.

use log::warn;

use crate::Time;
use crate::chart::Chart;
use crate::note::NoteKind;

const MS_PER_SECOND: f32 = 1000.0;
/// Histogram length limit; notes past the last slot are not counted.
const MAX_NPS_SLOTS: usize = 1 << 20;

impl Chart {
    /// Times of every note the player has to hit: taps, lifts and sustain
    /// heads. Mines, fakes and trailing sustain segments are left out.
    fn hit_times(&self) -> impl Iterator<Item = Time> + '_ {
        self.notes()
            .map(|(_, note)| note)
            .filter(|note| note.is_head() && !matches!(note.kind, NoteKind::Mine | NoteKind::Fake))
            .map(|note| note.time)
    }

    /// Notes-per-second histogram with one slot per `window` milliseconds.
    ///
    /// Slot `i` covers `[i * window, (i + 1) * window)`. There are
    /// `latest / window + 2` slots so the graph ends on an empty slot.
    /// Notes before zero are not counted, and the graph is cut off after
    /// `MAX_NPS_SLOTS` slots.
    pub fn nps_graph(&self, window: Time) -> Vec<f32> {
        if window <= 0 {
            return Vec::new();
        }
        let Some(latest) = self.hit_times().filter(|&time| time >= 0).max() else {
            return Vec::new();
        };

        let wanted = usize::try_from(latest / window)
            .ok()
            .and_then(|slots| slots.checked_add(2))
            .unwrap_or(usize::MAX);
        if wanted > MAX_NPS_SLOTS {
            warn!("nps graph of {wanted} slots cut to {MAX_NPS_SLOTS}");
        }

        let mut counts = vec![0u32; wanted.min(MAX_NPS_SLOTS)];
        for time in self.hit_times().filter(|&time| time >= 0) {
            let slot = usize::try_from(time / window).ok();
            if let Some(count) = slot.and_then(|slot| counts.get_mut(slot)) {
                *count += 1;
            }
        }

        let scale = MS_PER_SECOND / window as f32;
        counts.into_iter().map(|count| count as f32 * scale).collect()
    }

    /// [`Chart::nps_graph`] with the configured density window.
    pub fn density_graph(&self) -> Vec<f32> {
        self.nps_graph(self.config().density_window)
    }

    /// Hit notes divided by the seconds between the first and last of them.
    pub fn average_nps(&self) -> f32 {
        let (count, first, last) = self.hit_times().fold(
            (0usize, Time::MAX, Time::MIN),
            |(count, first, last), time| (count + 1, first.min(time), last.max(time)),
        );
        if count == 0 || last <= first {
            return 0.0;
        }
        count as f32 / ((last - first) as f32 / MS_PER_SECOND)
    }

    /// Highest one-second slot of the histogram.
    pub fn peak_nps(&self) -> f32 {
        self.nps_graph(1000).into_iter().fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::NoteType;

    #[test]
    fn test_empty_chart_has_no_density() {
        let chart = Chart::new(4).unwrap();
        assert!(chart.nps_graph(1000).is_empty());
        assert_eq!(chart.average_nps(), 0.0);
        assert_eq!(chart.peak_nps(), 0.0);
    }

    #[test]
    fn test_graph_slots_and_scaling() {
        let mut chart = Chart::new(4).unwrap();
        for (i, time) in [0, 250, 500, 750, 1200].into_iter().enumerate() {
            chart.insert_note(time, i % 4, NoteType::Tap, None).unwrap();
        }
        assert_eq!(chart.nps_graph(1000), vec![4.0, 1.0, 0.0]);
        assert_eq!(chart.nps_graph(500), vec![4.0, 4.0, 2.0, 0.0]);
        assert_eq!(chart.peak_nps(), 4.0);
        assert!(chart.nps_graph(0).is_empty());
    }

    #[test]
    fn test_far_note_does_not_blow_up_graph() {
        let mut chart = Chart::new(4).unwrap();
        chart.insert_note(0, 0, NoteType::Tap, None).unwrap();
        chart.insert_note(1_000_000_000_000_000, 1, NoteType::Tap, None).unwrap();

        let graph = chart.nps_graph(1);
        assert_eq!(graph.len(), MAX_NPS_SLOTS);
        assert_eq!(graph[0], 1000.0);
        assert_eq!(graph.iter().filter(|&&nps| nps > 0.0).count(), 1);
        assert_eq!(chart.nps_graph(Time::MAX).len(), 2);
    }

    #[test]
    fn test_only_hit_notes_count() {
        let mut chart = Chart::new(4).unwrap();
        chart.insert_hold(0, 3000, 0, None, None).unwrap();
        chart.insert_note(100, 1, NoteType::Mine, None).unwrap();
        chart.insert_note(200, 2, NoteType::Fake, None).unwrap();
        chart.insert_note(1000, 3, NoteType::Lift, None).unwrap();
        chart.insert_note(-500, 3, NoteType::Tap, None).unwrap();
        assert_eq!(chart.nps_graph(1000), vec![1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_average_nps() {
        let mut chart = Chart::new(4).unwrap();
        chart.insert_note(1000, 0, NoteType::Tap, None).unwrap();
        assert_eq!(chart.average_nps(), 0.0);
        chart.insert_note(3000, 1, NoteType::Tap, None).unwrap();
        chart.insert_note(2000, 2, NoteType::Tap, None).unwrap();
        chart.insert_note(2000, 3, NoteType::Tap, None).unwrap();
        assert_eq!(chart.average_nps(), 2.0);
    }

    #[test]
    fn test_density_graph_uses_config_window() {
        let mut chart = Chart::new(4).unwrap();
        chart.insert_note(1500, 0, NoteType::Tap, None).unwrap();
        assert_eq!(chart.density_graph(), chart.nps_graph(1000));
    }
}
