// Column permutations: mirror and seeded random shuffle.
//
// Both compute one mapping per call and apply it to every selected note;
// times and note kinds are left alone.

use chart_model::{Chart, Column, Note, Selection};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::transform::{SelectionTransform, map_selection};

/// Apply `mapping[column]` to every note. Columns outside the mapping keep
/// their place.
fn remap_columns(selection: &Selection, mapping: &[Column]) -> Vec<(Column, Note)> {
    map_selection(selection, |column, note| {
        (mapping.get(column).copied().unwrap_or(column), *note)
    })
}

/// Reverses the column order: column `c` goes to `key_count - 1 - c`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mirror;

impl Mirror {
    pub fn mapping(key_count: usize) -> Vec<Column> {
        (0..key_count).rev().collect()
    }
}

impl SelectionTransform for Mirror {
    fn name(&self) -> &'static str {
        "mirror"
    }

    fn rewrite(&mut self, chart: &Chart, selection: &Selection) -> Vec<(Column, Note)> {
        remap_columns(selection, &Self::mapping(chart.key_count()))
    }
}

/// Uniformly random column permutation, drawn once per application.
pub struct Shuffle {
    rng: StdRng,
}

impl Shuffle {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw the next permutation of `0..key_count`.
    pub fn mapping(&mut self, key_count: usize) -> Vec<Column> {
        let mut mapping: Vec<Column> = (0..key_count).collect();
        mapping.shuffle(&mut self.rng);
        mapping
    }
}

impl Default for Shuffle {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionTransform for Shuffle {
    fn name(&self) -> &'static str {
        "shuffle"
    }

    fn rewrite(&mut self, chart: &Chart, selection: &Selection) -> Vec<(Column, Note)> {
        let mapping = self.mapping(chart.key_count());
        remap_columns(selection, &mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::apply_transform;
    use chart_model::NoteType;

    #[test]
    fn test_mirror_mapping() {
        assert_eq!(Mirror::mapping(4), vec![3, 2, 1, 0]);
        assert_eq!(Mirror::mapping(1), vec![0]);
    }

    #[test]
    fn test_mirror_moves_sustains_whole() {
        let mut chart = Chart::new(5).unwrap();
        chart.insert_note(100, 0, NoteType::Mine, None).unwrap();
        chart.insert_roll(200, 2200, 1, None, None).unwrap();
        chart.insert_note(300, 2, NoteType::Tap, None).unwrap();

        let mut selection = chart.select_all();
        assert_eq!(apply_transform(&mut chart, &mut selection, &mut Mirror), 3);
        assert_eq!(chart.find_note(100, 4).map(Note::note_type), Some(NoteType::Mine));
        assert_eq!(chart.find_note(1000, 3).map(Note::note_type), Some(NoteType::RollIntermediate));
        assert_eq!(chart.find_note(2200, 3).map(Note::note_type), Some(NoteType::RollEnd));
        assert!(chart.find_note(300, 2).is_some());
        assert_eq!(chart.note_count(), 5);
    }

    #[test]
    fn test_mirror_keeps_sustain_snaps() {
        let mut chart = Chart::new(4).unwrap();
        chart.insert_hold(500, 1750, 0, Some(4), Some(16)).unwrap();

        let mut selection = chart.select_all();
        apply_transform(&mut chart, &mut selection, &mut Mirror);
        assert_eq!(chart.find_note(500, 3).and_then(|n| n.beat_snap), Some(4));
        assert_eq!(chart.find_note(1750, 3).and_then(|n| n.beat_snap), Some(16));
    }

    #[test]
    fn test_shuffle_mapping_is_permutation() {
        let mut shuffle = Shuffle::with_seed(7);
        for _ in 0..20 {
            let mut mapping = shuffle.mapping(7);
            mapping.sort_unstable();
            assert_eq!(mapping, (0..7).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_shuffle_is_deterministic_per_seed() {
        let a = Shuffle::with_seed(42).mapping(8);
        let b = Shuffle::with_seed(42).mapping(8);
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_keeps_column_groups_together() {
        let mut chart = Chart::new(4).unwrap();
        for i in 0..8 {
            chart.insert_note(i * 100, 1, NoteType::Tap, None).unwrap();
        }
        let mut selection = chart.select_all();
        let mut shuffle = Shuffle::with_seed(3);
        let expected = Shuffle::with_seed(3).mapping(4)[1];
        assert_eq!(apply_transform(&mut chart, &mut selection, &mut shuffle), 8);
        assert!(chart.notes().all(|(column, _)| column == expected));
    }
}
