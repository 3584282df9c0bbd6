// Stream generation: fill a time range with taps following a column pattern.

use chart_model::{Chart, Column, NoteType, Time};
use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Column choice for each step of a generated stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamPattern {
    /// 0, 1, 2, ..., k-1, 0, 1, ...
    Staircase,
    /// Alternates the two middle columns.
    Trill,
    /// Sweeps up and back down: 0, 1, ..., k-1, k-2, ..., 1, 0, 1, ...
    Spiral,
    /// Uniform choice avoiding the last column, and the one before it when
    /// more than two columns exist.
    Random,
    /// Random two-column chords.
    Jumpstream,
    /// Random three-column chords.
    Handstream,
    /// Random chords of up to four columns.
    Chordjack,
}

impl StreamPattern {
    /// Notes placed per step on a `key_count` chart.
    pub fn chord_size(self, key_count: usize) -> usize {
        let size = match self {
            Self::Jumpstream => 2,
            Self::Handstream => 3,
            Self::Chordjack => 4,
            _ => 1,
        };
        size.min(key_count)
    }

    fn is_chord(self) -> bool {
        matches!(self, Self::Jumpstream | Self::Handstream | Self::Chordjack)
    }
}

/// Places taps from `start` (inclusive) to `end` (exclusive).
///
/// The step is `beat_length * 4 / divisor` of the tempo governing the
/// previous step, so tempo changes inside the range are followed. The
/// cursor accumulates in floating point and each note lands on the nearest
/// millisecond. Cells that are already taken are skipped.
pub struct StreamGenerator {
    pub pattern: StreamPattern,
    pub divisor: u32,
    rng: StdRng,
}

#[derive(Debug, Default)]
struct StepState {
    index: usize,
    last: Option<Column>,
    last_last: Option<Column>,
}

impl StreamGenerator {
    pub fn new(pattern: StreamPattern, divisor: u32) -> Self {
        Self {
            pattern,
            divisor,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Fill `start..end` and return the number of notes placed. A single
    /// undo step; an empty range, zero divisor or tempo-less chart is a no-op.
    pub fn generate(&mut self, chart: &mut Chart, start: Time, end: Time) -> usize {
        if start >= end || self.divisor == 0 {
            debug!("stream {start}..{end} /{}: nothing to generate", self.divisor);
            return 0;
        }
        if chart.governing_tempo_point(start).is_none() {
            debug!("stream {start}..{end}: chart has no tempo point");
            return 0;
        }

        let key_count = chart.key_count();
        let width = chart.bucket_width();
        let divisor = self.divisor;
        let grid = 4.0 / f64::from(divisor);

        let placed = chart.edit_batch(|chart| {
            chart.register_history_ranged(start - width, end + width);

            let mut state = StepState::default();
            let mut cursor = start as f64;
            let mut placed = 0;
            loop {
                let time = cursor.round() as Time;
                if time >= end {
                    break;
                }
                for column in self.columns_for_step(&mut state, key_count) {
                    if chart.insert_note(time, column, NoteType::Tap, Some(divisor)).is_some() {
                        placed += 1;
                    }
                }
                let Some(tempo) = chart.governing_tempo_point(time) else {
                    break;
                };
                cursor += tempo.beat_length() * grid;
            }

            chart.notify_range(start - width, end + width);
            placed
        });
        debug!("stream {:?} {start}..{end} /{divisor}: placed {placed} note(s)", self.pattern);
        placed
    }

    fn columns_for_step(&mut self, state: &mut StepState, key_count: usize) -> Vec<Column> {
        let index = state.index;
        state.index += 1;

        if self.pattern.is_chord() {
            let mut columns: Vec<Column> = (0..key_count).collect();
            columns.shuffle(&mut self.rng);
            columns.truncate(self.pattern.chord_size(key_count));
            columns.sort_unstable();
            return columns;
        }

        let column = match self.pattern {
            StreamPattern::Trill if key_count >= 2 => index % 2 + (key_count / 2 - 1),
            StreamPattern::Trill => 0,
            StreamPattern::Spiral => spiral_column(index, key_count),
            StreamPattern::Random => self.random_column(state, key_count),
            _ => index % key_count,
        };
        state.last_last = state.last;
        state.last = Some(column);
        vec![column]
    }

    fn random_column(&mut self, state: &StepState, key_count: usize) -> Column {
        let candidates: Vec<Column> = (0..key_count)
            .filter(|&column| Some(column) != state.last)
            .filter(|&column| key_count <= 2 || Some(column) != state.last_last)
            .collect();
        candidates.choose(&mut self.rng).copied().unwrap_or(0)
    }
}

fn spiral_column(index: usize, key_count: usize) -> Column {
    if key_count < 2 {
        return 0;
    }
    let period = 2 * (key_count - 1);
    let position = index % period;
    if position < key_count {
        position
    } else {
        period - position
    }
}
