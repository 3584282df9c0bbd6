use chart_model::{Chart, NoteType, SustainPart, TempoPoint, Time};
use chart_transform::{Reverse, apply_transform};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Edit {
    Tap { time: Time, column: usize },
    Hold { begin: Time, end: Time, column: usize },
    Remove { time: Time, column: usize },
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0i64..10_000, 0usize..4).prop_map(|(time, column)| Edit::Tap { time, column }),
        (0i64..10_000, 1i64..4_000, 0usize..4).prop_map(|(begin, length, column)| Edit::Hold {
            begin,
            end: begin + length,
            column,
        }),
        (0i64..10_000, 0usize..4).prop_map(|(time, column)| Edit::Remove { time, column }),
    ]
}

fn apply(chart: &mut Chart, edit: &Edit) -> bool {
    match *edit {
        Edit::Tap { time, column } => chart.insert_note(time, column, NoteType::Tap, None).is_some(),
        Edit::Hold { begin, end, column } => chart.insert_hold(begin, end, column, None, None).is_some(),
        Edit::Remove { time, column } => chart.remove_note(time, column),
    }
}

fn snapshot(chart: &Chart) -> Vec<(usize, Time, NoteType)> {
    chart
        .notes()
        .map(|(column, note)| (column, note.time, note.note_type()))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn undo_all_restores_empty_and_redo_all_restores_final(edits in prop::collection::vec(edit_strategy(), 1..40)) {
        let mut chart = Chart::new(4).unwrap();
        let applied = edits.iter().filter(|edit| apply(&mut chart, edit)).count();
        let final_state = snapshot(&chart);

        prop_assert_eq!(chart.history().undo_len(), applied);
        for _ in 0..applied {
            prop_assert!(chart.undo());
        }
        prop_assert!(!chart.undo());
        prop_assert!(snapshot(&chart).is_empty());

        for _ in 0..applied {
            prop_assert!(chart.redo());
        }
        prop_assert!(!chart.redo());
        prop_assert_eq!(snapshot(&chart), final_state);
    }

    #[test]
    fn reverse_twice_is_identity(
        taps in prop::collection::vec((0i64..10_000, 0usize..3), 1..30),
        hold in prop::option::of((0i64..10_000, 1i64..4_000)),
    ) {
        let mut chart = Chart::new(4).unwrap();
        for &(time, column) in &taps {
            chart.insert_note(time, column, NoteType::Tap, None);
        }
        if let Some((begin, length)) = hold {
            chart.insert_hold(begin, begin + length, 3, None, None).unwrap();
        }
        let before = snapshot(&chart);
        let mut selection = chart.select_all();
        let (min, max) = selection.bounds().unwrap();

        apply_transform(&mut chart, &mut selection, &mut Reverse);
        let mut selection = chart.select_range(min, max);
        prop_assert_eq!(selection.bounds(), Some((min, max)));
        apply_transform(&mut chart, &mut selection, &mut Reverse);

        let mut after = snapshot(&chart);
        let mut expected = before;
        after.sort_unstable();
        expected.sort_unstable();
        prop_assert_eq!(after, expected);
    }

    #[test]
    fn holds_have_one_intermediate_per_whole_bucket(begin in -5_000i64..5_000, length in 1i64..12_000) {
        let mut chart = Chart::new(4).unwrap();
        let end = begin + length;
        chart.insert_hold(begin, end, 2, None, None).unwrap();

        let width = chart.bucket_width();
        let first = begin.div_euclid(width);
        let last = end.div_euclid(width);
        let expected = (last - first - 1).max(0) as usize;
        let intermediates = chart
            .notes()
            .filter(|(_, note)| note.part() == Some(SustainPart::Intermediate))
            .count();
        prop_assert_eq!(intermediates, expected);

        prop_assert!(chart.remove_note(begin, 2));
        prop_assert_eq!(chart.note_count(), 0);
    }

    #[test]
    fn tempo_invariant_survives_edits(bpms in prop::collection::vec(1.0f64..400.0, 1..10), beat_length in 100.0f64..2_000.0) {
        let mut chart = Chart::new(4).unwrap();
        for (i, bpm) in bpms.iter().enumerate() {
            chart.insert_tempo_point(TempoPoint::new(i as Time * 700, *bpm)).unwrap();
        }
        let first = *chart.tempo_points().next().unwrap();
        let mut changed = first;
        changed.set_beat_length(beat_length);
        prop_assert!(chart.revaluate_tempo_point(&first, changed));
        prop_assert!(chart.move_tempo_point(&changed, 12_345));

        for point in chart.tempo_points() {
            prop_assert!((point.beat_length() - 60_000.0 / point.bpm()).abs() < 1e-9);
        }
    }
}
