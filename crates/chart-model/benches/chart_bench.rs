use chart_model::{Chart, NoteType, TempoPoint};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn dense_chart(notes: i64) -> Chart {
    let mut chart = Chart::new(4).unwrap_or_default();
    chart.insert_tempo_point(TempoPoint::new(0, 180.0));
    chart.edit_batch(|chart| {
        for i in 0..notes {
            chart.insert_note(i * 83, (i % 4) as usize, NoteType::Tap, None);
        }
    });
    chart
}

fn edit_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("edit");

    group.bench_function("insert_remove_tap", |b| {
        let mut chart = dense_chart(2000);
        b.iter(|| {
            chart.insert_note(black_box(50_001), 1, NoteType::Tap, None);
            chart.remove_note(black_box(50_001), 1);
        });
    });

    group.bench_function("insert_long_hold_and_undo", |b| {
        let mut chart = dense_chart(0);
        b.iter(|| {
            chart.insert_hold(black_box(500), black_box(120_500), 2, None, None);
            chart.undo();
        });
    });

    group.finish();
}

fn query_benchmark(c: &mut Criterion) {
    let chart = dense_chart(10_000);

    c.bench_function("tempo_points_in_range", |b| {
        b.iter(|| black_box(chart.tempo_points_in_range(black_box(400_000), black_box(401_000))));
    });

    c.bench_function("nps_graph", |b| {
        b.iter(|| black_box(chart.nps_graph(black_box(1000))));
    });
}

criterion_group!(benches, edit_benchmark, query_benchmark);
criterion_main!(benches);
