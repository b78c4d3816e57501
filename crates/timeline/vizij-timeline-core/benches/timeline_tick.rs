use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vizij_timeline_core::{
    ActiveRange, ClipDesc, ClipExtrapolation, ClipValue, ClipWeight, ClockInput, ClockSettings,
    Config, DiscreteTime, Engine, ExtrapolationPosition, Inputs, RangeBehavior, RangeKind,
    TargetDesc, TimeTransform, TimelineDesc, TimerDesc, Value,
};

/// One looping root with `clips` overlapping clips spread over 16 targets,
/// half of them under a composite.
fn synthetic_timeline(clips: usize) -> TimelineDesc {
    let secs = DiscreteTime::from_secs_f64;
    let targets = (0..16)
        .map(|i| TargetDesc::new(&format!("node{i}/value"), Value::Vec3([0.0; 3])))
        .collect();
    let clips = (0..clips)
        .map(|i| {
            let start = (i % 8) as f64;
            ClipDesc::new(
                &format!("clip{i}"),
                i % 2,
                TimeTransform::new(secs(start), secs(start + 4.0)),
                i % 16,
                ClipValue::Constant(Value::Vec3([i as f32, 1.0, 0.5])),
            )
            .with_weight(ClipWeight::Value(0.1 + (i % 7) as f32 * 0.1))
            .with_extrapolation(ClipExtrapolation::looping(ExtrapolationPosition::Post))
        })
        .collect();
    TimelineDesc {
        name: "bench".into(),
        timers: vec![
            TimerDesc::root(
                "root",
                ClockSettings::default(),
                Some(RangeBehavior::new(RangeKind::Loop, ActiveRange::from_secs(0.0, 12.0))),
            ),
            TimerDesc::composite("half", 0, secs(0.5), 0.5, ActiveRange::from_secs(0.0, 10.0)),
        ],
        clips,
        targets,
    }
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("timeline_tick");
    for clips in [64usize, 512, 4096] {
        let mut eng = Engine::new(Config::default());
        if let Err(e) = eng.add_timeline(&synthetic_timeline(clips)) {
            panic!("bench timeline rejected: {e}");
        }
        let dt = ClockInput::from_secs(1.0 / 60.0);
        group.bench_with_input(BenchmarkId::from_parameter(clips), &clips, |b, _| {
            b.iter(|| {
                let out = eng.update(dt, Inputs::default());
                black_box(out.changes.len());
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
