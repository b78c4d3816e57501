use vizij_timeline_core::{
    clip::{ClipValue, ClipWeight},
    desc::{ClipDesc, TargetDesc, TimelineDesc, TimerDesc},
    ids::CurveHandle,
    inputs::Inputs,
    time::DiscreteTime,
    transform::TimeTransform,
    ClockInput, ClockSettings, Config, Engine, Value, ValueKind,
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn approx4(a: [f32; 4], b: [f32; 4]) {
    for i in 0..4 {
        approx(a[i], b[i], 1e-5);
    }
}

fn span() -> TimeTransform {
    TimeTransform::new(DiscreteTime::ZERO, DiscreteTime::from_secs_f64(100.0))
}

fn weighted(name: &str, w: f32, v: Value) -> ClipDesc {
    ClipDesc::new(name, 0, span(), 0, ClipValue::Constant(v)).with_weight(ClipWeight::Value(w))
}

fn timeline(target: TargetDesc, clips: Vec<ClipDesc>) -> TimelineDesc {
    TimelineDesc {
        name: "blend".into(),
        timers: vec![TimerDesc::root("root", ClockSettings::default(), None)],
        clips,
        targets: vec![target],
    }
}

fn tick(eng: &mut Engine) -> Option<Value> {
    eng.update(ClockInput::from_secs(0.1), Inputs::default())
        .value_of("x")
        .copied()
}

#[test]
fn partial_weights_backfill_the_default() {
    let mut eng = Engine::new(Config::default());
    eng.add_timeline(&timeline(
        TargetDesc::new("x", Value::Float(0.0)),
        vec![
            weighted("a", 0.3, Value::Float(1.0)),
            weighted("b", 0.2, Value::Float(2.0)),
        ],
    ))
    .unwrap();

    // 0.3 * 1 + 0.2 * 2 + 0.5 * default(0)
    match tick(&mut eng) {
        Some(Value::Float(v)) => approx(v, 0.7, 1e-5),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn only_the_four_strongest_clips_contribute() {
    let mut eng = Engine::new(Config::default());
    let clips = [0.9, 0.8, 0.7, 0.6, 0.5]
        .iter()
        .enumerate()
        .map(|(i, w)| weighted(&format!("c{i}"), *w, Value::Float(i as f32)))
        .collect();
    eng.add_timeline(&timeline(TargetDesc::new("x", Value::Float(0.0)), clips))
        .unwrap();
    tick(&mut eng);

    let x = eng.target_id("x").unwrap();
    let mix = eng.mix_of(x).unwrap();
    assert_eq!(mix.weights, [0.9, 0.8, 0.7, 0.6]);
    assert_eq!(mix.values[3], Value::Float(3.0));
}

#[test]
fn equal_weights_keep_the_earlier_clip() {
    let mut eng = Engine::new(Config {
        blend_chunk_size: 2,
        ..Config::default()
    });
    let clips = (0..5)
        .map(|i| weighted(&format!("c{i}"), 0.5, Value::Float(i as f32)))
        .collect();
    eng.add_timeline(&timeline(TargetDesc::new("x", Value::Float(0.0)), clips))
        .unwrap();
    tick(&mut eng);

    let mix = eng.mix_of(eng.target_id("x").unwrap()).unwrap();
    let kept: Vec<Value> = mix.values.to_vec();
    assert_eq!(
        kept,
        vec![
            Value::Float(0.0),
            Value::Float(1.0),
            Value::Float(2.0),
            Value::Float(3.0)
        ]
    );
}

#[test]
fn unweighted_clip_is_overridden_by_stronger_weights() {
    let mut eng = Engine::new(Config::default());
    eng.add_timeline(&timeline(
        TargetDesc::new("x", Value::Float(0.0)),
        vec![
            ClipDesc::new("base", 0, span(), 0, ClipValue::Constant(Value::Float(10.0))),
            weighted("over", 3.0, Value::Float(4.0)),
        ],
    ))
    .unwrap();

    // base sits at weight 1 in slot 1 once the heavier clip lands in slot 0:
    // (3 * 4 + 1 * 10) / 4
    match tick(&mut eng) {
        Some(Value::Float(v)) => approx(v, 5.5, 1e-5),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn zero_weights_resolve_to_default() {
    let mut eng = Engine::new(Config::default());
    eng.add_timeline(&timeline(
        TargetDesc::new("x", Value::Vec3([1.0, 2.0, 3.0])),
        vec![weighted("a", 0.0, Value::Vec3([9.0, 9.0, 9.0]))],
    ))
    .unwrap();
    // The target was touched, so it still reports, at its default.
    assert_eq!(tick(&mut eng), Some(Value::Vec3([1.0, 2.0, 3.0])));

    let mut eng = Engine::new(Config::default());
    eng.add_timeline(&timeline(
        TargetDesc::new("x", Value::Vec3([1.0, 2.0, 3.0])),
        vec![weighted("a", 0.5, Value::Vec3([3.0, 2.0, 1.0]))],
    ))
    .unwrap();
    assert_eq!(tick(&mut eng), Some(Value::Vec3([2.0, 2.0, 2.0])));
}

#[test]
fn additive_quaternion_composes_on_default() {
    let h = std::f32::consts::FRAC_1_SQRT_2;
    let quarter_turn_z = [0.0, 0.0, h, h];
    let mut eng = Engine::new(Config::default());
    let mut target = TargetDesc::new("x", Value::Quat(quarter_turn_z));
    target.additive = true;
    eng.add_timeline(&timeline(
        target,
        vec![weighted("spin", 1.0, Value::Quat(quarter_turn_z))],
    ))
    .unwrap();

    match tick(&mut eng) {
        Some(Value::Quat(q)) => approx4(q, [0.0, 0.0, 1.0, 0.0]),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn curve_values_and_weights_use_the_sampler() {
    let mut eng = Engine::new(Config::default());
    eng.set_curve_sampler(Box::new(|c: CurveHandle, t: f32| match c.0 {
        0 => t,
        1 => 2.0 * t,
        _ => 1.0,
    }));
    let clip = ClipDesc::new(
        "curves",
        0,
        span(),
        0,
        ClipValue::Curves {
            kind: ValueKind::Vec2,
            curves: vec![CurveHandle(0), CurveHandle(1)],
        },
    )
    .with_weight(ClipWeight::Curve(CurveHandle(7)));
    eng.add_timeline(&timeline(TargetDesc::new("x", Value::Vec2([0.0, 0.0])), vec![clip]))
        .unwrap();

    tick(&mut eng);
    match tick(&mut eng) {
        Some(Value::Vec2([a, b])) => {
            approx(a, 0.1, 1e-5);
            approx(b, 0.2, 1e-5);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn targets_are_shared_across_timelines() {
    let mut eng = Engine::new(Config::default());
    let a = eng
        .add_timeline(&timeline(
            TargetDesc::new("x", Value::Float(0.0)),
            vec![weighted("a", 0.5, Value::Float(2.0))],
        ))
        .unwrap();
    let b = eng
        .add_timeline(&timeline(
            TargetDesc::new("x", Value::Float(0.0)),
            vec![weighted("b", 0.5, Value::Float(4.0))],
        ))
        .unwrap();
    assert_eq!(a.targets, b.targets);

    match tick(&mut eng) {
        Some(Value::Float(v)) => approx(v, 3.0, 1e-5),
        other => panic!("unexpected {other:?}"),
    }
}
