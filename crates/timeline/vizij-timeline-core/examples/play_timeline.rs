use serde_json::{json, to_string_pretty};
use vizij_timeline_core::{ClockInput, Config, CurveHandle, Engine, Inputs};

fn main() -> anyhow::Result<()> {
    // A 4s looping timeline that fades one property in over its first two
    // seconds. The clip is half-open, so from 2s until the loop wraps it
    // reports nothing and the host keeps the last value it applied.
    let baked = json!({
        "name": "fade",
        "timers": [
            {
                "kind": "root",
                "name": "main",
                "range": { "kind": "Loop", "range": { "start": 0, "end": 4000000 } }
            }
        ],
        "clips": [
            {
                "name": "fade-in",
                "timer": 0,
                "transform": { "start": 0, "end": 2000000 },
                "target": 0,
                "value": { "curves": { "kind": "float", "curves": [0] } }
            }
        ],
        "targets": [
            { "name": "panel/opacity", "default": { "type": "float", "data": 0.0 } }
        ]
    });

    let mut eng = Engine::new(Config::default());
    let handles = eng.load_timeline_json(&baked.to_string())?;
    // Curve 0 ramps 0 -> 1 over two seconds of local time.
    eng.set_curve_sampler(Box::new(|_: CurveHandle, t: f32| (t / 2.0).clamp(0.0, 1.0)));

    for frame in 0..6 {
        let out = eng.update(ClockInput::from_secs(0.5), Inputs::default());
        println!("frame {frame}: {}", to_string_pretty(out)?);
    }

    if let Some(root) = handles.root() {
        println!("root time: {:?}", eng.timer(root).map(|d| d.time));
    }
    Ok(())
}
