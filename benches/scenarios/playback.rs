//! Benchmarks for replaying a recorded performance.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pianola::{session, Event, SynthConfig, Timeline};

use crate::BLOCK_SIZES;

/// An arpeggio: every key pressed then released, 1200 samples apart
fn arpeggio(voices: u32) -> Timeline {
    let mut events: Vec<Event> = (0..voices)
        .flat_map(|id| {
            let t = id as u64 * 1_200;
            [Event::new(t, id, true), Event::new(t + 4_800, id, false)]
        })
        .collect();
    // Releases overlap later presses
    events.sort_by_key(|e| e.sample_time);
    Timeline::from_events(events).unwrap_or_default()
}

pub fn bench_playback(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/playback");

    for &size in BLOCK_SIZES {
        let mut out = vec![0i16; size];

        // Replay the arpeggio and restart it when it ends. Recording is
        // drained each iteration the way the UI would.
        let (mut engine, mut controller) = session(SynthConfig::default());
        let performance = arpeggio(controller.voice_count() as u32);
        group.bench_with_input(BenchmarkId::new("arpeggio", size), &size, |b, _| {
            b.iter(|| {
                if !controller.is_playing_back() {
                    let _ = controller.load_playback(performance.clone());
                }
                engine.process(black_box(&mut out));
                controller.poll();
            })
        });
    }

    group.finish();
}
