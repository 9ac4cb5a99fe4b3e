use pianola::{session, Controller, Engine, Event, SynthConfig, Timeline};

fn phrase() -> Timeline {
    Timeline::from_events(vec![
        Event::new(0, 4, true),
        Event::new(300, 4, false),
        Event::new(700, 9, true),
    ])
    .unwrap()
}

/// Replay `phrase` with fixed-size blocks and return what the engine recorded.
fn replay_with_blocks(block: usize, frames: usize) -> (Timeline, Engine, Controller) {
    let (mut engine, mut controller) = session(SynthConfig::default());
    controller.load_playback(phrase()).unwrap();

    let mut output = vec![0i16; frames];
    for chunk in output.chunks_mut(block) {
        engine.process(chunk);
    }
    (controller.take_recording(), engine, controller)
}

#[test]
fn each_event_lands_once_in_the_block_containing_it() {
    for block in [1, 7, 64, 128, 256] {
        let (recording, _, _) = replay_with_blocks(block, 2_000);
        let events = recording.events();
        assert_eq!(events.len(), 3, "block size {block}");

        for (got, want) in events.iter().zip(phrase().iter()) {
            assert_eq!((got.key_id, got.pressed), (want.key_id, want.pressed));
            // Applied at the start of the block the event falls in
            assert!(got.sample_time <= want.sample_time, "block size {block}");
            assert!(got.sample_time + block as u64 > want.sample_time, "block size {block}");
            assert_eq!(got.sample_time % block as u64, 0);
        }
    }
}

#[test]
fn single_sample_blocks_reproduce_exact_times() {
    let (recording, _, _) = replay_with_blocks(1, 1_000);
    assert_eq!(recording, phrase());
}

#[test]
fn press_and_release_in_one_block_cancel_out() {
    // 0 and 300 share the first 1024-frame block
    let (recording, _, controller) = replay_with_blocks(1_024, 2_048);
    assert_eq!(recording.events(), &[Event::new(0, 9, true)]);
    assert!(!controller.is_hot(4));
}

#[test]
fn unreleased_key_stays_held_after_playback_ends() {
    let (_, mut engine, mut controller) = replay_with_blocks(128, 2_048);
    assert!(!controller.is_playing_back());
    assert!(controller.is_hot(9));

    // Held until something else releases it
    controller.set_keyed(pianola::synth::keys::key_name(9), false);
    engine.process(&mut [0; 16]);
    assert!(controller.is_hot(9));

    // Stopping after the end still releases what playback held
    assert!(controller.stop_playback());
    engine.process(&mut [0; 16]);
    assert!(!controller.is_hot(9));
}

#[test]
fn loading_a_new_performance_releases_the_old_one() {
    let (mut engine, mut controller) = session(SynthConfig::default());
    let held = Timeline::from_events(vec![Event::new(0, 2, true)]).unwrap();
    controller.load_playback(held).unwrap();
    engine.process(&mut [0; 64]);
    assert!(controller.is_hot(2));

    controller.load_playback(phrase()).unwrap();
    engine.process(&mut [0; 64]);
    assert!(!controller.is_hot(2));
    assert!(controller.is_hot(4));
}

#[test]
fn events_for_unknown_keys_are_skipped() {
    let (mut engine, mut controller) = session(SynthConfig::default());
    let timeline = Timeline::from_events(vec![
        Event::new(0, 999, true),
        Event::new(10, 5, true),
    ])
    .unwrap();
    controller.load_playback(timeline).unwrap();

    engine.process(&mut [0; 64]);
    assert!(controller.is_hot(5));
    assert_eq!(controller.recording().events(), &[Event::new(0, 5, true)]);
}
