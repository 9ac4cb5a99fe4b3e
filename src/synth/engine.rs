use std::sync::Arc;

use rtrb::{Consumer, Producer};

use crate::{
    config::{SynthConfig, Tuning},
    dsp::pcm,
    sequencing::{Event, EventPlayer, EventRecorder, Timeline},
};

use super::{
    activation::ActivationTable,
    clock::SampleClock,
    keys::KeyId,
    message::{CommandReceiver, EngineCommand},
    readback::Readback,
    voice::Voice,
};

/// One block of PCM16 output.
#[derive(Debug)]
pub struct RenderedBlock<'a> {
    /// Mono little-endian PCM16, two bytes per frame
    pub pcm: &'a [u8],
    /// Always false: the keyboard is an endless stream
    pub end_of_stream: bool,
}

/// Ring endpoints the engine owns; the other ends live in the controller.
pub(crate) struct EngineChannels {
    pub records: Producer<Event>,
    pub commands: Consumer<EngineCommand>,
    pub retired: Producer<Timeline>,
}

/// The audio-thread half of a session.
///
/// Owns every voice, the sample clock, the player and the recorder. Move it
/// into the audio callback and call [`Engine::process`] (or
/// [`Engine::synthesize`]) once per device buffer. None of its render
/// methods block, lock or perform I/O; the only allocation is growing the
/// scratch buffers when a block larger than any before it is requested.
pub struct Engine {
    sample_rate: u32,
    tuning: Tuning,
    voices: Vec<Voice>,
    keys: Arc<ActivationTable>,
    /// Per-voice hot state captured at the start of the block
    hot: Vec<bool>,
    clock: SampleClock,
    mix: Vec<f64>,
    pcm: Vec<i16>,
    bytes: Vec<u8>,
    player: EventPlayer,
    recorder: EventRecorder<Producer<Event>>,
    commands: Consumer<EngineCommand>,
    retired: Producer<Timeline>,
    readback: Arc<Readback>,
}

impl Engine {
    pub(crate) fn new(
        config: &SynthConfig,
        keys: Arc<ActivationTable>,
        channels: EngineChannels,
        readback: Arc<Readback>,
    ) -> Self {
        let voices: Vec<Voice> = (0..config.voice_count() as KeyId)
            .map(|id| Voice::new(id, config.sample_rate))
            .collect();
        let block = config.max_block_size;

        Self {
            sample_rate: config.sample_rate,
            tuning: config.tuning,
            hot: vec![false; voices.len()],
            voices,
            keys,
            clock: SampleClock::new(),
            mix: vec![0.0; block],
            pcm: vec![0; block],
            bytes: vec![0; block * 2],
            player: EventPlayer::new(),
            recorder: EventRecorder::new(channels.records),
            commands: channels.commands,
            retired: channels.retired,
            readback,
        }
    }

    /// Render `out.len()` frames of PCM16 directly into `out`.
    pub fn process(&mut self, out: &mut [i16]) {
        let frames = out.len();
        if frames == 0 {
            return;
        }

        self.render_mix(frames);
        pcm::write_pcm16(&self.mix[..frames], self.tuning.output_gain, out);
        self.publish(out);
    }

    /// Render `frame_count` frames and return them as little-endian bytes.
    pub fn synthesize(&mut self, frame_count: usize) -> RenderedBlock<'_> {
        if frame_count == 0 {
            return RenderedBlock {
                pcm: &[],
                end_of_stream: false,
            };
        }

        self.render_mix(frame_count);
        if self.pcm.len() < frame_count {
            self.pcm.resize(frame_count, 0);
            self.bytes.resize(frame_count * 2, 0);
        }

        let samples = &mut self.pcm[..frame_count];
        pcm::write_pcm16(&self.mix[..frame_count], self.tuning.output_gain, samples);
        let bytes = &mut self.bytes[..frame_count * 2];
        pcm::write_le_bytes(samples, bytes);
        self.publish(&self.pcm[..frame_count]);

        RenderedBlock {
            pcm: &self.bytes[..frame_count * 2],
            end_of_stream: false,
        }
    }

    /// Steps shared by every entry point: commands, playback injection,
    /// synthesis into `self.mix`, recording, clock.
    fn render_mix(&mut self, frames: usize) {
        self.apply_commands();

        let block_start = self.clock.now();
        let step = self.player.advance(block_start, frames, &self.keys);
        if let Some(done) = step.finished {
            self.retire(done);
        }

        for (hot, voice) in self.hot.iter_mut().zip(&self.voices) {
            *hot = self.keys.is_hot(voice.id());
        }

        if self.mix.len() < frames {
            self.mix.resize(frames, 0.0);
        }
        let mix = &mut self.mix[..frames];
        mix.fill(0.0);

        for (voice, &hot) in self.voices.iter_mut().zip(&self.hot) {
            if voice.needs_processing(hot) {
                voice.render_into(hot, &self.tuning, mix);
            }
        }

        self.recorder.observe(block_start, &mut self.voices, &self.hot);
        self.clock.advance(frames);
    }

    fn apply_commands(&mut self) {
        while let Some(command) = CommandReceiver::pop(&mut self.commands) {
            match command {
                EngineCommand::Play(timeline) => {
                    // Keys held by the previous performance must not hang
                    if let Some(previous) = self.player.stop(&self.keys) {
                        self.retire(previous);
                    }
                    self.player.load(timeline);
                }
                EngineCommand::StopPlayback => {
                    if let Some(previous) = self.player.stop(&self.keys) {
                        self.retire(previous);
                    }
                }
            }
        }
    }

    /// Hand a spent queue back to the UI thread so it is freed there.
    fn retire(&mut self, timeline: Timeline) {
        // If the return ring is full the queue is dropped here instead
        let _ = self.retired.push(timeline);
    }

    fn publish(&self, block: &[i16]) {
        let peak = block.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
        self.readback.publish(
            self.clock.now(),
            self.recorder.dropped(),
            self.player.is_playing(),
            peak,
        );
    }

    /// Samples rendered so far this session
    pub fn clock(&self) -> u64 {
        self.clock.now()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn voice(&self, id: KeyId) -> Option<&Voice> {
        self.voices.get(id as usize)
    }

    /// Shared activation table (the same one the controller writes)
    pub fn keys(&self) -> &Arc<ActivationTable> {
        &self.keys
    }

    pub fn is_playing_back(&self) -> bool {
        self.player.is_playing()
    }

    pub fn dropped_records(&self) -> u64 {
        self.recorder.dropped()
    }
}
