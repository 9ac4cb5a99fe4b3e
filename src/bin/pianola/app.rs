//! Pianola - audio device setup and the terminal shell runner

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use rtrb::RingBuffer;
use std::path::PathBuf;

use pianola::{session, SynthConfig};

use super::ui::{DeviceInfo, UiApp, SCOPE_CAPACITY};

/// Main application: one output stream driving one session
pub struct Pianola {
    config: SynthConfig,
    file: PathBuf,
}

impl Pianola {
    pub fn new(config: SynthConfig, file: PathBuf) -> Self {
        Self { config, file }
    }

    /// Run the application (takes over the terminal and plays audio)
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let stream_config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let device_rate = stream_config.sample_rate().0;
        let channels = stream_config.channels() as usize;

        // Voices are tuned for the rate the device actually runs at
        let mut config = self.config;
        if config.sample_rate != device_rate {
            log::info!(
                "device runs at {} Hz, overriding configured {} Hz",
                device_rate,
                config.sample_rate
            );
            config = config.sample_rate(device_rate);
        }

        let (mut engine, controller) = session(config.clone());
        let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_CAPACITY);

        let mut scratch = vec![0i16; config.max_block_size];

        let stream = device.build_output_stream(
            &stream_config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(scratch.len());
                    let block = &mut scratch[..frames];
                    engine.process(block);

                    // Mono to all channels
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        let sample = s as f32 / 32768.0;
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = sample;
                        }
                        // Scope is best effort; a slow UI just misses samples
                        let _ = scope_tx.push(sample);
                    }

                    frames_written += frames;
                }
            },
            |err| log::error!("audio stream error: {err}"),
            None,
        )?;

        stream.play()?;
        log::info!("output stream started: {device_rate} Hz, {channels} channels");

        let info = DeviceInfo {
            sample_rate: device_rate,
            channels,
        };
        let mut app = UiApp::new(controller, scope_rx, self.file, info);

        let mut terminal = ratatui::init();
        let result = app.run(&mut terminal);
        ratatui::restore();

        drop(stream);
        result
    }
}
