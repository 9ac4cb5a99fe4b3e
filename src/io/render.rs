//! Offline rendering: play a performance through a fresh engine and keep
//! the PCM, or stream it straight into a 16-bit mono WAV file.

use std::{fmt, path::Path};

use crate::{config::SynthConfig, sequencing::Timeline, session};

/// Longest render accepted, in seconds of audio.
pub const MAX_RENDER_SECONDS: u64 = 3_600;

/// Frames a render of `timeline` plus `tail_frames` would produce.
///
/// Times come from user files, so the sum is checked and capped at
/// [`MAX_RENDER_SECONDS`].
pub fn render_length(config: &SynthConfig, timeline: &Timeline, tail_frames: u64) -> Result<u64, RenderError> {
    let span = match (timeline.start_time(), timeline.end_time()) {
        (Some(start), Some(end)) => end - start,
        _ => 0,
    };
    let limit = config.sample_rate.max(1) as u64 * MAX_RENDER_SECONDS;
    match span.checked_add(tail_frames) {
        Some(frames) if frames <= limit => Ok(frames),
        _ => Err(RenderError::TooLong {
            frames: span.saturating_add(tail_frames),
            limit,
        }),
    }
}

/// Play `timeline` from time zero for `frames` frames, handing each block to
/// `sink`.
///
/// Blocks are `config.max_block_size` frames, so the result matches what a
/// live engine with that buffer size would produce.
fn render_blocks<E>(
    config: &SynthConfig,
    timeline: &Timeline,
    frames: u64,
    mut sink: impl FnMut(&[i16]) -> Result<(), E>,
) -> Result<(), E> {
    let config = config.clone().sanitized();
    let (mut engine, mut controller) = session(config.clone());
    if controller.load_playback(timeline.normalized()).is_err() {
        log::error!("offline render could not queue playback");
    }

    let mut block = vec![0i16; config.max_block_size];
    let mut remaining = frames;
    while remaining > 0 {
        let len = remaining.min(block.len() as u64) as usize;
        let out = &mut block[..len];
        engine.process(out);
        sink(out)?;
        // Keep the record ring drained for long renders
        controller.poll();
        remaining -= len as u64;
    }

    log::info!(
        "rendered {} frames ({:.2}s)",
        frames,
        frames as f64 / config.sample_rate as f64
    );
    Ok(())
}

/// Render `timeline` plus `tail_frames` of release into memory.
pub fn render_performance(config: &SynthConfig, timeline: &Timeline, tail_frames: u64) -> Result<Vec<i16>, RenderError> {
    let frames = render_length(config, timeline, tail_frames)?;
    let mut out = Vec::with_capacity(frames as usize);
    render_blocks(config, timeline, frames, |block| {
        out.extend_from_slice(block);
        Ok::<(), RenderError>(())
    })?;
    Ok(out)
}

/// Render `timeline` plus `tail_frames` straight into a WAV file, one block
/// at a time. Returns the number of frames written.
pub fn render_to_wav(
    path: impl AsRef<Path>,
    config: &SynthConfig,
    timeline: &Timeline,
    tail_frames: u64,
) -> Result<u64, RenderError> {
    let frames = render_length(config, timeline, tail_frames)?;
    let mut writer = hound::WavWriter::create(path.as_ref(), wav_spec(config.sample_rate))?;
    render_blocks(config, timeline, frames, |block| {
        for &sample in block {
            writer.write_sample(sample)?;
        }
        Ok::<(), RenderError>(())
    })?;
    writer.finalize()?;
    log::info!("wrote {} frames to {}", frames, path.as_ref().display());
    Ok(frames)
}

fn wav_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Write mono PCM16 to a WAV file.
pub fn write_wav(path: impl AsRef<Path>, sample_rate: u32, samples: &[i16]) -> Result<(), hound::Error> {
    let mut writer = hound::WavWriter::create(path.as_ref(), wav_spec(sample_rate))?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    log::info!("wrote {} samples to {}", samples.len(), path.as_ref().display());
    Ok(())
}

/// Errors that can occur when rendering offline
#[derive(Debug)]
pub enum RenderError {
    /// The performance plus tail is longer than [`MAX_RENDER_SECONDS`]
    TooLong { frames: u64, limit: u64 },
    /// The WAV file could not be written
    Wav(hound::Error),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::TooLong { frames, limit } => write!(
                f,
                "Render of {} frames exceeds the limit of {} frames",
                frames, limit
            ),
            RenderError::Wav(e) => write!(f, "WAV output error: {}", e),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Wav(e) => Some(e),
            RenderError::TooLong { .. } => None,
        }
    }
}

impl From<hound::Error> for RenderError {
    fn from(e: hound::Error) -> Self {
        RenderError::Wav(e)
    }
}
