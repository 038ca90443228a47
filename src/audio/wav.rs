//! WAV file writer for audio output.
//!
//! Writes `[channels, time]` sample arrays as interleaved 32-bit float WAV
//! using the hound crate.

use std::io::{Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use ndarray::{ArrayView2, Axis};

use crate::error::{ErrorCode, Result, StudioError};

/// Default output sample rate (MusicGen produces 32kHz audio).
pub const SAMPLE_RATE: u32 = 32000;

/// Bits per sample of the written files.
pub const BITS_PER_SAMPLE: u16 = 32;

/// Builds the WAV header spec for a clip.
fn wav_spec(channels: usize, sample_rate: u32) -> Result<WavSpec> {
    let channels = u16::try_from(channels)
        .ok()
        .filter(|&c| c > 0)
        .ok_or_else(|| {
            StudioError::new(
                ErrorCode::InvalidTensorShape,
                format!("Unsupported channel count for WAV: {}", channels),
            )
        })?;

    Ok(WavSpec {
        channels,
        sample_rate,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Float,
    })
}

/// Interleaves the channels of `clip` frame by frame into `writer`.
fn write_frames<W: Write + Seek>(writer: &mut WavWriter<W>, clip: ArrayView2<f32>) -> Result<()> {
    for frame in clip.axis_iter(Axis(1)) {
        for sample in frame.iter() {
            writer.write_sample(*sample).map_err(|e| {
                StudioError::audio_write_failed("Failed to write sample", e)
            })?;
        }
    }
    Ok(())
}

/// Writes one `[channels, time]` clip to a WAV file.
///
/// The file is created or truncated. The parent directory must exist.
///
/// # Example
///
/// ```ignore
/// use ndarray::arr2;
/// use promptwave::audio::write_wav;
///
/// let clip = arr2(&[[0.0f32, 0.5, -0.5, 0.0]]);
/// write_wav(clip.view(), Path::new("/tmp/test.wav"), 32000)?;
/// ```
pub fn write_wav(clip: ArrayView2<f32>, path: &Path, sample_rate: u32) -> Result<()> {
    let spec = wav_spec(clip.nrows(), sample_rate)?;

    let mut writer = WavWriter::create(path, spec).map_err(|e| {
        StudioError::audio_write_failed(format!("Failed to create {}", path.display()), e)
    })?;

    write_frames(&mut writer, clip)?;

    writer.finalize().map_err(|e| {
        StudioError::audio_write_failed(format!("Failed to finalize {}", path.display()), e)
    })?;

    Ok(())
}

/// Calculates the duration of audio in seconds from sample count.
pub fn samples_to_duration(sample_count: usize, sample_rate: u32) -> f32 {
    sample_count as f32 / sample_rate as f32
}
