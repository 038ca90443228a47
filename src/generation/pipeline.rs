//! Generation pipeline.
//!
//! Runs the generator, then writes its output with the materializer. Both
//! front ends go through [`generate_and_save`].

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::audio::Materializer;
use crate::config::{MAX_DURATION_SEC, MIN_DURATION_SEC};
use crate::error::{Result, StudioError};
use crate::models::GenerationEngine;
use crate::types::AudioClip;

use super::adapter::MusicGenerator;

/// MusicGen produces 50 token frames per second of audio.
const TOKENS_PER_SECOND: usize = 50;

/// Result of one generate-and-save run.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    /// Clips written, in batch order.
    pub clips: Vec<AudioClip>,
    /// Wall-clock time spent in the engine.
    pub generation_time: Duration,
    /// Version of the engine that produced the audio.
    pub model_version: String,
}

impl GenerationOutput {
    /// Returns the clip the front ends play back and offer for download.
    pub fn first_clip(&self) -> Option<&AudioClip> {
        self.clips.first()
    }
}

/// Checks a user request against the limits the front ends enforce.
///
/// Returns the duration as the unsigned value the generator takes.
pub fn validate_request(description: &str, duration_sec: i64) -> Result<u32> {
    if description.trim().is_empty() {
        return Err(StudioError::empty_prompt());
    }

    if !(MIN_DURATION_SEC as i64..=MAX_DURATION_SEC as i64).contains(&duration_sec) {
        return Err(StudioError::invalid_duration(duration_sec));
    }

    Ok(duration_sec as u32)
}

/// Generates audio for `description` and writes it to the output directory.
///
/// Errors from either stage are returned unchanged. When generation fails
/// nothing is written.
pub fn generate_and_save<E: GenerationEngine>(
    generator: &mut MusicGenerator<E>,
    materializer: &Materializer,
    description: &str,
    duration_sec: u32,
) -> Result<GenerationOutput> {
    debug!(
        "Expecting ~{} samples, ~{:.0}s of generation on CPU",
        estimate_samples(duration_sec, generator.engine().sample_rate()),
        estimate_generation_time(duration_sec)
    );

    let start = Instant::now();
    let samples = generator.generate(description, duration_sec)?;
    let generation_time = start.elapsed();

    info!(
        "Generated tensor {:?} in {:.2}s",
        samples.shape(),
        generation_time.as_secs_f32()
    );

    let clips = materializer.save(samples)?;

    Ok(GenerationOutput {
        clips,
        generation_time,
        model_version: generator.engine().version().to_string(),
    })
}

/// Estimates the number of audio samples per channel for a duration.
pub fn estimate_samples(duration_sec: u32, sample_rate: u32) -> usize {
    duration_sec as usize * sample_rate as usize
}

/// Estimates generation time in seconds for a duration.
///
/// Rough CPU figure of 0.1s per token frame; GPUs are much faster.
pub fn estimate_generation_time(duration_sec: u32) -> f32 {
    (duration_sec as usize * TOKENS_PER_SECOND) as f32 * 0.1
}
