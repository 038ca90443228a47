//! Audio materialization.
//!
//! Turns a generated [`AudioTensor`] into WAV files on disk, one file per
//! batch element, named `audio_{idx}.wav` inside the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use ndarray::Axis;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};
use crate::types::{AudioClip, AudioTensor, ClipBatch};

use super::wav::{write_wav, SAMPLE_RATE};

/// Default directory that clips are written to, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "audio_output";

/// Where and how clips are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializerConfig {
    /// Directory receiving `audio_{idx}.wav`. Must exist before saving.
    pub output_dir: PathBuf,

    /// Sample rate written into the WAV header.
    pub sample_rate: u32,
}

impl Default for MaterializerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            sample_rate: SAMPLE_RATE,
        }
    }
}

/// Writes audio tensors to WAV files.
#[derive(Debug, Clone)]
pub struct Materializer {
    config: MaterializerConfig,
}

impl Materializer {
    /// Creates a materializer writing with the given configuration.
    pub fn new(config: MaterializerConfig) -> Self {
        Self { config }
    }

    /// Returns the path of the clip with the given batch index.
    pub fn clip_path(&self, index: usize) -> PathBuf {
        self.config.output_dir.join(format!("audio_{}.wav", index))
    }

    /// Writes every clip of `samples` to the output directory.
    ///
    /// Rank 2 tensors produce `audio_0.wav`; rank 3 tensors produce one file
    /// per batch element. Existing files with the same names are overwritten.
    ///
    /// # Errors
    ///
    /// - `INVALID_TENSOR_SHAPE` if the rank is not 2 or 3. Nothing is written.
    /// - `AUDIO_WRITE_FAILED` if a file cannot be created or written, including
    ///   when the output directory does not exist. Files written before the
    ///   failure are left in place.
    pub fn save(&self, samples: AudioTensor) -> Result<Vec<AudioClip>> {
        let batch = ClipBatch::try_from(samples)?;
        debug!(
            "Materializing {} clip(s): {} channel(s) x {} frames",
            batch.len(),
            batch.channels(),
            batch.frames()
        );

        let host = batch.into_host();
        let mut clips = Vec::with_capacity(host.len_of(Axis(0)));

        for (index, clip) in host.axis_iter(Axis(0)).enumerate() {
            let path = self.clip_path(index);
            write_wav(clip, &path, self.config.sample_rate)?;

            clips.push(AudioClip {
                index,
                path,
                channels: clip.nrows() as u16,
                frames: clip.ncols(),
                sample_rate: self.config.sample_rate,
            });
        }

        info!(
            "Wrote {} clip(s) to {}",
            clips.len(),
            self.config.output_dir.display()
        );

        Ok(clips)
    }

    /// Reads back the bytes of a written clip.
    pub fn read_clip(&self, index: usize) -> Result<Vec<u8>> {
        let path = self.clip_path(index);
        fs::read(&path).map_err(|e| {
            StudioError::audio_write_failed(format!("Failed to read {}", path.display()), e)
        })
    }
}

/// Creates the output directory if it does not exist yet.
///
/// Called once at startup by the front ends; [`Materializer::save`] itself
/// never creates directories.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| {
        StudioError::audio_write_failed(
            format!("Failed to create output directory {}", dir.display()),
            e,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use ndarray::{Array, Array1, Array2, Array3, Array4, ArrayD, IxDyn};
    use tempfile::{tempdir, TempDir};

    fn materializer_in(dir: &TempDir) -> Materializer {
        Materializer::new(MaterializerConfig {
            output_dir: dir.path().to_path_buf(),
            sample_rate: SAMPLE_RATE,
        })
    }

    fn wav_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".wav"))
            .collect();
        names.sort();
        names
    }

    fn ramp(shape: (usize, usize, usize)) -> Array3<f32> {
        Array::from_shape_fn(shape, |(b, c, t)| {
            (b as f32) * 0.1 + (c as f32) * 0.01 + (t as f32) * 0.001
        })
    }

    #[test]
    fn rank_two_writes_single_file() {
        let dir = tempdir().unwrap();
        let materializer = materializer_in(&dir);

        let samples = Array2::<f32>::from_elem((2, 100), 0.25);
        let clips = materializer.save(AudioTensor::from(samples)).unwrap();

        assert_eq!(clips.len(), 1);
        assert_eq!(wav_files(dir.path()), vec!["audio_0.wav"]);

        let reader = hound::WavReader::open(dir.path().join("audio_0.wav")).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 32000);
        assert_eq!(reader.duration(), 100);
        assert_eq!(clips[0].channels, 2);
        assert_eq!(clips[0].frames, 100);
    }

    #[test]
    fn rank_three_writes_one_file_per_batch() {
        let dir = tempdir().unwrap();
        let materializer = materializer_in(&dir);

        let clips = materializer.save(AudioTensor::from(ramp((3, 1, 50)))).unwrap();

        assert_eq!(clips.len(), 3);
        assert_eq!(
            wav_files(dir.path()),
            vec!["audio_0.wav", "audio_1.wav", "audio_2.wav"]
        );
        for (index, clip) in clips.iter().enumerate() {
            assert_eq!(clip.index, index);
            assert_eq!(clip.path, dir.path().join(format!("audio_{}.wav", index)));
            let reader = hound::WavReader::open(&clip.path).unwrap();
            assert_eq!(reader.spec().channels, 1);
            assert_eq!(reader.duration(), 50);
        }
    }

    #[test]
    fn batch_order_is_preserved() {
        let dir = tempdir().unwrap();
        let materializer = materializer_in(&dir);

        materializer.save(AudioTensor::from(ramp((2, 1, 3)))).unwrap();

        let mut reader = hound::WavReader::open(dir.path().join("audio_1.wav")).unwrap();
        let first: f32 = reader.samples::<f32>().next().unwrap().unwrap();
        assert!((first - 0.1).abs() < 1e-6);
    }

    #[test]
    fn invalid_rank_writes_nothing() {
        let dir = tempdir().unwrap();
        let materializer = materializer_in(&dir);

        let tensors = [
            AudioTensor::from(ArrayD::<f32>::zeros(IxDyn(&[]))),
            AudioTensor::from(Array1::<f32>::zeros(16)),
            AudioTensor::from(Array4::<f32>::zeros((1, 1, 1, 16))),
        ];
        for tensor in tensors {
            let err = materializer.save(tensor).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidTensorShape);
        }
        assert!(wav_files(dir.path()).is_empty());
    }

    #[test]
    fn saving_twice_is_byte_identical() {
        let dir = tempdir().unwrap();
        let materializer = materializer_in(&dir);
        let tensor = AudioTensor::from(ramp((2, 2, 64)));

        materializer.save(tensor.clone()).unwrap();
        let first = materializer.read_clip(1).unwrap();
        materializer.save(tensor).unwrap();
        let second = materializer.read_clip(1).unwrap();

        assert_eq!(first, second);
        assert_eq!(wav_files(dir.path()).len(), 2);
    }

    #[test]
    fn save_overwrites_previous_output() {
        let dir = tempdir().unwrap();
        let materializer = materializer_in(&dir);

        materializer
            .save(AudioTensor::from(Array2::<f32>::zeros((1, 1000))))
            .unwrap();
        materializer
            .save(AudioTensor::from(Array2::<f32>::zeros((1, 10))))
            .unwrap();

        let reader = hound::WavReader::open(materializer.clip_path(0)).unwrap();
        assert_eq!(reader.duration(), 10);
    }

    #[test]
    fn zero_length_clip_has_valid_header() {
        let dir = tempdir().unwrap();
        let materializer = materializer_in(&dir);

        let clips = materializer
            .save(AudioTensor::from(Array2::<f32>::zeros((1, 0))))
            .unwrap();

        assert_eq!(clips[0].frames, 0);
        let reader = hound::WavReader::open(&clips[0].path).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.duration(), 0);
    }

    #[test]
    fn missing_output_dir_fails() {
        let dir = tempdir().unwrap();
        let materializer = Materializer::new(MaterializerConfig {
            output_dir: dir.path().join("audio_output"),
            sample_rate: SAMPLE_RATE,
        });

        let err = materializer
            .save(AudioTensor::from(Array2::<f32>::zeros((1, 10))))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AudioWriteFailed);
        assert!(!dir.path().join("audio_output").exists());
    }

    #[test]
    fn configured_sample_rate_is_written() {
        let dir = tempdir().unwrap();
        let materializer = Materializer::new(MaterializerConfig {
            output_dir: dir.path().to_path_buf(),
            sample_rate: 48000,
        });

        let clips = materializer
            .save(AudioTensor::from(Array2::<f32>::zeros((1, 48000))))
            .unwrap();

        assert_eq!(clips[0].duration_sec(), 1.0);
        let reader = hound::WavReader::open(&clips[0].path).unwrap();
        assert_eq!(reader.spec().sample_rate, 48000);
    }

    #[test]
    fn ensure_output_dir_creates_nested() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("audio_output");
        ensure_output_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // Idempotent
        ensure_output_dir(&nested).unwrap();
    }

    #[test]
    fn default_config_uses_audio_output() {
        let config = MaterializerConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("audio_output"));
        assert_eq!(config.sample_rate, 32000);
        assert_eq!(
            Materializer::new(config).clip_path(2),
            PathBuf::from("audio_output").join("audio_2.wav")
        );
    }
}
