//! AudioClip type describing one written WAV file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A clip written to the output directory.
///
/// One clip is produced per batch element of an audio tensor. The index
/// follows batch order and determines the file name (`audio_{index}.wav`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioClip {
    /// Position of the clip in the source batch (0-based).
    pub index: usize,

    /// Full filesystem path to the WAV file.
    pub path: PathBuf,

    /// Number of interleaved channels in the file.
    pub channels: u16,

    /// Number of samples per channel.
    pub frames: usize,

    /// Audio sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioClip {
    /// Returns the playback duration in seconds.
    pub fn duration_sec(&self) -> f32 {
        crate::audio::samples_to_duration(self.frames, self.sample_rate)
    }

    /// Returns the file name component of the clip path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_from_frames() {
        let clip = AudioClip {
            index: 0,
            path: PathBuf::from("audio_output/audio_0.wav"),
            channels: 1,
            frames: 160_000,
            sample_rate: 32000,
        };
        assert_eq!(clip.duration_sec(), 5.0);
        assert_eq!(clip.file_name(), "audio_0.wav");
    }
}
