//! Command-line interface.
//!
//! Two modes: a one-shot generation from `--prompt`, or `--serve` for the
//! JSON-RPC server over stdio.

use std::path::PathBuf;

use clap::Parser;

use crate::config::StudioConfig;

/// promptwave: text-to-music generation with MusicGen
#[derive(Parser, Debug)]
#[command(name = "promptwave")]
#[command(about = "Generate short music clips from text descriptions")]
#[command(version)]
pub struct Cli {
    /// Text describing the music to generate
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Duration of audio to generate in seconds (2-20)
    #[arg(short, long, default_value = "5", value_parser = clap::value_parser!(u32).range(2..=20))]
    pub duration: u32,

    /// Directory receiving audio_{idx}.wav files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Path to directory containing ONNX model files
    #[arg(short, long)]
    pub model_dir: Option<PathBuf>,

    /// Top-k truncation for token sampling
    #[arg(long)]
    pub top_k: Option<usize>,

    /// ONNX Runtime intra-op threads
    #[arg(long)]
    pub threads: Option<usize>,

    /// Run the JSON-RPC server over stdio
    #[arg(long)]
    pub serve: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Returns true if running a one-shot generation.
    pub fn is_cli_mode(&self) -> bool {
        !self.serve && self.prompt.is_some()
    }

    /// Returns true if running the JSON-RPC server.
    pub fn is_serve_mode(&self) -> bool {
        self.serve
    }

    /// Applies flag overrides on top of `config`.
    pub fn apply(&self, mut config: StudioConfig) -> StudioConfig {
        if let Some(ref dir) = self.model_dir {
            config.model_path = Some(dir.clone());
        }
        if let Some(ref dir) = self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(top_k) = self.top_k {
            config.top_k = top_k;
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
        config
    }
}
