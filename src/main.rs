//! promptwave: text-to-music generation with MusicGen.
//!
//! This binary can run in two modes:
//! - CLI mode: generate one description and print the written path
//! - Serve mode: JSON-RPC server over stdio

use log::info;

use promptwave::audio::{ensure_output_dir, Materializer};
use promptwave::cli::Cli;
use promptwave::config::StudioConfig;
use promptwave::error::{Result, StudioError};
use promptwave::GenerationEngine;
use promptwave::generation::{
    estimate_generation_time, generate_and_save, validate_request, MusicGenerator,
};
use promptwave::models::{ensure_models, MusicGenModels};
use promptwave::rpc::{run_server, ServerState};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse_args();

    if !cli.is_serve_mode() && !cli.is_cli_mode() {
        print_usage();
        return Ok(());
    }

    let config = cli.apply(StudioConfig::from_env());
    if let Some(msg) = config.validate() {
        return Err(StudioError::invalid_config(msg));
    }

    ensure_output_dir(&config.output_dir)?;
    let generator = load_generator(&config)?;

    if cli.is_serve_mode() {
        run_server(ServerState::new(generator, config)?)
    } else {
        run_cli_mode(&cli, generator, &config)
    }
}

/// Downloads missing model files and loads the engine once.
fn load_generator(config: &StudioConfig) -> Result<MusicGenerator<MusicGenModels>> {
    let model_dir = config.effective_model_path();
    info!("Model directory: {}", model_dir.display());

    ensure_models(&model_dir)?;
    let models = MusicGenModels::load(&model_dir, config.threads)?;

    Ok(MusicGenerator::new(models).with_top_k(config.top_k))
}

/// Generates one clip set and prints the path of the first clip.
fn run_cli_mode(
    cli: &Cli,
    mut generator: MusicGenerator<MusicGenModels>,
    config: &StudioConfig,
) -> Result<()> {
    config.check_engine_rate(generator.engine().sample_rate())?;

    let prompt = cli.prompt.as_deref().unwrap_or_default();
    let duration_sec = validate_request(prompt, i64::from(cli.duration))?;

    info!("Output directory: {}", config.output_dir.display());
    info!(
        "Estimated generation time: ~{:.0}s",
        estimate_generation_time(duration_sec)
    );

    let materializer = Materializer::new(config.materializer());
    let output = generate_and_save(&mut generator, &materializer, prompt, duration_sec)?;

    info!(
        "Generation complete in {:.2}s ({})",
        output.generation_time.as_secs_f32(),
        output.model_version
    );

    for clip in &output.clips {
        println!("{}", clip.path.display());
    }

    Ok(())
}

/// Prints usage information.
fn print_usage() {
    eprintln!("promptwave: text-to-music generation with MusicGen");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  One-shot generation (2-20s at 32kHz):");
    eprintln!("    promptwave --prompt \"calm piano melody\" --duration 5");
    eprintln!();
    eprintln!("  JSON-RPC server over stdio:");
    eprintln!("    promptwave --serve");
    eprintln!();
    eprintln!("Run 'promptwave --help' for full options.");
}
