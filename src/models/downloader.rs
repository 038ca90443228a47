//! Model downloader for MusicGen ONNX models.
//!
//! Fetches missing model files from HuggingFace on first use.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};

use crate::error::{Result, StudioError};

use super::loader::{missing_model_files, MODEL_URLS};

/// Timeout for a single model file download.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(3600);

/// Downloads all required model files that are not present yet.
///
/// Also tries to fetch the optional `config.json`; failure there is only logged.
pub fn ensure_models(model_dir: &Path) -> Result<()> {
    fs::create_dir_all(model_dir).map_err(|e| {
        StudioError::model_download_failed(format!(
            "Failed to create model directory {}: {}",
            model_dir.display(),
            e
        ))
    })?;

    let missing = missing_model_files(model_dir);
    if missing.is_empty() {
        info!("All model files present in {}", model_dir.display());
        return Ok(());
    }

    info!(
        "Downloading {} missing model files (this may take several minutes on first run)",
        missing.len()
    );

    let client = reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .map_err(|e| {
            StudioError::model_download_failed(format!("Failed to create HTTP client: {}", e))
        })?;

    for file in &missing {
        let url = model_url(file).ok_or_else(|| {
            StudioError::model_download_failed(format!("No download URL for {}", file))
        })?;
        download_file_streaming(&client, url, &model_dir.join(file))?;
    }

    let config_path = model_dir.join("config.json");
    if !config_path.exists() {
        if let Some(url) = model_url("config.json") {
            if let Err(e) = download_file_streaming(&client, url, &config_path) {
                warn!("Skipping optional config.json: {}", e);
            }
        }
    }

    info!("All models downloaded successfully.");
    Ok(())
}

/// Looks up the download URL of a model file.
fn model_url(file: &str) -> Option<&'static str> {
    MODEL_URLS
        .iter()
        .find(|(name, _)| *name == file)
        .map(|(_, url)| *url)
}

/// Returns the path a download is streamed to before it is complete.
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Runs `write` against `dest.part` and renames it to `dest` on success.
///
/// On failure the partial file is removed, so an interrupted download
/// never leaves a truncated file under the final name.
fn write_via_partial<F>(dest: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut fs::File) -> Result<()>,
{
    let partial = partial_path(dest);
    let result = fs::File::create(&partial)
        .map_err(|e| {
            StudioError::model_download_failed(format!(
                "Failed to create file {}: {}",
                partial.display(),
                e
            ))
        })
        .and_then(|mut file| {
            write(&mut file)?;
            file.sync_all().map_err(|e| {
                StudioError::model_download_failed(format!("Failed to flush file: {}", e))
            })
        })
        .and_then(|_| {
            fs::rename(&partial, dest).map_err(|e| {
                StudioError::model_download_failed(format!(
                    "Failed to move {} into place: {}",
                    partial.display(),
                    e
                ))
            })
        });

    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

/// Streams one file to disk, logging progress every 10%.
fn download_file_streaming(
    client: &reqwest::blocking::Client,
    url: &str,
    dest: &Path,
) -> Result<()> {
    let filename = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!("Downloading {}...", filename);

    let mut response = client.get(url).send().map_err(|e| {
        StudioError::model_download_failed(format!("Failed to download {}: {}", url, e))
    })?;

    if !response.status().is_success() {
        return Err(StudioError::model_download_failed(format!(
            "HTTP {} for {}",
            response.status(),
            url
        )));
    }

    let total_size = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;

    write_via_partial(dest, |file| {
        let mut buffer = [0u8; 65536];
        let mut last_progress = 0;

        loop {
            let bytes_read = response.read(&mut buffer).map_err(|e| {
                StudioError::model_download_failed(format!("Failed to read response: {}", e))
            })?;
            if bytes_read == 0 {
                break;
            }

            file.write_all(&buffer[..bytes_read]).map_err(|e| {
                StudioError::model_download_failed(format!("Failed to write file: {}", e))
            })?;
            downloaded += bytes_read as u64;

            if total_size > 0 {
                let progress = downloaded * 100 / total_size;
                if progress >= last_progress + 10 {
                    info!("  {}: {}%", filename, progress);
                    last_progress = progress;
                }
            }
        }
        Ok(())
    })?;

    info!(
        "  {}: done ({:.1} MB)",
        filename,
        downloaded as f64 / (1024.0 * 1024.0)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::loader::REQUIRED_MODEL_FILES;
    use tempfile::tempdir;

    #[test]
    fn every_required_file_has_url() {
        for file in REQUIRED_MODEL_FILES {
            assert!(model_url(file).is_some(), "Missing URL for {}", file);
        }
        assert!(model_url("config.json").is_some());
        assert!(model_url("unknown.onnx").is_none());
    }

    #[test]
    fn ensure_models_skips_download_when_present() {
        let dir = tempdir().unwrap();
        for file in REQUIRED_MODEL_FILES {
            fs::write(dir.path().join(file), b"stub").unwrap();
        }
        // No network access needed when nothing is missing.
        ensure_models(dir.path()).unwrap();
    }

    #[test]
    fn leftover_partial_file_is_still_missing() {
        let dir = tempdir().unwrap();
        for file in REQUIRED_MODEL_FILES {
            if *file != "decoder_model.onnx" {
                fs::write(dir.path().join(file), b"stub").unwrap();
            }
        }
        fs::write(partial_path(&dir.path().join("decoder_model.onnx")), b"trunc").unwrap();

        assert_eq!(missing_model_files(dir.path()), vec!["decoder_model.onnx"]);
    }

    #[test]
    fn partial_path_appends_suffix() {
        let path = partial_path(Path::new("/models/decoder_model.onnx"));
        assert_eq!(path, PathBuf::from("/models/decoder_model.onnx.part"));
    }

    #[test]
    fn interrupted_write_leaves_nothing_behind() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("encodec_decode.onnx");

        let err = write_via_partial(&dest, |file| {
            file.write_all(b"half a model").unwrap();
            Err(StudioError::model_download_failed("connection reset"))
        })
        .unwrap_err();

        assert_eq!(err.code, crate::error::ErrorCode::ModelDownloadFailed);
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }

    #[test]
    fn completed_write_is_moved_into_place() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("tokenizer.json");

        write_via_partial(&dest, |file| {
            file.write_all(b"{}").unwrap();
            Ok(())
        })
        .unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"{}");
        assert!(!partial_path(&dest).exists());
    }
}
