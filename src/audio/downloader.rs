//! Audio download and processing utilities.
//!
//! Audio is fetched with yt-dlp and normalized with ffmpeg to 16 kHz mono
//! PCM WAV, the input the speech-to-text model expects.

use crate::error::{Result, StemningError};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Sample rate for speech-to-text input.
const SAMPLE_RATE: u32 = 16_000;

/// Watch URL for a video ID.
fn video_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Downloads the audio track of a video into `output_dir`.
///
/// Returns the path of whatever container yt-dlp produced. Reuses an
/// earlier download of the same video when one is present.
#[instrument(skip(output_dir))]
pub async fn download_audio(video_id: &str, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    if let Ok(existing) = find_audio_file(output_dir, video_id) {
        info!("Using cached audio file");
        return Ok(existing);
    }

    let url = video_url(video_id);
    info!("Downloading audio from {}", url);

    let template = output_dir.join(format!("{}.%(ext)s", video_id));

    let result = Command::new("yt-dlp")
        .arg("--format").arg("bestaudio/best")
        .arg("--output").arg(&template)
        .arg("--no-playlist")
        .arg("--quiet")
        .arg("--no-warnings")
        .arg(&url)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StemningError::ToolNotFound("yt-dlp".into()));
        }
        Err(e) => {
            return Err(StemningError::AudioDownload(format!("yt-dlp execution failed: {e}")));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(StemningError::AudioDownload(format!("yt-dlp failed: {}", stderr.trim())));
    }

    find_audio_file(output_dir, video_id)
}

/// Locates a downloaded audio file by video ID.
fn find_audio_file(dir: &Path, video_id: &str) -> Result<PathBuf> {
    for ext in &["m4a", "webm", "opus", "mp3", "ogg"] {
        let candidate = dir.join(format!("{}.{}", video_id, ext));
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    let entries = std::fs::read_dir(dir)
        .map_err(|e| StemningError::AudioDownload(format!("Cannot read directory: {e}")))?;

    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(video_id) && !name.ends_with(".part") && !name.ends_with(".wav") {
            return Ok(entry.path());
        }
    }

    Err(StemningError::AudioDownload("Audio file not found after download".into()))
}

/// Converts any audio file to 16 kHz mono 16-bit WAV.
#[instrument(skip_all, fields(source = %source.display()))]
pub async fn convert_to_wav(source: &Path, dest: &Path) -> Result<()> {
    debug!("Converting to WAV at {}", dest.display());

    let result = Command::new("ffmpeg")
        .arg("-i").arg(source)
        .args(wav_args())
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    ffmpeg_outcome(result, "conversion")
}

/// Splits a WAV file into chunks of at most `chunk_seconds`.
///
/// Returns `(chunk_path, offset_seconds)` pairs in playback order. Audio no
/// longer than one chunk is returned as-is.
#[instrument(skip_all)]
pub async fn split_audio(
    source: &Path,
    output_dir: &Path,
    chunk_seconds: u32,
) -> Result<Vec<(PathBuf, f64)>> {
    std::fs::create_dir_all(output_dir)?;

    let total_duration = probe_duration(source).await?;
    info!("Total audio duration: {:.1}s", total_duration);

    let chunk_len = chunk_seconds.max(1) as f64;
    if total_duration <= chunk_len {
        return Ok(vec![(source.to_path_buf(), 0.0)]);
    }

    let base_name = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");

    let mut segments = Vec::new();
    for (idx, offset) in chunk_offsets(total_duration, chunk_len).into_iter().enumerate() {
        let segment_path = output_dir.join(format!("{}_{:04}.wav", base_name, idx));
        let segment_len = chunk_len.min(total_duration - offset);

        extract_segment(source, &segment_path, offset, segment_len).await?;
        debug!("Created segment {} at offset {:.1}s", idx, offset);
        segments.push((segment_path, offset));
    }

    info!("Created {} audio segments", segments.len());
    Ok(segments)
}

fn chunk_offsets(total: f64, chunk_len: f64) -> Vec<f64> {
    let mut offsets = Vec::new();
    let mut offset = 0.0;
    while offset < total {
        offsets.push(offset);
        offset += chunk_len;
    }
    offsets
}

/// Extracts a time range of a WAV file as a new WAV file.
async fn extract_segment(source: &Path, dest: &Path, start: f64, length: f64) -> Result<()> {
    let result = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .args(wav_args())
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    ffmpeg_outcome(result, "segment extraction")
}

fn wav_args() -> Vec<String> {
    vec![
        "-vn".into(),
        "-ac".into(),
        "1".into(),
        "-ar".into(),
        SAMPLE_RATE.to_string(),
        "-acodec".into(),
        "pcm_s16le".into(),
    ]
}

fn ffmpeg_outcome(result: std::io::Result<std::process::Output>, what: &str) -> Result<()> {
    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(StemningError::AudioDownload(format!("ffmpeg {what} failed: {}", err.trim())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(StemningError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(StemningError::AudioDownload(format!("ffmpeg error: {e}"))),
    }
}

/// Queries the duration of an audio file using ffprobe with JSON output.
async fn probe_duration(path: &Path) -> Result<f64> {
    let result = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg(path)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StemningError::ToolNotFound("ffprobe".into()));
        }
        Err(e) => {
            return Err(StemningError::AudioDownload(format!("ffprobe failed: {e}")));
        }
    };

    if !output.status.success() {
        return Err(StemningError::AudioDownload("ffprobe returned error".into()));
    }

    parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
}

fn parse_probe_duration(json: &str) -> Result<f64> {
    let parsed: serde_json::Value = serde_json::from_str(json)
        .map_err(|_| StemningError::AudioDownload("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| StemningError::AudioDownload("Could not determine audio duration".into()))
}
