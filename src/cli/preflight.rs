//! Pre-flight checks before an enrichment run.
//!
//! Both API keys are always needed. The OpenAI key and the audio tools are
//! only needed when the transcribe fallback is enabled.

use crate::config::{FallbackPolicy, Settings};
use crate::error::{Result, StemningError};
use std::process::Command;

/// Whether a requirement is an API key or an external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementKind {
    Key,
    Tool,
}

/// Something an enrichment run depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    pub name: &'static str,
    pub kind: RequirementKind,
    pub ready: bool,
    /// Masked key or tool version when ready, otherwise how to fix it.
    pub detail: String,
}

/// Collect the requirements of an enrichment run under the current settings.
pub fn requirements(settings: &Settings) -> Vec<Requirement> {
    let mut found = vec![
        key("YOUTUBE_API_KEY", "youtube.api_key", settings.youtube_api_key()),
        key("GOOGLE_API_KEY", "sentiment.api_key", settings.sentiment_api_key()),
    ];

    if settings.transcripts.fallback == FallbackPolicy::Transcribe {
        found.push(key(
            "OPENAI_API_KEY",
            "transcription.api_key",
            settings.openai_api_key(),
        ));
        found.extend(["yt-dlp", "ffmpeg", "ffprobe"].into_iter().map(tool));
    }
    found
}

/// Fail on the first requirement that is not met.
pub fn check_enrich(settings: &Settings) -> Result<()> {
    match requirements(settings).into_iter().find(|r| !r.ready) {
        None => Ok(()),
        Some(r) if r.kind == RequirementKind::Tool => Err(StemningError::ToolNotFound(r.name.to_string())),
        Some(r) => Err(StemningError::Config(format!("{} not set: {}", r.name, r.detail))),
    }
}

fn key(name: &'static str, setting: &str, value: Option<String>) -> Requirement {
    let (ready, detail) = match value {
        Some(k) => (true, mask_key(&k)),
        None => (false, format!("set {} or export {}", setting, name)),
    };
    Requirement {
        name,
        kind: RequirementKind::Key,
        ready,
        detail,
    }
}

fn tool(name: &'static str) -> Requirement {
    // ffmpeg and ffprobe take a single-dash flag
    let flag = if name.starts_with("ff") { "-version" } else { "--version" };

    let (ready, detail) = match Command::new(name).arg(flag).output() {
        Ok(output) if output.status.success() => {
            let version: String = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or_default()
                .trim()
                .chars()
                .take(50)
                .collect();
            (true, version)
        }
        Ok(_) => (false, "installed but not working".to_string()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => (false, "not found on PATH".to_string()),
        Err(e) => (false, e.to_string()),
    };
    Requirement {
        name,
        kind: RequirementKind::Tool,
        ready,
        detail,
    }
}

/// Show only the ends of a key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
