//! Doctor command: report what an enrichment run would need.

use crate::cli::preflight::{self, Requirement, RequirementKind};
use crate::cli::Output;
use crate::config::{FallbackPolicy, Settings};
use std::path::Path;

/// Print every requirement and fail when any is missing.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Stemning Doctor");
    Output::kv("Fallback policy", &settings.transcripts.fallback.to_string());
    Output::kv("Store", &store_status(&settings.sqlite_path()));
    if settings.transcripts.fallback == FallbackPolicy::GiveUp {
        Output::info("Audio fallback is off; yt-dlp, ffmpeg and OpenAI are not needed.");
    }

    let found = preflight::requirements(settings);
    for kind in [RequirementKind::Key, RequirementKind::Tool] {
        let group: Vec<&Requirement> = found.iter().filter(|r| r.kind == kind).collect();
        if group.is_empty() {
            continue;
        }
        Output::header(match kind {
            RequirementKind::Key => "API keys",
            RequirementKind::Tool => "Tools",
        });
        for r in group {
            report(r);
        }
    }

    let missing = found.iter().filter(|r| !r.ready).count();
    println!();
    if missing > 0 {
        anyhow::bail!("{} requirement(s) missing", missing);
    }
    Output::success("Ready to enrich channels.");
    Ok(())
}

fn report(r: &Requirement) {
    let line = format!("{}: {}", r.name, r.detail);
    if r.ready {
        Output::success(&line);
    } else {
        Output::error(&line);
    }
}

fn store_status(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (created on first run)", path.display())
    }
}
