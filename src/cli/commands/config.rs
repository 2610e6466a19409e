//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Run the config command against `--config` or the default location.
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: Option<&str>) -> Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => println!("{}", toml::to_string_pretty(&settings)?),
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Edit => edit(&settings, &path)?,
    }
    Ok(())
}

/// Open the file in `$EDITOR`, writing the effective settings first if it is missing.
fn edit(settings: &Settings, path: &PathBuf) -> Result<()> {
    if !path.exists() {
        settings.save_to(path)?;
        Output::info(&format!("Wrote defaults to {}", path.display()));
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = std::process::Command::new(&editor)
        .arg(path)
        .status()
        .with_context(|| format!("could not start {} (file is at {})", editor, path.display()))?;

    if !status.success() {
        anyhow::bail!("{} exited with {}", editor, status);
    }
    Settings::load_from(Some(path)).context("edited config does not parse")?;
    Output::success("Config updated.");
    Ok(())
}
