//! CLI command implementations.

pub mod apply;
pub mod quality;
pub mod recommend;

use std::path::{Path, PathBuf};

use steward::StewardConfig;

/// Configuration from `--config`, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<StewardConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            StewardConfig::from_file(path)?
        }
        None => StewardConfig::default(),
    };
    Ok(config)
}

fn require_file(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }
    Ok(())
}

/// `<stem>.<suffix>` next to `file`.
fn sibling(file: &Path, suffix: &str) -> PathBuf {
    let mut p = file.to_path_buf();
    let stem = p.file_stem().unwrap_or_default().to_string_lossy().into_owned();
    p.set_file_name(format!("{}.{}", stem, suffix));
    p
}

/// Percentage with one decimal, colored by how good it is.
fn colored_score(score: f64) -> colored::ColoredString {
    use colored::Colorize;
    let text = format!("{:.1}", score);
    if score >= 75.0 {
        text.green()
    } else if score >= 60.0 {
        text.yellow()
    } else {
        text.red()
    }
}
