use anyhow::{Context, Result};
use gaia_selection::SelectorConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Config {
    pub snapshot_path: PathBuf,
    pub selector: SelectorConfig,
    pub output_path: Option<PathBuf>,
}

/// Read the selector config from `path` (efficient defaults when absent)
/// and apply a command-line seed override.
pub fn load_selector(path: Option<&Path>, seed: Option<u64>) -> Result<SelectorConfig> {
    let mut selector = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read selector config {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse selector config {}", path.display()))?
        }
        None => SelectorConfig::default(),
    };

    if let Some(seed) = seed {
        match &mut selector {
            SelectorConfig::Efficient(cfg) => cfg.seed = Some(seed),
            other => tracing::warn!(selector = ?other, "--seed only applies to the efficient selector"),
        }
    }

    selector.validate().context("Invalid selector config")?;
    Ok(selector)
}
