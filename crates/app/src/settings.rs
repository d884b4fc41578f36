use anyhow::{Context, Result};
use jotledger_core::LedgerConfig;
use std::path::{Path, PathBuf};

/// `config.toml` in the platform config folder, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "jotledger", "Jotledger")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Loads the config at `explicit`, else the default file when it exists,
/// else built-in defaults. `corpus_override` replaces `corpus.root`.
pub fn load_config(explicit: Option<&Path>, corpus_override: Option<PathBuf>) -> Result<LedgerConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|p| p.is_file()),
    };

    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            let config = LedgerConfig::from_toml(&content)
                .with_context(|| format!("Invalid config {}", path.display()))?;
            tracing::debug!("Loaded config from {}", path.display());
            config
        }
        None => LedgerConfig::default(),
    };

    if let Some(root) = corpus_override {
        config.corpus.root = Some(root);
    }
    Ok(config)
}
