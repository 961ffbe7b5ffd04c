use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YamlConfig {
    pub output_dir: Option<PathBuf>,
    pub root_marker: Option<String>,
    pub follow_links: Option<bool>,
    pub escape_strings: Option<bool>,
}

/// Missing file => None. A file that exists but does not parse is an error.
pub fn load_yaml(path: &Path) -> Result<Option<YamlConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let cfg = serde_yaml::from_reader(file).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(cfg))
}

/// C:\dirs\js on Windows, ~/dirs/js elsewhere
pub fn default_output_dir() -> PathBuf {
    #[cfg(windows)]
    {
        PathBuf::from(r"C:\dirs\js")
    }
    #[cfg(not(windows))]
    {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dirs")
            .join("js")
    }
}
