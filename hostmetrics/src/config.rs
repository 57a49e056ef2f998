//! Native library location policy
//!
//! The loader itself only accepts a concrete path. This module decides which
//! path that is: an explicit override first, then the build for the current
//! CPU architecture, then (only when enabled) an unversioned `native` build.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Environment variable holding an explicit library path.
pub const LIBRARY_ENV: &str = "HOSTMETRICS_LIB";

/// Environment variable naming a [`LocatorConfig`] JSON file.
pub const CONFIG_ENV: &str = "HOSTMETRICS_CONFIG";

/// Where to find the native library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorConfig {
    /// Explicit library path. Must exist when set; there is no fallback.
    #[serde(default)]
    pub library_path: Option<PathBuf>,

    /// Root holding one directory per architecture.
    #[serde(default = "default_search_dir")]
    pub search_dir: PathBuf,

    /// Platform file name of the library.
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Also accept `<search_dir>/native/<file_name>` when no architecture
    /// build is present. Such a build may be stale, so this is off unless
    /// asked for.
    #[serde(default)]
    pub allow_native_fallback: bool,
}

fn default_search_dir() -> PathBuf {
    PathBuf::from("target/lib")
}

fn default_file_name() -> String {
    libloading::library_filename("hostmetrics_native")
        .to_string_lossy()
        .into_owned()
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            library_path: None,
            search_dir: default_search_dir(),
            file_name: default_file_name(),
            allow_native_fallback: false,
        }
    }
}

/// Directory name used for builds targeting `arch` (as in
/// `std::env::consts::ARCH`).
pub fn arch_dir(arch: &str) -> Option<&'static str> {
    match arch {
        "x86_64" => Some("amd64"),
        "aarch64" => Some("arm64"),
        _ => None,
    }
}

fn build_hint(dir: &Path) -> String {
    format!(
        "build it with `cargo build -p hostmetrics_native --release` and copy the library into {}",
        dir.display()
    )
}

impl LocatorConfig {
    /// Load configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolves the library path for this process, honouring
    /// [`LIBRARY_ENV`].
    pub fn resolve(&self) -> Result<PathBuf> {
        let env_override = std::env::var_os(LIBRARY_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        self.resolve_with(env_override, std::env::consts::ARCH)
    }

    /// Resolution with the environment made explicit.
    pub fn resolve_with(&self, env_override: Option<PathBuf>, arch: &str) -> Result<PathBuf> {
        if let Some(path) = env_override.or_else(|| self.library_path.clone()) {
            if path.is_file() {
                tracing::debug!("Using library override {}", path.display());
                return Ok(path);
            }
            return Err(Error::LibraryNotFound {
                hint: format!("the override (config or {LIBRARY_ENV}) must name an existing file"),
                path,
            });
        }

        let arch_candidate = match arch_dir(arch) {
            Some(dir) => {
                let candidate = self.search_dir.join(dir).join(&self.file_name);
                if candidate.is_file() {
                    return Ok(candidate);
                }
                Some(candidate)
            }
            None if !self.allow_native_fallback => {
                return Err(Error::UnsupportedArch(arch.to_string()));
            }
            None => None,
        };

        let native_candidate = self.search_dir.join("native").join(&self.file_name);
        if self.allow_native_fallback && native_candidate.is_file() {
            tracing::warn!(
                "No {} build found, falling back to unversioned {} which may be stale",
                arch,
                native_candidate.display()
            );
            return Ok(native_candidate);
        }

        let expected = arch_candidate.unwrap_or(native_candidate);
        let dir = expected
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.search_dir.clone());
        Err(Error::LibraryNotFound {
            hint: build_hint(&dir),
            path: expected,
        })
    }
}
