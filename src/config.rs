//! Memory-file location.
//!
//! Precedence: command-line argument, then the `MEMORY_FILE_PATH`
//! environment variable, then `memory.jsonl`. Relative paths are anchored
//! at the directory of the running program, not the caller's working
//! directory.

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Environment variable naming the memory file.
pub const MEMORY_FILE_PATH_ENV: &str = "MEMORY_FILE_PATH";

/// File name used when nothing else is configured.
pub const DEFAULT_MEMORY_FILE: &str = "memory.jsonl";

/// Where the resolved path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSource {
    CommandLine,
    Environment,
    Default,
}

/// A resolved memory-file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryPathConfig {
    pub path: PathBuf,
    pub source: PathSource,
}

impl MemoryPathConfig {
    /// Pick the configured path and anchor it at `base_dir` if relative.
    /// Empty values count as absent.
    pub fn resolve(cli: Option<&Path>, env: Option<&str>, base_dir: &Path) -> Self {
        let (raw, source) = match (cli, env) {
            (Some(p), _) if !p.as_os_str().is_empty() => (p.to_path_buf(), PathSource::CommandLine),
            (_, Some(e)) if !e.is_empty() => (PathBuf::from(e), PathSource::Environment),
            _ => (PathBuf::from(DEFAULT_MEMORY_FILE), PathSource::Default),
        };

        let path = if raw.is_absolute() {
            raw
        } else {
            base_dir.join(raw)
        };
        Self { path, source }
    }

    /// Resolve against this process's environment and executable location.
    pub fn from_process(cli: Option<&Path>) -> Result<Self> {
        let env = std::env::var(MEMORY_FILE_PATH_ENV).ok();
        let base = program_dir()?;
        Ok(Self::resolve(cli, env.as_deref(), &base))
    }
}

/// Directory containing the running executable.
pub fn program_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()
        .map_err(|e| Error::Config(format!("cannot locate running program: {e}")))?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| Error::Config(format!("program path has no parent: {}", exe.display())))
}
