//! Auxiliary files written next to the bundle and removed after deploy.

use std::path::{Path, PathBuf};

use fnpack_core::FunctionConfig;

/// Paths of the generated files that [`cleanup`] removes.
///
/// The bundle is not part of this set and stays on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifacts {
    pub dockerfile: PathBuf,
    pub config: PathBuf,
    pub launcher: PathBuf,
}

impl GeneratedArtifacts {
    pub fn paths(&self) -> [&Path; 3] {
        [&self.dockerfile, &self.config, &self.launcher]
    }
}

pub async fn write_text(dir: &Path, name: &str, contents: &str) -> Result<PathBuf, ArtifactError> {
    let path = dir.join(name);
    tokio::fs::write(&path, contents)
        .await
        .map_err(|e| ArtifactError::Write {
            path: path.clone(),
            source: e,
        })?;
    tracing::debug!(path = %path.display(), "wrote artifact");
    Ok(path)
}

/// Writes the configuration as 2-space indented JSON.
pub async fn write_function_config(
    dir: &Path,
    name: &str,
    config: &FunctionConfig,
) -> Result<PathBuf, ArtifactError> {
    let json = serde_json::to_string_pretty(config).map_err(|e| ArtifactError::Serialize {
        path: dir.join(name),
        source: e,
    })?;
    write_text(dir, name, &json).await
}

/// Deletes the generated files concurrently.
///
/// Every deletion is attempted; the failures are returned and logged.
pub async fn cleanup(artifacts: &GeneratedArtifacts) -> Vec<CleanupFailure> {
    let (dockerfile, config, launcher) = tokio::join!(
        tokio::fs::remove_file(&artifacts.dockerfile),
        tokio::fs::remove_file(&artifacts.config),
        tokio::fs::remove_file(&artifacts.launcher),
    );

    let mut failures = Vec::new();
    for (path, result) in artifacts.paths().into_iter().zip([dockerfile, config, launcher]) {
        if let Err(e) = result {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove generated file");
            failures.push(CleanupFailure {
                path: path.to_path_buf(),
                source: e,
            });
        }
    }
    failures
}

#[derive(Debug, thiserror::Error)]
#[error("failed to remove {}", path.display())]
pub struct CleanupFailure {
    pub path: PathBuf,
    pub source: std::io::Error,
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize {}", path.display())]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}
