use std::path::{Path, PathBuf};

use fnpack_core::BundleConfig;
use fnpack_exec::{CommandExecutor, ExecError};

/// Compiles `entry` into a single module at `<project_dir>/<config.output>`.
///
/// `entry` is resolved against `project_dir` and must be a file;
/// directory entry points are not supported. Nothing is cleaned up when
/// the bundler fails.
pub async fn bundle<E: CommandExecutor>(
    executor: &E,
    config: &BundleConfig,
    project_dir: &Path,
    entry: &Path,
) -> Result<PathBuf, BundleError> {
    let entry = project_dir.join(entry);
    if !entry.exists() {
        return Err(BundleError::EntryNotFound(entry));
    }
    if entry.is_dir() {
        return Err(BundleError::DirectoryEntry(entry));
    }

    let outfile = project_dir.join(&config.output);
    let args = bundler_args(config, &entry, &outfile);
    tracing::info!(entry = %entry.display(), outfile = %outfile.display(), "bundling");

    executor
        .exec(&config.program, &args, None)
        .await
        .map_err(|e| BundleError::Bundler {
            entry: entry.clone(),
            source: e,
        })?;

    if !outfile.is_file() {
        return Err(BundleError::MissingOutput(outfile));
    }

    Ok(outfile)
}

/// Substitutes `{entry}` and `{outfile}` in the configured bundler arguments.
pub fn bundler_args(config: &BundleConfig, entry: &Path, outfile: &Path) -> Vec<String> {
    let entry = entry.display().to_string();
    let outfile = outfile.display().to_string();
    config
        .args
        .iter()
        .map(|arg| arg.replace("{entry}", &entry).replace("{outfile}", &outfile))
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("entry point {0} does not exist")]
    EntryNotFound(PathBuf),
    #[error("entry point {0} is a directory; only single-file entry points are supported")]
    DirectoryEntry(PathBuf),
    #[error("bundler failed for {entry}")]
    Bundler { entry: PathBuf, source: ExecError },
    #[error("bundler reported success but {0} was not written")]
    MissingOutput(PathBuf),
}
