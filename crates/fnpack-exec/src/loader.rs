//! Loading a bundled function module and reading its configuration.
//!
//! A bundle satisfies the module contract when its default export exposes
//! both `getConfig(origin, name)` and `runStep(stepId, data)` functions.
//! The real call context is unknown at packaging time, so `getConfig` is
//! called with [`PLACEHOLDER_ORIGIN`] and [`PLACEHOLDER_NAME`].

use std::path::{Path, PathBuf};

use fnpack_core::{FunctionConfig, RuntimeConfig};
use serde::Deserialize;

use crate::error::ExecError;
use crate::executor::CommandExecutor;

pub const PLACEHOLDER_ORIGIN: &str = "https://placeholder.com";
pub const PLACEHOLDER_NAME: &str = "placeholder";

/// Capabilities a bundle's default export must provide.
pub const REQUIRED_EXPORTS: [&str; 2] = ["getConfig", "runStep"];

/// Prefix of the stdout line carrying the loader report. The module may log
/// freely; only the last line with this prefix is parsed.
pub const REPORT_PREFIX: &str = "@@fnpack-report@@ ";

/// Runs inside the runtime: `<program> -e LOADER_SCRIPT <artifact> <origin> <name> <prefix>`.
const LOADER_SCRIPT: &str = r#"
const [artifact, origin, name, prefix] = process.argv.slice(-4);
const report = (value) => process.stdout.write("\n" + prefix + JSON.stringify(value) + "\n");
const fn = (require(artifact) || {}).default;
const missing = ["getConfig", "runStep"].filter(
  (cap) => !fn || typeof fn[cap] !== "function"
);
if (missing.length > 0) {
  report({ ok: false, missing });
} else {
  Promise.resolve(fn.getConfig(new URL(origin), name)).then((config) => {
    report({ ok: true, config });
  });
}
"#;

/// A bundle that satisfied the module contract.
#[derive(Debug, Clone)]
pub struct LoadedModule {
    pub artifact: PathBuf,
    pub config: FunctionConfig,
}

/// Loads a build artifact and checks it against the module contract.
#[allow(async_fn_in_trait)]
pub trait ModuleLoader {
    async fn load(&self, artifact: &Path) -> Result<LoadedModule, LoadError>;
}

/// [`ModuleLoader`] that evaluates the bundle with the configured runtime binary.
pub struct NodeModuleLoader<'a, E: CommandExecutor> {
    executor: &'a E,
    runtime: &'a RuntimeConfig,
}

impl<'a, E: CommandExecutor> NodeModuleLoader<'a, E> {
    pub fn new(executor: &'a E, runtime: &'a RuntimeConfig) -> Self {
        Self { executor, runtime }
    }
}

#[derive(Deserialize)]
struct LoaderReport {
    ok: bool,
    #[serde(default)]
    missing: Vec<String>,
    #[serde(default)]
    config: serde_json::Value,
}

impl<E: CommandExecutor> ModuleLoader for NodeModuleLoader<'_, E> {
    async fn load(&self, artifact: &Path) -> Result<LoadedModule, LoadError> {
        let args = vec![
            "-e".to_owned(),
            LOADER_SCRIPT.to_owned(),
            artifact.display().to_string(),
            PLACEHOLDER_ORIGIN.to_owned(),
            PLACEHOLDER_NAME.to_owned(),
            REPORT_PREFIX.to_owned(),
        ];

        let stdout = self
            .executor
            .exec(&self.runtime.program, &args, None)
            .await
            .map_err(|e| LoadError::Evaluate {
                artifact: artifact.to_path_buf(),
                source: e,
            })?;

        let report_line = extract_report(&stdout).ok_or_else(|| LoadError::MissingReport {
            artifact: artifact.to_path_buf(),
        })?;
        let report: LoaderReport =
            serde_json::from_str(report_line).map_err(|e| LoadError::MalformedReport {
                artifact: artifact.to_path_buf(),
                source: e,
            })?;

        if !report.ok {
            return Err(LoadError::ContractNotSatisfied {
                artifact: artifact.to_path_buf(),
                missing: report.missing,
            });
        }

        let config = parse_function_config(report.config).map_err(|reason| {
            LoadError::InvalidConfig {
                artifact: artifact.to_path_buf(),
                reason,
            }
        })?;

        tracing::debug!(artifact = %artifact.display(), steps = config.steps.len(), "module loaded");

        Ok(LoadedModule {
            artifact: artifact.to_path_buf(),
            config,
        })
    }
}

/// Returns the payload of the last report line in `stdout`.
fn extract_report(stdout: &str) -> Option<&str> {
    stdout
        .lines()
        .rev()
        .find_map(|line| line.trim_end_matches('\r').strip_prefix(REPORT_PREFIX))
}

fn parse_function_config(value: serde_json::Value) -> Result<FunctionConfig, String> {
    match value.get("steps") {
        Some(serde_json::Value::Object(_)) => {}
        Some(_) => return Err("`steps` is not an object".to_owned()),
        None => return Err("getConfig() result has no `steps` mapping".to_owned()),
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to evaluate bundle {}", artifact.display())]
    Evaluate {
        artifact: PathBuf,
        source: ExecError,
    },

    #[error("loading {} produced no report", artifact.display())]
    MissingReport { artifact: PathBuf },

    #[error("unexpected loader output for {}", artifact.display())]
    MalformedReport {
        artifact: PathBuf,
        source: serde_json::Error,
    },

    #[error(
        "module contract not satisfied by {}: default export is missing {}",
        artifact.display(),
        missing.join(", ")
    )]
    ContractNotSatisfied {
        artifact: PathBuf,
        missing: Vec<String>,
    },

    #[error("invalid function configuration from {}: {reason}", artifact.display())]
    InvalidConfig { artifact: PathBuf, reason: String },
}
