use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Name of the optional settings file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "fnpack.toml";

/// fnpack.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FnpackConfig {
    #[serde(default)]
    pub bundle: BundleConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub deploy: DeployConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Bundler executable
    #[serde(default = "default_bundle_program")]
    pub program: String,
    /// Bundler arguments. `{entry}` and `{outfile}` are substituted.
    #[serde(default = "default_bundle_args")]
    pub args: Vec<String>,
    /// Bundle filename, relative to the working directory
    #[serde(default = "default_bundle_output")]
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Runtime binary used to query the version and load the bundle
    #[serde(default = "default_runtime_program")]
    pub program: String,
    /// Version used when the runtime binary cannot be queried
    #[serde(default = "default_runtime_version")]
    pub default_version: String,
    /// Upper bound on the version query, in seconds (0 disables the limit)
    #[serde(default = "default_version_timeout_secs")]
    pub version_timeout_secs: u64,
    /// Appended to `node:<version>` in the Dockerfile `FROM` line
    #[serde(default = "default_base_image_suffix")]
    pub base_image_suffix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Generated Dockerfile name
    #[serde(default = "default_dockerfile_name")]
    pub dockerfile: String,
    /// Generated function configuration name
    #[serde(default = "default_config_name")]
    pub config: String,
    /// Generated launcher script name
    #[serde(default = "default_launcher_name")]
    pub launcher: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Deploy CLI executable
    #[serde(default = "default_deploy_program")]
    pub program: String,
    /// Arguments placed before the passthrough flags
    #[serde(default = "default_deploy_args")]
    pub args: Vec<String>,
    /// Upper bound on the deploy run, in seconds (0 disables the limit)
    #[serde(default)]
    pub timeout_secs: u64,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            program: default_bundle_program(),
            args: default_bundle_args(),
            output: default_bundle_output(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            program: default_runtime_program(),
            default_version: default_runtime_version(),
            version_timeout_secs: default_version_timeout_secs(),
            base_image_suffix: default_base_image_suffix(),
        }
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dockerfile: default_dockerfile_name(),
            config: default_config_name(),
            launcher: default_launcher_name(),
        }
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            program: default_deploy_program(),
            args: default_deploy_args(),
            timeout_secs: 0,
        }
    }
}

impl RuntimeConfig {
    pub fn version_timeout(&self) -> Option<Duration> {
        secs_to_timeout(self.version_timeout_secs)
    }
}

impl DeployConfig {
    pub fn timeout(&self) -> Option<Duration> {
        secs_to_timeout(self.timeout_secs)
    }
}

impl BundleConfig {
    /// Module specifier the launcher uses to `require` the bundle.
    ///
    /// `bundle.js` becomes `./bundle`.
    pub fn module_specifier(&self) -> String {
        let stem = self
            .output
            .strip_suffix(".js")
            .or_else(|| self.output.strip_suffix(".cjs"))
            .unwrap_or(&self.output);
        format!("./{stem}")
    }
}

impl FnpackConfig {
    /// Load from fnpack.toml at the given path, or return defaults if not found.
    pub fn load(project_dir: &std::path::Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            let config: Self = toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path.clone(),
                source: e,
            })?;
            tracing::debug!(path = %config_path.display(), "loaded settings");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }
}

fn secs_to_timeout(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn default_bundle_program() -> String {
    "npx".to_owned()
}

fn default_bundle_args() -> Vec<String> {
    [
        "esbuild",
        "{entry}",
        "--bundle",
        "--format=cjs",
        "--platform=node",
        "--outfile={outfile}",
    ]
    .iter()
    .map(|s| (*s).to_owned())
    .collect()
}

fn default_bundle_output() -> String {
    "bundle.js".to_owned()
}

fn default_runtime_program() -> String {
    "node".to_owned()
}

fn default_runtime_version() -> String {
    "16.16.0".to_owned()
}

fn default_version_timeout_secs() -> u64 {
    10
}

fn default_base_image_suffix() -> String {
    "-buster-slim".to_owned()
}

fn default_dockerfile_name() -> String {
    "Dockerfile.inngest".to_owned()
}

fn default_config_name() -> String {
    "inngest.json".to_owned()
}

fn default_launcher_name() -> String {
    "run.js".to_owned()
}

fn default_deploy_program() -> String {
    "npx".to_owned()
}

fn default_deploy_args() -> Vec<String> {
    vec!["inngest-cli".to_owned(), "deploy".to_owned()]
}
