use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    // ── Function configuration ──
    #[error("step functions are not yet supported (found {count} steps: {})", ids.join(", "))]
    UnsupportedStepFunctions { count: usize, ids: Vec<String> },

    #[error("function configuration declares no steps")]
    NoSteps,
}
