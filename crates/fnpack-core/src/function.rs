//! Step-function configuration reported by a bundled module's `getConfig`.
//!
//! Only `steps` and each step's `path`/`runtime` are interpreted; every
//! other field is carried through to the written configuration unchanged.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Source path every rewritten step points at.
pub const CONTAINER_STEP_PATH: &str = "file://.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionConfig {
    pub steps: BTreeMap<String, StepDescriptor>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A step as reported by the module. `path` and `runtime` are replaced on
/// rewrite, so shapes fnpack does not understand fall back to their defaults
/// instead of failing extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDescriptor {
    #[serde(default, deserialize_with = "lenient")]
    pub path: String,
    #[serde(default, deserialize_with = "lenient")]
    pub runtime: Runtime,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// How a step executes once deployed, tagged on `type`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Runtime {
    /// Built from a Dockerfile next to the configuration.
    Container { dockerfile: String },
    /// Served by an HTTP endpoint.
    Http {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    /// Any runtime fnpack does not model; replaced on rewrite.
    #[default]
    #[serde(other)]
    Unknown,
}

impl Runtime {
    pub fn container(dockerfile_name: &str) -> Self {
        Self::Container {
            dockerfile: format!("./{dockerfile_name}"),
        }
    }

    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Container { .. } => "container",
            Self::Http { .. } => "http",
            Self::Unknown => "unknown",
        }
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            tracing::debug!(error = %e, "unrecognized step field, using default");
            Ok(T::default())
        }
    }
}

impl FunctionConfig {
    /// Returns the id of the only step, rejecting empty and multi-step
    /// configurations.
    pub fn single_step_id(&self) -> crate::Result<&str> {
        let mut ids = self.steps.keys();
        match (ids.next(), ids.next()) {
            (None, _) => Err(crate::Error::NoSteps),
            (Some(id), None) => Ok(id),
            (Some(_), Some(_)) => Err(crate::Error::UnsupportedStepFunctions {
                count: self.steps.len(),
                ids: self.steps.keys().cloned().collect(),
            }),
        }
    }

    /// Points every step at the container built from `dockerfile_name`.
    pub fn into_container(mut self, dockerfile_name: &str) -> Self {
        for step in self.steps.values_mut() {
            step.path = CONTAINER_STEP_PATH.to_owned();
            step.runtime = Runtime::container(dockerfile_name);
        }
        self
    }
}
