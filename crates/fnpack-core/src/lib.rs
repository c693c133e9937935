//! Core types and configuration for fnpack.
//!
//! This crate defines the `fnpack.toml` schema ([`FnpackConfig`]), the
//! step-function configuration reported by a bundled module
//! ([`FunctionConfig`]), and shared error types.

pub mod config;
pub mod error;
pub mod function;

pub use config::{ArtifactsConfig, BundleConfig, DeployConfig, FnpackConfig, RuntimeConfig};
pub use error::{Error, Result};
pub use function::{FunctionConfig, Runtime, StepDescriptor};
