//! Subprocess boundaries of the fnpack pipeline.
//!
//! Every external program (bundler, runtime binary, deploy CLI) is driven
//! through [`CommandExecutor`], so the pipeline can be exercised with a mock
//! executor in tests.

pub mod deploy;
pub mod error;
pub mod executor;
pub mod loader;
pub mod version;

pub use deploy::{DeployError, deploy};
pub use error::ExecError;
pub use executor::{CommandExecutor, RealExecutor};
pub use loader::{LoadError, LoadedModule, ModuleLoader, NodeModuleLoader};
pub use version::runtime_version;
