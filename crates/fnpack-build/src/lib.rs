//! Bundling and file generation for fnpack.
//!
//! # Pipeline
//!
//! ```text
//! fnpack <entry> [--deploy-flag ...]
//!   1. Bundle      ── bundler <entry> → bundle.js
//!   2. Load        ── getConfig() via ModuleLoader, single step only
//!   3. Dockerfile  ── runtime -v → DockerfileGenerator::render()
//!   4. Config      ── FunctionConfig::into_container() → inngest.json
//!   5. Launcher    ── LauncherGenerator::render() → run.js
//!   6. Deploy      ── deploy CLI with passthrough flags
//!   7. Cleanup     ── remove Dockerfile, config, launcher (bundle kept)
//! ```

pub mod artifacts;
pub mod bundle;
pub mod dockerfile;
pub mod launcher;

pub use artifacts::{GeneratedArtifacts, cleanup};
pub use dockerfile::DockerfileGenerator;
pub use launcher::LauncherGenerator;
