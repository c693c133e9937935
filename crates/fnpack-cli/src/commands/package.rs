use super::pipeline::{self, PipelineError};
use fnpack_core::FnpackConfig;
use fnpack_exec::RealExecutor;
use std::path::PathBuf;

/// Package `entry` and deploy it, forwarding `flags` to the deploy command.
///
/// Bundling and deploy failures print a short message and exit with code 1;
/// every other error is returned to `main`.
pub async fn package(entry: PathBuf, flags: &[String], ignored: &[String]) -> anyhow::Result<()> {
    let project_dir = std::env::current_dir()?;
    let config = FnpackConfig::load(&project_dir)?;

    for token in ignored {
        tracing::warn!(token = %token, "ignoring argument that is not a `--` flag");
    }

    match pipeline::run(
        &RealExecutor,
        &project_dir,
        &config,
        &entry,
        flags,
    )
    .await
    {
        Ok(outcome) => {
            for path in &outcome.leftover {
                tracing::warn!(path = %path.display(), "generated file left on disk");
            }
            tracing::info!(
                step = %outcome.step_id,
                runtime = %outcome.runtime_version,
                bundle = %outcome.bundle.display(),
                "deployed"
            );
            Ok(())
        }
        Err(PipelineError::Bundle(e)) => {
            println!("Failed to bundle function");
            println!("{:#}", anyhow::Error::from(e));
            std::process::exit(1);
        }
        Err(PipelineError::Deploy(e)) => {
            println!("Deployment failed!");
            println!("{e}");
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
