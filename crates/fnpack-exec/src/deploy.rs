use fnpack_core::DeployConfig;

use crate::error::{ExecError, describe_exit};
use crate::executor::CommandExecutor;

/// Full argument list for the deploy CLI: configured args, then passthrough flags.
pub fn deploy_args(deploy: &DeployConfig, flags: &[String]) -> Vec<String> {
    deploy.args.iter().chain(flags).cloned().collect()
}

/// Runs the deploy CLI, streaming its output, and succeeds only on exit code 0.
pub async fn deploy<E: CommandExecutor>(
    executor: &E,
    deploy: &DeployConfig,
    flags: &[String],
) -> Result<(), DeployError> {
    let args = deploy_args(deploy, flags);
    tracing::info!(program = %deploy.program, ?args, "deploying");

    executor
        .exec_streaming(&deploy.program, &args, deploy.timeout())
        .await
        .map_err(DeployError::from)
}

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("deploy command could not be started")]
    Spawn { source: ExecError },

    #[error("deploy command exited unsuccessfully ({})", describe_exit(*code))]
    Failed { code: Option<i32> },

    #[error("deploy command did not complete")]
    Aborted { source: ExecError },
}

impl DeployError {
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Failed { code } => *code,
            _ => None,
        }
    }
}

impl From<ExecError> for DeployError {
    fn from(e: ExecError) -> Self {
        match e {
            ExecError::NotFound { .. } => Self::Spawn { source: e },
            ExecError::CommandFailed { code, .. } => Self::Failed { code },
            other => Self::Aborted { source: other },
        }
    }
}
