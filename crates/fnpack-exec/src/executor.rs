use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use crate::error::ExecError;

/// Abstraction over subprocess execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
/// A `timeout` of `None` waits for the child indefinitely.
#[allow(async_fn_in_trait)]
pub trait CommandExecutor: Send + Sync {
    /// Run a command to completion and capture its stdout.
    async fn exec(
        &self,
        program: &str,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<String, ExecError>;

    /// Run a command, forwarding its stdout and stderr lines to our stdout
    /// as they arrive.
    async fn exec_streaming(
        &self,
        program: &str,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<(), ExecError>;
}

/// Executor backed by real child processes.
pub struct RealExecutor;

impl CommandExecutor for RealExecutor {
    async fn exec(
        &self,
        program: &str,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<String, ExecError> {
        tracing::debug!(program, ?args, "exec");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecError::NotFound {
                program: program.to_owned(),
                source: e,
            })?;

        let output = with_timeout(program, timeout, child.wait_with_output()).await?;

        if output.status.success() {
            String::from_utf8(output.stdout).map_err(|e| ExecError::InvalidUtf8 {
                program: program.to_owned(),
                source: e,
            })
        } else {
            Err(ExecError::CommandFailed {
                program: program.to_owned(),
                args: args.to_vec(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            })
        }
    }

    async fn exec_streaming(
        &self,
        program: &str,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<(), ExecError> {
        tracing::debug!(program, ?args, "exec (streaming)");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecError::NotFound {
                program: program.to_owned(),
                source: e,
            })?;

        let forwarders = [
            child.stdout.take().map(|out| tokio::spawn(forward_lines(out))),
            child.stderr.take().map(|err| tokio::spawn(forward_lines(err))),
        ];

        let status = with_timeout(program, timeout, child.wait()).await?;

        for handle in forwarders.into_iter().flatten() {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!(program, error = %e, "output forwarding stopped"),
                Err(e) => tracing::warn!(program, error = %e, "output forwarding task failed"),
            }
        }

        if status.success() {
            Ok(())
        } else {
            Err(ExecError::CommandFailed {
                program: program.to_owned(),
                args: args.to_vec(),
                code: status.code(),
                stderr: String::new(),
            })
        }
    }
}

async fn with_timeout<T>(
    program: &str,
    timeout: Option<Duration>,
    fut: impl Future<Output = std::io::Result<T>>,
) -> Result<T, ExecError> {
    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|e| ExecError::TimedOut {
                program: program.to_owned(),
                timeout: limit,
                source: e,
            })?,
        None => fut.await,
    };

    result.map_err(|e| ExecError::Io {
        program: program.to_owned(),
        source: e,
    })
}

/// Forwards raw lines, decoding lossily so the pipe is drained to EOF even
/// when the child writes bytes that are not UTF-8.
async fn forward_lines<R>(reader: R) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        println!("{}", line.trim_end_matches(['\n', '\r']));
    }
}
