use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("`{program}` could not be started; is it installed and on PATH?")]
    NotFound {
        program: String,
        source: std::io::Error,
    },

    #[error("`{program}` failed ({}): {args:?}\n{stderr}", describe_exit(*code))]
    CommandFailed {
        program: String,
        args: Vec<String>,
        code: Option<i32>,
        stderr: String,
    },

    #[error("`{program}` did not finish within {}s", timeout.as_secs())]
    TimedOut {
        program: String,
        timeout: Duration,
        source: tokio::time::error::Elapsed,
    },

    #[error("I/O error while running `{program}`")]
    Io {
        program: String,
        source: std::io::Error,
    },

    #[error("`{program}` output was not valid UTF-8")]
    InvalidUtf8 {
        program: String,
        source: std::string::FromUtf8Error,
    },
}

impl ExecError {
    /// Exit code of a command that ran to completion unsuccessfully.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::CommandFailed { code, .. } => *code,
            _ => None,
        }
    }
}

pub(crate) fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_owned(),
    }
}
