use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use duty_api::Route;
use error_stack::{report, Result, ResultExt};
use mockall::automock;
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to spawn the relay executable")]
    Spawn,
    #[error("relay did not finish within {0:?}")]
    Timeout(Duration),
    #[error("relay exited with {status}")]
    Failed { status: ExitStatus, output: String },
}

/// Combined standard output and error of a relay invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutput(pub String);

#[automock]
#[async_trait]
pub trait RelayExecutor: Send + Sync {
    async fn relay(&self, route: &Route, message_id: u64) -> Result<RelayOutput, Error>;
}

/// Runs the external relay executable as `<bin> --route <origin>:<destination> --msg-id <id>`.
pub struct Process {
    program: PathBuf,
    args: Vec<OsString>,
    timeout: Duration,
}

impl Process {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: vec![],
            timeout,
        }
    }

    /// Arguments passed ahead of the route and message id.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    fn command(&self, route: &Route, message_id: u64) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--route")
            .arg(route.to_string())
            .arg("--msg-id")
            .arg(message_id.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl RelayExecutor for Process {
    async fn relay(&self, route: &Route, message_id: u64) -> Result<RelayOutput, Error> {
        let child = self
            .command(route, message_id)
            .spawn()
            .change_context(Error::Spawn)
            .attach_printable_lazy(|| self.program.display().to_string())?;

        // dropping the future on timeout kills the child
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| report!(Error::Timeout(self.timeout)))?
            .change_context(Error::Spawn)?;

        let text = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
        .trim()
        .to_string();

        if !output.status.success() {
            return Err(report!(Error::Failed {
                status: output.status,
                output: text,
            }));
        }

        Ok(RelayOutput(text))
    }
}
