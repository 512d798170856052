// SPDX-License-Identifier: Apache-2.0

//! Container engine abstraction.
//!
//! The orchestrator depends on exactly two engine operations: build a
//! directory into an image, and run an image to completion. Both are
//! bounded by a deadline; an expired deadline kills the child process.
//! The trait is the seam tests use to substitute a scripted engine.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{BuildError, RunError};
use crate::types::ImageId;

/// Captured result of one engine invocation.
#[derive(Debug, Clone)]
pub struct EngineOutput {
    /// Process exit code, if the process exited normally.
    pub code: Option<i32>,
    /// Whether the invocation exited successfully.
    pub success: bool,
    /// Combined standard output and error streams.
    pub combined: Vec<u8>,
}

impl EngineOutput {
    /// Combined output as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.combined).into_owned()
    }
}

/// The two container-engine operations the orchestrator consumes.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Build the contents of `context_dir` into an image tagged `tag`.
    async fn build(
        &self,
        context_dir: &Path,
        tag: &str,
        deadline: Duration,
    ) -> Result<EngineOutput, BuildError>;

    /// Run `image` in an ephemeral container and wait for completion.
    async fn run(&self, image: &ImageId, deadline: Duration) -> Result<EngineOutput, RunError>;
}

/// Container engine backed by the `docker` command-line interface.
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: PathBuf,
}

impl DockerCli {
    /// Engine using `docker` from the search path.
    pub fn new() -> Self {
        Self::with_binary("docker")
    }

    /// Engine using an explicit binary. Used by tests to substitute a
    /// scripted executable for the real engine.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn invoke(&self, args: &[&str], deadline: Duration) -> Result<EngineOutput, InvokeError> {
        let child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(InvokeError::Spawn)?;

        // Dropping the wait future on timeout kills the child via
        // kill_on_drop, which is the forced termination on expiry.
        let output = match tokio::time::timeout(deadline, child.wait_with_output()).await {
            Ok(result) => result.map_err(InvokeError::Spawn)?,
            Err(_) => return Err(InvokeError::Deadline(deadline)),
        };

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);

        Ok(EngineOutput {
            code: output.status.code(),
            success: output.status.success(),
            combined,
        })
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

enum InvokeError {
    Spawn(std::io::Error),
    Deadline(Duration),
}

#[async_trait]
impl ContainerEngine for DockerCli {
    async fn build(
        &self,
        context_dir: &Path,
        tag: &str,
        deadline: Duration,
    ) -> Result<EngineOutput, BuildError> {
        let context = context_dir.to_string_lossy();
        self.invoke(&["build", "-t", tag, context.as_ref()], deadline)
            .await
            .map_err(|e| match e {
                InvokeError::Spawn(source) => BuildError::Invocation {
                    reason: source.to_string(),
                },
                InvokeError::Deadline(d) => BuildError::DeadlineExceeded { secs: d.as_secs() },
            })
    }

    async fn run(&self, image: &ImageId, deadline: Duration) -> Result<EngineOutput, RunError> {
        self.invoke(&["run", "--rm", image.as_str()], deadline)
            .await
            .map_err(|e| match e {
                InvokeError::Spawn(source) => RunError::Invocation {
                    reason: source.to_string(),
                },
                InvokeError::Deadline(d) => RunError::DeadlineExceeded { secs: d.as_secs() },
            })
    }
}
