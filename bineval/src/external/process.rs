//! Single-shot execution of an external tool with a bounded wait.
//!
//! The wait runs on a current-thread tokio runtime so that the limit covers
//! both the exit of the process and the draining of its output pipes.

use std::{
    path::Path,
    process::{Command, ExitStatus, Stdio},
    time::Duration,
};

use crate::error::{BinEvalError, BinEvalResult};

/// Captured output of a finished tool run.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Runs `command` to completion, killing it once `timeout` has elapsed.
///
/// `subject` is the file the tool works on; it is reported in errors.
///
/// # Errors
///
/// - [`BinEvalError::ExternalTool`] if the process cannot be started or its
///   output cannot be read.
/// - [`BinEvalError::Timeout`] if the process, or anything still holding its
///   output pipes, outlives `timeout`.
pub fn run_with_timeout(
    command: Command,
    timeout: Duration,
    subject: &Path,
) -> BinEvalResult<ProcessOutput> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| BinEvalError::ExternalTool {
            path: subject.to_path_buf(),
            reason: format!("failed to start the process runtime: {e}"),
        })?;

    runtime.block_on(run(command.into(), timeout, subject))
}

async fn run(
    mut command: tokio::process::Command,
    timeout: Duration,
    subject: &Path,
) -> BinEvalResult<ProcessOutput> {
    let tool_error = |reason: String| BinEvalError::ExternalTool {
        path: subject.to_path_buf(),
        reason,
    };

    // The child is killed whenever it is dropped before being reaped.
    let child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            tool_error(format!(
                "failed to start {:?}: {e}",
                command.as_std().get_program()
            ))
        })?;

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| BinEvalError::Timeout {
            path: subject.to_path_buf(),
            seconds: timeout.as_secs(),
        })?
        .map_err(|e| tool_error(format!("failed to wait for the tool: {e}")))?;

    Ok(ProcessOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::Instant;

    use super::*;

    fn shell(script: &str) -> Command {
        let mut command = Command::new("sh");
        command.arg("-c").arg(script);
        command
    }

    #[test]
    fn captures_both_streams() {
        let output = run_with_timeout(
            shell("echo out; echo err >&2"),
            Duration::from_secs(10),
            Path::new("a.png"),
        )
        .unwrap();

        assert!(output.status.success());
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
    }

    #[test]
    fn slow_tool_is_killed() {
        let result = run_with_timeout(shell("sleep 5"), Duration::from_millis(100), Path::new("a.png"));

        assert!(matches!(result, Err(BinEvalError::Timeout { .. })));
    }

    #[test]
    fn background_process_holding_the_pipes_cannot_extend_the_wait() {
        let start = Instant::now();

        let result = run_with_timeout(
            shell("sleep 6 & echo hi"),
            Duration::from_secs(1),
            Path::new("a.png"),
        );

        assert!(matches!(result, Err(BinEvalError::Timeout { seconds: 1, .. })));
        assert!(start.elapsed() < Duration::from_secs(4), "{:?}", start.elapsed());
    }

    #[test]
    fn missing_program_is_a_tool_error() {
        let result = run_with_timeout(
            Command::new("/nonexistent/bineval-tool"),
            Duration::from_secs(1),
            Path::new("a.png"),
        );

        assert!(matches!(result, Err(BinEvalError::ExternalTool { .. })));
    }
}
