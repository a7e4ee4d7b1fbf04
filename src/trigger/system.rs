//! Shell helpers for running the trigger command.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::info;

use crate::types::DashboardError;

/// Run `command` through `sh -c`, feeding `payload` on stdin.
/// Stdout and stderr are inherited from the dashboard process. The child is
/// killed if the returned future is dropped before it exits.
pub async fn invoke_pipe(command: &str, payload: &[u8]) -> Result<(), DashboardError> {
    info!(command = %command, "Invoking trigger command");
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::piped())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        // A command that ignores its input may exit before reading it.
        if let Err(err) = stdin.write_all(payload).await {
            if err.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(err.into());
            }
        }
    }

    let status = child.wait().await?;
    if status.success() {
        return Ok(());
    }

    Err(DashboardError::Trigger(format!(
        "Command `{}` failed with status {}",
        command, status
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn payload_reaches_command_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("payload.json");
        let command = format!("cat > '{}'", out.display());

        invoke_pipe(&command, br#"{"node":"db1"}"#).await.unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written, r#"{"node":"db1"}"#);
    }

    #[tokio::test]
    async fn dropping_the_call_kills_the_command() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("finished");
        let command = format!("sleep 1 && touch '{}'", marker.display());

        let result =
            tokio::time::timeout(Duration::from_millis(100), invoke_pipe(&command, b"")).await;
        assert!(result.is_err());

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_error() {
        let err = invoke_pipe("exit 3", b"{}").await.unwrap_err();
        assert!(matches!(err, DashboardError::Trigger(_)));
    }
}
