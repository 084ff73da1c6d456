//! Bounded execution of external OCR tooling.

use crate::error::{Result, SeidocError};
use crate::ocr::error::OcrError;
use std::process::{Output, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::{Duration, timeout};

/// Run `command` to completion within `timeout_secs`.
///
/// The child is killed if the deadline passes or the future is dropped.
/// A non-zero exit becomes `OcrError::ProcessingFailed` carrying stderr.
pub(crate) async fn run_bounded(command: Command, program: &str, timeout_secs: u64) -> Result<Output> {
    run(command, program, timeout_secs, None).await
}

/// [`run_bounded`], feeding `input` to the child's stdin.
pub(crate) async fn run_bounded_with_input(
    command: Command,
    program: &str,
    timeout_secs: u64,
    input: Vec<u8>,
) -> Result<Output> {
    run(command, program, timeout_secs, Some(input)).await
}

async fn run(mut command: Command, program: &str, timeout_secs: u64, input: Option<Vec<u8>>) -> Result<Output> {
    if input.is_some() {
        command.stdin(Stdio::piped());
    }
    let mut child = command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            // Failed to execute - command not found, permissions, etc.
            std::io::Error::other(format!("Failed to execute {}: {}", program, e))
        })?;

    // Written from its own task so a child that fills its stdout pipe
    // before draining stdin cannot deadlock us.
    let writer = match (input, child.stdin.take()) {
        (Some(bytes), Some(mut stdin)) => Some(tokio::spawn(async move {
            let written = stdin.write_all(&bytes).await;
            drop(stdin);
            written
        })),
        _ => None,
    };

    let output = match timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => return Err(std::io::Error::other(format!("Failed to wait for {}: {}", program, e)).into()),
        Err(_) => return Err(SeidocError::timeout(program, timeout_secs)),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(OcrError::ProcessingFailed(format!("{} exited with {}: {}", program, output.status, stderr.trim())).into());
    }

    if let Some(writer) = writer {
        match writer.await {
            Ok(Err(e)) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                return Err(std::io::Error::other(format!("Failed to write input to {}: {}", program, e)).into());
            }
            Err(e) => return Err(SeidocError::Other(format!("{} input task failed: {}", program, e))),
            _ => {}
        }
    }

    Ok(output)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_io_error() {
        let command = Command::new("seidoc-definitely-missing-binary");
        let err = run_bounded(command, "missing", 5).await.unwrap_err();
        assert!(matches!(err, SeidocError::Io(_)));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_ocr_error() {
        let command = Command::new("false");
        let err = run_bounded(command, "false", 5).await.unwrap_err();
        assert!(matches!(err, SeidocError::Ocr { .. }));
    }

    #[tokio::test]
    async fn test_input_reaches_stdin() {
        let command = Command::new("cat");
        let output = run_bounded_with_input(command, "cat", 5, b"%PDF-1.5 bytes".to_vec())
            .await
            .unwrap();
        assert_eq!(output.stdout, b"%PDF-1.5 bytes");
    }

    #[tokio::test]
    async fn test_large_input_does_not_deadlock() {
        let input = vec![b'x'; 1 << 20];
        let output = run_bounded_with_input(Command::new("cat"), "cat", 10, input.clone())
            .await
            .unwrap();
        assert_eq!(output.stdout.len(), input.len());
    }

    #[tokio::test]
    async fn test_timeout_kills_child() {
        let mut command = Command::new("sleep");
        command.arg("5");
        let err = run_bounded(command, "sleep", 1).await.unwrap_err();
        assert!(matches!(err, SeidocError::Timeout { .. }));
    }
}
