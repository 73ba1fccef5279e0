use crate::error::VoiceError;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Runs an external tool to completion and returns its output.
///
/// `input` is written to the child's stdin when given; otherwise stdin is
/// closed. A non-zero exit status is reported with the tool's stderr. Errors
/// are wrapped with `wrap` so each adapter reports its own error kind.
pub(crate) async fn run_tool(
    mut command: Command,
    tool: &str,
    input: Option<&[u8]>,
    timeout: Duration,
    wrap: fn(String) -> VoiceError,
) -> Result<Output, VoiceError> {
    command
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .map_err(|e| wrap(format!("Failed to spawn {}: {}", tool, e)))?;

    // Write from a separate task so a full stdout pipe cannot deadlock us.
    let write_task = match input {
        Some(bytes) => {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| wrap(format!("Failed to open {} stdin", tool)))?;
            let owned = bytes.to_vec();
            Some(tokio::spawn(async move {
                stdin.write_all(&owned).await?;
                stdin.shutdown().await
            }))
        }
        None => None,
    };

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| {
            wrap(format!(
                "{} timed out after {} seconds",
                tool,
                timeout.as_secs()
            ))
        })?
        .map_err(|e| wrap(format!("Failed to wait for {}: {}", tool, e)))?;

    if let Some(task) = write_task {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(wrap(format!("Failed to write to {} stdin: {}", tool, e)));
            }
            Err(e) => return Err(wrap(format!("{} stdin task failed: {}", tool, e))),
        }
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(wrap(format!(
            "{} failed ({}): {}",
            tool,
            output.status,
            stderr.trim()
        )));
    }

    Ok(output)
}
