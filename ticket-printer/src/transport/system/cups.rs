//! CUPS print queues
//!
//! Uses the `lpstat` and `lp` command-line tools, which every CUPS
//! installation ships.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{PrintError, PrintResult};

pub const MANUFACTURER: &str = "CUPS Printer";

/// List queue names (`lpstat -e`)
pub async fn list_queues() -> PrintResult<Vec<String>> {
    let output = Command::new("lpstat")
        .arg("-e")
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| PrintError::System(format!("Failed to run 'lpstat -e': {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        // No queues configured is not an error
        if stderr.contains("No destinations added") {
            return Ok(Vec::new());
        }
        return Err(PrintError::System(format!(
            "lpstat -e failed: {}",
            stderr.trim()
        )));
    }

    Ok(parse_queue_list(&String::from_utf8_lossy(&output.stdout)))
}

/// Check that a queue exists and accepts jobs (`lpstat -p <queue>`)
pub async fn is_online(queue: &str) -> PrintResult<bool> {
    let output = Command::new("lpstat")
        .arg("-p")
        .arg(queue)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| PrintError::System(format!("Failed to run 'lpstat -p': {}", e)))?;

    if !output.status.success() {
        debug!(
            queue,
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "lpstat reports unknown queue"
        );
        return Ok(false);
    }

    Ok(parse_printer_status(&String::from_utf8_lossy(&output.stdout)))
}

/// Submit a RAW job (`lp -d <queue> -o raw`) and wait for the request id
pub async fn submit_raw(queue: &str, data: &[u8]) -> PrintResult<()> {
    let mut child = Command::new("lp")
        .arg("-d")
        .arg(queue)
        .arg("-o")
        .arg("raw")
        .kill_on_drop(true)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| PrintError::System(format!("Failed to run 'lp': {}", e)))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(data).await?;
        stdin.shutdown().await?;
    }

    let output = child.wait_with_output().await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PrintError::System(format!(
            "lp -d {} failed: {}",
            queue,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    info!(queue, request = %stdout.trim(), "Print job accepted");
    Ok(())
}

fn parse_queue_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_printer_status(stdout: &str) -> bool {
    let lower = stdout.to_lowercase();
    lower.starts_with("printer") && !lower.contains("disabled")
}
