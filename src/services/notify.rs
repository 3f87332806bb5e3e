//! Session-complete notification hook

use tokio::process::Command;
use tracing::{debug, info};

/// Run the configured notification command through `sh -c`.
///
/// The session count is passed in `POMOTRACK_COMPLETED_SESSIONS`.
pub async fn run_notify_command(command: &str, completed_sessions: u64) -> Result<(), String> {
    debug!("Running notify command: {}", command);

    let output = Command::new("sh")
        .args(["-c", command])
        .env("POMOTRACK_COMPLETED_SESSIONS", completed_sessions.to_string())
        .output()
        .await
        .map_err(|e| format!("Failed to execute notify command: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("Notify command failed ({}): {}", output.status, stderr.trim()));
    }

    info!("Notify command finished for session {}", completed_sessions);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_session_count_to_command() {
        let result = run_notify_command("test \"$POMOTRACK_COMPLETED_SESSIONS\" = 3", 3).await;
        assert_eq!(result, Ok(()));
    }

    #[tokio::test]
    async fn failing_command_is_reported() {
        let err = run_notify_command("echo broken >&2; exit 4", 1)
            .await
            .expect_err("command fails");
        assert!(err.contains("broken"), "unexpected error: {err}");
    }
}
