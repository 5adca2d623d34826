//! Console Status Reporting
//!
//! Renders generation progress events as styled status lines on stderr,
//! keeping stdout clean for exported trees.

use console::style;

use crate::ai::{ProgressEvent, ProgressSink};

/// Progress sink that prints one status line per event.
pub struct ConsoleStatus;

impl ProgressSink for ConsoleStatus {
    fn notify(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Attempting {
                model,
                attempt,
                max_attempts,
            } => {
                eprintln!(
                    "{}",
                    style(format!(
                        "Processing with {} (attempt {}/{})...",
                        model, attempt, max_attempts
                    ))
                    .dim()
                );
            }
            ProgressEvent::Backoff { wait, .. } => {
                eprintln!(
                    "{}",
                    style(format!(
                        "Rate limited. Retrying in {} seconds...",
                        wait.as_secs()
                    ))
                    .yellow()
                );
            }
            ProgressEvent::Completed => {
                eprintln!(
                    "{}",
                    style("Knowledge tree generated successfully!").green()
                );
            }
            ProgressEvent::Failed { message } => {
                eprintln!("{}", style(format!("Error: {}", message)).red());
            }
        }
    }
}
