use std::fmt;

/// Errors raised by the queue discovery and import pipeline
#[derive(Debug)]
pub enum SyncError {
    /// The list operation returned no usable queue URLs
    NoQueuesFound { region: String },

    /// An external command exited unsuccessfully
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// A listed queue URL could not be turned into a queue descriptor
    InvalidQueueUrl(String),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::NoQueuesFound { region } => {
                write!(f, "No SQS queues found in region {}", region)
            }
            SyncError::CommandFailed {
                command,
                exit_code,
                stderr,
            } => {
                write!(f, "Command '{}' failed", command)?;

                if let Some(code) = exit_code {
                    write!(f, " (exit code {})", code)?;
                }

                let stderr = stderr.trim();
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr)?;
                }

                Ok(())
            }
            SyncError::InvalidQueueUrl(url) => {
                write!(f, "Invalid queue URL: {}", url)
            }
        }
    }
}

impl std::error::Error for SyncError {}

impl SyncError {
    /// Build a CommandFailed error from a finished process
    pub fn command_failed(command: impl Into<String>, output: &std::process::Output) -> Self {
        SyncError::CommandFailed {
            command: command.into(),
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}
