//! Error types for the archivist.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the archivist.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    ConfigValidation(Violations),

    #[error("Invalid Windows path: {0} (expected <letter>:\\<path>)")]
    InvalidPath(String),

    #[error("Events file not found: {0}")]
    EventsFileNotFound(String),

    #[error("Invalid events file: {0}")]
    InvalidEventsFile(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // File system errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    // Device script errors
    #[error("Device script failed: {0}")]
    ExternalCommand(String),

    #[error(
        "No video found for the given parameters (Day: {day}, Start: {start}, Stop: {stop}, Timezone: {timezone})"
    )]
    NoVideosFound {
        day: String,
        start: String,
        stop: String,
        timezone: String,
    },

    // Copy verification and rename errors
    #[error("{}", MissingFile::describe_all(.0))]
    MissingFiles(Vec<MissingFile>),

    #[error("{0}")]
    Rename(RenameFailures),

    // Dispatch errors
    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("Notification failed: {0}")]
    Notification(#[from] NotificationError),

    // Run errors
    #[error("Another archive run holds the lock: {0}")]
    LockHeld(PathBuf),

    #[error("Aborted: {0}")]
    UserAborted(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}

/// Every rule an object broke during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violations {
    /// What was being validated (e.g. `event 'football'`).
    pub subject: String,
    /// One message per broken rule, in check order.
    pub messages: Vec<String>,
}

impl Violations {
    pub fn new<S: Into<String>>(subject: S) -> Self {
        Self {
            subject: subject.into(),
            messages: Vec::new(),
        }
    }

    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.messages.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Turn collected violations into an error, or `Ok` if there are none.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigValidation(self))
        }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.messages.join("; "))
    }
}

/// A file the copy step should have produced but did not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFile {
    pub original_name: String,
    pub expected_path: PathBuf,
}

impl MissingFile {
    fn describe_all(files: &[MissingFile]) -> String {
        let listed: Vec<String> = files
            .iter()
            .map(|f| format!("{} (expected at {})", f.original_name, f.expected_path.display()))
            .collect();
        format!(
            "{} file(s) have not been correctly copied: {}",
            files.len(),
            listed.join(", ")
        )
    }
}

/// Why a rename is likely to have failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameHint {
    /// The new name holds characters the host filesystem may reject.
    ForbiddenCharacters,
    /// Source and target live on different devices.
    CrossDevice,
    /// The target already exists and was not overwritten.
    TargetExists,
}

impl fmt::Display for RenameHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenameHint::ForbiddenCharacters => write!(
                f,
                "the title probably contains characters forbidden in Windows file names"
            ),
            RenameHint::CrossDevice => {
                write!(f, "source and target are on different filesystems")
            }
            RenameHint::TargetExists => write!(f, "a file with the new name already exists"),
        }
    }
}

/// A single failed rename.
#[derive(Debug)]
pub struct RenameFailure {
    pub from: PathBuf,
    pub to: PathBuf,
    pub source: std::io::Error,
    pub hint: Option<RenameHint>,
}

impl fmt::Display for RenameFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to rename {} to {}: {}",
            self.from.display(),
            self.to.display(),
            self.source
        )?;
        if let Some(hint) = self.hint {
            write!(f, " ({})", hint)?;
        }
        Ok(())
    }
}

/// All renames that failed in one run, in attempt order.
#[derive(Debug)]
pub struct RenameFailures(pub Vec<RenameFailure>);

impl fmt::Display for RenameFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rename(s) failed", self.0.len())?;
        for failure in &self.0 {
            write!(f, "\n  - {}", failure)?;
        }
        Ok(())
    }
}

/// Object storage and file-sync upload failures.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("local file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("S3 credentials not available")]
    MissingCredentials,

    #[error("endpoint unreachable: {0}")]
    EndpointUnreachable(String),

    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    #[error("unknown S3 storage class: {0}")]
    InvalidStorageClass(String),

    #[error("unexpected status {status} for {url}: {body}")]
    UnexpectedStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("share creation failed for {path}: {status} ({statuscode}) {message}")]
    ShareFailed {
        path: String,
        status: String,
        statuscode: u16,
        message: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Chat notification failures.
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("the bot token provided is invalid")]
    InvalidToken,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("the chat ID is incorrect or does not exist")]
    ChatNotFound,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unexpected status {status}: {description}")]
    Unexpected { status: u16, description: String },

    #[error("transport failure: {0}")]
    Transport(String),
}
