//! SyncError: everything that can go wrong during a sync run.

/// Errors raised by the sync pipeline.
///
/// Only a few of these abort a whole run (config, snapshot read, no usable
/// data); the rest are caught per division or per record and counted.
#[derive(Clone, Debug, PartialEq)]
pub enum SyncError {
    /// A configuration value is missing or unparseable.
    Config(String),
    /// Network error or non-success status fetching a source.
    Fetch {
        url: String,
        status: Option<u16>,
        message: String,
    },
    /// The `newt=` assignment is absent from the script.
    MarkerNotFound,
    /// The embedded document does not parse even after repair.
    MalformedDocument { message: String, context: String },
    /// The tournament document has no division to compute.
    MissingDivision,
    /// The player store rejected a read or write.
    Store(String),
    /// Nothing usable came back from any source.
    NoUsableData(String),
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
            SyncError::Fetch { url, status: Some(status), .. } => {
                write!(f, "Fetching {} returned status {}", url, status)
            }
            SyncError::Fetch { url, status: None, message } => {
                write!(f, "Fetching {} failed: {}", url, message)
            }
            SyncError::MarkerNotFound => write!(f, "Could not find newt variable in JavaScript file"),
            SyncError::MalformedDocument { message, context } => {
                write!(f, "Failed to parse tournament data: {} (near `{}`)", message, context)
            }
            SyncError::MissingDivision => write!(f, "Tournament data has no divisions"),
            SyncError::Store(msg) => write!(f, "Player store error: {}", msg),
            SyncError::NoUsableData(msg) => write!(f, "No usable data: {}", msg),
        }
    }
}

impl std::error::Error for SyncError {}
