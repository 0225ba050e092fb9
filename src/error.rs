use thiserror::Error;

/// Exit codes for the intrig CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const NOT_FOUND: i32 = 3;
    pub const UNAVAILABLE: i32 = 5;
    pub const INTERNAL: i32 = 1;
}

#[derive(Error, Debug)]
pub enum IntrigError {
    #[error(
        "Project not found: {0}. Start its daemon once (it registers itself), or pass the project root explicitly."
    )]
    ProjectNotFound(String),

    #[error(
        "Failed to start daemon for {project}: {reason}. Run the daemon manually from the project root to inspect its output."
    )]
    DaemonStartFailed { project: String, reason: String },

    #[error(
        "Daemon is not reachable: {0}. Rerun this command to auto-start it, or start the daemon manually."
    )]
    DaemonUnavailable(String),

    #[error("Registry error: {0}. Check permissions on the registry directory in your temp dir.")]
    Registry(String),

    #[error("Request timed out after {0}: retry, or check the daemon log for a stuck generation.")]
    RequestTimeout(String),

    #[error(
        "Invalid response from daemon: {0}. Upgrade the daemon and the CLI to matching versions."
    )]
    InvalidResponse(String),

    #[error("Daemon has no such resource: {0}. Regenerate with 'intrig sync --force'.")]
    ResourceNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IntrigError {
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors (bad arguments, invalid input)
            IntrigError::InvalidArgument(_) => exit_codes::USER_ERROR,

            // Not found errors
            IntrigError::ProjectNotFound(_) | IntrigError::ResourceNotFound(_) => {
                exit_codes::NOT_FOUND
            }

            // Daemon reachability errors
            IntrigError::DaemonStartFailed { .. }
            | IntrigError::DaemonUnavailable(_)
            | IntrigError::RequestTimeout(_) => exit_codes::UNAVAILABLE,

            // Internal errors
            IntrigError::Registry(_)
            | IntrigError::InvalidResponse(_)
            | IntrigError::Config(_)
            | IntrigError::Io(_)
            | IntrigError::Json(_) => exit_codes::INTERNAL,
        }
    }
}

pub type Result<T> = std::result::Result<T, IntrigError>;
