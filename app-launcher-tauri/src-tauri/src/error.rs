use thiserror::Error;

/// Failures talking to the control server.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClientError {
    /// Read request failed at the transport level or returned a non-success status.
    #[error("network error: {0}")]
    Network(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("failed to launch application: {0}")]
    LaunchFailed(String),
    #[error("failed to quit application: {0}")]
    QuitFailed(String),
    #[error("invalid response body: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum LauncherError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("busy: {0}")]
    Busy(&'static str),
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T, E = LauncherError> = std::result::Result<T, E>;
