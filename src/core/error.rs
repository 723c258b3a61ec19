use thiserror::Error;

/// Failure of a single backend RPC call.
///
/// This is the only error kind a coordinator surfaces through
/// `QueryState::Failed`; it never stops the polling loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Server error ({code}): {message}")]
    Server { code: String, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn server(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Server {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Coordinator '{0}' is already running")]
    AlreadyRunning(&'static str),

    #[error("Worker error: {0}")]
    Worker(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

pub type Result<T> = std::result::Result<T, MonitorError>;

impl From<serde_json::Error> for MonitorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
