use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("LISTENER_FAILED: Native accessibility listener failed to start: {0}")]
    ListenerFailed(String),

    #[error("UNKNOWN_ACTION: No accessibility action named '{0}'.")]
    UnknownAction(String),

    #[error("INVALID_ARGUMENT: Bad argument for '{action}': {reason}")]
    InvalidArgument { action: String, reason: String },

    #[error("PROVIDER_FAILED: Native accessibility request failed: {0}")]
    Provider(String),

    #[error("ZOOM_OUT_OF_RANGE: Text zoom must be a positive percentage, got {0}.")]
    ZoomOutOfRange(i64),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
