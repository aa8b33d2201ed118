use intake_common::error::CommonError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("config error: {0}")]
    Config(String),

    #[error("No input")]
    EmptyBody,

    #[error("Invalid JSON")]
    MalformedJson,

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("worker task failed: {0}")]
    Worker(String),
}

impl AppError {
    /// Errors caused by the request itself rather than by the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyBody | Self::MalformedJson | Self::MissingField(_)
        )
    }
}
