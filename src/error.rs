use thiserror::Error;

/// Rejection raised by the upload source before a file enters the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Unsupported media type `{0}`: expected an image")]
    InvalidMediaType(String),
}

impl UploadError {
    /// Text shown to the user when a file is refused.
    pub fn user_message(&self) -> &'static str {
        match self {
            UploadError::InvalidMediaType(_) => "Please upload an image file (JPG, PNG).",
        }
    }
}

/// Why an analysis ended in the `Failed` state.
///
/// This is the only failure information the controller keeps; collaborator
/// detail strings are logged and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("network error")]
    NetworkError,
    #[error("collaborator error")]
    CollaboratorError,
    #[error("malformed response")]
    MalformedResponse,
}

/// Failure reported by an inference collaborator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("Transport error: {0}")]
    Network(String),

    #[error("Inference service reported: {0}")]
    Collaborator(String),

    #[error("Malformed inference response: {0}")]
    Malformed(String),
}

impl InferenceError {
    pub fn reason(&self) -> FailureReason {
        match self {
            InferenceError::Network(_) => FailureReason::NetworkError,
            InferenceError::Collaborator(_) => FailureReason::CollaboratorError,
            InferenceError::Malformed(_) => FailureReason::MalformedResponse,
        }
    }
}

impl From<serde_json::Error> for InferenceError {
    fn from(err: serde_json::Error) -> Self {
        InferenceError::Malformed(err.to_string())
    }
}

/// Errors from the auth service client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Connection error: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Rejected(String),
}

impl From<ApiError> for String {
    fn from(err: ApiError) -> Self {
        err.to_string()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Decode(String),
}
