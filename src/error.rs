#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, timeout, DNS).
    #[error("network error: {0}")]
    Network(String),

    #[error("http {status}: {body}")]
    Http { status: u16, body: String },

    /// Missing selection, empty result set and similar user-facing rejections.
    #[error("{0}")]
    Validation(String),

    #[error("config error: {0}")]
    Config(String),

    /// The backend answered 2xx with a body we cannot use.
    #[error("invalid response: {0}")]
    Decode(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
