use thiserror::Error;

/// Failure of a single backend call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("request to {path} failed: {message}")]
    Transport { path: String, message: String },

    #[error("{path} returned HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("{path} not found")]
    NotFound { path: String },

    #[error("unexpected response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("http client setup failed: {0}")]
    ClientSetup(String),
}

impl ApiError {
    pub fn decode(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not a valid base url: {value}")]
    BaseUrl { name: &'static str, value: String },

    #[error("{name} must be a number, got {value}")]
    Number { name: &'static str, value: String },
}

/// Rejected view transition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("tab {tab} is not available for {role} profiles")]
    TabUnavailable { tab: String, role: String },

    #[error("nothing loaded to edit")]
    NothingLoaded,

    #[error("{0}")]
    UsernameRejected(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}
