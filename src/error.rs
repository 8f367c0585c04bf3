use reqwest::StatusCode;
use thiserror::Error;

/// Coarse classification of a [`WifError`], used by callers that only need
/// to know which stage of the chain gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Environment,
    Transport,
    EmptyToken,
}

#[derive(Debug, Error)]
pub enum WifError {
    #[error("credential document type '{0}' is not 'external_account'")]
    NotExternalAccount(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("unsupported credential source: {0}")]
    UnsupportedProvider(String),
    #[error("environment error: {0}")]
    Environment(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{endpoint} responded with {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read credential document: {0}")]
    Io(#[from] std::io::Error),
    #[error("request signing failed: {0}")]
    Signing(String),
    #[error("token exchange produced an empty access token")]
    EmptyToken,
}

impl WifError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WifError::NotExternalAccount(_)
            | WifError::Config(_)
            | WifError::UnsupportedProvider(_)
            | WifError::Io(_)
            | WifError::Signing(_) => ErrorKind::Config,
            WifError::Environment(_) => ErrorKind::Environment,
            WifError::Http(_) | WifError::Status { .. } | WifError::Json(_) => ErrorKind::Transport,
            WifError::EmptyToken => ErrorKind::EmptyToken,
        }
    }

    /// True when this source simply does not apply here and a credential
    /// chain should move on to its next candidate.
    pub fn is_inapplicable(&self) -> bool {
        matches!(
            self,
            WifError::NotExternalAccount(_) | WifError::Environment(_) | WifError::EmptyToken
        )
    }
}
