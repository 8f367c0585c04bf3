//! One-time snapshot of the process environment.
//!
//! Providers never read environment variables themselves; they receive the
//! values captured here when the credential is built.

use std::env;

use crate::sources::aws::signer::AwsSecurityCredentials;
use crate::utils::constants::*;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub github_actions: bool,
    pub id_token_request_url: Option<String>,
    pub id_token_request_token: Option<String>,
    pub aws_region: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub aws_session_token: Option<String>,
}

impl Environment {
    pub fn from_process() -> Self {
        Self {
            github_actions: non_empty(ENV_GITHUB_ACTIONS)
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            id_token_request_url: non_empty(ENV_ID_TOKEN_REQUEST_URL),
            id_token_request_token: non_empty(ENV_ID_TOKEN_REQUEST_TOKEN),
            aws_region: non_empty(ENV_AWS_REGION).or_else(|| non_empty(ENV_AWS_DEFAULT_REGION)),
            aws_access_key_id: non_empty(ENV_AWS_ACCESS_KEY_ID),
            aws_secret_access_key: non_empty(ENV_AWS_SECRET_ACCESS_KEY),
            aws_session_token: non_empty(ENV_AWS_SESSION_TOKEN),
        }
    }

    /// Static AWS keys, if both halves are present.
    pub fn aws_credentials(&self) -> Option<AwsSecurityCredentials> {
        match (&self.aws_access_key_id, &self.aws_secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => Some(AwsSecurityCredentials {
                access_key_id: access_key_id.to_owned(),
                secret_access_key: secret_access_key.to_owned(),
                session_token: self.aws_session_token.to_owned(),
            }),
            _ => None,
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
