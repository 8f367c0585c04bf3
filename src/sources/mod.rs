//! Subject token providers
//!
//! One provider per supported identity environment, chosen from the
//! resolved `CredentialSource`.

use reqwest::Client;

use crate::config::environment::Environment;
use crate::config::types::{CredentialSource, ResolvedConfig};
use crate::error::WifError;

pub mod aws;
pub mod github_actions;

use aws::signer::VirtualRequest;
use aws::AwsProvider;
use github_actions::GithubActionsProvider;

/// Proof of external identity, in the form sent as `subjectToken`.
#[derive(Debug, Clone)]
pub enum SubjectTokenMaterial {
    /// Signed GetCallerIdentity request; `serialized` is the request as
    /// JSON, percent-encoded.
    SignedRequest {
        request: VirtualRequest,
        serialized: String,
    },
    /// OIDC JWT issued by the CI platform, used verbatim.
    OidcToken(String),
}

impl SubjectTokenMaterial {
    pub fn signed_request(request: VirtualRequest) -> Result<Self, WifError> {
        let json = serde_json::to_string(&request)?;
        Ok(SubjectTokenMaterial::SignedRequest {
            serialized: urlencoding::encode(&json).into_owned(),
            request,
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            SubjectTokenMaterial::SignedRequest { serialized, .. } => serialized,
            SubjectTokenMaterial::OidcToken(token) => token,
        }
    }
}

#[derive(Debug, Clone)]
pub enum SubjectTokenProvider {
    Aws(AwsProvider),
    GithubActions(GithubActionsProvider),
}

impl SubjectTokenProvider {
    pub fn build(config: &ResolvedConfig, env: &Environment) -> Self {
        match &config.credential_source {
            CredentialSource::Aws(source) => SubjectTokenProvider::Aws(AwsProvider::new(
                source.to_owned(),
                config.audience.to_owned(),
                env,
            )),
            CredentialSource::GithubActions(source) => {
                SubjectTokenProvider::GithubActions(GithubActionsProvider::new(source.to_owned()))
            }
        }
    }

    pub async fn subject_token(&self, client: &Client) -> Result<SubjectTokenMaterial, WifError> {
        match self {
            SubjectTokenProvider::Aws(p) => p.subject_token(client).await,
            SubjectTokenProvider::GithubActions(p) => p.subject_token(client).await,
        }
    }
}
