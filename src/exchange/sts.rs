//! Subject token -> federated access token (RFC 8693 token exchange).

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::types::ResolvedConfig;
use crate::error::WifError;
use crate::utils::constants::{ACCESS_TOKEN_TYPE, FEDERATED_TOKEN_SCOPE, TOKEN_EXCHANGE_GRANT_TYPE};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenExchangeRequest<'a> {
    audience: &'a str,
    grant_type: &'a str,
    requested_token_type: &'a str,
    scope: &'a str,
    subject_token_type: &'a str,
    subject_token: &'a str,
}

/// Short-lived token that is only good for calling the impersonation
/// endpoint. Never handed to callers.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FederatedAccessToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
}

/// POST the form-encoded exchange request. Non-2xx responses come back as
/// `WifError::Status` with the body untouched; nothing is retried.
pub(crate) async fn exchange_subject_token(
    client: &Client,
    config: &ResolvedConfig,
    subject_token: &str,
) -> Result<FederatedAccessToken, WifError> {
    let form = TokenExchangeRequest {
        audience: &config.audience,
        grant_type: TOKEN_EXCHANGE_GRANT_TYPE,
        requested_token_type: ACCESS_TOKEN_TYPE,
        // never the caller's scopes
        scope: FEDERATED_TOKEN_SCOPE,
        subject_token_type: &config.subject_token_type,
        subject_token,
    };

    debug!(token_url = %config.token_url, "exchanging subject token");
    let response = client.post(&config.token_url).form(&form).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(WifError::Status {
            endpoint: "token exchange",
            status,
            body,
        });
    }

    let token: FederatedAccessToken = response.json().await?;
    info!(expires_in = token.expires_in, "federated access token issued");
    Ok(token)
}
