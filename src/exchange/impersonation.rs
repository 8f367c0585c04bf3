//! Federated token -> service account access token (generateAccessToken).

use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::types::WifParams;
use crate::credential::token::ServiceAccountAccessToken;
use crate::error::WifError;
use crate::exchange::sts::FederatedAccessToken;

/// IAM credentials response field -> credential model field.
const FIELD_RENAMES: &[(&str, &str)] = &[
    ("accessToken", "access_token"),
    ("expireTime", "expire_time"),
];

#[derive(Debug, Serialize)]
struct GenerateAccessTokenRequest<'a> {
    scope: &'a [String],
    lifetime: String,
}

pub(crate) async fn generate_access_token(
    client: &Client,
    impersonation_url: &str,
    federated: &FederatedAccessToken,
    params: &WifParams,
) -> Result<ServiceAccountAccessToken, WifError> {
    let body = GenerateAccessTokenRequest {
        scope: &params.scopes,
        lifetime: params.lifetime(),
    };

    debug!(url = %impersonation_url, scopes = ?params.scopes, "impersonating service account");
    let response = client
        .post(impersonation_url)
        .bearer_auth(&federated.access_token)
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(WifError::Status {
            endpoint: "service account impersonation",
            status,
            body,
        });
    }

    let raw: Value = response.json().await?;
    let token = normalize_response(raw)?;
    info!(expire_time = %token.expire_time, "service account access token issued");
    Ok(token)
}

/// Rename the known camelCase fields. Anything else is carried over as-is.
pub fn normalize_response(raw: Value) -> Result<ServiceAccountAccessToken, WifError> {
    let fields: Map<String, Value> = serde_json::from_value(raw)?;

    let mut normalized = Map::with_capacity(fields.len());
    for (key, value) in fields {
        let key = match FIELD_RENAMES.iter().find(|(wire, _)| *wire == key.as_str()) {
            Some((_, canonical)) => (*canonical).to_owned(),
            None => key,
        };
        normalized.insert(key, value);
    }
    Ok(serde_json::from_value(Value::Object(normalized))?)
}
