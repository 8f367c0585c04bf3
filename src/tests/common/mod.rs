// tests/common/mod.rs
pub use serde_json::json;

use httpmock::Method::POST;
use httpmock::{Mock, MockServer};
use reqwest::Client;

use crate::config::loader::parse_config;
use crate::config::types::WorkloadIdentityConfig;

pub const AWS_AUDIENCE: &str =
    "//iam.googleapis.com/projects/123/locations/global/workloadIdentityPools/p/providers/aws";
pub const STS_PATH: &str = "/v1/token";
pub const IMPERSONATION_PATH: &str =
    "/v1/projects/-/serviceAccounts/sa@p.iam.gserviceaccount.com:generateAccessToken";

/// The AWS credential document, with both Google endpoints pointed at `server`.
pub fn aws_document(server: &MockServer) -> WorkloadIdentityConfig {
    let document = json!({
        "type": "external_account",
        "audience": AWS_AUDIENCE,
        "subject_token_type": "urn:ietf:params:oauth:token-type:aws4_request",
        "token_url": server.url(STS_PATH),
        "service_account_impersonation_url": server.url(IMPERSONATION_PATH),
        "credential_source": {
            "environment_id": "aws1",
            "regional_cred_verification_url": "https://sts.{region}.amazonaws.com?Action=GetCallerIdentity&Version=2011-06-15"
        }
    });
    parse_config(&document.to_string()).expect("valid aws document")
}

/// A GitHub Actions credential document, endpoints pointed at `server`.
pub fn github_document(server: &MockServer) -> WorkloadIdentityConfig {
    let document = json!({
        "type": "external_account",
        "audience": "//iam.googleapis.com/projects/123/locations/global/workloadIdentityPools/p/providers/github",
        "subject_token_type": "urn:ietf:params:oauth:token-type:jwt",
        "token_url": server.url(STS_PATH),
        "service_account_impersonation_url": server.url(IMPERSONATION_PATH),
        "credential_source": {
            "oidc_token_audience": "aud1"
        }
    });
    parse_config(&document.to_string()).expect("valid github document")
}

/// Token exchange answering `subject_token` with `federated_token`.
pub async fn mock_exchange<'a>(
    server: &'a MockServer,
    subject_token: &str,
    federated_token: &str,
) -> Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(STS_PATH)
                .form_urlencoded_tuple("subjectToken", subject_token);
            then.status(200).json_body(json!({
                "access_token": federated_token,
                "issued_token_type": "urn:ietf:params:oauth:token-type:access_token",
                "token_type": "Bearer",
                "expires_in": 3599
            }));
        })
        .await
}

/// Impersonation endpoint accepting `federated_token` as bearer.
pub async fn mock_impersonation<'a>(
    server: &'a MockServer,
    federated_token: &str,
    access_token: &str,
) -> Mock<'a> {
    let bearer = format!("Bearer {}", federated_token);
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(IMPERSONATION_PATH)
                .header("Authorization", bearer.as_str());
            then.status(200).json_body(json!({
                "accessToken": access_token,
                "expireTime": "2025-01-01T00:00:00Z"
            }));
        })
        .await
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}
