use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::config::types::GithubActionsSource;
use crate::error::WifError;
use crate::sources::SubjectTokenMaterial;

/// Fetches the OIDC token GitHub Actions injects into workflow jobs.
#[derive(Debug, Clone)]
pub struct GithubActionsProvider {
    pub source: GithubActionsSource,
}

#[derive(Debug, Deserialize)]
struct IdTokenResponse {
    value: String,
}

impl GithubActionsProvider {
    pub fn new(source: GithubActionsSource) -> Self {
        Self { source }
    }

    pub async fn subject_token(&self, client: &Client) -> Result<SubjectTokenMaterial, WifError> {
        let url = self.source.id_token_url.as_deref().ok_or_else(|| {
            WifError::Environment("ACTIONS_ID_TOKEN_REQUEST_URL is not set; does the job have 'id-token: write'?".into())
        })?;
        let bearer = self.source.id_token_request_token.as_deref().ok_or_else(|| {
            WifError::Environment("ACTIONS_ID_TOKEN_REQUEST_TOKEN is not set".into())
        })?;

        info!(audience = %self.source.oidc_token_audience, "requesting GitHub Actions OIDC token");
        let response = client
            .get(url)
            .query(&[("audience", self.source.oidc_token_audience.as_str())])
            .bearer_auth(bearer)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WifError::Status {
                endpoint: "GitHub OIDC token endpoint",
                status,
                body,
            });
        }

        let token: IdTokenResponse = response.json().await?;
        Ok(SubjectTokenMaterial::OidcToken(token.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::json;

    fn source(url: Option<String>, token: Option<&str>) -> GithubActionsSource {
        GithubActionsSource {
            id_token_url: url,
            id_token_request_token: token.map(str::to_owned),
            oidc_token_audience: "aud1".into(),
        }
    }

    #[tokio::test]
    async fn issues_one_get_with_audience_and_bearer() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/token")
                    .query_param("audience", "aud1")
                    .header("Authorization", "Bearer tok123");
                then.status(200).json_body(json!({ "count": 1, "value": "gh.jwt.token" }));
            })
            .await;

        let provider = GithubActionsProvider::new(source(Some(server.url("/token")), Some("tok123")));
        let material = provider.subject_token(&Client::new()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(material.as_str(), "gh.jwt.token");
    }

    #[tokio::test]
    async fn missing_url_or_token_fails_before_network() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/token");
                then.status(200).json_body(json!({ "value": "unused" }));
            })
            .await;

        let no_url = GithubActionsProvider::new(source(None, Some("tok123")));
        let err = no_url.subject_token(&Client::new()).await.unwrap_err();
        assert!(matches!(err, WifError::Environment(_)));

        let no_token = GithubActionsProvider::new(source(Some(server.url("/token")), None));
        let err = no_token.subject_token(&Client::new()).await.unwrap_err();
        assert!(matches!(err, WifError::Environment(_)));

        mock.assert_calls_async(0).await;
    }

    #[tokio::test]
    async fn non_success_status_is_surfaced() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/token");
                then.status(401).body("bad bearer");
            })
            .await;

        let provider = GithubActionsProvider::new(source(Some(server.url("/token")), Some("tok123")));
        let err = provider.subject_token(&Client::new()).await.unwrap_err();
        match err {
            WifError::Status { status, body, .. } => {
                assert_eq!(status.as_u16(), 401);
                assert_eq!(body, "bad bearer");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
