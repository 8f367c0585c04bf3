#[cfg(test)]
mod tests {
    use httpmock::Method::GET;
    use httpmock::MockServer;

    use crate::config::environment::Environment;
    use crate::config::types::WifParams;
    use crate::credential::select::external_account_credential;
    use crate::credential::wif::{Credential, DerivationState};
    use crate::tests::common::*;

    fn github_environment(server: &MockServer, bearer: Option<&str>) -> Environment {
        Environment {
            github_actions: true,
            id_token_request_url: Some(server.url("/token")),
            id_token_request_token: bearer.map(str::to_owned),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_github_actions_oidc_to_service_account_token() {
        let server = MockServer::start_async().await;
        let oidc = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/token")
                    .query_param("audience", "aud1")
                    .header("Authorization", "Bearer tok123");
                then.status(200).json_body(json!({ "count": 1, "value": "gh.jwt" }));
            })
            .await;
        let exchange = mock_exchange(&server, "gh.jwt", "FED1").await;
        let impersonation = mock_impersonation(&server, "FED1", "ya29.gh").await;

        let credential = external_account_credential(
            &github_document(&server),
            &github_environment(&server, Some("tok123")),
            WifParams::new(vec!["https://www.googleapis.com/auth/cloud-platform".into()]),
            build_reqwest_client(),
        )
        .await
        .unwrap()
        .expect("credential selected");

        oidc.assert_async().await;
        exchange.assert_async().await;
        impersonation.assert_async().await;
        assert_eq!(credential.state(), DerivationState::Ready);
        assert_eq!(credential.credentials().map(|t| t.access_token.as_str()), Some("ya29.gh"));
    }

    #[tokio::test]
    async fn test_missing_request_token_is_not_applicable() {
        let server = MockServer::start_async().await;
        let oidc = server
            .mock_async(|when, then| {
                when.method(GET).path("/token");
                then.status(200).json_body(json!({ "value": "gh.jwt" }));
            })
            .await;
        let exchange = mock_exchange(&server, "gh.jwt", "FED1").await;

        let selected = external_account_credential(
            &github_document(&server),
            &github_environment(&server, None),
            WifParams::new(vec![]),
            build_reqwest_client(),
        )
        .await
        .unwrap();

        assert!(selected.is_none());
        oidc.assert_calls_async(0).await;
        exchange.assert_calls_async(0).await;
    }
}
