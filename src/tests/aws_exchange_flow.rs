#[cfg(test)]
mod tests {
    use httpmock::Method::POST;
    use httpmock::MockServer;

    use crate::config::environment::Environment;
    use crate::config::types::WifParams;
    use crate::credential::wif::{Credential, DerivationState, WifCredential};
    use crate::error::WifError;
    use crate::tests::common::*;

    fn aws_environment() -> Environment {
        Environment {
            aws_region: Some("us-east-1".into()),
            aws_access_key_id: Some("AKIDEXAMPLE".into()),
            aws_secret_access_key: Some("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".into()),
            aws_session_token: Some("aws-session".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_aws_to_service_account_token_flow() {
        let server = MockServer::start_async().await;
        let exchange = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(STS_PATH)
                    .form_urlencoded_tuple("audience", AWS_AUDIENCE)
                    .form_urlencoded_tuple("grantType", "urn:ietf:params:oauth:grant-type:token-exchange")
                    .form_urlencoded_tuple("requestedTokenType", "urn:ietf:params:oauth:token-type:access_token")
                    .form_urlencoded_tuple("scope", "https://www.googleapis.com/auth/iam")
                    .form_urlencoded_tuple("subjectTokenType", "urn:ietf:params:oauth:token-type:aws4_request")
                    // JSON, percent-encoded, then form-encoded again on the wire
                    .body_includes("subjectToken=%257B%2522url%2522%253A%2522https%253A%252F%252Fsts.us-east-1.amazonaws.com");
                then.status(200).json_body(json!({ "access_token": "FED1", "expires_in": 3599 }));
            })
            .await;
        let impersonation = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(IMPERSONATION_PATH)
                    .header("Authorization", "Bearer FED1")
                    .json_body(json!({
                        "scope": ["https://www.googleapis.com/auth/cloud-platform"],
                        "lifetime": "3600s"
                    }));
                then.status(200).json_body(json!({
                    "accessToken": "ya29.xyz",
                    "expireTime": "2025-01-01T00:00:00Z"
                }));
            })
            .await;

        let mut credential = WifCredential::new(
            &aws_document(&server),
            &aws_environment(),
            WifParams::new(vec!["https://www.googleapis.com/auth/cloud-platform".into()]),
            build_reqwest_client(),
        )
        .unwrap();
        let token = credential.derive().await.unwrap();

        exchange.assert_async().await;
        impersonation.assert_async().await;
        assert_eq!(
            serde_json::to_value(&token).unwrap(),
            json!({ "access_token": "ya29.xyz", "expire_time": "2025-01-01T00:00:00Z" })
        );
        assert_eq!(credential.state(), DerivationState::Ready);
        assert_eq!(credential.credentials(), Some(&token));
    }

    #[tokio::test]
    async fn test_rejected_exchange_skips_impersonation() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(STS_PATH);
                then.status(401).body(r#"{"error":"invalid_grant"}"#);
            })
            .await;
        let impersonation = mock_impersonation(&server, "FED1", "ya29.xyz").await;

        let mut credential = WifCredential::new(
            &aws_document(&server),
            &aws_environment(),
            WifParams::new(vec![]),
            build_reqwest_client(),
        )
        .unwrap();
        let err = credential.derive().await.unwrap_err();

        assert!(matches!(err, WifError::Status { status, .. } if status.as_u16() == 401));
        impersonation.assert_calls_async(0).await;
        assert_eq!(credential.state(), DerivationState::Uninitialized);
        assert!(credential.credentials().is_none());
    }

    #[tokio::test]
    async fn test_unsupported_environment_id_fails_before_network() {
        let server = MockServer::start_async().await;
        let exchange = mock_exchange(&server, "unused", "FED1").await;

        let mut document = aws_document(&server);
        if let Some(source) = document.credential_source.as_mut() {
            source.environment_id = Some("aws2".into());
        }
        let err = WifCredential::new(&document, &aws_environment(), WifParams::new(vec![]), build_reqwest_client())
            .unwrap_err();

        assert!(matches!(err, WifError::UnsupportedProvider(_)));
        exchange.assert_calls_async(0).await;
    }
}
