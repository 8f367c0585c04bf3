use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::config::environment::Environment;
use crate::config::types::AwsSource;
use crate::error::WifError;
use crate::sources::SubjectTokenMaterial;
use crate::utils::constants::*;

pub mod signer;

use signer::AwsSecurityCredentials;

/// Builds the AWS subject token: a signed GetCallerIdentity request.
#[derive(Debug, Clone)]
pub struct AwsProvider {
    pub source: AwsSource,
    /// Full resource name of the workload identity pool provider.
    pub target_resource: String,
    pub region: Option<String>,
    pub credentials: Option<AwsSecurityCredentials>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MetadataCredentials {
    access_key_id: String,
    secret_access_key: String,
    #[serde(default)]
    token: Option<String>,
}

impl AwsProvider {
    pub fn new(source: AwsSource, target_resource: String, env: &Environment) -> Self {
        Self {
            source,
            target_resource,
            region: env.aws_region.to_owned(),
            credentials: env.aws_credentials(),
        }
    }

    pub async fn subject_token(&self, client: &Client) -> Result<SubjectTokenMaterial, WifError> {
        let needs_metadata = self.region.is_none() || self.credentials.is_none();
        let session_token = if needs_metadata {
            self.metadata_session_token(client).await?
        } else {
            None
        };

        let region = match &self.region {
            Some(region) => region.to_owned(),
            None => self.region_from_metadata(client, session_token.as_deref()).await?,
        };
        let credentials = match &self.credentials {
            Some(credentials) => credentials.to_owned(),
            None => self.credentials_from_metadata(client, session_token.as_deref()).await?,
        };
        let url = self.verification_url(&region)?;
        info!(region = %region, "signing AWS GetCallerIdentity request");

        // signed last, right before the token is handed to the exchange
        let request = signer::sign_get_caller_identity(&url, &region, &self.target_resource, &credentials)?;
        SubjectTokenMaterial::signed_request(request)
    }

    fn verification_url(&self, region: &str) -> Result<Url, WifError> {
        let raw = self
            .source
            .regional_cred_verification_url
            .replace(REGION_PLACEHOLDER, region);
        Url::parse(&raw).map_err(|e| {
            WifError::Config(format!("invalid regional_cred_verification_url '{}': {}", raw, e))
        })
    }

    async fn metadata_session_token(&self, client: &Client) -> Result<Option<String>, WifError> {
        let Some(url) = &self.source.imdsv2_session_token_url else {
            return Ok(None);
        };
        debug!(url = %url, "requesting IMDSv2 session token");
        let response = client
            .put(url)
            .header(IMDS_SESSION_TTL_HEADER, IMDS_SESSION_TTL_SECONDS)
            .send()
            .await
            .map_err(|e| metadata_unavailable("IMDSv2 session token", e))?;
        read_metadata(response, "IMDSv2 session token").await.map(Some)
    }

    async fn metadata_get(
        &self,
        client: &Client,
        url: &str,
        session_token: Option<&str>,
        what: &str,
    ) -> Result<String, WifError> {
        let mut request = client.get(url);
        if let Some(token) = session_token {
            request = request.header(IMDS_SESSION_TOKEN_HEADER, token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| metadata_unavailable(what, e))?;
        read_metadata(response, what).await
    }

    async fn region_from_metadata(
        &self,
        client: &Client,
        session_token: Option<&str>,
    ) -> Result<String, WifError> {
        let zone = self
            .metadata_get(client, &self.source.region_url, session_token, "AWS availability zone")
            .await?;
        // "us-east-1b" -> "us-east-1"
        let mut region = zone;
        region.pop();
        if region.is_empty() {
            return Err(WifError::Environment("instance metadata returned an empty availability zone".into()));
        }
        debug!(region = %region, "region resolved from instance metadata");
        Ok(region)
    }

    async fn credentials_from_metadata(
        &self,
        client: &Client,
        session_token: Option<&str>,
    ) -> Result<AwsSecurityCredentials, WifError> {
        let role = self
            .metadata_get(client, &self.source.url, session_token, "AWS role name")
            .await?;
        if role.is_empty() {
            return Err(WifError::Environment("no IAM role attached to this instance".into()));
        }
        let role_url = format!("{}/{}", self.source.url.trim_end_matches('/'), role);
        let document = self
            .metadata_get(client, &role_url, session_token, "AWS role credentials")
            .await?;
        let credentials: MetadataCredentials = serde_json::from_str(&document).map_err(|e| {
            WifError::Environment(format!("malformed AWS role credentials document: {}", e))
        })?;
        debug!(role = %role, "credentials resolved from instance metadata");
        Ok(AwsSecurityCredentials {
            access_key_id: credentials.access_key_id,
            secret_access_key: credentials.secret_access_key,
            session_token: credentials.token,
        })
    }
}

fn metadata_unavailable(what: &str, err: reqwest::Error) -> WifError {
    WifError::Environment(format!("{} lookup failed: {}", what, err))
}

async fn read_metadata(response: reqwest::Response, what: &str) -> Result<String, WifError> {
    let status = response.status();
    if !status.is_success() {
        return Err(WifError::Environment(format!("{} lookup returned {}", what, status)));
    }
    let body = response
        .text()
        .await
        .map_err(|e| metadata_unavailable(what, e))?;
    Ok(body.trim().to_owned())
}
