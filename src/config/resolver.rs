//! Validates a credential document and picks the identity environment.
//!
//! Returns `Ok(None)` when the document is not an external account at all,
//! so an umbrella credential search can try something else. Every other
//! problem is a hard error raised before any network activity.

use tracing::{debug, info};

use crate::config::environment::Environment;
use crate::config::types::{
    AwsSource, CredentialSource, CredentialSourceConfig, GithubActionsSource, ResolvedConfig,
    WorkloadIdentityConfig,
};
use crate::error::WifError;
use crate::utils::constants::*;

pub fn resolve(
    config: &WorkloadIdentityConfig,
    env: &Environment,
) -> Result<Option<ResolvedConfig>, WifError> {
    if config.credential_type != EXTERNAL_ACCOUNT_TYPE {
        debug!(credential_type = %config.credential_type, "not an external account document");
        return Ok(None);
    }

    let audience = required(&config.audience, "audience")?;
    let subject_token_type = required(&config.subject_token_type, "subject_token_type")?;
    let token_url = required(&config.token_url, "token_url")?;
    let service_account_impersonation_url = required(
        &config.service_account_impersonation_url,
        "service_account_impersonation_url",
    )?;

    let credential_source = select_source(config.credential_source.as_ref(), &audience, env)?;
    info!(source = credential_source.name(), "resolved workload identity source");

    Ok(Some(ResolvedConfig {
        audience,
        subject_token_type,
        token_url,
        service_account_impersonation_url,
        credential_source,
    }))
}

fn select_source(
    source: Option<&CredentialSourceConfig>,
    audience: &str,
    env: &Environment,
) -> Result<CredentialSource, WifError> {
    if env.github_actions {
        let oidc_token_audience = source
            .and_then(|s| s.oidc_token_audience.to_owned())
            .unwrap_or_else(|| audience.to_owned());
        return Ok(CredentialSource::GithubActions(GithubActionsSource {
            id_token_url: env.id_token_request_url.to_owned(),
            id_token_request_token: env.id_token_request_token.to_owned(),
            oidc_token_audience,
        }));
    }

    let source = source.ok_or_else(|| WifError::Config("'credential_source' is missing".into()))?;
    match source.environment_id.as_deref() {
        Some(AWS_ENVIRONMENT_ID) => {
            let regional_cred_verification_url = source
                .regional_cred_verification_url
                .to_owned()
                .filter(|url| !url.is_empty())
                .ok_or_else(|| {
                    WifError::Config(
                        "credential_source.regional_cred_verification_url is required for aws1".into(),
                    )
                })?;
            Ok(CredentialSource::Aws(AwsSource {
                environment_id: AWS_ENVIRONMENT_ID.to_owned(),
                regional_cred_verification_url,
                region_url: source
                    .region_url
                    .to_owned()
                    .unwrap_or_else(|| DEFAULT_AWS_REGION_URL.to_owned()),
                url: source
                    .url
                    .to_owned()
                    .unwrap_or_else(|| DEFAULT_AWS_CREDENTIALS_URL.to_owned()),
                imdsv2_session_token_url: source.imdsv2_session_token_url.to_owned(),
            }))
        }
        Some(other) => Err(WifError::UnsupportedProvider(format!(
            "environment_id '{}' (only '{}' is supported)",
            other, AWS_ENVIRONMENT_ID
        ))),
        None => Err(WifError::UnsupportedProvider(
            "credential_source has no environment_id".into(),
        )),
    }
}

fn required(value: &Option<String>, field: &str) -> Result<String, WifError> {
    value
        .to_owned()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| WifError::Config(format!("'{}' is required", field)))
}
