use std::future::Future;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::environment::Environment;
use crate::config::resolver;
use crate::config::types::{ResolvedConfig, WifParams, WorkloadIdentityConfig};
use crate::credential::token::ServiceAccountAccessToken;
use crate::error::WifError;
use crate::exchange::{impersonation, sts};
use crate::sources::SubjectTokenProvider;

/// Something that can produce a service account access token and produce
/// a fresh one on demand.
pub trait Credential {
    /// Run the full derivation chain and store its result.
    fn derive(&mut self) -> impl Future<Output = Result<ServiceAccountAccessToken, WifError>> + Send;

    /// Re-run the full derivation chain. Nothing from an earlier run is reused.
    fn refresh(&mut self) -> impl Future<Output = Result<ServiceAccountAccessToken, WifError>> + Send;

    /// The token stored by the last successful derivation.
    fn credentials(&self) -> Option<&ServiceAccountAccessToken>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivationState {
    Uninitialized,
    DerivingSubjectToken,
    ExchangingFederatedToken,
    Impersonating,
    Ready,
}

/// Immutable inputs of a [`WifCredential`].
#[derive(Debug, Clone)]
pub struct CredentialParams {
    pub config: ResolvedConfig,
    pub provider: SubjectTokenProvider,
    pub request: WifParams,
}

/// Workload identity federation credential.
///
/// Each derivation runs subject token -> federated token -> impersonation
/// from scratch. Subject and federated tokens are dropped as soon as the
/// next step has used them. Calls take `&mut self`, so concurrent refreshes
/// of one credential are ruled out by the borrow checker.
#[derive(Debug)]
pub struct WifCredential {
    params: CredentialParams,
    client: Client,
    state: DerivationState,
    credentials: Option<ServiceAccountAccessToken>,
}

impl WifCredential {
    pub fn new(
        config: &WorkloadIdentityConfig,
        env: &Environment,
        request: WifParams,
        client: Client,
    ) -> Result<Self, WifError> {
        let resolved = resolver::resolve(config, env)?
            .ok_or_else(|| WifError::NotExternalAccount(config.credential_type.to_owned()))?;
        let provider = SubjectTokenProvider::build(&resolved, env);
        Ok(Self::from_params(
            CredentialParams {
                config: resolved,
                provider,
                request,
            },
            client,
        ))
    }

    pub fn from_params(params: CredentialParams, client: Client) -> Self {
        Self {
            params,
            client,
            state: DerivationState::Uninitialized,
            credentials: None,
        }
    }

    pub fn params(&self) -> &CredentialParams {
        &self.params
    }

    pub fn state(&self) -> DerivationState {
        self.state
    }

    async fn run(&mut self) -> Result<ServiceAccountAccessToken, WifError> {
        match self.run_chain().await {
            Ok(token) => {
                self.credentials = Some(token.to_owned());
                self.state = DerivationState::Ready;
                info!(
                    provider = self.params.config.credential_source.name(),
                    expire_time = %token.expire_time,
                    "workload identity credential ready"
                );
                Ok(token)
            }
            Err(err) => {
                warn!(provider = self.params.config.credential_source.name(), error = %err, "workload identity derivation failed");
                self.credentials = None;
                self.state = DerivationState::Uninitialized;
                Err(err)
            }
        }
    }

    async fn run_chain(&mut self) -> Result<ServiceAccountAccessToken, WifError> {
        self.state = DerivationState::DerivingSubjectToken;
        let subject_token = self.params.provider.subject_token(&self.client).await?;

        self.state = DerivationState::ExchangingFederatedToken;
        let federated =
            sts::exchange_subject_token(&self.client, &self.params.config, subject_token.as_str()).await?;
        drop(subject_token);

        self.state = DerivationState::Impersonating;
        let token = impersonation::generate_access_token(
            &self.client,
            &self.params.config.service_account_impersonation_url,
            &federated,
            &self.params.request,
        )
        .await?;

        if token.access_token.is_empty() {
            return Err(WifError::EmptyToken);
        }
        Ok(token)
    }
}

impl Credential for WifCredential {
    async fn derive(&mut self) -> Result<ServiceAccountAccessToken, WifError> {
        debug!(state = ?self.state, "deriving workload identity credential");
        self.run().await
    }

    async fn refresh(&mut self) -> Result<ServiceAccountAccessToken, WifError> {
        debug!(state = ?self.state, "refreshing workload identity credential");
        self.run().await
    }

    fn credentials(&self) -> Option<&ServiceAccountAccessToken> {
        self.credentials.as_ref()
    }
}
