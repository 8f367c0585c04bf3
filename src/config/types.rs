use serde::{Deserialize, Serialize};

/// ================================
/// Credential document (as read from JSON)
/// ================================
///
/// Everything except `type` is optional here so that documents describing
/// other credential kinds still parse and can be reported as not applicable.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct WorkloadIdentityConfig {
    #[serde(rename = "type")]
    pub credential_type: String, // must be "external_account"
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub subject_token_type: Option<String>,
    #[serde(default)]
    pub token_url: Option<String>,
    #[serde(default)]
    pub service_account_impersonation_url: Option<String>,
    #[serde(default)]
    pub credential_source: Option<CredentialSourceConfig>,
}

/// Raw `credential_source` block. AWS keys and the optional CI audience
/// override share one object in the document.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CredentialSourceConfig {
    #[serde(default)]
    pub environment_id: Option<String>,
    #[serde(default)]
    pub regional_cred_verification_url: Option<String>,
    #[serde(default)]
    pub region_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub imdsv2_session_token_url: Option<String>,
    #[serde(default)]
    pub oidc_token_audience: Option<String>,
}

/// ================================
/// Resolved configuration
/// ================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub audience: String,
    pub subject_token_type: String,
    pub token_url: String,
    pub service_account_impersonation_url: String,
    pub credential_source: CredentialSource,
}

/// Closed set of supported identity environments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Aws(AwsSource),
    GithubActions(GithubActionsSource),
}

impl CredentialSource {
    pub fn name(&self) -> &'static str {
        match self {
            CredentialSource::Aws(_) => "aws",
            CredentialSource::GithubActions(_) => "github_actions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsSource {
    pub environment_id: String, // invariant: "aws1"
    pub regional_cred_verification_url: String, // may contain "{region}"
    pub region_url: String,
    pub url: String,
    pub imdsv2_session_token_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubActionsSource {
    pub id_token_url: Option<String>,
    pub id_token_request_token: Option<String>,
    pub oidc_token_audience: String,
}

/// ================================
/// Caller parameters
/// ================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifParams {
    /// Scopes requested for the service account token.
    pub scopes: Vec<String>,
    pub lifetime_seconds: u64,
}

impl WifParams {
    pub fn new(scopes: Vec<String>) -> Self {
        Self {
            scopes,
            lifetime_seconds: crate::utils::constants::DEFAULT_LIFETIME_SECONDS,
        }
    }

    pub fn with_lifetime(mut self, lifetime_seconds: u64) -> Self {
        self.lifetime_seconds = lifetime_seconds;
        self
    }

    /// Lifetime in the duration string form the IAM credentials API expects.
    pub fn lifetime(&self) -> String {
        format!("{}s", self.lifetime_seconds)
    }
}
