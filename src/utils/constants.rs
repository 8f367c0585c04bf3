//! Shared constants and invariants

pub const EXTERNAL_ACCOUNT_TYPE: &str = "external_account";
pub const AWS_ENVIRONMENT_ID: &str = "aws1";
pub const REGION_PLACEHOLDER: &str = "{region}";

// Token exchange (RFC 8693) identifiers
pub const TOKEN_EXCHANGE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:token-exchange";
pub const ACCESS_TOKEN_TYPE: &str = "urn:ietf:params:oauth:token-type:access_token";
/// Scope of the federated token. Only used to call the impersonation endpoint.
pub const FEDERATED_TOKEN_SCOPE: &str = "https://www.googleapis.com/auth/iam";

pub const DEFAULT_LIFETIME_SECONDS: u64 = 3600;
pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 60;

// AWS instance metadata service
pub const DEFAULT_AWS_REGION_URL: &str =
    "http://169.254.169.254/latest/meta-data/placement/availability-zone";
pub const DEFAULT_AWS_CREDENTIALS_URL: &str =
    "http://169.254.169.254/latest/meta-data/iam/security-credentials";
pub const IMDS_SESSION_TOKEN_HEADER: &str = "x-aws-ec2-metadata-token";
pub const IMDS_SESSION_TTL_HEADER: &str = "x-aws-ec2-metadata-token-ttl-seconds";
pub const IMDS_SESSION_TTL_SECONDS: &str = "300";

// Process environment
pub const ENV_GITHUB_ACTIONS: &str = "GITHUB_ACTIONS";
pub const ENV_ID_TOKEN_REQUEST_URL: &str = "ACTIONS_ID_TOKEN_REQUEST_URL";
pub const ENV_ID_TOKEN_REQUEST_TOKEN: &str = "ACTIONS_ID_TOKEN_REQUEST_TOKEN";
pub const ENV_AWS_REGION: &str = "AWS_REGION";
pub const ENV_AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
pub const ENV_AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const ENV_AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
