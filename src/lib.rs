//! # Workload Identity Federation Library
//!
//! Turns an ambient workload identity (AWS instance or role credentials,
//! GitHub Actions OIDC) into a short-lived Google service account access
//! token by chaining a subject token, an STS token exchange and service
//! account impersonation.
//!
//! Modules:
//! - `config`: credential document types, environment snapshot, resolver
//! - `sources`: AWS signed-request and GitHub Actions subject tokens
//! - `exchange`: STS token exchange and impersonation clients
//! - `credential`: the derivation state machine and credential selection

pub mod config;
pub mod credential;
pub mod error;
pub mod exchange;
pub mod sources;
pub mod tests;
pub mod utils;

pub use crate::config::environment::Environment;
pub use crate::config::types::{WifParams, WorkloadIdentityConfig};
pub use crate::credential::select::external_account_credential;
pub use crate::credential::token::ServiceAccountAccessToken;
pub use crate::credential::wif::{Credential, WifCredential};
pub use crate::error::WifError;
