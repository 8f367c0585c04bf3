use reqwest::Client;
use tracing::{debug, info};

use crate::config::environment::Environment;
use crate::config::types::{WifParams, WorkloadIdentityConfig};
use crate::credential::wif::{Credential, WifCredential};
use crate::error::WifError;

/// Try the document as a workload identity credential.
///
/// `Ok(None)` means "not usable here": the document is another credential
/// kind, the environment lacks what the provider needs, or the chain
/// produced an empty token. Callers holding a list of credential sources
/// move on to the next one. Anything else is a real failure.
pub async fn external_account_credential(
    config: &WorkloadIdentityConfig,
    env: &Environment,
    params: WifParams,
    client: Client,
) -> Result<Option<WifCredential>, WifError> {
    let mut credential = match WifCredential::new(config, env, params, client) {
        Ok(credential) => credential,
        Err(err) if err.is_inapplicable() => {
            debug!(error = %err, "external account credential not applicable");
            return Ok(None);
        }
        Err(err) => return Err(err),
    };

    match credential.derive().await {
        Ok(_) => {
            info!("external account credential selected");
            Ok(Some(credential))
        }
        Err(err) if err.is_inapplicable() => {
            debug!(error = %err, "external account credential produced no usable token");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
