use std::path::Path;

use tracing::{debug, error};

use crate::config::types::WorkloadIdentityConfig;
use crate::error::WifError;

/// Load a credential document from a JSON file
pub async fn file_to_config(path: &Path) -> Result<WorkloadIdentityConfig, WifError> {
    debug!(path = %path.display(), "reading credential document");
    let content = tokio::fs::read_to_string(path).await.inspect_err(|e| {
        error!("read config error: {}", e);
    })?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<WorkloadIdentityConfig, WifError> {
    let config: WorkloadIdentityConfig = serde_json::from_str(content).map_err(|e| {
        error!("parse config error: {}", e);
        WifError::Config(format!("malformed credential document: {}", e))
    })?;
    debug!(credential_type = %config.credential_type, "credential document parsed");
    Ok(config)
}
