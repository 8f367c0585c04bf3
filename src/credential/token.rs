use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Service account access token, with canonical snake_case field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceAccountAccessToken {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub expire_time: String, // RFC 3339
    /// Response fields without a canonical name, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServiceAccountAccessToken {
    pub fn new(access_token: String, expire_time: String) -> Self {
        Self {
            access_token,
            expire_time,
            extra: Map::new(),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.expire_time)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }

    /// Expired, or expiring within `safety_margin_seconds`. A token with an
    /// unreadable expiry counts as expired.
    pub fn is_expired(&self, safety_margin_seconds: u64) -> bool {
        self.is_expired_at(Utc::now(), safety_margin_seconds)
    }

    /// A margin too large to represent also counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>, safety_margin_seconds: u64) -> bool {
        let Some(expires_at) = self.expires_at() else {
            return true;
        };
        i64::try_from(safety_margin_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|margin| now.checked_add_signed(margin))
            .map_or(true, |deadline| deadline >= expires_at)
    }
}
