use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::lenient_id;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStatus {
    Active,
    Revoked,
    #[default]
    #[serde(other)]
    Unknown,
}

impl KeyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyStatus::Active => "active",
            KeyStatus::Revoked => "revoked",
            KeyStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKey {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: KeyStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Response to key creation. The raw key is only ever returned here.
#[derive(Clone, Deserialize)]
pub struct CreatedApiKey {
    #[serde(flatten)]
    pub api_key: ApiKey,
    #[serde(default, alias = "api_key", alias = "token")]
    pub key: Option<String>,
}

impl fmt::Debug for CreatedApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatedApiKey")
            .field("api_key", &self.api_key)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Server-side filter for key listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyStatusFilter {
    #[default]
    All,
    Active,
    Revoked,
}

impl KeyStatusFilter {
    /// Value for the `status` query parameter; `None` means no filter.
    pub fn as_query(&self) -> Option<&'static str> {
        match self {
            KeyStatusFilter::All => None,
            KeyStatusFilter::Active => Some("active"),
            KeyStatusFilter::Revoked => Some("revoked"),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            KeyStatusFilter::All => "all",
            KeyStatusFilter::Active => "active",
            KeyStatusFilter::Revoked => "revoked",
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            KeyStatusFilter::All => KeyStatusFilter::Active,
            KeyStatusFilter::Active => KeyStatusFilter::Revoked,
            KeyStatusFilter::Revoked => KeyStatusFilter::All,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_decodes() {
        let key: ApiKey =
            serde_json::from_str(r#"{"id":"k1","name":"ci","status":"expired"}"#).unwrap();
        assert_eq!(key.status, KeyStatus::Unknown);
    }

    #[test]
    fn missing_status_defaults_to_unknown() {
        let key: ApiKey = serde_json::from_str(r#"{"name":"ci"}"#).unwrap();
        assert_eq!(key.status, KeyStatus::Unknown);
    }

    #[test]
    fn created_key_accepts_aliases() {
        let created: CreatedApiKey =
            serde_json::from_str(r#"{"id":"k1","name":"ci","status":"active","api_key":"sk_123"}"#)
                .unwrap();
        assert_eq!(created.key.as_deref(), Some("sk_123"));
        assert_eq!(created.api_key.status, KeyStatus::Active);
        assert!(!format!("{created:?}").contains("sk_123"));
    }

    #[test]
    fn filter_cycles_through_all_states() {
        let mut filter = KeyStatusFilter::default();
        let mut seen = vec![filter];
        for _ in 0..3 {
            filter = filter.cycle();
            seen.push(filter);
        }
        assert_eq!(
            seen,
            vec![
                KeyStatusFilter::All,
                KeyStatusFilter::Active,
                KeyStatusFilter::Revoked,
                KeyStatusFilter::All,
            ]
        );
        assert_eq!(KeyStatusFilter::All.as_query(), None);
        assert_eq!(KeyStatusFilter::Revoked.as_query(), Some("revoked"));
    }
}
