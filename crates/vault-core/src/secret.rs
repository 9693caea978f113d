use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::lenient_id;

/// A secret as listed by the backend. Values are never part of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for creating or replacing a secret.
#[derive(Clone, Default, Serialize)]
pub struct SecretInput {
    pub name: String,
    pub value: String,
    pub category: String,
    pub description: String,
}

impl fmt::Debug for SecretInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretInput")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .field("category", &self.category)
            .field("description", &self.description)
            .finish()
    }
}
