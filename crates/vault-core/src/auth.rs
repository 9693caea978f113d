use std::fmt;

use serde::{Deserialize, Serialize};

/// Signup and login body.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub master_password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Deserialize)]
pub struct AuthToken {
    pub token: String,
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Response of `GET /api/v1/auth/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub email: String,
}
