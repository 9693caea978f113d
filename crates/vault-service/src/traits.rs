use async_trait::async_trait;
use thiserror::Error;
use vault_core::{
    ApiKey, AuthToken, CreatedApiKey, Credential, Credentials, KeyStatusFilter, PageRequest,
    Secret, SecretInput, Session,
};

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request never got a response: connect failure or timeout.
    #[error("connection failed: {0}")]
    Transport(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("server error: {0}")]
    Server(String),

    /// A success response whose body did not have the expected shape.
    #[error("invalid server response: {0}")]
    Malformed(String),
}

/// Operations offered by the remote secrets backend.
///
/// Authenticated calls borrow the caller's [`Session`] and attach its
/// credential as a bearer token. Implementations never keep credentials of
/// their own.
#[async_trait]
pub trait VaultService: Send + Sync {
    async fn health_check(&self) -> Result<(), ServiceError>;

    // -- Auth --
    async fn signup(&self, credentials: &Credentials) -> Result<AuthToken, ServiceError>;
    async fn login(&self, credentials: &Credentials) -> Result<AuthToken, ServiceError>;
    async fn current_identity(&self, session: &Session) -> Result<String, ServiceError>;

    /// Check `key` by resolving the identity it belongs to. On success the
    /// key becomes the session credential; on failure `session` is left
    /// exactly as it was.
    async fn validate_key(&self, session: &mut Session, key: &str) -> Result<String, ServiceError> {
        let credential = Credential::ApiKey(key.to_string());
        let probe = Session::with_credential(credential.clone());
        let email = self.current_identity(&probe).await?;
        session.establish(credential, Some(email.clone()));
        Ok(email)
    }

    // -- Secrets --
    async fn list_secrets(
        &self,
        session: &Session,
        page: PageRequest,
    ) -> Result<Vec<Secret>, ServiceError>;
    async fn create_secret(
        &self,
        session: &Session,
        input: &SecretInput,
        master_password: &str,
    ) -> Result<(), ServiceError>;
    async fn update_secret(
        &self,
        session: &Session,
        id: &str,
        input: &SecretInput,
        master_password: &str,
    ) -> Result<(), ServiceError>;
    async fn delete_secret(&self, session: &Session, id: &str) -> Result<(), ServiceError>;

    // -- API keys --
    async fn list_api_keys(
        &self,
        session: &Session,
        page: PageRequest,
        filter: KeyStatusFilter,
    ) -> Result<Vec<ApiKey>, ServiceError>;
    async fn create_api_key(
        &self,
        session: &Session,
        name: &str,
    ) -> Result<CreatedApiKey, ServiceError>;
    async fn revoke_api_key(&self, session: &Session, id: &str) -> Result<(), ServiceError>;
}
