use tokio::runtime::Runtime;
use tracing::debug;
use vault_core::{
    ApiKey, AuthToken, CreatedApiKey, Credentials, KeyStatusFilter, PageRequest, Secret,
    SecretInput, Session,
};

use crate::{HttpService, ServiceError, Timeouts, VaultService};

/// Blocking wrapper around the async `HttpService`.
///
/// Creates an internal tokio runtime and uses `block_on()` for each call.
/// Designed for sync callers like the TUI.
pub struct BlockingHttpService {
    inner: HttpService,
    rt: Runtime,
}

impl BlockingHttpService {
    pub fn new(base_url: &str) -> std::io::Result<Self> {
        Self::with_timeouts(base_url, Timeouts::default())
    }

    pub fn with_timeouts(base_url: &str, timeouts: Timeouts) -> std::io::Result<Self> {
        Ok(Self {
            inner: HttpService::with_timeouts(base_url, timeouts),
            rt: Runtime::new()?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    pub fn health_check(&self) -> Result<(), ServiceError> {
        self.rt.block_on(self.inner.health_check())
    }

    /// Probe the backend in the background. The outcome is only logged.
    pub fn spawn_health_probe(&self) {
        let inner = self.inner.clone();
        self.rt.spawn(async move {
            match inner.health_check().await {
                Ok(()) => debug!("backend health probe ok"),
                Err(e) => debug!("backend health probe failed: {e}"),
            }
        });
    }

    // -- Trait method delegates --

    pub fn signup(&self, credentials: &Credentials) -> Result<AuthToken, ServiceError> {
        self.rt.block_on(self.inner.signup(credentials))
    }

    pub fn login(&self, credentials: &Credentials) -> Result<AuthToken, ServiceError> {
        self.rt.block_on(self.inner.login(credentials))
    }

    pub fn current_identity(&self, session: &Session) -> Result<String, ServiceError> {
        self.rt.block_on(self.inner.current_identity(session))
    }

    pub fn validate_key(&self, session: &mut Session, key: &str) -> Result<String, ServiceError> {
        self.rt.block_on(self.inner.validate_key(session, key))
    }

    pub fn list_secrets(
        &self,
        session: &Session,
        page: PageRequest,
    ) -> Result<Vec<Secret>, ServiceError> {
        self.rt.block_on(self.inner.list_secrets(session, page))
    }

    pub fn create_secret(
        &self,
        session: &Session,
        input: &SecretInput,
        master_password: &str,
    ) -> Result<(), ServiceError> {
        self.rt
            .block_on(self.inner.create_secret(session, input, master_password))
    }

    pub fn update_secret(
        &self,
        session: &Session,
        id: &str,
        input: &SecretInput,
        master_password: &str,
    ) -> Result<(), ServiceError> {
        self.rt
            .block_on(self.inner.update_secret(session, id, input, master_password))
    }

    pub fn delete_secret(&self, session: &Session, id: &str) -> Result<(), ServiceError> {
        self.rt.block_on(self.inner.delete_secret(session, id))
    }

    pub fn list_api_keys(
        &self,
        session: &Session,
        page: PageRequest,
        filter: KeyStatusFilter,
    ) -> Result<Vec<ApiKey>, ServiceError> {
        self.rt
            .block_on(self.inner.list_api_keys(session, page, filter))
    }

    pub fn create_api_key(
        &self,
        session: &Session,
        name: &str,
    ) -> Result<CreatedApiKey, ServiceError> {
        self.rt.block_on(self.inner.create_api_key(session, name))
    }

    pub fn revoke_api_key(&self, session: &Session, id: &str) -> Result<(), ServiceError> {
        self.rt.block_on(self.inner.revoke_api_key(session, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use vault_core::{Credential, KeyStatus};

    use crate::test_helpers::spawn_blocking_mock_backend;

    fn creds(email: &str) -> Credentials {
        Credentials {
            email: email.into(),
            password: "pw".into(),
            master_password: "master".into(),
        }
    }

    fn authed(svc: &BlockingHttpService, email: &str) -> Session {
        let token = svc.signup(&creds(email)).unwrap();
        let mut session = Session::new();
        session.establish(Credential::Token(token.token), None);
        session
    }

    // ---- health check ----

    #[test]
    fn blocking_health_check() {
        let backend = spawn_blocking_mock_backend();
        let svc = BlockingHttpService::new(&backend.base_url).unwrap();
        svc.health_check().unwrap();
    }

    #[test]
    fn health_check_reports_unreachable_backend() {
        let svc = BlockingHttpService::with_timeouts(
            "http://127.0.0.1:1",
            Timeouts {
                request: Duration::from_millis(500),
                health: Duration::from_millis(500),
            },
        )
        .unwrap();
        assert!(matches!(svc.health_check(), Err(ServiceError::Transport(_))));
    }

    #[test]
    fn background_probe_reaches_backend() {
        let backend = spawn_blocking_mock_backend();
        let svc = BlockingHttpService::new(&backend.base_url).unwrap();
        svc.spawn_health_probe();
        for _ in 0..100 {
            if backend.hits() > 0 {
                return;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        panic!("health probe never reached the backend");
    }

    // ---- auth ----

    #[test]
    fn signup_then_identity() {
        let backend = spawn_blocking_mock_backend();
        let svc = BlockingHttpService::new(&backend.base_url).unwrap();
        let session = authed(&svc, "new@vault.io");
        assert_eq!(svc.current_identity(&session).unwrap(), "new@vault.io");
    }

    #[test]
    fn signup_conflict_carries_server_text() {
        let backend = spawn_blocking_mock_backend();
        backend.register_user("taken@vault.io", "pw", "master");
        let svc = BlockingHttpService::new(&backend.base_url).unwrap();
        let err = svc.signup(&creds("taken@vault.io")).unwrap_err();
        assert!(err.to_string().contains("email already registered"));
    }

    #[test]
    fn login_rejects_wrong_master_password() {
        let backend = spawn_blocking_mock_backend();
        backend.register_user("me@vault.io", "pw", "other");
        let svc = BlockingHttpService::new(&backend.base_url).unwrap();
        let err = svc.login(&creds("me@vault.io")).unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[test]
    fn login_success_issues_token() {
        let backend = spawn_blocking_mock_backend();
        backend.register_user("me@vault.io", "pw", "master");
        let svc = BlockingHttpService::new(&backend.base_url).unwrap();
        let token = svc.login(&creds("me@vault.io")).unwrap();
        assert!(!token.token.is_empty());
    }

    #[test]
    fn missing_token_is_malformed() {
        let backend = spawn_blocking_mock_backend();
        backend.force_response(200, r#"{"ok":true}"#);
        let svc = BlockingHttpService::new(&backend.base_url).unwrap();
        let err = svc.login(&creds("me@vault.io")).err().unwrap();
        assert!(matches!(err, ServiceError::Malformed(_)));
    }

    #[test]
    fn identity_without_credential_is_unauthorized() {
        let backend = spawn_blocking_mock_backend();
        let svc = BlockingHttpService::new(&backend.base_url).unwrap();
        let err = svc.current_identity(&Session::new()).unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[test]
    fn identity_without_email_is_malformed() {
        let backend = spawn_blocking_mock_backend();
        backend.force_response(200, r#"{"id":7}"#);
        let svc = BlockingHttpService::new(&backend.base_url).unwrap();
        let session = Session::with_credential(Credential::Token("t".into()));
        let err = svc.current_identity(&session).unwrap_err();
        assert!(matches!(err, ServiceError::Malformed(_)));
    }

    // ---- key validation ----

    #[test]
    fn validate_key_establishes_session() {
        let backend = spawn_blocking_mock_backend();
        backend.register_user("keyed@vault.io", "pw", "master");
        let key = backend.issue_api_key("keyed@vault.io", "laptop");
        let svc = BlockingHttpService::new(&backend.base_url).unwrap();

        let mut session = Session::new();
        let email = svc.validate_key(&mut session, &key).unwrap();
        assert_eq!(email, "keyed@vault.io");
        assert!(session.is_authenticated());
        assert_eq!(session.email(), Some("keyed@vault.io"));
        assert!(matches!(session.credential(), Some(Credential::ApiKey(k)) if *k == key));
    }

    #[test]
    fn failed_validation_leaves_anonymous_session_alone() {
        let backend = spawn_blocking_mock_backend();
        let svc = BlockingHttpService::new(&backend.base_url).unwrap();
        let mut session = Session::new();
        assert!(svc.validate_key(&mut session, "sk_bogus").is_err());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn failed_validation_keeps_previous_credential() {
        let backend = spawn_blocking_mock_backend();
        let svc = BlockingHttpService::new(&backend.base_url).unwrap();
        let mut session = authed(&svc, "prior@vault.io");
        let before = session.credential().cloned();

        assert!(svc.validate_key(&mut session, "sk_bogus").is_err());
        assert_eq!(session.credential().cloned(), before);
        assert_eq!(svc.current_identity(&session).unwrap(), "prior@vault.io");
    }

    // ---- secrets ----

    #[test]
    fn secret_create_list_update_delete() {
        let backend = spawn_blocking_mock_backend();
        let svc = BlockingHttpService::new(&backend.base_url).unwrap();
        let session = authed(&svc, "crud@vault.io");

        assert!(svc.list_secrets(&session, PageRequest::default()).unwrap().is_empty());

        let input = SecretInput {
            name: "github".into(),
            value: "ghp_one".into(),
            category: "dev".into(),
            description: String::new(),
        };
        svc.create_secret(&session, &input, "master").unwrap();
        let listed = svc.list_secrets(&session, PageRequest::default()).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "github");
        assert_eq!(listed[0].category, "dev");

        let update = SecretInput {
            value: "ghp_two".into(),
            ..input.clone()
        };
        svc.update_secret(&session, &listed[0].id, &update, "master")
            .unwrap();
        assert_eq!(backend.secret_value("github").as_deref(), Some("ghp_two"));

        svc.delete_secret(&session, &listed[0].id).unwrap();
        assert_eq!(backend.secret_count(), 0);
    }

    #[test]
    fn create_secret_checks_master_password() {
        let backend = spawn_blocking_mock_backend();
        let svc = BlockingHttpService::new(&backend.base_url).unwrap();
        let session = authed(&svc, "m@vault.io");
        let input = SecretInput {
            name: "x".into(),
            value: "y".into(),
            ..Default::default()
        };
        let err = svc.create_secret(&session, &input, "wrong").unwrap_err();
        assert!(err.to_string().contains("invalid master password"));
    }

    #[test]
    fn secrets_are_paginated() {
        let backend = spawn_blocking_mock_backend();
        let svc = BlockingHttpService::new(&backend.base_url).unwrap();
        let session = authed(&svc, "pages@vault.io");
        for i in 0..5 {
            backend.add_secret("pages@vault.io", &format!("s{i}"), "v");
        }
        let page = PageRequest::first(2);
        let names = |p| -> Vec<String> {
            svc.list_secrets(&session, p)
                .unwrap()
                .into_iter()
                .map(|s| s.name)
                .collect()
        };
        assert_eq!(names(page), ["s0", "s1"]);
        assert_eq!(names(page.next().next()), ["s4"]);
    }

    #[test]
    fn malformed_secret_listing_is_empty() {
        let backend = spawn_blocking_mock_backend();
        backend.force_response(200, "<html>oops</html>");
        let svc = BlockingHttpService::new(&backend.base_url).unwrap();
        let session = Session::with_credential(Credential::Token("t".into()));
        assert!(svc.list_secrets(&session, PageRequest::default()).unwrap().is_empty());
    }

    #[test]
    fn server_error_text_surfaces() {
        let backend = spawn_blocking_mock_backend();
        backend.force_response(500, r#"{"error":"database down"}"#);
        let svc = BlockingHttpService::new(&backend.base_url).unwrap();
        let session = Session::with_credential(Credential::Token("t".into()));
        let err = svc.list_secrets(&session, PageRequest::default()).unwrap_err();
        assert!(matches!(err, ServiceError::Server(ref m) if m == "database down"));
    }

    // ---- api keys ----

    #[test]
    fn api_key_create_list_filter_revoke() {
        let backend = spawn_blocking_mock_backend();
        let svc = BlockingHttpService::new(&backend.base_url).unwrap();
        let session = authed(&svc, "keys@vault.io");

        let created = svc.create_api_key(&session, "ci").unwrap();
        assert!(created.key.as_deref().is_some_and(|k| k.starts_with("sk_")));
        assert_eq!(created.api_key.status, KeyStatus::Active);
        svc.create_api_key(&session, "laptop").unwrap();

        svc.revoke_api_key(&session, &created.api_key.id).unwrap();
        assert_eq!(backend.is_key_revoked("ci"), Some(true));

        let page = PageRequest::default();
        let all = svc.list_api_keys(&session, page, KeyStatusFilter::All).unwrap();
        assert_eq!(all.len(), 2);
        let active = svc
            .list_api_keys(&session, page, KeyStatusFilter::Active)
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "laptop");
        let revoked = svc
            .list_api_keys(&session, page, KeyStatusFilter::Revoked)
            .unwrap();
        assert_eq!(revoked[0].status, KeyStatus::Revoked);
    }

    #[test]
    fn revoked_key_no_longer_validates() {
        let backend = spawn_blocking_mock_backend();
        let svc = BlockingHttpService::new(&backend.base_url).unwrap();
        let session = authed(&svc, "rk@vault.io");
        let created = svc.create_api_key(&session, "old").unwrap();
        svc.revoke_api_key(&session, &created.api_key.id).unwrap();

        let mut fresh = Session::new();
        let key = created.key.unwrap();
        assert!(svc.validate_key(&mut fresh, &key).is_err());
        assert!(!fresh.is_authenticated());
    }

    #[test]
    fn revoke_unknown_key_is_not_found() {
        let backend = spawn_blocking_mock_backend();
        let svc = BlockingHttpService::new(&backend.base_url).unwrap();
        let session = authed(&svc, "nf@vault.io");
        let err = svc.revoke_api_key(&session, "missing").unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
