use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use vault_core::{
    ApiKey, AuthToken, CreatedApiKey, Credentials, KeyStatusFilter, PageRequest, Secret,
    SecretInput, Session,
};

use crate::{ServiceError, VaultService};

/// Per-request time budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Auth and data calls.
    pub request: Duration,
    /// The unauthenticated liveness probe.
    pub health: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(8),
            health: Duration::from_secs(3),
        }
    }
}

/// Async HTTP client for the secrets backend.
#[derive(Clone)]
pub struct HttpService {
    base_url: String,
    client: Client,
    timeouts: Timeouts,
}

impl HttpService {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeouts(base_url, Timeouts::default())
    }

    pub fn with_timeouts(base_url: &str, timeouts: Timeouts) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
            timeouts,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, session: Option<&Session>) -> RequestBuilder {
        debug!(%method, path, "backend request");
        let builder = self
            .client
            .request(method, format!("{}{path}", self.base_url))
            .timeout(self.timeouts.request);
        match session.and_then(Session::credential) {
            Some(credential) => builder.bearer_auth(credential.bearer()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ServiceError> {
        builder.send().await.map_err(|e| {
            warn!("backend request failed: {e}");
            if e.is_timeout() {
                ServiceError::Transport("request timed out".into())
            } else {
                ServiceError::Transport(e.to_string())
            }
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        session: &Session,
    ) -> Result<T, ServiceError> {
        let resp = self
            .send(self.request(Method::GET, path, Some(session)))
            .await?;
        handle_response(resp).await
    }

    async fn post_json<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        session: Option<&Session>,
        body: &B,
    ) -> Result<T, ServiceError> {
        let builder = self.request(Method::POST, path, session).json(body);
        let resp = self.send(builder).await?;
        handle_response(resp).await
    }

    /// Fetch a listing and pull the rows out of `field`. Bodies without that
    /// array, and rows that do not decode, count as absent data.
    async fn get_collection<T: DeserializeOwned>(
        &self,
        path: &str,
        session: &Session,
        field: &str,
    ) -> Result<Vec<T>, ServiceError> {
        let resp = self
            .send(self.request(Method::GET, path, Some(session)))
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(parse_error_with_status(status, resp).await);
        }
        let body = resp
            .text()
            .await
            .map_err(|e| ServiceError::Transport(format!("read body: {e}")))?;
        Ok(collect_rows(&body, field))
    }

    async fn send_expecting_success(&self, builder: RequestBuilder) -> Result<(), ServiceError> {
        let resp = self.send(builder).await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(parse_error(resp).await)
        }
    }

    async fn authenticate(
        &self,
        path: &str,
        credentials: &Credentials,
    ) -> Result<AuthToken, ServiceError> {
        let value: Value = self.post_json(path, None, credentials).await?;
        match value.get("token").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => Ok(AuthToken {
                token: token.to_string(),
            }),
            _ => Err(ServiceError::Malformed("missing token".into())),
        }
    }
}

async fn handle_response<T: DeserializeOwned>(resp: Response) -> Result<T, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Malformed(format!("json decode: {e}")))
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

async fn parse_error(resp: Response) -> ServiceError {
    let status = resp.status();
    parse_error_with_status(status, resp).await
}

async fn parse_error_with_status(status: StatusCode, resp: Response) -> ServiceError {
    let body = resp.text().await.unwrap_or_default();
    error_from_body(status, &body)
}

/// Map a non-success response to an error carrying the server's text: the
/// `error` field of a JSON body, else the raw body, else the status line.
fn error_from_body(status: StatusCode, body: &str) -> ServiceError {
    let msg = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"].as_str().map(String::from))
        .unwrap_or_else(|| body.trim().to_string());
    let msg = if msg.is_empty() {
        status.to_string()
    } else {
        msg
    };
    warn!(%status, "backend returned error: {msg}");

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        ServiceError::Unauthorized(msg)
    } else if status == StatusCode::NOT_FOUND {
        ServiceError::NotFound(msg)
    } else if status.is_client_error() {
        ServiceError::InvalidInput(msg)
    } else {
        ServiceError::Server(msg)
    }
}

fn collect_rows<T: DeserializeOwned>(body: &str, field: &str) -> Vec<T> {
    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(e) => {
            warn!("listing body is not json: {e}");
            return Vec::new();
        }
    };
    let Some(rows) = value.get(field).and_then(Value::as_array) else {
        warn!("listing body has no `{field}` array");
        return Vec::new();
    };
    rows.iter()
        .filter(|row| row.is_object())
        .filter_map(|row| match serde_json::from_value(row.clone()) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("skipping malformed `{field}` row: {e}");
                None
            }
        })
        .collect()
}

#[async_trait]
impl VaultService for HttpService {
    /// Health endpoint is NOT authenticated.
    async fn health_check(&self) -> Result<(), ServiceError> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url))
            .timeout(self.timeouts.health)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::Server(format!(
                "health check failed: {}",
                resp.status()
            )))
        }
    }

    async fn signup(&self, credentials: &Credentials) -> Result<AuthToken, ServiceError> {
        self.authenticate("/api/v1/auth/signup", credentials).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthToken, ServiceError> {
        self.authenticate("/api/v1/auth/login", credentials).await
    }

    async fn current_identity(&self, session: &Session) -> Result<String, ServiceError> {
        let value: Value = self.get_json("/api/v1/auth/me", session).await?;
        value
            .get("email")
            .and_then(Value::as_str)
            .filter(|email| !email.is_empty())
            .map(String::from)
            .ok_or_else(|| ServiceError::Malformed("no email in response".into()))
    }

    async fn list_secrets(
        &self,
        session: &Session,
        page: PageRequest,
    ) -> Result<Vec<Secret>, ServiceError> {
        self.get_collection(&format!("/api/v1/secrets?{}", page.query()), session, "secrets")
            .await
    }

    async fn create_secret(
        &self,
        session: &Session,
        input: &SecretInput,
        master_password: &str,
    ) -> Result<(), ServiceError> {
        let builder = self
            .request(Method::POST, "/api/v1/secrets", Some(session))
            .header("X-Master-Password", master_password)
            .json(input);
        self.send_expecting_success(builder).await
    }

    async fn update_secret(
        &self,
        session: &Session,
        id: &str,
        input: &SecretInput,
        master_password: &str,
    ) -> Result<(), ServiceError> {
        let builder = self
            .request(Method::PUT, &format!("/api/v1/secrets/{id}"), Some(session))
            .header("X-Master-Password", master_password)
            .json(input);
        self.send_expecting_success(builder).await
    }

    async fn delete_secret(&self, session: &Session, id: &str) -> Result<(), ServiceError> {
        let builder = self.request(Method::DELETE, &format!("/api/v1/secrets/{id}"), Some(session));
        self.send_expecting_success(builder).await
    }

    async fn list_api_keys(
        &self,
        session: &Session,
        page: PageRequest,
        filter: KeyStatusFilter,
    ) -> Result<Vec<ApiKey>, ServiceError> {
        let mut path = format!("/api/v1/apikeys?{}", page.query());
        if let Some(status) = filter.as_query() {
            path.push_str(&format!("&status={status}"));
        }
        self.get_collection(&path, session, "api_keys").await
    }

    async fn create_api_key(
        &self,
        session: &Session,
        name: &str,
    ) -> Result<CreatedApiKey, ServiceError> {
        self.post_json(
            "/api/v1/apikeys",
            Some(session),
            &serde_json::json!({ "name": name }),
        )
        .await
    }

    async fn revoke_api_key(&self, session: &Session, id: &str) -> Result<(), ServiceError> {
        let builder = self.request(
            Method::POST,
            &format!("/api/v1/apikeys/{id}/revoke"),
            Some(session),
        );
        self.send_expecting_success(builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash() {
        let svc = HttpService::new("http://localhost:8080/");
        assert_eq!(svc.base_url(), "http://localhost:8080");
    }

    #[test]
    fn error_body_prefers_error_field() {
        let err = error_from_body(StatusCode::UNAUTHORIZED, r#"{"error":"bad key"}"#);
        assert!(matches!(err, ServiceError::Unauthorized(ref m) if m == "bad key"));
    }

    #[test]
    fn error_body_falls_back_to_raw_text() {
        let err = error_from_body(StatusCode::CONFLICT, "email taken\n");
        assert!(matches!(err, ServiceError::InvalidInput(ref m) if m == "email taken"));
    }

    #[test]
    fn empty_error_body_uses_status() {
        let err = error_from_body(StatusCode::BAD_GATEWAY, "");
        assert!(matches!(err, ServiceError::Server(ref m) if m.contains("502")));
    }

    #[test]
    fn rows_are_read_from_named_field() {
        let rows: Vec<Secret> =
            collect_rows(r#"{"secrets":[{"name":"a"},{"name":"b"}],"total":2}"#, "secrets");
        let names: Vec<_> = rows.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn malformed_listing_is_empty() {
        assert!(collect_rows::<Secret>("not json", "secrets").is_empty());
        assert!(collect_rows::<Secret>(r#"{"items":[]}"#, "secrets").is_empty());
        assert!(collect_rows::<Secret>(r#"{"secrets":"nope"}"#, "secrets").is_empty());
    }

    #[test]
    fn non_object_and_bad_rows_are_skipped() {
        let rows: Vec<ApiKey> = collect_rows(
            r#"{"api_keys":[1,"x",{"name":"ok"},{"name":"bad","created_at":"yesterday"}]}"#,
            "api_keys",
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "ok");
    }
}
