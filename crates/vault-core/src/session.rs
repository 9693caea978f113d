use std::fmt;

/// A bearer credential attached to authenticated requests.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Session token issued by signup or login.
    Token(String),
    /// Pre-issued API key that passed validation.
    ApiKey(String),
}

impl Credential {
    pub fn bearer(&self) -> &str {
        match self {
            Credential::Token(t) | Credential::ApiKey(t) => t,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Credential::Token(_) => "token",
            Credential::ApiKey(_) => "api key",
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({}, <redacted>)", self.kind())
    }
}

/// Email shown for the logged-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DisplayIdentity {
    /// Not looked up yet.
    #[default]
    Unresolved,
    Known(String),
    /// Lookup failed or returned no email.
    Unknown,
}

/// Authentication state for one run of the client.
///
/// Owned by the UI and lent to every backend call. Once a credential is
/// established it is kept for the rest of the process; there is no logout.
#[derive(Debug, Clone, Default)]
pub struct Session {
    credential: Option<Credential>,
    identity: DisplayIdentity,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session that carries `credential` without it being validated yet.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: Some(credential),
            identity: DisplayIdentity::Unresolved,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Replace the credential. A known email can be passed along so no
    /// identity lookup is needed.
    pub fn establish(&mut self, credential: Credential, email: Option<String>) {
        self.credential = Some(credential);
        self.identity = match email {
            Some(email) if !email.is_empty() => DisplayIdentity::Known(email),
            _ => DisplayIdentity::Unresolved,
        };
    }

    pub fn identity(&self) -> &DisplayIdentity {
        &self.identity
    }

    pub fn email(&self) -> Option<&str> {
        match &self.identity {
            DisplayIdentity::Known(email) => Some(email),
            _ => None,
        }
    }

    /// True when authenticated and no identity lookup has happened yet.
    pub fn needs_identity(&self) -> bool {
        self.is_authenticated() && self.identity == DisplayIdentity::Unresolved
    }

    /// Record the outcome of an identity lookup.
    pub fn resolve_identity(&mut self, email: Option<String>) {
        self.identity = match email {
            Some(email) if !email.is_empty() => DisplayIdentity::Known(email),
            _ => DisplayIdentity::Unknown,
        };
    }
}
