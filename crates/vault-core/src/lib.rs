pub mod api_key;
pub mod auth;
mod id;
pub mod page;
pub mod secret;
pub mod session;

pub use api_key::{ApiKey, CreatedApiKey, KeyStatus, KeyStatusFilter};
pub use auth::{AuthToken, Credentials, CurrentUser};
pub use page::PageRequest;
pub use secret::{Secret, SecretInput};
pub use session::{Credential, DisplayIdentity, Session};
