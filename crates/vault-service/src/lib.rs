mod blocking;
mod http;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
mod traits;

pub use blocking::BlockingHttpService;
pub use http::{HttpService, Timeouts};
pub use traits::{ServiceError, VaultService};
