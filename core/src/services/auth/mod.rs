//! Authentication flow
//!
//! Login, refresh, logout and logout-all over the token services. This is the only
//! place with rules that span the refresh store and the blacklist.

mod config;
mod service;
mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;


pub use config::AuthServiceConfig;
pub use service::AuthService;
pub use traits::{CredentialAuthenticator, UserDirectory};

#[cfg(any(test, feature = "test-utils"))]
pub use memory::InMemoryUserDirectory;
