//! MySQL repository implementations

mod refresh_token_repository_impl;
mod user_directory_impl;

pub use refresh_token_repository_impl::MySqlRefreshTokenRepository;
pub use user_directory_impl::MySqlUserDirectory;
