//! Domain entities representing core business objects.

pub mod token;
pub mod user;

// Re-export commonly used types
pub use token::{
    normalize_device_id, AccessClaims, RefreshTokenRecord, StoredRefreshToken, DEFAULT_DEVICE_ID,
};
pub use user::{AccountStatus, Principal, Role};

#[cfg(test)]
mod tests;
