//! RS256 key management for JWT signing and verification

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use jsonwebtoken::{DecodingKey, EncodingKey};
use rh_shared::config::JwtConfig;
use tracing::info;

use crate::errors::{DomainError, TokenError};

fn key_load_error(message: String) -> DomainError {
    DomainError::Token(TokenError::KeyLoadError { message })
}

fn read_pem(path: &Path, what: &str) -> Result<Vec<u8>, DomainError> {
    fs::read(path).map_err(|e| {
        key_load_error(format!(
            "Failed to read {} {}: {}",
            what,
            path.display(),
            e
        ))
    })
}

fn parse_public_key(pem: &[u8], key_id: &str) -> Result<DecodingKey, DomainError> {
    DecodingKey::from_rsa_pem(pem).map_err(|e| {
        key_load_error(format!("Invalid public key format for '{}': {}", key_id, e))
    })
}

/// Active signing key plus the public keys of retired key ids
///
/// Tokens are signed with the active key and carry its id in the `kid` header.
/// Verification picks the public key by that header, so tokens signed before a
/// key rotation keep validating until they expire.
#[derive(Clone)]
pub struct Rs256KeyManager {
    key_id: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    retired: HashMap<String, DecodingKey>,
    private_key_path: Option<PathBuf>,
}

impl std::fmt::Debug for Rs256KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rs256KeyManager")
            .field("key_id", &self.key_id)
            .field("retired", &self.retired.keys().collect::<Vec<_>>())
            .field("private_key_path", &self.private_key_path)
            .finish()
    }
}

impl Rs256KeyManager {
    /// Loads the active key pair from PEM files
    ///
    /// # Returns
    ///
    /// * `Ok(Rs256KeyManager)` - Keys loaded
    /// * `Err(DomainError)` - `TokenError::KeyLoadError` if a file is missing or malformed
    pub fn new<P: AsRef<Path>>(
        private_key_path: P,
        public_key_path: P,
        key_id: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let private_key_path = private_key_path.as_ref();
        let private_pem = read_pem(private_key_path, "private key")?;
        let public_pem = read_pem(public_key_path.as_ref(), "public key")?;

        let mut manager = Self::from_pem_bytes(&private_pem, &public_pem, key_id.into())?;
        manager.private_key_path = Some(private_key_path.to_path_buf());
        Ok(manager)
    }

    /// Creates a key manager from PEM strings (useful for testing or embedded keys)
    pub fn from_pem_strings(
        private_key_pem: &str,
        public_key_pem: &str,
        key_id: impl Into<String>,
    ) -> Result<Self, DomainError> {
        Self::from_pem_bytes(
            private_key_pem.as_bytes(),
            public_key_pem.as_bytes(),
            key_id.into(),
        )
    }

    /// Loads the active pair and every retired public key named in `config`
    pub fn from_config(config: &JwtConfig) -> Result<Self, DomainError> {
        let mut manager = Self::new(
            &config.private_key_path,
            &config.public_key_path,
            config.key_id.clone(),
        )?;

        for (kid, path) in &config.retired_keys {
            let pem = read_pem(Path::new(path), "retired public key")?;
            manager = manager.with_retired_key(kid.clone(), &String::from_utf8_lossy(&pem))?;
        }

        info!(
            key_id = %manager.key_id,
            retired = manager.retired.len(),
            "Loaded JWT signing keys"
        );
        Ok(manager)
    }

    fn from_pem_bytes(
        private_pem: &[u8],
        public_pem: &[u8],
        key_id: String,
    ) -> Result<Self, DomainError> {
        if key_id.trim().is_empty() {
            return Err(key_load_error("Key id must not be empty".to_string()));
        }

        let encoding_key = EncodingKey::from_rsa_pem(private_pem)
            .map_err(|e| key_load_error(format!("Invalid private key format: {}", e)))?;
        let decoding_key = parse_public_key(public_pem, &key_id)?;

        Ok(Self {
            key_id,
            encoding_key,
            decoding_key,
            retired: HashMap::new(),
            private_key_path: None,
        })
    }

    /// Accept tokens signed under a previous key id
    pub fn with_retired_key(
        mut self,
        key_id: impl Into<String>,
        public_key_pem: &str,
    ) -> Result<Self, DomainError> {
        let key_id = key_id.into();
        if key_id == self.key_id {
            return Err(key_load_error(format!(
                "Retired key id '{}' collides with the active key id",
                key_id
            )));
        }
        let key = parse_public_key(public_key_pem.as_bytes(), &key_id)?;
        self.retired.insert(key_id, key);
        Ok(self)
    }

    /// Id of the key new tokens are signed with
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Returns the encoding key for signing JWTs
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Public key for a token's `kid` header
    ///
    /// A missing header selects the active key; an unknown id selects nothing.
    pub fn decoding_key_for(&self, kid: Option<&str>) -> Option<&DecodingKey> {
        match kid {
            None => Some(&self.decoding_key),
            Some(kid) if kid == self.key_id => Some(&self.decoding_key),
            Some(kid) => self.retired.get(kid),
        }
    }
}
