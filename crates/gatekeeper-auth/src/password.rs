//! Password hashing

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::AuthError;

/// Hash a password with Argon2id and a random salt
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Check a password against an Argon2 PHC string
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Opaque hash/verify capability for stored password digests
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// `false` for a wrong password and for a digest this hasher cannot read
    fn verify(&self, password: &str, digest: &str) -> bool;
}

/// Argon2id PHC strings
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        hash_password(password)
    }

    fn verify(&self, password: &str, digest: &str) -> bool {
        verify_password(password, digest).unwrap_or(false)
    }
}

/// Unsalted lowercase hex SHA-256, for snapshots written by older deployments
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl PasswordHasher for Sha256Hasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(hex::encode(Sha256::digest(password.as_bytes())))
    }

    fn verify(&self, password: &str, digest: &str) -> bool {
        hex::encode(Sha256::digest(password.as_bytes())) == digest
    }
}

/// Error type for parsing a hash scheme
#[derive(Debug, Clone)]
pub struct ParseHashSchemeError(String);

impl fmt::Display for ParseHashSchemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid hash scheme: {}", self.0)
    }
}

impl std::error::Error for ParseHashSchemeError {}

/// Configured password hashing scheme
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashScheme {
    #[default]
    Argon2,
    Sha256,
}

impl HashScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashScheme::Argon2 => "argon2",
            HashScheme::Sha256 => "sha256",
        }
    }

    pub fn hasher(&self) -> Arc<dyn PasswordHasher> {
        match self {
            HashScheme::Argon2 => Arc::new(Argon2Hasher),
            HashScheme::Sha256 => Arc::new(Sha256Hasher),
        }
    }
}

impl FromStr for HashScheme {
    type Err = ParseHashSchemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "argon2" => Ok(HashScheme::Argon2),
            "sha256" => Ok(HashScheme::Sha256),
            _ => Err(ParseHashSchemeError(s.to_string())),
        }
    }
}
