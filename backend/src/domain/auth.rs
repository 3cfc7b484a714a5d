//! Authentication primitives: login credentials and password digests.
//!
//! Two digest formats are understood:
//!
//! - Argon2id in PHC string format (`$argon2id$v=19$...`), used for every
//!   digest written by this service;
//! - legacy: lowercase hex SHA-256 of the UTF-8 password with no salt, as
//!   written by earlier deployments.
//!
//! Legacy digests still verify so existing accounts keep working. They stay
//! weak against precomputed tables until the password is changed.

use std::fmt;

use argon2::Argon2;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::warn;
use zeroize::Zeroizing;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by the authentication gateway.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty and kept verbatim; it is zeroed on drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username used for the credential lookup.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password as typed by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Raised when a password cannot be turned into a digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password could not be hashed: {message}")]
pub struct PasswordHashError {
    message: String,
}

impl PasswordHashError {
    /// Wrap the hasher's reason.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Stored one-way password digest.
///
/// # Examples
/// ```
/// use repair_desk::domain::PasswordDigest;
///
/// let digest = PasswordDigest::hash("admin123").expect("hashable");
/// assert!(digest.verify("admin123"));
/// assert!(!digest.verify("admin124"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Hash a plaintext password with Argon2id and a fresh random salt.
    ///
    /// # Errors
    ///
    /// [`PasswordHashError`] when Argon2 rejects the input, for example a
    /// password longer than the algorithm accepts.
    pub fn hash(plaintext: &str) -> Result<Self, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|err| PasswordHashError::new(err.to_string()))?;
        Ok(Self(hash.to_string()))
    }

    /// Compute the unsalted digest written by earlier deployments.
    #[must_use]
    pub fn legacy(plaintext: &str) -> Self {
        Self(hex::encode(Sha256::digest(plaintext.as_bytes())))
    }

    /// Wrap a digest loaded from storage.
    #[must_use]
    pub fn from_stored(stored: impl Into<String>) -> Self {
        Self(stored.into())
    }

    /// Stored representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether this digest uses the unsalted legacy format.
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        !self.0.starts_with('$')
    }

    /// Check a plaintext password against the digest.
    ///
    /// Malformed stored values never verify.
    #[must_use]
    pub fn verify(&self, plaintext: &str) -> bool {
        if self.is_legacy() {
            let candidate = hex::encode(Sha256::digest(plaintext.as_bytes()));
            let stored = self.0.to_ascii_lowercase();
            return candidate.as_bytes().ct_eq(stored.as_bytes()).into();
        }

        let Ok(parsed) = PasswordHash::new(&self.0) else {
            return false;
        };
        match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => true,
            Err(password_hash::Error::Password) => false,
            Err(err) => {
                warn!(error = %err, "stored password digest could not be checked");
                false
            }
        }
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}
