//! Credential Secret Hashing and Verification
//!
//! NIST SP 800-63B compliant secret handling with:
//! - Argon2id hashing (memory-hard, recommended by OWASP)
//! - Zeroization of sensitive data
//! - Constant-time comparison
//!
//! The hash is produced exactly once at write time; verification parses the
//! stored PHC string and never re-hashes unless the secret itself changes.

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Minimum secret length (NIST: SHALL be at least 8)
pub const MIN_SECRET_LENGTH: usize = 8;

/// Maximum secret length (NIST: SHOULD permit at least 64)
pub const MAX_SECRET_LENGTH: usize = 128;

/// Secret policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretPolicyError {
    /// Secret is too short
    #[error("Secret must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    /// Secret is too long
    #[error("Secret must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    /// Secret contains only whitespace
    #[error("Secret cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    /// Secret contains invalid control characters
    #[error("Secret contains invalid control characters")]
    InvalidCharacter,
}

/// Secret hashing/verification errors
#[derive(Debug, Error)]
pub enum SecretHashError {
    /// Hashing operation failed
    #[error("Secret hashing failed: {0}")]
    HashingFailed(String),

    /// Invalid hash format
    #[error("Invalid secret hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Clear Text Secret (Zeroized on drop)
// ============================================================================

/// Clear text secret with automatic memory zeroization
///
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone` to prevent accidental copies
/// - Debug output is redacted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextSecret(String);

impl ClearTextSecret {
    /// Create a new clear text secret with policy validation
    ///
    /// Unicode is normalized using NFKC before validation; length is counted
    /// in code points, not bytes.
    pub fn new(raw: String) -> Result<Self, SecretPolicyError> {
        let normalized: String = raw.nfkc().collect();

        if normalized.trim().is_empty() {
            return Err(SecretPolicyError::EmptyOrWhitespace);
        }

        let char_count = normalized.chars().count();

        if char_count < MIN_SECRET_LENGTH {
            return Err(SecretPolicyError::TooShort {
                min: MIN_SECRET_LENGTH,
                actual: char_count,
            });
        }

        if char_count > MAX_SECRET_LENGTH {
            return Err(SecretPolicyError::TooLong {
                max: MAX_SECRET_LENGTH,
                actual: char_count,
            });
        }

        // Control characters other than space, tab, newline are rejected
        for ch in normalized.chars() {
            if ch.is_control() && ch != ' ' && ch != '\t' && ch != '\n' {
                return Err(SecretPolicyError::InvalidCharacter);
            }
        }

        Ok(Self(normalized))
    }

    /// Create without policy validation
    ///
    /// Login must accept secrets that predate the current policy; only the
    /// stored hash decides whether the credential is valid.
    pub fn new_unchecked(raw: String) -> Self {
        Self(raw.nfkc().collect())
    }

    /// Get the secret as bytes for hashing
    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Hash the secret using Argon2id
    ///
    /// `pepper` is an optional application-wide key appended before hashing.
    /// Returns a PHC-formatted hash string wrapped in [`HashedSecret`].
    pub fn hash(&self, pepper: Option<&[u8]>) -> Result<HashedSecret, SecretHashError> {
        let secret_bytes = match pepper {
            Some(p) => {
                let mut combined = self.as_bytes().to_vec();
                combined.extend_from_slice(p);
                combined
            }
            None => self.as_bytes().to_vec(),
        };

        let salt = SaltString::generate(OsRng);

        // Argon2::default() is the OWASP-recommended Argon2id parameter set
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(&secret_bytes, &salt)
            .map_err(|e| SecretHashError::HashingFailed(e.to_string()))?;

        Ok(HashedSecret {
            hash: hash.to_string(),
        })
    }
}

impl fmt::Debug for ClearTextSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextSecret")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Secret (Safe to store)
// ============================================================================

/// Hashed secret in PHC string format
///
/// Stores the Argon2id hash including algorithm, version, parameters, salt
/// and digest. Never serialized into API responses.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedSecret {
    hash: String,
}

impl HashedSecret {
    /// Create from PHC string (e.g., from database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, SecretHashError> {
        let hash = s.into();

        PasswordHash::new(&hash).map_err(|_| SecretHashError::InvalidHashFormat)?;

        Ok(Self { hash })
    }

    /// Get the PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Verify a secret against this hash
    ///
    /// `pepper` must match the one used during hashing. Argon2 compares
    /// digests in constant time internally.
    pub fn verify(&self, secret: &ClearTextSecret, pepper: Option<&[u8]>) -> bool {
        let secret_bytes = match pepper {
            Some(p) => {
                let mut combined = secret.as_bytes().to_vec();
                combined.extend_from_slice(p);
                combined
            }
            None => secret.as_bytes().to_vec(),
        };

        let parsed_hash = match PasswordHash::new(&self.hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(&secret_bytes, &parsed_hash)
            .is_ok()
    }
}

impl fmt::Debug for HashedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedSecret")
            .field("hash", &"[HASH]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_too_short() {
        let result = ClearTextSecret::new("short".to_string());
        assert!(matches!(result, Err(SecretPolicyError::TooShort { .. })));
    }

    #[test]
    fn test_secret_too_long() {
        let long = "a".repeat(MAX_SECRET_LENGTH + 1);
        let result = ClearTextSecret::new(long);
        assert!(matches!(result, Err(SecretPolicyError::TooLong { .. })));
    }

    #[test]
    fn test_secret_empty_or_whitespace() {
        assert!(matches!(
            ClearTextSecret::new(String::new()),
            Err(SecretPolicyError::EmptyOrWhitespace)
        ));
        assert!(matches!(
            ClearTextSecret::new("        ".to_string()),
            Err(SecretPolicyError::EmptyOrWhitespace)
        ));
    }

    #[test]
    fn test_secret_control_characters() {
        let result = ClearTextSecret::new("abc\u{0007}defgh".to_string());
        assert!(matches!(result, Err(SecretPolicyError::InvalidCharacter)));
    }

    #[test]
    fn test_hash_and_verify() {
        let secret = ClearTextSecret::new("correct horse battery".to_string()).unwrap();
        let hashed = secret.hash(None).unwrap();

        assert!(hashed.verify(&secret, None));

        let wrong = ClearTextSecret::new_unchecked("wrong horse battery".to_string());
        assert!(!hashed.verify(&wrong, None));
    }

    #[test]
    fn test_pepper_must_match() {
        let secret = ClearTextSecret::new("correct horse battery".to_string()).unwrap();
        let hashed = secret.hash(Some(b"pepper-a")).unwrap();

        let same = ClearTextSecret::new_unchecked("correct horse battery".to_string());
        assert!(hashed.verify(&same, Some(b"pepper-a")));
        assert!(!hashed.verify(&same, Some(b"pepper-b")));
        assert!(!hashed.verify(&same, None));
    }

    #[test]
    fn test_phc_roundtrip() {
        let secret = ClearTextSecret::new("roundtrip secret".to_string()).unwrap();
        let hashed = secret.hash(None).unwrap();

        let restored = HashedSecret::from_phc_string(hashed.as_phc_string()).unwrap();
        let same = ClearTextSecret::new_unchecked("roundtrip secret".to_string());
        assert!(restored.verify(&same, None));

        assert!(HashedSecret::from_phc_string("not a phc string").is_err());
    }

    #[test]
    fn test_nfkc_normalization() {
        // Full-width characters normalize to the same ASCII form
        let a = ClearTextSecret::new("ｐａｓｓｗｏｒｄ１".to_string()).unwrap();
        let hashed = a.hash(None).unwrap();
        let b = ClearTextSecret::new_unchecked("password1".to_string());
        assert!(hashed.verify(&b, None));
    }

    #[test]
    fn test_debug_redacted() {
        let secret = ClearTextSecret::new("super secret value".to_string()).unwrap();
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("super secret"));
        assert!(debug.contains("REDACTED"));
    }
}
