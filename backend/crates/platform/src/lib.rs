//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations for the placement backend:
//! - Cryptographic utilities (random keys, Base64URL, constant-time compare)
//! - Secret hashing (Argon2id, NIST SP 800-63B compliant)
//! - Cookie management
//! - Client identification (IP, bearer tokens)
//! - Fixed-window rate limiting

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod rate_limit;
pub mod secret;
