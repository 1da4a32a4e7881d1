//! Domain Layer
//!
//! Contains entities, value objects, the token codec, authorization gates,
//! and repository traits.

pub mod entity;
pub mod gate;
pub mod repository;
pub mod token;
pub mod value_object;

// Re-exports
pub use entity::{credential::Credential, principal::Principal};
pub use gate::Gate;
pub use repository::{CredentialRepository, PrincipalRepository};
pub use token::{TokenClaims, TokenCodec, TokenError, TokenKind};
