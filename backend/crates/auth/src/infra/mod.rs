//! Infrastructure Layer
//!
//! Repository implementations: PostgreSQL for production, an in-memory
//! directory for tests and local tooling.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryDirectory;
pub use postgres::PgPrincipalRepository;
