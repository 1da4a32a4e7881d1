//! Application Layer
//!
//! Use cases orchestrating the domain against the repository traits. Each
//! use case is a small struct over `Arc` handles, constructed per request by
//! the presentation layer.

pub mod change_secret;
pub mod config;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;
pub mod resolve;
pub mod session;
pub mod verification;

pub use change_secret::ChangeSecretUseCase;
pub use config::AuthConfig;
pub use login::LoginUseCase;
pub use logout::LogoutUseCase;
pub use refresh::RefreshUseCase;
pub use register::RegisterUseCase;
pub use resolve::{ResolveUseCase, ResolvedPrincipal};
pub use session::TokenPair;
pub use verification::SetVerificationUseCase;
