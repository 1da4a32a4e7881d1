//! Entity Module

pub mod credential;
pub mod principal;

pub use credential::Credential;
pub use principal::{Principal, VariantProfile};
