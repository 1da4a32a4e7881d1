//! Value Object Module

pub mod email;
pub mod principal_kind;
pub mod tpo_permission;
pub mod tpo_role;

pub use email::Email;
pub use principal_kind::PrincipalKind;
pub use tpo_permission::TpoPermission;
pub use tpo_role::TpoRole;
