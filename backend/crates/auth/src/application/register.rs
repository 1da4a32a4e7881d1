//! Registration Use Case
//!
//! Creates a principal in one variant collection. The secret is validated
//! against policy and hashed exactly once here; it is never re-hashed unless
//! a later secret change replaces it.

use std::sync::Arc;

use platform::secret::ClearTextSecret;

use crate::domain::entity::{Credential, Principal, VariantProfile};
use crate::domain::repository::PrincipalRepository;
use crate::domain::value_object::Email;
use crate::error::{AuthError, AuthResult};

/// Input DTO for registration
#[derive(Debug)]
pub struct RegisterInput {
    pub email: String,
    pub display_name: String,
    pub secret: String,
    pub profile: VariantProfile,
}

/// Registration Use Case
pub struct RegisterUseCase<R>
where
    R: PrincipalRepository,
{
    repo: Arc<R>,
}

impl<R> RegisterUseCase<R>
where
    R: PrincipalRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<Principal> {
        let email = Email::new(input.email)?;

        let display_name = input.display_name.trim().to_string();
        if display_name.is_empty() {
            return Err(AuthError::Validation("Display name is required".to_string()));
        }
        if input.profile.secondary_identifier().trim().is_empty() {
            return Err(AuthError::Validation(
                "Secondary identifier is required".to_string(),
            ));
        }

        let secret = ClearTextSecret::new(input.secret)?;

        let kind = input.profile.kind();

        // Pre-check both identifiers for a friendly conflict error; the
        // store's unique constraints still back this up against races.
        for identifier in [email.as_str(), input.profile.secondary_identifier()] {
            if self
                .repo
                .find_by_identifier(kind, identifier)
                .await?
                .is_some()
            {
                return Err(AuthError::IdentifierTaken);
            }
        }

        let principal = Principal::new(email, display_name, input.profile);
        let credential = Credential::new(principal.id, secret.hash(None)?);

        self.repo.create(&principal, &credential).await?;

        tracing::info!(
            principal_id = %principal.id,
            kind = %kind,
            "Principal registered"
        );

        Ok(principal)
    }
}
