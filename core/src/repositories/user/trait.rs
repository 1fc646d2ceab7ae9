//! User repository trait. Users are owned by the wider application; the auth core
//! only looks them up and provisions phone-credential owners.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Repository trait for User entity persistence operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their unique ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Find a user by normalized E.164 phone number
    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, DomainError>;

    /// Insert a phone-credential user unless one with the same phone exists.
    ///
    /// # Returns
    /// * `Ok(User)` - The inserted user, or the existing one on conflict
    async fn create_or_get_by_phone(&self, user: User) -> Result<User, DomainError>;

    /// Persist changes to role, tenant assignment or flags
    async fn update(&self, user: &User) -> Result<(), DomainError>;
}
