use super::IdentityError;
use crate::domain_model::{CustomerId, UserId};

#[async_trait::async_trait]
pub trait IdentityService: Send + Sync {
    /// Returns the vendor customer for `user_id`, creating it only if none exists.
    async fn resolve_customer(&self, user_id: &UserId) -> Result<CustomerId, IdentityError>;
}
