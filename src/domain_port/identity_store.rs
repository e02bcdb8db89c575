use crate::domain_model::{CustomerId, UserId};

/// Key-value mapping from application users to vendor customers.
#[async_trait::async_trait]
pub trait IdentityStore: Send + Sync {
    async fn get(&self, user_id: &UserId) -> Result<Option<CustomerId>, IdentityStoreError>;

    async fn set(&self, user_id: &UserId, customer_id: &CustomerId)
    -> Result<(), IdentityStoreError>;

    async fn contains(&self, user_id: &UserId) -> Result<bool, IdentityStoreError> {
        Ok(self.get(user_id).await?.is_some())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityStoreError {
    #[error("infra error: {0}")]
    Store(String),
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}
