use crate::domain_model::{CustomerId, UserId};
use crate::domain_port::{IdentityStore, IdentityStoreError};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

/// Identity cache persisted as plain `<prefix>:<user_id>` string keys without expiry.
pub struct RedisIdentityStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisIdentityStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisIdentityStore {
            conn,
            prefix: prefix.into(),
        }
    }

    fn key(&self, user_id: &UserId) -> String {
        format!("{}:{}", self.prefix, user_id)
    }
}

#[async_trait::async_trait]
impl IdentityStore for RedisIdentityStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<CustomerId>, IdentityStoreError> {
        let key = self.key(user_id);
        let mut conn = self.conn.clone();
        let val: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| IdentityStoreError::Store(e.to_string()))?;
        Ok(val.map(CustomerId))
    }

    async fn set(
        &self,
        user_id: &UserId,
        customer_id: &CustomerId,
    ) -> Result<(), IdentityStoreError> {
        let key = self.key(user_id);
        let mut conn = self.conn.clone();
        let _: () = conn
            .set(&key, &customer_id.0)
            .await
            .map_err(|e| IdentityStoreError::Store(e.to_string()))?;
        Ok(())
    }

    async fn contains(&self, user_id: &UserId) -> Result<bool, IdentityStoreError> {
        let key = self.key(user_id);
        let mut conn = self.conn.clone();
        let exists: bool = conn
            .exists(&key)
            .await
            .map_err(|e| IdentityStoreError::Store(e.to_string()))?;
        Ok(exists)
    }
}
