use crate::domain_model::{CustomerId, UserId};
use crate::domain_port::{IdentityStore, IdentityStoreError};
use dashmap::DashMap;

/// Process-wide identity cache. Unbounded, never evicts, lost on restart.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    map: DashMap<UserId, CustomerId>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[async_trait::async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<CustomerId>, IdentityStoreError> {
        Ok(self.map.get(user_id).map(|entry| entry.value().clone()))
    }

    async fn set(
        &self,
        user_id: &UserId,
        customer_id: &CustomerId,
    ) -> Result<(), IdentityStoreError> {
        self.map.insert(user_id.clone(), customer_id.clone());
        Ok(())
    }

    async fn contains(&self, user_id: &UserId) -> Result<bool, IdentityStoreError> {
        Ok(self.map.contains_key(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get() {
        let store = MemoryIdentityStore::new();
        let user = UserId::parse("u1").unwrap();
        assert!(!store.contains(&user).await.unwrap());
        assert_eq!(store.get(&user).await.unwrap(), None);

        store.set(&user, &CustomerId("cus_1".into())).await.unwrap();
        assert!(store.contains(&user).await.unwrap());
        assert_eq!(
            store.get(&user).await.unwrap(),
            Some(CustomerId("cus_1".into()))
        );
        assert!(!store.is_empty());
    }
}
