use super::{CustomerDirectory, ScanLimits};
use crate::application_port::{IdentityError, IdentityService};
use crate::domain_model::{CustomerId, NewCustomer, UserId};
use crate::domain_port::{IdentityStore, PaymentPlatform};
use crate::logger::*;
use dashmap::DashMap;
use futures_util::TryStreamExt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Resolves users to vendor customers: cache, then bounded directory scan,
/// then creation.
///
/// Resolutions of the same user are serialized within the process, so two
/// concurrent first-time requests create one vendor record, not two. Separate
/// processes sharing a store can still race.
pub struct RealIdentityService {
    store: Arc<dyn IdentityStore>,
    platform: Arc<dyn PaymentPlatform>,
    directory: CustomerDirectory,
    in_flight: DashMap<UserId, Arc<Mutex<()>>>,
}

impl RealIdentityService {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        platform: Arc<dyn PaymentPlatform>,
        limits: ScanLimits,
    ) -> Self {
        Self {
            store,
            directory: CustomerDirectory::new(platform.clone(), limits),
            platform,
            in_flight: DashMap::new(),
        }
    }

    async fn cached(&self, user_id: &UserId) -> Option<CustomerId> {
        match self.store.get(user_id).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!("identity cache read failed, treating as miss: {e}");
                None
            }
        }
    }

    async fn remember(&self, user_id: &UserId, customer_id: &CustomerId) {
        if let Err(e) = self.store.set(user_id, customer_id).await {
            warn!(%customer_id, "identity cache write failed: {e}");
        }
    }

    /// Scan errors count as "not found".
    async fn search_directory(&self, user_id: &UserId) -> Option<CustomerId> {
        let mut records = self.directory.scan();
        loop {
            match records.try_next().await {
                Ok(Some(record)) if record.belongs_to(user_id) => return Some(record.id),
                Ok(Some(_)) => {}
                Ok(None) => {
                    let limits = self.directory.limits();
                    debug!(
                        page_size = limits.page_size,
                        max_pages = limits.max_pages,
                        "user not found in scanned directory pages"
                    );
                    return None;
                }
                Err(e) => {
                    warn!("customer directory scan failed, treating as not found: {e}");
                    return None;
                }
            }
        }
    }

    async fn resolve_exclusive(&self, user_id: &UserId) -> Result<CustomerId, IdentityError> {
        // another resolver may have finished while we waited for the lock
        if let Some(hit) = self.cached(user_id).await {
            return Ok(hit);
        }

        if let Some(found) = self.search_directory(user_id).await {
            info!(customer_id = %found, "found existing customer in directory");
            self.remember(user_id, &found).await;
            return Ok(found);
        }

        let created = self
            .platform
            .create_customer(NewCustomer {
                user_id: user_id.clone(),
                email: None,
            })
            .await?;
        info!(customer_id = %created.id, "created customer");
        self.remember(user_id, &created.id).await;
        Ok(created.id)
    }
}

#[async_trait::async_trait]
impl IdentityService for RealIdentityService {
    #[tracing::instrument(skip_all, fields(user_id = %user_id))]
    async fn resolve_customer(&self, user_id: &UserId) -> Result<CustomerId, IdentityError> {
        if let Some(hit) = self.cached(user_id).await {
            debug!("identity cache hit");
            return Ok(hit);
        }

        let slot = InFlight::join(&self.in_flight, user_id);
        let _exclusive = slot.lock().lock().await;
        self.resolve_exclusive(user_id).await
    }
}

/// A claim on the per-user lock. Dropping the last claim removes the map
/// entry, also when the resolution future is cancelled mid-flight.
struct InFlight<'a> {
    map: &'a DashMap<UserId, Arc<Mutex<()>>>,
    user_id: &'a UserId,
    lock: Arc<Mutex<()>>,
}

impl<'a> InFlight<'a> {
    fn join(map: &'a DashMap<UserId, Arc<Mutex<()>>>, user_id: &'a UserId) -> Self {
        let lock = map.entry(user_id.clone()).or_default().clone();
        Self { map, user_id, lock }
    }

    fn lock(&self) -> &Mutex<()> {
        &self.lock
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        // two references left: the map's and this claim's
        self.map.remove_if(self.user_id, |_, lock| {
            Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2
        });
    }
}
