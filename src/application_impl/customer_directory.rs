use crate::domain_model::{CustomerId, CustomerRecord, PageRequest};
use crate::domain_port::{PaymentPlatform, PlatformError};
use futures_util::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::sync::Arc;

pub const DEFAULT_PAGE_SIZE: u8 = 100;
pub const DEFAULT_MAX_PAGES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLimits {
    pub page_size: u8,
    pub max_pages: usize,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

struct Cursor {
    starting_after: Option<CustomerId>,
    pages_fetched: usize,
    exhausted: bool,
}

/// Paginated view over the vendor's customer list.
#[derive(Clone)]
pub struct CustomerDirectory {
    platform: Arc<dyn PaymentPlatform>,
    limits: ScanLimits,
}

impl CustomerDirectory {
    pub fn new(platform: Arc<dyn PaymentPlatform>, limits: ScanLimits) -> Self {
        Self { platform, limits }
    }

    pub fn limits(&self) -> ScanLimits {
        self.limits
    }

    /// Streams customer records from the first page on.
    ///
    /// Pages are fetched only as the stream is polled. The stream ends when the
    /// vendor reports no further pages or after `max_pages` fetches, whichever
    /// comes first. A failed fetch is yielded once and ends the stream. Every
    /// call starts a fresh scan.
    pub fn scan(&self) -> BoxStream<'static, Result<CustomerRecord, PlatformError>> {
        let platform = self.platform.clone();
        let limits = self.limits;
        let start = Cursor {
            starting_after: None,
            pages_fetched: 0,
            exhausted: false,
        };

        stream::try_unfold(start, move |cursor| {
            let platform = platform.clone();
            async move {
                if cursor.exhausted || cursor.pages_fetched >= limits.max_pages {
                    return Ok(None);
                }
                let page = platform
                    .list_customers(PageRequest {
                        limit: limits.page_size,
                        starting_after: cursor.starting_after,
                    })
                    .await?;
                let next = Cursor {
                    starting_after: page.data.last().map(|c| c.id.clone()),
                    pages_fetched: cursor.pages_fetched + 1,
                    exhausted: !page.has_more || page.data.is_empty(),
                };
                Ok(Some((page.data, next)))
            }
        })
        .map_ok(|records| stream::iter(records.into_iter().map(Ok::<_, PlatformError>)))
        .try_flatten()
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::FakePaymentPlatform;

    fn directory(platform: &Arc<FakePaymentPlatform>, page_size: u8, max_pages: usize) -> CustomerDirectory {
        CustomerDirectory::new(
            platform.clone(),
            ScanLimits {
                page_size,
                max_pages,
            },
        )
    }

    #[tokio::test]
    async fn scan_is_lazy() {
        let platform = Arc::new(FakePaymentPlatform::new());
        for _ in 0..10 {
            platform.seed_customer(None);
        }
        let mut records = directory(&platform, 3, 10).scan();
        assert_eq!(platform.directory_calls(), 0);

        records.try_next().await.unwrap();
        assert_eq!(platform.directory_calls(), 1);
        for _ in 0..3 {
            records.try_next().await.unwrap();
        }
        assert_eq!(platform.directory_calls(), 2);
    }

    #[tokio::test]
    async fn scan_stops_at_page_ceiling() {
        let platform = Arc::new(FakePaymentPlatform::new());
        for _ in 0..20 {
            platform.seed_customer(None);
        }
        let records: Vec<_> = directory(&platform, 4, 3).scan().try_collect().await.unwrap();
        assert_eq!(records.len(), 12);
        assert_eq!(platform.directory_calls(), 3);
    }

    #[tokio::test]
    async fn scan_stops_when_directory_is_exhausted() {
        let platform = Arc::new(FakePaymentPlatform::new());
        for _ in 0..5 {
            platform.seed_customer(None);
        }
        let records: Vec<_> = directory(&platform, 2, 10).scan().try_collect().await.unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(platform.directory_calls(), 3);
    }

    #[tokio::test]
    async fn scan_is_restartable() {
        let platform = Arc::new(FakePaymentPlatform::new());
        let first = platform.seed_customer(None);
        platform.seed_customer(None);
        let directory = directory(&platform, 1, 10);

        let mut partial = directory.scan();
        partial.try_next().await.unwrap();
        partial.try_next().await.unwrap();

        let again = directory.scan().try_next().await.unwrap().unwrap();
        assert_eq!(again.id, first);
    }

    #[tokio::test]
    async fn scan_error_ends_stream() {
        let platform = Arc::new(FakePaymentPlatform::new());
        platform.seed_customer(None);
        platform.fail_directory(true);

        let mut records = directory(&platform, 10, 10).scan();
        assert!(records.try_next().await.is_err());
        assert!(records.next().await.is_none());
    }
}
