//! Page-by-page retrieval shared by every paginated listing.

use axum_helpers::ShutdownCoordinator;
use std::future::Future;
use tracing::{debug, warn};

use crate::providers::ProviderResult;

/// Upper bound on pages fetched for one listing.
pub const MAX_PAGES: u32 = 10_000;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn first(size: u32) -> Self {
        Self { number: 1, size }
    }

    pub fn next(self) -> Self {
        Self {
            number: self.number + 1,
            size: self.size,
        }
    }
}

/// One page of records plus the provider-reported total, when it reports one.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: Option<u64>) -> Self {
        Self { items, total_count }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }
}

/// Records accumulated by [`paginate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: u32,
    /// Shutdown interrupted the listing before it was exhausted
    pub cancelled: bool,
}

/// Fetch pages starting at 1 until the listing is exhausted.
///
/// Stops when a page comes back empty, shorter than `page_size`, or once the
/// accumulated count reaches the provider-reported total. Shutdown is checked
/// before every fetch; if it fires, the records gathered so far are returned
/// with `cancelled` set. The first failing page aborts the listing.
pub async fn paginate<T, F, Fut>(
    label: &str,
    page_size: u32,
    shutdown: &ShutdownCoordinator,
    mut fetch: F,
) -> ProviderResult<Paginated<T>>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = ProviderResult<Page<T>>>,
{
    let mut items = Vec::new();
    let mut request = PageRequest::first(page_size);
    let mut pages = 0u32;

    loop {
        if shutdown.is_shutting_down() {
            warn!(listing = label, pages = pages, "Pagination interrupted by shutdown");
            return Ok(Paginated {
                items,
                pages,
                cancelled: true,
            });
        }

        let page = fetch(request).await?;
        pages += 1;

        let received = page.items.len();
        items.extend(page.items);
        debug!(
            listing = label,
            page = request.number,
            received = received,
            accumulated = items.len(),
            "Fetched page"
        );

        if received == 0 || received < page_size as usize {
            break;
        }
        if let Some(total) = page.total_count {
            if items.len() as u64 >= total {
                break;
            }
        }
        if pages >= MAX_PAGES {
            warn!(listing = label, pages = pages, "Page limit reached, stopping");
            break;
        }

        request = request.next();
    }

    Ok(Paginated {
        items,
        pages,
        cancelled: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Stub listing serving `full_pages` pages of `size` then one of `tail`.
    fn stub(
        full_pages: u32,
        size: u32,
        tail: u32,
        calls: Arc<AtomicU32>,
    ) -> impl FnMut(PageRequest) -> std::future::Ready<ProviderResult<Page<u32>>> {
        move |request: PageRequest| {
            calls.fetch_add(1, Ordering::SeqCst);
            let len = if request.number <= full_pages {
                size
            } else if request.number == full_pages + 1 {
                tail
            } else {
                0
            };
            let items = (0..len).map(|i| (request.number - 1) * size + i).collect();
            std::future::ready(Ok(Page::new(items, None)))
        }
    }

    #[tokio::test]
    async fn test_full_pages_then_partial_page() {
        let calls = Arc::new(AtomicU32::new(0));
        let shutdown = ShutdownCoordinator::new();

        let result = paginate("stub", 100, &shutdown, stub(3, 100, 42, calls.clone()))
            .await
            .unwrap();

        assert_eq!(result.items.len(), 3 * 100 + 42);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(result.pages, 4);
        assert!(!result.cancelled);
        assert_eq!(result.items[341], 341);
    }

    #[tokio::test]
    async fn test_empty_first_page() {
        let calls = Arc::new(AtomicU32::new(0));
        let shutdown = ShutdownCoordinator::new();

        let result = paginate("stub", 100, &shutdown, stub(0, 100, 0, calls.clone()))
            .await
            .unwrap();

        assert!(result.items.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exact_multiple_needs_one_empty_page() {
        let calls = Arc::new(AtomicU32::new(0));
        let shutdown = ShutdownCoordinator::new();

        let result = paginate("stub", 10, &shutdown, stub(2, 10, 0, calls.clone()))
            .await
            .unwrap();

        assert_eq!(result.items.len(), 20);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_reported_total_stops_early() {
        let calls = Arc::new(AtomicU32::new(0));
        let shutdown = ShutdownCoordinator::new();

        let result = paginate("stub", 2, &shutdown, |request: PageRequest| {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(Page::new(vec![request.number; 2], Some(4))))
        })
        .await
        .unwrap();

        assert_eq!(result.items, vec![1, 1, 2, 2]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_echoed_full_pages_are_capped() {
        let calls = Arc::new(AtomicU32::new(0));
        let shutdown = ShutdownCoordinator::new();

        let result = paginate("echo", 1, &shutdown, |_request: PageRequest| {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(Page::new(vec![0u8], None)))
        })
        .await
        .unwrap();

        assert_eq!(result.pages, MAX_PAGES);
        assert_eq!(calls.load(Ordering::SeqCst), MAX_PAGES);
    }

    #[tokio::test]
    async fn test_cancellation_before_second_page() {
        let calls = Arc::new(AtomicU32::new(0));
        let shutdown = ShutdownCoordinator::new();
        let trigger = shutdown.clone();

        let result = paginate("stub", 5, &shutdown, |request: PageRequest| {
            calls.fetch_add(1, Ordering::SeqCst);
            // Shutdown lands while the first page is in flight.
            trigger.shutdown();
            std::future::ready(Ok(Page::new(vec![request.number; 5], None)))
        })
        .await
        .unwrap();

        assert_eq!(result.items, vec![1; 5]);
        assert!(result.cancelled);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_fetches_nothing() {
        let calls = Arc::new(AtomicU32::new(0));
        let shutdown = ShutdownCoordinator::new();
        shutdown.shutdown();

        let result = paginate("stub", 5, &shutdown, stub(1, 5, 0, calls.clone()))
            .await
            .unwrap();

        assert!(result.items.is_empty());
        assert!(result.cancelled);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_aborts_listing() {
        let calls = Arc::new(AtomicU32::new(0));
        let shutdown = ShutdownCoordinator::new();

        let result = paginate("stub", 2, &shutdown, |request: PageRequest| {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(if request.number == 1 {
                Ok(Page::new(vec![1, 2], None))
            } else {
                Err(ProviderError::Parse("truncated body".to_string()))
            })
        })
        .await;

        assert!(matches!(result, Err(ProviderError::Parse(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
