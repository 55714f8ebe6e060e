// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.
//
// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

use super::provider::{Compartment, IdentityClient, ListCompartmentsRequest};
use crate::error::{ScopeError, ScopeResult};
use crate::util::retry::{retry_with_policy, RetryPolicy};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

struct CachedCompartments {
    compartments: Arc<Vec<Compartment>>,
    fetched_at: Instant,
}

/// Session-scoped cache of the tenancy's compartment list.
///
/// Without a TTL the first successful listing is kept until the cache is
/// dropped or [`invalidate`](Self::invalidate)d, so compartments created or
/// deleted during the session are not seen. Population is single-flight:
/// concurrent callers wait on the in-flight fetch instead of issuing their own.
/// A failed fetch leaves the cache empty.
pub struct CompartmentCache {
    ttl: Option<Duration>,
    state: Mutex<Option<CachedCompartments>>,
}

impl Default for CompartmentCache {
    fn default() -> Self {
        Self::new(None)
    }
}

impl CompartmentCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            state: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Return the cached list, or run `fetch` once and cache its result.
    pub async fn get_or_try_populate<F, Fut>(&self, fetch: F) -> ScopeResult<Arc<Vec<Compartment>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ScopeResult<Vec<Compartment>>>,
    {
        let mut state = self.state.lock().await;

        if let Some(cached) = state.as_ref() {
            if !self.is_expired(cached) {
                debug!(
                    "Compartment cache hit count={}",
                    cached.compartments.len()
                );
                return Ok(Arc::clone(&cached.compartments));
            }
            debug!("Compartment cache expired, refreshing");
        }

        let compartments = Arc::new(fetch().await?);
        *state = Some(CachedCompartments {
            compartments: Arc::clone(&compartments),
            fetched_at: Instant::now(),
        });
        Ok(compartments)
    }

    /// Drop the cached list so the next call fetches again.
    pub async fn invalidate(&self) {
        if self.state.lock().await.take().is_some() {
            info!("Compartment cache invalidated");
        }
    }

    pub async fn is_populated(&self) -> bool {
        self.state.lock().await.is_some()
    }

    fn is_expired(&self, cached: &CachedCompartments) -> bool {
        self.ttl
            .is_some_and(|ttl| cached.fetched_at.elapsed() >= ttl)
    }
}

/// Lists every compartment of a tenancy through the identity service.
pub struct CompartmentLister {
    client: Arc<dyn IdentityClient>,
    tenancy_ocid: String,
    retry_policy: RetryPolicy,
    cache: Arc<CompartmentCache>,
}

impl CompartmentLister {
    pub fn new(
        client: Arc<dyn IdentityClient>,
        tenancy_ocid: impl Into<String>,
        retry_policy: RetryPolicy,
        cache: Arc<CompartmentCache>,
    ) -> Self {
        Self {
            client,
            tenancy_ocid: tenancy_ocid.into(),
            retry_policy,
            cache,
        }
    }

    pub fn tenancy_ocid(&self) -> &str {
        &self.tenancy_ocid
    }

    /// All compartments of the tenancy, root first, served from the cache when populated.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamUnavailable` if any page request still fails after the
    /// retry policy gave up. Nothing is cached in that case.
    pub async fn list_all_compartments(&self) -> ScopeResult<Arc<Vec<Compartment>>> {
        self.cache
            .get_or_try_populate(|| self.list_all_compartments_uncached())
            .await
    }

    /// Same listing as [`list_all_compartments`](Self::list_all_compartments),
    /// always going to the identity service and leaving the cache untouched.
    pub async fn list_all_compartments_uncached(&self) -> ScopeResult<Vec<Compartment>> {
        let mut compartments = vec![Compartment::new(self.tenancy_ocid.as_str())];
        let mut page: Option<String> = None;
        let mut page_count = 0;

        loop {
            let request = ListCompartmentsRequest::subtree(self.tenancy_ocid.as_str())
                .with_page(page.take());
            let result = retry_with_policy(&self.retry_policy, "list_compartments", || {
                self.client.list_compartments(&request)
            })
            .await
            .map_err(|e| ScopeError::unavailable("list_compartments", e))?;
            page_count += 1;

            for compartment in result.items {
                if compartment.id == self.tenancy_ocid {
                    continue;
                }
                if !compartment.is_active() {
                    debug!(
                        "Skipping compartment id={} state={:?}",
                        compartment.id, compartment.lifecycle_state
                    );
                    continue;
                }
                compartments.push(compartment);
            }

            match result.next_page.filter(|token| !token.is_empty()) {
                Some(token) => page = Some(token),
                None => break,
            }
        }

        info!(
            "Listed compartments tenancy={} count={} pages={}",
            self.tenancy_ocid,
            compartments.len(),
            page_count
        );
        Ok(compartments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, UpstreamError};
    use crate::identity::provider::CompartmentPage;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TENANCY: &str = "ocid1.tenancy.oc1..root";

    /// Replays scripted responses in order and records every request.
    struct ScriptedIdentity {
        responses: std::sync::Mutex<VecDeque<Result<CompartmentPage, UpstreamError>>>,
        requests: std::sync::Mutex<Vec<ListCompartmentsRequest>>,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl ScriptedIdentity {
        fn new(responses: Vec<Result<CompartmentPage, UpstreamError>>) -> Self {
            Self {
                responses: std::sync::Mutex::new(responses.into()),
                requests: std::sync::Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl IdentityClient for ScriptedIdentity {
        async fn list_compartments(
            &self,
            request: &ListCompartmentsRequest,
        ) -> Result<CompartmentPage, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(UpstreamError::new(404, "unexpected request")))
        }
    }

    fn page(ids: &[&str], next: Option<&str>) -> Result<CompartmentPage, UpstreamError> {
        Ok(CompartmentPage {
            items: ids.iter().map(|id| Compartment::new(*id)).collect(),
            next_page: next.map(str::to_string),
        })
    }

    fn lister(client: Arc<ScriptedIdentity>, cache: Arc<CompartmentCache>) -> CompartmentLister {
        CompartmentLister::new(
            client,
            TENANCY,
            RetryPolicy::new(5, Duration::from_millis(1)),
            cache,
        )
    }

    fn ids(compartments: &[Compartment]) -> Vec<&str> {
        compartments.iter().map(|c| c.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_root_first_with_empty_subtree() {
        let client = Arc::new(ScriptedIdentity::new(vec![page(&[], None)]));
        let lister = lister(Arc::clone(&client), Arc::new(CompartmentCache::default()));

        let compartments = lister.list_all_compartments().await.unwrap();
        assert_eq!(ids(&compartments), vec![TENANCY]);
    }

    #[tokio::test]
    async fn test_paginates_until_no_next_page() {
        let client = Arc::new(ScriptedIdentity::new(vec![
            page(&["c1", "c2"], Some("p2")),
            page(&["c3"], Some("p3")),
            page(&["c4"], None),
        ]));
        let lister = lister(Arc::clone(&client), Arc::new(CompartmentCache::default()));

        let compartments = lister.list_all_compartments().await.unwrap();
        assert_eq!(ids(&compartments), vec![TENANCY, "c1", "c2", "c3", "c4"]);

        let requests = client.requests.lock().unwrap().clone();
        let pages: Vec<Option<String>> = requests.iter().map(|r| r.page.clone()).collect();
        assert_eq!(
            pages,
            vec![None, Some("p2".to_string()), Some("p3".to_string())]
        );
        assert!(requests
            .iter()
            .all(|r| r.compartment_id_in_subtree && r.compartment_id == TENANCY));
    }

    #[tokio::test]
    async fn test_empty_page_token_ends_listing() {
        let client = Arc::new(ScriptedIdentity::new(vec![page(&["c1"], Some(""))]));
        let lister = lister(Arc::clone(&client), Arc::new(CompartmentCache::default()));

        let compartments = lister.list_all_compartments().await.unwrap();
        assert_eq!(ids(&compartments), vec![TENANCY, "c1"]);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_skips_inactive_and_duplicate_root() {
        let client = Arc::new(ScriptedIdentity::new(vec![Ok(CompartmentPage {
            items: vec![
                Compartment::new(TENANCY),
                Compartment::new("c1").with_lifecycle_state("ACTIVE"),
                Compartment::new("c2").with_lifecycle_state("DELETED"),
                Compartment::new("c3"),
            ],
            next_page: None,
        })]));
        let lister = lister(Arc::clone(&client), Arc::new(CompartmentCache::default()));

        let compartments = lister.list_all_compartments().await.unwrap();
        assert_eq!(ids(&compartments), vec![TENANCY, "c1", "c3"]);
    }

    #[tokio::test]
    async fn test_retries_throttled_page() {
        let client = Arc::new(ScriptedIdentity::new(vec![
            Err(UpstreamError::new(429, "throttled")),
            page(&["c1"], None),
        ]));
        let lister = lister(Arc::clone(&client), Arc::new(CompartmentCache::default()));

        let compartments = lister.list_all_compartments().await.unwrap();
        assert_eq!(ids(&compartments), vec![TENANCY, "c1"]);
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_discards_partial_pages_and_is_not_cached() {
        let client = Arc::new(ScriptedIdentity::new(vec![
            page(&["c1"], Some("p2")),
            Err(UpstreamError::new(401, "not authorized")),
            page(&["c9"], None),
        ]));
        let cache = Arc::new(CompartmentCache::default());
        let lister = lister(Arc::clone(&client), Arc::clone(&cache));

        let err = lister.list_all_compartments().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert!(!cache.is_populated().await);

        // next call fetches again
        let compartments = lister.list_all_compartments().await.unwrap();
        assert_eq!(ids(&compartments), vec![TENANCY, "c9"]);
    }

    #[tokio::test]
    async fn test_exhausted_retries_fail() {
        let client = Arc::new(ScriptedIdentity::new(
            (0..5)
                .map(|_| Err(UpstreamError::new(500, "internal")))
                .collect(),
        ));
        let lister = lister(Arc::clone(&client), Arc::new(CompartmentCache::default()));

        let err = lister.list_all_compartments().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert_eq!(client.calls(), 5);
    }

    #[tokio::test]
    async fn test_cached_result_is_reused() {
        let client = Arc::new(ScriptedIdentity::new(vec![page(&["c1"], None)]));
        let lister = lister(Arc::clone(&client), Arc::new(CompartmentCache::default()));

        let first = lister.list_all_compartments().await.unwrap();
        let second = lister.list_all_compartments().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_uncached_bypasses_cache() {
        let client = Arc::new(ScriptedIdentity::new(vec![
            page(&["c1"], None),
            page(&["c1", "c2"], None),
        ]));
        let cache = Arc::new(CompartmentCache::default());
        let lister = lister(Arc::clone(&client), Arc::clone(&cache));

        lister.list_all_compartments().await.unwrap();
        let fresh = lister.list_all_compartments_uncached().await.unwrap();
        assert_eq!(ids(&fresh), vec![TENANCY, "c1", "c2"]);

        let cached = lister.list_all_compartments().await.unwrap();
        assert_eq!(ids(&cached), vec![TENANCY, "c1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_first_access_fetches_once() {
        let client = Arc::new(
            ScriptedIdentity::new(vec![page(&["c1"], None)]).with_delay(Duration::from_secs(1)),
        );
        let lister = Arc::new(lister(
            Arc::clone(&client),
            Arc::new(CompartmentCache::default()),
        ));

        let (a, b, c) = tokio::join!(
            lister.list_all_compartments(),
            lister.list_all_compartments(),
            lister.list_all_compartments()
        );

        assert_eq!(client.calls(), 1);
        assert_eq!(ids(&a.unwrap()), vec![TENANCY, "c1"]);
        assert_eq!(ids(&b.unwrap()), vec![TENANCY, "c1"]);
        assert_eq!(ids(&c.unwrap()), vec![TENANCY, "c1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry_refreshes() {
        let client = Arc::new(ScriptedIdentity::new(vec![
            page(&["c1"], None),
            page(&["c1", "c2"], None),
        ]));
        let cache = Arc::new(CompartmentCache::new(Some(Duration::from_secs(60))));
        let lister = lister(Arc::clone(&client), cache);

        lister.list_all_compartments().await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(lister.list_all_compartments().await.unwrap().len(), 2);
        assert_eq!(client.calls(), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(lister.list_all_compartments().await.unwrap().len(), 3);
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let client = Arc::new(ScriptedIdentity::new(vec![
            page(&["c1"], None),
            page(&[], None),
        ]));
        let cache = Arc::new(CompartmentCache::default());
        let lister = lister(Arc::clone(&client), Arc::clone(&cache));

        assert_eq!(lister.list_all_compartments().await.unwrap().len(), 2);
        cache.invalidate().await;
        assert!(!cache.is_populated().await);
        assert_eq!(lister.list_all_compartments().await.unwrap().len(), 1);
        assert_eq!(client.calls(), 2);
    }
}
