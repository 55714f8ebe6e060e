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

use crate::error::{ScopeError, ScopeResult};
use crate::identity::{Compartment, CompartmentCache, CompartmentLister, IdentityClient};
use crate::monitoring::{MetricAggregator, MetricQuery, MonitoringClient, RowSink};
use crate::namespace::{NamespaceCache, ObjectStorageClient};
use crate::scope::matrix::cross_product;
use crate::scope::{ConnectionConfig, Scope};
use std::sync::Arc;
use tracing::info;

/// Builder for constructing a [`Session`].
///
/// The configuration is validated in [`build`](Self::build) before any
/// client or cache is retained, so a session never exists for a bad region list.
///
/// # Examples
///
/// ```no_run
/// use oci_scope::{ConnectionConfig, IdentityClient, Session};
/// use std::sync::Arc;
///
/// # async fn example(identity: Arc<dyn IdentityClient>) -> oci_scope::ScopeResult<()> {
/// let config = ConnectionConfig::new("ocid1.tenancy.oc1..aaaa")
///     .with_regions(["us-ashburn-1", "eu-frankfurt-1"]);
///
/// let session = Session::builder(config)
///     .with_identity(identity)
///     .build()?;
///
/// for scope in session.scopes().await? {
///     println!("{}", scope);
/// }
/// # Ok(())
/// # }
/// ```
pub struct SessionBuilder {
    config: ConnectionConfig,
    identity: Option<Arc<dyn IdentityClient>>,
    monitoring: Option<Arc<dyn MonitoringClient>>,
    object_storage: Option<Arc<dyn ObjectStorageClient>>,
    compartment_cache: Option<Arc<CompartmentCache>>,
}

impl SessionBuilder {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            identity: None,
            monitoring: None,
            object_storage: None,
            compartment_cache: None,
        }
    }

    pub fn with_identity(mut self, client: Arc<dyn IdentityClient>) -> Self {
        self.identity = Some(client);
        self
    }

    pub fn with_monitoring(mut self, client: Arc<dyn MonitoringClient>) -> Self {
        self.monitoring = Some(client);
        self
    }

    pub fn with_object_storage(mut self, client: Arc<dyn ObjectStorageClient>) -> Self {
        self.object_storage = Some(client);
        self
    }

    /// Share an existing compartment cache instead of creating one from the
    /// configured TTL.
    pub fn with_compartment_cache(mut self, cache: Arc<CompartmentCache>) -> Self {
        self.compartment_cache = Some(cache);
        self
    }

    /// Builds the `Session`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the configuration does not validate
    /// or no identity client was supplied.
    pub fn build(self) -> ScopeResult<Session> {
        self.config.validate()?;
        let identity = self
            .identity
            .ok_or_else(|| ScopeError::config("an identity client is required"))?;

        let retry_policy = self.config.retry_policy();
        let cache = self
            .compartment_cache
            .unwrap_or_else(|| Arc::new(CompartmentCache::new(self.config.compartment_cache_ttl())));
        let lister = CompartmentLister::new(
            identity,
            self.config.tenancy_ocid.as_str(),
            retry_policy.clone(),
            Arc::clone(&cache),
        );
        let aggregator = self
            .monitoring
            .map(|client| MetricAggregator::new(client, retry_policy.clone()));
        let namespace = self
            .object_storage
            .map(|client| NamespaceCache::new(client, retry_policy));

        info!(
            "Built session tenancy={} regions={:?} cache_ttl={:?}",
            self.config.tenancy_ocid,
            self.config.regions,
            cache.ttl()
        );

        Ok(Session {
            config: self.config,
            lister,
            cache,
            aggregator,
            namespace,
        })
    }
}

/// Connection-scoped entry point.
///
/// Owns the compartment cache and the namespace memo, so every table query
/// made through one session shares a single compartment listing.
pub struct Session {
    config: ConnectionConfig,
    lister: CompartmentLister,
    cache: Arc<CompartmentCache>,
    aggregator: Option<MetricAggregator>,
    namespace: Option<NamespaceCache>,
}

impl Session {
    pub fn builder(config: ConnectionConfig) -> SessionBuilder {
        SessionBuilder::new(config)
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// All active compartments of the tenancy, root first.
    pub async fn compartments(&self) -> ScopeResult<Arc<Vec<Compartment>>> {
        self.lister.list_all_compartments().await
    }

    /// Every (region, compartment) pair in row-major order.
    ///
    /// Regions are resolved before the compartment listing, so a bad region
    /// configuration fails without an upstream call.
    pub async fn scopes(&self) -> ScopeResult<Vec<Scope>> {
        let regions = self.config.resolve_regions()?;
        let compartments = self.compartments().await?;
        let scopes = cross_product(&regions, &compartments);
        info!(
            "Enumerated scopes regions={} compartments={} scopes={}",
            regions.len(),
            compartments.len(),
            scopes.len()
        );
        Ok(scopes)
    }

    /// One scope per region, for tables that are not compartment scoped.
    pub async fn region_scopes(&self) -> ScopeResult<Vec<Scope>> {
        let regions = self.config.resolve_regions()?;
        Ok(regions.into_iter().map(Scope::region_only).collect())
    }

    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the session has no monitoring client,
    /// otherwise whatever [`MetricAggregator::aggregate`] returns.
    pub async fn aggregate<S>(&self, query: &MetricQuery, sink: &mut S) -> ScopeResult<usize>
    where
        S: RowSink + ?Sized,
    {
        let aggregator = self
            .aggregator
            .as_ref()
            .ok_or_else(|| ScopeError::config("a monitoring client is required"))?;
        aggregator.aggregate(query, sink).await
    }

    /// Object storage namespace of the tenancy, fetched once per session.
    pub async fn namespace(&self, region: &str) -> ScopeResult<&str> {
        let namespace = self
            .namespace
            .as_ref()
            .ok_or_else(|| ScopeError::config("an object storage client is required"))?;
        namespace.get(region).await
    }

    /// Drop the cached compartment list; the next call lists again.
    pub async fn invalidate_compartments(&self) {
        self.cache.invalidate().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, UpstreamError};
    use crate::identity::{CompartmentPage, ListCompartmentsRequest};
    use crate::monitoring::{Granularity, MetricsPage, MonitoringMetricRow, SummarizeMetricsRequest};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TENANCY: &str = "ocid1.tenancy.oc1..root";

    struct StaticIdentity {
        compartments: Vec<Compartment>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IdentityClient for StaticIdentity {
        async fn list_compartments(
            &self,
            _request: &ListCompartmentsRequest,
        ) -> Result<CompartmentPage, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CompartmentPage {
                items: self.compartments.clone(),
                next_page: None,
            })
        }
    }

    struct EmptyMonitoring;

    #[async_trait]
    impl MonitoringClient for EmptyMonitoring {
        async fn summarize_metrics_data(
            &self,
            _region: &str,
            _request: &SummarizeMetricsRequest,
        ) -> Result<MetricsPage, UpstreamError> {
            Ok(MetricsPage {
                items: Vec::new(),
                next_page: None,
            })
        }
    }

    struct FixedStorage;

    #[async_trait]
    impl ObjectStorageClient for FixedStorage {
        async fn get_namespace(&self, _region: &str) -> Result<String, UpstreamError> {
            Ok("tenancy-ns".to_string())
        }
    }

    fn identity() -> Arc<StaticIdentity> {
        Arc::new(StaticIdentity {
            compartments: vec![Compartment::new("c1"), Compartment::new("c2")],
            calls: AtomicUsize::new(0),
        })
    }

    fn config() -> ConnectionConfig {
        ConnectionConfig::new(TENANCY).with_regions(["us-ashburn-1", "us-phoenix-1"])
    }

    fn query() -> MetricQuery {
        MetricQuery {
            granularity: Granularity::Hourly,
            namespace: "oci_computeagent".to_string(),
            metric_name: "CpuUtilization".to_string(),
            dimension_name: "resourceId".to_string(),
            dimension_value: "i1".to_string(),
            compartment_id: "c1".to_string(),
            region: "us-ashburn-1".to_string(),
        }
    }

    #[test]
    fn test_build_rejects_invalid_regions() {
        let err = Session::builder(ConnectionConfig::new(TENANCY).with_regions(["mars-base-1"]))
            .with_identity(identity())
            .build()
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
        match err {
            ScopeError::InvalidConfiguration { invalid_regions, .. } => {
                assert_eq!(invalid_regions, vec!["mars-base-1".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_build_requires_identity() {
        let err = Session::builder(config()).build().err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    }

    #[tokio::test]
    async fn test_scopes_share_one_listing() {
        let identity = identity();
        let session = Session::builder(config())
            .with_identity(Arc::clone(&identity) as Arc<dyn IdentityClient>)
            .build()
            .unwrap();

        let scopes = session.scopes().await.unwrap();
        assert_eq!(scopes.len(), 6);
        assert_eq!(scopes[0], Scope::new("us-ashburn-1", TENANCY));
        assert_eq!(scopes[3], Scope::new("us-phoenix-1", TENANCY));
        assert_eq!(scopes[5], Scope::new("us-phoenix-1", "c2"));

        session.scopes().await.unwrap();
        session.compartments().await.unwrap();
        assert_eq!(identity.calls.load(Ordering::SeqCst), 1);

        session.invalidate_compartments().await;
        session.compartments().await.unwrap();
        assert_eq!(identity.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_injected_cache_is_shared_between_sessions() {
        let identity = identity();
        let cache = Arc::new(CompartmentCache::default());
        for _ in 0..2 {
            let session = Session::builder(config())
                .with_identity(Arc::clone(&identity) as Arc<dyn IdentityClient>)
                .with_compartment_cache(Arc::clone(&cache))
                .build()
                .unwrap();
            session.compartments().await.unwrap();
        }
        assert_eq!(identity.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_region_scopes_use_default_region() {
        let session = Session::builder(ConnectionConfig::new(TENANCY).with_default_region("uk-london-1"))
            .with_identity(identity())
            .build()
            .unwrap();
        assert_eq!(
            session.region_scopes().await.unwrap(),
            vec![Scope::region_only("uk-london-1")]
        );
    }

    #[tokio::test]
    async fn test_aggregate_requires_monitoring() {
        let session = Session::builder(config())
            .with_identity(identity())
            .build()
            .unwrap();
        let mut rows: Vec<MonitoringMetricRow> = Vec::new();
        let err = session.aggregate(&query(), &mut rows).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    }

    #[tokio::test]
    async fn test_aggregate_with_no_data() {
        let session = Session::builder(config())
            .with_identity(identity())
            .with_monitoring(Arc::new(EmptyMonitoring))
            .build()
            .unwrap();
        let mut rows: Vec<MonitoringMetricRow> = Vec::new();
        assert_eq!(session.aggregate(&query(), &mut rows).await.unwrap(), 0);
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_namespace() {
        let session = Session::builder(config())
            .with_identity(identity())
            .with_object_storage(Arc::new(FixedStorage))
            .build()
            .unwrap();
        assert_eq!(session.namespace("us-ashburn-1").await.unwrap(), "tenancy-ns");

        let without = Session::builder(config())
            .with_identity(identity())
            .build()
            .unwrap();
        assert_eq!(
            without.namespace("us-ashburn-1").await.unwrap_err().kind(),
            ErrorKind::InvalidConfiguration
        );
    }
}
