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

//! # OCI Scope
//!
//! Query scoping for Oracle Cloud Infrastructure tables.
//!
//! Most OCI list operations are scoped to one region and one compartment. A
//! table that covers a whole tenancy therefore fans out into one request per
//! (region, compartment) pair. This crate builds that fan-out and the
//! monitoring metric aggregation that sits on top of it.
//!
//! ## Features
//!
//! - **Region validation**: configured regions are checked against the known OCI region codes
//! - **Compartment enumeration**: the full compartment tree, root first, cached per session
//! - **Scope matrix**: every region crossed with every compartment, row-major
//! - **Metric aggregation**: mean, min, max, sum and count joined into one row per timestamp
//! - **Retries**: exponential backoff on throttling and transient server errors
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oci_scope::{
//!     ConnectionConfig, Granularity, IdentityClient, MetricQuery, MonitoringClient,
//!     MonitoringMetricRow, Session,
//! };
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     identity: Arc<dyn IdentityClient>,
//! #     monitoring: Arc<dyn MonitoringClient>,
//! # ) -> oci_scope::ScopeResult<()> {
//! let config = ConnectionConfig::new("ocid1.tenancy.oc1..aaaa")
//!     .with_regions(["us-ashburn-1", "us-phoenix-1"]);
//!
//! let session = Session::builder(config)
//!     .with_identity(identity)
//!     .with_monitoring(monitoring)
//!     .build()?;
//!
//! for scope in session.scopes().await? {
//!     let Some(compartment_id) = scope.compartment_id.clone() else {
//!         continue;
//!     };
//!     let query = MetricQuery {
//!         granularity: Granularity::Hourly,
//!         namespace: "oci_computeagent".to_string(),
//!         metric_name: "CpuUtilization".to_string(),
//!         dimension_name: "resourceId".to_string(),
//!         dimension_value: "ocid1.instance.oc1..bbbb".to_string(),
//!         compartment_id,
//!         region: scope.region.clone(),
//!     };
//!     let mut rows: Vec<MonitoringMetricRow> = Vec::new();
//!     session.aggregate(&query, &mut rows).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! [`ConnectionConfig`] carries the tenancy, the optional region list and an
//! options map:
//!
//! - `max_attempts`: total attempts per upstream call, first try included (default `5`)
//! - `retry_base_delay_ms`: first backoff delay (default `1000`)
//! - `compartment_cache_ttl_secs`: compartment list lifetime, unset or `0` keeps it for the session
//!
//! Without a region list the region comes from `default_region`, then the
//! `OCI_REGION` and `OCI_CLI_REGION` environment variables.

pub mod error;
pub mod identity;
pub mod monitoring;
pub mod namespace;
pub mod scope;
pub mod session;
pub mod tags;
pub mod util;

// Re-export commonly used types
pub use error::{ErrorKind, ScopeError, ScopeResult, UpstreamError};
pub use identity::{Compartment, CompartmentCache, CompartmentLister, IdentityClient};
pub use monitoring::{
    Granularity, LimitedSink, MetricAggregator, MetricQuery, MonitoringClient,
    MonitoringMetricRow, RowSink, SinkStop,
};
pub use namespace::ObjectStorageClient;
pub use scope::{build_matrix, build_region_matrix, invalid_regions, ConnectionConfig, Scope};
pub use session::{Session, SessionBuilder};
pub use tags::{merge_tags, HasTags};
