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

use crate::error::UpstreamError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A monitoring query over one namespace and time window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeMetricsRequest {
    pub namespace: String,
    pub compartment_id: String,
    /// Monitoring Query Language expression, e.g. `CpuUtilization[1h]{resourceId="x"}.grouping().max()`
    pub query: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Resolution string such as "5m", "1h" or "1d"
    pub resolution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
}

/// One aggregated value at a timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedDatapoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// One metric stream returned by the monitoring service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricData {
    pub namespace: String,
    pub compartment_id: String,
    pub name: String,
    #[serde(default)]
    pub dimensions: HashMap<String, String>,
    /// Unit and display name reported by the service
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub aggregated_datapoints: Vec<AggregatedDatapoint>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsPage {
    pub items: Vec<MetricData>,
    pub next_page: Option<String>,
}

/// Monitoring service operations used by the metric aggregator.
#[async_trait]
pub trait MonitoringClient: Send + Sync {
    /// Run one page of a metric query in `region`.
    ///
    /// # Errors
    ///
    /// Returns an [`UpstreamError`] with the HTTP status of a rejected query,
    /// or without status if the service could not be reached.
    async fn summarize_metrics_data(
        &self,
        region: &str,
        request: &SummarizeMetricsRequest,
    ) -> Result<MetricsPage, UpstreamError>;
}
