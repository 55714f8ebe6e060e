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

use super::metrics::{MetricDataPoint, MetricQuery, MonitoringMetricRow, RowSink};
use super::provider::{MetricData, MonitoringClient, SummarizeMetricsRequest};
use crate::error::{ScopeError, ScopeResult};
use crate::util::retry::{retry_with_policy, RetryPolicy};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::ops::ControlFlow;
use std::sync::Arc;
use tracing::{debug, info};

/// Statistic variants queried for every metric row, in query order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    Mean,
    Min,
    Max,
    Sum,
    Count,
}

impl Statistic {
    pub const ALL: [Statistic; 5] = [
        Statistic::Mean,
        Statistic::Min,
        Statistic::Max,
        Statistic::Sum,
        Statistic::Count,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Min => "min",
            Self::Max => "max",
            Self::Sum => "sum",
            Self::Count => "count",
        }
    }

    /// Grouped aggregation of `base`, e.g. `base.grouping().max()`.
    pub fn expression(&self, base: &str) -> String {
        format!("{}.grouping().{}()", base, self.name())
    }
}

impl Display for Statistic {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.name())
    }
}

type JoinKey = (DateTime<Utc>, String);

/// Flatten metric streams into points keyed by their own compartment.
fn data_points(metrics: Vec<MetricData>) -> impl Iterator<Item = MetricDataPoint> {
    metrics.into_iter().flat_map(|metric| {
        let compartment_id = metric.compartment_id;
        metric
            .aggregated_datapoints
            .into_iter()
            .map(move |point| MetricDataPoint {
                compartment_id: compartment_id.clone(),
                value: point.value,
                timestamp: point.timestamp,
            })
    })
}

/// Index a statistic result set by (timestamp, compartment). Later points win on duplicate keys.
fn index_points(metrics: Vec<MetricData>) -> HashMap<JoinKey, f64> {
    data_points(metrics)
        .map(|point| ((point.timestamp, point.compartment_id), point.value))
        .collect()
}

/// Queries the five statistics of a metric and joins them into rows.
///
/// All five queries run one after another and must all succeed before the
/// first row is emitted. The mean result decides which rows exist; the other
/// statistics are attached by exact `(timestamp, compartment_id)` match.
pub struct MetricAggregator {
    client: Arc<dyn MonitoringClient>,
    retry_policy: RetryPolicy,
}

impl MetricAggregator {
    pub fn new(client: Arc<dyn MonitoringClient>, retry_policy: RetryPolicy) -> Self {
        Self {
            client,
            retry_policy,
        }
    }

    /// Aggregate over the granularity's lookback window ending now.
    ///
    /// Returns the number of rows `sink` took; a row it rejected is not counted.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamQueryFailed` naming the statistic whose query failed.
    /// No row is emitted in that case.
    pub async fn aggregate<S>(&self, query: &MetricQuery, sink: &mut S) -> ScopeResult<usize>
    where
        S: RowSink + ?Sized,
    {
        self.aggregate_at(Utc::now(), query, sink).await
    }

    /// Aggregate over the granularity's lookback window ending at `end_time`.
    pub async fn aggregate_at<S>(
        &self,
        end_time: DateTime<Utc>,
        query: &MetricQuery,
        sink: &mut S,
    ) -> ScopeResult<usize>
    where
        S: RowSink + ?Sized,
    {
        let start_time = end_time - query.granularity.lookback();
        let base = query.base_expression();

        let mean = self
            .query_statistic(Statistic::Mean, &base, query, start_time, end_time)
            .await?;
        let minimum = index_points(
            self.query_statistic(Statistic::Min, &base, query, start_time, end_time)
                .await?,
        );
        let maximum = index_points(
            self.query_statistic(Statistic::Max, &base, query, start_time, end_time)
                .await?,
        );
        let sum = index_points(
            self.query_statistic(Statistic::Sum, &base, query, start_time, end_time)
                .await?,
        );
        let count = index_points(
            self.query_statistic(Statistic::Count, &base, query, start_time, end_time)
                .await?,
        );

        let mut emitted = 0;
        for metric in mean {
            for point in &metric.aggregated_datapoints {
                let key: JoinKey = (point.timestamp, metric.compartment_id.clone());
                let row = MonitoringMetricRow {
                    compartment_id: metric.compartment_id.clone(),
                    dimension_name: query.dimension_name.clone(),
                    dimension_value: query.dimension_value.clone(),
                    namespace: query.namespace.clone(),
                    metric_name: query.metric_name.clone(),
                    average: Some(point.value),
                    maximum: maximum.get(&key).copied(),
                    minimum: minimum.get(&key).copied(),
                    sample_count: count.get(&key).copied(),
                    sum: sum.get(&key).copied(),
                    timestamp: point.timestamp,
                    metadata: metric.metadata.clone(),
                    region: query.region.clone(),
                };

                if let ControlFlow::Break(stop) = sink.emit(row) {
                    if stop.is_delivered() {
                        emitted += 1;
                    }
                    info!(
                        "Row sink stopped metric={} dimension={} after rows={}",
                        query.metric_name, query.dimension_value, emitted
                    );
                    return Ok(emitted);
                }
                emitted += 1;
            }
        }

        info!(
            "Aggregated metric={} namespace={} dimension={} region={} granularity={} rows={}",
            query.metric_name,
            query.namespace,
            query.dimension_value,
            query.region,
            query.granularity,
            emitted
        );
        Ok(emitted)
    }

    async fn query_statistic(
        &self,
        statistic: Statistic,
        base: &str,
        query: &MetricQuery,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> ScopeResult<Vec<MetricData>> {
        let mut request = SummarizeMetricsRequest {
            namespace: query.namespace.clone(),
            compartment_id: query.compartment_id.clone(),
            query: statistic.expression(base),
            start_time,
            end_time,
            resolution: query.granularity.resolution().to_string(),
            page: None,
        };
        let operation_name = format!("summarize_metrics_data({})", statistic);
        let mut items = Vec::new();

        loop {
            let page = retry_with_policy(&self.retry_policy, &operation_name, || {
                self.client.summarize_metrics_data(&query.region, &request)
            })
            .await
            .map_err(|e| ScopeError::query_failed(statistic.name(), e))?;
            items.extend(page.items);

            match page.next_page.filter(|token| !token.is_empty()) {
                Some(token) => request.page = Some(token),
                None => break,
            }
        }

        debug!(
            "Queried statistic={} query={} streams={}",
            statistic,
            request.query,
            items.len()
        );
        Ok(items)
    }
}
