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

//! Monitoring metric fan-out
//!
//! A metric table row carries five statistics (mean, min, max, sum, count)
//! of one metric. The monitoring service returns one statistic per query, so
//! [`MetricAggregator`] issues the five queries in sequence and joins their
//! results by `(timestamp, compartment_id)` before streaming rows to a
//! [`RowSink`].
//!
//! ## Modules
//!
//! - [`aggregator`] - Statistic queries and the join
//! - [`granularity`] - Lookback window and resolution per table granularity
//! - [`metrics`] - Query input, joined rows and row sinks
//! - [`provider`] - Monitoring service client trait

pub mod aggregator;
pub mod granularity;
pub mod metrics;
pub mod provider;

pub use aggregator::{MetricAggregator, Statistic};
pub use granularity::Granularity;
pub use metrics::{
    LimitedSink, MetricDataPoint, MetricQuery, MonitoringMetricRow, RowSink, SinkStop,
};
pub use provider::{
    AggregatedDatapoint, MetricData, MetricsPage, MonitoringClient, SummarizeMetricsRequest,
};
