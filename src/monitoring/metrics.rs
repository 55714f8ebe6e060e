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

use super::granularity::Granularity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::ControlFlow;
use tokio::sync::mpsc::UnboundedSender;

/// One statistic value of one compartment at one timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDataPoint {
    pub compartment_id: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Input of one metric aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricQuery {
    pub granularity: Granularity,
    pub namespace: String,
    pub metric_name: String,
    pub dimension_name: String,
    pub dimension_value: String,
    pub compartment_id: String,
    pub region: String,
}

impl MetricQuery {
    /// Base expression `metric[resolution]{dimension="value"}`.
    pub fn base_expression(&self) -> String {
        let value = self.dimension_value.replace('\\', "\\\\").replace('"', "\\\"");
        format!(
            "{}[{}]{{{}=\"{}\"}}",
            self.metric_name,
            self.granularity.resolution(),
            self.dimension_name,
            value
        )
    }
}

/// Joined row of all five statistics for one (timestamp, compartment).
///
/// A statistic is `None` when its query returned no point for the row's key.
/// `None` means no data, it is never a stand-in for zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringMetricRow {
    pub compartment_id: String,
    pub dimension_name: String,
    pub dimension_value: String,
    pub namespace: String,
    pub metric_name: String,
    pub average: Option<f64>,
    pub maximum: Option<f64>,
    pub minimum: Option<f64>,
    pub sample_count: Option<f64>,
    pub sum: Option<f64>,
    pub timestamp: DateTime<Utc>,
    pub metadata: HashMap<String, String>,
    pub region: String,
}

impl MonitoringMetricRow {
    /// Unit passed through from the service metadata, if any.
    pub fn unit(&self) -> Option<&str> {
        self.metadata.get("unit").map(String::as_str)
    }
}

/// Why a sink ended the row stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkStop {
    /// The row was taken and no further rows are wanted.
    Delivered,
    /// The row was not taken.
    Rejected,
}

impl SinkStop {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Destination of streamed metric rows.
///
/// `Continue` means the row was taken. Returning [`ControlFlow::Break`] stops
/// the aggregation early, which lets a host enforce row limits or react to a
/// cancelled query; the [`SinkStop`] says whether that last row was taken.
pub trait RowSink: Send {
    fn emit(&mut self, row: MonitoringMetricRow) -> ControlFlow<SinkStop>;
}

impl RowSink for Vec<MonitoringMetricRow> {
    fn emit(&mut self, row: MonitoringMetricRow) -> ControlFlow<SinkStop> {
        self.push(row);
        ControlFlow::Continue(())
    }
}

/// Streams rows to a receiver; stops once the receiver is dropped.
impl RowSink for UnboundedSender<MonitoringMetricRow> {
    fn emit(&mut self, row: MonitoringMetricRow) -> ControlFlow<SinkStop> {
        match self.send(row) {
            Ok(()) => ControlFlow::Continue(()),
            Err(_) => ControlFlow::Break(SinkStop::Rejected),
        }
    }
}

/// Forwards at most `limit` rows to the wrapped sink.
pub struct LimitedSink<S> {
    inner: S,
    remaining: usize,
}

impl<S: RowSink> LimitedSink<S> {
    pub fn new(inner: S, limit: usize) -> Self {
        Self {
            inner,
            remaining: limit,
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: RowSink> RowSink for LimitedSink<S> {
    fn emit(&mut self, row: MonitoringMetricRow) -> ControlFlow<SinkStop> {
        if self.remaining == 0 {
            return ControlFlow::Break(SinkStop::Rejected);
        }
        self.remaining -= 1;
        if let ControlFlow::Break(stop) = self.inner.emit(row) {
            return ControlFlow::Break(stop);
        }
        if self.remaining == 0 {
            return ControlFlow::Break(SinkStop::Delivered);
        }
        ControlFlow::Continue(())
    }
}
