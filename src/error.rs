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

use crate::util::retry::RetryableError;
use std::fmt::{Display, Formatter, Result as FmtResult};
use thiserror::Error;

/// Error returned by an upstream OCI service client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (status={status:?})")]
pub struct UpstreamError {
    /// HTTP status, or `None` when the request never reached the service
    pub status: Option<u16>,
    pub message: String,
}

impl UpstreamError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Transport level failure without an HTTP status.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

impl RetryableError for UpstreamError {
    fn status_code(&self) -> Option<u16> {
        self.status
    }
}

/// Stable classification of [`ScopeError`] for hosts that branch on the failure type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidConfiguration,
    UpstreamUnavailable,
    UpstreamQueryFailed,
}

impl ErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration => "InvalidConfiguration",
            Self::UpstreamUnavailable => "UpstreamUnavailable",
            Self::UpstreamQueryFailed => "UpstreamQueryFailed",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur while enumerating scopes or aggregating metrics
#[derive(Error, Debug)]
pub enum ScopeError {
    /// Connection configuration is unusable; the host should refuse the connection.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
        invalid_regions: Vec<String>,
    },

    /// Listing failed after the retry policy gave up.
    #[error("Upstream unavailable during {operation}: {source}")]
    UpstreamUnavailable {
        operation: String,
        #[source]
        source: UpstreamError,
    },

    /// One of the statistic queries of a metric aggregation failed.
    #[error("Metric query failed for statistic {statistic}: {source}")]
    UpstreamQueryFailed {
        statistic: String,
        #[source]
        source: UpstreamError,
    },
}

impl ScopeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfiguration { .. } => ErrorKind::InvalidConfiguration,
            Self::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            Self::UpstreamQueryFailed { .. } => ErrorKind::UpstreamQueryFailed,
        }
    }

    /// Configuration error that is not about regions.
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
            invalid_regions: Vec::new(),
        }
    }

    pub fn invalid_regions(invalid_regions: Vec<String>) -> Self {
        Self::InvalidConfiguration {
            message: format!(
                "unsupported region(s): {}",
                invalid_regions.join(", ")
            ),
            invalid_regions,
        }
    }

    pub fn unavailable(operation: impl Into<String>, source: UpstreamError) -> Self {
        Self::UpstreamUnavailable {
            operation: operation.into(),
            source,
        }
    }

    pub fn query_failed(statistic: impl Into<String>, source: UpstreamError) -> Self {
        Self::UpstreamQueryFailed {
            statistic: statistic.into(),
            source,
        }
    }
}

/// Result type for scope and metric operations
pub type ScopeResult<T> = Result<T, ScopeError>;
