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
use crate::scope::region::{is_valid_region, validate_regions};
use crate::util::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

/// Environment variables consulted, in order, when no region is configured.
pub const REGION_ENV_VARS: [&str; 2] = ["OCI_REGION", "OCI_CLI_REGION"];

/// Connection configuration shared by every table query of one connection.
///
/// # Examples
///
/// ```
/// use oci_scope::scope::ConnectionConfig;
///
/// let config = ConnectionConfig::new("ocid1.tenancy.oc1..example")
///     .with_regions(["us-ashburn-1", "us-phoenix-1"])
///     .with_option("max_attempts", "3");
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// OCID of the tenancy root compartment
    pub tenancy_ocid: String,

    /// Explicit region list. When absent, a single region is resolved from
    /// `default_region` or the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<String>>,

    /// Region used when `regions` is absent, typically the profile region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_region: Option<String>,

    /// Tuning options.
    ///
    /// - max_attempts: total attempts per upstream call, first try included (default "5")
    /// - retry_base_delay_ms: first backoff delay, doubled per attempt (default "1000")
    /// - compartment_cache_ttl_secs: compartment cache lifetime, "0" or absent never expires
    #[serde(default)]
    pub options: HashMap<String, String>,
}

impl ConnectionConfig {
    pub fn new(tenancy_ocid: impl Into<String>) -> Self {
        Self {
            tenancy_ocid: tenancy_ocid.into(),
            regions: None,
            default_region: None,
            options: Self::default_options(),
        }
    }

    /// Default retry options.
    pub fn default_options() -> HashMap<String, String> {
        [("max_attempts", "5"), ("retry_base_delay_ms", "1000")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = Some(regions.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_default_region(mut self, region: impl Into<String>) -> Self {
        self.default_region = Some(region.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn get_option(&self, key: &str) -> Option<&String> {
        self.options.get(key)
    }

    /// Check the configuration before any session state is built.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::InvalidConfiguration`] if:
    /// * the tenancy OCID is empty
    /// * the explicit region list is empty or contains unknown regions
    pub fn validate(&self) -> ScopeResult<()> {
        if self.tenancy_ocid.trim().is_empty() {
            return Err(ScopeError::config("tenancy_ocid must not be empty"));
        }
        if let Some(regions) = &self.regions {
            check_region_list(regions)?;
        }
        Ok(())
    }

    /// Regions to enumerate: the validated explicit list, or the single fallback region.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::InvalidConfiguration`] under the same rules as
    /// [`validate`](Self::validate), or when no fallback region resolves to a known region.
    pub fn resolve_regions(&self) -> ScopeResult<Vec<String>> {
        match &self.regions {
            Some(regions) => {
                check_region_list(regions)?;
                Ok(regions.clone())
            }
            None => Ok(vec![self.fallback_region()?]),
        }
    }

    /// Region derived from `default_region`, then `OCI_REGION`, then `OCI_CLI_REGION`.
    ///
    /// The first non-empty source wins and must name a known region; a typo is
    /// reported rather than skipped in favour of the next source.
    pub fn fallback_region(&self) -> ScopeResult<String> {
        self.fallback_region_with(|key| std::env::var(key).ok())
    }

    pub(crate) fn fallback_region_with<F>(&self, lookup_env: F) -> ScopeResult<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let region = self
            .default_region
            .iter()
            .cloned()
            .chain(REGION_ENV_VARS.iter().filter_map(|key| lookup_env(key)))
            .find(|region| !region.trim().is_empty())
            .ok_or_else(|| {
                ScopeError::config(format!(
                    "no region configured: set regions, default_region or one of {}",
                    REGION_ENV_VARS.join(", ")
                ))
            })?;
        if !is_valid_region(&region) {
            warn!("Fallback region={} is not a known OCI region", region);
            return Err(ScopeError::invalid_regions(vec![region]));
        }
        Ok(region)
    }

    /// Retry policy built from `max_attempts` and `retry_base_delay_ms`.
    pub fn retry_policy(&self) -> RetryPolicy {
        let default_policy = RetryPolicy::default();
        let max_attempts = self
            .options
            .get("max_attempts")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(default_policy.max_attempts);
        let base_delay = self
            .options
            .get("retry_base_delay_ms")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(default_policy.base_delay);
        RetryPolicy::new(max_attempts, base_delay)
    }

    /// Compartment cache lifetime; `None` keeps the list for the whole session.
    pub fn compartment_cache_ttl(&self) -> Option<Duration> {
        self.options
            .get("compartment_cache_ttl_secs")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

fn check_region_list(regions: &[String]) -> ScopeResult<()> {
    if regions.is_empty() {
        return Err(ScopeError::config("regions must not be an empty list"));
    }
    validate_regions(regions)
}
