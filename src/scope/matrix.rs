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

use super::config::ConnectionConfig;
use crate::error::ScopeResult;
use crate::identity::Compartment;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use tracing::{info, warn};

/// One (region, compartment) pair bounding a single listing pass.
///
/// Region-only scopes, used by resources that are not compartment scoped,
/// have no compartment id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    pub region: String,
    pub compartment_id: Option<String>,
}

impl Scope {
    pub fn new(region: impl Into<String>, compartment_id: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            compartment_id: Some(compartment_id.into()),
        }
    }

    pub fn region_only(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            compartment_id: None,
        }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.compartment_id {
            Some(compartment_id) => write!(f, "{}/{}", self.region, compartment_id),
            None => write!(f, "{}", self.region),
        }
    }
}

/// Build the region × compartment matrix in row-major order.
///
/// All compartments of the first region come first, then all compartments of
/// the second region, and so on: `scopes[i * n + j] == (regions[i], compartments[j])`.
/// Compartments with an empty id are skipped for every region.
///
/// # Errors
///
/// Returns `InvalidConfiguration` if the explicit region list contains unknown
/// regions, or if no region list is configured and no fallback region can be
/// resolved.
///
/// # Examples
///
/// ```
/// use oci_scope::identity::Compartment;
/// use oci_scope::scope::{build_matrix, ConnectionConfig, Scope};
///
/// let config = ConnectionConfig::new("ocid1.tenancy.oc1..example")
///     .with_regions(["us-ashburn-1", "us-phoenix-1"]);
/// let compartments = vec![Compartment::new("c1"), Compartment::new("c2")];
///
/// let scopes = build_matrix(&config, &compartments).unwrap();
/// assert_eq!(scopes[1], Scope::new("us-ashburn-1", "c2"));
/// assert_eq!(scopes[2], Scope::new("us-phoenix-1", "c1"));
/// ```
pub fn build_matrix(
    config: &ConnectionConfig,
    compartments: &[Compartment],
) -> ScopeResult<Vec<Scope>> {
    let regions = config.resolve_regions()?;
    Ok(cross_product(&regions, compartments))
}

/// Build the region-only matrix: one scope per configured region, or one
/// scope for the fallback region.
pub fn build_region_matrix(config: &ConnectionConfig) -> ScopeResult<Vec<Scope>> {
    let regions = config.resolve_regions()?;
    Ok(regions.into_iter().map(Scope::region_only).collect())
}

pub(crate) fn cross_product(regions: &[String], compartments: &[Compartment]) -> Vec<Scope> {
    let usable: Vec<&Compartment> = compartments
        .iter()
        .filter(|c| !c.id.trim().is_empty())
        .collect();

    let skipped = compartments.len() - usable.len();
    if skipped > 0 {
        warn!("Skipping count={} compartments with an empty id", skipped);
    }

    let usable = &usable;
    let scopes: Vec<Scope> = regions
        .iter()
        .flat_map(move |region| {
            usable
                .iter()
                .map(move |compartment| Scope::new(region.as_str(), compartment.id.as_str()))
        })
        .collect();

    info!(
        "Built scope matrix regions={} compartments={} scopes={}",
        regions.len(),
        compartments.len() - skipped,
        scopes.len()
    );
    scopes
}
