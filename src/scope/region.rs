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

/// Commercial OCI region identifiers accepted in a connection's region list.
pub const OCI_REGIONS: &[&str] = &[
    "af-johannesburg-1",
    "ap-chuncheon-1",
    "ap-hyderabad-1",
    "ap-melbourne-1",
    "ap-mumbai-1",
    "ap-osaka-1",
    "ap-seoul-1",
    "ap-singapore-1",
    "ap-singapore-2",
    "ap-sydney-1",
    "ap-tokyo-1",
    "ca-montreal-1",
    "ca-toronto-1",
    "eu-amsterdam-1",
    "eu-frankfurt-1",
    "eu-madrid-1",
    "eu-marseille-1",
    "eu-milan-1",
    "eu-paris-1",
    "eu-stockholm-1",
    "eu-zurich-1",
    "il-jerusalem-1",
    "me-abudhabi-1",
    "me-dubai-1",
    "me-jeddah-1",
    "me-riyadh-1",
    "mx-monterrey-1",
    "mx-queretaro-1",
    "sa-bogota-1",
    "sa-santiago-1",
    "sa-saopaulo-1",
    "sa-valparaiso-1",
    "sa-vinhedo-1",
    "uk-cardiff-1",
    "uk-london-1",
    "us-ashburn-1",
    "us-chicago-1",
    "us-phoenix-1",
    "us-sanjose-1",
];

/// Whether `region` is a known OCI region code (case-sensitive, exact match).
pub fn is_valid_region(region: &str) -> bool {
    OCI_REGIONS.contains(&region)
}

/// Return the configured regions that are not in [`OCI_REGIONS`], in input order.
///
/// # Examples
///
/// ```
/// use oci_scope::scope::region::invalid_regions;
///
/// let regions = vec!["us-ashburn-1".to_string(), "mars-base-1".to_string()];
/// assert_eq!(invalid_regions(&regions), vec!["mars-base-1".to_string()]);
/// ```
pub fn invalid_regions<S: AsRef<str>>(regions: &[S]) -> Vec<String> {
    regions
        .iter()
        .map(|r| r.as_ref())
        .filter(|r| !is_valid_region(r))
        .map(str::to_string)
        .collect()
}

/// Fail with [`ScopeError::InvalidConfiguration`] listing every unknown region.
pub fn validate_regions<S: AsRef<str>>(regions: &[S]) -> ScopeResult<()> {
    let invalid = invalid_regions(regions);
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(ScopeError::invalid_regions(invalid))
    }
}
