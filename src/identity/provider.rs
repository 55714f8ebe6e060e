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
use serde::{Deserialize, Serialize};

/// Lifecycle state reported for compartments that can still be queried.
pub const LIFECYCLE_ACTIVE: &str = "ACTIVE";

/// A compartment (or the tenancy root) resources can be listed in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compartment {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<String>,
}

impl Compartment {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            lifecycle_state: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_lifecycle_state(mut self, state: impl Into<String>) -> Self {
        self.lifecycle_state = Some(state.into());
        self
    }

    /// Active, or no state reported by the service.
    pub fn is_active(&self) -> bool {
        self.lifecycle_state
            .as_deref()
            .map_or(true, |state| state == LIFECYCLE_ACTIVE)
    }
}

/// Access level filter of a compartment listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessLevel {
    /// Every compartment in the subtree, regardless of the caller's permissions
    Any,
    /// Only compartments the caller has access to
    Accessible,
}

/// One page request of a compartment listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCompartmentsRequest {
    /// Parent compartment, the tenancy root for a full listing
    pub compartment_id: String,
    pub compartment_id_in_subtree: bool,
    pub access_level: AccessLevel,
    pub page: Option<String>,
}

impl ListCompartmentsRequest {
    /// First page of a recursive listing under `tenancy_ocid`.
    pub fn subtree(tenancy_ocid: impl Into<String>) -> Self {
        Self {
            compartment_id: tenancy_ocid.into(),
            compartment_id_in_subtree: true,
            access_level: AccessLevel::Any,
            page: None,
        }
    }

    pub fn with_page(mut self, page: Option<String>) -> Self {
        self.page = page;
        self
    }
}

/// One page of compartments and the token of the next page, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompartmentPage {
    pub items: Vec<Compartment>,
    pub next_page: Option<String>,
}

/// Identity service operations needed to enumerate compartments.
///
/// Implementations wrap the OCI identity API client; authentication, transport
/// and request signing belong to the implementation.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Fetch a single page of compartments.
    ///
    /// # Errors
    ///
    /// Returns an [`UpstreamError`] carrying the HTTP status when the service
    /// rejects the request, or no status when it cannot be reached.
    async fn list_compartments(
        &self,
        request: &ListCompartmentsRequest,
    ) -> Result<CompartmentPage, UpstreamError>;
}
