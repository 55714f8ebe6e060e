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

//! Compartment discovery through the OCI identity service
//!
//! The [`IdentityClient`] trait abstracts the paginated, subtree-scoped
//! compartment listing. [`CompartmentLister`] walks every page under the
//! shared retry policy and keeps the result in a session-owned
//! [`CompartmentCache`].

pub mod compartments;
pub mod provider;

pub use compartments::{CompartmentCache, CompartmentLister};
pub use provider::{
    AccessLevel, Compartment, CompartmentPage, IdentityClient, ListCompartmentsRequest,
};
