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

//! Query scopes
//!
//! This module turns a connection's configured regions and the discovered
//! compartments into the ordered list of (region, compartment) scopes that
//! drive one listing pass each.

pub mod config;
pub mod matrix;
pub mod region;

pub use config::ConnectionConfig;
pub use matrix::{build_matrix, build_region_matrix, Scope};
pub use region::{invalid_regions, validate_regions, OCI_REGIONS};
