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

use crate::error::{ScopeError, ScopeResult, UpstreamError};
use crate::util::retry::{retry_with_policy, RetryPolicy};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

/// Object storage operation returning the tenancy's namespace.
#[async_trait]
pub trait ObjectStorageClient: Send + Sync {
    async fn get_namespace(&self, region: &str) -> Result<String, UpstreamError>;
}

/// Memoised object storage namespace.
///
/// The namespace is tenancy wide, so it is fetched once per session from
/// whichever region asks first. Concurrent first callers share one request;
/// a failed request is not memoised.
pub struct NamespaceCache {
    client: Arc<dyn ObjectStorageClient>,
    retry_policy: RetryPolicy,
    namespace: OnceCell<String>,
}

impl NamespaceCache {
    pub fn new(client: Arc<dyn ObjectStorageClient>, retry_policy: RetryPolicy) -> Self {
        Self {
            client,
            retry_policy,
            namespace: OnceCell::new(),
        }
    }

    /// # Errors
    ///
    /// Returns `UpstreamUnavailable` if the namespace request fails after retries.
    pub async fn get(&self, region: &str) -> ScopeResult<&str> {
        let namespace = self
            .namespace
            .get_or_try_init(|| async {
                let namespace = retry_with_policy(&self.retry_policy, "get_namespace", || {
                    self.client.get_namespace(region)
                })
                .await
                .map_err(|e| ScopeError::unavailable("get_namespace", e))?;
                info!("Resolved object storage namespace={} region={}", namespace, region);
                Ok::<String, ScopeError>(namespace)
            })
            .await?;
        Ok(namespace.as_str())
    }
}
