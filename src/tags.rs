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

//! Resource tag merging
//!
//! OCI resources carry freeform tags (`key -> string`) and defined tags
//! (`namespace -> key -> value`). Tables expose both as a single `tags`
//! column. Each upstream resource shape (full resource, summary, ...)
//! implements [`HasTags`] so the merge is written once.

use serde_json::{Map, Value};
use std::collections::HashMap;

pub type FreeformTags = HashMap<String, String>;
pub type DefinedTags = HashMap<String, HashMap<String, Value>>;

/// Access to the tags of an upstream resource shape.
pub trait HasTags {
    fn freeform_tags(&self) -> Option<&FreeformTags>;
    fn defined_tags(&self) -> Option<&DefinedTags>;

    /// Merged tags of this resource, see [`merge_tags`].
    fn tags(&self) -> Option<Map<String, Value>> {
        merge_tags(self.freeform_tags(), self.defined_tags())
    }
}

/// Merge freeform and defined tags into one flat map.
///
/// Freeform tags go in first; keys of every defined-tag namespace are then
/// inserted on top, so a defined tag replaces a freeform tag with the same key.
/// Returns `None` when the resource reports neither kind of tag.
pub fn merge_tags(
    freeform: Option<&FreeformTags>,
    defined: Option<&DefinedTags>,
) -> Option<Map<String, Value>> {
    if freeform.is_none() && defined.is_none() {
        return None;
    }

    let mut tags = Map::new();
    for (key, value) in freeform.into_iter().flatten() {
        tags.insert(key.clone(), Value::String(value.clone()));
    }

    if let Some(defined) = defined {
        // namespace order is not stable, sort so collisions resolve the same way every time
        let mut namespaces: Vec<&String> = defined.keys().collect();
        namespaces.sort();
        for namespace in namespaces {
            for (key, value) in &defined[namespace] {
                tags.insert(key.clone(), value.clone());
            }
        }
    }

    Some(tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Summary {
        freeform: Option<FreeformTags>,
        defined: Option<DefinedTags>,
    }

    impl HasTags for Summary {
        fn freeform_tags(&self) -> Option<&FreeformTags> {
            self.freeform.as_ref()
        }

        fn defined_tags(&self) -> Option<&DefinedTags> {
            self.defined.as_ref()
        }
    }

    fn freeform(pairs: &[(&str, &str)]) -> FreeformTags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_no_tags() {
        assert!(merge_tags(None, None).is_none());
        let summary = Summary {
            freeform: None,
            defined: None,
        };
        assert!(summary.tags().is_none());
    }

    #[test]
    fn test_empty_maps_give_empty_tags() {
        let tags = merge_tags(Some(&FreeformTags::new()), None).unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn test_freeform_only() {
        let tags = merge_tags(Some(&freeform(&[("env", "dev")])), None).unwrap();
        assert_eq!(tags.get("env"), Some(&json!("dev")));
    }

    #[test]
    fn test_defined_overrides_freeform() {
        let defined: DefinedTags = HashMap::from([(
            "Operations".to_string(),
            HashMap::from([
                ("env".to_string(), json!("prod")),
                ("cost_center".to_string(), json!(42)),
            ]),
        )]);
        let summary = Summary {
            freeform: Some(freeform(&[("env", "dev"), ("owner", "team-a")])),
            defined: Some(defined),
        };

        let tags = summary.tags().unwrap();
        assert_eq!(tags.len(), 3);
        assert_eq!(tags.get("env"), Some(&json!("prod")));
        assert_eq!(tags.get("owner"), Some(&json!("team-a")));
        assert_eq!(tags.get("cost_center"), Some(&json!(42)));
    }

    #[test]
    fn test_namespace_collisions_are_deterministic() {
        let defined: DefinedTags = HashMap::from([
            ("b-ns".to_string(), HashMap::from([("k".to_string(), json!("b"))])),
            ("a-ns".to_string(), HashMap::from([("k".to_string(), json!("a"))])),
        ]);
        let tags = merge_tags(None, Some(&defined)).unwrap();
        assert_eq!(tags.get("k"), Some(&json!("b")));
    }
}
