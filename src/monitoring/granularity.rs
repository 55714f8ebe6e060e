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

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Time bucketing of a metric table.
///
/// Deserialising goes through [`Granularity::parse`], so unknown names fall
/// back to 5 minutes instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Granularity {
    #[serde(rename = "5_MIN")]
    FiveMinutes,
    #[serde(rename = "HOURLY")]
    Hourly,
    #[serde(rename = "DAILY")]
    Daily,
}

impl Granularity {
    /// Map a table granularity name. Unrecognised values fall back to 5 minutes.
    pub fn parse(value: &str) -> Self {
        match value {
            "HOURLY" => Self::Hourly,
            "DAILY" => Self::Daily,
            _ => Self::FiveMinutes,
        }
    }

    /// How far back from now the query window starts.
    pub fn lookback(&self) -> Duration {
        match self {
            Self::FiveMinutes => Duration::days(5),
            Self::Hourly => Duration::days(60),
            Self::Daily => Duration::days(90),
        }
    }

    /// Resolution string used both in the query expression and the request.
    pub const fn resolution(&self) -> &'static str {
        match self {
            Self::FiveMinutes => "5m",
            Self::Hourly => "1h",
            Self::Daily => "1d",
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FiveMinutes => "5_MIN",
            Self::Hourly => "HOURLY",
            Self::Daily => "DAILY",
        }
    }
}

impl From<&str> for Granularity {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for Granularity {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl Display for Granularity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hourly() {
        let granularity = Granularity::parse("HOURLY");
        assert_eq!(granularity, Granularity::Hourly);
        assert_eq!(granularity.lookback(), Duration::days(60));
        assert_eq!(granularity.resolution(), "1h");
    }

    #[test]
    fn test_daily() {
        let granularity = Granularity::parse("DAILY");
        assert_eq!(granularity.lookback(), Duration::days(90));
        assert_eq!(granularity.resolution(), "1d");
    }

    #[test]
    fn test_five_minutes_and_fallback() {
        for value in ["5_MIN", "", "hourly", "WEEKLY"] {
            let granularity = Granularity::from(value);
            assert_eq!(granularity, Granularity::FiveMinutes, "value={}", value);
            assert_eq!(granularity.lookback(), Duration::days(5));
            assert_eq!(granularity.resolution(), "5m");
        }
    }

    #[test]
    fn test_display_matches_table_names() {
        assert_eq!(Granularity::FiveMinutes.to_string(), "5_MIN");
        assert_eq!(Granularity::Hourly.to_string(), "HOURLY");
        assert_eq!(Granularity::Daily.to_string(), "DAILY");
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&Granularity::FiveMinutes).unwrap(),
            "\"5_MIN\""
        );
        let parsed: Granularity = serde_json::from_str("\"DAILY\"").unwrap();
        assert_eq!(parsed, Granularity::Daily);
    }

    #[test]
    fn test_deserialize_unknown_name_falls_back() {
        for name in ["\"WEEKLY\"", "\"hourly\"", "\"\""] {
            let parsed: Granularity = serde_json::from_str(name).unwrap();
            assert_eq!(parsed, Granularity::FiveMinutes, "name={}", name);
        }
    }
}
