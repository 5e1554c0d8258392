//! Generation tiers - fixed resource profiles for one prediction run.
//!
//! A tier is pure configuration chosen at request time. It controls how
//! many outlooks are generated, how deep evidence collection goes, and
//! how long the cached prediction stays fresh.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resource profile for one prediction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Fast,
    Standard,
    Deep,
}

impl Default for Tier {
    fn default() -> Self {
        Tier::Standard
    }
}

impl Tier {
    /// Number of outlooks requested from the model and returned to callers.
    pub fn num_outlooks(&self) -> usize {
        match self {
            Tier::Fast => 3,
            Tier::Standard => 6,
            Tier::Deep => 9,
        }
    }

    /// Result cap for the supporting-evidence search.
    pub fn search_result_cap(&self) -> usize {
        match self {
            Tier::Fast => 3,
            Tier::Standard => 5,
            Tier::Deep => 10,
        }
    }

    /// How many articles get full-content extraction.
    pub fn extract_depth(&self) -> usize {
        match self {
            Tier::Fast => 1,
            Tier::Standard => 3,
            Tier::Deep => 5,
        }
    }

    /// Cache freshness window stamped at generation time.
    pub fn cache_ttl(&self) -> Duration {
        match self {
            Tier::Fast => Duration::hours(3),
            Tier::Standard => Duration::hours(6),
            Tier::Deep => Duration::hours(12),
        }
    }

    /// Overall wall-clock budget for one generation at this tier.
    pub fn deadline(&self) -> std::time::Duration {
        match self {
            Tier::Fast => std::time::Duration::from_secs(60),
            Tier::Standard => std::time::Duration::from_secs(120),
            Tier::Deep => std::time::Duration::from_secs(240),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Fast => "fast",
            Tier::Standard => "standard",
            Tier::Deep => "deep",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fast" => Ok(Tier::Fast),
            "standard" => Ok(Tier::Standard),
            "deep" => Ok(Tier::Deep),
            other => Err(format!("unknown tier: {}", other)),
        }
    }
}
