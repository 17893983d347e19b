//! Gig platform classification
//!
//! Package ids vary across OS builds and app flavours (`in.swiggy.android`,
//! `in.swiggy.deliveryapp`, ...), so classification matches a short token by
//! substring containment instead of comparing whole ids.

use serde::{Deserialize, Serialize};

/// Gig platform an offer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Swiggy,
    Zomato,
    Uber,
    Ola,
    Other,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Platform {
    /// Lowercase platform name
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Swiggy => "swiggy",
            Platform::Zomato => "zomato",
            Platform::Uber => "uber",
            Platform::Ola => "ola",
            Platform::Other => "other",
        }
    }
}

/// A token that, when contained in a package id, identifies a platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformRule {
    /// Substring to look for in the package id
    pub token: String,
    /// Platform assigned on match
    pub platform: Platform,
}

impl PlatformRule {
    pub fn new(token: impl Into<String>, platform: Platform) -> Self {
        Self {
            token: token.into(),
            platform,
        }
    }

    /// Whether `package_id` contains the token
    pub fn matches(&self, package_id: &str) -> bool {
        package_id.contains(self.token.as_str())
    }
}

/// Built-in rules in priority order: swiggy > zomato > uber > ola
pub fn default_rules() -> Vec<PlatformRule> {
    vec![
        PlatformRule::new("swiggy", Platform::Swiggy),
        PlatformRule::new("zomato", Platform::Zomato),
        PlatformRule::new("uber", Platform::Uber),
        PlatformRule::new("ola", Platform::Ola),
    ]
}

/// Classify a package id against ordered rules; first match wins
pub fn classify(rules: &[PlatformRule], package_id: &str) -> Platform {
    rules
        .iter()
        .find(|rule| rule.matches(package_id))
        .map(|rule| rule.platform)
        .unwrap_or(Platform::Other)
}
