//! Offer extraction from free-form notification text
//!
//! Every field is located by its own ordered list of patterns. The leftmost
//! match across a field's patterns wins and a token that fails to parse counts
//! as no match for that field only, so one odd number never costs the others.
//! New notification formats are supported by adding patterns, not branches.

use super::platform::{classify, default_rules, Platform, PlatformRule};
use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::debug;

/// Currency-marked amount: `₹145`, `₹ 1,250.50`, `Rs. 90`, `INR 300`
static DEFAULT_AMOUNT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![Regex::new(r"(?:₹|\bRs\.?|\bINR)\s*(\d+(?:,\d+)*(?:\.\d{1,2})?)")
        .expect("Invalid amount regex")]
});

static DEFAULT_DISTANCE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![Regex::new(r"(\d+(?:\.\d+)?)\s*(?i:km)").expect("Invalid distance regex")]
});

static DEFAULT_DURATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![Regex::new(r"(\d+)\s*(?i:minutes?|mins?)\b").expect("Invalid duration regex")]
});

static DEFAULT_EXTRACTOR: LazyLock<OfferExtractor> = LazyLock::new(OfferExtractor::new);

/// Structured offer extracted from one notification
///
/// Serialized with the field names the host app already consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedOffer {
    platform: Platform,
    raw_text: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    timestamp: DateTime<Utc>,
    #[serde(rename = "platformOffer", skip_serializing_if = "Option::is_none")]
    offer_amount: Option<Decimal>,
    #[serde(rename = "distance", skip_serializing_if = "Option::is_none")]
    distance_km: Option<f64>,
    #[serde(rename = "estimatedTime", skip_serializing_if = "Option::is_none")]
    estimated_minutes: Option<u32>,
    can_analyze: bool,
}

impl ExtractedOffer {
    /// Build an offer; `can_analyze` is derived from the fields present
    pub fn new(
        platform: Platform,
        raw_text: impl Into<String>,
        timestamp: DateTime<Utc>,
        offer_amount: Option<Decimal>,
        distance_km: Option<f64>,
        estimated_minutes: Option<u32>,
    ) -> Self {
        let can_analyze =
            offer_amount.is_some() && (distance_km.is_some() || estimated_minutes.is_some());
        Self {
            platform,
            raw_text: raw_text.into(),
            timestamp,
            offer_amount,
            distance_km,
            estimated_minutes,
            can_analyze,
        }
    }

    /// Platform the posting app was classified as
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Notification text as received
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// When the extraction ran
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Offered fee, if a currency-marked amount was found
    pub fn offer_amount(&self) -> Option<Decimal> {
        self.offer_amount
    }

    /// Trip distance in kilometres
    pub fn distance_km(&self) -> Option<f64> {
        self.distance_km
    }

    /// Estimated trip time in minutes
    pub fn estimated_minutes(&self) -> Option<u32> {
        self.estimated_minutes
    }

    /// Enough data for a profitability analysis: an amount plus distance or time
    pub fn can_analyze(&self) -> bool {
        self.can_analyze
    }

    /// Compare everything except the extraction timestamp
    pub fn same_fields(&self, other: &ExtractedOffer) -> bool {
        self.platform == other.platform
            && self.raw_text == other.raw_text
            && self.offer_amount == other.offer_amount
            && self.distance_km == other.distance_km
            && self.estimated_minutes == other.estimated_minutes
            && self.can_analyze == other.can_analyze
    }
}

/// Heuristic extractor built from declarative pattern lists
///
/// Every pattern must capture the numeric token in group 1.
#[derive(Debug, Clone)]
pub struct OfferExtractor {
    platform_rules: Vec<PlatformRule>,
    amount_patterns: Vec<Regex>,
    distance_patterns: Vec<Regex>,
    duration_patterns: Vec<Regex>,
}

impl OfferExtractor {
    /// Extractor with the built-in platform rules and patterns
    pub fn new() -> Self {
        Self {
            platform_rules: default_rules(),
            amount_patterns: DEFAULT_AMOUNT_PATTERNS.clone(),
            distance_patterns: DEFAULT_DISTANCE_PATTERNS.clone(),
            duration_patterns: DEFAULT_DURATION_PATTERNS.clone(),
        }
    }

    /// Append a platform rule (checked after the existing ones)
    pub fn with_platform_rule(mut self, rule: PlatformRule) -> Self {
        self.platform_rules.push(rule);
        self
    }

    /// Add an amount pattern
    pub fn with_amount_pattern(mut self, pattern: Regex) -> Self {
        self.amount_patterns.push(pattern);
        self
    }

    /// Add a distance pattern
    pub fn with_distance_pattern(mut self, pattern: Regex) -> Self {
        self.distance_patterns.push(pattern);
        self
    }

    /// Add a duration pattern
    pub fn with_duration_pattern(mut self, pattern: Regex) -> Self {
        self.duration_patterns.push(pattern);
        self
    }

    /// Extract an offer; `None` only when there is no text at all
    pub fn extract(&self, package_id: &str, text: &str) -> Option<ExtractedOffer> {
        if text.is_empty() {
            return None;
        }

        let platform = classify(&self.platform_rules, package_id);
        let offer = ExtractedOffer::new(
            platform,
            text,
            Utc::now(),
            self.extract_amount(text),
            self.extract_distance(text),
            self.extract_minutes(text),
        );

        debug!(
            platform = %platform,
            amount = ?offer.offer_amount,
            distance_km = ?offer.distance_km,
            minutes = ?offer.estimated_minutes,
            can_analyze = offer.can_analyze,
            "Parsed notification"
        );
        Some(offer)
    }

    /// Leftmost currency-marked amount, separators stripped
    pub fn extract_amount(&self, text: &str) -> Option<Decimal> {
        let token = leftmost_capture(&self.amount_patterns, text)?;
        let cleaned = token.replace(',', "");
        match Decimal::from_str(&cleaned) {
            Ok(amount) => Some(amount),
            Err(e) => {
                debug!(token = %token, error = %e, "Unparseable amount token");
                None
            }
        }
    }

    /// Leftmost number followed by `km`
    pub fn extract_distance(&self, text: &str) -> Option<f64> {
        let token = leftmost_capture(&self.distance_patterns, text)?;
        match token.parse::<f64>() {
            Ok(km) if km.is_finite() => Some(km),
            Ok(_) => {
                debug!(token = %token, "Distance token out of range");
                None
            }
            Err(e) => {
                debug!(token = %token, error = %e, "Unparseable distance token");
                None
            }
        }
    }

    /// Leftmost integer followed by a minute unit
    pub fn extract_minutes(&self, text: &str) -> Option<u32> {
        let token = leftmost_capture(&self.duration_patterns, text)?;
        match token.parse::<u32>() {
            Ok(minutes) => Some(minutes),
            Err(e) => {
                debug!(token = %token, error = %e, "Unparseable duration token");
                None
            }
        }
    }
}

impl Default for OfferExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract with the built-in patterns
pub fn extract(package_id: &str, text: &str) -> Option<ExtractedOffer> {
    DEFAULT_EXTRACTOR.extract(package_id, text)
}

/// Group 1 of the match that starts leftmost; ties go to the earlier pattern
fn leftmost_capture<'t>(patterns: &[Regex], text: &'t str) -> Option<&'t str> {
    patterns
        .iter()
        .filter_map(|re| {
            let caps = re.captures(text)?;
            let start = caps.get(0)?.start();
            let token = caps.get(1)?;
            Some((start, token.as_str()))
        })
        .min_by_key(|(start, _)| *start)
        .map(|(_, token)| token)
}
