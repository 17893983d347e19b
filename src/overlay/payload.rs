//! Verdict payload and its on-screen text

use serde::{Deserialize, Serialize};

/// Verdict computed by the downstream analyzer
///
/// All fields are display strings; nothing here is parsed further.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictPayload {
    /// "accept" / "reject" / ...
    pub verdict: String,
    pub amount: String,
    pub net_earnings: String,
    pub reason: String,
}

impl VerdictPayload {
    pub fn new(
        verdict: impl Into<String>,
        amount: impl Into<String>,
        net_earnings: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            verdict: verdict.into(),
            amount: amount.into(),
            net_earnings: net_earnings.into(),
            reason: reason.into(),
        }
    }

    /// Overlay text, e.g. `[ACCEPT] ₹145 → Net: ₹98` followed by the reason
    pub fn display_text(&self) -> String {
        format!(
            "[{}] ₹{} → Net: {}\n{}",
            self.verdict.to_uppercase(),
            self.amount,
            self.net_earnings,
            self.reason
        )
    }
}
