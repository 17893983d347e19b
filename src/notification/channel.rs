//! One-way channel from the dispatcher to the downstream analyzer

use super::extractor::ExtractedOffer;
use anyhow::{anyhow, Result};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Emission result
#[derive(Debug, Clone, PartialEq)]
pub enum EmitResult {
    /// Handed to the analyzer
    Sent,
    /// Not delivered on purpose (no host attached)
    Skipped(String),
    /// Delivery failed
    Failed(String),
}

/// Fire-and-forget sink for extracted offers
pub trait OfferChannel: Send + Sync {
    /// Channel name (for logs)
    fn name(&self) -> &str;

    /// Hand an offer over without waiting for a response
    fn emit(&self, offer: ExtractedOffer) -> Result<()>;
}

/// Attachable binding to the analyzer
///
/// The host attaches a channel when it comes up and detaches it when it goes
/// away; emissions in between land nowhere and are reported as skipped.
#[derive(Clone, Default)]
pub struct AnalyzerLink {
    channel: Arc<RwLock<Option<Arc<dyn OfferChannel>>>>,
}

impl AnalyzerLink {
    /// Create a link with no analyzer attached
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the analyzer channel, replacing any previous one
    pub fn attach(&self, channel: Arc<dyn OfferChannel>) {
        info!(channel = channel.name(), "Analyzer attached");
        let mut slot = self.channel.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(channel);
    }

    /// Unbind the analyzer; later emissions are skipped
    pub fn detach(&self) {
        let mut slot = self.channel.write().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slot.take() {
            info!(channel = previous.name(), "Analyzer detached");
        }
    }

    /// Whether an analyzer is currently bound
    pub fn is_attached(&self) -> bool {
        self.channel
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Forward an offer to the bound analyzer, if any
    pub fn emit(&self, offer: ExtractedOffer) -> EmitResult {
        let channel = self
            .channel
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        let Some(channel) = channel else {
            debug!("No analyzer attached, dropping offer");
            return EmitResult::Skipped("detached".to_string());
        };

        match channel.emit(offer) {
            Ok(()) => EmitResult::Sent,
            Err(e) => {
                warn!(channel = channel.name(), error = %e, "Offer emit failed");
                EmitResult::Failed(e.to_string())
            }
        }
    }
}

/// Channel backed by an unbounded tokio mpsc queue
pub struct MpscOfferChannel {
    name: String,
    sender: UnboundedSender<ExtractedOffer>,
}

impl MpscOfferChannel {
    /// Create a channel and the receiver the analyzer reads from
    pub fn new(name: impl Into<String>) -> (Self, UnboundedReceiver<ExtractedOffer>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                name: name.into(),
                sender,
            },
            receiver,
        )
    }
}

impl OfferChannel for MpscOfferChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(&self, offer: ExtractedOffer) -> Result<()> {
        self.sender
            .send(offer)
            .map_err(|_| anyhow!("analyzer receiver closed"))
    }
}
