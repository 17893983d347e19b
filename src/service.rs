//! Notification listener service lifecycle
//!
//! Wraps the dispatcher with the hooks the host calls as the OS service and
//! the analyzer-side app come and go.

use crate::config::LensConfig;
use crate::notification::{
    AnalyzerLink, DispatchOutcome, NotificationDispatcher, NotificationEvent, OfferChannel,
    ServiceRegistration,
};
use std::sync::Arc;
use tracing::info;

/// Dispatcher plus the service lifecycle hooks
pub struct LensService {
    dispatcher: NotificationDispatcher,
}

impl LensService {
    /// Build the service from config; no analyzer attached yet
    pub fn new(config: &LensConfig) -> Self {
        let dispatcher = NotificationDispatcher::new(AnalyzerLink::new())
            .with_allowed_packages(config.allowed_packages.clone())
            .with_notification_timeout(config.notification_timeout());
        info!("TruthLens service created");
        Self { dispatcher }
    }

    /// Underlying dispatcher
    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    /// OS service connected; returns the subscription to register
    pub fn connect(&self) -> ServiceRegistration {
        let registration = self.dispatcher.registration();
        info!(
            packages = registration.package_names.len(),
            "TruthLens service connected"
        );
        registration
    }

    /// Host app came up: bind its analyzer channel
    pub fn attach_host(&self, channel: Arc<dyn OfferChannel>) {
        self.dispatcher.link().attach(channel);
    }

    /// Host app went away: unbind the analyzer
    pub fn detach_host(&self) {
        self.dispatcher.link().detach();
    }

    /// Handle one OS event
    pub fn on_event(&self, event: &NotificationEvent) -> DispatchOutcome {
        self.dispatcher.on_event(event)
    }

    /// OS interrupted the service
    pub fn interrupt(&self) {
        info!("TruthLens service interrupted");
    }

    /// Service destroyed: detach and log
    pub fn shutdown(&self) {
        self.detach_host();
        info!("TruthLens service destroyed");
    }
}
