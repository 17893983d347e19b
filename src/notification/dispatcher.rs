//! Notification dispatcher - filter gig-platform events and forward offers

use super::channel::{AnalyzerLink, EmitResult};
use super::event::{EventKind, NotificationEvent};
use super::extractor::OfferExtractor;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// Package ids of the supported gig apps
pub const GIG_PACKAGES: [&str; 4] = [
    "in.swiggy.android",
    "com.application.zomato",
    "com.ubercab.driver",
    "com.olacabs.customer",
];

/// Coalescing window the OS applies between notification events
pub const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_millis(100);

/// [`GIG_PACKAGES`] as owned strings
pub fn default_allowed_packages() -> Vec<String> {
    GIG_PACKAGES.iter().map(|p| p.to_string()).collect()
}

/// Event subscription the host registers with the OS
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRegistration {
    /// Event kinds to observe
    pub event_kinds: Vec<EventKind>,
    /// Apps whose events the OS should deliver
    pub package_names: Vec<String>,
    /// Accessibility feedback type
    pub feedback: String,
    /// Minimum gap between delivered events
    pub notification_timeout_ms: u64,
}

/// What happened to one event
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Filtered out before extraction
    Ignored(IgnoreReason),
    /// Offer handed to the analyzer
    Forwarded,
    /// Offer extracted but not delivered
    Dropped(String),
}

/// Why an event was filtered out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Not a posted/changed notification
    NotANotification,
    /// No source app id
    MissingSource,
    /// No notification text
    MissingText,
    /// Source app is not on the allow-list
    NotAllowed,
}

/// Filters raw events, extracts offers, forwards them downstream
///
/// Holds no per-event state: replaying an event repeats the same work.
pub struct NotificationDispatcher {
    allowed_packages: Vec<String>,
    notification_timeout: Duration,
    extractor: OfferExtractor,
    link: AnalyzerLink,
}

impl NotificationDispatcher {
    /// Dispatcher with the default allow-list, forwarding through `link`
    pub fn new(link: AnalyzerLink) -> Self {
        Self {
            allowed_packages: default_allowed_packages(),
            notification_timeout: DEFAULT_NOTIFICATION_TIMEOUT,
            extractor: OfferExtractor::new(),
            link,
        }
    }

    /// Replace the allow-list
    pub fn with_allowed_packages(mut self, packages: Vec<String>) -> Self {
        self.allowed_packages = packages;
        self
    }

    /// Use a custom extractor
    pub fn with_extractor(mut self, extractor: OfferExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Set the coalescing window reported in the registration
    pub fn with_notification_timeout(mut self, timeout: Duration) -> Self {
        self.notification_timeout = timeout;
        self
    }

    /// Analyzer link offers are forwarded through
    pub fn link(&self) -> &AnalyzerLink {
        &self.link
    }

    /// Current allow-list
    pub fn allowed_packages(&self) -> &[String] {
        &self.allowed_packages
    }

    /// Subscription to request from the OS
    pub fn registration(&self) -> ServiceRegistration {
        ServiceRegistration {
            event_kinds: vec![EventKind::NotificationStateChanged],
            package_names: self.allowed_packages.clone(),
            feedback: "generic".to_string(),
            notification_timeout_ms: self.notification_timeout.as_millis() as u64,
        }
    }

    /// Bidirectional containment: either id may carry a suffix/prefix the other lacks
    pub fn is_gig_package(&self, package_id: &str) -> bool {
        self.allowed_packages
            .iter()
            .any(|allowed| allowed.contains(package_id) || package_id.contains(allowed.as_str()))
    }

    /// Filter, extract and forward one event
    pub fn on_event(&self, event: &NotificationEvent) -> DispatchOutcome {
        if !event.is_notification() {
            return DispatchOutcome::Ignored(IgnoreReason::NotANotification);
        }

        let Some(source) = event.source() else {
            return DispatchOutcome::Ignored(IgnoreReason::MissingSource);
        };

        let Some(text) = event.content() else {
            return DispatchOutcome::Ignored(IgnoreReason::MissingText);
        };

        // an empty id would be contained in every allow-list entry
        if !self.is_gig_package(source) {
            return DispatchOutcome::Ignored(IgnoreReason::NotAllowed);
        }

        debug!(source = %source, "Gig notification received");

        let Some(offer) = self.extractor.extract(source, text) else {
            return DispatchOutcome::Ignored(IgnoreReason::MissingText);
        };

        let platform = offer.platform();
        let can_analyze = offer.can_analyze();
        match self.link.emit(offer) {
            EmitResult::Sent => {
                info!(source = %source, platform = %platform, can_analyze, "Offer forwarded to analyzer");
                DispatchOutcome::Forwarded
            }
            EmitResult::Skipped(reason) | EmitResult::Failed(reason) => {
                DispatchOutcome::Dropped(reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::channel::OfferChannel;
    use crate::notification::extractor::ExtractedOffer;
    use anyhow::Result;
    use std::sync::{Arc, Mutex};

    /// Mock channel that records every emitted offer
    #[derive(Default)]
    struct RecordingChannel {
        offers: Mutex<Vec<ExtractedOffer>>,
    }

    impl RecordingChannel {
        fn count(&self) -> usize {
            self.offers.lock().unwrap().len()
        }
    }

    impl OfferChannel for RecordingChannel {
        fn name(&self) -> &str {
            "recording"
        }

        fn emit(&self, offer: ExtractedOffer) -> Result<()> {
            self.offers.lock().unwrap().push(offer);
            Ok(())
        }
    }

    fn attached_dispatcher() -> (NotificationDispatcher, Arc<RecordingChannel>) {
        let link = AnalyzerLink::new();
        let channel = Arc::new(RecordingChannel::default());
        link.attach(channel.clone());
        (NotificationDispatcher::new(link), channel)
    }

    #[test]
    fn test_forwards_gig_notification() {
        let (dispatcher, channel) = attached_dispatcher();
        let event = NotificationEvent::posted("in.swiggy.android", "New order! ₹145 • 3.2 km away");

        assert_eq!(dispatcher.on_event(&event), DispatchOutcome::Forwarded);
        assert_eq!(channel.count(), 1);
    }

    #[test]
    fn test_forwards_incomplete_offer() {
        let (dispatcher, channel) = attached_dispatcher();
        let event = NotificationEvent::posted("com.ubercab.driver", "You have a new request");

        assert_eq!(dispatcher.on_event(&event), DispatchOutcome::Forwarded);
        let offers = channel.offers.lock().unwrap();
        assert!(!offers[0].can_analyze());
    }

    #[test]
    fn test_ignores_other_event_kinds() {
        let (dispatcher, channel) = attached_dispatcher();
        let event = NotificationEvent::posted("in.swiggy.android", "₹145 • 3.2 km")
            .with_kind(EventKind::Other("window_state_changed".to_string()));

        assert_eq!(
            dispatcher.on_event(&event),
            DispatchOutcome::Ignored(IgnoreReason::NotANotification)
        );
        assert_eq!(channel.count(), 0);
    }

    #[test]
    fn test_ignores_missing_source_or_text() {
        let (dispatcher, _channel) = attached_dispatcher();

        let no_source = NotificationEvent::posted("", "₹145 • 3.2 km");
        assert_eq!(
            dispatcher.on_event(&no_source),
            DispatchOutcome::Ignored(IgnoreReason::MissingSource)
        );

        let mut no_text = NotificationEvent::posted("in.swiggy.android", "");
        assert_eq!(
            dispatcher.on_event(&no_text),
            DispatchOutcome::Ignored(IgnoreReason::MissingText)
        );
        no_text.text = None;
        assert_eq!(
            dispatcher.on_event(&no_text),
            DispatchOutcome::Ignored(IgnoreReason::MissingText)
        );
    }

    #[test]
    fn test_ignores_unlisted_package() {
        let (dispatcher, channel) = attached_dispatcher();
        let event = NotificationEvent::posted("com.whatsapp", "₹145 • 3.2 km");

        assert_eq!(
            dispatcher.on_event(&event),
            DispatchOutcome::Ignored(IgnoreReason::NotAllowed)
        );
        assert_eq!(channel.count(), 0);
    }

    #[test]
    fn test_bidirectional_containment() {
        let (dispatcher, _channel) = attached_dispatcher();
        // allow-list entry contains the id
        assert!(dispatcher.is_gig_package("com.ubercab"));
        // id contains the allow-list entry
        assert!(dispatcher.is_gig_package("in.swiggy.android.debug"));
        assert!(!dispatcher.is_gig_package("com.rapido.rider"));
    }

    #[test]
    fn test_replay_is_idempotent() {
        let (dispatcher, channel) = attached_dispatcher();
        let event = NotificationEvent::posted("com.olacabs.customer", "Ride ₹210, 6.5 km, 22 mins");

        assert_eq!(dispatcher.on_event(&event), DispatchOutcome::Forwarded);
        assert_eq!(dispatcher.on_event(&event), DispatchOutcome::Forwarded);

        let offers = channel.offers.lock().unwrap();
        assert_eq!(offers.len(), 2);
        assert!(offers[0].same_fields(&offers[1]));
    }

    #[test]
    fn test_detached_analyzer_drops_safely() {
        let dispatcher = NotificationDispatcher::new(AnalyzerLink::new());
        let event = NotificationEvent::posted("in.swiggy.android", "₹145 • 3.2 km");

        assert_eq!(
            dispatcher.on_event(&event),
            DispatchOutcome::Dropped("detached".to_string())
        );
    }

    #[test]
    fn test_registration_scopes_to_allow_list() {
        let dispatcher = NotificationDispatcher::new(AnalyzerLink::new())
            .with_allowed_packages(vec!["com.example.gig".to_string()]);
        let registration = dispatcher.registration();

        assert_eq!(registration.event_kinds, vec![EventKind::NotificationStateChanged]);
        assert_eq!(registration.package_names, vec!["com.example.gig".to_string()]);
        assert_eq!(registration.notification_timeout_ms, 100);
    }
}
