//! Notification pipeline - from raw OS events to structured offers
//!
//! # Flow
//! 1. `NotificationDispatcher` drops non-notification events and apps outside the allow-list
//! 2. `OfferExtractor` pulls amount, distance and duration out of the text
//! 3. `AnalyzerLink` hands the offer to whatever analyzer the host attached
//!
//! # Example
//! ```ignore
//! use truth_lens::notification::{AnalyzerLink, MpscOfferChannel, NotificationDispatcher, NotificationEvent};
//!
//! let link = AnalyzerLink::new();
//! let (channel, mut offers) = MpscOfferChannel::new("analyzer");
//! link.attach(Arc::new(channel));
//!
//! let dispatcher = NotificationDispatcher::new(link);
//! dispatcher.on_event(&NotificationEvent::posted("in.swiggy.android", "₹145 • 3.2 km"));
//! ```

pub mod channel;
pub mod dispatcher;
pub mod event;
pub mod extractor;
pub mod platform;

pub use channel::{AnalyzerLink, EmitResult, MpscOfferChannel, OfferChannel};
pub use dispatcher::{
    default_allowed_packages, DispatchOutcome, IgnoreReason, NotificationDispatcher,
    ServiceRegistration, GIG_PACKAGES,
};
pub use event::{EventKind, NotificationEvent};
pub use extractor::{extract, ExtractedOffer, OfferExtractor};
pub use platform::{classify, Platform, PlatformRule};
