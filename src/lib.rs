//! TruthLens - read gig-platform order notifications and show verdict overlays

pub mod cli;
pub mod config;
pub mod notification;
pub mod overlay;
pub mod service;

pub use config::LensConfig;
pub use notification::{
    extract, AnalyzerLink, DispatchOutcome, EmitResult, EventKind, ExtractedOffer,
    IgnoreReason, MpscOfferChannel, NotificationDispatcher, NotificationEvent, OfferChannel,
    OfferExtractor, Platform, PlatformRule, ServiceRegistration,
};
pub use overlay::{
    DisplayPermission, OverlayManager, OverlayState, OverlaySurface, ShowResult,
    StaticPermission, SurfaceToken, TerminalSurface, VerdictPayload,
};
pub use service::LensService;
