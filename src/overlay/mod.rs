//! Verdict overlay - one transient surface on top of other apps
//!
//! The analyzer's verdict arrives as a `VerdictPayload`; `OverlayManager`
//! puts it on an `OverlaySurface` if `DisplayPermission` allows, replaces it
//! when a newer verdict arrives and removes it after a fixed delay.

pub mod manager;
pub mod payload;
pub mod surface;

pub use manager::{OverlayManager, OverlayState, ShowResult, DEFAULT_AUTO_HIDE};
pub use payload::VerdictPayload;
pub use surface::{DisplayPermission, OverlaySurface, StaticPermission, SurfaceToken, TerminalSurface};
