//! Display surface and permission seams
//!
//! The overlay manager only decides *when* something is on screen. Drawing it
//! and checking whether drawing is allowed belong to the host platform.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};

/// Identity of one shown surface and the expiry timer armed with it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceToken(pub(crate) u64);

impl SurfaceToken {
    /// Numeric id, unique per manager
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SurfaceToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

/// Platform window that can show one overlay at a time
pub trait OverlaySurface: Send + Sync {
    /// Put `text` on screen as the surface identified by `token`
    fn attach(&self, token: SurfaceToken, text: &str) -> Result<()>;

    /// Remove the surface identified by `token`
    fn detach(&self, token: SurfaceToken) -> Result<()>;
}

/// "Draw over other apps" permission
pub trait DisplayPermission: Send + Sync {
    fn can_draw_overlay(&self) -> bool;

    /// Start the host's permission flow; the result arrives out of band
    fn request_permission(&self);
}

/// Permission with a fixed answer, switchable at runtime
pub struct StaticPermission {
    granted: AtomicBool,
}

impl StaticPermission {
    /// Permission fixed to `granted`
    pub fn new(granted: bool) -> Self {
        Self {
            granted: AtomicBool::new(granted),
        }
    }

    /// Flip the answer, e.g. after the permission flow completes
    pub fn set_granted(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }
}

impl DisplayPermission for StaticPermission {
    fn can_draw_overlay(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    fn request_permission(&self) {
        tracing::info!("Overlay permission requested; grant it in system settings");
    }
}

/// Renders the overlay as a framed banner on stderr
#[derive(Debug, Default)]
pub struct TerminalSurface;

impl TerminalSurface {
    pub fn new() -> Self {
        Self
    }

    fn render(text: &str) -> String {
        let width = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let border = "─".repeat(width + 2);
        let mut out = format!("╭{}╮\n", border);
        for line in text.lines() {
            let pad = width - line.chars().count();
            out.push_str(&format!("│ {}{} │\n", line, " ".repeat(pad)));
        }
        out.push_str(&format!("╰{}╯", border));
        out
    }
}

impl OverlaySurface for TerminalSurface {
    fn attach(&self, _token: SurfaceToken, text: &str) -> Result<()> {
        eprintln!("{}", Self::render(text));
        Ok(())
    }

    fn detach(&self, token: SurfaceToken) -> Result<()> {
        eprintln!("({} dismissed)", token);
        Ok(())
    }
}
