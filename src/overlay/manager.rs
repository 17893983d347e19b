//! Overlay state machine
//!
//! `Hidden` ⇄ `Showing`. A new verdict always replaces the one on screen and
//! every shown surface arms its own expiry timer. Timers carry the
//! `SurfaceToken` of the surface they were armed for, so a timer that outlives
//! its surface finds a different token (or none) and does nothing.

use super::payload::VerdictPayload;
use super::surface::{DisplayPermission, OverlaySurface, SurfaceToken};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

/// How long a verdict stays on screen without interaction
pub const DEFAULT_AUTO_HIDE: Duration = Duration::from_secs(10);

/// Overlay lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Hidden,
    Showing,
}

/// Result of a show request
#[derive(Debug, Clone, PartialEq)]
pub enum ShowResult {
    /// On screen as this surface
    Shown(SurfaceToken),
    /// Permission missing; nothing changed
    PermissionDenied,
    /// The platform refused the surface; state is `Hidden`
    Failed(String),
}

impl ShowResult {
    /// Whether the verdict made it on screen
    pub fn is_shown(&self) -> bool {
        matches!(self, ShowResult::Shown(_))
    }
}

/// The single visible surface; never leaves the manager
struct OverlayHandle {
    token: SurfaceToken,
    payload: VerdictPayload,
    expiry: Option<AbortHandle>,
}

struct OverlayInner {
    next_token: u64,
    current: Option<OverlayHandle>,
}

struct Shared {
    surface: Arc<dyn OverlaySurface>,
    inner: Mutex<OverlayInner>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, OverlayInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Tear down a surface that has already been taken out of `current`
    fn teardown(&self, handle: OverlayHandle) {
        if let Some(expiry) = handle.expiry {
            expiry.abort();
        }
        match self.surface.detach(handle.token) {
            Ok(()) => info!(token = %handle.token, "Overlay hidden"),
            Err(e) => error!(token = %handle.token, error = %e, "Error hiding overlay"),
        }
    }

    fn hide_if_current(&self, token: SurfaceToken) -> bool {
        let mut inner = self.lock();
        let is_current = inner.current.as_ref().is_some_and(|h| h.token == token);
        if !is_current {
            debug!(token = %token, "Stale overlay token, ignoring");
            return false;
        }
        if let Some(handle) = inner.current.take() {
            self.teardown(handle);
        }
        true
    }
}

/// Owns the overlay surface and its lifecycle
pub struct OverlayManager {
    shared: Arc<Shared>,
    permission: Arc<dyn DisplayPermission>,
    auto_hide: Duration,
}

impl OverlayManager {
    /// Manager in `Hidden` state with the default auto-hide delay
    pub fn new(surface: Arc<dyn OverlaySurface>, permission: Arc<dyn DisplayPermission>) -> Self {
        Self {
            shared: Arc::new(Shared {
                surface,
                inner: Mutex::new(OverlayInner {
                    next_token: 1,
                    current: None,
                }),
            }),
            permission,
            auto_hide: DEFAULT_AUTO_HIDE,
        }
    }

    /// Set the auto-hide delay
    pub fn with_auto_hide(mut self, auto_hide: Duration) -> Self {
        self.auto_hide = auto_hide;
        self
    }

    /// Current auto-hide delay
    pub fn auto_hide(&self) -> Duration {
        self.auto_hide
    }

    /// Ask the permission seam whether drawing is allowed
    pub fn can_draw_overlay(&self) -> bool {
        self.permission.can_draw_overlay()
    }

    /// Trigger the host's permission flow
    pub fn request_permission(&self) {
        self.permission.request_permission();
    }

    /// Show a verdict, replacing whatever is on screen
    ///
    /// Arms the expiry timer on the ambient tokio runtime; without one the
    /// overlay stays until hidden explicitly.
    pub fn show(&self, payload: VerdictPayload) -> ShowResult {
        if !self.permission.can_draw_overlay() {
            warn!("Cannot draw overlay - permission not granted");
            return ShowResult::PermissionDenied;
        }

        let mut inner = self.shared.lock();
        if let Some(previous) = inner.current.take() {
            self.shared.teardown(previous);
        }

        let token = SurfaceToken(inner.next_token);
        inner.next_token += 1;

        if let Err(e) = self.shared.surface.attach(token, &payload.display_text()) {
            error!(token = %token, error = %e, "Error showing overlay");
            return ShowResult::Failed(e.to_string());
        }

        let expiry = self.arm_expiry(token);
        info!(token = %token, verdict = %payload.verdict, "Overlay shown");
        inner.current = Some(OverlayHandle {
            token,
            payload,
            expiry,
        });
        ShowResult::Shown(token)
    }

    /// Hide whatever is on screen; returns false if nothing was
    pub fn hide(&self) -> bool {
        let mut inner = self.shared.lock();
        match inner.current.take() {
            Some(handle) => {
                self.shared.teardown(handle);
                true
            }
            None => false,
        }
    }

    /// Hide only if `token` is still the surface on screen
    pub fn dismiss(&self, token: SurfaceToken) -> bool {
        self.shared.hide_if_current(token)
    }

    /// Current state
    pub fn state(&self) -> OverlayState {
        if self.shared.lock().current.is_some() {
            OverlayState::Showing
        } else {
            OverlayState::Hidden
        }
    }

    /// Whether a verdict is currently on screen
    pub fn is_showing(&self) -> bool {
        self.state() == OverlayState::Showing
    }

    /// Token of the surface on screen
    pub fn current_token(&self) -> Option<SurfaceToken> {
        self.shared.lock().current.as_ref().map(|h| h.token)
    }

    /// Verdict on screen
    pub fn current_payload(&self) -> Option<VerdictPayload> {
        self.shared.lock().current.as_ref().map(|h| h.payload.clone())
    }

    fn arm_expiry(&self, token: SurfaceToken) -> Option<AbortHandle> {
        let Ok(runtime) = Handle::try_current() else {
            warn!(token = %token, "No async runtime, overlay will not auto-hide");
            return None;
        };

        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        let delay = self.auto_hide;
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(shared) = shared.upgrade() {
                debug!(token = %token, "Overlay expiry fired");
                shared.hide_if_current(token);
            }
        });
        Some(task.abort_handle())
    }
}

impl Drop for OverlayManager {
    fn drop(&mut self) {
        self.hide();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::surface::StaticPermission;
    use anyhow::{bail, Result};
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Mock surface tracking which tokens are currently attached
    #[derive(Default)]
    struct MockSurface {
        attached: Mutex<BTreeSet<SurfaceToken>>,
        texts: Mutex<Vec<String>>,
        fail_attach: AtomicBool,
        fail_detach: AtomicBool,
    }

    impl MockSurface {
        fn attached(&self) -> Vec<SurfaceToken> {
            self.attached.lock().unwrap().iter().copied().collect()
        }
    }

    impl OverlaySurface for MockSurface {
        fn attach(&self, token: SurfaceToken, text: &str) -> Result<()> {
            if self.fail_attach.load(Ordering::SeqCst) {
                bail!("window manager rejected view");
            }
            self.attached.lock().unwrap().insert(token);
            self.texts.lock().unwrap().push(text.to_string());
            Ok(())
        }

        fn detach(&self, token: SurfaceToken) -> Result<()> {
            if self.fail_detach.load(Ordering::SeqCst) {
                bail!("view not attached to window manager");
            }
            self.attached.lock().unwrap().remove(&token);
            Ok(())
        }
    }

    fn manager(granted: bool) -> (OverlayManager, Arc<MockSurface>) {
        let surface = Arc::new(MockSurface::default());
        let manager = OverlayManager::new(surface.clone(), Arc::new(StaticPermission::new(granted)));
        (manager, surface)
    }

    fn accept() -> VerdictPayload {
        VerdictPayload::new("accept", "145", "₹98", "Good rate per km")
    }

    fn reject() -> VerdictPayload {
        VerdictPayload::new("reject", "40", "₹-5", "Too far for the fare")
    }

    #[test]
    fn test_show_and_hide_without_runtime() {
        let (manager, surface) = manager(true);
        assert_eq!(manager.state(), OverlayState::Hidden);

        let result = manager.show(accept());
        assert!(result.is_shown());
        assert_eq!(manager.state(), OverlayState::Showing);
        assert_eq!(surface.attached().len(), 1);
        assert!(surface.texts.lock().unwrap()[0].starts_with("[ACCEPT]"));

        assert!(manager.hide());
        assert_eq!(manager.state(), OverlayState::Hidden);
        assert!(surface.attached().is_empty());
    }

    #[test]
    fn test_hide_when_hidden_is_noop() {
        let (manager, _surface) = manager(true);
        assert!(!manager.hide());
        assert_eq!(manager.state(), OverlayState::Hidden);
    }

    #[test]
    fn test_permission_denied() {
        let (manager, surface) = manager(false);
        assert_eq!(manager.show(accept()), ShowResult::PermissionDenied);
        assert_eq!(manager.state(), OverlayState::Hidden);
        assert!(surface.attached().is_empty());
    }

    #[test]
    fn test_attach_failure_leaves_hidden() {
        let (manager, surface) = manager(true);
        surface.fail_attach.store(true, Ordering::SeqCst);

        assert!(matches!(manager.show(accept()), ShowResult::Failed(_)));
        assert_eq!(manager.state(), OverlayState::Hidden);
        assert_eq!(manager.current_token(), None);
    }

    #[test]
    fn test_detach_failure_still_resets_state() {
        let (manager, surface) = manager(true);
        manager.show(accept());
        surface.fail_detach.store(true, Ordering::SeqCst);

        assert!(manager.hide());
        assert_eq!(manager.state(), OverlayState::Hidden);
    }

    #[test]
    fn test_reentrant_show_replaces_surface() {
        let (manager, surface) = manager(true);
        let ShowResult::Shown(first) = manager.show(accept()) else {
            panic!("first show failed");
        };
        let ShowResult::Shown(second) = manager.show(reject()) else {
            panic!("second show failed");
        };

        assert_ne!(first, second);
        assert_eq!(surface.attached(), vec![second]);
        assert_eq!(manager.current_payload(), Some(reject()));
    }

    #[test]
    fn test_dismiss_ignores_stale_token() {
        let (manager, _surface) = manager(true);
        let ShowResult::Shown(first) = manager.show(accept()) else {
            panic!("first show failed");
        };
        manager.show(reject());

        assert!(!manager.dismiss(first));
        assert!(manager.is_showing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_hide_after_timeout() {
        let (manager, surface) = manager(true);
        manager.show(accept());

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert!(manager.is_showing());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(manager.state(), OverlayState::Hidden);
        assert!(surface.attached().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_timer_does_not_hide_newer_surface() {
        let (manager, surface) = manager(true);
        manager.show(accept());

        tokio::time::sleep(Duration::from_secs(6)).await;
        let ShowResult::Shown(second) = manager.show(reject()) else {
            panic!("second show failed");
        };

        // first surface's deadline (t=10) passes
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(manager.current_token(), Some(second));
        assert_eq!(surface.attached(), vec![second]);

        // second surface's deadline (t=16) passes
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(manager.state(), OverlayState::Hidden);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_hide_then_timer_is_noop() {
        let (manager, surface) = manager(true);
        manager.show(accept());
        manager.hide();

        tokio::time::sleep(Duration::from_secs(3)).await;
        let ShowResult::Shown(second) = manager.show(reject()) else {
            panic!("second show failed");
        };

        // first timer would have fired at t=10
        tokio::time::sleep(Duration::from_secs(8)).await;
        assert_eq!(manager.current_token(), Some(second));
        assert_eq!(surface.attached(), vec![second]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_auto_hide() {
        let (manager, _surface) = manager(true);
        let manager = manager.with_auto_hide(Duration::from_secs(3));
        manager.show(accept());

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(!manager.is_showing());
    }
}
