//! `lens overlay` - drive the verdict overlay from JSON-lines payloads

use super::input::{open_async_input, parse_line};
use crate::config::LensConfig;
use crate::overlay::{OverlayManager, ShowResult, StaticPermission, TerminalSurface, VerdictPayload};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::sleep;
use tracing::{debug, info};

/// How often to check whether the last overlay has expired
const EXPIRY_POLL: Duration = Duration::from_millis(200);

#[derive(Args, Debug)]
pub struct OverlayArgs {
    /// JSON-lines file of verdicts (stdin if omitted)
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Behave as if overlay permission was not granted
    #[arg(long)]
    pub deny_permission: bool,

    /// Override the auto-hide delay
    #[arg(long)]
    pub auto_hide_secs: Option<u64>,

    /// Pause between verdicts (milliseconds)
    #[arg(long, default_value = "0")]
    pub interval_ms: u64,
}

/// Per-run counters
#[derive(Debug, Default, PartialEq, Eq)]
pub struct OverlayStats {
    /// Verdicts put on screen
    pub shown: usize,
    /// Verdicts refused for lack of permission
    pub denied: usize,
    /// Verdicts the surface failed to show
    pub failed: usize,
    /// Blank or unparseable lines
    pub skipped: usize,
}

/// Handle `lens overlay` on a terminal surface
pub async fn handle_overlay(args: OverlayArgs, config: &LensConfig) -> Result<()> {
    let auto_hide = args
        .auto_hide_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.auto_hide());

    let manager = OverlayManager::new(
        Arc::new(TerminalSurface::new()),
        Arc::new(StaticPermission::new(!args.deny_permission)),
    )
    .with_auto_hide(auto_hide);

    let input = open_async_input(args.input.as_deref()).await?;
    let interval = Duration::from_millis(args.interval_ms);
    let stats = run_overlay(input, &manager, interval).await?;

    info!(
        shown = stats.shown,
        denied = stats.denied,
        failed = stats.failed,
        skipped = stats.skipped,
        "Overlay run finished"
    );
    Ok(())
}

/// Show every verdict line of `input`, then wait until the last one expires
pub async fn run_overlay<R: AsyncBufRead + Unpin>(
    input: R,
    manager: &OverlayManager,
    interval: Duration,
) -> Result<OverlayStats> {
    let mut stats = OverlayStats::default();
    let mut lines = input.lines();
    let mut line_no = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let Some(payload) = parse_line::<VerdictPayload>(line_no, &line) else {
            stats.skipped += 1;
            continue;
        };

        match manager.show(payload) {
            ShowResult::Shown(_) => stats.shown += 1,
            ShowResult::PermissionDenied => {
                if stats.denied == 0 {
                    manager.request_permission();
                }
                stats.denied += 1;
            }
            ShowResult::Failed(reason) => {
                debug!(line = line_no, reason = %reason, "Verdict not shown");
                stats.failed += 1;
            }
        }

        if !interval.is_zero() {
            sleep(interval).await;
        }
    }

    while manager.is_showing() {
        sleep(EXPIRY_POLL).await;
    }
    Ok(stats)
}
