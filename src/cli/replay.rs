//! `lens replay` - feed recorded notification events through the dispatcher
//!
//! Each forwarded offer is printed as one JSON line, standing in for the
//! analyzer on the other end of the channel.

use super::input::{open_input, parse_line};
use crate::config::LensConfig;
use crate::notification::{DispatchOutcome, MpscOfferChannel, NotificationEvent};
use crate::service::LensService;
use anyhow::Result;
use clap::Args;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// JSON-lines file of events (stdin if omitted)
    #[arg(long, short)]
    pub input: Option<PathBuf>,
}

/// Per-run counters
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Offers handed to the analyzer
    pub forwarded: usize,
    /// Events filtered out by the dispatcher
    pub ignored: usize,
    /// Offers extracted but not delivered
    pub dropped: usize,
    /// Blank or unparseable lines
    pub skipped: usize,
}

/// Handle `lens replay`; reading runs on the blocking pool
pub async fn handle_replay(args: ReplayArgs, config: &LensConfig) -> Result<()> {
    let config = config.clone();
    let stats = tokio::task::spawn_blocking(move || -> Result<ReplayStats> {
        let input = open_input(args.input.as_deref())?;
        let stdout = io::stdout();
        run_replay(input, stdout.lock(), &config)
    })
    .await??;

    info!(
        forwarded = stats.forwarded,
        ignored = stats.ignored,
        dropped = stats.dropped,
        skipped = stats.skipped,
        "Replay finished"
    );
    Ok(())
}

/// Dispatch every event line of `input`, writing forwarded offers to `out`
pub fn run_replay<R: BufRead, W: Write>(
    input: R,
    mut out: W,
    config: &LensConfig,
) -> Result<ReplayStats> {
    let service = LensService::new(config);
    service.connect();

    let (channel, mut offers) = MpscOfferChannel::new("stdout");
    service.attach_host(Arc::new(channel));

    let mut stats = ReplayStats::default();
    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        let Some(event) = parse_line::<NotificationEvent>(idx + 1, &line) else {
            stats.skipped += 1;
            continue;
        };
        match service.on_event(&event) {
            DispatchOutcome::Forwarded => stats.forwarded += 1,
            DispatchOutcome::Ignored(reason) => {
                debug!(line = idx + 1, ?reason, "Event ignored");
                stats.ignored += 1;
            }
            DispatchOutcome::Dropped(_) => stats.dropped += 1,
        }

        while let Ok(offer) = offers.try_recv() {
            writeln!(out, "{}", serde_json::to_string(&offer)?)?;
        }
    }

    service.shutdown();
    out.flush()?;
    Ok(stats)
}
