//! CLI command handling

pub mod input;
pub mod overlay;
pub mod parse;
pub mod replay;

pub use overlay::{handle_overlay, run_overlay, OverlayArgs, OverlayStats};
pub use parse::{handle_parse, ParseArgs};
pub use replay::{handle_replay, run_replay, ReplayArgs, ReplayStats};
