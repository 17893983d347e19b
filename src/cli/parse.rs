//! `lens parse` - run the extractor on one notification text

use crate::notification::extract;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Package id of the posting app
    #[arg(long, short, default_value = "in.swiggy.android")]
    pub package: String,

    /// Notification text
    pub text: String,
}

pub fn handle_parse(args: ParseArgs) -> Result<()> {
    let offer = extract(&args.package, &args.text);
    println!("{}", serde_json::to_string_pretty(&offer)?);
    Ok(())
}
