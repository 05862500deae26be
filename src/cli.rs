//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use tallygate::DEFAULT_COOLDOWN_MS;

/// Count downloads at most once per cooldown window.
///
/// Tallygate reports downloads of a content item to the remote counter
/// service, suppresses repeat triggers inside the cooldown window, and only
/// displays totals the service confirmed.
#[derive(Parser, Debug)]
#[command(name = "tallygate")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the cooldown database
    #[arg(long, global = true, default_value = "tallygate.db")]
    pub db: PathBuf,

    /// Cooldown window in milliseconds (0 counts every trigger)
    #[arg(long, global = true, default_value_t = DEFAULT_COOLDOWN_MS)]
    pub cooldown_ms: u64,

    /// Emit machine-readable JSON instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Trigger a download count for a content item
    Trigger {
        /// Content item identifier
        content_id: String,

        /// Base URL of the counter service
        #[arg(short, long)]
        endpoint: String,

        /// Display count to seed before the trigger, from the item's metadata
        #[arg(short, long)]
        initial: Option<u64>,
    },

    /// Show the stored cooldown state for a content item
    Status {
        /// Content item identifier
        content_id: String,
    },
}

/// Formats a remaining-cooldown duration for human output.
///
/// Rounds up to whole seconds so a nearly elapsed window never reads "0s"
/// while still blocked.
#[must_use]
pub fn format_remaining(remaining_ms: u64) -> String {
    let total_secs = remaining_ms.div_ceil(1000);
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}
