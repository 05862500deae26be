//! CLI entry point for tallygate.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tallygate::{
    CooldownPolicy, CooldownStore, Database, DownloadGate, HttpCounterClient, SqliteCooldownStore,
    TriggerDecision, TriggerOutcome, now_epoch_ms,
};
use tracing::debug;

mod cli;

use cli::{Args, Command, format_remaining};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let db = Database::new(&args.db).await?;
    let store = Arc::new(SqliteCooldownStore::new(db));
    let policy = CooldownPolicy::new(args.cooldown_ms);

    match args.command {
        Command::Trigger {
            content_id,
            endpoint,
            initial,
        } => {
            let counter = Arc::new(HttpCounterClient::new(&endpoint)?);
            let gate = DownloadGate::new(store, counter, policy);

            if let Some(initial_total) = initial {
                gate.observe(&content_id, initial_total);
            }

            let outcome = gate.trigger(&content_id).await;
            report_trigger(&content_id, outcome, args.json)?;
        }
        Command::Status { content_id } => {
            report_status(&content_id, store.as_ref(), &policy, args.json).await;
        }
    }

    Ok(())
}

/// Prints a trigger outcome and converts a failed increment into a nonzero
/// exit code.
fn report_trigger(content_id: &str, outcome: TriggerOutcome, json: bool) -> Result<()> {
    if json {
        let payload = match outcome {
            TriggerOutcome::Counted { total } => serde_json::json!({
                "content_id": content_id,
                "outcome": "counted",
                "total": total,
            }),
            TriggerOutcome::OnCooldown { remaining_ms } => serde_json::json!({
                "content_id": content_id,
                "outcome": "on_cooldown",
                "remaining_ms": remaining_ms,
            }),
            TriggerOutcome::AlreadyInFlight => serde_json::json!({
                "content_id": content_id,
                "outcome": "already_in_flight",
            }),
            TriggerOutcome::Failed => serde_json::json!({
                "content_id": content_id,
                "outcome": "failed",
            }),
        };
        println!("{payload}");
    } else {
        match outcome {
            TriggerOutcome::Counted { total } => {
                println!("{content_id}: counted, total {total}");
            }
            TriggerOutcome::OnCooldown { remaining_ms } => {
                println!(
                    "{content_id}: on cooldown, {} remaining",
                    format_remaining(remaining_ms)
                );
            }
            TriggerOutcome::AlreadyInFlight => {
                println!("{content_id}: increment already in flight");
            }
            TriggerOutcome::Failed => {}
        }
    }

    if outcome == TriggerOutcome::Failed {
        anyhow::bail!("counter increment failed for {content_id}");
    }
    Ok(())
}

/// Prints the stored cooldown state for a content item.
async fn report_status(
    content_id: &str,
    store: &dyn CooldownStore,
    policy: &CooldownPolicy,
    json: bool,
) {
    let record = store.retrieve(content_id).await;
    let now_ms = now_epoch_ms();
    let decision = policy.classify(record.as_ref(), now_ms);

    if json {
        let payload = match decision {
            TriggerDecision::Allowed => serde_json::json!({
                "content_id": content_id,
                "allowed": true,
                "last_accepted_at_ms": record.map(|r| r.last_accepted_at_ms),
            }),
            TriggerDecision::Blocked { remaining_ms } => serde_json::json!({
                "content_id": content_id,
                "allowed": false,
                "last_accepted_at_ms": record.map(|r| r.last_accepted_at_ms),
                "remaining_ms": remaining_ms,
            }),
        };
        println!("{payload}");
    } else {
        match (record, decision) {
            (None, _) => {
                println!("{content_id}: no accepted trigger on record, next trigger counts");
            }
            (Some(_), TriggerDecision::Allowed) => {
                println!("{content_id}: cooldown elapsed, next trigger counts");
            }
            (Some(_), TriggerDecision::Blocked { remaining_ms }) => {
                println!(
                    "{content_id}: on cooldown, {} remaining",
                    format_remaining(remaining_ms)
                );
            }
        }
    }
}
