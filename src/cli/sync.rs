//! Sync command implementation

use anyhow::Result;

use super::{finish_session, Context};

/// Reconcile stored progress with the catalog and report what changed
pub async fn sync_command(ctx: &Context) -> Result<()> {
    let engine = ctx.engine()?;
    let store = engine.store();

    if store.is_degraded() {
        eprintln!("Warning: stored progress could not be read and was left untouched.");
    }

    let report = store.startup_sync().clone();
    println!("Catalog version: {}", store.registry().version());

    if report.is_empty() {
        println!("Progress is up to date.");
    } else {
        for key in &report.added {
            println!("  + {}", key);
        }
        for key in &report.resized {
            println!("  ~ {}", key);
        }
        for key in &report.pruned {
            println!("  - {}", key);
        }
        println!(
            "\n{} added, {} resized, {} removed",
            report.added.len(),
            report.resized.len(),
            report.pruned.len()
        );
    }

    finish_session(engine, false).await
}
