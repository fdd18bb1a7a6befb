//! Submit command implementation

use anyhow::{bail, Result};

use mindgym::achievements::ScoreSubmission;

use super::{finish_session, format_value, Context};

/// Record one run and display what it unlocked
pub async fn submit_command(
    ctx: &Context,
    game: &str,
    variant: &str,
    value: f64,
    perfect: bool,
    no_wait: bool,
) -> Result<()> {
    let engine = ctx.engine()?;
    let submission = ScoreSubmission::new(game, variant, value).perfect(perfect);

    let events = match engine.store().try_submit(submission).await {
        Ok(events) => events,
        Err(e) => {
            engine.shutdown_now().await;
            bail!("{}\nRun `mindgym catalog` to list tracked variants.", e);
        }
    };

    if events.is_empty() {
        println!("No new achievements for {}/{}.", game, variant);
    }

    if let Some(history) = engine.store().history(game, variant) {
        let best = history.best.map(format_value).unwrap_or_else(|| "-".to_string());
        println!("Best: {}  Runs: {}", best, history.attempts);
    }

    finish_session(engine, !no_wait).await
}
