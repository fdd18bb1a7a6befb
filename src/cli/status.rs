//! Status command implementation

use anyhow::Result;

use super::{finish_session, format_value, Context};

/// Show unlocked tiers and score history per key
pub async fn status_command(ctx: &Context, game: Option<&str>) -> Result<()> {
    let engine = ctx.engine()?;
    let store = engine.store();
    let registry = store.registry();

    if store.is_degraded() {
        eprintln!("Warning: stored progress could not be read, showing empty progress.");
    }

    let summary = store.summary();
    let games: Vec<_> = summary
        .games
        .iter()
        .filter(|g| game.is_none_or(|id| g.game_id == id))
        .collect();

    if games.is_empty() {
        match game {
            Some(id) => println!("No achievements for game: {}", id),
            None => println!("No achievements defined."),
        }
        return finish_session(engine, false).await;
    }

    println!(
        "Achievements: {}/{} ({:.0}%)\n",
        summary.unlocked,
        summary.total,
        summary.completion() * 100.0
    );

    for game_summary in games {
        println!(
            "  {} ({}/{})",
            game_summary.game_id, game_summary.unlocked, game_summary.total
        );

        for definition in registry.for_game(&game_summary.game_id) {
            let state = store
                .unlock_state(&definition.game_id, &definition.variant_key)
                .unwrap_or_default();

            let tiers: Vec<String> = (0..definition.tier_count())
                .map(|i| {
                    let mark = if state.is_unlocked(i) {
                        definition.tier(i).icon().to_string()
                    } else {
                        "·".to_string()
                    };
                    match definition.threshold(i) {
                        Some(threshold) => format!("{} {}", mark, format_value(threshold)),
                        None => mark,
                    }
                })
                .collect();

            print!("    {:<10} {}", definition.variant_key, tiers.join("  "));

            if let Some(history) = store.history(&definition.game_id, &definition.variant_key) {
                if history.attempts > 0 {
                    let best = history.best.map(format_value).unwrap_or_else(|| "-".to_string());
                    print!("   best {} in {} runs", best, history.attempts);
                }
            }
            println!();
        }
        println!();
    }

    finish_session(engine, false).await
}
