//! Catalog command implementation

use anyhow::Result;

use mindgym::achievements::{AchievementRegistry, UnlockMode};

use super::{format_value, Context};

/// List loaded achievement definitions
pub fn catalog_command(ctx: &Context) -> Result<()> {
    let config = ctx.config()?;
    let registry = AchievementRegistry::load(config.settings.catalog.path.as_deref());

    println!(
        "Catalog version {} ({} variants, {} tiers):\n",
        registry.version(),
        registry.len(),
        registry.total_tiers()
    );

    let mut current_game: Option<&str> = None;
    for definition in registry.definitions() {
        if current_game != Some(definition.game_id.as_str()) {
            println!("  {}", definition.game_id);
            current_game = Some(definition.game_id.as_str());
        }

        let tiers = match definition.mode {
            UnlockMode::BinaryPerfect => format!("{} perfect run", definition.tier(0).icon()),
            UnlockMode::TimeAscending => definition
                .thresholds
                .iter()
                .enumerate()
                .map(|(i, t)| format!("{} <= {}", definition.tier(i).icon(), format_value(*t)))
                .collect::<Vec<_>>()
                .join("  "),
        };
        println!(
            "    {:<10} {:<18} [{}] {}",
            definition.variant_key,
            format!("({})", definition.variant),
            definition.mode.as_str(),
            tiers
        );
    }

    if !registry.rejected().is_empty() {
        println!("\nRejected games:");
        for rejected in registry.rejected() {
            println!("  {}: {}", rejected.game_id, rejected.reason);
        }
    }

    Ok(())
}
