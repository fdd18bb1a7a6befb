//! Unlock evaluation
//!
//! Pure functions: the result depends only on the definition, the prior
//! unlock state and the submission.

use super::definitions::{AchievementDefinition, TierPolicy, UnlockMode};
use super::models::{NotificationEvent, ScoreSubmission, UnlockState};
use super::registry::AchievementRegistry;

/// Why a submission could not be evaluated. State is never changed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("no achievements defined for {game_id}/{variant_key}")]
    LookupMiss {
        game_id: String,
        variant_key: String,
    },

    #[error("invalid score {0}: must be finite and non-negative")]
    InvalidScore(f64),
}

/// Result of evaluating one submission
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub next_state: UnlockState,
    /// Ordered loosest tier to strictest
    pub new_events: Vec<NotificationEvent>,
}

impl Evaluation {
    pub fn changed(&self) -> bool {
        !self.new_events.is_empty()
    }
}

/// Look up the definition for the submission and evaluate it
pub fn evaluate(
    registry: &AchievementRegistry,
    prior: &UnlockState,
    submission: &ScoreSubmission,
) -> Result<Evaluation, EvaluationError> {
    let definition = registry
        .lookup(&submission.game_id, &submission.variant_key)
        .ok_or_else(|| EvaluationError::LookupMiss {
            game_id: submission.game_id.clone(),
            variant_key: submission.variant_key.clone(),
        })?;
    evaluate_definition(definition, prior, submission)
}

/// Compare a submission against one definition
pub fn evaluate_definition(
    definition: &AchievementDefinition,
    prior: &UnlockState,
    submission: &ScoreSubmission,
) -> Result<Evaluation, EvaluationError> {
    if !submission.is_valid() {
        return Err(EvaluationError::InvalidScore(submission.value));
    }

    let mut next_state = prior.resized(definition.tier_count());
    let qualifying = qualifying_tiers(definition, submission);

    let to_unlock: Vec<usize> = match definition.policy {
        TierPolicy::Cascade => qualifying,
        TierPolicy::StrictestOnly => qualifying.last().copied().into_iter().collect(),
    };

    let mut new_events = Vec::with_capacity(to_unlock.len());
    for index in to_unlock {
        if next_state.unlocked[index] {
            continue;
        }
        next_state.unlocked[index] = true;
        new_events.push(NotificationEvent::for_unlock(
            definition,
            index,
            submission.timestamp,
        ));
    }

    Ok(Evaluation {
        next_state,
        new_events,
    })
}

/// Tier indices the submission satisfies, loosest first
fn qualifying_tiers(definition: &AchievementDefinition, submission: &ScoreSubmission) -> Vec<usize> {
    match definition.mode {
        UnlockMode::TimeAscending => definition
            .thresholds
            .iter()
            .enumerate()
            .filter(|(_, threshold)| submission.value <= **threshold)
            .map(|(index, _)| index)
            .collect(),
        UnlockMode::BinaryPerfect if submission.perfect => vec![0],
        UnlockMode::BinaryPerfect => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::definitions::Tier;
    use crate::achievements::variant::VariantSpec;

    fn timed(thresholds: Vec<f64>, policy: TierPolicy) -> AchievementDefinition {
        AchievementDefinition {
            game_id: "digits".to_string(),
            variant_key: "4x4-20".to_string(),
            variant: VariantSpec::ScoreBased {
                size: 4,
                target: Some(20),
            },
            thresholds,
            mode: UnlockMode::TimeAscending,
            policy,
        }
    }

    fn perfect() -> AchievementDefinition {
        AchievementDefinition {
            game_id: "queens".to_string(),
            variant_key: "8-perfect".to_string(),
            variant: VariantSpec::Perfect { size: 8 },
            thresholds: Vec::new(),
            mode: UnlockMode::BinaryPerfect,
            policy: TierPolicy::Cascade,
        }
    }

    fn submit(value: f64) -> ScoreSubmission {
        ScoreSubmission::new("digits", "4x4-20", value)
    }

    #[test]
    fn test_fast_time_unlocks_bronze_then_gold() {
        let def = timed(vec![200.0, 150.0], TierPolicy::Cascade);
        let eval = evaluate_definition(&def, &UnlockState::locked(2), &submit(140.0)).unwrap();

        assert_eq!(eval.next_state.unlocked, vec![true, true]);
        let tiers: Vec<_> = eval.new_events.iter().map(|e| e.tier_index).collect();
        assert_eq!(tiers, vec![0, 1]);
        assert_eq!(eval.new_events[0].tier, Tier::Bronze);
        assert_eq!(eval.new_events[1].tier, Tier::Gold);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let def = timed(vec![200.0, 150.0], TierPolicy::Cascade);
        let eval = evaluate_definition(&def, &UnlockState::locked(2), &submit(200.0)).unwrap();
        assert_eq!(eval.next_state.unlocked, vec![true, false]);
        assert_eq!(eval.new_events.len(), 1);
    }

    #[test]
    fn test_resubmission_is_idempotent() {
        let def = timed(vec![200.0, 150.0], TierPolicy::Cascade);
        let first = evaluate_definition(&def, &UnlockState::locked(2), &submit(180.0)).unwrap();
        let again = evaluate_definition(&def, &first.next_state, &submit(190.0)).unwrap();

        assert!(again.new_events.is_empty());
        assert!(!again.changed());
        assert_eq!(again.next_state, first.next_state);
    }

    #[test]
    fn test_unlocks_never_revert() {
        let def = timed(vec![60.0, 40.0, 25.0], TierPolicy::Cascade);
        let mut state = UnlockState::locked(3);
        let mut previous = state.clone();

        for value in [70.0, 30.0, 90.0, 59.0, 20.0, 1000.0, 0.0] {
            state = evaluate_definition(&def, &state, &submit(value))
                .unwrap()
                .next_state;
            for (before, after) in previous.unlocked.iter().zip(&state.unlocked) {
                assert!(!before || *after, "tier relocked after {value}");
            }
            previous = state.clone();
        }
        assert!(state.is_complete());
    }

    #[test]
    fn test_invalid_scores_are_rejected() {
        let def = timed(vec![200.0], TierPolicy::Cascade);
        let prior = UnlockState::locked(1);
        for value in [f64::NAN, -0.5, f64::INFINITY] {
            let err = evaluate_definition(&def, &prior, &submit(value)).unwrap_err();
            assert!(matches!(err, EvaluationError::InvalidScore(_)));
        }
    }

    #[test]
    fn test_perfect_mode_ignores_value() {
        let def = perfect();
        let prior = UnlockState::locked(1);

        let slow = ScoreSubmission::new("queens", "8-perfect", 9999.0).perfect(true);
        let eval = evaluate_definition(&def, &prior, &slow).unwrap();
        assert_eq!(eval.next_state.unlocked, vec![true]);
        assert_eq!(eval.new_events[0].tier, Tier::Perfect);

        let sloppy = ScoreSubmission::new("queens", "8-perfect", 1.0);
        let eval = evaluate_definition(&def, &prior, &sloppy).unwrap();
        assert!(eval.new_events.is_empty());

        let eval = evaluate_definition(&def, &UnlockState { unlocked: vec![true] }, &slow).unwrap();
        assert!(eval.new_events.is_empty());
    }

    // Cascade is catalog configuration: `cascade = false` keeps looser tiers
    // for slower runs.
    #[test]
    fn test_strictest_only_policy_is_configurable() {
        let def = timed(vec![60.0, 40.0, 25.0], TierPolicy::StrictestOnly);
        let eval = evaluate_definition(&def, &UnlockState::locked(3), &submit(30.0)).unwrap();
        assert_eq!(eval.next_state.unlocked, vec![false, true, false]);
        assert_eq!(eval.new_events.len(), 1);

        let eval = evaluate_definition(&def, &eval.next_state, &submit(50.0)).unwrap();
        assert_eq!(eval.next_state.unlocked, vec![true, true, false]);
    }

    #[test]
    fn test_prior_state_is_normalized_to_tier_count() {
        let def = timed(vec![60.0, 40.0, 25.0], TierPolicy::Cascade);
        let short = UnlockState { unlocked: vec![true] };
        let eval = evaluate_definition(&def, &short, &submit(100.0)).unwrap();
        assert_eq!(eval.next_state.unlocked, vec![true, false, false]);
    }

    #[test]
    fn test_events_are_deterministic() {
        let def = timed(vec![200.0, 150.0], TierPolicy::Cascade);
        let submission = submit(100.0);
        let a = evaluate_definition(&def, &UnlockState::locked(2), &submission).unwrap();
        let b = evaluate_definition(&def, &UnlockState::locked(2), &submission).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.new_events[0].id, a.new_events[1].id);
    }

    #[test]
    fn test_unknown_key_is_lookup_miss() {
        let registry = AchievementRegistry::bundled();
        let submission = ScoreSubmission::new("chess", "8x8", 10.0);
        let err = evaluate(&registry, &UnlockState::default(), &submission).unwrap_err();
        assert!(matches!(err, EvaluationError::LookupMiss { .. }));
    }
}
