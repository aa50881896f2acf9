//! Property-Based Tests for QUESTAI Core
//!
//! Uses `proptest` to check the quest and difficulty invariants under random
//! event sequences: kill monotonicity, the difficulty floor, generated
//! amount bounds and one-for-one regeneration.

use proptest::prelude::*;

use questai_core::config::{QuestConfig, RewardConfig};
use questai_core::generator::{DifficultyTuning, QuestGenerator};
use questai_core::host::HeadlessHost;
use questai_core::learning::{GameState, QLearning, QuestAction};
use questai_core::manager::QuestManager;
use questai_core::quest::{Quest, QuestKind};
use questai_core::types::{PlayerId, QuestId, TargetId, Timestamp};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_action() -> impl Strategy<Value = QuestAction> {
    prop::sample::select(QuestAction::ALL.to_vec())
}

fn arb_target() -> impl Strategy<Value = TargetId> {
    prop::sample::select(vec!["minecraft:zombie", "minecraft:skeleton", "minecraft:spider"])
        .prop_map(TargetId::from)
}

// ---------------------------------------------------------------------------
// Property: kill progress is monotone and ends at min(matches, required)
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn kill_progress_monotone(
        required in 1u32..30,
        events in prop::collection::vec(arb_target(), 0..80),
    ) {
        let mut host = HeadlessHost::with_vanilla_names();
        let player = PlayerId::new();
        let zombie = TargetId::from("minecraft:zombie");
        let mut quest = Quest::new(QuestKind::Kill, QuestId::from("kill_prop"), "Kill Zombie", zombie.clone(), required, &host);

        let mut last = 0;
        for target in &events {
            quest.on_progress_event(player, target, &mut host);
            let now = quest.progress(player, &host);
            prop_assert!(now >= last);
            last = now;
        }
        let matches = u32::try_from(events.iter().filter(|t| **t == zombie).count()).unwrap_or(u32::MAX);
        prop_assert_eq!(last, matches.min(required));
        prop_assert_eq!(quest.is_completed(player), matches >= required);
    }
}

// ---------------------------------------------------------------------------
// Property: reward pays once, whatever the call count
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn reward_idempotent(calls in 1usize..6, kind_is_kill in any::<bool>()) {
        let mut host = HeadlessHost::with_vanilla_names();
        let player = PlayerId::new();
        let kind = if kind_is_kill { QuestKind::Kill } else { QuestKind::Collection };
        let mut quest = Quest::new(kind, QuestId::from("prop"), "Prop", TargetId::from("minecraft:dirt"), 3, &host);
        let rewards = RewardConfig::default();

        let granted = (0..calls).filter(|_| quest.reward(player, &mut host, &rewards)).count();
        prop_assert_eq!(granted, 1);
        prop_assert!(quest.is_completed(player));
        prop_assert!(quest.is_rewarded(player));
    }
}

// ---------------------------------------------------------------------------
// Property: difficulty never drops below 1, modifiers never underflow
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn difficulty_floor(
        actions in prop::collection::vec(arb_action(), 0..60),
        failures in prop::collection::vec(any::<bool>(), 0..60),
    ) {
        let mut tuning = DifficultyTuning::default();
        for (i, action) in actions.iter().enumerate() {
            tuning.apply_action(*action);
            if failures.get(i).copied().unwrap_or(false) {
                tuning.record_failure();
            } else {
                tuning.record_completion();
            }
            prop_assert!(tuning.level >= 1);
        }
    }

    #[test]
    fn repeated_decrease_mobs_stays_at_one(n in 1usize..100) {
        let mut tuning = DifficultyTuning::default();
        for _ in 0..n {
            tuning.apply_action(QuestAction::DecreaseMobs);
        }
        prop_assert_eq!(tuning.level, 1);
        prop_assert_eq!(tuning.enemy_modifier, 0);
    }
}

// ---------------------------------------------------------------------------
// Property: generated amounts stay within [1, tier cap]
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn generated_amount_bounds(
        seed in any::<u64>(),
        level in 1u32..20,
        modifier in 0u32..40,
        kill in any::<bool>(),
    ) {
        let host = HeadlessHost::with_vanilla_names();
        let mut generator = QuestGenerator::seeded(seed);
        let mut tuning = DifficultyTuning::at_level(level);
        tuning.enemy_modifier = modifier;
        tuning.item_modifier = modifier;
        let kind = if kill { QuestKind::Kill } else { QuestKind::Collection };

        let quest = generator.generate_quest(kind, tuning.factor(), &tuning, &host);
        let tiers = if kill { &generator.config().enemy } else { &generator.config().item };
        let max_cap = tiers.standard.cap.max(tiers.advanced.cap).max(tiers.extreme.cap);
        prop_assert!(quest.required_amount() >= 1);
        prop_assert!(quest.required_amount() <= max_cap);
        prop_assert_eq!(quest.kind(), kind);
    }
}

// ---------------------------------------------------------------------------
// Property: a sweep replaces completed quests one for one
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn regeneration_is_one_for_one(
        seed in any::<u64>(),
        completed_mask in prop::collection::vec(any::<bool>(), 1..8),
    ) {
        let mut config = QuestConfig::default();
        config.generator.seed = Some(seed);
        config.learning.seed = Some(seed);
        let mut manager = QuestManager::new(config);
        let mut host = HeadlessHost::with_vanilla_names();
        let player = PlayerId::new();
        let target = TargetId::from("minecraft:zombie");

        // Quests that should complete need one kill; the rest need 1000.
        let quests: Vec<Quest> = completed_mask
            .iter()
            .enumerate()
            .map(|(i, done)| {
                Quest::new(
                    QuestKind::Kill,
                    QuestId(format!("kill_prop_{i}")),
                    "Kill Zombie",
                    target.clone(),
                    if *done { 1 } else { 1000 },
                    &host,
                )
            })
            .collect();
        let before = quests.len();
        manager.assign_quests(player, quests);
        manager.on_entity_killed(player, &target, &mut host);

        let report = manager.sweep(player, &mut host, Timestamp(1_000_000));
        let expected = completed_mask.iter().filter(|d| **d).count();
        prop_assert_eq!(report.rewarded.len(), expected);
        prop_assert_eq!(report.replaced.len(), expected);
        prop_assert_eq!(manager.quests_for(player).len(), before);
        prop_assert_eq!(
            manager.quests_for(player).iter().filter(|q| q.kind() == QuestKind::Collection).count(),
            expected
        );
    }
}

// ---------------------------------------------------------------------------
// Property: a single update moves Q towards the target by exactly α
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn single_update_is_alpha_step(reward in -10.0f64..10.0, action in arb_action()) {
        let mut agent = QLearning::seeded(0);
        let state = GameState::new(0, 0, 0, 20, 1);
        let next = state.with_quests_completed(1);
        let q = agent.update(&state, action, reward, &next);
        prop_assert!((q - 0.1 * reward).abs() < 1e-9);
    }
}
