//! Headless quest simulation.
//!
//! Runs a few simulated players against a [`QuestSystem`] backed by the
//! configured database: they hunt, gather, sometimes die, and visit the
//! quest board every few rounds. Useful for watching the difficulty
//! controller adapt without a game server.
//!
//! ```text
//! questai-sim [config.toml] [rounds]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use questai_core::host::HeadlessHost;
use questai_core::types::{PlayerId, Timestamp};
use questai_host::bridge::normalize_target;
use questai_host::config::IN_MEMORY;
use questai_host::{HostConfig, QuestSystem, hooks, init_tracing};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

const PLAYERS: [&str; 3] = ["Steve", "Alex", "Notch"];
const ROUND_MS: u64 = 1_000;
const BOARD_EVERY: u32 = 5;
const DEATH_CHANCE: f64 = 0.03;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => HostConfig::from_file(Path::new(&path))
            .with_context(|| format!("failed to load config from {path}"))?,
        None => HostConfig {
            database_path: IN_MEMORY.into(),
            ..HostConfig::default()
        },
    };
    let rounds: u32 = args
        .next()
        .map(|r| r.parse::<u32>())
        .transpose()
        .context("rounds must be a positive integer")?
        .unwrap_or(50);

    init_tracing(&config);
    let store = config.open_store().context("failed to open quest database")?;

    let generator = &config.quest.generator;
    let mobs: Vec<&str> = [&generator.enemy.standard, &generator.enemy.advanced, &generator.enemy.extreme]
        .iter()
        .flat_map(|tier| tier.targets.iter().map(String::as_str))
        .collect();
    let items: Vec<&str> = [&generator.item.standard, &generator.item.advanced, &generator.item.extreme]
        .iter()
        .flat_map(|tier| tier.targets.iter().map(String::as_str))
        .collect();

    let mut system =
        QuestSystem::new(config.quest.clone(), store).with_save_on_death(config.save_on_death);
    let mut host = HeadlessHost::with_vanilla_names();
    let mut rng = rand::thread_rng();

    let players: Vec<PlayerId> = PLAYERS.iter().map(|h| system.player_for(h)).collect();
    let mut now = Timestamp::now();
    for &player in &players {
        system.handle(&hooks::on_login(player, now), &mut host);
    }

    for round in 1..=rounds {
        now = now.plus_millis(ROUND_MS);
        for &player in &players {
            if let Some(mob) = mobs.choose(&mut rng) {
                host.record_kill(player);
                system.handle(&hooks::on_entity_killed(player, mob, now), &mut host);
            }
            if let Some(item) = items.choose(&mut rng) {
                host.give(player, &normalize_target(item), rng.gen_range(1..=3));
            }
            host.set_health(player, rng.gen_range(1..=20));

            if rng.gen_bool(DEATH_CHANCE) {
                system.handle(&hooks::on_death(player, now), &mut host);
                system.handle(&hooks::on_respawn(player, now), &mut host);
            }
            if round % BOARD_EVERY == 0 {
                system.handle(&hooks::on_quest_board(player, now), &mut host);
            }
        }
    }

    for (&player, handle) in players.iter().zip(PLAYERS) {
        let manager = system.manager();
        let tuning = manager.tuning(player);
        let completed = manager.record(player).map_or(0, |r| r.quests_completed);
        println!(
            "{handle}: difficulty {}, {completed} quests completed, {} XP",
            tuning.level,
            host.experience_of(player)
        );
        for quest in manager.quests_for(player) {
            println!(
                "  {quest}: {}/{}",
                quest.progress(player, &host),
                quest.required_amount()
            );
        }
    }

    for &player in &players {
        system.handle(&hooks::on_logout(player, now), &mut host);
    }
    system.shutdown();
    info!(
        rounds,
        learned = system.manager().agent().entry_count(),
        "simulation finished"
    );
    Ok(())
}
