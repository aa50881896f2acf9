//! The quest board: the block players use to see and turn in quests.
//!
//! Using the board lists the player's quests with a progress bar each, then
//! runs the completion sweep so finished quests are rewarded and replaced.
//! A player with nothing assigned is told so and given the defaults.

use questai_core::host::{Inventory, QuestHost};
use questai_core::manager::{QuestManager, SweepReport};
use questai_core::message::{Color, StyledText};
use questai_core::quest::Quest;
use questai_core::types::{PlayerId, Timestamp};
use tracing::debug;

/// Cells in a progress bar.
pub const BAR_CELLS: u64 = 10;

const FILLED: char = '■';
const EMPTY: char = '□';

// ---------------------------------------------------------------------------
// Progress rendering
// ---------------------------------------------------------------------------

/// Whole-number percentage of `progress` over `required`, truncated.
///
/// Not capped: holding more items than required reads above 100.
#[must_use]
pub fn percent(progress: u32, required: u32) -> u64 {
    if required == 0 {
        return 100;
    }
    u64::from(progress) * 100 / u64::from(required)
}

/// `[■■■□□□□□□□]`, filled in proportion to progress and capped at full.
#[must_use]
pub fn progress_bar(progress: u32, required: u32) -> String {
    let filled = if required == 0 {
        BAR_CELLS
    } else {
        (u64::from(progress) * BAR_CELLS / u64::from(required)).min(BAR_CELLS)
    };
    let mut bar = String::from("[");
    for i in 0..BAR_CELLS {
        bar.push(if i < filled { FILLED } else { EMPTY });
    }
    bar.push(']');
    bar
}

/// Red below 25%, gold below 50%, yellow below 75%, green otherwise.
#[must_use]
pub fn progress_color(percent: u64) -> Color {
    match percent {
        0..25 => Color::RED,
        25..50 => Color::GOLD,
        50..75 => Color::YELLOW,
        _ => Color::GREEN,
    }
}

/// The lines shown for one quest.
///
/// Finished quests get only their status line; active ones add the
/// description and a progress line.
pub fn quest_lines<H: Inventory + ?Sized>(quest: &Quest, player: PlayerId, host: &H) -> Vec<StyledText> {
    let done = quest.is_completed(player) || quest.is_ready(player, host);
    let (status, color) = if done {
        ("[Completed]", Color::GREEN)
    } else {
        ("[Active]", Color::YELLOW)
    };
    let mut lines = vec![StyledText::plain(status, color).push(format!(" {}", quest.title()), Color::WHITE)];
    if !done {
        let progress = quest.progress(player, host);
        let required = quest.required_amount();
        let pct = percent(progress, required);
        lines.push(StyledText::plain(format!("  {}", quest.description()), Color::GRAY));
        lines.push(StyledText::plain(
            format!(
                "  Progress: {} {progress}/{required} ({pct}%)",
                progress_bar(progress, required)
            ),
            progress_color(pct),
        ));
    }
    lines
}

// ---------------------------------------------------------------------------
// Board interaction
// ---------------------------------------------------------------------------

/// What a board interaction did.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardOutcome {
    /// Quests were listed and the sweep ran.
    Listed(SweepReport),
    /// The player had no quests and received the defaults.
    Assigned,
}

fn board_line(text: &str, color: Color) -> StyledText {
    StyledText::tagged("[Quest] ", Color::GOLD, text, color)
}

/// Handle `player` using a quest board.
pub fn use_board<H: QuestHost + ?Sized>(
    manager: &mut QuestManager,
    player: PlayerId,
    host: &mut H,
    now: Timestamp,
) -> BoardOutcome {
    host.send_message(player, board_line("Welcome to the quest system!", Color::WHITE));

    if !manager.has_quests(player) {
        host.send_message(player, board_line("No quests available. Check back later!", Color::RED));
        manager.initialize_player(player, &*host, now);
        host.send_message(
            player,
            board_line(
                "New quests have been assigned to you! Check the quest block again.",
                Color::GREEN,
            ),
        );
        debug!(%player, "board assigned default quests");
        return BoardOutcome::Assigned;
    }

    host.send_message(player, board_line("Your active quests:", Color::WHITE));
    let lines: Vec<StyledText> = manager
        .quests_for(player)
        .iter()
        .flat_map(|quest| quest_lines(quest, player, &*host))
        .collect();
    for line in lines {
        host.send_message(player, line);
    }

    let report = manager.sweep(player, host, now);
    debug!(
        %player,
        rewarded = report.rewarded.len(),
        replaced = report.replaced.len(),
        "board sweep"
    );
    BoardOutcome::Listed(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use questai_core::QuestConfig;
    use questai_core::host::HeadlessHost;
    use questai_core::quest::QuestKind;
    use questai_core::types::{QuestId, TargetId};

    fn seeded_manager() -> QuestManager {
        let mut config = QuestConfig::default();
        config.generator.seed = Some(3);
        config.learning.seed = Some(3);
        QuestManager::new(config)
    }

    #[test]
    fn bar_and_percent() {
        assert_eq!(progress_bar(0, 10), "[□□□□□□□□□□]");
        assert_eq!(progress_bar(3, 10), "[■■■□□□□□□□]");
        assert_eq!(progress_bar(25, 10), "[■■■■■■■■■■]");
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(15, 10), 150);
    }

    #[test]
    fn colour_thresholds() {
        assert_eq!(progress_color(0), Color::RED);
        assert_eq!(progress_color(24), Color::RED);
        assert_eq!(progress_color(25), Color::GOLD);
        assert_eq!(progress_color(50), Color::YELLOW);
        assert_eq!(progress_color(75), Color::GREEN);
        assert_eq!(progress_color(140), Color::GREEN);
    }

    #[test]
    fn active_quest_shows_progress_line() {
        let mut host = HeadlessHost::with_vanilla_names();
        let player = PlayerId::new();
        let dirt = TargetId::from("minecraft:dirt");
        let quest = Quest::new(QuestKind::Collection, QuestId::from("collect_dirt_b"), "Collect Dirt", dirt.clone(), 10, &host);
        host.set_held(player, &dirt, 4);

        let text: Vec<String> = quest_lines(&quest, player, &host).iter().map(StyledText::plain_text).collect();
        assert_eq!(
            text,
            vec![
                "[Active] Collect Dirt".to_owned(),
                "  Collect 10 Dirt(s)".to_owned(),
                "  Progress: [■■■■□□□□□□] 4/10 (40%)".to_owned(),
            ]
        );
    }

    #[test]
    fn ready_quest_shows_only_status() {
        let mut host = HeadlessHost::with_vanilla_names();
        let player = PlayerId::new();
        let dirt = TargetId::from("minecraft:dirt");
        let quest = Quest::new(QuestKind::Collection, QuestId::from("collect_dirt_c"), "Collect Dirt", dirt.clone(), 2, &host);
        host.set_held(player, &dirt, 2);

        let lines = quest_lines(&quest, player, &host);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].plain_text(), "[Completed] Collect Dirt");
    }

    #[test]
    fn empty_board_assigns_defaults() {
        let mut manager = seeded_manager();
        let mut host = HeadlessHost::with_vanilla_names();
        let player = PlayerId::new();

        assert_eq!(use_board(&mut manager, player, &mut host, Timestamp(0)), BoardOutcome::Assigned);
        assert_eq!(manager.quests_for(player).len(), 2);
        let messages = host.messages_for(player);
        assert_eq!(messages[1], "[Quest] No quests available. Check back later!");
        assert_eq!(
            messages.last().map(String::as_str),
            Some("[Quest] New quests have been assigned to you! Check the quest block again.")
        );
    }

    #[test]
    fn second_visit_lists_and_sweeps() {
        let mut manager = seeded_manager();
        let mut host = HeadlessHost::with_vanilla_names();
        let player = PlayerId::new();
        use_board(&mut manager, player, &mut host, Timestamp(0));
        host.messages.clear();

        let BoardOutcome::Listed(report) = use_board(&mut manager, player, &mut host, Timestamp(1_000)) else {
            panic!("expected a listing");
        };
        assert!(report.is_noop());
        let messages = host.messages_for(player);
        assert_eq!(messages[1], "[Quest] Your active quests:");
        assert!(messages.iter().any(|m| m.starts_with("[Active] ")));
        assert!(messages.iter().any(|m| m.starts_with("  Progress: [")));
    }
}
