//! Quest hall: the board where quests are posted, claimed and turned in.
//!
//! Numbers in `claim` refer to the last `list`; numbers in `complete`,
//! `abandon` and `pursue` refer to the journal. Expired quests are swept
//! every time someone walks in.

use log::debug;

use crate::game::combat::EncounterState;
use crate::game::commands::{self, Command};
use crate::game::content;
use crate::game::errors::GameError;
use crate::game::location::{Context, LocationHandler, Transition};
use crate::game::locations::{back_to_street, is_leave, run_battle};
use crate::game::quest::{
    AbandonOutcome, CompleteOutcome, CreateOutcome, ObjectiveTarget, QuestDraft, QuestId, QuestKind,
    MAX_DIFFICULTY, MIN_DIFFICULTY,
};
use crate::game::types::{Character, LocationId};

pub struct QuestHall;

impl QuestHall {
    fn sweep(&self, ctx: &mut Context<'_>, character: &Character) {
        let now = ctx.services.now();
        let held = Self::journal_ids(ctx, character);
        let expired = ctx.services.quests.expire_overdue(now);
        if expired.is_empty() {
            return;
        }
        debug!("quest hall swept {} expired quest(s)", expired.len());
        ctx.say(&format!("The scribe strikes {} overdue quest(s) from the board.", expired.len()));
        let lost = expired.iter().filter(|id| held.contains(id)).count();
        if lost > 0 {
            ctx.say(&format!("{} of them were yours. You ran out of time.", lost));
        }
    }

    fn available_ids(ctx: &Context<'_>, character: &Character) -> Vec<QuestId> {
        ctx.services
            .quests
            .list_available(character)
            .iter()
            .map(|q| q.id)
            .collect()
    }

    fn journal_ids(ctx: &Context<'_>, character: &Character) -> Vec<QuestId> {
        ctx.services
            .quests
            .player_quests(character.id)
            .iter()
            .map(|q| q.id)
            .collect()
    }

    fn list(&self, ctx: &mut Context<'_>, character: &Character) {
        let mut lines = Vec::new();
        for (idx, quest) in ctx.services.quests.list_available(character).iter().enumerate() {
            lines.push(format!("{}. {}", idx + 1, quest.summary()));
            if !quest.comment.is_empty() {
                lines.push(format!("   \"{}\"", quest.comment));
            }
        }
        if lines.is_empty() {
            lines.push("Nothing on the board for someone of your level.".to_string());
        }
        ctx.term.write_lines(&lines);
    }

    fn claim(&self, ctx: &mut Context<'_>, character: &Character, command: &Command) -> Result<(), GameError> {
        let ids = Self::available_ids(ctx, character);
        let Some(quest_id) = command.index_arg().and_then(|idx| ids.get(idx).copied()) else {
            ctx.say("Claim which? Use a number from LIST.");
            return Ok(());
        };
        let now = ctx.services.now();
        let outcome = ctx.services.quests.claim(character, quest_id, now)?;
        ctx.say(outcome.message());
        Ok(())
    }

    fn complete(&self, ctx: &mut Context<'_>, character: &mut Character, command: &Command) -> Result<(), GameError> {
        let ids = Self::journal_ids(ctx, character);
        let Some(quest_id) = command.index_arg().and_then(|idx| ids.get(idx).copied()) else {
            ctx.say("Complete which? Use a number from your journal (J).");
            return Ok(());
        };
        let now = ctx.services.now();
        match ctx.services.quests.complete(character, quest_id, now)? {
            CompleteOutcome::Success {
                reward,
                levels_gained,
            } => {
                ctx.say(&format!(
                    "Quest complete! You receive {} gold and {} experience.",
                    reward.gold, reward.experience
                ));
                if levels_gained > 0 {
                    ctx.say(&format!("You are now level {}!", character.level));
                }
            }
            CompleteOutcome::RequirementsNotMet => {
                ctx.say("The scribe shakes their head. Not everything is done yet.");
                if let Some(quest) = ctx.services.quests.get(quest_id) {
                    let lines = quest.progress_lines();
                    ctx.term.write_lines(&lines);
                }
            }
            CompleteOutcome::NotOwner => ctx.say("That quest is not yours."),
            CompleteOutcome::Expired => ctx.say("Too late. The scribe strikes the quest from the board."),
        }
        Ok(())
    }

    fn abandon(&self, ctx: &mut Context<'_>, character: &Character, command: &Command) -> Result<(), GameError> {
        let ids = Self::journal_ids(ctx, character);
        let Some(quest_id) = command.index_arg().and_then(|idx| ids.get(idx).copied()) else {
            ctx.say("Abandon which? Use a number from your journal (J).");
            return Ok(());
        };
        let now = ctx.services.now();
        match ctx.services.quests.abandon(character, quest_id, now)? {
            AbandonOutcome::Abandoned => ctx.say("You give the quest up. The scribe sighs."),
            AbandonOutcome::NotOwner => ctx.say("That quest is not yours."),
        }
        Ok(())
    }

    /// Work on a hand-reported objective: a duel with the mark, or for
    /// seductions a charm roll.
    fn pursue(&self, ctx: &mut Context<'_>, character: &mut Character, command: &Command) -> Result<(), GameError> {
        let ids = Self::journal_ids(ctx, character);
        let Some(quest_id) = command.index_arg().and_then(|idx| ids.get(idx).copied()) else {
            ctx.say("Pursue which? Use a number from your journal (J).");
            return Ok(());
        };
        let quest = ctx
            .services
            .quests
            .get(quest_id)
            .ok_or_else(|| GameError::NotFound(format!("quest {}", quest_id)))?;
        let kind = quest.kind;
        let mark_level = quest.min_level.max(character.level);
        let pending = quest
            .objectives
            .iter()
            .find(|o| o.target == ObjectiveTarget::Manual && !o.is_complete())
            .map(|o| o.id);
        let Some(objective_id) = pending else {
            ctx.say("Nothing on that quest needs doing by hand.");
            return Ok(());
        };

        let success = if kind == QuestKind::Seduction {
            let chance = character.stats.charisma.saturating_mul(3).clamp(5, 95);
            let won = ctx.services.rng.percent(chance);
            if won {
                ctx.say("Your charm works. A heart is won.");
            } else {
                ctx.say("You are politely but firmly turned away.");
            }
            won
        } else {
            if !character.is_alive() {
                ctx.say("You are in no shape to fight.");
                return Ok(());
            }
            let mark = content::npc_fighter("the mark", mark_level);
            let report = run_battle(ctx, character, std::slice::from_ref(&mark));
            report.apply_to(character);
            if report.outcome == EncounterState::Defeat {
                character.set_hp(1);
                ctx.say("You are left for dead in a gutter, but you live.");
            }
            report.outcome == EncounterState::Victory
        };
        if success {
            let done = ctx.services.quests.record_progress(quest_id, objective_id, 1)?;
            if done {
                ctx.say("Every objective is met. Turn the quest in with COMPLETE.");
            }
        }
        Ok(())
    }

    fn create(&self, ctx: &mut Context<'_>, character: &mut Character) {
        if character.quest_quota == 0 {
            ctx.say("You have no quest postings left.");
            return;
        }
        for (idx, kind) in QuestKind::ALL.iter().enumerate() {
            ctx.say(&format!("{}. {}", idx + 1, kind.label()));
        }
        let Some(choice) = ctx.term.read_number("Kind of quest?", 1, QuestKind::ALL.len() as i64) else {
            return;
        };
        let kind = QuestKind::ALL[(choice - 1) as usize];
        let Some(difficulty) = ctx.term.read_number(
            "Difficulty?",
            MIN_DIFFICULTY as i64,
            MAX_DIFFICULTY as i64,
        ) else {
            return;
        };
        let Some(comment) = ctx.term.read_line("A word for the board:") else {
            return;
        };
        let draft = QuestDraft::new(kind, difficulty as u8, &comment);
        match ctx.services.quests.create(character, draft) {
            CreateOutcome::Created(_) => ctx.say(&format!(
                "Your quest is posted. {} posting(s) left.",
                character.quest_quota
            )),
            CreateOutcome::NoQuotaRemaining => ctx.say("You have no quest postings left."),
            CreateOutcome::InvalidDifficulty => ctx.say("The scribe does not understand that difficulty."),
        }
    }

    fn bounty(&self, ctx: &mut Context<'_>, mark: &str) {
        let Some(difficulty) = ctx.term.read_number(
            "How dangerous is the mark?",
            MIN_DIFFICULTY as i64,
            MAX_DIFFICULTY as i64,
        ) else {
            return;
        };
        match ctx.services.quests.post_bounty(mark, difficulty as u8, None) {
            CreateOutcome::Created(_) => ctx.say(&format!("The Crown posts a bounty on {}.", mark)),
            _ => ctx.say("The Crown declines."),
        }
    }
}

impl LocationHandler for QuestHall {
    fn id(&self) -> LocationId {
        LocationId::QuestHall
    }

    fn menu(&self) -> Vec<String> {
        vec![
            "(L)ist  CLAIM <n>  COMPLETE <n>  ABANDON <n>  PURSUE <n>".to_string(),
            "CREATE  BOUNTY <name>  (R)eturn to the street".to_string(),
        ]
    }

    fn enter(&self, ctx: &mut Context<'_>, character: &mut Character) -> Result<(), GameError> {
        ctx.say("");
        ctx.say(&format!("== {} ==", LocationId::QuestHall.title()));
        ctx.say(LocationId::QuestHall.description());
        self.sweep(ctx, character);
        let menu = self.menu();
        ctx.term.write_lines(&menu);
        Ok(())
    }

    fn handle(
        &self,
        ctx: &mut Context<'_>,
        character: &mut Character,
        command: &Command,
    ) -> Result<Option<Transition>, GameError> {
        match command.verb.as_str() {
            "l" | "list" => self.list(ctx, character),
            "claim" => self.claim(ctx, character, command)?,
            "complete" => self.complete(ctx, character, command)?,
            "abandon" => self.abandon(ctx, character, command)?,
            "pursue" => self.pursue(ctx, character, command)?,
            "create" => self.create(ctx, character),
            "bounty" if command.args.is_empty() => ctx.say("A bounty on whom?"),
            "bounty" => self.bounty(ctx, &command.args),
            "quests" => {
                let lines = commands::journal_lines(character, &ctx.services.quests);
                ctx.term.write_lines(&lines);
            }
            _ if is_leave(command) => return Ok(back_to_street()),
            _ => return Ok(None),
        }
        Ok(Some(Transition::Stay))
    }
}
