use log::info;

use crate::game::combat::EncounterState;
use crate::game::commands::Command;
use crate::game::content;
use crate::game::economy::{self, TransactionReason};
use crate::game::errors::GameError;
use crate::game::location::{Context, LocationHandler, Transition};
use crate::game::locations::{back_to_street, is_leave, run_battle};
use crate::game::quest::ObjectiveTarget;
use crate::game::types::{Character, LocationId};
use crate::logutil::escape_log;

/// Tournament ring. Bouts are non-lethal: losers wake up at 1 HP.
pub struct Gym;

impl Gym {
    fn tournament(&self, ctx: &mut Context<'_>, character: &mut Character) {
        if character.hp <= 1 {
            ctx.say("The trainer sends you to the healer first.");
            return;
        }
        let count = ctx.services.config.gym.bout_opponents;
        let per_level = ctx.services.config.gym.prize_gold_per_level;
        let opponents = content::tournament_opponents(count, character.level, ctx.services.rng.as_mut());

        let report = run_battle(ctx, character, &opponents);
        let levels = report.apply_to(character);
        ctx.services.quests.record_event(
            character.id,
            &ObjectiveTarget::Opponents,
            report.defeated.len() as u32,
        );

        match report.outcome {
            EncounterState::Victory => {
                let prize = per_level.saturating_mul(character.level as u64);
                economy::grant(character, prize, TransactionReason::Prize);
                info!(
                    "{} won the tournament: prize={} xp={}",
                    escape_log(&character.name),
                    prize,
                    report.experience
                );
                ctx.say(&format!(
                    "The crowd roars! You win {} gold and {} experience.",
                    prize, report.experience
                ));
                if levels > 0 {
                    ctx.say(&format!("You are now level {}!", character.level));
                }
            }
            EncounterState::Defeat => {
                character.set_hp(1);
                ctx.say(&format!(
                    "You wake up on the sand after beating {} of {}.",
                    report.defeated.len(),
                    count
                ));
            }
            EncounterState::Fled => ctx.say("You duck under the ropes and out of the ring."),
            EncounterState::NotStarted | EncounterState::InProgress => {}
        }
    }
}

impl LocationHandler for Gym {
    fn id(&self) -> LocationId {
        LocationId::Gym
    }

    fn menu(&self) -> Vec<String> {
        vec![
            "(T)ournament".to_string(),
            "(R)eturn to the street".to_string(),
        ]
    }

    fn handle(
        &self,
        ctx: &mut Context<'_>,
        character: &mut Character,
        command: &Command,
    ) -> Result<Option<Transition>, GameError> {
        if command.is(&["t", "tournament", "fight"]) {
            self.tournament(ctx, character);
            return Ok(Some(Transition::Stay));
        }
        if is_leave(command) {
            return Ok(back_to_street());
        }
        Ok(None)
    }
}
