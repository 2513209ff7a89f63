//! The royal prison. Players can look over the inmates and try to break
//! one out through the guard line; losing lands them in a cell.

use log::info;

use crate::game::combat::EncounterState;
use crate::game::commands::Command;
use crate::game::content;
use crate::game::errors::GameError;
use crate::game::location::{Context, LocationHandler, Transition};
use crate::game::locations::{back_to_street, is_leave, run_battle};
use crate::game::quest::ObjectiveTarget;
use crate::game::types::{Character, LocationId};
use crate::logutil::escape_log;

pub struct Prison;

impl Prison {
    fn list(&self, ctx: &mut Context<'_>) {
        let lines: Vec<String> = ctx
            .services
            .prisoners
            .prisoners()
            .iter()
            .map(|p| format!("{} (level {}), {} day(s) left", p.npc.name, p.npc.level, p.days_left))
            .collect();
        if lines.is_empty() {
            ctx.say("The cells are empty.");
        } else {
            ctx.term.write_lines(&lines);
        }
    }

    fn free(
        &self,
        ctx: &mut Context<'_>,
        character: &mut Character,
        name: &str,
    ) -> Result<Transition, GameError> {
        let Some((npc_id, npc_name, npc_level)) = ctx
            .services
            .prisoners
            .find_prisoner(name)
            .map(|p| (p.npc.id, p.npc.name.clone(), p.npc.level))
        else {
            ctx.say("No prisoner by that name.");
            return Ok(Transition::Stay);
        };
        if !character.is_alive() {
            ctx.say("You are in no shape to fight.");
            return Ok(Transition::Stay);
        }
        let prompt = format!("Break {} out? The guards will fight.", npc_name);
        if ctx.term.confirm(&prompt) != Some(true) {
            ctx.say("You think better of it.");
            return Ok(Transition::Stay);
        }

        let cfg = ctx.services.config.prison.clone();
        let guards = content::prison_guards(cfg.guard_count, npc_level + cfg.guard_level_bonus);
        info!(
            target: "security",
            "{} attacks the prison guards to free {}",
            escape_log(&character.name),
            escape_log(&npc_name)
        );
        let report = run_battle(ctx, character, &guards);
        let levels = report.apply_to(character);
        let guards_beaten = report.defeated.len() as u32;
        ctx.services
            .quests
            .record_event(character.id, &ObjectiveTarget::PrisonGuards, guards_beaten);

        match report.outcome {
            EncounterState::Victory => {
                let freed = ctx.services.prisoners.release_npc(npc_id, &character.name)?;
                character.alignment.adjust(0, cfg.darkness_per_break);
                ctx.services
                    .quests
                    .record_event(character.id, &ObjectiveTarget::PrisonersFreed, 1);
                ctx.say(&format!(
                    "{} slips out into the night. You gain {} experience.",
                    freed.name, report.experience
                ));
                if levels > 0 {
                    ctx.say(&format!("You are now level {}!", character.level));
                }
                Ok(Transition::Stay)
            }
            EncounterState::Defeat => {
                character.set_hp(character.hp.max(1));
                character.imprisoned_days = cfg.sentence_days;
                info!(
                    target: "security",
                    "{} jailed for {} days",
                    escape_log(&character.name),
                    cfg.sentence_days
                );
                ctx.say(&format!(
                    "The guards drag you into a cell. Sentence: {} day(s).",
                    cfg.sentence_days
                ));
                Ok(Transition::NavigateTo(LocationId::PrisonCell))
            }
            EncounterState::Fled => {
                ctx.say("You escape into the alleys, empty-handed.");
                Ok(Transition::Stay)
            }
            EncounterState::NotStarted | EncounterState::InProgress => Ok(Transition::Stay),
        }
    }
}

impl LocationHandler for Prison {
    fn id(&self) -> LocationId {
        LocationId::Prison
    }

    fn menu(&self) -> Vec<String> {
        vec![
            "(P)risoners  FREE <name>".to_string(),
            "(R)eturn to the street".to_string(),
        ]
    }

    fn handle(
        &self,
        ctx: &mut Context<'_>,
        character: &mut Character,
        command: &Command,
    ) -> Result<Option<Transition>, GameError> {
        match command.verb.as_str() {
            "p" | "prisoners" => {
                self.list(ctx);
                Ok(Some(Transition::Stay))
            }
            "free" if command.args.is_empty() => {
                ctx.say("Free whom?");
                Ok(Some(Transition::Stay))
            }
            "free" => self.free(ctx, character, &command.args).map(Some),
            _ if is_leave(command) => Ok(back_to_street()),
            _ => Ok(None),
        }
    }
}
