use crate::game::commands::Command;
use crate::game::errors::GameError;
use crate::game::location::{Context, LocationHandler, Transition};
use crate::game::locations::{back_to_street, is_leave};
use crate::game::types::{Character, LocationId};

/// Where a failed rescuer serves time. The door opens once the sentence is done.
pub struct PrisonCell;

impl PrisonCell {
    fn wait(&self, ctx: &mut Context<'_>, character: &mut Character) {
        if character.imprisoned_days == 0 {
            ctx.say("Your sentence is served. The door stands open.");
            return;
        }
        character.imprisoned_days -= 1;
        // Prison food is poor but it is food.
        let rest = (character.max_hp / 10).max(1);
        character.heal(rest);
        for released in ctx.services.prisoners.serve_day() {
            ctx.say(&format!("The guards let {} go.", released.name));
        }
        ctx.pace();
        match character.imprisoned_days {
            0 => ctx.say("A guard unlocks your door. You are free to leave."),
            days => ctx.say(&format!("A day passes. {} day(s) to go.", days)),
        }
    }
}

impl LocationHandler for PrisonCell {
    fn id(&self) -> LocationId {
        LocationId::PrisonCell
    }

    fn menu(&self) -> Vec<String> {
        vec!["(W)ait a day  (L)eave".to_string()]
    }

    fn enter(&self, ctx: &mut Context<'_>, character: &mut Character) -> Result<(), GameError> {
        ctx.say("");
        ctx.say(&format!("== {} ==", LocationId::PrisonCell.title()));
        ctx.say(LocationId::PrisonCell.description());
        if character.is_imprisoned() {
            ctx.say(&format!("{} day(s) left on your sentence.", character.imprisoned_days));
        }
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
        if command.is(&["w", "wait", "sleep"]) {
            self.wait(ctx, character);
            return Ok(Some(Transition::Stay));
        }
        if command.is(&["l"]) || is_leave(command) {
            if character.is_imprisoned() {
                ctx.say(&format!(
                    "The door is locked. {} day(s) left.",
                    character.imprisoned_days
                ));
                return Ok(Some(Transition::Stay));
            }
            return Ok(back_to_street());
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::game::content;
    use crate::game::rng::ScriptedRng;
    use crate::game::services::Services;
    use crate::game::terminal::ScriptedTerminal;

    #[test]
    fn sentence_must_be_served_before_leaving() {
        let mut services = Services::new(Config::default(), Box::new(ScriptedRng::new(vec![0])));
        services.prisoners.imprison(content::npc_fighter("Sly Vera", 2), 1);
        let mut term = ScriptedTerminal::default();
        let mut hero = Character::new("Hero").with_hp(1, 30).with_location(LocationId::PrisonCell);
        hero.imprisoned_days = 2;

        let mut ctx = Context {
            term: &mut term,
            services: &mut services,
        };
        let leave = Command::parse("leave").unwrap();
        let wait = Command::parse("wait").unwrap();

        assert_eq!(PrisonCell.handle(&mut ctx, &mut hero, &leave).unwrap(), Some(Transition::Stay));
        PrisonCell.handle(&mut ctx, &mut hero, &wait).unwrap();
        assert_eq!(hero.imprisoned_days, 1);
        assert_eq!(hero.hp, 4);
        PrisonCell.handle(&mut ctx, &mut hero, &wait).unwrap();
        assert_eq!(
            PrisonCell.handle(&mut ctx, &mut hero, &leave).unwrap(),
            Some(Transition::NavigateTo(LocationId::MainStreet))
        );
        assert!(ctx.services.prisoners.is_empty());
        assert!(term.saw("The guards let Sly Vera go."));
    }
}
