//! Location handlers for every place in town, plus the interactive battle
//! runner they share.

pub mod gym;
pub mod healer;
pub mod main_street;
pub mod prison;
pub mod prison_cell;
pub mod quest_hall;
pub mod shop;

pub use gym::Gym;
pub use healer::Healer;
pub use main_street::MainStreet;
pub use prison::Prison;
pub use prison_cell::PrisonCell;
pub use quest_hall::QuestHall;
pub use shop::ShopHandler;

use crate::game::combat::{flee_chance, CombatEvent, CombatParticipant, CombatReport, Encounter};
use crate::game::commands::Command;
use crate::game::location::{Context, LocationHandler, Transition};
use crate::game::types::{Character, LocationId};

/// One handler per [`LocationId`].
pub fn default_handlers() -> Vec<Box<dyn LocationHandler>> {
    vec![
        Box::new(MainStreet),
        Box::new(ShopHandler::weapons()),
        Box::new(ShopHandler::armor()),
        Box::new(Healer),
        Box::new(Prison),
        Box::new(PrisonCell),
        Box::new(Gym),
        Box::new(QuestHall),
    ]
}

/// The usual way out of a side location.
pub(crate) fn is_leave(command: &Command) -> bool {
    command.is(&["r", "return", "leave", "back", "out"])
}

pub(crate) fn back_to_street() -> Option<Transition> {
    Some(Transition::NavigateTo(LocationId::MainStreet))
}

pub(crate) fn describe_events(ctx: &mut Context<'_>, events: &[CombatEvent]) {
    for event in events {
        let line = match event {
            CombatEvent::Strike {
                attacker,
                defender,
                damage,
                defender_hp,
            } => format!("{} hits {} for {} damage ({} HP left).", attacker, defender, damage, defender_hp),
            CombatEvent::OpponentDefeated { name, .. } => format!("{} goes down!", name),
            CombatEvent::NextOpponent { name } => format!("{} steps up to face you.", name),
            CombatEvent::ProtagonistDefeated => "You collapse.".to_string(),
            CombatEvent::FleeSucceeded { .. } => "You get away!".to_string(),
            CombatEvent::FleeFailed { .. } => "You try to run but are cut off.".to_string(),
        };
        ctx.say(&line);
    }
}

/// Fight `opponents` one after another. When the flee rule allows it the
/// player is asked whether to run; a disconnect counts as "no" and the
/// battle plays out. The report is not applied to `character`.
pub(crate) fn run_battle(
    ctx: &mut Context<'_>,
    character: &Character,
    opponents: &[Character],
) -> CombatReport {
    let names: Vec<&str> = opponents.iter().map(|o| o.name.as_str()).collect();
    ctx.say(&format!("You face {}.", names.join(", then ")));

    let mut encounter = Encounter::new(
        CombatParticipant::from_character(character),
        opponents.iter().map(CombatParticipant::from_character).collect(),
    );
    while !encounter.is_finished() {
        let events = encounter.play_round(ctx.services.rng.as_mut());
        describe_events(ctx, &events);
        ctx.pace();

        if encounter.flee_offered() {
            let chance = flee_chance(encounter.protagonist().agility);
            let prompt = format!("You are badly hurt. Try to flee ({}% chance)?", chance);
            if ctx.term.confirm(&prompt) == Some(true) {
                if let Some(event) = encounter.attempt_flee(ctx.services.rng.as_mut()) {
                    describe_events(ctx, std::slice::from_ref(&event));
                }
            }
        }
    }
    encounter.report()
}
