use crate::game::commands::Command;
use crate::game::errors::GameError;
use crate::game::location::{Context, LocationHandler, Transition};
use crate::game::types::{Character, LocationId};

/// Town square. Every public location is one step away.
pub struct MainStreet;

impl MainStreet {
    fn shortcut(verb: &str) -> Option<LocationId> {
        match verb {
            "w" | "weapons" => Some(LocationId::WeaponShop),
            "a" | "armor" | "armour" => Some(LocationId::ArmorShop),
            "h" | "healer" => Some(LocationId::Healer),
            "p" | "prison" => Some(LocationId::Prison),
            "g" | "gym" => Some(LocationId::Gym),
            "q" | "quests" => Some(LocationId::QuestHall),
            _ => None,
        }
    }
}

impl LocationHandler for MainStreet {
    fn id(&self) -> LocationId {
        LocationId::MainStreet
    }

    fn menu(&self) -> Vec<String> {
        vec![
            "(W)eapon shop  (A)rmor shop  (H)ealer".to_string(),
            "(P)rison  (G)ym  (Q)uest hall".to_string(),
            "GO <place> also works.".to_string(),
        ]
    }

    fn handle(
        &self,
        ctx: &mut Context<'_>,
        _character: &mut Character,
        command: &Command,
    ) -> Result<Option<Transition>, GameError> {
        if let Some(target) = Self::shortcut(&command.verb) {
            return Ok(Some(Transition::NavigateTo(target)));
        }
        if command.is(&["go", "walk"]) {
            return match LocationId::parse(&command.args) {
                Ok(target) => Ok(Some(Transition::NavigateTo(target))),
                Err(_) => {
                    ctx.say("No such place in town.");
                    Ok(Some(Transition::Stay))
                }
            };
        }
        Ok(None)
    }
}
