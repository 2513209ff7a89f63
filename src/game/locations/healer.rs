use crate::game::commands::Command;
use crate::game::economy::{self, LedgerOutcome, TransactionReason};
use crate::game::errors::GameError;
use crate::game::location::{Context, LocationHandler, Transition};
use crate::game::locations::{back_to_street, is_leave};
use crate::game::types::{Character, LocationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cure {
    Poison,
    Disease,
    Curse,
}

impl Cure {
    fn parse(arg: &str) -> Option<Self> {
        match arg.trim().to_ascii_lowercase().as_str() {
            "poison" => Some(Cure::Poison),
            "disease" => Some(Cure::Disease),
            "curse" => Some(Cure::Curse),
            _ => None,
        }
    }
}

/// Heals wounds for a price per hit point and lifts afflictions.
pub struct Healer;

impl Healer {
    fn heal(&self, ctx: &mut Context<'_>, character: &mut Character) {
        let missing = character.missing_hp();
        if missing == 0 {
            ctx.say("You are in perfect health.");
            return;
        }
        let price = ctx.services.config.healer.price_per_hp;
        // Heal as much as the purse allows.
        let affordable = match price {
            0 => missing,
            p => (character.gold / p).min(missing as u64) as u32,
        };
        if affordable == 0 {
            ctx.say(LedgerOutcome::InsufficientFunds.message());
            return;
        }
        let cost = affordable as u64 * price;
        match economy::pay(character, cost, TransactionReason::Service) {
            LedgerOutcome::Applied => {
                character.heal(affordable);
                ctx.say(&format!(
                    "The healer mends {} HP for {} gold. You have {}/{} HP.",
                    affordable, cost, character.hp, character.max_hp
                ));
            }
            other => ctx.say(other.message()),
        }
    }

    fn cure(&self, ctx: &mut Context<'_>, character: &mut Character, cure: Cure) {
        let prices = &ctx.services.config.healer;
        let (afflicted, price, label) = match cure {
            Cure::Poison => (character.afflictions.poisoned, prices.cure_poison, "poisoned"),
            Cure::Disease => (character.afflictions.diseased, prices.cure_disease, "diseased"),
            Cure::Curse => (character.afflictions.cursed, prices.remove_curse, "cursed"),
        };
        if !afflicted {
            ctx.say(&format!("You are not {}.", label));
            return;
        }
        let outcome = economy::pay(character, price, TransactionReason::Service);
        if !outcome.is_applied() {
            ctx.say(outcome.message());
            return;
        }
        match cure {
            Cure::Poison => character.afflictions.poisoned = false,
            Cure::Disease => character.afflictions.diseased = false,
            Cure::Curse => {
                character.afflictions.cursed = false;
                // The cursed piece crumbles with the curse.
                let eq = &mut character.equipment;
                if eq.weapon.as_ref().is_some_and(|w| w.cursed) {
                    eq.weapon = None;
                }
                if eq.armor.as_ref().is_some_and(|a| a.cursed) {
                    eq.armor = None;
                }
            }
        }
        ctx.say(&format!("For {} gold you are no longer {}.", price, label));
    }
}

impl LocationHandler for Healer {
    fn id(&self) -> LocationId {
        LocationId::Healer
    }

    fn menu(&self) -> Vec<String> {
        vec![
            "HEAL  CURE poison|disease|curse  PRICES".to_string(),
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
            "heal" => self.heal(ctx, character),
            "cure" => match Cure::parse(&command.args) {
                Some(cure) => self.cure(ctx, character, cure),
                None => ctx.say("Cure what? poison, disease or curse."),
            },
            "prices" => {
                let h = &ctx.services.config.healer;
                let line = format!(
                    "{} gold per HP. Poison {}, disease {}, curse {}.",
                    h.price_per_hp, h.cure_poison, h.cure_disease, h.remove_curse
                );
                ctx.say(&line);
            }
            _ if is_leave(command) => return Ok(back_to_street()),
            _ => return Ok(None),
        }
        Ok(Some(Transition::Stay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::game::rng::ScriptedRng;
    use crate::game::services::Services;
    use crate::game::terminal::ScriptedTerminal;
    use crate::game::types::{Item, ItemKind};

    fn run(term: &mut ScriptedTerminal, hero: &mut Character, input: &str) {
        let mut services = Services::new(Config::default(), Box::new(ScriptedRng::new(vec![0])));
        let mut ctx = Context {
            term,
            services: &mut services,
        };
        let command = Command::parse(input).unwrap();
        Healer.handle(&mut ctx, hero, &command).unwrap();
    }

    #[test]
    fn heal_is_priced_per_hp() {
        let mut term = ScriptedTerminal::default();
        let mut hero = Character::new("Hero").with_hp(10, 30).with_gold(1_000);
        run(&mut term, &mut hero, "heal");
        assert_eq!(hero.hp, 30);
        assert_eq!(hero.gold, 900);
    }

    #[test]
    fn partial_heal_when_short_of_gold() {
        let mut term = ScriptedTerminal::default();
        let mut hero = Character::new("Hero").with_hp(10, 30).with_gold(27);
        run(&mut term, &mut hero, "heal");
        assert_eq!(hero.hp, 15);
        assert_eq!(hero.gold, 2);
    }

    #[test]
    fn curse_removal_destroys_cursed_weapon() {
        let mut term = ScriptedTerminal::default();
        let mut hero = Character::new("Hero").with_gold(1_500);
        hero.equipment.weapon = Some(Item::new("black_blade", "Black Blade", ItemKind::Weapon, 6_000, 28).cursed());
        hero.afflictions.cursed = true;
        run(&mut term, &mut hero, "cure curse");
        assert!(!hero.afflictions.cursed);
        assert!(hero.equipment.weapon.is_none());
        assert_eq!(hero.gold, 500);
    }

    #[test]
    fn cure_without_affliction_costs_nothing() {
        let mut term = ScriptedTerminal::default();
        let mut hero = Character::new("Hero").with_gold(300);
        run(&mut term, &mut hero, "cure poison");
        assert_eq!(hero.gold, 300);
        assert!(term.saw("You are not poisoned."));
    }
}
