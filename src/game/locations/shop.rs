//! Weapon and armor shops. Both run the same handler over a different
//! catalog; every purchase, sale and swap goes through the ledger.

use log::info;

use crate::game::commands::Command;
use crate::game::content;
use crate::game::economy::{self, EquipOutcome, LedgerOutcome, ShopListing};
use crate::game::errors::GameError;
use crate::game::location::{Context, LocationHandler, Transition};
use crate::game::locations::{back_to_street, is_leave};
use crate::game::types::{Character, ItemKind, LocationId};
use crate::logutil::escape_log;

pub struct ShopHandler {
    id: LocationId,
    listings: Vec<ShopListing>,
}

impl ShopHandler {
    pub fn new(id: LocationId, listings: Vec<ShopListing>) -> Self {
        Self { id, listings }
    }

    pub fn weapons() -> Self {
        Self::new(LocationId::WeaponShop, content::weapon_catalog())
    }

    pub fn armor() -> Self {
        Self::new(LocationId::ArmorShop, content::armor_catalog())
    }

    pub fn listings(&self) -> &[ShopListing] {
        &self.listings
    }

    fn list(&self, ctx: &mut Context<'_>) {
        for (idx, listing) in self.listings.iter().enumerate() {
            let power = match listing.item.kind {
                ItemKind::Weapon => format!(" (attack {})", listing.item.power),
                ItemKind::Armor => format!(" (armor {})", listing.item.power),
                ItemKind::Potion | ItemKind::Misc => String::new(),
            };
            ctx.say(&format!("{}. {} - {} gold{}", idx + 1, listing.item.name, listing.price, power));
        }
    }

    fn buy(&self, ctx: &mut Context<'_>, character: &mut Character, command: &Command) {
        let Some(listing) = command.index_arg().and_then(|idx| self.listings.get(idx)) else {
            ctx.say(&format!("Buy which? Pick 1 to {}.", self.listings.len()));
            return;
        };
        match economy::buy(character, listing) {
            LedgerOutcome::Applied => {
                info!(
                    "{} bought {} for {}",
                    escape_log(&character.name),
                    listing.item.id,
                    listing.price
                );
                ctx.say(&format!(
                    "You buy the {} for {} gold. {} gold left.",
                    listing.item.name, listing.price, character.gold
                ));
                let wearable = matches!(listing.item.kind, ItemKind::Weapon | ItemKind::Armor);
                if wearable && ctx.term.confirm("Equip it now?") == Some(true) {
                    let idx = character.inventory.len().saturating_sub(1);
                    self.report_equip(ctx, character, idx);
                }
            }
            other => ctx.say(other.message()),
        }
    }

    fn sell(&self, ctx: &mut Context<'_>, character: &mut Character, command: &Command) {
        let Some(idx) = command.index_arg() else {
            ctx.say("Sell which? Use the number from your inventory (I).");
            return;
        };
        let name = character.inventory.get(idx).map(|item| item.name.clone());
        match (economy::sell(character, idx), name) {
            ((LedgerOutcome::Applied, price), Some(name)) => {
                ctx.say(&format!("Sold the {} for {} gold.", name, price));
            }
            ((outcome, _), _) => ctx.say(outcome.message()),
        }
    }

    fn report_equip(&self, ctx: &mut Context<'_>, character: &mut Character, idx: usize) {
        match economy::equip(character, idx) {
            EquipOutcome::Equipped { replaced } => {
                if replaced.is_some() {
                    ctx.say("You swap your gear.");
                } else {
                    ctx.say("You put it on.");
                }
                if character.afflictions.cursed && character.equipment.has_cursed_item() {
                    ctx.say("A chill runs through you. The thing will not let go.");
                }
            }
            EquipOutcome::NotEquippable => ctx.say("You can't wear that."),
            EquipOutcome::StuckCursed => ctx.say("Your cursed gear refuses to come off."),
            EquipOutcome::Ledger(outcome) => ctx.say(outcome.message()),
        }
    }
}

impl LocationHandler for ShopHandler {
    fn id(&self) -> LocationId {
        self.id
    }

    fn menu(&self) -> Vec<String> {
        vec![
            "(L)ist  BUY <n>  SELL <n>  EQUIP <n>".to_string(),
            "(R)eturn to the street".to_string(),
        ]
    }

    fn enter(&self, ctx: &mut Context<'_>, character: &mut Character) -> Result<(), GameError> {
        ctx.say("");
        ctx.say(&format!("== {} ==", self.id.title()));
        ctx.say(self.id.description());
        ctx.say(&format!("You have {} gold.", character.gold));
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
            "l" | "list" => self.list(ctx),
            "b" | "buy" => self.buy(ctx, character, command),
            "sell" => self.sell(ctx, character, command),
            "e" | "equip" => match command.index_arg() {
                Some(idx) => self.report_equip(ctx, character, idx),
                None => ctx.say("Equip which? Use the number from your inventory (I)."),
            },
            _ if is_leave(command) => return Ok(back_to_street()),
            _ => return Ok(None),
        }
        Ok(Some(Transition::Stay))
    }
}
