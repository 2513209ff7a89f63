//! Atomic gold/item exchange shared by every shop-like interaction.
//!
//! This module provides:
//! - The single validate-then-mutate primitive [`apply_transaction`]
//! - Buy/sell helpers built on it, so every shop's paths agree
//! - Service payments (healing, cures) and grants (quest rewards, prizes)
//! - Equipping from the pack, which is an item swap through the same primitive
//!
//! Validation (item presence, affordability, capacity) always runs before the
//! first mutation; a rejected transaction leaves the character untouched.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::game::types::{Character, Item, ItemKind};

/// Why gold or items moved. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionReason {
    Purchase,
    Sale,
    Service,
    QuestReward,
    Prize,
    Equip,
}

/// A gold delta plus items gained and lost, applied all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub gold_delta: i64,
    pub items_added: Vec<Item>,
    /// Catalog ids to remove; repeat an id to remove several copies.
    pub items_removed: Vec<String>,
    pub reason: TransactionReason,
}

impl Transaction {
    pub fn new(reason: TransactionReason) -> Self {
        Self {
            gold_delta: 0,
            items_added: Vec::new(),
            items_removed: Vec::new(),
            reason,
        }
    }

    pub fn gold(mut self, delta: i64) -> Self {
        self.gold_delta = delta;
        self
    }

    pub fn add_item(mut self, item: Item) -> Self {
        self.items_added.push(item);
        self
    }

    pub fn remove_item(mut self, item_id: &str) -> Self {
        self.items_removed.push(item_id.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOutcome {
    Applied,
    InsufficientFunds,
    InventoryFull,
    ItemNotFound,
}

impl LedgerOutcome {
    pub fn is_applied(self) -> bool {
        self == LedgerOutcome::Applied
    }

    /// Short player-facing explanation.
    pub fn message(self) -> &'static str {
        match self {
            LedgerOutcome::Applied => "Done.",
            LedgerOutcome::InsufficientFunds => "You cannot afford that.",
            LedgerOutcome::InventoryFull => "Your pack is full.",
            LedgerOutcome::ItemNotFound => "You do not have that item.",
        }
    }
}

/// Validate `tx` against `character` and apply it only if every check passes.
pub fn apply_transaction(character: &mut Character, tx: &Transaction) -> LedgerOutcome {
    // Item presence: each removal must match a distinct pack slot.
    let mut removal_slots: Vec<usize> = Vec::with_capacity(tx.items_removed.len());
    for item_id in &tx.items_removed {
        let slot = character
            .inventory
            .iter()
            .enumerate()
            .position(|(idx, item)| item.id == *item_id && !removal_slots.contains(&idx));
        match slot {
            Some(idx) => removal_slots.push(idx),
            None => return reject(character, tx, LedgerOutcome::ItemNotFound),
        }
    }

    let new_gold = if tx.gold_delta >= 0 {
        character.gold.saturating_add(tx.gold_delta as u64)
    } else {
        match character.gold.checked_sub(tx.gold_delta.unsigned_abs()) {
            Some(gold) => gold,
            None => return reject(character, tx, LedgerOutcome::InsufficientFunds),
        }
    };

    let new_len = character.inventory.len() - removal_slots.len() + tx.items_added.len();
    if new_len > character.inventory_capacity {
        return reject(character, tx, LedgerOutcome::InventoryFull);
    }

    // Mutation phase: nothing below can fail.
    removal_slots.sort_unstable_by(|a, b| b.cmp(a));
    for idx in removal_slots {
        character.inventory.remove(idx);
    }
    character.inventory.extend(tx.items_added.iter().cloned());
    character.gold = new_gold;

    debug!(
        "ledger applied: character={} reason={:?} gold_delta={} added={} removed={} gold={}",
        character.id,
        tx.reason,
        tx.gold_delta,
        tx.items_added.len(),
        tx.items_removed.len(),
        character.gold
    );
    LedgerOutcome::Applied
}

fn reject(character: &Character, tx: &Transaction, outcome: LedgerOutcome) -> LedgerOutcome {
    debug!(
        "ledger rejected: character={} reason={:?} outcome={:?}",
        character.id, tx.reason, outcome
    );
    outcome
}

// ============================================================================
// Pricing
// ============================================================================

/// What a shop pays for an item: half its value, rounded down.
pub fn sell_price(item: &Item) -> u64 {
    item.value / 2
}

/// An item a shop sells, at the price listed in its catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopListing {
    pub item: Item,
    pub price: u64,
}

impl ShopListing {
    pub fn new(item: Item, price: u64) -> Self {
        Self { item, price }
    }

    /// List at the item's own value.
    pub fn at_value(item: Item) -> Self {
        let price = item.value;
        Self { item, price }
    }
}

fn gold_delta(amount: u64) -> i64 {
    amount.min(i64::MAX as u64) as i64
}

/// Player buys one `listing` item.
pub fn buy(character: &mut Character, listing: &ShopListing) -> LedgerOutcome {
    let tx = Transaction::new(TransactionReason::Purchase)
        .gold(-gold_delta(listing.price))
        .add_item(listing.item.clone());
    apply_transaction(character, &tx)
}

/// Player sells the pack item at `index`. Returns the outcome and the gold
/// received (zero unless applied).
pub fn sell(character: &mut Character, index: usize) -> (LedgerOutcome, u64) {
    let Some(item) = character.inventory.get(index) else {
        return (LedgerOutcome::ItemNotFound, 0);
    };
    let price = sell_price(item);
    let tx = Transaction::new(TransactionReason::Sale)
        .gold(gold_delta(price))
        .remove_item(&item.id);
    let outcome = apply_transaction(character, &tx);
    let paid = if outcome.is_applied() { price } else { 0 };
    (outcome, paid)
}

/// Pay for a service (healing, cures, bribes).
pub fn pay(character: &mut Character, amount: u64, reason: TransactionReason) -> LedgerOutcome {
    apply_transaction(character, &Transaction::new(reason).gold(-gold_delta(amount)))
}

/// Grant gold (prizes, rewards). Always applies.
pub fn grant(character: &mut Character, amount: u64, reason: TransactionReason) -> LedgerOutcome {
    apply_transaction(character, &Transaction::new(reason).gold(gold_delta(amount)))
}

// ============================================================================
// Equipment
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquipOutcome {
    /// Worn; carries the piece it replaced (now in the pack), if any.
    Equipped { replaced: Option<Item> },
    /// Potions and trinkets go in the pack, not a slot.
    NotEquippable,
    /// The piece currently worn is cursed and will not come off.
    StuckCursed,
    Ledger(LedgerOutcome),
}

/// Move the pack item at `index` into its slot, returning any previous
/// piece to the pack through the ledger.
pub fn equip(character: &mut Character, index: usize) -> EquipOutcome {
    let Some(item) = character.inventory.get(index).cloned() else {
        return EquipOutcome::Ledger(LedgerOutcome::ItemNotFound);
    };
    let current = match item.kind {
        ItemKind::Weapon => character.equipment.weapon.clone(),
        ItemKind::Armor => character.equipment.armor.clone(),
        ItemKind::Potion | ItemKind::Misc => return EquipOutcome::NotEquippable,
    };
    if current.as_ref().is_some_and(|c| c.cursed) {
        return EquipOutcome::StuckCursed;
    }

    let mut tx = Transaction::new(TransactionReason::Equip).remove_item(&item.id);
    if let Some(previous) = current.clone() {
        tx = tx.add_item(previous);
    }
    let outcome = apply_transaction(character, &tx);
    if !outcome.is_applied() {
        return EquipOutcome::Ledger(outcome);
    }

    if item.cursed {
        character.afflictions.cursed = true;
    }
    match item.kind {
        ItemKind::Weapon => character.equipment.weapon = Some(item),
        ItemKind::Armor => character.equipment.armor = Some(item),
        ItemKind::Potion | ItemKind::Misc => {}
    }
    EquipOutcome::Equipped { replaced: current }
}
