use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::game::errors::GameError;

pub const CHARACTER_SCHEMA_VERSION: u8 = 1;

/// Default pack size; matches the town's historical fifteen-slot pack.
pub const DEFAULT_INVENTORY_CAPACITY: usize = 15;

/// Stable identifier for a character. Display names may be reused or
/// renamed; this never changes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Locations
// ============================================================================

/// Every place a character can stand. The set is closed: adding a location
/// means adding a variant, a neighbour list and a handler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum LocationId {
    MainStreet,
    WeaponShop,
    ArmorShop,
    Healer,
    Prison,
    PrisonCell,
    Gym,
    QuestHall,
}

impl LocationId {
    pub const ALL: [LocationId; 8] = [
        LocationId::MainStreet,
        LocationId::WeaponShop,
        LocationId::ArmorShop,
        LocationId::Healer,
        LocationId::Prison,
        LocationId::PrisonCell,
        LocationId::Gym,
        LocationId::QuestHall,
    ];

    /// The designated start state.
    pub const START: LocationId = LocationId::MainStreet;

    /// Human-readable name shown in headers and travel menus.
    pub fn title(self) -> &'static str {
        match self {
            LocationId::MainStreet => "Main Street",
            LocationId::WeaponShop => "Weapon Shop",
            LocationId::ArmorShop => "Armor Shop",
            LocationId::Healer => "The Healer's Hut",
            LocationId::Prison => "The Royal Prison",
            LocationId::PrisonCell => "Prison Cell",
            LocationId::Gym => "The Gym",
            LocationId::QuestHall => "Quest Hall",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            LocationId::MainStreet => "The busy heart of town. Merchants shout, guards watch.",
            LocationId::WeaponShop => "Blades and clubs hang from every rafter.",
            LocationId::ArmorShop => "Rows of helms and mail shirts line the walls.",
            LocationId::Healer => "Herbs dry over a low fire. The healer looks up.",
            LocationId::Prison => "Cold stone and colder guards. Somewhere, chains rattle.",
            LocationId::PrisonCell => "Four walls, a bucket and a barred window.",
            LocationId::Gym => "Sweat, sand and the roar of the tournament crowd.",
            LocationId::QuestHall => "Parchments crowd the board. Scribes record every deed.",
        }
    }

    /// Locations directly reachable from here.
    pub fn neighbors(self) -> &'static [LocationId] {
        match self {
            LocationId::MainStreet => &[
                LocationId::WeaponShop,
                LocationId::ArmorShop,
                LocationId::Healer,
                LocationId::Prison,
                LocationId::Gym,
                LocationId::QuestHall,
            ],
            LocationId::Prison => &[LocationId::MainStreet, LocationId::PrisonCell],
            LocationId::PrisonCell
            | LocationId::WeaponShop
            | LocationId::ArmorShop
            | LocationId::Healer
            | LocationId::Gym
            | LocationId::QuestHall => &[LocationId::MainStreet],
        }
    }

    pub fn is_neighbor(self, other: LocationId) -> bool {
        self.neighbors().contains(&other)
    }

    /// Parse a location from user or config input (snake_case or title, case-insensitive).
    pub fn parse(input: &str) -> Result<Self, GameError> {
        let needle = input.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        LocationId::ALL
            .iter()
            .copied()
            .find(|loc| {
                loc.key() == needle || loc.title().to_ascii_lowercase().replace(' ', "_") == needle
            })
            .ok_or_else(|| GameError::UnknownLocation(input.to_string()))
    }

    pub fn key(self) -> &'static str {
        match self {
            LocationId::MainStreet => "main_street",
            LocationId::WeaponShop => "weapon_shop",
            LocationId::ArmorShop => "armor_shop",
            LocationId::Healer => "healer",
            LocationId::Prison => "prison",
            LocationId::PrisonCell => "prison_cell",
            LocationId::Gym => "gym",
            LocationId::QuestHall => "quest_hall",
        }
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// ============================================================================
// Items
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Weapon,
    Armor,
    Potion,
    Misc,
}

/// A concrete item carried in a pack or worn in a slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    /// Catalog key; two items with the same id are interchangeable.
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    /// Base value in gold. Shops pay half of this when buying back.
    pub value: u64,
    /// Weapon or armor power; zero for everything else.
    #[serde(default)]
    pub power: u32,
    #[serde(default)]
    pub cursed: bool,
}

impl Item {
    pub fn new(id: &str, name: &str, kind: ItemKind, value: u64, power: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            value,
            power,
            cursed: false,
        }
    }

    pub fn cursed(mut self) -> Self {
        self.cursed = true;
        self
    }
}

/// Worn weapon and armor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Equipment {
    pub weapon: Option<Item>,
    pub armor: Option<Item>,
}

impl Equipment {
    pub fn weapon_power(&self) -> u32 {
        self.weapon.as_ref().map(|w| w.power).unwrap_or(0)
    }

    pub fn armor_power(&self) -> u32 {
        self.armor.as_ref().map(|a| a.power).unwrap_or(0)
    }

    pub fn has_cursed_item(&self) -> bool {
        self.weapon.as_ref().is_some_and(|w| w.cursed) || self.armor.as_ref().is_some_and(|a| a.cursed)
    }
}

// ============================================================================
// Character
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stats {
    pub strength: u32,
    pub defence: u32,
    pub agility: u32,
    pub dexterity: u32,
    pub wisdom: u32,
    pub charisma: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            strength: 12,
            defence: 8,
            agility: 10,
            dexterity: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

/// Opposed alignment scores.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alignment {
    pub chivalry: u32,
    pub darkness: u32,
}

impl Alignment {
    /// Apply signed deltas, saturating at zero.
    pub fn adjust(&mut self, chivalry: i64, darkness: i64) {
        self.chivalry = saturating_apply(self.chivalry, chivalry);
        self.darkness = saturating_apply(self.darkness, darkness);
    }
}

fn saturating_apply(value: u32, delta: i64) -> u32 {
    (value as i64 + delta).clamp(0, u32::MAX as i64) as u32
}

/// Status flags that need a cure transaction to clear.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Afflictions {
    pub poisoned: bool,
    pub diseased: bool,
    pub cursed: bool,
}

impl Afflictions {
    pub fn any(&self) -> bool {
        self.poisoned || self.diseased || self.cursed
    }
}

/// A player or NPC. All shop, combat and quest code mutates characters only
/// through methods that keep `0 <= hp <= max_hp` and the pack within capacity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub level: u32,
    pub experience: u64,
    pub hp: u32,
    pub max_hp: u32,
    pub mana: u32,
    pub max_mana: u32,
    pub stats: Stats,
    pub gold: u64,
    pub inventory: Vec<Item>,
    pub inventory_capacity: usize,
    #[serde(default)]
    pub equipment: Equipment,
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default)]
    pub afflictions: Afflictions,
    pub location: LocationId,
    /// Days left to serve; zero when free.
    #[serde(default)]
    pub imprisoned_days: u32,
    /// Quests this character may still post today.
    #[serde(default)]
    pub quest_quota: u8,
    pub schema_version: u8,
}

impl Character {
    pub fn new(name: &str) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.to_string(),
            level: 1,
            experience: 0,
            hp: 30,
            max_hp: 30,
            mana: 10,
            max_mana: 10,
            stats: Stats::default(),
            gold: 0,
            inventory: Vec::new(),
            inventory_capacity: DEFAULT_INVENTORY_CAPACITY,
            equipment: Equipment::default(),
            alignment: Alignment::default(),
            afflictions: Afflictions::default(),
            location: LocationId::START,
            imprisoned_days: 0,
            quest_quota: 0,
            schema_version: CHARACTER_SCHEMA_VERSION,
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.max(1);
        self
    }

    pub fn with_hp(mut self, hp: u32, max_hp: u32) -> Self {
        self.max_hp = max_hp;
        self.hp = hp.min(max_hp);
        self
    }

    pub fn with_gold(mut self, gold: u64) -> Self {
        self.gold = gold;
        self
    }

    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.inventory_capacity = capacity;
        self
    }

    pub fn with_location(mut self, location: LocationId) -> Self {
        self.location = location;
        self
    }

    pub fn weapon_power(&self) -> u32 {
        self.equipment.weapon_power()
    }

    pub fn armor_power(&self) -> u32 {
        self.equipment.armor_power()
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn is_imprisoned(&self) -> bool {
        self.imprisoned_days > 0
    }

    /// Set HP, clamped to `[0, max_hp]`.
    pub fn set_hp(&mut self, hp: u32) {
        self.hp = hp.min(self.max_hp);
    }

    pub fn heal(&mut self, amount: u32) {
        self.set_hp(self.hp.saturating_add(amount));
    }

    pub fn damage(&mut self, amount: u32) {
        self.hp = self.hp.saturating_sub(amount);
    }

    pub fn missing_hp(&self) -> u32 {
        self.max_hp - self.hp.min(self.max_hp)
    }

    /// Add experience and raise the level for every threshold crossed.
    /// Returns the number of levels gained.
    pub fn add_experience(&mut self, amount: u64) -> u32 {
        self.experience = self.experience.saturating_add(amount);
        let mut gained = 0;
        while self.experience >= experience_for_level(self.level + 1) {
            self.level += 1;
            self.max_hp += 10;
            self.hp = self.hp.saturating_add(10).min(self.max_hp);
            self.stats.strength += 2;
            self.stats.defence += 1;
            self.stats.agility += 1;
            gained += 1;
        }
        gained
    }

    /// Check every data-model invariant. Used after loading snapshots.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.hp > self.max_hp {
            return Err(GameError::Invariant(format!(
                "{}: hp {} exceeds max {}",
                self.name, self.hp, self.max_hp
            )));
        }
        if self.inventory.len() > self.inventory_capacity {
            return Err(GameError::Invariant(format!(
                "{}: carrying {} items with capacity {}",
                self.name,
                self.inventory.len(),
                self.inventory_capacity
            )));
        }
        if self.level == 0 {
            return Err(GameError::Invariant(format!("{}: level 0", self.name)));
        }
        Ok(())
    }

    /// One-line status used by the global `status` command.
    pub fn status_line(&self) -> String {
        format!(
            "{} L{} HP {}/{} Gold {} XP {} Chiv {} Dark {}",
            self.name,
            self.level,
            self.hp,
            self.max_hp,
            self.gold,
            self.experience,
            self.alignment.chivalry,
            self.alignment.darkness
        )
    }
}

/// Experience required to stand at `level`.
pub fn experience_for_level(level: u32) -> u64 {
    let l = level.saturating_sub(1) as u64;
    l * l * 500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_location_except_start_has_an_inbound_neighbor() {
        for loc in LocationId::ALL {
            if loc == LocationId::START {
                continue;
            }
            let inbound = LocationId::ALL.iter().any(|other| other.is_neighbor(loc));
            assert!(inbound, "{} is orphaned", loc);
        }
    }

    #[test]
    fn parse_accepts_keys_and_titles() {
        assert_eq!(LocationId::parse("quest_hall").unwrap(), LocationId::QuestHall);
        assert_eq!(LocationId::parse("Main Street").unwrap(), LocationId::MainStreet);
        assert!(LocationId::parse("moon").is_err());
    }

    #[test]
    fn hp_mutation_stays_in_bounds() {
        let mut c = Character::new("Ayla").with_hp(10, 20);
        c.heal(50);
        assert_eq!(c.hp, 20);
        c.damage(500);
        assert_eq!(c.hp, 0);
        c.set_hp(99);
        assert_eq!(c.hp, 20);
    }

    #[test]
    fn experience_raises_level() {
        let mut c = Character::new("Ayla");
        assert_eq!(c.add_experience(499), 0);
        assert_eq!(c.level, 1);
        assert_eq!(c.add_experience(1), 1);
        assert_eq!(c.level, 2);
        assert_eq!(c.max_hp, 40);
    }

    #[test]
    fn validate_catches_overfull_pack() {
        let mut c = Character::new("Ayla").with_capacity(1);
        c.inventory.push(Item::new("a", "A", ItemKind::Misc, 1, 0));
        assert!(c.validate().is_ok());
        c.inventory.push(Item::new("b", "B", ItemKind::Misc, 1, 0));
        assert!(matches!(c.validate(), Err(GameError::Invariant(_))));
    }

    #[test]
    fn alignment_saturates_at_zero() {
        let mut a = Alignment::default();
        a.adjust(-5, 10);
        assert_eq!(a.chivalry, 0);
        assert_eq!(a.darkness, 10);
    }
}
