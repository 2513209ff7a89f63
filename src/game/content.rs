//! Shop catalogs and NPC templates. Pure data plus a few builders; nothing
//! here enforces game rules.

use crate::game::economy::ShopListing;
use crate::game::rng::GameRng;
use crate::game::types::{Character, Item, ItemKind, Stats};

pub fn weapon_catalog() -> Vec<ShopListing> {
    vec![
        ShopListing::at_value(Item::new("dagger", "Dagger", ItemKind::Weapon, 150, 3)),
        ShopListing::at_value(Item::new("short_sword", "Short Sword", ItemKind::Weapon, 400, 6)),
        ShopListing::at_value(Item::new("long_sword", "Long Sword", ItemKind::Weapon, 900, 10)),
        ShopListing::at_value(Item::new("battle_axe", "Battle Axe", ItemKind::Weapon, 2_000, 15)),
        ShopListing::at_value(Item::new("war_hammer", "War Hammer", ItemKind::Weapon, 4_500, 21)),
        ShopListing::new(
            Item::new("black_blade", "Black Blade", ItemKind::Weapon, 6_000, 28).cursed(),
            3_000,
        ),
    ]
}

pub fn armor_catalog() -> Vec<ShopListing> {
    vec![
        ShopListing::at_value(Item::new("leather", "Leather Jerkin", ItemKind::Armor, 120, 2)),
        ShopListing::at_value(Item::new("studded", "Studded Leather", ItemKind::Armor, 350, 4)),
        ShopListing::at_value(Item::new("chain_mail", "Chain Mail", ItemKind::Armor, 850, 7)),
        ShopListing::at_value(Item::new("plate", "Plate Armor", ItemKind::Armor, 2_400, 12)),
        ShopListing::at_value(Item::new("healing_potion", "Healing Potion", ItemKind::Potion, 60, 0)),
    ]
}

const FIGHTER_NAMES: &[&str] = &[
    "Brutus", "Kara the Quick", "Old Tom", "Svenn", "Iron Maud", "Grell", "Nadia", "Big Ulf",
];

const PRISONER_NAMES: &[&str] = &["Black Jack", "Sly Vera", "Mad Orrin", "Quiet Pell"];

/// A generic NPC fighter scaled to `level`.
pub fn npc_fighter(name: &str, level: u32) -> Character {
    let level = level.max(1);
    let hp = 20 + level * 8;
    let mut npc = Character::new(name)
        .with_level(level)
        .with_hp(hp, hp)
        .with_stats(Stats {
            strength: 8 + level * 2,
            defence: 5 + level,
            agility: 8 + level,
            ..Stats::default()
        });
    npc.equipment.weapon = Some(Item::new("npc_weapon", "Worn Blade", ItemKind::Weapon, 0, level * 2));
    npc.equipment.armor = Some(Item::new("npc_armor", "Worn Mail", ItemKind::Armor, 0, level));
    npc
}

/// `count` prison guards, numbered so the log tells them apart.
pub fn prison_guards(count: usize, level: u32) -> Vec<Character> {
    (1..=count)
        .map(|n| npc_fighter(&format!("Guard #{}", n), level))
        .collect()
}

/// Tournament opponents around the challenger's level.
pub fn tournament_opponents(count: usize, level: u32, rng: &mut dyn GameRng) -> Vec<Character> {
    (0..count)
        .map(|_| {
            let name = FIGHTER_NAMES[rng.pick(FIGHTER_NAMES.len())];
            let swing = rng.roll(-1, 1);
            let opponent_level = (level as i64 + swing).max(1) as u32;
            npc_fighter(name, opponent_level)
        })
        .collect()
}

/// Starting prison population.
pub fn starting_prisoners(rng: &mut dyn GameRng) -> Vec<(Character, u32)> {
    PRISONER_NAMES
        .iter()
        .map(|name| {
            let level = rng.roll(1, 8) as u32;
            let days = rng.roll(2, 10) as u32;
            (npc_fighter(name, level), days)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::rng::StdGameRng;

    #[test]
    fn catalog_ids_are_unique() {
        let mut ids: Vec<String> = weapon_catalog()
            .into_iter()
            .chain(armor_catalog())
            .map(|l| l.item.id)
            .collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn npc_fighters_are_valid_characters() {
        let mut rng = StdGameRng::seeded(5);
        for npc in tournament_opponents(5, 3, &mut rng) {
            assert!(npc.validate().is_ok());
            assert!((2..=4).contains(&npc.level));
        }
        assert_eq!(prison_guards(3, 4).len(), 3);
    }
}
