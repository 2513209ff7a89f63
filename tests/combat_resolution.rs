// Integration tests for the combat resolver: damage formula, sequential
// guard battles, experience and the flee rule.

use questhold::game::combat::{damage_range, flee_allowed, flee_chance, roll_damage};
use questhold::game::content::{npc_fighter, prison_guards};
use questhold::game::{
    CombatEvent, CombatParticipant, Encounter, EncounterState, ScriptedRng, StdGameRng,
};

fn participant(name: &str, level: u32, strength: u32, weapon: u32, defence: u32, armor: u32, hp: u32) -> CombatParticipant {
    CombatParticipant {
        name: name.to_string(),
        level,
        strength,
        defence,
        weapon_power: weapon,
        armor_power: armor,
        hp,
        max_hp: hp,
        agility: 10,
    }
}

#[test]
fn test_documented_damage_window() {
    let attacker = participant("attacker", 1, 20, 10, 0, 0, 50);
    let defender = participant("defender", 1, 0, 0, 15, 5, 50);
    assert_eq!(damage_range(&attacker, &defender), (9, 19));

    let mut rng = StdGameRng::seeded(2024);
    let mut seen_low = false;
    let mut seen_high = false;
    for _ in 0..2_000 {
        let dmg = roll_damage(&attacker, &defender, &mut rng);
        assert!((9..=19).contains(&dmg), "damage {} out of range", dmg);
        seen_low |= dmg == 9;
        seen_high |= dmg == 19;
    }
    assert!(seen_low && seen_high);
}

#[test]
fn test_guards_are_fought_in_order_without_healing() {
    let hero = participant("Hero", 5, 30, 5, 10, 4, 120);
    let guard_a = participant("Guard A", 2, 12, 2, 4, 0, 20);
    let guard_b = participant("Guard B", 3, 12, 2, 4, 0, 30);
    let mut encounter = Encounter::new(hero, vec![guard_a, guard_b]);

    let mut hp_when_b_appeared = None;
    let mut hp_after_a = None;
    let mut rng = ScriptedRng::new(vec![0]);
    while !encounter.is_finished() {
        let events = encounter.play_round(&mut rng);
        for event in &events {
            match event {
                CombatEvent::OpponentDefeated { name, .. } if name == "Guard A" => {
                    hp_after_a = Some(encounter.protagonist().hp);
                }
                CombatEvent::NextOpponent { name } if name == "Guard B" => {
                    hp_when_b_appeared = Some(encounter.protagonist().hp);
                }
                _ => {}
            }
        }
    }

    let report = encounter.report();
    assert_eq!(report.outcome, EncounterState::Victory);
    assert_eq!(hp_after_a, hp_when_b_appeared);
    assert!(hp_after_a.expect("guard A fell") < 120);
    assert_eq!(report.experience, 2 * 50 + 3 * 50);
    assert_eq!(report.defeated.len(), 2);
    assert!(report.hp_after <= hp_after_a.expect("guard A fell"));
}

#[test]
fn test_defeat_mid_line_pays_no_experience() {
    let hero = participant("Hero", 1, 12, 0, 8, 0, 30);
    let guards: Vec<CombatParticipant> = prison_guards(2, 6)
        .iter()
        .map(CombatParticipant::from_character)
        .collect();
    let mut encounter = Encounter::new(hero, guards);
    let report = encounter.resolve(&mut StdGameRng::seeded(11), |_| false, |_| {});
    assert_eq!(report.outcome, EncounterState::Defeat);
    assert_eq!(report.experience, 0);
    assert_eq!(report.hp_after, 0);
}

#[test]
fn test_every_strike_deals_at_least_one() {
    let mouse = participant("Mouse", 1, 1, 0, 0, 0, 500);
    let wall = CombatParticipant::from_character(&npc_fighter("Wall", 40));
    let mut encounter = Encounter::new(mouse, vec![wall]);
    let mut rng = StdGameRng::seeded(5);
    for _ in 0..20 {
        for event in encounter.play_round(&mut rng) {
            if let CombatEvent::Strike { damage, .. } = event {
                assert!(damage >= 1);
            }
        }
    }
}

#[test]
fn test_flee_window_and_probability_bounds() {
    let mut hero = participant("Hero", 1, 10, 0, 0, 0, 30);
    let mut foe = participant("Foe", 1, 10, 0, 0, 0, 40);
    hero.hp = 9;
    foe.hp = 11;
    assert!(flee_allowed(&hero, &foe));
    foe.hp = 10;
    assert!(!flee_allowed(&hero, &foe));

    for agility in [0, 1, 59, 300, u32::MAX] {
        let chance = flee_chance(agility);
        assert!(chance <= 100);
        assert!(chance >= 40);
    }
}

#[test]
fn test_successful_flee_ends_encounter() {
    let mut hero = participant("Hero", 1, 3, 0, 0, 0, 30);
    hero.hp = 6;
    hero.agility = 300;
    let foe = participant("Foe", 1, 6, 0, 0, 0, 100);
    let mut encounter = Encounter::new(hero, vec![foe]);
    let mut rng = ScriptedRng::new(vec![0]);
    encounter.play_round(&mut rng);
    assert!(encounter.flee_offered());
    assert_eq!(
        encounter.attempt_flee(&mut rng),
        Some(CombatEvent::FleeSucceeded { chance: 100 })
    );
    let report = encounter.report();
    assert_eq!(report.outcome, EncounterState::Fled);
    assert_eq!(report.experience, 0);
}
