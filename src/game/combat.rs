//! Turn-based combat resolution.
//!
//! An [`Encounter`] pits one protagonist against an ordered list of
//! opponents (prison guards, tournament fighters). Each round the
//! protagonist strikes first; a surviving opponent strikes back. A defeated
//! opponent is replaced by the next one in line and the protagonist carries
//! their HP forward. Encounters work on [`CombatParticipant`] snapshots and
//! never touch the source [`Character`]; callers apply the final
//! [`CombatReport`] and decide what defeat costs.
//!
//! ```text
//! NotStarted -> InProgress -> { Victory | Defeat | Fled }
//! ```

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::game::rng::GameRng;
use crate::game::types::Character;

/// Experience granted per level of each opponent beaten in a won encounter.
pub const EXPERIENCE_PER_OPPONENT_LEVEL: u64 = 50;

/// Base flee chance before the agility bonus.
pub const BASE_FLEE_CHANCE: i64 = 40;

/// Attack-relevant stats captured at battle start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatParticipant {
    pub name: String,
    pub level: u32,
    pub strength: u32,
    pub defence: u32,
    pub weapon_power: u32,
    pub armor_power: u32,
    pub hp: u32,
    pub max_hp: u32,
    pub agility: u32,
}

impl CombatParticipant {
    pub fn from_character(character: &Character) -> Self {
        Self {
            name: character.name.clone(),
            level: character.level,
            strength: character.stats.strength,
            defence: character.stats.defence,
            weapon_power: character.weapon_power(),
            armor_power: character.armor_power(),
            hp: character.hp,
            max_hp: character.max_hp,
            agility: character.stats.agility,
        }
    }

    pub fn is_down(&self) -> bool {
        self.hp == 0
    }

    fn take_damage(&mut self, amount: u32) {
        self.hp = self.hp.saturating_sub(amount);
    }
}

// ============================================================================
// Formulas
// ============================================================================

/// `floor(strength / 3) + weapon_power`
pub fn base_damage(attacker: &CombatParticipant) -> i64 {
    (attacker.strength / 3) as i64 + attacker.weapon_power as i64
}

/// `max(1, floor(base / 3))`
pub fn damage_variance(base: i64) -> i64 {
    (base / 3).max(1)
}

/// `floor(defence / 4) + floor(armor_power / 2)`
pub fn defense_reduction(defender: &CombatParticipant) -> i64 {
    (defender.defence / 4) as i64 + (defender.armor_power / 2) as i64
}

/// `max(1, base + roll - floor(reduction / 2))` for a given roll.
pub fn damage_with_roll(attacker: &CombatParticipant, defender: &CombatParticipant, roll: i64) -> u32 {
    let base = base_damage(attacker);
    let reduction = defense_reduction(defender);
    (base + roll - reduction / 2).max(1) as u32
}

/// Lowest and highest damage `attacker` can deal to `defender`.
pub fn damage_range(attacker: &CombatParticipant, defender: &CombatParticipant) -> (u32, u32) {
    let variance = damage_variance(base_damage(attacker));
    (
        damage_with_roll(attacker, defender, -variance),
        damage_with_roll(attacker, defender, variance),
    )
}

/// Roll one strike. Always at least 1.
pub fn roll_damage(
    attacker: &CombatParticipant,
    defender: &CombatParticipant,
    rng: &mut dyn GameRng,
) -> u32 {
    let variance = damage_variance(base_damage(attacker));
    let roll = rng.roll(-variance, variance);
    damage_with_roll(attacker, defender, roll)
}

/// `clamp(40 + floor(agility / 5), 0, 100)`
pub fn flee_chance(agility: u32) -> u32 {
    (BASE_FLEE_CHANCE + (agility / 5) as i64).clamp(0, 100) as u32
}

/// Flee is on the table only when the protagonist is badly hurt and the
/// opponent is not.
pub fn flee_allowed(protagonist: &CombatParticipant, opponent: &CombatParticipant) -> bool {
    protagonist.hp < protagonist.max_hp / 3 && opponent.hp > opponent.max_hp / 4
}

// ============================================================================
// Encounter state machine
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterState {
    NotStarted,
    InProgress,
    Victory,
    Defeat,
    Fled,
}

impl EncounterState {
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            EncounterState::Victory | EncounterState::Defeat | EncounterState::Fled
        )
    }
}

/// What happened during a round, in order. Location handlers turn these into text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatEvent {
    Strike {
        attacker: String,
        defender: String,
        damage: u32,
        defender_hp: u32,
    },
    OpponentDefeated {
        name: String,
        level: u32,
    },
    NextOpponent {
        name: String,
    },
    ProtagonistDefeated,
    FleeSucceeded {
        chance: u32,
    },
    FleeFailed {
        chance: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefeatedOpponent {
    pub name: String,
    pub level: u32,
}

/// Final result of an encounter. Callers apply it to the source character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatReport {
    pub outcome: EncounterState,
    pub hp_before: u32,
    pub hp_after: u32,
    pub rounds: u32,
    pub defeated: Vec<DefeatedOpponent>,
    /// Non-zero only on victory.
    pub experience: u64,
}

impl CombatReport {
    pub fn hp_lost(&self) -> u32 {
        self.hp_before.saturating_sub(self.hp_after)
    }

    /// Write HP and experience back to the character the battle started from.
    /// Returns levels gained.
    pub fn apply_to(&self, character: &mut Character) -> u32 {
        character.set_hp(self.hp_after);
        if self.experience > 0 {
            character.add_experience(self.experience)
        } else {
            0
        }
    }
}

pub struct Encounter {
    protagonist: CombatParticipant,
    opponents: Vec<CombatParticipant>,
    current: usize,
    state: EncounterState,
    rounds: u32,
    hp_before: u32,
    defeated: Vec<DefeatedOpponent>,
}

impl Encounter {
    pub fn new(protagonist: CombatParticipant, opponents: Vec<CombatParticipant>) -> Self {
        let hp_before = protagonist.hp;
        Self {
            protagonist,
            opponents,
            current: 0,
            state: EncounterState::NotStarted,
            rounds: 0,
            hp_before,
            defeated: Vec::new(),
        }
    }

    pub fn state(&self) -> EncounterState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn protagonist(&self) -> &CombatParticipant {
        &self.protagonist
    }

    pub fn current_opponent(&self) -> Option<&CombatParticipant> {
        self.opponents.get(self.current)
    }

    pub fn opponents_remaining(&self) -> usize {
        self.opponents.len().saturating_sub(self.current)
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Run one attacker-then-defender exchange. A no-op once finished.
    pub fn play_round(&mut self, rng: &mut dyn GameRng) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        if self.state.is_finished() {
            return events;
        }
        self.state = EncounterState::InProgress;

        if self.protagonist.is_down() {
            self.state = EncounterState::Defeat;
            events.push(CombatEvent::ProtagonistDefeated);
            return events;
        }
        let Some(opponent) = self.opponents.get_mut(self.current) else {
            self.state = EncounterState::Victory;
            return events;
        };
        self.rounds += 1;

        let damage = roll_damage(&self.protagonist, opponent, rng);
        opponent.take_damage(damage);
        events.push(CombatEvent::Strike {
            attacker: self.protagonist.name.clone(),
            defender: opponent.name.clone(),
            damage,
            defender_hp: opponent.hp,
        });

        if opponent.is_down() {
            debug!("combat: {} defeated {}", self.protagonist.name, opponent.name);
            events.push(CombatEvent::OpponentDefeated {
                name: opponent.name.clone(),
                level: opponent.level,
            });
            self.defeated.push(DefeatedOpponent {
                name: opponent.name.clone(),
                level: opponent.level,
            });
            self.current += 1;
            match self.opponents.get(self.current) {
                Some(next) => events.push(CombatEvent::NextOpponent {
                    name: next.name.clone(),
                }),
                None => self.state = EncounterState::Victory,
            }
            return events;
        }

        let damage = roll_damage(opponent, &self.protagonist, rng);
        self.protagonist.take_damage(damage);
        events.push(CombatEvent::Strike {
            attacker: opponent.name.clone(),
            defender: self.protagonist.name.clone(),
            damage,
            defender_hp: self.protagonist.hp,
        });

        if self.protagonist.is_down() {
            self.state = EncounterState::Defeat;
            events.push(CombatEvent::ProtagonistDefeated);
        }
        events
    }

    /// Whether the caller may offer a flee attempt right now.
    pub fn flee_offered(&self) -> bool {
        if self.state != EncounterState::InProgress {
            return false;
        }
        self.current_opponent()
            .is_some_and(|opponent| flee_allowed(&self.protagonist, opponent))
    }

    /// Try to run. Returns `None` when flee is not on offer; a failed attempt
    /// leaves the encounter in progress.
    pub fn attempt_flee(&mut self, rng: &mut dyn GameRng) -> Option<CombatEvent> {
        if !self.flee_offered() {
            return None;
        }
        let chance = flee_chance(self.protagonist.agility);
        if rng.percent(chance) {
            self.state = EncounterState::Fled;
            Some(CombatEvent::FleeSucceeded { chance })
        } else {
            Some(CombatEvent::FleeFailed { chance })
        }
    }

    /// Play rounds until the encounter finishes. `wants_to_flee` is asked
    /// after every round where flee is offered; `on_events` sees each batch
    /// of events as it happens.
    pub fn resolve(
        &mut self,
        rng: &mut dyn GameRng,
        mut wants_to_flee: impl FnMut(&Encounter) -> bool,
        mut on_events: impl FnMut(&[CombatEvent]),
    ) -> CombatReport {
        while !self.is_finished() {
            let events = self.play_round(rng);
            on_events(&events);
            if self.flee_offered() && wants_to_flee(self) {
                if let Some(event) = self.attempt_flee(rng) {
                    on_events(std::slice::from_ref(&event));
                }
            }
        }
        self.report()
    }

    /// Snapshot of the result so far; `experience` is awarded only on victory.
    pub fn report(&self) -> CombatReport {
        let experience = if self.state == EncounterState::Victory {
            self.defeated
                .iter()
                .map(|d| d.level as u64 * EXPERIENCE_PER_OPPONENT_LEVEL)
                .sum()
        } else {
            0
        };
        if self.is_finished() {
            info!(
                "combat finished: protagonist={} outcome={:?} rounds={} hp={}->{} defeated={} xp={}",
                self.protagonist.name,
                self.state,
                self.rounds,
                self.hp_before,
                self.protagonist.hp,
                self.defeated.len(),
                experience
            );
        }
        CombatReport {
            outcome: self.state,
            hp_before: self.hp_before,
            hp_after: self.protagonist.hp,
            rounds: self.rounds,
            defeated: self.defeated.clone(),
            experience,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::rng::{ScriptedRng, StdGameRng};

    fn fighter(name: &str, strength: u32, weapon: u32, defence: u32, armor: u32, hp: u32) -> CombatParticipant {
        CombatParticipant {
            name: name.to_string(),
            level: 1,
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
    fn documented_damage_range() {
        let attacker = fighter("a", 20, 10, 0, 0, 50);
        let defender = fighter("d", 0, 0, 15, 5, 50);
        assert_eq!(base_damage(&attacker), 16);
        assert_eq!(damage_variance(16), 5);
        assert_eq!(defense_reduction(&defender), 5);
        assert_eq!(damage_range(&attacker, &defender), (9, 19));
    }

    #[test]
    fn damage_never_below_one() {
        let weakling = fighter("w", 0, 0, 0, 0, 10);
        let fortress = fighter("f", 0, 0, 400, 400, 10);
        let mut rng = StdGameRng::seeded(3);
        for _ in 0..200 {
            assert!(roll_damage(&weakling, &fortress, &mut rng) >= 1);
        }
        assert_eq!(damage_range(&weakling, &fortress), (1, 1));
    }

    #[test]
    fn variance_floor_is_one() {
        assert_eq!(damage_variance(0), 1);
        assert_eq!(damage_variance(2), 1);
        assert_eq!(damage_variance(9), 3);
    }

    #[test]
    fn flee_chance_is_clamped() {
        assert_eq!(flee_chance(0), 40);
        assert_eq!(flee_chance(50), 50);
        assert_eq!(flee_chance(10_000), 100);
    }

    #[test]
    fn flee_condition_uses_both_thresholds() {
        let mut hero = fighter("h", 10, 0, 0, 0, 30);
        let mut foe = fighter("f", 10, 0, 0, 0, 40);
        hero.hp = 9;
        assert!(flee_allowed(&hero, &foe));
        hero.hp = 10;
        assert!(!flee_allowed(&hero, &foe));
        hero.hp = 9;
        foe.hp = 10;
        assert!(!flee_allowed(&hero, &foe));
    }

    #[test]
    fn state_machine_starts_not_started_and_ends_in_victory() {
        let hero = fighter("hero", 30, 10, 10, 10, 100);
        let guard = fighter("guard", 3, 0, 0, 0, 5);
        let mut encounter = Encounter::new(hero, vec![guard]);
        assert_eq!(encounter.state(), EncounterState::NotStarted);
        let mut rng = ScriptedRng::new(vec![0]);
        encounter.play_round(&mut rng);
        assert_eq!(encounter.state(), EncounterState::Victory);
        assert!(encounter.play_round(&mut rng).is_empty());
    }

    #[test]
    fn defeated_opponent_does_not_counter() {
        let hero = fighter("hero", 30, 10, 10, 10, 100);
        let guard = fighter("guard", 30, 10, 0, 0, 1);
        let mut encounter = Encounter::new(hero, vec![guard]);
        let events = encounter.play_round(&mut ScriptedRng::new(vec![0]));
        assert_eq!(events.len(), 2);
        assert_eq!(encounter.protagonist().hp, 100);
    }

    #[test]
    fn protagonist_at_zero_is_defeat() {
        let hero = fighter("hero", 1, 0, 0, 0, 3);
        let brute = fighter("brute", 60, 20, 50, 50, 200);
        let mut encounter = Encounter::new(hero, vec![brute]);
        let report = encounter.resolve(&mut StdGameRng::seeded(9), |_| false, |_| {});
        assert_eq!(report.outcome, EncounterState::Defeat);
        assert_eq!(report.hp_after, 0);
        assert_eq!(report.experience, 0);
    }

    #[test]
    fn flee_is_offered_only_when_allowed() {
        let mut hero = fighter("hero", 1, 0, 0, 0, 30);
        hero.agility = 500;
        let brute = fighter("brute", 15, 0, 50, 50, 200);
        let mut encounter = Encounter::new(hero, vec![brute]);
        let mut rng = ScriptedRng::new(vec![0]);
        let mut offered_when = Vec::new();
        let report = encounter.resolve(
            &mut rng,
            |enc| {
                offered_when.push(enc.protagonist().hp);
                true
            },
            |_| {},
        );
        assert_eq!(report.outcome, EncounterState::Fled);
        assert!(offered_when.iter().all(|hp| *hp < 10));
    }

    #[test]
    fn failed_flee_keeps_fighting() {
        let mut hero = fighter("hero", 1, 0, 0, 0, 30);
        hero.hp = 5;
        let foe = fighter("foe", 6, 0, 0, 0, 100);
        let mut encounter = Encounter::new(hero, vec![foe]);
        // Strike rolls clamp to 0; the flee roll of 100 beats a 42% chance.
        let mut rng = ScriptedRng::new(vec![0, 0, 100]);
        encounter.play_round(&mut rng);
        assert!(encounter.flee_offered());
        let event = encounter.attempt_flee(&mut rng);
        assert_eq!(event, Some(CombatEvent::FleeFailed { chance: 42 }));
        assert_eq!(encounter.state(), EncounterState::InProgress);
    }

    #[test]
    fn empty_opponent_list_is_immediate_victory() {
        let mut encounter = Encounter::new(fighter("hero", 1, 0, 0, 0, 10), Vec::new());
        encounter.play_round(&mut ScriptedRng::new(vec![]));
        assert_eq!(encounter.report().outcome, EncounterState::Victory);
        assert_eq!(encounter.report().experience, 0);
    }
}
