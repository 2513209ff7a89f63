//! Registry of NPCs held in the royal prison, keyed by stable character id.

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::game::errors::GameError;
use crate::game::types::{Character, CharacterId};
use crate::logutil::escape_log;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prisoner {
    pub npc: Character,
    pub days_left: u32,
}

#[derive(Debug, Clone, Default)]
pub struct PrisonerRegistry {
    prisoners: BTreeMap<CharacterId, Prisoner>,
}

impl PrisonerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from a saved prisoner list.
    pub fn from_prisoners(prisoners: Vec<Prisoner>) -> Self {
        Self {
            prisoners: prisoners.into_iter().map(|p| (p.npc.id, p)).collect(),
        }
    }

    pub fn imprison(&mut self, npc: Character, days: u32) {
        info!("{} imprisoned for {} days", escape_log(&npc.name), days);
        self.prisoners.insert(
            npc.id,
            Prisoner {
                npc,
                days_left: days.max(1),
            },
        );
    }

    pub fn prisoners(&self) -> Vec<&Prisoner> {
        self.prisoners.values().collect()
    }

    pub fn len(&self) -> usize {
        self.prisoners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prisoners.is_empty()
    }

    /// Case-insensitive lookup by display name; the first match wins.
    pub fn find_prisoner(&self, name: &str) -> Option<&Prisoner> {
        let needle = name.trim();
        self.prisoners
            .values()
            .find(|p| p.npc.name.eq_ignore_ascii_case(needle))
    }

    /// Set an NPC free. `rescuer` is recorded in the log only.
    pub fn release_npc(&mut self, id: CharacterId, rescuer: &str) -> Result<Character, GameError> {
        let prisoner = self
            .prisoners
            .remove(&id)
            .ok_or_else(|| GameError::NotFound(format!("prisoner {}", id)))?;
        info!(
            target: "security",
            "{} released from prison by {}",
            escape_log(&prisoner.npc.name),
            escape_log(rescuer)
        );
        Ok(prisoner.npc)
    }

    /// Advance the prison calendar one day, releasing anyone whose sentence ends.
    pub fn serve_day(&mut self) -> Vec<Character> {
        let done: Vec<CharacterId> = self
            .prisoners
            .iter_mut()
            .filter_map(|(id, p)| {
                p.days_left = p.days_left.saturating_sub(1);
                (p.days_left == 0).then_some(*id)
            })
            .collect();
        done.into_iter()
            .filter_map(|id| self.prisoners.remove(&id).map(|p| p.npc))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_different_ids_do_not_collide() {
        let mut reg = PrisonerRegistry::new();
        reg.imprison(Character::new("Grim"), 3);
        reg.imprison(Character::new("Grim"), 3);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn find_is_case_insensitive_and_release_removes() {
        let mut reg = PrisonerRegistry::new();
        let npc = Character::new("Black Jack");
        let id = npc.id;
        reg.imprison(npc, 5);
        assert_eq!(reg.find_prisoner("black jack").map(|p| p.npc.id), Some(id));
        let freed = reg.release_npc(id, "Ayla").unwrap();
        assert_eq!(freed.name, "Black Jack");
        assert!(reg.find_prisoner("Black Jack").is_none());
        assert!(matches!(reg.release_npc(id, "Ayla"), Err(GameError::NotFound(_))));
    }

    #[test]
    fn serving_days_releases_at_zero() {
        let mut reg = PrisonerRegistry::new();
        reg.imprison(Character::new("Short"), 1);
        reg.imprison(Character::new("Long"), 2);
        let out = reg.serve_day();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Short");
        assert_eq!(reg.len(), 1);
    }
}
