//! Command parsing shared by every location.
//!
//! Input is split into a lowercase verb and the untouched remainder. Global
//! commands are recognised here so the state machine can intercept them
//! before a location sees the input.

use crate::game::quest::QuestBoard;
use crate::game::types::Character;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub verb: String,
    pub args: String,
}

impl Command {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let (verb, args) = match trimmed.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (trimmed, ""),
        };
        Some(Self {
            verb: verb.to_ascii_lowercase(),
            args: args.to_string(),
        })
    }

    /// The argument as a 1-based menu index, converted to 0-based.
    pub fn index_arg(&self) -> Option<usize> {
        self.args
            .split_whitespace()
            .next()?
            .parse::<usize>()
            .ok()
            .filter(|n| *n >= 1)
            .map(|n| n - 1)
    }

    pub fn is(&self, names: &[&str]) -> bool {
        names.contains(&self.verb.as_str())
    }
}

/// Commands every location inherits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalCommand {
    Help,
    Status,
    Inventory,
    Journal,
}

impl GlobalCommand {
    pub fn recognize(command: &Command) -> Option<Self> {
        match command.verb.as_str() {
            "?" | "help" => Some(GlobalCommand::Help),
            "s" | "status" | "stats" => Some(GlobalCommand::Status),
            "i" | "inv" | "inventory" => Some(GlobalCommand::Inventory),
            "j" | "journal" => Some(GlobalCommand::Journal),
            _ => None,
        }
    }
}

pub fn global_help() -> Vec<String> {
    vec![
        "Anywhere: ? help | S status | I inventory | J journal | QUIT".to_string(),
    ]
}

pub fn status_lines(character: &Character) -> Vec<String> {
    let mut lines = vec![character.status_line()];
    lines.push(format!(
        "Str {} Def {} Agi {} Dex {} Wis {} Cha {}",
        character.stats.strength,
        character.stats.defence,
        character.stats.agility,
        character.stats.dexterity,
        character.stats.wisdom,
        character.stats.charisma
    ));
    let weapon = character
        .equipment
        .weapon
        .as_ref()
        .map(|w| format!("{} ({})", w.name, w.power))
        .unwrap_or_else(|| "bare hands".to_string());
    let armor = character
        .equipment
        .armor
        .as_ref()
        .map(|a| format!("{} ({})", a.name, a.power))
        .unwrap_or_else(|| "none".to_string());
    lines.push(format!("Weapon: {} Armor: {}", weapon, armor));

    let a = &character.afflictions;
    if a.any() {
        let mut flags = Vec::new();
        if a.poisoned {
            flags.push("poisoned");
        }
        if a.diseased {
            flags.push("diseased");
        }
        if a.cursed {
            flags.push("cursed");
        }
        lines.push(format!("Afflictions: {}", flags.join(", ")));
    }
    if character.is_imprisoned() {
        lines.push(format!("Sentence: {} day(s) left", character.imprisoned_days));
    }
    lines.push(format!("Location: {}", character.location));
    lines
}

pub fn inventory_lines(character: &Character) -> Vec<String> {
    if character.inventory.is_empty() {
        return vec![format!("Your pack is empty (0/{}).", character.inventory_capacity)];
    }
    let mut lines: Vec<String> = character
        .inventory
        .iter()
        .enumerate()
        .map(|(idx, item)| format!("{}. {} (worth {})", idx + 1, item.name, item.value))
        .collect();
    lines.push(format!(
        "Carrying {}/{} items, {} gold.",
        character.inventory.len(),
        character.inventory_capacity,
        character.gold
    ));
    lines
}

pub fn journal_lines(character: &Character, quests: &QuestBoard) -> Vec<String> {
    let active = quests.player_quests(character.id);
    if active.is_empty() {
        return vec!["You have no active quests.".to_string()];
    }
    let mut lines = Vec::new();
    for (idx, quest) in active.iter().enumerate() {
        lines.push(format!("{}. {}", idx + 1, quest.summary()));
        lines.extend(quest.progress_lines().into_iter().map(|l| format!("   {}", l)));
    }
    lines
}
