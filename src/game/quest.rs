/// Quest lifecycle for the Quest Hall.
///
/// A quest moves `Created -> Available -> Claimed -> {Completed | Expired | Abandoned}`.
/// The [`QuestBoard`] owns every quest and enforces the eligibility rules:
/// one occupier at a time, a level window, a cap on concurrently claimed
/// quests per character, and a creation quota for character-posted quests.
/// Crown bounties skip the quota.
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::game::economy::{self, TransactionReason};
use crate::game::errors::GameError;
use crate::game::types::{Character, CharacterId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct QuestId(pub Uuid);

impl QuestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for QuestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    MonsterHunt,
    Assassination,
    Seduction,
    Territory,
    GangWar,
}

impl QuestKind {
    pub const ALL: [QuestKind; 5] = [
        QuestKind::MonsterHunt,
        QuestKind::Assassination,
        QuestKind::Seduction,
        QuestKind::Territory,
        QuestKind::GangWar,
    ];

    pub fn label(self) -> &'static str {
        match self {
            QuestKind::MonsterHunt => "Monster Hunt",
            QuestKind::Assassination => "Assassination",
            QuestKind::Seduction => "Seduction",
            QuestKind::Territory => "Territory",
            QuestKind::GangWar => "Gang War",
        }
    }
}

/// Who posted a quest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestInitiator {
    Character { id: CharacterId, name: String },
    Crown,
}

impl QuestInitiator {
    pub fn name(&self) -> &str {
        match self {
            QuestInitiator::Character { name, .. } => name,
            QuestInitiator::Crown => "The Crown",
        }
    }
}

/// What kind of deed advances an objective when reported through
/// [`QuestBoard::record_event`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveTarget {
    /// Tournament or arena opponents beaten.
    Opponents,
    /// Prison guards beaten.
    PrisonGuards,
    /// Prisoners set free.
    PrisonersFreed,
    /// Advanced only by explicit progress reports.
    Manual,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestObjective {
    pub id: u8,
    pub description: String,
    pub target: ObjectiveTarget,
    pub required: u32,
    pub progress: u32,
}

impl QuestObjective {
    pub fn is_complete(&self) -> bool {
        self.progress >= self.required
    }

    pub fn increment_progress(&mut self, amount: u32) {
        self.progress = self.progress.saturating_add(amount).min(self.required);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestReward {
    pub gold: u64,
    pub experience: u64,
    #[serde(default)]
    pub chivalry: i64,
    #[serde(default)]
    pub darkness: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    Created,
    Available,
    Claimed { claimed_at: DateTime<Utc> },
    Completed { completed_at: DateTime<Utc> },
    Expired { expired_at: DateTime<Utc> },
    Abandoned { abandoned_at: DateTime<Utc> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quest {
    pub id: QuestId,
    pub kind: QuestKind,
    /// Tier 1-4.
    pub difficulty: u8,
    pub initiator: QuestInitiator,
    pub comment: String,
    pub min_level: u32,
    pub max_level: u32,
    pub objectives: Vec<QuestObjective>,
    pub days_to_complete: u32,
    pub reward: QuestReward,
    pub occupier: Option<CharacterId>,
    pub status: QuestStatus,
    pub created_at: DateTime<Utc>,
}

impl Quest {
    pub fn is_available(&self) -> bool {
        self.status == QuestStatus::Available && self.occupier.is_none()
    }

    pub fn is_claimed(&self) -> bool {
        matches!(self.status, QuestStatus::Claimed { .. })
    }

    pub fn is_bounty(&self) -> bool {
        self.kind == QuestKind::Assassination && self.initiator == QuestInitiator::Crown
    }

    pub fn level_fits(&self, level: u32) -> bool {
        (self.min_level..=self.max_level).contains(&level)
    }

    pub fn all_objectives_complete(&self) -> bool {
        self.objectives.iter().all(|obj| obj.is_complete())
    }

    /// When a claimed quest runs out of time.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        match self.status {
            QuestStatus::Claimed { claimed_at } => {
                Some(claimed_at + Duration::days(self.days_to_complete as i64))
            }
            _ => None,
        }
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.deadline().is_some_and(|deadline| now > deadline)
    }

    /// When the quest was completed, expired or abandoned.
    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        match self.status {
            QuestStatus::Completed { completed_at } => Some(completed_at),
            QuestStatus::Expired { expired_at } => Some(expired_at),
            QuestStatus::Abandoned { abandoned_at } => Some(abandoned_at),
            QuestStatus::Created | QuestStatus::Available | QuestStatus::Claimed { .. } => None,
        }
    }

    fn expire(&mut self, now: DateTime<Utc>) {
        self.occupier = None;
        self.clear_progress();
        self.status = QuestStatus::Expired { expired_at: now };
    }

    fn clear_progress(&mut self) {
        for objective in &mut self.objectives {
            objective.progress = 0;
        }
    }

    /// One-line summary for lists.
    pub fn summary(&self) -> String {
        let tag = if self.is_bounty() { " [Bounty]" } else { "" };
        format!(
            "{} T{} L{}-{} {}d by {}{}",
            self.kind.label(),
            self.difficulty,
            self.min_level,
            self.max_level,
            self.days_to_complete,
            self.initiator.name(),
            tag
        )
    }

    pub fn progress_lines(&self) -> Vec<String> {
        self.objectives
            .iter()
            .map(|obj| {
                let mark = if obj.is_complete() { "x" } else { " " };
                format!("[{}] {} [{}/{}]", mark, obj.description, obj.progress, obj.required)
            })
            .collect()
    }
}

// ============================================================================
// Drafts and defaults
// ============================================================================

/// Inputs for posting a quest. Unset fields default from the difficulty tier.
#[derive(Debug, Clone)]
pub struct QuestDraft {
    pub kind: QuestKind,
    pub difficulty: u8,
    pub comment: String,
    pub level_range: Option<(u32, u32)>,
    pub objectives: Vec<(String, ObjectiveTarget, u32)>,
    pub days_to_complete: Option<u32>,
    pub reward: Option<QuestReward>,
}

impl QuestDraft {
    pub fn new(kind: QuestKind, difficulty: u8, comment: &str) -> Self {
        Self {
            kind,
            difficulty,
            comment: comment.to_string(),
            level_range: None,
            objectives: Vec::new(),
            days_to_complete: None,
            reward: None,
        }
    }

    pub fn with_level_range(mut self, min: u32, max: u32) -> Self {
        self.level_range = Some((min.min(max), min.max(max)));
        self
    }

    pub fn with_objective(mut self, description: &str, target: ObjectiveTarget, required: u32) -> Self {
        self.objectives.push((description.to_string(), target, required.max(1)));
        self
    }

    pub fn with_days(mut self, days: u32) -> Self {
        self.days_to_complete = Some(days.max(1));
        self
    }

    pub fn with_reward(mut self, reward: QuestReward) -> Self {
        self.reward = Some(reward);
        self
    }
}

pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 4;

/// Level window a tier is open to when the poster leaves it unset.
pub fn default_level_range(difficulty: u8) -> (u32, u32) {
    match difficulty {
        1 => (1, 20),
        2 => (10, 40),
        3 => (30, 70),
        _ => (50, 100),
    }
}

pub fn default_days(difficulty: u8) -> u32 {
    match difficulty {
        1 => 5,
        2 => 7,
        3 => 10,
        _ => 14,
    }
}

pub fn default_reward(kind: QuestKind, difficulty: u8) -> QuestReward {
    let tier = difficulty as u64;
    let (chivalry, darkness) = match kind {
        QuestKind::MonsterHunt | QuestKind::Territory => (10 * tier as i64, 0),
        QuestKind::Assassination | QuestKind::GangWar => (0, 10 * tier as i64),
        QuestKind::Seduction => (0, 0),
    };
    QuestReward {
        gold: 1000 * tier,
        experience: 500 * tier,
        chivalry,
        darkness,
    }
}

fn default_objective(kind: QuestKind, difficulty: u8) -> (String, ObjectiveTarget, u32) {
    let count = difficulty as u32 * 2;
    match kind {
        QuestKind::MonsterHunt => (format!("Defeat {} opponents", count), ObjectiveTarget::Opponents, count),
        QuestKind::GangWar => (format!("Beat {} prison guards", count), ObjectiveTarget::PrisonGuards, count),
        QuestKind::Territory => ("Free a prisoner".to_string(), ObjectiveTarget::PrisonersFreed, 1),
        QuestKind::Assassination => ("Eliminate the mark".to_string(), ObjectiveTarget::Manual, 1),
        QuestKind::Seduction => ("Win the heart".to_string(), ObjectiveTarget::Manual, 1),
    }
}

// ============================================================================
// Outcomes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(QuestId),
    NoQuotaRemaining,
    InvalidDifficulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Claimed,
    IneligibleLevel,
    AlreadyClaimed,
    CapacityExceeded,
    /// Completed, expired or abandoned quests cannot be claimed again.
    Closed,
}

impl ClaimOutcome {
    pub fn message(self) -> &'static str {
        match self {
            ClaimOutcome::Claimed => "The scribe records your name. Good luck.",
            ClaimOutcome::IneligibleLevel => "That quest is not meant for someone of your level.",
            ClaimOutcome::AlreadyClaimed => "Someone has already taken that quest.",
            ClaimOutcome::CapacityExceeded => "You already carry as many quests as you can handle.",
            ClaimOutcome::Closed => "That quest is closed.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompleteOutcome {
    Success { reward: QuestReward, levels_gained: u32 },
    RequirementsNotMet,
    NotOwner,
    /// The deadline passed before turn-in; the quest is now `Expired`.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbandonOutcome {
    Abandoned,
    NotOwner,
}

// ============================================================================
// Board
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestConfig {
    /// Quests a character may hold claimed at once.
    pub max_active_per_character: usize,
}

impl Default for QuestConfig {
    fn default() -> Self {
        Self {
            max_active_per_character: 3,
        }
    }
}

/// Closed quests stay on the board (and in saves) this long before pruning.
pub const CLOSED_QUEST_RETENTION_DAYS: i64 = 30;

/// Registry of every quest in the realm, in posting order.
#[derive(Debug, Clone, Default)]
pub struct QuestBoard {
    config: QuestConfig,
    quests: Vec<Quest>,
}

impl QuestBoard {
    pub fn new(config: QuestConfig) -> Self {
        Self {
            config,
            quests: Vec::new(),
        }
    }

    /// Rebuild a board from persisted quests.
    pub fn from_quests(config: QuestConfig, quests: Vec<Quest>) -> Self {
        Self { config, quests }
    }

    pub fn config(&self) -> &QuestConfig {
        &self.config
    }

    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    pub fn get(&self, quest_id: QuestId) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == quest_id)
    }

    fn get_mut(&mut self, quest_id: QuestId) -> Result<&mut Quest, GameError> {
        self.quests
            .iter_mut()
            .find(|q| q.id == quest_id)
            .ok_or_else(|| GameError::NotFound(format!("quest {}", quest_id)))
    }

    fn build(initiator: QuestInitiator, draft: QuestDraft) -> Quest {
        let difficulty = draft.difficulty;
        let (min_level, max_level) = draft
            .level_range
            .unwrap_or_else(|| default_level_range(difficulty));
        let mut objectives = draft.objectives;
        if objectives.is_empty() {
            objectives.push(default_objective(draft.kind, difficulty));
        }
        Quest {
            id: QuestId::new(),
            kind: draft.kind,
            difficulty,
            initiator,
            comment: draft.comment,
            min_level,
            max_level,
            objectives: objectives
                .into_iter()
                .enumerate()
                .map(|(idx, (description, target, required))| QuestObjective {
                    id: idx as u8 + 1,
                    description,
                    target,
                    required,
                    progress: 0,
                })
                .collect(),
            days_to_complete: draft.days_to_complete.unwrap_or_else(|| default_days(difficulty)),
            reward: draft.reward.unwrap_or_else(|| default_reward(draft.kind, difficulty)),
            occupier: None,
            status: QuestStatus::Created,
            created_at: Utc::now(),
        }
    }

    fn publish(&mut self, mut quest: Quest) -> QuestId {
        debug!("quest {} created by {}", quest.id, quest.initiator.name());
        quest.status = QuestStatus::Available;
        let id = quest.id;
        info!("quest posted: id={} {}", id, quest.summary());
        self.quests.push(quest);
        id
    }

    /// Post a quest on behalf of a character, spending one unit of quota.
    pub fn create(&mut self, initiator: &mut Character, draft: QuestDraft) -> CreateOutcome {
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&draft.difficulty) {
            return CreateOutcome::InvalidDifficulty;
        }
        if initiator.quest_quota == 0 {
            return CreateOutcome::NoQuotaRemaining;
        }
        initiator.quest_quota -= 1;
        let quest = Self::build(
            QuestInitiator::Character {
                id: initiator.id,
                name: initiator.name.clone(),
            },
            draft,
        );
        CreateOutcome::Created(self.publish(quest))
    }

    /// Post a Crown bounty on `mark`. No quota applies.
    pub fn post_bounty(&mut self, mark: &str, difficulty: u8, reward: Option<QuestReward>) -> CreateOutcome {
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
            return CreateOutcome::InvalidDifficulty;
        }
        let mut draft = QuestDraft::new(
            QuestKind::Assassination,
            difficulty,
            &format!("The Crown wants {} gone.", mark),
        )
        .with_objective(&format!("Bring down {}", mark), ObjectiveTarget::Manual, 1);
        draft.reward = reward;
        let quest = Self::build(QuestInitiator::Crown, draft);
        info!(target: "security", "crown bounty posted on {}", crate::logutil::escape_log(mark));
        CreateOutcome::Created(self.publish(quest))
    }

    /// Unclaimed quests whose level window includes `character`.
    pub fn list_available(&self, character: &Character) -> Vec<&Quest> {
        self.quests
            .iter()
            .filter(|q| q.is_available() && q.level_fits(character.level))
            .collect()
    }

    /// Quests `character_id` currently holds.
    pub fn player_quests(&self, character_id: CharacterId) -> Vec<&Quest> {
        self.quests
            .iter()
            .filter(|q| q.is_claimed() && q.occupier == Some(character_id))
            .collect()
    }

    pub fn active_count(&self, character_id: CharacterId) -> usize {
        self.player_quests(character_id).len()
    }

    pub fn claim(
        &mut self,
        character: &Character,
        quest_id: QuestId,
        now: DateTime<Utc>,
    ) -> Result<ClaimOutcome, GameError> {
        let active = self.active_count(character.id);
        let cap = self.config.max_active_per_character;
        let quest = self.get_mut(quest_id)?;

        let outcome = if quest.occupier.is_some() {
            ClaimOutcome::AlreadyClaimed
        } else if quest.status != QuestStatus::Available {
            ClaimOutcome::Closed
        } else if !quest.level_fits(character.level) {
            ClaimOutcome::IneligibleLevel
        } else if active >= cap {
            ClaimOutcome::CapacityExceeded
        } else {
            quest.occupier = Some(character.id);
            quest.status = QuestStatus::Claimed { claimed_at: now };
            ClaimOutcome::Claimed
        };
        debug!(
            "quest claim: quest={} character={} outcome={:?}",
            quest_id, character.id, outcome
        );
        Ok(outcome)
    }

    /// Advance one objective of a claimed quest, capped at its requirement.
    /// Returns whether every objective is now satisfied. Progress on quests
    /// that are not claimed is ignored.
    pub fn record_progress(
        &mut self,
        quest_id: QuestId,
        objective_id: u8,
        amount: u32,
    ) -> Result<bool, GameError> {
        let quest = self.get_mut(quest_id)?;
        if !quest.is_claimed() {
            return Ok(false);
        }
        let objective = quest
            .objectives
            .iter_mut()
            .find(|obj| obj.id == objective_id)
            .ok_or_else(|| GameError::NotFound(format!("objective {} of quest {}", objective_id, quest_id)))?;
        objective.increment_progress(amount);
        Ok(quest.all_objectives_complete())
    }

    /// Credit a deed to every matching objective on `character_id`'s claimed
    /// quests. Returns the quests that advanced.
    pub fn record_event(
        &mut self,
        character_id: CharacterId,
        target: &ObjectiveTarget,
        amount: u32,
    ) -> Vec<QuestId> {
        let mut advanced = Vec::new();
        if amount == 0 {
            return advanced;
        }
        for quest in self
            .quests
            .iter_mut()
            .filter(|q| q.is_claimed() && q.occupier == Some(character_id))
        {
            let mut touched = false;
            for objective in quest.objectives.iter_mut().filter(|o| &o.target == target) {
                if !objective.is_complete() {
                    objective.increment_progress(amount);
                    touched = true;
                }
            }
            if touched {
                advanced.push(quest.id);
            }
        }
        advanced
    }

    /// Turn in a claimed quest and pay its reward.
    pub fn complete(
        &mut self,
        character: &mut Character,
        quest_id: QuestId,
        now: DateTime<Utc>,
    ) -> Result<CompleteOutcome, GameError> {
        let quest = self.get_mut(quest_id)?;
        if !quest.is_claimed() || quest.occupier != Some(character.id) {
            return Ok(CompleteOutcome::NotOwner);
        }
        if quest.is_overdue(now) {
            quest.expire(now);
            info!("quest expired at turn-in: quest={} character={}", quest_id, character.id);
            return Ok(CompleteOutcome::Expired);
        }
        if !quest.all_objectives_complete() {
            return Ok(CompleteOutcome::RequirementsNotMet);
        }

        let reward = quest.reward.clone();
        economy::grant(character, reward.gold, TransactionReason::QuestReward);
        let levels_gained = character.add_experience(reward.experience);
        character.alignment.adjust(reward.chivalry, reward.darkness);
        quest.status = QuestStatus::Completed { completed_at: now };

        info!(
            "quest completed: quest={} character={} gold={} xp={}",
            quest_id, character.id, reward.gold, reward.experience
        );
        Ok(CompleteOutcome::Success {
            reward,
            levels_gained,
        })
    }

    /// Give up a claimed quest. The slot is released and progress cleared.
    pub fn abandon(
        &mut self,
        character: &Character,
        quest_id: QuestId,
        now: DateTime<Utc>,
    ) -> Result<AbandonOutcome, GameError> {
        let quest = self.get_mut(quest_id)?;
        if !quest.is_claimed() || quest.occupier != Some(character.id) {
            return Ok(AbandonOutcome::NotOwner);
        }
        quest.occupier = None;
        quest.clear_progress();
        quest.status = QuestStatus::Abandoned { abandoned_at: now };
        debug!("quest abandoned: quest={} character={}", quest_id, character.id);
        Ok(AbandonOutcome::Abandoned)
    }

    /// Expire every claimed quest past its deadline. Returns the expired ids.
    pub fn expire_overdue(&mut self, now: DateTime<Utc>) -> Vec<QuestId> {
        let mut expired = Vec::new();
        for quest in &mut self.quests {
            if quest.is_overdue(now) {
                quest.expire(now);
                expired.push(quest.id);
            }
        }
        if !expired.is_empty() {
            info!("{} quest(s) expired", expired.len());
        }
        self.prune_closed(now);
        expired
    }

    /// Drop quests that closed more than [`CLOSED_QUEST_RETENTION_DAYS`] ago.
    /// Returns how many were removed.
    pub fn prune_closed(&mut self, now: DateTime<Utc>) -> usize {
        let cutoff = now - Duration::days(CLOSED_QUEST_RETENTION_DAYS);
        let before = self.quests.len();
        self.quests
            .retain(|q| q.closed_at().map_or(true, |closed| closed >= cutoff));
        let pruned = before - self.quests.len();
        if pruned > 0 {
            debug!("pruned {} closed quest(s)", pruned);
        }
        pruned
    }
}
