//! Game core: location state machine, combat resolver, quest lifecycle and
//! economy ledger, plus the handlers and services that sit around them.

pub mod combat;
pub mod commands;
pub mod content;
pub mod economy;
pub mod errors;
pub mod location;
pub mod locations;
pub mod npc;
pub mod quest;
pub mod rng;
pub mod services;
pub mod session;
pub mod storage;
pub mod terminal;
pub mod types;

pub use combat::{
    CombatEvent, CombatParticipant, CombatReport, DefeatedOpponent, Encounter, EncounterState,
};
pub use commands::{Command, GlobalCommand};
pub use economy::{
    apply_transaction, sell_price, EquipOutcome, LedgerOutcome, ShopListing, Transaction,
    TransactionReason,
};
pub use errors::GameError;
pub use location::{
    Context, LocationHandler, LocationStateMachine, LoggingNavigator, Navigator, Transition,
};
pub use npc::{Prisoner, PrisonerRegistry};
pub use quest::{
    AbandonOutcome, ClaimOutcome, CompleteOutcome, CreateOutcome, ObjectiveTarget, Quest,
    QuestBoard, QuestConfig, QuestDraft, QuestId, QuestInitiator, QuestKind, QuestReward,
    QuestStatus, CLOSED_QUEST_RETENTION_DAYS,
};
pub use rng::{GameRng, ScriptedRng, StdGameRng};
pub use services::{Clock, Services};
pub use session::{new_character, GameSession, SessionEnd};
pub use storage::{GameStore, SessionLock};
pub use terminal::{ScriptedTerminal, StdTerminal, Terminal};
pub use types::*;
