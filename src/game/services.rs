use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::game::content;
use crate::game::location::{LoggingNavigator, Navigator};
use crate::game::npc::PrisonerRegistry;
use crate::game::quest::{QuestBoard, QuestConfig};
use crate::game::rng::{GameRng, StdGameRng};

/// Where "now" comes from. Tests pin it to make quest expiry deterministic.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}

/// Shared collaborators handed to every location handler. Owned by the
/// state machine; one set per game instance.
pub struct Services {
    pub config: Config,
    pub rng: Box<dyn GameRng>,
    pub quests: QuestBoard,
    pub prisoners: PrisonerRegistry,
    pub navigator: Box<dyn Navigator>,
    pub clock: Clock,
}

impl Services {
    pub fn new(config: Config, rng: Box<dyn GameRng>) -> Self {
        let quests = QuestBoard::new(QuestConfig {
            max_active_per_character: config.game.max_active_quests,
        });
        Self {
            config,
            rng,
            quests,
            prisoners: PrisonerRegistry::new(),
            navigator: Box::new(LoggingNavigator),
            clock: Clock::System,
        }
    }

    /// Services seeded from `config.game.rng_seed`.
    pub fn from_config(config: Config) -> Self {
        let rng = StdGameRng::from_config(config.game.rng_seed);
        Self::new(config, Box::new(rng))
    }

    pub fn with_quests(mut self, quests: QuestBoard) -> Self {
        self.quests = quests;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_navigator(mut self, navigator: Box<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Fill the prison with the starting inmates.
    pub fn stock_prison(&mut self) {
        for (npc, days) in content::starting_prisoners(self.rng.as_mut()) {
            self.prisoners.imprison(npc, days);
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn pacing_ms(&self) -> u64 {
        self.config.game.pacing_ms
    }
}
