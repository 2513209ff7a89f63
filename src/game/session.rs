//! Session driver: one player, one terminal, one state machine.
//!
//! `quit` and disconnects are handled here, outside the state machine,
//! which itself never terminates.

use log::{error, info, warn};

use crate::config::Config;
use crate::game::errors::GameError;
use crate::game::location::LocationStateMachine;
use crate::game::rng::GameRng;
use crate::game::services::Services;
use crate::game::terminal::Terminal;
use crate::game::types::{Character, LocationId};
use crate::logutil::escape_log;

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Quit,
    Disconnected,
}

/// A fresh character set up from the `[game]` config section.
pub fn new_character(name: &str, config: &Config) -> Character {
    let mut character = Character::new(name)
        .with_gold(config.game.starting_gold)
        .with_capacity(config.game.inventory_capacity)
        .with_location(config.game.start_location);
    character.quest_quota = config.game.quest_creation_quota;
    character
}

pub struct GameSession<T: Terminal> {
    machine: LocationStateMachine,
    character: Character,
    term: T,
}

impl<T: Terminal> GameSession<T> {
    /// New world: empty quest board and a freshly stocked prison.
    pub fn new(config: Config, character: Character, term: T, rng: Box<dyn GameRng>) -> Self {
        let mut services = Services::new(config, rng);
        services.stock_prison();
        Self::with_services(services, character, term)
    }

    /// Resume with services rebuilt from saved state.
    pub fn with_services(services: Services, character: Character, term: T) -> Self {
        Self {
            machine: LocationStateMachine::with_default_locations(services),
            character,
            term,
        }
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn services(&self) -> &Services {
        self.machine.services()
    }

    pub fn terminal(&self) -> &T {
        &self.term
    }

    fn prompt(&self) -> String {
        let c = &self.character;
        format!("[{}] HP {}/{} Gold {} >", c.location.title(), c.hp, c.max_hp, c.gold)
    }

    /// Run until the player quits or the terminal goes away.
    pub fn run(&mut self) -> Result<SessionEnd, GameError> {
        self.machine.validate()?;
        if self.character.is_imprisoned() && self.character.location != LocationId::PrisonCell {
            warn!(
                "{} is serving a sentence; placing them in a cell",
                escape_log(&self.character.name)
            );
            self.character.location = LocationId::PrisonCell;
        }
        info!("session start: {}", escape_log(&self.character.name));
        self.term
            .write_line(&format!("Welcome, {}. Type ? for help, QUIT to leave.", self.character.name));
        self.machine.enter(&mut self.term, &mut self.character)?;

        loop {
            let prompt = self.prompt();
            let Some(line) = self.term.read_line(&prompt) else {
                info!("session disconnected: {}", escape_log(&self.character.name));
                return Ok(SessionEnd::Disconnected);
            };
            if line.trim().eq_ignore_ascii_case("quit") {
                self.term.write_line("Farewell.");
                info!("session quit: {}", escape_log(&self.character.name));
                return Ok(SessionEnd::Quit);
            }
            match self
                .machine
                .process_command(&mut self.term, &mut self.character, &line)
            {
                Ok(_) => {}
                Err(e @ GameError::MissingHandler(_)) => return Err(e),
                Err(e) => {
                    error!("command failed for {}: {}", escape_log(&self.character.name), e);
                    self.term.write_line("That did not work. Try something else.");
                }
            }
        }
    }

    /// Hand back the character and the services for saving.
    pub fn into_parts(self) -> (Character, Services, T) {
        (self.character, self.machine.into_services(), self.term)
    }
}
