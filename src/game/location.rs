//! Location state machine.
//!
//! Every place in town is a [`LocationHandler`]. The machine owns the
//! handlers plus the shared [`Services`], intercepts global commands, and
//! applies the [`Transition`] a handler returns. Leaving a location is an
//! ordinary return value, never an error.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::game::commands::{self, Command, GlobalCommand};
use crate::game::errors::GameError;
use crate::game::services::Services;
use crate::game::terminal::Terminal;
use crate::game::types::{Character, LocationId};
use crate::logutil::escape_log;

/// What a handler wants to happen after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    NavigateTo(LocationId),
}

/// Receives every accepted location change. Screen effects live behind it.
pub trait Navigator {
    fn change_location(&mut self, character: &Character, from: LocationId, to: LocationId);
}

/// Default navigator: just records the move.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn change_location(&mut self, character: &Character, from: LocationId, to: LocationId) {
        info!(
            "{} moves from {} to {}",
            escape_log(&character.name),
            from.key(),
            to.key()
        );
    }
}

/// Borrowed view handed to a handler for one call.
pub struct Context<'a> {
    pub term: &'a mut dyn Terminal,
    pub services: &'a mut Services,
}

impl Context<'_> {
    pub fn say(&mut self, line: &str) {
        self.term.write_line(line);
    }

    /// Narrative pause using the configured pacing.
    pub fn pace(&mut self) {
        let ms = self.services.pacing_ms();
        self.term.pause(ms);
    }
}

pub trait LocationHandler {
    fn id(&self) -> LocationId;

    /// Location-specific menu lines, shown on entry and with help.
    fn menu(&self) -> Vec<String>;

    fn enter(&self, ctx: &mut Context<'_>, _character: &mut Character) -> Result<(), GameError> {
        let id = self.id();
        ctx.say("");
        ctx.say(&format!("== {} ==", id.title()));
        ctx.say(id.description());
        let menu = self.menu();
        ctx.term.write_lines(&menu);
        Ok(())
    }

    /// Handle a location command. `Ok(None)` means "not a command here".
    fn handle(
        &self,
        ctx: &mut Context<'_>,
        character: &mut Character,
        command: &Command,
    ) -> Result<Option<Transition>, GameError>;

    fn exit(&self, _ctx: &mut Context<'_>, _character: &mut Character) -> Result<(), GameError> {
        Ok(())
    }
}

pub struct LocationStateMachine {
    handlers: BTreeMap<LocationId, Box<dyn LocationHandler>>,
    services: Services,
}

impl LocationStateMachine {
    pub fn new(services: Services) -> Self {
        Self {
            handlers: BTreeMap::new(),
            services,
        }
    }

    /// Machine with a handler for every location in town.
    pub fn with_default_locations(services: Services) -> Self {
        let mut machine = Self::new(services);
        for handler in crate::game::locations::default_handlers() {
            machine.register(handler);
        }
        machine
    }

    /// Install a handler, replacing any previous one for the same location.
    pub fn register(&mut self, handler: Box<dyn LocationHandler>) {
        let id = handler.id();
        if self.handlers.insert(id, handler).is_some() {
            debug!("replaced handler for {}", id.key());
        }
    }

    pub fn has_handler(&self, id: LocationId) -> bool {
        self.handlers.contains_key(&id)
    }

    /// Fail if any location lacks a handler.
    pub fn validate(&self) -> Result<(), GameError> {
        match LocationId::ALL.iter().find(|id| !self.handlers.contains_key(id)) {
            Some(missing) => Err(GameError::MissingHandler(*missing)),
            None => Ok(()),
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut Services {
        &mut self.services
    }

    pub fn into_services(self) -> Services {
        self.services
    }

    /// Show the character's current location.
    pub fn enter(&mut self, term: &mut dyn Terminal, character: &mut Character) -> Result<(), GameError> {
        let handler = self
            .handlers
            .get(&character.location)
            .ok_or(GameError::MissingHandler(character.location))?;
        let mut ctx = Context {
            term,
            services: &mut self.services,
        };
        handler.enter(&mut ctx, character)
    }

    /// Run one line of player input.
    pub fn process_command(
        &mut self,
        term: &mut dyn Terminal,
        character: &mut Character,
        input: &str,
    ) -> Result<Transition, GameError> {
        let Some(command) = Command::parse(input) else {
            return Ok(Transition::Stay);
        };
        let here = character.location;
        let handler = self
            .handlers
            .get(&here)
            .ok_or(GameError::MissingHandler(here))?;

        if let Some(global) = GlobalCommand::recognize(&command) {
            let lines = match global {
                GlobalCommand::Help => {
                    let mut lines = handler.menu();
                    lines.extend(commands::global_help());
                    lines
                }
                GlobalCommand::Status => commands::status_lines(character),
                GlobalCommand::Inventory => commands::inventory_lines(character),
                GlobalCommand::Journal => commands::journal_lines(character, &self.services.quests),
            };
            term.write_lines(&lines);
            return Ok(Transition::Stay);
        }

        let mut ctx = Context {
            term: &mut *term,
            services: &mut self.services,
        };
        let transition = match handler.handle(&mut ctx, character, &command)? {
            Some(transition) => transition,
            None => {
                debug!("unknown command at {}: {}", here.key(), escape_log(&command.verb));
                term.write_line(&format!(
                    "Unknown command '{}'. Type ? for help.",
                    command.verb
                ));
                return Ok(Transition::Stay);
            }
        };

        match transition {
            Transition::Stay => Ok(Transition::Stay),
            Transition::NavigateTo(target) => self.navigate(term, character, target),
        }
    }

    fn navigate(
        &mut self,
        term: &mut dyn Terminal,
        character: &mut Character,
        target: LocationId,
    ) -> Result<Transition, GameError> {
        let from = character.location;
        if target == from {
            return Ok(Transition::Stay);
        }
        if !from.is_neighbor(target) {
            warn!("rejected move {} -> {}", from.key(), target.key());
            term.write_line(&format!("You can't get to the {} from here.", target.title()));
            return Ok(Transition::Stay);
        }
        // Both ends must exist before anything changes.
        let current = self.handlers.get(&from).ok_or(GameError::MissingHandler(from))?;
        let next = self.handlers.get(&target).ok_or(GameError::MissingHandler(target))?;

        let mut ctx = Context {
            term,
            services: &mut self.services,
        };
        current.exit(&mut ctx, character)?;
        ctx.services.navigator.change_location(character, from, target);
        character.location = target;
        next.enter(&mut ctx, character)?;
        Ok(Transition::NavigateTo(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::game::rng::ScriptedRng;
    use crate::game::terminal::ScriptedTerminal;

    struct Stub {
        id: LocationId,
        target: LocationId,
    }

    impl LocationHandler for Stub {
        fn id(&self) -> LocationId {
            self.id
        }

        fn menu(&self) -> Vec<String> {
            vec![format!("(G)o to {}", self.target.title())]
        }

        fn handle(
            &self,
            ctx: &mut Context<'_>,
            _character: &mut Character,
            command: &Command,
        ) -> Result<Option<Transition>, GameError> {
            match command.verb.as_str() {
                "g" => Ok(Some(Transition::NavigateTo(self.target))),
                "wave" => {
                    ctx.say("You wave.");
                    Ok(Some(Transition::Stay))
                }
                _ => Ok(None),
            }
        }
    }

    fn machine() -> LocationStateMachine {
        let services = Services::new(Config::default(), Box::new(ScriptedRng::new(vec![1])));
        let mut machine = LocationStateMachine::new(services);
        machine.register(Box::new(Stub {
            id: LocationId::MainStreet,
            target: LocationId::Gym,
        }));
        machine.register(Box::new(Stub {
            id: LocationId::Gym,
            target: LocationId::PrisonCell,
        }));
        machine
    }

    #[test]
    fn navigate_updates_location_and_enters() {
        let mut machine = machine();
        let mut term = ScriptedTerminal::default();
        let mut hero = Character::new("Hero");
        let t = machine.process_command(&mut term, &mut hero, "g").unwrap();
        assert_eq!(t, Transition::NavigateTo(LocationId::Gym));
        assert_eq!(hero.location, LocationId::Gym);
        assert!(term.saw("== The Gym =="));
    }

    #[test]
    fn non_neighbor_is_rejected() {
        let mut machine = machine();
        let mut term = ScriptedTerminal::default();
        let mut hero = Character::new("Hero").with_location(LocationId::Gym);
        let t = machine.process_command(&mut term, &mut hero, "g").unwrap();
        assert_eq!(t, Transition::Stay);
        assert_eq!(hero.location, LocationId::Gym);
        assert!(term.saw("can't get to"));
    }

    #[test]
    fn unknown_and_global_commands_stay() {
        let mut machine = machine();
        let mut term = ScriptedTerminal::default();
        let mut hero = Character::new("Hero");
        let before = hero.clone();
        assert_eq!(machine.process_command(&mut term, &mut hero, "dance").unwrap(), Transition::Stay);
        assert!(term.saw("Unknown command 'dance'"));
        assert_eq!(machine.process_command(&mut term, &mut hero, "?").unwrap(), Transition::Stay);
        assert!(term.saw("(G)o to The Gym"));
        assert_eq!(machine.process_command(&mut term, &mut hero, "   ").unwrap(), Transition::Stay);
        assert_eq!(hero, before);
    }

    #[test]
    fn missing_handler_is_a_typed_error() {
        let machine = machine();
        assert!(matches!(machine.validate(), Err(GameError::MissingHandler(_))));
        let mut machine = machine;
        let mut term = ScriptedTerminal::default();
        let mut hero = Character::new("Hero").with_location(LocationId::Healer);
        assert!(matches!(
            machine.enter(&mut term, &mut hero),
            Err(GameError::MissingHandler(LocationId::Healer))
        ));
    }
}
