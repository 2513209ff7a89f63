//! # Questhold - a text-terminal role-playing game core
//!
//! Questhold is a menu-driven RPG played one line at a time. A character
//! walks between town locations, buys gear, fights through prison guards
//! and tournament brackets, and takes on quests posted by other players or
//! the Crown.
//!
//! ## Features
//!
//! - **Location state machine**: every place in town is a handler; leaving
//!   one is a plain [`game::Transition`] value.
//! - **Combat resolver**: sequential multi-opponent battles with a fixed
//!   damage formula and an optional flee roll.
//! - **Quest lifecycle**: post, claim, progress, complete, abandon and expire.
//! - **Economy ledger**: every gold and item change is validated before it
//!   is applied, so nothing is ever half done.
//! - **Deterministic tests**: one injected, seedable RNG and a scripted terminal.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use questhold::config::Config;
//! use questhold::game::{new_character, GameSession, StdGameRng, StdTerminal};
//!
//! let config = Config::default();
//! let hero = new_character("Ayla", &config);
//! let rng = Box::new(StdGameRng::from_config(config.game.rng_seed));
//! let mut session = GameSession::new(config, hero, StdTerminal::new(true), rng);
//! session.run().expect("session failed");
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - the game core, location handlers and save files
//! - [`config`] - configuration loading and validation
//! - [`logutil`] - log sanitising helpers

pub mod config;
pub mod game;
pub mod logutil;
