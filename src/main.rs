//! Binary entrypoint for the Questhold CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml` and create the save directory
//! - `play --name <name>` - play (creating the character on first use)
//! - `status --name <name>` - print a saved character's sheet and quests
//!
//! See the library crate docs for module-level details: `questhold::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use questhold::config::Config;
use questhold::game::commands::{journal_lines, status_lines};
use questhold::game::{
    new_character, GameSession, GameStore, QuestConfig, Services, SessionEnd, StdTerminal,
};
use questhold::logutil::escape_log;

#[derive(Parser)]
#[command(name = "questhold")]
#[command(about = "A menu-driven text-terminal role-playing game")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; also echoes log lines to the terminal)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration and create the data directory
    Init,
    /// Play as the named character
    Play {
        #[arg(short, long)]
        name: String,
        /// Override the configured RNG seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show a saved character
    Status {
        #[arg(short, long)]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            init_logging(&None, cli.verbose);
            info!("Initializing new Questhold configuration");
            if std::path::Path::new(&cli.config).exists() {
                warn!("{} already exists; leaving it alone", cli.config);
            } else {
                Config::create_default(&cli.config).await?;
                println!("Created default configuration: {}", cli.config);
            }
            let config = Config::load(&cli.config).await?;
            tokio::fs::create_dir_all(&config.storage.data_dir).await?;
            println!("Save directory: {}", config.storage.data_dir);
        }
        Commands::Play { name, seed } => {
            let mut config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            if seed.is_some() {
                config.game.rng_seed = seed;
            }
            info!("Starting Questhold v{}", env!("CARGO_PKG_VERSION"));

            let end = tokio::task::spawn_blocking(move || play(config, &name))
                .await
                .map_err(|e| anyhow!("game loop panicked: {}", e))??;
            info!("Session ended: {:?}", end);
        }
        Commands::Status { name } => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            let store = GameStore::open(&config.storage.data_dir)?;
            let Some(character) = store.find_character(&name)? else {
                println!("No character named {}.", name);
                return Ok(());
            };
            let board = store.load_quests(QuestConfig {
                max_active_per_character: config.game.max_active_quests,
            })?;
            for line in status_lines(&character) {
                println!("{}", line);
            }
            for line in journal_lines(&character, &board) {
                println!("{}", line);
            }
        }
    }

    Ok(())
}

/// Blocking game loop: load or create state, play, save.
fn play(config: Config, name: &str) -> Result<SessionEnd> {
    let store = GameStore::open(&config.storage.data_dir)?;
    // Held until the saves below are written.
    let _session = store.lock_session()?;
    let quest_config = QuestConfig {
        max_active_per_character: config.game.max_active_quests,
    };
    let character = match store.find_character(name)? {
        Some(existing) => existing,
        None => {
            info!("creating character {}", escape_log(name));
            new_character(name, &config)
        }
    };
    let quests = store.load_quests(quest_config)?;
    let pacing = config.game.pacing_ms > 0;
    let mut services = Services::from_config(config).with_quests(quests);
    match store.load_prisoners()? {
        Some(saved) => services.prisoners = saved,
        None => services.stock_prison(),
    }
    let mut session = GameSession::with_services(services, character, StdTerminal::new(pacing));
    let end = session.run();

    // Save whatever state we reached, even after an error.
    let (character, services, _term) = session.into_parts();
    store.save_character(&character)?;
    store.save_quests(&services.quests)?;
    store.save_prisoners(&services.prisoners)?;
    info!("saved {}", escape_log(&character.name));
    Ok(end?)
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    // stdout belongs to the game; log lines only reach stderr when asked for.
    let echo = verbosity > 0 && atty::is(atty::Stream::Stderr);

    let file = config.as_ref().and_then(|c| c.logging.file.clone());
    let security_path = config.as_ref().and_then(|c| c.logging.security_file.clone());
    match file.and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    }) {
        Some(f) => {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());

                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }

                if record.target() == "security" {
                    if let Some(ref sec_path) = security_path {
                        if let Ok(mut sf) = std::fs::OpenOptions::new()
                            .create(true)
                            .append(true)
                            .open(sec_path)
                        {
                            let _ = writeln!(sf, "{}", line);
                        }
                    }
                }

                if echo {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(move |fmt, record| {
                if !echo {
                    return Ok(());
                }
                writeln!(
                    fmt,
                    "{} [{}] {}",
                    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                    record.level(),
                    record.args()
                )
            });
        }
    }
    let _ = builder.try_init();
}
