//! JSON save files.
//!
//! Layout under the data directory:
//!
//! ```text
//! characters/<uuid>.json   one file per character
//! characters/index.json    lowercase name -> character id
//! quests.json              every quest on the board
//! prisoners.json           the prison roster
//! session.lock             held by the one running game
//! ```
//!
//! Every write goes to a temp file under an exclusive lock and is renamed
//! into place, so a crash never leaves a half-written save.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::game::errors::GameError;
use crate::game::npc::{Prisoner, PrisonerRegistry};
use crate::game::quest::{Quest, QuestBoard, QuestConfig};
use crate::game::types::{Character, CharacterId};
use crate::logutil::escape_log;

pub struct GameStore {
    base: PathBuf,
}

/// Exclusive claim on a data directory for one game session. Released on drop.
#[derive(Debug)]
pub struct SessionLock {
    file: File,
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

impl GameStore {
    /// Open (creating if needed) a store rooted at `data_dir`.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, GameError> {
        let base = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(base.join("characters"))?;
        Ok(Self { base })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    /// Claim the data directory for a session. Characters, quests and the
    /// prison roster are loaded once and written back at the end, so a
    /// second session on the same directory is refused.
    pub fn lock_session(&self) -> Result<SessionLock, GameError> {
        let path = self.base.join("session.lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        if let Err(e) = file.try_lock_exclusive() {
            warn!("session lock {} is held: {}", path.display(), e);
            return Err(GameError::SessionInUse(path.display().to_string()));
        }
        debug!("session lock taken: {}", path.display());
        Ok(SessionLock { file })
    }

    fn character_path(&self, id: CharacterId) -> PathBuf {
        self.base.join("characters").join(format!("{}.json", id))
    }

    fn index_path(&self) -> PathBuf {
        self.base.join("characters").join("index.json")
    }

    fn load_index(&self) -> Result<BTreeMap<String, CharacterId>, GameError> {
        Ok(read_json(&self.index_path())?.unwrap_or_default())
    }

    pub fn save_character(&self, character: &Character) -> Result<(), GameError> {
        character.validate()?;
        write_json_atomic(&self.character_path(character.id), character)?;

        let mut index = self.load_index()?;
        let key = character.name.to_lowercase();
        if index.get(&key) != Some(&character.id) {
            index.insert(key, character.id);
            write_json_atomic(&self.index_path(), &index)?;
        }
        debug!("saved character {} ({})", escape_log(&character.name), character.id);
        Ok(())
    }

    /// Load a character and re-check its invariants.
    pub fn load_character(&self, id: CharacterId) -> Result<Character, GameError> {
        let character: Character = read_json(&self.character_path(id))?
            .ok_or_else(|| GameError::NotFound(format!("character {}", id)))?;
        character.validate()?;
        Ok(character)
    }

    /// Look a character up by display name (case-insensitive).
    pub fn find_character(&self, name: &str) -> Result<Option<Character>, GameError> {
        match self.load_index()?.get(&name.trim().to_lowercase()) {
            Some(id) => self.load_character(*id).map(Some),
            None => Ok(None),
        }
    }

    pub fn character_exists(&self, name: &str) -> Result<bool, GameError> {
        Ok(self.load_index()?.contains_key(&name.trim().to_lowercase()))
    }

    pub fn save_quests(&self, board: &QuestBoard) -> Result<(), GameError> {
        write_json_atomic(&self.base.join("quests.json"), board.quests())
    }

    /// Load the quest board. A missing file is an empty board.
    pub fn load_quests(&self, config: QuestConfig) -> Result<QuestBoard, GameError> {
        let quests: Vec<Quest> = read_json(&self.base.join("quests.json"))?.unwrap_or_default();
        Ok(QuestBoard::from_quests(config, quests))
    }

    pub fn save_prisoners(&self, registry: &PrisonerRegistry) -> Result<(), GameError> {
        let roster: Vec<&Prisoner> = registry.prisoners();
        write_json_atomic(&self.base.join("prisoners.json"), &roster)
    }

    /// `None` when no roster was ever saved.
    pub fn load_prisoners(&self) -> Result<Option<PrisonerRegistry>, GameError> {
        let roster: Option<Vec<Prisoner>> = read_json(&self.base.join("prisoners.json"))?;
        Ok(roster.map(PrisonerRegistry::from_prisoners))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, GameError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), GameError> {
    let content = serde_json::to_string_pretty(value)?;
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;

    let lock_path = path.with_extension("lock");
    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)?;
    lock_file.lock_exclusive()?;

    let base = path.file_name().and_then(|s| s.to_str()).unwrap_or("save.json");
    let mut counter = 0u32;
    let tmp_path = loop {
        let cand = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
        match OpenOptions::new().write(true).create_new(true).open(&cand) {
            Ok(mut tmp) => {
                tmp.write_all(content.as_bytes())?;
                tmp.sync_all()?;
                break cand;
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                counter = counter.saturating_add(1);
            }
            Err(e) => return Err(e.into()),
        }
    };
    if let Err(e) = fs::rename(&tmp_path, path) {
        warn!("could not replace {}: {}", path.display(), e);
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    if let Ok(dirf) = File::open(dir) {
        let _ = dirf.sync_all();
    }
    let _ = lock_file.unlock();
    Ok(())
}
