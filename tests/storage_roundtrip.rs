// Save files survive a reload and keep their invariants.

use questhold::game::{
    Character, GameError, GameStore, Item, ItemKind, LocationId, PrisonerRegistry, QuestBoard,
    QuestConfig, QuestDraft, QuestKind, ScriptedRng, Services,
};
use questhold::config::Config;
use tempfile::TempDir;

fn store() -> (TempDir, GameStore) {
    let dir = TempDir::new().unwrap();
    let store = GameStore::open(dir.path()).unwrap();
    (dir, store)
}

#[test]
fn test_character_round_trip_and_lookup_by_name() {
    let (_dir, store) = store();
    let mut hero = Character::new("Ayla Stormborn")
        .with_gold(1_234)
        .with_location(LocationId::Gym);
    hero.inventory
        .push(Item::new("dagger", "Dagger", ItemKind::Weapon, 150, 3));
    hero.imprisoned_days = 2;
    store.save_character(&hero).unwrap();

    assert_eq!(store.load_character(hero.id).unwrap(), hero);
    assert_eq!(
        store.find_character("  ayla STORMBORN ").unwrap(),
        Some(hero.clone())
    );
    assert!(store.character_exists("Ayla Stormborn").unwrap());
    assert_eq!(store.find_character("Bram").unwrap(), None);

    // Saving again overwrites in place.
    hero.gold = 0;
    store.save_character(&hero).unwrap();
    assert_eq!(store.load_character(hero.id).unwrap().gold, 0);
}

#[test]
fn test_invalid_character_is_never_written() {
    let (_dir, store) = store();
    let mut hero = Character::new("Overloaded").with_capacity(1);
    hero.inventory
        .push(Item::new("a", "A", ItemKind::Misc, 1, 0));
    hero.inventory
        .push(Item::new("b", "B", ItemKind::Misc, 1, 0));
    assert!(store.save_character(&hero).is_err());
    assert!(!store.character_exists("Overloaded").unwrap());
}

#[test]
fn test_quest_board_round_trip() {
    let (_dir, store) = store();
    let mut board = QuestBoard::new(QuestConfig::default());
    let mut poster = Character::new("Poster").with_level(20);
    poster.quest_quota = 1;
    board.create(&mut poster, QuestDraft::new(QuestKind::Territory, 2, "hold the ford"));
    board.post_bounty("Sly Vera", 1, None);
    store.save_quests(&board).unwrap();

    let loaded = store.load_quests(QuestConfig::default()).unwrap();
    assert_eq!(loaded.quests(), board.quests());
    assert_eq!(loaded.quests().len(), 2);
    assert!(loaded.quests()[1].is_bounty());
}

#[test]
fn test_prison_roster_round_trip() {
    let (_dir, store) = store();
    assert!(store.load_prisoners().unwrap().is_none());

    let mut services = Services::new(Config::default(), Box::new(ScriptedRng::new(vec![3])));
    services.stock_prison();
    store.save_prisoners(&services.prisoners).unwrap();

    let loaded = store.load_prisoners().unwrap().expect("roster saved");
    assert_eq!(loaded.len(), services.prisoners.len());
    let names: Vec<&str> = loaded.prisoners().iter().map(|p| p.npc.name.as_str()).collect();
    assert!(names.contains(&"Black Jack"));

    store.save_prisoners(&PrisonerRegistry::new()).unwrap();
    assert!(store.load_prisoners().unwrap().expect("empty roster").is_empty());
}

#[test]
fn test_second_session_on_same_directory_is_refused() {
    let (dir, store) = store();
    let first = store.lock_session().unwrap();

    let other = GameStore::open(dir.path()).unwrap();
    assert!(matches!(other.lock_session(), Err(GameError::SessionInUse(_))));
    assert!(matches!(store.lock_session(), Err(GameError::SessionInUse(_))));

    drop(first);
    let again = other.lock_session().unwrap();
    drop(again);
}
