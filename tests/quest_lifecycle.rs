// Integration tests for the quest board: posting, claiming, progress,
// completion, abandonment and expiry.

use chrono::{Duration, TimeZone, Utc};
use questhold::game::{
    AbandonOutcome, Character, ClaimOutcome, CompleteOutcome, CreateOutcome, ObjectiveTarget,
    QuestBoard, QuestConfig, QuestDraft, QuestId, QuestKind, QuestReward, QuestStatus,
    CLOSED_QUEST_RETENTION_DAYS,
};

fn poster() -> Character {
    let mut c = Character::new("Lady Morrow").with_level(40);
    c.quest_quota = 5;
    c
}

fn post(board: &mut QuestBoard, poster: &mut Character, draft: QuestDraft) -> QuestId {
    match board.create(poster, draft) {
        CreateOutcome::Created(id) => id,
        other => panic!("expected Created, got {:?}", other),
    }
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

#[test]
fn test_level_window_blocks_claim() {
    let mut board = QuestBoard::new(QuestConfig::default());
    let mut p = poster();
    let id = post(
        &mut board,
        &mut p,
        QuestDraft::new(QuestKind::Territory, 2, "hold the bridge").with_level_range(15, 20),
    );

    let squire = Character::new("Squire").with_level(10);
    assert!(board.list_available(&squire).is_empty());
    assert_eq!(
        board.claim(&squire, id, now()).unwrap(),
        ClaimOutcome::IneligibleLevel
    );
    let quest = board.get(id).unwrap();
    assert_eq!(quest.occupier, None);
    assert_eq!(quest.status, QuestStatus::Available);
}

#[test]
fn test_two_objectives_must_both_finish() {
    let mut board = QuestBoard::new(QuestConfig::default());
    let mut p = poster();
    let reward = QuestReward {
        gold: 2_000,
        experience: 100,
        chivalry: 5,
        darkness: 0,
    };
    let id = post(
        &mut board,
        &mut p,
        QuestDraft::new(QuestKind::MonsterHunt, 1, "clear the cellar")
            .with_objective("Slay rats", ObjectiveTarget::Opponents, 3)
            .with_objective("Slay the rat king", ObjectiveTarget::Manual, 5)
            .with_reward(reward.clone()),
    );

    let mut hero = Character::new("Hero").with_level(5);
    assert_eq!(board.claim(&hero, id, now()).unwrap(), ClaimOutcome::Claimed);

    assert!(!board.record_progress(id, 1, 3).unwrap());
    assert!(!board.record_progress(id, 2, 3).unwrap());
    assert_eq!(
        board.complete(&mut hero, id, now()).unwrap(),
        CompleteOutcome::RequirementsNotMet
    );
    assert_eq!(hero.gold, 0);

    assert!(board.record_progress(id, 2, 2).unwrap());
    let outcome = board.complete(&mut hero, id, now()).unwrap();
    assert!(matches!(outcome, CompleteOutcome::Success { ref reward, .. } if reward.gold == 2_000));
    assert_eq!(hero.gold, 2_000);
    assert_eq!(hero.experience, 100);
    assert!(board.player_quests(hero.id).is_empty());
    assert!(matches!(
        board.get(id).unwrap().status,
        QuestStatus::Completed { .. }
    ));
}

#[test]
fn test_progress_is_capped_at_requirement() {
    let mut board = QuestBoard::new(QuestConfig::default());
    let mut p = poster();
    let id = post(
        &mut board,
        &mut p,
        QuestDraft::new(QuestKind::GangWar, 1, "break the Red Hands")
            .with_objective("Beat gang members", ObjectiveTarget::Opponents, 4),
    );
    let hero = Character::new("Hero").with_level(3);
    board.claim(&hero, id, now()).unwrap();

    let advanced = board.record_event(hero.id, &ObjectiveTarget::Opponents, 10);
    assert_eq!(advanced, vec![id]);
    let objective = &board.get(id).unwrap().objectives[0];
    assert_eq!(objective.progress, 4);

    // Already complete: nothing further to credit.
    assert!(board
        .record_event(hero.id, &ObjectiveTarget::Opponents, 1)
        .is_empty());
}

#[test]
fn test_claim_capacity_and_double_claims() {
    let mut board = QuestBoard::new(QuestConfig {
        max_active_per_character: 2,
    });
    let mut p = poster();
    let ids: Vec<QuestId> = (0..3)
        .map(|n| {
            post(
                &mut board,
                &mut p,
                QuestDraft::new(QuestKind::MonsterHunt, 1, &format!("job {}", n)),
            )
        })
        .collect();

    let hero = Character::new("Hero").with_level(5);
    let rival = Character::new("Rival").with_level(5);
    assert_eq!(board.claim(&hero, ids[0], now()).unwrap(), ClaimOutcome::Claimed);
    assert_eq!(board.claim(&hero, ids[1], now()).unwrap(), ClaimOutcome::Claimed);
    assert_eq!(
        board.claim(&hero, ids[2], now()).unwrap(),
        ClaimOutcome::CapacityExceeded
    );
    assert_eq!(
        board.claim(&rival, ids[0], now()).unwrap(),
        ClaimOutcome::AlreadyClaimed
    );
    assert_eq!(board.active_count(hero.id), 2);
}

#[test]
fn test_abandon_frees_slot_and_only_owner_may_abandon() {
    let mut board = QuestBoard::new(QuestConfig::default());
    let mut p = poster();
    let id = post(
        &mut board,
        &mut p,
        QuestDraft::new(QuestKind::Seduction, 1, "win the baker's heart")
            .with_objective("Charm the baker", ObjectiveTarget::Manual, 2),
    );
    let hero = Character::new("Hero").with_level(2);
    let rival = Character::new("Rival").with_level(2);
    board.claim(&hero, id, now()).unwrap();
    board.record_progress(id, 1, 1).unwrap();

    assert_eq!(
        board.abandon(&rival, id, now()).unwrap(),
        AbandonOutcome::NotOwner
    );
    assert_eq!(board.abandon(&hero, id, now()).unwrap(), AbandonOutcome::Abandoned);

    let quest = board.get(id).unwrap();
    assert_eq!(quest.occupier, None);
    assert_eq!(quest.objectives[0].progress, 0);
    assert_eq!(board.active_count(hero.id), 0);
    assert_eq!(
        board.claim(&rival, id, now()).unwrap(),
        ClaimOutcome::Closed
    );
}

#[test]
fn test_overdue_quests_expire() {
    let mut board = QuestBoard::new(QuestConfig::default());
    let mut p = poster();
    let id = post(
        &mut board,
        &mut p,
        QuestDraft::new(QuestKind::Assassination, 1, "quietly").with_days(3),
    );
    let untouched = post(
        &mut board,
        &mut p,
        QuestDraft::new(QuestKind::MonsterHunt, 1, "nobody wants this"),
    );
    let hero = Character::new("Hero").with_level(2);
    board.claim(&hero, id, now()).unwrap();

    assert!(board.expire_overdue(now() + Duration::days(2)).is_empty());
    let expired = board.expire_overdue(now() + Duration::days(4));
    assert_eq!(expired, vec![id]);
    assert!(matches!(
        board.get(id).unwrap().status,
        QuestStatus::Expired { .. }
    ));
    assert_eq!(board.get(id).unwrap().occupier, None);
    assert!(board.get(untouched).unwrap().is_available());
}

#[test]
fn test_overdue_quest_cannot_be_turned_in() {
    let mut board = QuestBoard::new(QuestConfig::default());
    let mut p = poster();
    let id = post(
        &mut board,
        &mut p,
        QuestDraft::new(QuestKind::Assassination, 1, "before the thaw").with_days(2),
    );
    let mut hero = Character::new("Hero").with_level(2);
    board.claim(&hero, id, now()).unwrap();
    assert!(board.record_progress(id, 1, 99).unwrap());

    assert_eq!(
        board.complete(&mut hero, id, now() + Duration::days(30)).unwrap(),
        CompleteOutcome::Expired
    );
    assert_eq!(hero.gold, 0);
    assert_eq!(hero.experience, 0);
    let quest = board.get(id).unwrap();
    assert!(matches!(quest.status, QuestStatus::Expired { .. }));
    assert_eq!(quest.occupier, None);
    assert_eq!(board.active_count(hero.id), 0);

    // A second turn-in is refused outright.
    assert_eq!(
        board.complete(&mut hero, id, now() + Duration::days(30)).unwrap(),
        CompleteOutcome::NotOwner
    );
}

#[test]
fn test_closed_quests_are_pruned_after_retention() {
    let mut board = QuestBoard::new(QuestConfig::default());
    let mut p = poster();
    let old = post(&mut board, &mut p, QuestDraft::new(QuestKind::Territory, 1, "old news"));
    let recent = post(&mut board, &mut p, QuestDraft::new(QuestKind::Territory, 1, "fresh"));
    let open = post(&mut board, &mut p, QuestDraft::new(QuestKind::Territory, 1, "still up"));
    let hero = Character::new("Hero").with_level(2);

    board.claim(&hero, old, now()).unwrap();
    board.abandon(&hero, old, now()).unwrap();
    board.claim(&hero, recent, now()).unwrap();
    board.abandon(&hero, recent, now() + Duration::days(10)).unwrap();

    assert!(board
        .expire_overdue(now() + Duration::days(CLOSED_QUEST_RETENTION_DAYS))
        .is_empty());
    assert_eq!(board.quests().len(), 3);

    board.expire_overdue(now() + Duration::days(CLOSED_QUEST_RETENTION_DAYS + 1));
    let left: Vec<QuestId> = board.quests().iter().map(|q| q.id).collect();
    assert_eq!(left, vec![recent, open]);
    assert!(board.get(old).is_none());
}

#[test]
fn test_quota_and_difficulty_guard_creation() {
    let mut board = QuestBoard::new(QuestConfig::default());
    let mut p = poster();
    p.quest_quota = 1;
    assert_eq!(
        board.create(&mut p, QuestDraft::new(QuestKind::Territory, 9, "too hard")),
        CreateOutcome::InvalidDifficulty
    );
    assert_eq!(p.quest_quota, 1);
    post(&mut board, &mut p, QuestDraft::new(QuestKind::Territory, 1, "ok"));
    assert_eq!(
        board.create(&mut p, QuestDraft::new(QuestKind::Territory, 1, "again")),
        CreateOutcome::NoQuotaRemaining
    );
    assert!(matches!(
        board.post_bounty("Black Jack", 2, None),
        CreateOutcome::Created(_)
    ));
    assert_eq!(board.quests().len(), 2);
}
