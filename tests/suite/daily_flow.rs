//! Open, play, restart and roll over against a served sheet and a session file.

use chrono::TimeDelta;
use wiremock::MockServer;

use quartet_core::Game;
use quartet_engine::{GameHost, session_store};
use quartet_types::{Level, Outcome, SessionStatus};

use crate::common::{local_noon, manual_clock, mount_sheet, sheet, sheet_source};

fn guess(game: &mut Game, items: &[&str]) -> Outcome {
    game.deselect_all();
    for item in items {
        assert!(game.select(item), "could not select {item}");
    }
    game.submit().unwrap()
}

#[tokio::test]
async fn play_resume_and_roll_over() {
    let server = MockServer::start().await;
    mount_sheet(&server, &sheet(&[(5, "a"), (6, "b")])).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let (clock, time) = manual_clock(local_noon(2026, 1, 5));

    let host = GameHost::new(
        sheet_source(&server, clock.clone()),
        session_store(Some(path.clone())),
    );
    host.open().await.unwrap();
    host.with_game_mut(|game| {
        assert_eq!(game.puzzle().day_index(), 5);
        assert_eq!(guess(game, &["A01", "A02", "A03", "A04"]), Outcome::Correct);
        assert_eq!(guess(game, &["A11", "A12", "A13", "A21"]), Outcome::OneAway);
    });
    assert!(path.exists());

    let restarted = GameHost::new(
        sheet_source(&server, clock.clone()),
        session_store(Some(path.clone())),
    );
    restarted.open().await.unwrap();
    restarted.with_game(|game| {
        assert_eq!(game.cleared_categories().len(), 1);
        assert_eq!(game.cleared_categories()[0].name(), "ALPHA A");
        assert_eq!(game.mistakes_remaining(), 3);
        assert_eq!(game.guess_history().len(), 2);
        assert_eq!(game.items().len(), 12);
    });

    time.advance(TimeDelta::days(1));
    restarted.ensure_current().await.unwrap();
    restarted.with_game(|game| {
        assert_eq!(game.puzzle().day_index(), 6);
        assert_eq!(game.puzzle().category(Level::One).name(), "ALPHA B");
        assert_eq!(game.status(), SessionStatus::InProgress);
        assert_eq!(game.mistakes_remaining(), 4);
        assert!(game.guess_history().is_empty());
    });
    assert!(!path.exists());
}

#[tokio::test]
async fn yesterdays_record_is_discarded() {
    let server = MockServer::start().await;
    // Only one row: both days fall back to the same puzzle.
    mount_sheet(&server, &sheet(&[(100, "a")])).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let (monday, _) = manual_clock(local_noon(2026, 2, 2));
    let host = GameHost::new(sheet_source(&server, monday), session_store(Some(path.clone())));
    host.open().await.unwrap();
    host.with_game_mut(|game| guess(game, &["A01", "A02", "A03", "A04"]));
    assert!(path.exists());

    let (tuesday, _) = manual_clock(local_noon(2026, 2, 3));
    let host = GameHost::new(sheet_source(&server, tuesday), session_store(Some(path.clone())));
    host.open().await.unwrap();
    host.with_game(|game| {
        assert_eq!(game.puzzle().day_index(), 100);
        assert!(game.cleared_categories().is_empty());
    });
    assert!(!path.exists());
}

#[tokio::test]
async fn edited_sheet_invalidates_session() {
    let server = MockServer::start().await;
    mount_sheet(&server, &sheet(&[(5, "a")])).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let (clock, _) = manual_clock(local_noon(2026, 1, 5));

    let host = GameHost::new(
        sheet_source(&server, clock.clone()),
        session_store(Some(path.clone())),
    );
    host.open().await.unwrap();
    host.with_game_mut(|game| guess(game, &["A01", "A02", "A03", "A04"]));

    server.reset().await;
    mount_sheet(&server, &sheet(&[(5, "z")])).await;

    let host = GameHost::new(sheet_source(&server, clock), session_store(Some(path.clone())));
    host.open().await.unwrap();
    host.with_game(|game| {
        assert_eq!(game.puzzle().category(Level::One).name(), "ALPHA Z");
        assert!(game.cleared_categories().is_empty());
    });
}

#[tokio::test]
async fn unreachable_sheet_leaves_board_empty() {
    let server = MockServer::start().await;
    let (clock, _) = manual_clock(local_noon(2026, 1, 5));
    let host = GameHost::new(sheet_source(&server, clock), session_store(None));

    assert!(host.open().await.is_err());
    assert!(!host.has_game());

    mount_sheet(&server, &sheet(&[(5, "a")])).await;
    host.ensure_current().await.unwrap();
    assert!(host.has_game());
}

#[tokio::test]
async fn lost_game_reveals_and_survives_restart() {
    let server = MockServer::start().await;
    mount_sheet(&server, &sheet(&[(5, "a")])).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let (clock, _) = manual_clock(local_noon(2026, 1, 5));

    let host = GameHost::new(
        sheet_source(&server, clock.clone()),
        session_store(Some(path.clone())),
    );
    host.open().await.unwrap();
    host.with_game_mut(|game| {
        let wrong = [
            ["A01", "A02", "A11", "A21"],
            ["A01", "A03", "A11", "A21"],
            ["A01", "A04", "A11", "A21"],
        ];
        for items in wrong {
            assert_eq!(guess(game, &items), Outcome::Incorrect);
        }
        assert_eq!(guess(game, &["A02", "A03", "A11", "A21"]), Outcome::Loss);
        let revealed = game.resolve_loss().unwrap();
        assert_eq!(revealed.len(), 4);
        assert!(game.items().is_empty());
    });

    let host = GameHost::new(sheet_source(&server, clock), session_store(Some(path)));
    host.open().await.unwrap();
    host.with_game(|game| {
        assert_eq!(game.status(), SessionStatus::Lost);
        assert_eq!(game.revealed_categories().len(), 4);
        assert!(game.cleared_categories().is_empty());
        assert_eq!(game.mistakes_remaining(), 0);
    });
}
