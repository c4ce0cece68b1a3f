//! Randomized play against the engine's invariants.

use std::sync::Arc;

use quartet_core::{Game, MemoryBackend, RecordStore, SessionStore};
use quartet_puzzle::sheet::parse_row;
use quartet_types::{CivilDate, MAX_MISTAKES, MAX_SELECTED, Outcome};

use crate::common::sheet_row;

fn pick(len: usize) -> usize {
    rand::random_range(0..len)
}

#[test]
fn random_play_upholds_invariants() {
    let puzzle = Arc::new(parse_row(&sheet_row(1, "r")).unwrap());
    let today = CivilDate::from_ymd(2026, 1, 1).unwrap();

    for _ in 0..200 {
        let store = Arc::new(RecordStore::new(MemoryBackend::new()));
        let mut game = Game::new(puzzle.clone(), today, store.clone());
        let mut mistakes = MAX_MISTAKES;
        let (mut was_won, mut was_lost) = (false, false);

        for _ in 0..80 {
            match pick(6) {
                0..=2 if !game.items().is_empty() => {
                    let text = game.items()[pick(game.items().len())].text.clone();
                    game.select(&text);
                }
                3 => {
                    let history = game.guess_history().len();
                    let selected = game.selected_count();
                    match game.submit() {
                        Ok(Outcome::Duplicate) => {
                            assert_eq!(game.guess_history().len(), history);
                            assert_eq!(game.mistakes_remaining(), mistakes);
                        }
                        Ok(_) => {
                            assert_eq!(selected, MAX_SELECTED);
                            assert_eq!(game.guess_history().len(), history + 1);
                            let stored = store.load(game.puzzle(), today);
                            assert_eq!(stored.as_ref(), Some(game.session()));
                        }
                        Err(_) => {
                            assert!(selected != MAX_SELECTED || game.status().is_terminal());
                            assert_eq!(game.guess_history().len(), history);
                        }
                    }
                }
                4 => game.shuffle(),
                _ => game.deselect_all(),
            }

            assert!(game.selected_count() <= MAX_SELECTED);
            assert!(game.mistakes_remaining() <= mistakes);
            mistakes = game.mistakes_remaining();
            assert_eq!(game.is_won(), game.cleared_categories().len() == 4);
            assert_eq!(game.is_lost(), game.mistakes_remaining() == 0);
            assert!(!was_won || game.is_won());
            assert!(!was_lost || game.is_lost());
            was_won = game.is_won();
            was_lost = game.is_lost();
            assert_eq!(
                game.items().len() + 4 * game.cleared_categories().len(),
                16
            );
        }
    }
}
