//! Line-oriented front-end.
//!
//! Reads one command per line from stdin and prints the board after each.
//! Everything it does to the game goes through the host's engine operations.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use quartet_core::Game;
use quartet_engine::GameHost;
use quartet_puzzle::PuzzleFeed;
use quartet_types::{MAX_MISTAKES, Outcome, normalize_text};

const REVEAL_DELAY: Duration = Duration::from_secs(1);

const HELP: &str = "\
Commands:
  1 5 9 12   toggle items by number (or type an item's text)
  s          submit the four selected items
  x          shuffle the board
  d          deselect everything
  q          quit";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Empty,
    Toggle(Vec<usize>),
    Text(String),
    Submit,
    Shuffle,
    Deselect,
    Help,
    Quit,
}

impl Input {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.to_lowercase().as_str() {
            "" => return Input::Empty,
            "s" | "submit" => return Input::Submit,
            "x" | "shuffle" => return Input::Shuffle,
            "d" | "deselect" => return Input::Deselect,
            "h" | "?" | "help" => return Input::Help,
            "q" | "quit" => return Input::Quit,
            _ => {}
        }
        let numbers: Option<Vec<usize>> = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(|part| part.parse().ok())
            .collect();
        match numbers {
            Some(numbers) => Input::Toggle(numbers),
            None => Input::Text(normalize_text(line)),
        }
    }
}

fn outcome_message(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Duplicate => "Already guessed!",
        Outcome::Correct => "Correct!",
        Outcome::Win => "Solved! Well played.",
        Outcome::OneAway => "One away...",
        Outcome::Incorrect => "Not a group.",
        Outcome::Loss => "Out of mistakes.",
    }
}

/// The board as printed after every command.
fn render(game: &Game) -> String {
    let mut out = String::new();
    let used = MAX_MISTAKES - game.mistakes_remaining();
    let _ = writeln!(
        out,
        "\nQuartet {}   mistakes left: {}{}",
        game.session().date(),
        "*".repeat(usize::from(game.mistakes_remaining())),
        ".".repeat(usize::from(used)),
    );

    for category in game
        .cleared_categories()
        .iter()
        .chain(game.revealed_categories())
    {
        let _ = writeln!(
            out,
            "  [{}] {}: {}",
            category.level(),
            category.name(),
            category.items().join(", ")
        );
    }

    for (row, items) in game.items().chunks(4).enumerate() {
        let cells: Vec<String> = items
            .iter()
            .enumerate()
            .map(|(col, item)| {
                let number = row * 4 + col + 1;
                if item.selected {
                    format!("{number:>2}.[{}]", item.text)
                } else {
                    format!("{number:>2}. {} ", item.text)
                }
            })
            .collect();
        let _ = writeln!(out, "  {}", cells.join("  "));
    }

    if game.is_won() {
        let _ = writeln!(out, "You found every group.");
    } else if game.is_lost() {
        let _ = writeln!(out, "Better luck tomorrow.");
    }
    out
}

fn print_board<F: PuzzleFeed>(host: &GameHost<F>) {
    match host.with_game(render) {
        Some(board) => println!("{board}"),
        None => println!("No puzzle loaded. Press enter to retry, q to quit."),
    }
}

/// Reveal what is left of a lost game one category at a time.
async fn reveal_loss<F: PuzzleFeed>(host: &GameHost<F>) {
    host.with_game_mut(Game::deselect_all);
    while let Some(Some(category)) = host.with_game_mut(Game::reveal_next) {
        tokio::time::sleep(REVEAL_DELAY).await;
        println!(
            "  [{}] {}: {}",
            category.level(),
            category.name(),
            category.items().join(", ")
        );
    }
    host.with_game_mut(Game::resolve_loss);
}

async fn submit<F: PuzzleFeed>(host: &GameHost<F>) {
    let Some(result) = host.with_game_mut(Game::submit) else {
        return;
    };
    match result {
        Ok(outcome) => {
            println!("{}", outcome_message(outcome));
            match outcome {
                Outcome::Win => {
                    host.with_game_mut(Game::resolve_win);
                }
                Outcome::Loss => reveal_loss(host).await,
                _ => {}
            }
        }
        Err(e) => println!("{e}"),
    }
}

fn toggle<F: PuzzleFeed>(host: &GameHost<F>, numbers: &[usize]) {
    host.with_game_mut(|game| {
        for &number in numbers {
            let text = number
                .checked_sub(1)
                .and_then(|index| game.items().get(index))
                .map(|item| item.text.clone());
            match text {
                Some(text) => {
                    game.select(&text);
                }
                None => println!("No item {number}."),
            }
        }
    });
}

/// Play until stdin closes or the player quits.
pub(crate) async fn run<F: PuzzleFeed>(host: Arc<GameHost<F>>) -> Result<()> {
    if let Err(e) = host.open().await {
        println!("Could not load today's puzzle: {e}");
    }
    // A lost game resumed mid-reveal still owes the player its answers.
    if host.with_game(Game::is_lost) == Some(true) {
        reveal_loss(&host).await;
    }
    let _rollover = host.spawn_rollover();
    let mut changes = host.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{HELP}");
    print_board(&host);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if let Err(e) = host.ensure_current().await {
                    println!("Could not load today's puzzle: {e}");
                }
                match Input::parse(&line) {
                    Input::Quit => break,
                    Input::Help => println!("{HELP}"),
                    Input::Empty => {}
                    Input::Toggle(numbers) => toggle(&host, &numbers),
                    Input::Text(text) => {
                        if host.with_game_mut(|game| game.select(&text)) != Some(true) {
                            println!("Can't select {text:?}.");
                        }
                    }
                    Input::Submit => submit(&host).await,
                    Input::Shuffle => {
                        host.with_game_mut(Game::shuffle);
                    }
                    Input::Deselect => {
                        host.with_game_mut(Game::deselect_all);
                    }
                }
                changes.mark_unchanged();
                print_board(&host);
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("\nA new puzzle is ready.");
                print_board(&host);
            }
        }
    }
    Ok(())
}
