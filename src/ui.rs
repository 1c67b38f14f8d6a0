//! Line-oriented rendering helpers for the console surface.

use anyhow::Result;

use crate::config::Difficulty;
use crate::domain::{Leaderboard, PlayerStats};
use crate::game::GameSession;
use crate::input::Console;

const BANNER: &str = "═══════════════════════════════════════";

pub fn hearts(lives: u32) -> String {
    "♥ ".repeat(lives as usize).trim_end().to_string()
}

pub fn print_login_screen(console: &mut Console) -> Result<()> {
    console.print(BANNER)?;
    console.print("      PENDU TERMINAL - SIGN IN")?;
    console.print(BANNER)?;
    console.print("")?;
    console.print("Authentication is required to play.")?;
    console.print("")?;
    console.print("Commands:")?;
    console.print("  login <name>  sign in or create an account")?;
    console.print("  quit          leave")?;
    console.print("")?;
    Ok(())
}

pub fn menu_header(player: &str) -> String {
    format!(
        "{BANNER}\n             PENDU\n{BANNER}\n\nSigned in as: {player}\n"
    )
}

/// The per-turn game block: word, wrong letters, lives, hints, and the last
/// server message. Word length and wrong letters only show on easy, the
/// other tiers keep them hidden.
pub fn print_game_state(
    console: &mut Console,
    session: &GameSession,
    last_message: Option<&str>,
) -> Result<()> {
    console.print("")?;
    if session.difficulty == Difficulty::Easy {
        console.print(&format!(
            "Word: {} ({})",
            session.display_mask,
            session.display_mask.chars().count()
        ))?;
        if !session.wrong_letters.is_empty() {
            let wrong: Vec<String> = session.wrong_letters.iter().map(|c| c.to_string()).collect();
            console.print(&format!("Wrong letters: {}", wrong.join(", ")))?;
        }
    } else {
        console.print(&format!("Word: {}", session.display_mask))?;
    }
    console.print(&format!("Lives left: {}", hearts(session.lives)))?;
    if session.hints_used > 0 {
        console.print(&format!("Hints used: {}", session.hints_used))?;
    }
    if let Some(message) = last_message {
        console.print("")?;
        console.print(message)?;
    }
    Ok(())
}

pub fn print_word_summary(console: &mut Console, session: &GameSession, seconds: f64) -> Result<()> {
    console.print(&format!("Game time: {:.1} seconds", seconds))?;
    console.print(&format!("Wrong letters: {}", session.wrong_letters.len()))?;
    if session.hints_used > 0 {
        console.print(&format!("Hints used: {}", session.hints_used))?;
    }
    Ok(())
}

pub fn print_infinite_bonus(console: &mut Console, session: &GameSession) -> Result<()> {
    if let Some(progress) = &session.infinite {
        console.print(&format!(
            "INFINITE MODE: +1 life! (Lives left: {})",
            hearts(session.lives)
        ))?;
        console.print(&format!(
            "Words found: {} | Lives gained: {}",
            progress.words_found, progress.bonus_lives
        ))?;
    }
    Ok(())
}

pub fn print_infinite_final(console: &mut Console, session: &GameSession) -> Result<()> {
    if let Some(progress) = &session.infinite {
        console.print("INFINITE RUN OVER!")?;
        console.print("Final performance:")?;
        console.print(&format!("  Words found: {}", progress.words_found))?;
        console.print(&format!("  Lives gained: {}", progress.bonus_lives))?;
        console.print(&format!("  Most lives held: {}", progress.max_lives_reached))?;
    }
    Ok(())
}

pub fn print_new_word_banner(console: &mut Console, session: &GameSession) -> Result<()> {
    console.print("NEW WORD - INFINITE MODE")?;
    if let Some(progress) = &session.infinite {
        console.print(&format!(
            "Words found: {} | Lives left: {}",
            progress.words_found,
            hearts(session.lives)
        ))?;
    }
    console.print("")?;
    console.print(&format!("Word to guess: {} letters", session.letters_remaining()))?;
    Ok(())
}

pub fn print_stats(console: &mut Console, player: &str, stats: &PlayerStats) -> Result<()> {
    console.print(BANNER)?;
    console.print(&format!("     STATISTICS - {}", player.to_uppercase()))?;
    console.print(BANNER)?;
    console.print("")?;
    console.print(&format!("Games played: {}", stats.games_played))?;
    console.print(&format!("Games won: {}", stats.games_won))?;
    if stats.games_played > 0 {
        let rate = stats.games_won as f64 / stats.games_played as f64 * 100.0;
        console.print(&format!("Win rate: {:.1}%", rate))?;
    }
    console.print(&format!("Words found: {}", stats.total_words_found))?;
    console.print(&format!("Total wrong letters: {}", stats.total_wrong_letters))?;
    if stats.total_time > 0.0 && stats.games_played > 0 {
        let avg = stats.total_time / stats.games_played as f64;
        console.print(&format!("Average game time: {:.1}s", avg))?;
    }
    if let Some(best) = stats.best_time {
        console.print(&format!("Best time: {:.1}s", best))?;
    }
    console.print(&format!("Longest word found: {} letters", stats.longest_word))?;
    console.print(&format!("Current streak: {}", stats.current_streak))?;
    console.print(&format!("Best streak: {}", stats.best_streak))?;
    console.print(&format!("Hints used: {}", stats.total_hints))?;

    if let Some(infinite) = &stats.infinite_mode_stats {
        if infinite.games_played > 0 {
            console.print("")?;
            console.print("Infinite mode:")?;
            console.print(&format!("  Sessions played: {}", infinite.games_played))?;
            console.print(&format!("  Best score: {} words", infinite.best_words_found))?;
            if infinite.average_words_found > 0.0 {
                console.print(&format!(
                    "  Average words: {:.1} per session",
                    infinite.average_words_found
                ))?;
            }
            console.print(&format!("  Most lives held: {}", infinite.max_lives_reached))?;
            console.print(&format!("  Total lives gained: {}", infinite.total_lives_gained))?;
            if let Some(best) = infinite.best_session_time {
                console.print(&format!("  Best session: {:.1}s", best))?;
            }
            if infinite.total_session_time > 0.0 && infinite.games_played > 0 {
                let avg = infinite.total_session_time / infinite.games_played as f64;
                console.print(&format!("  Average session time: {:.1}s", avg))?;
            }
        }
    }

    if !stats.difficulty_stats.is_empty() {
        console.print("")?;
        console.print("Games by difficulty:")?;
        for (tier, count) in &stats.difficulty_stats {
            console.print(&format!("  {}: {} games", tier, count))?;
        }
    }
    Ok(())
}

pub fn print_leaderboard(console: &mut Console, board: &Leaderboard) -> Result<()> {
    console.print(BANNER)?;
    console.print("            LEADERBOARD")?;
    console.print(BANNER)?;
    console.print("")?;

    if !board.players_by_wins.is_empty() {
        console.print("Top wins:")?;
        for (rank, (name, stats)) in board.players_by_wins.iter().enumerate() {
            console.print(&format!("{}. {}: {} wins", rank + 1, name, stats.games_won))?;
        }
        console.print("")?;
    }
    if !board.players_by_winrate.is_empty() {
        console.print("Best win rate (min 3 games):")?;
        for (rank, (name, stats)) in board.players_by_winrate.iter().enumerate() {
            let rate = if stats.games_played > 0 {
                stats.games_won as f64 / stats.games_played as f64 * 100.0
            } else {
                0.0
            };
            console.print(&format!(
                "{}. {}: {:.1}% ({}/{})",
                rank + 1,
                name,
                rate,
                stats.games_won,
                stats.games_played
            ))?;
        }
        console.print("")?;
    }
    if !board.players_by_speed.is_empty() {
        console.print("Fastest wins:")?;
        for (rank, (name, stats)) in board.players_by_speed.iter().enumerate() {
            if let Some(best) = stats.best_time {
                console.print(&format!("{}. {}: {:.1}s", rank + 1, name, best))?;
            }
        }
    }
    if board.players_by_wins.is_empty() {
        console.print("No statistics recorded yet")?;
    }
    Ok(())
}
