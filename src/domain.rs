//! Wire types exchanged with the Pendu server.
//!
//! Field names follow the server's JSON contract; everything tolerated as
//! optional there carries a default here so older accounts deserialize.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Current status of a game as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

/// Outcome of a login exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginStatus {
    /// A fresh account was created for this name.
    Registered,
    /// A pre-password account existed and was migrated in place.
    Migrated,
    LoggedIn,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub player_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginReply {
    pub status: LoginStatus,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartRequest {
    pub player_name: String,
    pub password: String,
    pub difficulty: crate::config::Difficulty,
}

#[derive(Debug, Clone, Serialize)]
pub struct GuessRequest {
    pub game_id: String,
    pub guess: String,
    pub hint_requested: bool,
}

/// Authoritative game snapshot returned by both `start` and `guess`.
#[derive(Debug, Clone, Deserialize)]
pub struct GuessReply {
    pub game_id: String,
    pub status: GameStatus,
    pub word_display: String,
    #[serde(default)]
    pub wrong_letters: Vec<char>,
    pub lives: u32,
    pub max_lives: u32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub hints_used: u32,
    #[serde(default)]
    pub game_time: Option<f64>,
    /// Real word, revealed only when the game ends.
    #[serde(default)]
    pub secret_word: Option<String>,
}

/// Lifetime statistics for one player.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerStats {
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub games_won: u32,
    #[serde(default)]
    pub total_words_found: u32,
    #[serde(default)]
    pub total_wrong_letters: u32,
    #[serde(default)]
    pub total_time: f64,
    #[serde(default)]
    pub best_time: Option<f64>,
    #[serde(default)]
    pub longest_word: u32,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub best_streak: u32,
    #[serde(default)]
    pub total_hints: u32,
    #[serde(default)]
    pub infinite_mode_stats: Option<InfiniteModeStats>,
    #[serde(default)]
    pub difficulty_stats: BTreeMap<String, u32>,
}

/// Aggregated infinite-mode statistics, present once a player has finished
/// at least one infinite session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InfiniteModeStats {
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub best_words_found: u32,
    #[serde(default)]
    pub average_words_found: f64,
    #[serde(default)]
    pub max_lives_reached: u32,
    #[serde(default)]
    pub total_lives_gained: u32,
    #[serde(default)]
    pub best_session_time: Option<f64>,
    #[serde(default)]
    pub total_session_time: f64,
}

/// The three server-side rankings. Each entry is a `[name, stats]` pair.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Leaderboard {
    #[serde(default)]
    pub players_by_wins: Vec<(String, PlayerStats)>,
    #[serde(default)]
    pub players_by_winrate: Vec<(String, PlayerStats)>,
    #[serde(default)]
    pub players_by_speed: Vec<(String, PlayerStats)>,
}

/// End-of-session report for an infinite run. Delivery is best effort.
#[derive(Debug, Clone, Serialize)]
pub struct InfiniteReport {
    pub player_name: String,
    pub password: String,
    pub words_found: u32,
    pub lives_gained: u32,
    pub max_lives: u32,
    pub session_time: f64,
}
