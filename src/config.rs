use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Difficulty tiers offered by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Middle,
    Hard,
}

/// Per-tier game parameters. Lives must match the server's `max_errors` table
/// so the client's anchor agrees with the per-word counter it reconciles
/// against; the guess timer is a purely client-side constraint.
#[derive(Debug, Clone, Copy)]
pub struct TierSettings {
    pub max_lives: u32,
    pub timer_seconds: Option<u64>,
}

impl Difficulty {
    pub fn settings(self) -> TierSettings {
        match self {
            Difficulty::Easy => TierSettings {
                max_lives: 10,
                timer_seconds: None,
            },
            Difficulty::Middle => TierSettings {
                max_lives: 6,
                timer_seconds: Some(10),
            },
            Difficulty::Hard => TierSettings {
                max_lives: 3,
                timer_seconds: Some(5),
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Middle => "middle",
            Difficulty::Hard => "hard",
        }
    }

    /// Parse a user-entered difficulty token (`f`/`easy`, `m`/`middle`,
    /// `d`/`hard`). Returns None for anything else; the caller re-prompts.
    pub fn parse_token(token: &str) -> Option<Difficulty> {
        match token.trim().to_ascii_lowercase().as_str() {
            "f" | "easy" => Some(Difficulty::Easy),
            "m" | "middle" => Some(Difficulty::Middle),
            "d" | "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Wait inserted between rendering a menu and listening for its keys, so a
/// stale Enter from the previous screen cannot activate the first item.
pub const MENU_DEBOUNCE: Duration = Duration::from_millis(200);
