//! Client-side game state and its reconciliation against server replies.
//!
//! In normal play the server is fully authoritative and its numbers simply
//! overwrite the local copy. In infinite mode the client privately banks one
//! bonus life per word won, which the server does not track, so each reply
//! has to be mapped back onto the client's anchor instead of copied.

use std::collections::BTreeSet;
use std::time::Instant;

use crate::config::Difficulty;
use crate::domain::{GameStatus, GuessReply, InfiniteReport};

/// Client-only bookkeeping for an infinite run. Exists exactly while the
/// session is in infinite mode.
#[derive(Debug, Clone)]
pub struct InfiniteProgress {
    pub words_found: u32,
    pub bonus_lives: u32,
    pub max_lives_reached: u32,
    pub started: Instant,
}

/// Local copy of one game in progress.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub id: String,
    pub display_mask: String,
    pub wrong_letters: BTreeSet<char>,
    pub lives: u32,
    /// Fixed per-word life budget; the anchor every server reply is
    /// reconciled against.
    pub max_lives: u32,
    /// The client's mirror of the server's per-word error counter. Timeouts
    /// never advance it: the server has not seen them.
    word_errors: u32,
    pub hints_used: u32,
    pub timeouts: u32,
    pub difficulty: Difficulty,
    pub timer_seconds: Option<u64>,
    pub status: GameStatus,
    pub secret_word: Option<String>,
    pub word_started: Instant,
    pub infinite: Option<InfiniteProgress>,
}

impl GameSession {
    /// Build the local session around the server's opening reply. The life
    /// budget comes from the client's tier table; a server that disagrees is
    /// noted but the table stays the anchor.
    pub fn open(reply: &GuessReply, difficulty: Difficulty, infinite: bool) -> Self {
        let settings = difficulty.settings();
        if reply.lives != settings.max_lives {
            log::warn!(
                "server opened a game with {} lives where the {} tier expects {}",
                reply.lives,
                difficulty.label(),
                settings.max_lives
            );
        }
        Self {
            id: reply.game_id.clone(),
            display_mask: reply.word_display.clone(),
            wrong_letters: BTreeSet::new(),
            lives: settings.max_lives,
            max_lives: settings.max_lives,
            word_errors: 0,
            hints_used: 0,
            timeouts: 0,
            difficulty,
            timer_seconds: settings.timer_seconds,
            status: GameStatus::Playing,
            secret_word: None,
            word_started: Instant::now(),
            infinite: infinite.then(|| InfiniteProgress {
                words_found: 0,
                bonus_lives: 0,
                max_lives_reached: settings.max_lives,
                started: Instant::now(),
            }),
        }
    }

    pub fn infinite_mode(&self) -> bool {
        self.infinite.is_some()
    }

    pub fn word_errors(&self) -> u32 {
        self.word_errors
    }

    /// Letters of the word still hidden behind placeholders.
    pub fn letters_remaining(&self) -> usize {
        self.display_mask.chars().filter(|c| *c == '_').count()
    }

    /// Merge an authoritative reply into the local session.
    pub fn apply_reply(&mut self, reply: &GuessReply) {
        self.display_mask = merge_mask(&self.display_mask, &reply.word_display);
        self.wrong_letters.extend(reply.wrong_letters.iter().copied());

        if self.infinite.is_none() {
            // The server owns the number outright.
            self.lives = reply.lives;
        } else {
            // The server's count is relative to its own per-word budget. Map
            // it back onto the anchor: any shortfall against what the client
            // expected is a newly observed loss, imported by subtraction so
            // banked bonus lives survive.
            let expected = self.max_lives.saturating_sub(self.word_errors);
            if reply.lives < expected {
                let deficit = expected - reply.lives;
                self.lives = self.lives.saturating_sub(deficit);
            }
        }
        self.word_errors = self.max_lives.saturating_sub(reply.lives);

        self.hints_used = reply.hints_used;
        self.status = reply.status;
        if let Some(word) = &reply.secret_word {
            self.secret_word = Some(word.clone());
        }

        if self.lives == 0 && self.status == GameStatus::Playing {
            log::warn!("lives exhausted while the server still reports a live game; closing as lost");
            self.status = GameStatus::Lost;
        }
        if self.status == GameStatus::Lost {
            self.lives = 0;
        }
    }

    /// An expired guess deadline costs exactly one life, locally: the server
    /// never learns about it, so only `lives` and the timeout tally move.
    pub fn apply_timeout(&mut self) -> GameStatus {
        self.lives = self.lives.saturating_sub(1);
        self.timeouts += 1;
        if self.lives == 0 {
            self.status = GameStatus::Lost;
        }
        self.status
    }

    /// A hint costs one life, so it is only affordable while a life remains
    /// after paying.
    pub fn hint_allowed(&self) -> bool {
        self.lives > 1
    }

    /// Bank the infinite-mode win bonus: one permanent extra life.
    pub fn record_win_bonus(&mut self) {
        if let Some(progress) = self.infinite.as_mut() {
            self.lives += 1;
            progress.words_found += 1;
            progress.bonus_lives += 1;
            progress.max_lives_reached = progress.max_lives_reached.max(self.lives);
        }
    }

    /// Fold the server's reply for the next infinite word into this session,
    /// keeping the accumulated lives and the run's progress counters.
    pub fn carry_into_next_word(mut self, fresh: &GuessReply) -> GameSession {
        self.id = fresh.game_id.clone();
        self.display_mask = fresh.word_display.clone();
        self.wrong_letters.clear();
        self.word_errors = 0;
        self.hints_used = 0;
        self.timeouts = 0;
        self.secret_word = None;
        self.status = GameStatus::Playing;
        self.word_started = Instant::now();
        self
    }

    /// End-of-run report for the best-effort stats push. None outside
    /// infinite mode.
    pub fn infinite_report(&self, name: &str, secret: &str) -> Option<InfiniteReport> {
        self.infinite.as_ref().map(|progress| InfiniteReport {
            player_name: name.to_string(),
            password: secret.to_string(),
            words_found: progress.words_found,
            lives_gained: progress.bonus_lives,
            max_lives: progress.max_lives_reached,
            session_time: progress.started.elapsed().as_secs_f64(),
        })
    }
}

/// Positionwise merge that never lets the server re-mask a letter the client
/// has already seen revealed.
fn merge_mask(local: &str, server: &str) -> String {
    if local.chars().count() != server.chars().count() {
        // Different word shape; nothing to preserve.
        return server.to_string();
    }
    let mut remasked = false;
    let merged = local
        .chars()
        .zip(server.chars())
        .map(|(l, s)| {
            if s == '_' && l != '_' {
                remasked = true;
                l
            } else {
                s
            }
        })
        .collect();
    if remasked {
        log::warn!("server reply tried to re-mask a revealed letter; keeping the local reveal");
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_revealed_letters() {
        assert_eq!(merge_mask("c_t", "__t"), "c_t");
        assert_eq!(merge_mask("c_t", "ca_"), "cat");
        assert_eq!(merge_mask("___", "_a_"), "_a_");
    }

    #[test]
    fn merge_takes_server_mask_for_new_word_shape() {
        assert_eq!(merge_mask("cat", "_____"), "_____");
    }
}
