use crate::config::Difficulty;
use crate::domain::{GuessReply, InfiniteReport, Leaderboard, LoginReply, PlayerStats};

/// Errors surfaced by the remote game service.
#[derive(Debug)]
pub enum ApiError {
    /// 401: wrong password or expired session. Forces a return to login.
    Unauthorized,
    /// 404: unknown player or game.
    NotFound,
    /// Any other rejection carrying a server-side detail message.
    Remote(String),
    /// Transport-level failure (connection refused, timeout, bad body).
    Http(String),
}

impl core::fmt::Display for ApiError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ApiError::Unauthorized => write!(f, "authentication rejected by the server"),
            ApiError::NotFound => write!(f, "not found"),
            ApiError::Remote(detail) => write!(f, "server rejected the request: {}", detail),
            ApiError::Http(detail) => write!(f, "request failed: {}", detail),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Http(err.to_string())
    }
}

/// Remote authority holding the real words and the scoring logic.
///
/// The client never evaluates a guess itself; every game mutation flows
/// through this seam and comes back as an authoritative [`GuessReply`].
#[async_trait::async_trait]
pub trait GameApi: Send + Sync {
    async fn login(&self, name: &str, secret: &str) -> Result<LoginReply, ApiError>;

    /// Ask the server for a fresh word at the given tier.
    async fn start_game(
        &self,
        name: &str,
        secret: &str,
        difficulty: Difficulty,
    ) -> Result<GuessReply, ApiError>;

    /// Submit a letter or whole-word guess; `hint` trades a life for a
    /// revealed letter instead.
    async fn guess(&self, game_id: &str, entry: &str, hint: bool) -> Result<GuessReply, ApiError>;

    async fn player_stats(&self, name: &str) -> Result<PlayerStats, ApiError>;

    async fn leaderboard(&self) -> Result<Leaderboard, ApiError>;

    /// Push an end-of-session infinite report. Callers treat failure as
    /// non-fatal; the trait still reports it so they can log.
    async fn push_infinite_stats(&self, report: &InfiniteReport) -> Result<(), ApiError>;
}
