use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::Difficulty;
use crate::domain::{
    GuessReply, GuessRequest, InfiniteReport, Leaderboard, LoginReply, LoginRequest, PlayerStats,
    StartRequest,
};
use crate::protocol::{ApiError, GameApi};

/// HTTP implementation of [`GameApi`] against the Pendu backend.
pub struct HttpApi {
    client: Client,
    base: String,
}

impl HttpApi {
    /// `base` is the server root, e.g. `http://127.0.0.1:8000`.
    pub fn new(base: &str) -> Self {
        Self {
            client: Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Decode a reply, mapping HTTP failure codes onto the error taxonomy.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        Err(Self::classify(status, response).await)
    }

    async fn classify(status: StatusCode, response: Response) -> ApiError {
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::NOT_FOUND => ApiError::NotFound,
            _ => {
                // FastAPI error bodies carry a `detail` field
                #[derive(serde::Deserialize)]
                struct Detail {
                    detail: String,
                }
                match response.json::<Detail>().await {
                    Ok(d) => ApiError::Remote(d.detail),
                    Err(_) => ApiError::Remote(status.to_string()),
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl GameApi for HttpApi {
    async fn login(&self, name: &str, secret: &str) -> Result<LoginReply, ApiError> {
        let body = LoginRequest {
            player_name: name.to_string(),
            password: secret.to_string(),
        };
        let response = self
            .client
            .post(self.url("/api/player/login"))
            .json(&body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn start_game(
        &self,
        name: &str,
        secret: &str,
        difficulty: Difficulty,
    ) -> Result<GuessReply, ApiError> {
        let body = StartRequest {
            player_name: name.to_string(),
            password: secret.to_string(),
            difficulty,
        };
        let response = self
            .client
            .post(self.url("/api/game/start"))
            .json(&body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn guess(&self, game_id: &str, entry: &str, hint: bool) -> Result<GuessReply, ApiError> {
        let body = GuessRequest {
            game_id: game_id.to_string(),
            guess: entry.to_string(),
            hint_requested: hint,
        };
        let response = self
            .client
            .post(self.url("/api/game/guess"))
            .json(&body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn player_stats(&self, name: &str) -> Result<PlayerStats, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/api/stats/{}", name)))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn leaderboard(&self) -> Result<Leaderboard, ApiError> {
        let response = self.client.get(self.url("/api/leaderboard")).send().await?;
        Self::decode(response).await
    }

    async fn push_infinite_stats(&self, report: &InfiniteReport) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/api/infinite/stats"))
            .json(report)
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::classify(response.status(), response).await)
        }
    }
}
