use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pendu::protocol::{ApiError, GameApi};
use pendu::{
    App, Console, Difficulty, GameStatus, GuessReply, InputEvent, InfiniteReport, KeyCode,
    Leaderboard, LoginReply, LoginStatus, PlayerStats,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}

/// Scripted stand-in for the remote service: replies are queued per
/// endpoint and every call is journaled for the assertions.
#[derive(Clone, Default)]
struct FakeApi {
    calls: Arc<Mutex<Vec<String>>>,
    start_replies: Arc<Mutex<VecDeque<Result<GuessReply, ApiError>>>>,
    guess_replies: Arc<Mutex<VecDeque<Result<GuessReply, ApiError>>>>,
    infinite_push_fails: bool,
    infinite_pushes: Arc<Mutex<u32>>,
}

impl FakeApi {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn queue_start(&self, reply: Result<GuessReply, ApiError>) {
        self.start_replies.lock().unwrap().push_back(reply);
    }

    fn queue_guess(&self, reply: Result<GuessReply, ApiError>) {
        self.guess_replies.lock().unwrap().push_back(reply);
    }
}

#[async_trait::async_trait]
impl GameApi for FakeApi {
    async fn login(&self, name: &str, _secret: &str) -> Result<LoginReply, ApiError> {
        self.calls.lock().unwrap().push(format!("login {}", name));
        Ok(LoginReply {
            status: LoginStatus::LoggedIn,
            message: format!("Welcome back {}!", name),
        })
    }

    async fn start_game(
        &self,
        _name: &str,
        _secret: &str,
        difficulty: Difficulty,
    ) -> Result<GuessReply, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("start {}", difficulty.label()));
        self.start_replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted start_game call")
    }

    async fn guess(&self, _game_id: &str, entry: &str, hint: bool) -> Result<GuessReply, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("guess {} hint={}", entry, hint));
        self.guess_replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted guess call")
    }

    async fn player_stats(&self, name: &str) -> Result<PlayerStats, ApiError> {
        self.calls.lock().unwrap().push(format!("stats {}", name));
        Ok(PlayerStats {
            games_played: 5,
            games_won: 3,
            current_streak: 2,
            ..Default::default()
        })
    }

    async fn leaderboard(&self) -> Result<Leaderboard, ApiError> {
        self.calls.lock().unwrap().push("leaderboard".to_string());
        Ok(Leaderboard::default())
    }

    async fn push_infinite_stats(&self, report: &InfiniteReport) -> Result<(), ApiError> {
        *self.infinite_pushes.lock().unwrap() += 1;
        self.calls
            .lock()
            .unwrap()
            .push(format!("infinite words={}", report.words_found));
        if self.infinite_push_fails {
            Err(ApiError::Http("connection reset".to_string()))
        } else {
            Ok(())
        }
    }
}

fn playing(mask: &str, lives: u32, max: u32) -> GuessReply {
    GuessReply {
        game_id: "g1".to_string(),
        status: GameStatus::Playing,
        word_display: mask.to_string(),
        wrong_letters: Vec::new(),
        lives,
        max_lives: max,
        message: "ok".to_string(),
        hints_used: 0,
        game_time: None,
        secret_word: None,
    }
}

fn finished(word: &str, status: GameStatus, lives: u32, max: u32) -> GuessReply {
    GuessReply {
        game_id: "g1".to_string(),
        status,
        word_display: word.to_string(),
        wrong_letters: Vec::new(),
        lives,
        max_lives: max,
        message: "done".to_string(),
        hints_used: 0,
        game_time: Some(4.2),
        secret_word: Some(word.to_string()),
    }
}

fn run_app(
    api: FakeApi,
) -> (
    mpsc::UnboundedSender<InputEvent>,
    Captured,
    JoinHandle<anyhow::Result<()>>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let out = Captured::default();
    let sink = out.clone();
    let handle = tokio::spawn(async move {
        let mut app = App::new(Box::new(api), Console::new(rx, Box::new(sink)));
        app.run().await
    });
    (tx, out, handle)
}

/// Feed one committed line, spaced past any menu debounce window.
async fn type_line(tx: &mpsc::UnboundedSender<InputEvent>, text: &str) {
    tokio::time::sleep(Duration::from_millis(300)).await;
    for c in text.chars() {
        tx.send(InputEvent::key(KeyCode::Char(c))).unwrap();
    }
    tx.send(InputEvent::key(KeyCode::Enter)).unwrap();
}

async fn press(tx: &mpsc::UnboundedSender<InputEvent>, code: KeyCode) {
    tokio::time::sleep(Duration::from_millis(300)).await;
    tx.send(InputEvent::key(code)).unwrap();
}

#[tokio::test(start_paused = true)]
async fn login_play_and_win_lands_back_in_the_menu() {
    let api = FakeApi::default();
    api.queue_start(Ok(playing("____", 10, 10)));
    api.queue_guess(Ok(finished("word", GameStatus::Won, 10, 10)));

    let (tx, _out, handle) = run_app(api.clone());
    type_line(&tx, "login alice").await;
    type_line(&tx, "s3cret").await; // password
    type_line(&tx, "").await; // into the menu
    type_line(&tx, "play").await;
    type_line(&tx, "f").await; // easy, untimed
    type_line(&tx, "").await; // past the intro
    type_line(&tx, "word").await; // winning whole-word guess
    type_line(&tx, "").await; // past the outcome report
    type_line(&tx, "quit").await;

    handle.await.unwrap().unwrap();
    assert_eq!(
        api.calls(),
        vec![
            "login alice".to_string(),
            "start easy".to_string(),
            "guess word hint=false".to_string(),
            "stats alice".to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn hint_at_one_life_never_reaches_the_server() {
    let api = FakeApi::default();
    api.queue_start(Ok(playing("____", 10, 10)));
    // One wrong guess drops the server count straight to a single life.
    api.queue_guess(Ok(playing("____", 1, 10)));
    api.queue_guess(Ok(finished("word", GameStatus::Won, 1, 10)));

    let (tx, out, handle) = run_app(api.clone());
    type_line(&tx, "login alice").await;
    type_line(&tx, "s3cret").await;
    type_line(&tx, "").await;
    type_line(&tx, "play").await;
    type_line(&tx, "f").await;
    type_line(&tx, "").await;
    type_line(&tx, "z").await; // server: down to 1 life
    type_line(&tx, "hint").await; // rejected locally
    type_line(&tx, "").await; // past the rejection notice
    type_line(&tx, "word").await;
    type_line(&tx, "").await;
    type_line(&tx, "quit").await;

    handle.await.unwrap().unwrap();
    let calls = api.calls();
    assert!(calls.iter().all(|c| !c.contains("hint=true")));
    assert_eq!(
        calls
            .iter()
            .filter(|c| c.starts_with("guess"))
            .count(),
        2
    );
    assert!(out.text().contains("Not enough lives left for a hint!"));
}

#[tokio::test(start_paused = true)]
async fn lost_infinite_run_flushes_stats_once_and_failure_is_nonfatal() {
    let api = FakeApi {
        infinite_push_fails: true,
        ..FakeApi::default()
    };
    api.queue_start(Ok(playing("____", 10, 10)));
    // The server burns through the whole word budget in one reply.
    api.queue_guess(Ok(finished("chat", GameStatus::Lost, 0, 10)));

    let (tx, _out, handle) = run_app(api.clone());
    type_line(&tx, "login bob").await;
    type_line(&tx, "s3cret").await;
    type_line(&tx, "").await;
    type_line(&tx, "play").await;
    type_line(&tx, "i").await; // infinite mode
    type_line(&tx, "f").await; // easy base tier
    type_line(&tx, "").await; // past the intro
    type_line(&tx, "qqqqqqqqqq").await; // fatal guess
    press(&tx, KeyCode::Esc).await; // defeat menu: no selection = home
    type_line(&tx, "quit").await;

    handle.await.unwrap().unwrap();
    assert_eq!(*api.infinite_pushes.lock().unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn unauthorized_start_forces_a_return_to_login() {
    let api = FakeApi::default();
    api.queue_start(Err(ApiError::Unauthorized));

    let (tx, out, handle) = run_app(api.clone());
    type_line(&tx, "login carol").await;
    type_line(&tx, "s3cret").await;
    type_line(&tx, "").await;
    type_line(&tx, "play").await;
    type_line(&tx, "f").await;
    type_line(&tx, "").await; // past the expiry notice
    type_line(&tx, "quit").await; // back on the login screen

    handle.await.unwrap().unwrap();
    assert_eq!(
        api.calls(),
        vec!["login carol".to_string(), "start easy".to_string()]
    );
    // The sign-in screen was shown twice: at startup and after the 401.
    assert_eq!(out.text().matches("SIGN IN").count(), 2);
}

#[tokio::test(start_paused = true)]
async fn timer_expiry_costs_one_life_and_no_server_call() {
    let api = FakeApi::default();
    api.queue_start(Ok(playing("____", 6, 6)));
    api.queue_guess(Ok(finished("word", GameStatus::Won, 6, 6)));

    let (tx, out, handle) = run_app(api.clone());
    type_line(&tx, "login dave").await;
    type_line(&tx, "s3cret").await;
    type_line(&tx, "").await;
    type_line(&tx, "play").await;
    type_line(&tx, "m").await; // middle: 6 lives, 10 s guess timer
    type_line(&tx, "").await; // past the intro

    // Let the guess deadline run out before answering the notice.
    tokio::time::sleep(Duration::from_secs(12)).await;
    type_line(&tx, "").await; // past the timeout notice
    type_line(&tx, "word").await;
    type_line(&tx, "").await;
    type_line(&tx, "quit").await;

    handle.await.unwrap().unwrap();
    assert_eq!(out.text().matches("Time is up!").count(), 1);
    assert_eq!(
        api.calls()
            .iter()
            .filter(|c| c.starts_with("guess"))
            .count(),
        1
    );
}
