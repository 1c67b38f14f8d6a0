//! Top-level session flow: login, menu, game loop, and end-of-game screens.
//!
//! The `App` owns the authenticated player, the active game session, and the
//! console; each screen runs to a transition and hands back the next
//! [`Screen`], so no state can observe another state's input.

use anyhow::Result;

use crate::config::Difficulty;
use crate::domain::{GameStatus, LoginStatus};
use crate::game::GameSession;
use crate::input::{Console, Timed};
use crate::menu::{self, Choice, MenuItem};
use crate::protocol::{ApiError, GameApi};
use crate::ui;

/// An authenticated player. Holding a value implies the login exchange
/// succeeded; dropping it is the logout.
#[derive(Debug, Clone)]
pub struct PlayerSession {
    pub name: String,
    secret: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Login,
    Menu,
    Playing,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuCommand {
    Play,
    Stats,
    Leaderboard,
    Logout,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatsCommand {
    Me,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DefeatCommand {
    Replay,
    Change,
    Home,
}

/// Where control goes after leaving the game screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum After {
    Menu,
    Login,
    /// Back to difficulty negotiation, keeping the player signed in.
    ChangeMode,
}

enum Opened {
    Session(GameSession),
    Bail(After),
}

enum Flow {
    Finished,
    Bail(After),
}

pub struct App {
    api: Box<dyn GameApi>,
    console: Console,
    player: Option<PlayerSession>,
}

impl App {
    pub fn new(api: Box<dyn GameApi>, console: Console) -> Self {
        Self {
            api,
            console,
            player: None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut screen = Screen::Login;
        loop {
            screen = match screen {
                Screen::Login => self.login_screen().await?,
                Screen::Menu => self.menu_screen().await?,
                Screen::Playing => self.play_screen().await?,
                Screen::Exit => {
                    self.console.clear()?;
                    self.console.print("Thanks for playing!")?;
                    return Ok(());
                }
            };
        }
    }

    async fn login_screen(&mut self) -> Result<Screen> {
        loop {
            self.console.clear()?;
            ui::print_login_screen(&mut self.console)?;
            let line = self.console.read_line("> ").await?;
            let mut parts = line.split_whitespace();
            match parts.next() {
                Some("quit") | Some("exit") => return Ok(Screen::Exit),
                Some("login") => {
                    let name = parts.collect::<Vec<_>>().join(" ");
                    if name.chars().count() < 2 {
                        self.console
                            .print("Invalid name: at least 2 characters required")?;
                        self.pause().await?;
                        continue;
                    }
                    self.console.clear()?;
                    self.console.print(&format!("Signing in as: {}\n", name))?;
                    let secret = self
                        .console
                        .read_secret("Password (min 3 characters): ")
                        .await?;
                    if secret.chars().count() < 3 {
                        self.console.print("Password too short")?;
                        self.pause().await?;
                        continue;
                    }
                    let outcome = self.api.login(&name, &secret).await;
                    match outcome {
                        Ok(reply) => {
                            self.console.clear()?;
                            match reply.status {
                                LoginStatus::Registered => {
                                    self.console.print("New account created!")?
                                }
                                LoginStatus::Migrated => {
                                    self.console.print("Account migrated successfully!")?
                                }
                                LoginStatus::LoggedIn => self.console.print("Welcome back!")?,
                            }
                            self.console.print(&reply.message)?;
                            self.player = Some(PlayerSession { name, secret });
                            self.console
                                .read_line("\nPress Enter to open the menu...")
                                .await?;
                            return Ok(Screen::Menu);
                        }
                        Err(ApiError::Unauthorized) => {
                            self.console.print("Wrong password")?;
                            self.pause().await?;
                        }
                        Err(err) => {
                            self.console.print(&format!("Error: {}", err))?;
                            self.pause().await?;
                        }
                    }
                }
                _ => {
                    self.console.print("Unknown command")?;
                    self.console
                        .print("Type 'login <your name>' to sign in, or 'quit' to leave")?;
                    self.pause().await?;
                }
            }
        }
    }

    async fn menu_screen(&mut self) -> Result<Screen> {
        let name = match &self.player {
            Some(player) => player.name.clone(),
            None => {
                log::error!("reached the menu without an authenticated player; back to login");
                return Ok(Screen::Login);
            }
        };
        const ITEMS: [MenuItem<MenuCommand>; 5] = [
            MenuItem {
                label: "Play",
                command: MenuCommand::Play,
            },
            MenuItem {
                label: "Statistics",
                command: MenuCommand::Stats,
            },
            MenuItem {
                label: "Leaderboard",
                command: MenuCommand::Leaderboard,
            },
            MenuItem {
                label: "Log out",
                command: MenuCommand::Logout,
            },
            MenuItem {
                label: "Quit",
                command: MenuCommand::Quit,
            },
        ];
        loop {
            self.console.clear()?;
            let header = ui::menu_header(&name);
            let choice = menu::select(&mut self.console, &header, &ITEMS).await?;
            let command = match choice {
                Choice::Picked(command) => command,
                Choice::Typed(text) => match text.to_ascii_lowercase().as_str() {
                    "play" => MenuCommand::Play,
                    "stats" => MenuCommand::Stats,
                    "leaderboard" => MenuCommand::Leaderboard,
                    "logout" => MenuCommand::Logout,
                    "quit" | "exit" => MenuCommand::Quit,
                    // Housekeeping: both repaint, which the loop does anyway.
                    "menu" | "clear" => continue,
                    other => {
                        self.console
                            .print(&format!("\nUnknown command: {}", other))?;
                        self.console
                            .print("Try 'play', 'stats', 'leaderboard', 'logout' or 'quit'")?;
                        self.pause().await?;
                        continue;
                    }
                },
                Choice::Dismissed => continue,
            };
            match command {
                MenuCommand::Play => return Ok(Screen::Playing),
                MenuCommand::Stats => self.stats_flow(&name).await?,
                MenuCommand::Leaderboard => self.leaderboard_flow().await?,
                MenuCommand::Logout => {
                    self.player = None;
                    self.console.clear()?;
                    self.console.print("Logged out")?;
                    self.pause().await?;
                    return Ok(Screen::Login);
                }
                MenuCommand::Quit => return Ok(Screen::Exit),
            }
        }
    }

    async fn stats_flow(&mut self, own_name: &str) -> Result<()> {
        self.console.clear()?;
        const ITEMS: [MenuItem<StatsCommand>; 2] = [
            MenuItem {
                label: "My statistics",
                command: StatsCommand::Me,
            },
            MenuItem {
                label: "Another player's statistics",
                command: StatsCommand::Other,
            },
        ];
        let choice = menu::select(
            &mut self.console,
            "Statistics - what do you want to see?\n",
            &ITEMS,
        )
        .await?;
        let target = match choice {
            Choice::Picked(StatsCommand::Me) => own_name.to_string(),
            Choice::Picked(StatsCommand::Other) => {
                let name = self.console.read_line("Player name to look up: ").await?;
                if name.is_empty() {
                    return Ok(());
                }
                name
            }
            _ => return Ok(()),
        };
        let outcome = self.api.player_stats(&target).await;
        match outcome {
            Ok(stats) => {
                self.console.clear()?;
                ui::print_stats(&mut self.console, &target, &stats)?;
            }
            Err(ApiError::NotFound) => {
                self.console
                    .print(&format!("No statistics recorded for {}", target))?;
            }
            Err(err) => {
                self.console.print(&format!("Error: {}", err))?;
            }
        }
        self.pause().await
    }

    async fn leaderboard_flow(&mut self) -> Result<()> {
        self.console.clear()?;
        let outcome = self.api.leaderboard().await;
        match outcome {
            Ok(board) => ui::print_leaderboard(&mut self.console, &board)?,
            Err(err) => self.console.print(&format!("Error: {}", err))?,
        }
        self.pause().await
    }

    async fn play_screen(&mut self) -> Result<Screen> {
        let (name, secret) = match &self.player {
            Some(player) => (player.name.clone(), player.secret.clone()),
            None => {
                log::error!(
                    "reached the game screen without an authenticated player; back to login"
                );
                return Ok(Screen::Login);
            }
        };
        loop {
            self.console.clear()?;
            self.console.print(&format!("Hello {}!\n", name))?;
            let (difficulty, infinite) = self.negotiate_difficulty().await?;
            let after = self.run_session(&name, &secret, difficulty, infinite).await?;
            match after {
                After::Menu => return Ok(Screen::Menu),
                After::Login => {
                    self.player = None;
                    return Ok(Screen::Login);
                }
                After::ChangeMode => continue,
            }
        }
    }

    /// Ask for a tier until a valid token arrives. Infinite mode nests a
    /// second prompt for its base tier. Validation never leaves the client.
    async fn negotiate_difficulty(&mut self) -> Result<(Difficulty, bool)> {
        loop {
            let token = self
                .console
                .read_line("Choose a difficulty (f-easy/m-middle/d-hard/i-infinite): ")
                .await?
                .to_ascii_lowercase();
            if matches!(token.as_str(), "i" | "infini" | "infinite") {
                self.console.print("\nINFINITE MODE ON!")?;
                self.console
                    .print("Win +1 life with every word found, keep going until you run out!\n")?;
                loop {
                    let base = self
                        .console
                        .read_line("Choose the base difficulty (f-easy/m-middle/d-hard): ")
                        .await?;
                    match Difficulty::parse_token(&base) {
                        Some(difficulty) => return Ok((difficulty, true)),
                        None => self.console.print("Invalid difficulty, try again")?,
                    }
                }
            }
            match Difficulty::parse_token(&token) {
                Some(difficulty) => return Ok((difficulty, false)),
                None => self.console.print("Invalid difficulty, try again")?,
            }
        }
    }

    /// One full game session: words keep coming while the player replays or
    /// wins in infinite mode.
    async fn run_session(
        &mut self,
        name: &str,
        secret: &str,
        difficulty: Difficulty,
        infinite: bool,
    ) -> Result<After> {
        let mut session = match self.open_session(name, secret, difficulty, infinite).await? {
            Opened::Session(session) => session,
            Opened::Bail(after) => return Ok(after),
        };
        loop {
            match self.guess_loop(&mut session).await? {
                Flow::Finished => {}
                Flow::Bail(after) => return Ok(after),
            }

            let won = session.status == GameStatus::Won;
            self.report_outcome(name, secret, &mut session, won).await?;

            if won && session.infinite_mode() {
                self.console
                    .read_line("\nPress Enter for the next word...")
                    .await?;
                match self.next_word(name, secret, session).await? {
                    Opened::Session(next) => {
                        session = next;
                        continue;
                    }
                    Opened::Bail(after) => return Ok(after),
                }
            }
            if won {
                self.pause().await?;
                return Ok(After::Menu);
            }

            let decision = self.defeat_menu().await?;
            match decision {
                DefeatCommand::Replay => {
                    match self.open_session(name, secret, difficulty, infinite).await? {
                        Opened::Session(next) => {
                            session = next;
                            continue;
                        }
                        Opened::Bail(after) => return Ok(after),
                    }
                }
                DefeatCommand::Change => return Ok(After::ChangeMode),
                DefeatCommand::Home => return Ok(After::Menu),
            }
        }
    }

    async fn open_session(
        &mut self,
        name: &str,
        secret: &str,
        difficulty: Difficulty,
        infinite: bool,
    ) -> Result<Opened> {
        let outcome = self.api.start_game(name, secret, difficulty).await;
        let reply = match outcome {
            Ok(reply) => reply,
            Err(err) => {
                let after = self.bail(err).await?;
                return Ok(Opened::Bail(after));
            }
        };
        let session = GameSession::open(&reply, difficulty, infinite);
        self.console.clear()?;
        if infinite {
            self.console.print("NEW GAME - INFINITE MODE")?;
            self.console
                .print(&format!("Starting lives: {}\n", ui::hearts(session.lives)))?;
        } else {
            self.console.print("NEW GAME\n")?;
        }
        self.console.print(&format!(
            "Word to guess: {} letters",
            session.letters_remaining()
        ))?;
        if session.timer_seconds.is_some() {
            self.console.print("Watch out: the guess timer is on!")?;
        }
        self.console
            .print("Type 'hint' to reveal a letter (costs 1 life)")?;
        self.pause().await?;
        Ok(Opened::Session(session))
    }

    async fn next_word(
        &mut self,
        name: &str,
        secret: &str,
        session: GameSession,
    ) -> Result<Opened> {
        let outcome = self.api.start_game(name, secret, session.difficulty).await;
        let reply = match outcome {
            Ok(reply) => reply,
            Err(err) => {
                let after = self.bail(err).await?;
                return Ok(Opened::Bail(after));
            }
        };
        let session = session.carry_into_next_word(&reply);
        self.console.clear()?;
        ui::print_new_word_banner(&mut self.console, &session)?;
        if session.timer_seconds.is_some() {
            self.console.print("Watch out: the guess timer is on!")?;
        }
        self.pause().await?;
        Ok(Opened::Session(session))
    }

    /// Drive one word to completion. Returns `Finished` when the session
    /// status leaves `Playing`; bails to a safe screen on remote failures.
    async fn guess_loop(&mut self, session: &mut GameSession) -> Result<Flow> {
        let mut last_message: Option<String> = None;
        while session.status == GameStatus::Playing {
            self.console.clear()?;
            ui::print_game_state(&mut self.console, session, last_message.as_deref())?;

            let entry = match session.timer_seconds {
                Some(seconds) => {
                    let waited = self
                        .console
                        .read_line_deadline("\nEnter a letter or the whole word: ", seconds)
                        .await?;
                    match waited {
                        Timed::Line(line) => line,
                        Timed::Expired => {
                            let status = session.apply_timeout();
                            self.console.print("\nTime is up! You lose a life.")?;
                            if status == GameStatus::Lost {
                                // Out of lives: the word is over, no server call.
                                break;
                            }
                            self.pause().await?;
                            last_message = None;
                            continue;
                        }
                    }
                }
                None => {
                    self.console
                        .read_line("\nEnter a letter or the whole word: ")
                        .await?
                }
            };
            let entry = entry.to_lowercase();
            if entry.is_empty() {
                continue;
            }

            if entry == "hint" || entry == "indice" {
                if !session.hint_allowed() {
                    self.console.print("Not enough lives left for a hint!")?;
                    self.pause().await?;
                    continue;
                }
                let outcome = self.api.guess(&session.id, &entry, true).await;
                match outcome {
                    Ok(reply) => {
                        session.apply_reply(&reply);
                        self.console.print(&format!("\n{}", reply.message))?;
                        self.pause().await?;
                        last_message = None;
                    }
                    Err(err) => {
                        let after = self.bail(err).await?;
                        return Ok(Flow::Bail(after));
                    }
                }
                continue;
            }

            let outcome = self.api.guess(&session.id, &entry, false).await;
            match outcome {
                Ok(reply) => {
                    session.apply_reply(&reply);
                    last_message = Some(reply.message);
                }
                Err(err) => {
                    let after = self.bail(err).await?;
                    return Ok(Flow::Bail(after));
                }
            }
        }
        Ok(Flow::Finished)
    }

    /// End-of-word report: outcome, infinite bookkeeping (including the
    /// best-effort stats flush on a lost run), and a short record pulled
    /// from the server.
    async fn report_outcome(
        &mut self,
        name: &str,
        secret: &str,
        session: &mut GameSession,
        won: bool,
    ) -> Result<()> {
        let seconds = session.word_started.elapsed().as_secs_f64();
        let word = session
            .secret_word
            .clone()
            .unwrap_or_else(|| session.display_mask.clone());

        self.console.clear()?;
        if won {
            self.console
                .print(&format!("BRAVO! You found the word: {}\n", word))?;
            if session.infinite_mode() {
                session.record_win_bonus();
                ui::print_infinite_bonus(&mut self.console, session)?;
            }
        } else {
            self.console
                .print(&format!("LOST! The word was: {}\n", word))?;
            if session.infinite_mode() {
                ui::print_infinite_final(&mut self.console, session)?;
                if let Some(report) = session.infinite_report(name, secret) {
                    // Best effort: a lost report never blocks leaving the game.
                    if let Err(err) = self.api.push_infinite_stats(&report).await {
                        log::debug!("infinite stats report not delivered: {}", err);
                    }
                }
            }
        }
        ui::print_word_summary(&mut self.console, session, seconds)?;

        let outcome = self.api.player_stats(name).await;
        match outcome {
            Ok(stats) => {
                self.console.print(&format!(
                    "\nYour record: {} wins in {} games",
                    stats.games_won, stats.games_played
                ))?;
                if won && stats.current_streak > 1 {
                    self.console
                        .print(&format!("Current streak: {}", stats.current_streak))?;
                } else if !won {
                    self.console.print("Streak broken")?;
                }
            }
            Err(err) => log::debug!("post-game stats unavailable: {}", err),
        }
        Ok(())
    }

    async fn defeat_menu(&mut self) -> Result<DefeatCommand> {
        const ITEMS: [MenuItem<DefeatCommand>; 3] = [
            MenuItem {
                label: "Replay (same difficulty)",
                command: DefeatCommand::Replay,
            },
            MenuItem {
                label: "Change mode",
                command: DefeatCommand::Change,
            },
            MenuItem {
                label: "Back to the menu",
                command: DefeatCommand::Home,
            },
        ];
        self.console.print("")?;
        let choice = menu::select(&mut self.console, "What do you want to do?\n", &ITEMS).await?;
        match choice {
            Choice::Picked(command) => Ok(command),
            // Escape or a typed command both mean "no selection" here.
            _ => Ok(DefeatCommand::Home),
        }
    }

    /// Shared remote-failure recovery: 401 forces login, anything else
    /// surfaces a message and falls back to the menu.
    async fn bail(&mut self, err: ApiError) -> Result<After> {
        match err {
            ApiError::Unauthorized => {
                self.console.print("Session expired, please sign in again")?;
                self.pause().await?;
                Ok(After::Login)
            }
            err => {
                self.console.print(&format!("Error: {}", err))?;
                self.pause().await?;
                Ok(After::Menu)
            }
        }
    }

    async fn pause(&mut self) -> Result<()> {
        self.console
            .read_line("\nPress Enter to continue...")
            .await?;
        Ok(())
    }
}
