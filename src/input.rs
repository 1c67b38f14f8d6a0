//! Input multiplexing for the interactive console.
//!
//! A spawned pump task forwards crossterm events into an mpsc channel; the
//! [`Console`] is the channel's only consumer and arbitrates what the next
//! keystroke means. Every wait method takes `&mut self`, so at most one
//! pending input can exist at a time, and a deadline countdown is owned by
//! the wait that armed it; dropping the wait cancels the countdown, which
//! rules out a second resolution.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use crossterm::cursor::MoveTo;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEvent, KeyEventKind,
    MouseButton, MouseEventKind,
};
pub use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::terminal::{self, Clear, ClearType};
use futures_util::StreamExt;
use tokio::sync::mpsc;

/// Terminal events the client reacts to, reduced from crossterm's event set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key {
        code: KeyCode,
        modifiers: KeyModifiers,
    },
    /// Left-button press, by terminal row.
    Click { row: u16 },
}

impl InputEvent {
    pub fn key(code: KeyCode) -> Self {
        InputEvent::Key {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }
}

/// Result of a deadline-bounded wait. `Expired` is distinct from an empty
/// committed line so callers can tell "no input" from "empty input".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timed {
    Line(String),
    Expired,
}

/// Whether typed characters are echoed back to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Echo {
    Visible,
    Hidden,
}

/// The player hit Ctrl+C. Main treats this as a clean exit once the terminal
/// guard has restored the screen.
#[derive(Debug)]
pub struct Interrupted;

impl core::fmt::Display for Interrupted {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "interrupted")
    }
}

impl std::error::Error for Interrupted {}

/// Forward crossterm events into a channel the [`Console`] can select on.
/// Key releases/repeats and non-left mouse events are filtered at the pump.
pub fn spawn_event_reader() -> mpsc::UnboundedReceiver<InputEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut events = EventStream::new();
        while let Some(Ok(event)) = events.next().await {
            let mapped = match event {
                Event::Key(KeyEvent {
                    code,
                    modifiers,
                    kind: KeyEventKind::Press,
                    ..
                }) => Some(InputEvent::Key { code, modifiers }),
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                    Some(InputEvent::Click { row: mouse.row })
                }
                _ => None,
            };
            if let Some(ev) = mapped {
                if tx.send(ev).is_err() {
                    break;
                }
            }
        }
    });
    rx
}

/// Puts the terminal into raw mode with mouse capture for the lifetime of
/// the value, restoring the previous state on drop (including unwinds).
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        crossterm::execute!(io::stdout(), EnableMouseCapture)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(io::stdout(), DisableMouseCapture);
        let _ = terminal::disable_raw_mode();
    }
}

/// The console surface: sole consumer of the event channel and sole writer
/// of program output. Tracks how many rows have been printed since the last
/// clear so pointer rows can be mapped back onto menu items.
pub struct Console {
    events: mpsc::UnboundedReceiver<InputEvent>,
    out: Box<dyn Write + Send>,
    row: u16,
}

enum Step {
    Event(Option<InputEvent>),
    Tick,
}

impl Console {
    pub fn new(events: mpsc::UnboundedReceiver<InputEvent>, out: Box<dyn Write + Send>) -> Self {
        Self {
            events,
            out,
            row: 0,
        }
    }

    pub fn stdout(events: mpsc::UnboundedReceiver<InputEvent>) -> Self {
        Self::new(events, Box::new(io::stdout()))
    }

    /// Row the next printed line will land on (0-based, since last clear).
    pub fn row(&self) -> u16 {
        self.row
    }

    /// Print one or more lines, each terminated for raw mode.
    pub fn print(&mut self, text: &str) -> Result<()> {
        for line in text.split('\n') {
            self.out.write_all(line.as_bytes())?;
            self.out.write_all(b"\r\n")?;
            self.row += 1;
        }
        self.out.flush()?;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        crossterm::queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        self.out.flush()?;
        self.row = 0;
        Ok(())
    }

    /// Repaint a block of previously printed rows in place, leaving the
    /// cursor (and the row counter) at the bottom of the surface.
    pub fn rewrite_region(&mut self, start_row: u16, lines: &[String]) -> Result<()> {
        crossterm::queue!(self.out, MoveTo(0, start_row))?;
        for line in lines {
            crossterm::queue!(self.out, Clear(ClearType::CurrentLine))?;
            self.out.write_all(line.as_bytes())?;
            self.out.write_all(b"\r\n")?;
        }
        crossterm::queue!(self.out, MoveTo(0, self.row))?;
        self.out.flush()?;
        Ok(())
    }

    /// Render an editable prompt on the current line without committing it.
    pub fn prompt_inline(&mut self, prompt: &str, buffer: &str) -> Result<()> {
        self.render_input_line(prompt, buffer, Echo::Visible, None)
    }

    /// Drop every event buffered while nothing was waiting for input.
    pub fn drain_events(&mut self) {
        while self.events.try_recv().is_ok() {}
    }

    /// Next raw event; used by the menu controller, which manages its own
    /// debounce and keeps listening across re-renders.
    pub async fn read_event(&mut self) -> Result<InputEvent> {
        self.events
            .recv()
            .await
            .ok_or_else(|| anyhow!("input channel closed"))
    }

    /// Wait for a committed line of input.
    pub async fn read_line(&mut self, prompt: &str) -> Result<String> {
        match self.wait_line(prompt, Echo::Visible, None).await? {
            Timed::Line(line) => Ok(line),
            Timed::Expired => unreachable!("no deadline was armed"),
        }
    }

    /// Like [`read_line`], but typed characters are never echoed.
    ///
    /// [`read_line`]: Console::read_line
    pub async fn read_secret(&mut self, prompt: &str) -> Result<String> {
        match self.wait_line(prompt, Echo::Hidden, None).await? {
            Timed::Line(line) => Ok(line),
            Timed::Expired => unreachable!("no deadline was armed"),
        }
    }

    /// Wait for a committed line or the expiry of `seconds`, whichever comes
    /// first. The countdown re-renders the input line once per second.
    pub async fn read_line_deadline(&mut self, prompt: &str, seconds: u64) -> Result<Timed> {
        self.wait_line(prompt, Echo::Visible, Some(seconds)).await
    }

    async fn wait_line(&mut self, prompt: &str, echo: Echo, deadline: Option<u64>) -> Result<Timed> {
        // Events delivered while no input was pending are dropped, which also
        // discards any stale Enter left over from the previous prompt.
        self.drain_events();

        // Leading blank lines are printed once; only the last line of the
        // prompt takes part in the per-keystroke re-render.
        let mut prompt = prompt;
        while let Some(rest) = prompt.strip_prefix('\n') {
            self.print("")?;
            prompt = rest;
        }

        let mut buffer = String::new();
        let mut remaining = deadline.unwrap_or(0);
        let mut countdown = match deadline {
            Some(_) => {
                let mut interval = tokio::time::interval(Duration::from_secs(1));
                interval.tick().await; // first tick completes immediately, skip it
                Some(interval)
            }
            None => None,
        };
        self.render_input_line(prompt, &buffer, echo, deadline.map(|_| remaining))?;

        loop {
            let step = match countdown.as_mut() {
                Some(interval) => tokio::select! {
                    ev = self.events.recv() => Step::Event(ev),
                    _ = interval.tick() => Step::Tick,
                },
                None => Step::Event(self.events.recv().await),
            };

            match step {
                Step::Tick => {
                    remaining = remaining.saturating_sub(1);
                    if remaining == 0 {
                        self.newline()?;
                        return Ok(Timed::Expired);
                    }
                    self.render_input_line(prompt, &buffer, echo, Some(remaining))?;
                }
                Step::Event(None) => bail!("input channel closed"),
                Step::Event(Some(InputEvent::Key { code, modifiers })) => match code {
                    KeyCode::Enter => {
                        self.newline()?;
                        return Ok(Timed::Line(buffer.trim().to_string()));
                    }
                    KeyCode::Backspace => {
                        buffer.pop();
                        self.render_input_line(prompt, &buffer, echo, deadline.map(|_| remaining))?;
                    }
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        self.newline()?;
                        return Err(Interrupted.into());
                    }
                    KeyCode::Char(c) => {
                        buffer.push(c);
                        self.render_input_line(prompt, &buffer, echo, deadline.map(|_| remaining))?;
                    }
                    _ => {}
                },
                // Pointer events have no meaning while a line wait is armed.
                Step::Event(Some(InputEvent::Click { .. })) => {}
            }
        }
    }

    fn render_input_line(
        &mut self,
        prompt: &str,
        buffer: &str,
        echo: Echo,
        remaining: Option<u64>,
    ) -> Result<()> {
        crossterm::queue!(self.out, Clear(ClearType::CurrentLine))?;
        self.out.write_all(b"\r")?;
        self.out.write_all(prompt.as_bytes())?;
        if let Some(secs) = remaining {
            self.out.write_all(format!("({}s) ", secs).as_bytes())?;
        }
        if echo == Echo::Visible {
            self.out.write_all(buffer.as_bytes())?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn newline(&mut self) -> Result<()> {
        self.out.write_all(b"\r\n")?;
        self.out.flush()?;
        self.row += 1;
        Ok(())
    }
}
