//! Selectable menus over the console surface.
//!
//! Two input sources converge on a single resolution: arrow keys move a
//! cursor (Enter activates it) and a pointer click on an item's row activates
//! that item directly. Whichever fires first wins; the function returns at
//! that point, so a second resolution cannot occur.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};

use crate::config::MENU_DEBOUNCE;
use crate::input::{Console, InputEvent};

/// One selectable entry: what the player sees and what it resolves to.
#[derive(Debug, Clone, Copy)]
pub struct MenuItem<C> {
    pub label: &'static str,
    pub command: C,
}

/// How a menu interaction ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice<C> {
    /// An item was activated by cursor or pointer.
    Picked(C),
    /// The player typed a free-form command instead of selecting.
    Typed(String),
    /// Escape: explicit "no selection".
    Dismissed,
}

fn item_lines<C>(items: &[MenuItem<C>], selected: usize) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let prefix = if i == selected { "> " } else { "  " };
            format!("{}{}", prefix, item.label)
        })
        .collect()
}

/// Present `items` under `header` and wait for one resolution.
///
/// The key listener only becomes live after a short debounce, so the Enter
/// that committed the previous screen's input can never activate item 0.
pub async fn select<C: Copy>(
    console: &mut Console,
    header: &str,
    items: &[MenuItem<C>],
) -> Result<Choice<C>> {
    debug_assert!(!items.is_empty());
    let mut selected = 0usize;
    let mut typed = String::new();

    console.print(header)?;
    let first_item_row = console.row();
    for line in item_lines(items, selected) {
        console.print(&line)?;
    }
    console.print("")?;
    console.print("Use Up/Down and Enter, click an option, or type a command")?;

    tokio::time::sleep(MENU_DEBOUNCE).await;
    console.drain_events();

    loop {
        let event = console.read_event().await?;
        match event {
            InputEvent::Key { code, modifiers } => match code {
                KeyCode::Up => {
                    selected = (selected + items.len() - 1) % items.len();
                    console.rewrite_region(first_item_row, &item_lines(items, selected))?;
                }
                KeyCode::Down => {
                    selected = (selected + 1) % items.len();
                    console.rewrite_region(first_item_row, &item_lines(items, selected))?;
                }
                KeyCode::Enter => {
                    if typed.is_empty() {
                        return Ok(Choice::Picked(items[selected].command));
                    }
                    return Ok(Choice::Typed(typed.trim().to_string()));
                }
                KeyCode::Esc => return Ok(Choice::Dismissed),
                KeyCode::Backspace => {
                    typed.pop();
                    console.prompt_inline("", &typed)?;
                }
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(crate::input::Interrupted.into());
                }
                KeyCode::Char(c) => {
                    typed.push(c);
                    console.prompt_inline("", &typed)?;
                }
                _ => {}
            },
            InputEvent::Click { row } => {
                if let Some(index) = index_for_row(first_item_row, row, items.len()) {
                    return Ok(Choice::Picked(items[index].command));
                }
            }
        }
    }
}

fn index_for_row(first_item_row: u16, clicked: u16, len: usize) -> Option<usize> {
    if clicked < first_item_row {
        return None;
    }
    let index = (clicked - first_item_row) as usize;
    (index < len).then_some(index)
}
