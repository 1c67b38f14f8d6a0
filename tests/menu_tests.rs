use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pendu::{select, Choice, Console, InputEvent, KeyCode, MenuItem};
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

const ITEMS: [MenuItem<usize>; 3] = [
    MenuItem {
        label: "alpha",
        command: 0,
    },
    MenuItem {
        label: "beta",
        command: 1,
    },
    MenuItem {
        label: "gamma",
        command: 2,
    },
];

/// Run `select` on its own console; events are fed from the returned sender.
fn start_menu() -> (mpsc::UnboundedSender<InputEvent>, JoinHandle<Choice<usize>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(async move {
        let mut console = Console::new(rx, Box::new(Captured::default()));
        select(&mut console, "Pick one", &ITEMS).await.unwrap()
    });
    (tx, handle)
}

fn key(tx: &mpsc::UnboundedSender<InputEvent>, code: KeyCode) {
    tx.send(InputEvent::key(code)).unwrap();
}

/// Past the registration debounce so sent keys reach the live listener.
async fn past_debounce() {
    tokio::time::sleep(Duration::from_millis(300)).await;
}

#[tokio::test(start_paused = true)]
async fn k_downs_then_one_up_lands_on_k_minus_one_mod_n() {
    for k in [1usize, 2, 3, 5, 7] {
        let (tx, handle) = start_menu();
        past_debounce().await;
        for _ in 0..k {
            key(&tx, KeyCode::Down);
        }
        key(&tx, KeyCode::Up);
        key(&tx, KeyCode::Enter);
        let expected = (k - 1) % ITEMS.len();
        assert_eq!(handle.await.unwrap(), Choice::Picked(expected));
    }
}

#[tokio::test(start_paused = true)]
async fn up_from_the_top_wraps_to_the_last_item() {
    let (tx, handle) = start_menu();
    past_debounce().await;
    key(&tx, KeyCode::Up);
    key(&tx, KeyCode::Enter);
    assert_eq!(handle.await.unwrap(), Choice::Picked(2));
}

#[tokio::test(start_paused = true)]
async fn click_on_an_item_row_resolves_immediately() {
    let (tx, handle) = start_menu();
    past_debounce().await;
    // Header occupies row 0, so the second item sits on row 2.
    tx.send(InputEvent::Click { row: 2 }).unwrap();
    assert_eq!(handle.await.unwrap(), Choice::Picked(1));
}

#[tokio::test(start_paused = true)]
async fn click_outside_the_items_is_ignored() {
    let (tx, handle) = start_menu();
    past_debounce().await;
    tx.send(InputEvent::Click { row: 40 }).unwrap();
    key(&tx, KeyCode::Enter);
    assert_eq!(handle.await.unwrap(), Choice::Picked(0));
}

#[tokio::test(start_paused = true)]
async fn escape_means_no_selection() {
    let (tx, handle) = start_menu();
    past_debounce().await;
    key(&tx, KeyCode::Esc);
    assert_eq!(handle.await.unwrap(), Choice::Dismissed);
}

#[tokio::test(start_paused = true)]
async fn typed_text_resolves_as_a_command() {
    let (tx, handle) = start_menu();
    past_debounce().await;
    for c in "clear".chars() {
        key(&tx, KeyCode::Char(c));
    }
    key(&tx, KeyCode::Enter);
    assert_eq!(handle.await.unwrap(), Choice::Typed("clear".to_string()));
}

#[tokio::test(start_paused = true)]
async fn stale_enter_cannot_activate_the_first_item() {
    let (tx, handle) = start_menu();
    // An Enter sent before the debounce window closes is discarded...
    key(&tx, KeyCode::Enter);
    past_debounce().await;
    // ...so the deliberate selection afterwards is the one that counts.
    key(&tx, KeyCode::Down);
    key(&tx, KeyCode::Enter);
    assert_eq!(handle.await.unwrap(), Choice::Picked(1));
}
