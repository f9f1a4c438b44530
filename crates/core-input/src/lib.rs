//! Terminal input for the cooked-read host.
//!
//! Crossterm key events are translated into the console input vocabulary of
//! `core-events` and forwarded over a bounded tokio channel by a background
//! task. The host drains that channel into a `QueuedInput` before each read
//! turn.

mod async_service;
mod translate;

pub use async_service::{AsyncInputShutdown, CrosstermInput};
pub use translate::{paste_units, translate_key};

use async_service::spawn_async_event_task;
use core_events::Event;
use tokio::task::JoinHandle;

/// Spawn the async input service backed by `crossterm::EventStream`.
///
/// Returns the `JoinHandle` for the background task alongside a shutdown handle
/// that can be used to request immediate termination.
pub fn spawn_async_input(sender: tokio::sync::mpsc::Sender<Event>) -> (JoinHandle<()>, AsyncInputShutdown) {
    spawn_async_event_task(sender)
}
