//! Read state for the cooked line editor.
//!
//! - `buffer`: the candidate line with cursor, dirty watermark and suspension.
//! - `popup`: the popup variants and their bounded stack.
//! - `history`: the `CommandHistory` collaborator and an in-memory store.
//! - `alias`: the `AliasExpander` collaborator and a per-executable table.
//! - `sink`: transcoding sinks that model the caller's read buffer.
//! - `pending`: leftovers carried from one read to the next.
//! - `lock`: the console lock capability.
//!
//! Nothing in this crate performs terminal I/O.

pub mod alias;
pub mod buffer;
pub mod history;
pub mod lock;
pub mod pending;
pub mod popup;
pub mod sink;

pub use alias::{AliasExpander, AliasExpansion, AliasTable};
pub use buffer::{BufferState, DirtyState};
pub use history::{CommandHistory, DEFAULT_HISTORY_CAPACITY, MemoryHistory, SearchDirection};
pub use lock::{ConsoleGuard, ConsoleLock};
pub use pending::ReadHandleData;
pub use popup::{
    COMMAND_NUMBER_MAX_INPUT, CommandList, CommandNumber, MAX_POPUP_DEPTH, Popup, PopupError,
    PopupKind, PopupStack,
};
pub use sink::{TranscodingSink, Utf8Sink, Utf16Sink};
