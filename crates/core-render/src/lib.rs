//! Prompt rendering: line layout, popup rows and the differential redraw.
//!
//! Everything here produces VT text into a `String` and hands it to the
//! `OutputChannel` in one write. Nothing reads from the terminal; the caller
//! supplies the viewport size and the starting origin.
//!
//! Layout model:
//! - A prompt is laid out into `DisplayLine`s. Line 0 starts at the origin
//!   column, every following line at column 0.
//! - Each line remembers where its stale part begins (`dirty_beg` in bytes,
//!   `dirty_col` on screen); clean prefixes are never rewritten.
//! - Popups append overlay lines after the prompt and own the cursor while
//!   shown.
//!
//! Invariants:
//! - A flush with a clean buffer and a clean popup stack writes nothing.
//! - The screen cursor always ends on the buffer cursor (or the end of the
//!   topmost popup).
//! - The pager window always contains the cursor row.
//! - Rows the previous frame occupied beyond the new frame are erased.
//!
//! Exposed Components:
//! - `layout`: `layout_line`, caret notation, tab expansion.
//! - `popups`: prompt rows and the command list with its scrollbar.
//! - `redraw`: `Redrawer`, the stateful flush and resize helpers.
//! - `viewport`: terminal size and pager window arithmetic.

pub mod layout;
pub mod popups;
pub mod redraw;
pub mod viewport;

pub use layout::{DisplayLine, LayoutResult, caret_form, layout_line};
pub use popups::{COMMAND_NUMBER_PROMPT, COPY_FROM_CHAR_PROMPT, COPY_TO_CHAR_PROMPT, PopupStyle, draw_popup};
pub use redraw::{LinePos, Redrawer};
pub use viewport::Viewport;
