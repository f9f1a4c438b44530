//! Cooked-read line editor.
//!
//! `LineEditor` turns a stream of `InputUnit`s into an edited line: grapheme
//! and word motion, history recall, the F-key popups, and completion with
//! history recording, alias expansion and pending-input bookkeeping. Screen
//! updates go through `core_render::Redrawer`, one corked batch per turn.
//!
//! A read that runs out of input parks inside a `CookedReadSlot` and resumes
//! on the next call; termination reasons delivered through the slot end it.

pub mod context;
pub mod editor;
pub mod slot;

pub use context::{EditorOptions, ReadContext, ReadState, ReadStatus, ScreenInfo};
pub use editor::LineEditor;
pub use slot::CookedReadSlot;
