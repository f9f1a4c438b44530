//! Collaborators a cooked read borrows for one turn.

use core_events::{ControlKeyState, CtrlWakeupMask, InputModes, InputSource};
use core_render::{PopupStyle, Viewport};
use core_state::{AliasExpander, CommandHistory, ReadHandleData, TranscodingSink};
use core_terminal::Point;

/// Host screen queries the editor needs.
pub trait ScreenInfo {
    fn viewport(&self) -> Viewport;
    /// Cursor position relative to the viewport.
    fn cursor_position(&self) -> Point;
    /// Switch the cursor to its alternate (overwrite) shape.
    fn set_cursor_double_mode(&mut self, double: bool);
}

/// Everything borrowed from the host while a read turn runs. The output
/// channel is passed separately so the turn can hold it corked.
pub struct ReadContext<'a> {
    pub input: &'a mut dyn InputSource,
    pub history: Option<&'a mut dyn CommandHistory>,
    pub aliases: &'a mut dyn AliasExpander,
    pub screen: &'a mut dyn ScreenInfo,
    pub pending: &'a mut ReadHandleData,
    pub sink: &'a mut dyn TranscodingSink,
}

/// Per-read settings fixed at construction.
#[derive(Debug, Clone)]
pub struct EditorOptions {
    pub modes: InputModes,
    pub wakeup_mask: CtrlWakeupMask,
    /// Console-wide default; the Insert key toggles relative to it.
    pub insert_mode: bool,
    pub history_no_duplicates: bool,
    pub popup: PopupStyle,
    pub exe_name: String,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            modes: InputModes::default(),
            wakeup_mask: CtrlWakeupMask::EMPTY,
            insert_mode: true,
            history_no_duplicates: false,
            popup: PopupStyle::default(),
            exe_name: String::from("cmd.exe"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    Accumulating,
    DoneWithWakeupMask,
    DoneWithCarriageReturn,
}

/// Outcome reported to whoever issued the read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// No more input right now; the editor stays parked.
    Pending,
    Success {
        bytes: usize,
        control_key_state: ControlKeyState,
    },
    Alerted,
    ThreadTerminating,
}
