//! Host-side collaborators: the real screen and the mapping from config and
//! CLI flags to per-read editor options.

use core_actions::{EditorOptions, ScreenInfo};
use core_config::Config;
use core_events::{CtrlWakeupMask, InputModes};
use core_render::{PopupStyle, Viewport};
use core_terminal::{CellAttributes, Point};
use crossterm::cursor::SetCursorStyle;
use crossterm::execute;
use std::io::stdout;
use tracing::warn;

/// Screen queries answered by the controlling terminal. The size is cached
/// and refreshed from resize events.
#[derive(Debug)]
pub struct HostScreen {
    viewport: Viewport,
    double_mode: bool,
}

impl HostScreen {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            viewport: Viewport::new(usize::from(width), usize::from(height)),
            double_mode: false,
        }
    }

    pub fn from_terminal() -> Self {
        let (w, h) = crossterm::terminal::size().unwrap_or_else(|err| {
            warn!(target: "runtime", error = %err, "terminal size unavailable; assuming 80x24");
            (80, 24)
        });
        Self::new(w, h)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport = Viewport::new(usize::from(width), usize::from(height));
    }
}

impl ScreenInfo for HostScreen {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn cursor_position(&self) -> Point {
        match crossterm::cursor::position() {
            Ok((x, y)) => Point::new(x, y),
            Err(err) => {
                warn!(target: "runtime", error = %err, "cursor position query failed");
                Point::ORIGIN
            }
        }
    }

    fn set_cursor_double_mode(&mut self, double: bool) {
        if double == self.double_mode {
            return;
        }
        self.double_mode = double;
        let style = if double {
            SetCursorStyle::SteadyBlock
        } else {
            SetCursorStyle::DefaultUserShape
        };
        if let Err(err) = execute!(stdout(), style) {
            warn!(target: "runtime", error = %err, "cursor shape change failed");
        }
    }
}

/// Editor options for one read from the loaded config and CLI flags.
pub fn editor_options(config: &Config, exe_name: &str, wakeup_tab: bool) -> EditorOptions {
    let input = &config.file.input;
    let mut modes = InputModes::LINE;
    modes.set(InputModes::PROCESSED, input.processed);
    modes.set(InputModes::ECHO, input.echo);

    let wakeup_mask = if wakeup_tab {
        CtrlWakeupMask::EMPTY.with('\t')
    } else {
        CtrlWakeupMask::EMPTY
    };

    EditorOptions {
        modes,
        wakeup_mask,
        insert_mode: config.file.editing.insert_mode,
        history_no_duplicates: config.file.history.no_duplicates,
        popup: PopupStyle {
            attributes: CellAttributes::from_bits_retain(config.file.popup.attributes),
            max_height: config.popup_max_height(),
        },
        exe_name: exe_name.to_owned(),
    }
}
