use std::time::Duration;

use super::{command::Command, message::Message};

/// Where the highlighted item of a list sits in a flow's body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    /// Rows each item occupies
    pub item_height: usize,
    /// Rows above the first item
    pub header_rows: usize,
}

impl Selection {
    /// Body row of the selected item
    pub fn row(&self) -> usize {
        self.header_rows + self.index * self.item_height
    }
}

/// Rendering context handed to [`Flow::view`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewCtx {
    pub width: u16,
    /// Rows available to the body
    pub height: usize,
    /// Whether focused text inputs should draw their cursor this frame
    pub cursor: bool,
    /// Frame counter driven by ticks, for spinners
    pub tick: usize,
}

impl Default for ViewCtx {
    fn default() -> Self {
        Self {
            width: 80,
            height: 20,
            cursor: false,
            tick: 0,
        }
    }
}

/// Values flows need from the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub scrape_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scrape_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// A screen of the application modelled as a state machine.
///
/// `update` is pure with respect to the outside world: effects are returned
/// as [`Command`]s and their results come back as messages.
pub trait Flow: Send {
    /// Command to run when the flow becomes active
    fn init(&mut self) -> Command;

    fn update(&mut self, msg: Message) -> Command;

    /// Renders the body as plain text lines
    fn view(&self, ctx: &ViewCtx) -> String;

    /// The list selection to keep visible, when the flow shows a list
    fn selection(&self) -> Option<Selection> {
        None
    }

    /// Whether plain characters are text input rather than shortcuts
    fn captures_text(&self) -> bool {
        false
    }

    fn title(&self) -> String;

    /// Key bindings of the current step, as `(keys, description)` pairs
    fn help(&self) -> &'static [(&'static str, &'static str)];
}
