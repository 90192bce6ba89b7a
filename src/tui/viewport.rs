use super::{flow::Selection, message::Key};


pub const HEADER_HEIGHT: usize = 2;
pub const FOOTER_HEIGHT: usize = 2;
/// Rows of context kept around the selection when scrolling to it
pub const SCROLL_PADDING: usize = 2;

const DEFAULT_WIDTH: u16 = 80;
const DEFAULT_HEIGHT: u16 = 24;
const MIN_WIDTH: u16 = 60;
const MIN_HEIGHT: u16 = 10;

const FOOTER_HINT: &str = "? help • m menu • q quit";
const GLOBAL_HELP: [(&str, &str); 5] = [
    ("PgUp/PgDn, Ctrl+B/F", "scroll a page"),
    ("Ctrl+U/D", "scroll half a page"),
    ("Home/End", "jump to top/bottom"),
    ("m", "back to the menu"),
    ("q, Ctrl+C", "quit"),
];

/// Moves `offset` so that `row` lies within `[offset, offset + visible)`.
///
/// The window jumps with [`SCROLL_PADDING`] rows of context and never further
/// than needed to keep `row` on screen.
pub fn auto_scroll(offset: usize, visible: usize, row: usize) -> usize {
    let visible = visible.max(1);
    let offset = if row < offset {
        row.saturating_sub(SCROLL_PADDING)
    } else if row >= offset + visible {
        (row + 1 + SCROLL_PADDING).saturating_sub(visible)
    } else {
        offset
    };
    offset.clamp((row + 1).saturating_sub(visible), row)
}

/// Frames the active flow and scrolls its body.
#[derive(Debug, Clone)]
pub struct Viewport {
    width: u16,
    height: u16,
    visible: usize,
    content: usize,
    offset: usize,
    selection: Option<Selection>,
    help: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    pub fn new() -> Self {
        let mut viewport = Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            visible: 1,
            content: 0,
            offset: 0,
            selection: None,
            help: false,
        };
        viewport.resize(DEFAULT_WIDTH, DEFAULT_HEIGHT);
        viewport
    }

    /// Applies a terminal resize and returns the effective size. Zero sizes
    /// fall back to the defaults; small ones are raised to the minimum.
    pub fn resize(&mut self, width: u16, height: u16) -> (u16, u16) {
        let width = if width == 0 { DEFAULT_WIDTH } else { width };
        let height = if height == 0 { DEFAULT_HEIGHT } else { height };
        self.width = width.max(MIN_WIDTH);
        self.height = height.max(MIN_HEIGHT);
        self.visible = (self.height as usize)
            .saturating_sub(HEADER_HEIGHT + FOOTER_HEIGHT)
            .max(1);
        (self.width, self.height)
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn visible_height(&self) -> usize {
        self.visible
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn content_height(&self) -> usize {
        self.content
    }

    fn max_offset(&self) -> usize {
        self.content.saturating_sub(self.visible)
    }

    /// Handles scroll keys. Returns `false` for every other key, which then
    /// belongs to the flow.
    pub fn scroll_key(&mut self, key: Key) -> bool {
        let page = self.visible;
        let half = (self.visible / 2).max(1);
        match key {
            Key::PageUp | Key::Ctrl('b') => self.offset = self.offset.saturating_sub(page),
            Key::PageDown | Key::Ctrl('f') => {
                self.offset = (self.offset + page).min(self.max_offset())
            }
            Key::Ctrl('u') => self.offset = self.offset.saturating_sub(half),
            Key::Ctrl('d') => self.offset = (self.offset + half).min(self.max_offset()),
            Key::Home => self.offset = 0,
            Key::End => self.offset = self.max_offset(),
            _ => return false,
        }
        true
    }

    /// Keeps the flow's selection on screen after an update.
    pub fn follow(&mut self, selection: Option<Selection>) {
        match selection {
            Some(sel) => self.offset = auto_scroll(self.offset, self.visible, sel.row()),
            None if self.selection.is_some() => self.offset = 0,
            None => {}
        }
        self.selection = selection;
    }

    /// Forgets scroll position and selection, for a new flow
    pub fn reset(&mut self) {
        self.offset = 0;
        self.selection = None;
        self.help = false;
    }

    pub fn help_shown(&self) -> bool {
        self.help
    }

    pub fn toggle_help(&mut self) {
        self.help = !self.help;
    }

    pub fn close_help(&mut self) {
        self.help = false;
    }

    /// Lays out header, the visible slice of `body` (or the help overlay) and
    /// the footer.
    pub fn frame(&mut self, title: &str, body: &str, help: &[(&str, &str)]) -> String {
        let rule = "─".repeat(self.width as usize);
        let lines: Vec<String> = if self.help {
            help_lines(help)
        } else {
            body.lines().map(str::to_string).collect()
        };
        self.content = lines.len();
        let offset = if self.help {
            0
        } else {
            self.offset = self.offset.min(self.max_offset());
            self.offset
        };

        let mut out = Vec::with_capacity(self.height as usize);
        out.push(title.to_string());
        out.push(rule.clone());
        let shown: Vec<&String> = lines.iter().skip(offset).take(self.visible).collect();
        let pad = self.visible - shown.len();
        out.extend(shown.into_iter().cloned());
        out.extend(std::iter::repeat_n(String::new(), pad));
        out.push(rule);
        let position = if self.content > self.visible {
            format!(
                "  [{}-{}/{}]",
                offset + 1,
                (offset + self.visible).min(self.content),
                self.content
            )
        } else {
            String::new()
        };
        out.push(format!("{FOOTER_HINT}{position}"));
        out.join("\n")
    }
}

fn help_lines(flow_help: &[(&str, &str)]) -> Vec<String> {
    let mut lines = vec!["Keys".to_string(), String::new()];
    lines.extend(flow_help.iter().map(|(k, d)| format!("  {k:<22} {d}")));
    lines.push(String::new());
    lines.extend(GLOBAL_HELP.iter().map(|(k, d)| format!("  {k:<22} {d}")));
    lines.push(String::new());
    lines.push("Press ? or Esc to close".to_string());
    lines
}
