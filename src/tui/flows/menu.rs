use crate::tui::{
    command::{Command, FlowKind},
    flow::{Flow, Selection, ViewCtx},
    message::{Key, Message},
};

const ITEMS: [(&str, Entry); 4] = [
    ("Add link (with scraping)", Entry::Open(FlowKind::AddLink { scrape: true })),
    ("Add link (basic)", Entry::Open(FlowKind::AddLink { scrape: false })),
    ("Manage links", Entry::Open(FlowKind::ManageLinks)),
    ("Quit", Entry::Quit),
];

const HELP: &[(&str, &str)] = &[
    ("Up/Down, j/k", "move"),
    ("Enter", "open"),
    ("1-4", "open directly"),
];

#[derive(Debug, Clone, Copy)]
enum Entry {
    Open(FlowKind),
    Quit,
}

/// The root menu
#[derive(Debug, Default)]
pub struct MenuFlow {
    selected: usize,
}

impl MenuFlow {
    pub fn new() -> Self {
        Self::default()
    }

    fn choose(&self, index: usize) -> Command {
        match ITEMS.get(index) {
            Some((_, Entry::Open(kind))) => Command::Switch(*kind),
            Some((_, Entry::Quit)) => Command::Quit,
            None => Command::None,
        }
    }
}

impl Flow for MenuFlow {
    fn init(&mut self) -> Command {
        Command::None
    }

    fn update(&mut self, msg: Message) -> Command {
        let Message::Key(key) = msg else {
            return Command::None;
        };
        match key {
            Key::Up | Key::Char('k') => self.selected = self.selected.saturating_sub(1),
            Key::Down | Key::Char('j') => self.selected = (self.selected + 1).min(ITEMS.len() - 1),
            Key::Enter => return self.choose(self.selected),
            Key::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                return self.choose(index);
            }
            _ => {}
        }
        Command::None
    }

    fn view(&self, _ctx: &ViewCtx) -> String {
        let mut lines = vec!["What would you like to do?".to_string(), String::new()];
        for (i, (label, _)) in ITEMS.iter().enumerate() {
            let marker = if i == self.selected { "→" } else { " " };
            lines.push(format!("{marker} {}. {label}", i + 1));
        }
        lines.join("\n")
    }

    fn selection(&self) -> Option<Selection> {
        Some(Selection {
            index: self.selected,
            item_height: 1,
            header_rows: 2,
        })
    }

    fn title(&self) -> String {
        "Link Management".to_string()
    }

    fn help(&self) -> &'static [(&'static str, &'static str)] {
        HELP
    }
}
