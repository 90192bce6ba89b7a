use crate::{
    api::links::{Link, LinkId, ScrapeOptions},
    tui::{
        command::{Command, Operation, Slot},
        flow::{Flow, Selection, Settings, ViewCtx},
        input::TextInput,
        message::{Key, Message, OpId, OpIds, Outcome, Payload, Stage},
        render,
    },
};


/// Rows each link takes in the list
pub const ITEM_HEIGHT: usize = 2;
/// Rows above the first link: the count and a status line
pub const HEADER_ROWS: usize = 2;
const TEXT_PREVIEW: usize = 500;
const VANISHED: &str = "The selected link is no longer available.";

const LIST_HELP: &[(&str, &str)] = &[
    ("Up/Down, j/k", "move"),
    ("Enter", "actions for the selected link"),
    ("r", "reload"),
    ("Esc", "back to the menu"),
];
const ACTION_HELP: &[(&str, &str)] = &[
    ("1, v", "view details"),
    ("2, d", "delete"),
    ("3, s", "scrape and fill empty fields"),
    ("Esc, b", "back to the list"),
];
const DETAILS_HELP: &[(&str, &str)] = &[("Esc, b, Enter", "back to the actions")];
const DELETE_HELP: &[(&str, &str)] = &[
    ("y + Enter", "delete the link"),
    ("Enter", "keep the link"),
    ("Esc", "back to the actions"),
];
const ENRICH_HELP: &[(&str, &str)] = &[("Esc", "stop and go back to the actions")];
const DONE_HELP: &[(&str, &str)] = &[("any key", "back to the list")];

/// Keeps a selection inside `[0, len - 1]`, or none for an empty list.
pub fn clamp_selection(selected: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some(selected.unwrap_or(0).min(len - 1))
    }
}

fn confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    ListLinks,
    ActionMenu {
        target: LinkId,
    },
    ViewDetails {
        target: LinkId,
    },
    DeleteConfirm {
        target: LinkId,
        input: TextInput,
        pending: Option<OpId>,
    },
    Enriching {
        target: LinkId,
        op: OpId,
        stage: Stage,
        text: String,
    },
    Done {
        notice: String,
    },
}

/// Browses stored links and runs per-link actions.
///
/// The local list is a cache: every successful mutation triggers a reload.
/// Actions remember the id of the link they were opened for, so a reload
/// that shifts rows never retargets them. The selection follows its link
/// across reloads and is clamped only when that link is gone.
#[derive(Debug)]
pub struct ManageLinksFlow {
    ids: OpIds,
    settings: Settings,
    step: Step,
    links: Vec<Link>,
    selected: Option<usize>,
    loading: Option<OpId>,
    load_error: Option<String>,
    error: Option<String>,
}

impl ManageLinksFlow {
    pub fn new(generation: u64, settings: Settings) -> Self {
        Self {
            ids: OpIds::new(generation),
            settings,
            step: Step::ListLinks,
            links: Vec::new(),
            selected: None,
            loading: None,
            load_error: None,
            error: None,
        }
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    fn current(&self) -> Option<&Link> {
        self.selected.and_then(|i| self.links.get(i))
    }

    fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.iter().find(|l| l.id == id)
    }

    /// The link the current step acts on, if the step has one.
    fn target(&self) -> Option<LinkId> {
        match &self.step {
            Step::ActionMenu { target }
            | Step::ViewDetails { target }
            | Step::DeleteConfirm { target, .. }
            | Step::Enriching { target, .. } => Some(*target),
            Step::ListLinks | Step::Done { .. } => None,
        }
    }

    fn reload(&mut self) -> Command {
        let op = self.ids.next();
        self.loading = Some(op);
        self.load_error = None;
        Command::RunAsync {
            op,
            slot: Slot::Load,
            operation: Operation::ListLinks,
            timeout: self.settings.request_timeout,
        }
    }

    /// Applies the result of the tracked load. Other messages are ignored.
    fn on_load(&mut self, outcome: Outcome) {
        self.loading = None;
        match outcome {
            Outcome::Ok(Payload::Links(links)) => {
                let previous = self.current().map(|l| l.id);
                self.links = links;
                self.selected = previous
                    .and_then(|id| self.links.iter().position(|l| l.id == id))
                    .or_else(|| clamp_selection(self.selected, self.links.len()));
                self.drop_vanished_target();
            }
            Outcome::Ok(_) => {
                self.load_error = Some("Unexpected reply while loading links.".to_string());
            }
            Outcome::Err(e) => {
                self.load_error = Some(format!(
                    "Failed to load links: {}",
                    e.user_message_with_hint("Press r to retry.")
                ));
            }
            Outcome::Cancelled => {}
        }
    }

    /// Leaves a step whose link disappeared from the reloaded list, unless
    /// an operation on it is still in flight and will report for itself.
    fn drop_vanished_target(&mut self) {
        let idle = match &self.step {
            Step::ActionMenu { .. } | Step::ViewDetails { .. } => true,
            Step::DeleteConfirm { pending, .. } => pending.is_none(),
            _ => false,
        };
        if let Some(target) = self.target().filter(|_| idle) {
            if self.link(target).is_none() {
                self.error = Some(VANISHED.to_string());
                self.step = Step::ListLinks;
            }
        }
    }

    fn on_list(&mut self, key: Key) -> Command {
        let len = self.links.len();
        match key {
            Key::Up | Key::Char('k') => {
                self.selected = self.selected.map(|i| i.saturating_sub(1));
            }
            Key::Down | Key::Char('j') => {
                self.selected = self.selected.map(|i| (i + 1).min(len.saturating_sub(1)));
            }
            Key::Enter => {
                if let Some(link) = self.current() {
                    let target = link.id;
                    self.error = None;
                    self.step = Step::ActionMenu { target };
                }
            }
            Key::Char('r') => return self.reload(),
            Key::Esc => return Command::ReturnToMenu,
            _ => {}
        }
        Command::None
    }

    fn on_action(&mut self, target: LinkId, key: Key) -> Command {
        if self.link(target).is_none() {
            self.error = Some(VANISHED.to_string());
            self.step = Step::ListLinks;
            return Command::None;
        }
        match key {
            Key::Char('1') | Key::Char('v') => {
                self.error = None;
                self.step = Step::ViewDetails { target };
            }
            Key::Char('2') | Key::Char('d') => {
                self.error = None;
                self.step = Step::DeleteConfirm {
                    target,
                    input: TextInput::new(),
                    pending: None,
                };
                return Command::FocusInput;
            }
            Key::Char('3') | Key::Char('s') => {
                self.error = None;
                let op = self.ids.next();
                self.step = Step::Enriching {
                    target,
                    op,
                    stage: Stage::Idle,
                    text: "Starting...".to_string(),
                };
                return Command::RunAsync {
                    op,
                    slot: Slot::Mutate,
                    operation: Operation::EnrichLink {
                        id: target,
                        options: ScrapeOptions {
                            enabled: true,
                            timeout_seconds: self.settings.scrape_timeout.as_secs(),
                            only_fill_empty: true,
                        },
                    },
                    timeout: self.settings.scrape_timeout + self.settings.request_timeout,
                };
            }
            Key::Esc | Key::Char('b') => {
                self.error = None;
                self.step = Step::ListLinks;
            }
            _ => {}
        }
        Command::None
    }

    fn on_delete_confirm(&mut self, msg: Message) -> Command {
        let Step::DeleteConfirm {
            target,
            input,
            pending,
        } = &mut self.step
        else {
            return Command::None;
        };
        let target = *target;
        match (*pending, msg) {
            (Some(op), Message::Key(Key::Esc)) => {
                self.error = Some("Delete cancelled.".to_string());
                self.step = Step::ActionMenu { target };
                Command::Cancel(op)
            }
            (Some(op), Message::AsyncResult { op: id, outcome }) if id == op => match outcome {
                Outcome::Ok(_) => self.mutated("Link deleted.".to_string()),
                Outcome::Err(e) => {
                    self.error = Some(format!(
                        "Failed to delete link: {}",
                        e.user_message_with_hint("Press 2 to try again.")
                    ));
                    self.step = Step::ActionMenu { target };
                    Command::None
                }
                Outcome::Cancelled => {
                    self.step = Step::ActionMenu { target };
                    Command::None
                }
            },
            (Some(_), _) => Command::None,
            (None, Message::Key(Key::Esc)) => {
                self.step = Step::ActionMenu { target };
                Command::None
            }
            (None, Message::Key(Key::Enter)) => {
                if !confirmed(input.value()) {
                    self.step = Step::ActionMenu { target };
                    return Command::None;
                }
                if self.link(target).is_none() {
                    self.error = Some(VANISHED.to_string());
                    self.step = Step::ListLinks;
                    return Command::None;
                }
                let op = self.ids.next();
                if let Step::DeleteConfirm { pending, .. } = &mut self.step {
                    *pending = Some(op);
                }
                Command::RunAsync {
                    op,
                    slot: Slot::Mutate,
                    operation: Operation::DeleteLink(target),
                    timeout: self.settings.request_timeout,
                }
            }
            (None, Message::Key(key)) => {
                input.handle(key);
                Command::None
            }
            (None, _) => Command::None,
        }
    }

    fn on_enriching(&mut self, target: LinkId, op: OpId, msg: Message) -> Command {
        match msg {
            Message::Key(Key::Esc) => {
                self.error = Some("Enrichment cancelled.".to_string());
                self.step = Step::ActionMenu { target };
                Command::Cancel(op)
            }
            Message::AsyncProgress {
                op: id,
                stage: new_stage,
                text: new_text,
            } if id == op => {
                if let Step::Enriching { stage, text, .. } = &mut self.step {
                    *stage = new_stage;
                    *text = new_text;
                }
                Command::None
            }
            Message::AsyncResult { op: id, outcome } if id == op => match outcome {
                Outcome::Ok(Payload::Link(link)) => {
                    let mut notice = vec!["Link enriched.".to_string(), String::new()];
                    notice.push(render::field("URL", Some(link.url.as_str())));
                    notice.push(render::field("Title", link.title.as_deref()));
                    notice.push(render::field(
                        "Text",
                        link.text
                            .as_deref()
                            .map(|t| render::truncate(t, 200))
                            .as_deref(),
                    ));
                    self.mutated(notice.join("\n"))
                }
                Outcome::Ok(_) => self.mutated("Link enriched.".to_string()),
                Outcome::Err(e) => {
                    self.error = Some(format!(
                        "Failed to enrich link: {}",
                        e.user_message_with_hint("Press 3 to try again.")
                    ));
                    self.step = Step::ActionMenu { target };
                    Command::None
                }
                Outcome::Cancelled => {
                    self.step = Step::ActionMenu { target };
                    Command::None
                }
            },
            _ => Command::None,
        }
    }

    /// A mutation went through: show the notice and refresh the cache.
    fn mutated(&mut self, notice: String) -> Command {
        self.error = None;
        self.step = Step::Done { notice };
        self.reload()
    }

    fn view_list(&self, ctx: &ViewCtx, lines: &mut Vec<String>) {
        lines.push(format!("Links ({})", self.links.len()));
        let status = if self.loading.is_some() {
            format!("{} Loading links...", render::spinner(ctx.tick))
        } else if let Some(e) = &self.load_error {
            render::truncate(e, ctx.width as usize)
        } else {
            String::new()
        };
        lines.push(status);
        if self.links.is_empty() && self.loading.is_none() && self.load_error.is_none() {
            lines.push("No links yet. Add one from the menu.".to_string());
            return;
        }
        let width = ctx.width as usize;
        for (i, link) in self.links.iter().enumerate() {
            let marker = if Some(i) == self.selected { "→" } else { " " };
            let title = link
                .title
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(&link.url);
            lines.push(render::truncate(&format!("{marker} {title}"), width));
            lines.push(render::truncate(
                &format!("    {} • {}", link.url, link.created_at.format("%Y-%m-%d")),
                width,
            ));
        }
    }

    fn view_details(&self, link: &Link, ctx: &ViewCtx, lines: &mut Vec<String>) {
        lines.push(render::field("ID", Some(link.id.to_string().as_str())));
        lines.push(render::field(
            "User",
            link.user_id.map(|u| u.to_string()).as_deref(),
        ));
        lines.push(render::field("URL", Some(link.url.as_str())));
        lines.push(render::field("Title", link.title.as_deref()));
        lines.push(format!(
            "Created: {}",
            link.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        lines.push(render::field("Description", link.description.as_deref()));
        lines.push(String::new());
        match link.text.as_deref().filter(|t| !t.trim().is_empty()) {
            Some(text) => {
                lines.push("Text:".to_string());
                let preview = render::truncate(text, TEXT_PREVIEW);
                lines.extend(
                    render::wrap(&preview, (ctx.width as usize).saturating_sub(2))
                        .into_iter()
                        .map(|l| format!("  {l}")),
                );
            }
            None => lines.push("Text: -".to_string()),
        }
        lines.push(String::new());
        lines.push(format!(
            "Updated: {}",
            link.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
}

impl Flow for ManageLinksFlow {
    fn init(&mut self) -> Command {
        self.reload()
    }

    fn update(&mut self, msg: Message) -> Command {
        if let Message::AsyncResult { op, outcome } = &msg {
            if Some(*op) == self.loading {
                self.on_load(outcome.clone());
                return Command::None;
            }
        }
        match self.step.clone() {
            Step::ListLinks => match msg {
                Message::Key(key) => self.on_list(key),
                _ => Command::None,
            },
            Step::ActionMenu { target } => match msg {
                Message::Key(key) => self.on_action(target, key),
                _ => Command::None,
            },
            Step::ViewDetails { target } => match msg {
                Message::Key(Key::Esc | Key::Char('b') | Key::Enter) => {
                    self.step = Step::ActionMenu { target };
                    Command::None
                }
                _ => Command::None,
            },
            Step::DeleteConfirm { .. } => self.on_delete_confirm(msg),
            Step::Enriching { target, op, .. } => self.on_enriching(target, op, msg),
            Step::Done { .. } => match msg {
                Message::Key(_) => {
                    self.step = Step::ListLinks;
                    Command::None
                }
                _ => Command::None,
            },
        }
    }

    fn view(&self, ctx: &ViewCtx) -> String {
        let mut lines = Vec::new();
        match &self.step {
            Step::ListLinks => self.view_list(ctx, &mut lines),
            Step::ActionMenu { target } => {
                if let Some(link) = self.link(*target) {
                    lines.push(render::truncate(
                        &format!("Selected: {}", link.url),
                        ctx.width as usize,
                    ));
                    lines.push(String::new());
                }
                lines.push("1. View details".to_string());
                lines.push("2. Delete".to_string());
                lines.push("3. Scrape and fill empty fields".to_string());
                lines.push(String::new());
                lines.push("Esc: back to the list".to_string());
            }
            Step::ViewDetails { target } => match self.link(*target) {
                Some(link) => self.view_details(link, ctx, &mut lines),
                None => lines.push("The link is no longer available.".to_string()),
            },
            Step::DeleteConfirm {
                target,
                input,
                pending,
            } => {
                if let Some(link) = self.link(*target) {
                    lines.push(render::truncate(
                        &format!("Delete {}?", link.url),
                        ctx.width as usize,
                    ));
                    lines.push(String::new());
                }
                if pending.is_some() {
                    lines.push(format!("{} Deleting...", render::spinner(ctx.tick)));
                } else {
                    lines.push(format!(
                        "Type 'yes' to confirm: {}",
                        input.render(ctx.cursor)
                    ));
                }
            }
            Step::Enriching {
                target,
                stage,
                text,
                ..
            } => {
                if let Some(link) = self.link(*target) {
                    lines.push(render::truncate(
                        &format!("Scraping {}", link.url),
                        ctx.width as usize,
                    ));
                    lines.push(String::new());
                }
                lines.push(format!(
                    "{} {}: {text}",
                    render::spinner(ctx.tick),
                    stage.label()
                ));
                lines.push(String::new());
                lines.push("Esc: stop".to_string());
            }
            Step::Done { notice } => {
                lines.extend(notice.lines().map(str::to_string));
                lines.push(String::new());
                lines.push("Press any key to return to the list".to_string());
            }
        }
        if let Some(error) = &self.error {
            lines.push(String::new());
            lines.extend(render::wrap(&format!("✗ {error}"), ctx.width as usize));
        }
        lines.join("\n")
    }

    fn selection(&self) -> Option<Selection> {
        match self.step {
            Step::ListLinks => self.selected.map(|index| Selection {
                index,
                item_height: ITEM_HEIGHT,
                header_rows: HEADER_ROWS,
            }),
            _ => None,
        }
    }

    fn captures_text(&self) -> bool {
        matches!(self.step, Step::DeleteConfirm { pending: None, .. })
    }

    fn title(&self) -> String {
        let step = match self.step {
            Step::ListLinks => "Links",
            Step::ActionMenu { .. } => "Actions",
            Step::ViewDetails { .. } => "Details",
            Step::DeleteConfirm { .. } => "Delete",
            Step::Enriching { .. } => "Scraping",
            Step::Done { .. } => "Done",
        };
        format!("Manage links › {step}")
    }

    fn help(&self) -> &'static [(&'static str, &'static str)] {
        match self.step {
            Step::ListLinks => LIST_HELP,
            Step::ActionMenu { .. } => ACTION_HELP,
            Step::ViewDetails { .. } => DETAILS_HELP,
            Step::DeleteConfirm { .. } => DELETE_HELP,
            Step::Enriching { .. } => ENRICH_HELP,
            Step::Done { .. } => DONE_HELP,
        }
    }
}
