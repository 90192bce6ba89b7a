use std::time::Duration;

use crate::{
    api::links::{Link, LinkCreate},
    scraper::ScrapeResult,
    tui::{
        command::{Command, Operation, Slot},
        flow::{Flow, Settings, ViewCtx},
        input::TextInput,
        message::{Key, Message, OpId, OpIds, Outcome, Payload, Stage},
        render,
    },
};

#[cfg(test)]
mod tests;

const URL_HELP: &[(&str, &str)] = &[
    ("Enter", "continue"),
    ("Ctrl+S", "skip scraping"),
    ("Esc", "back to the menu"),
];
const SCRAPING_HELP: &[(&str, &str)] = &[("Esc", "stop scraping and fill in manually")];
const REVIEW_HELP: &[(&str, &str)] = &[
    ("Tab/Shift+Tab", "next/previous field"),
    ("Enter", "save the link"),
    ("Esc", "discard and go back to the menu"),
];
const SAVING_HELP: &[(&str, &str)] = &[("Esc", "stop waiting and keep editing")];
const SUCCESS_HELP: &[(&str, &str)] = &[("any key", "back to the menu")];

/// Inputs of the review form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Url,
    Title,
    Description,
    Text,
}

impl Field {
    const ALL: [Field; 4] = [Field::Url, Field::Title, Field::Description, Field::Text];

    fn index(self) -> usize {
        match self {
            Field::Url => 0,
            Field::Title => 1,
            Field::Description => 2,
            Field::Text => 3,
        }
    }

    pub fn next(self) -> Field {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Field {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn label(self) -> &'static str {
        match self {
            Field::Url => "URL",
            Field::Title => "Title",
            Field::Description => "Description",
            Field::Text => "Text",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    UrlInput,
    Scraping { op: OpId, stage: Stage, text: String },
    Review,
    Saving { op: OpId },
    Success { link: Link },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Fields {
    url: TextInput,
    title: TextInput,
    description: TextInput,
    text: TextInput,
}

impl Fields {
    fn get(&self, field: Field) -> &TextInput {
        match field {
            Field::Url => &self.url,
            Field::Title => &self.title,
            Field::Description => &self.description,
            Field::Text => &self.text,
        }
    }

    fn get_mut(&mut self, field: Field) -> &mut TextInput {
        match field {
            Field::Url => &mut self.url,
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
            Field::Text => &mut self.text,
        }
    }
}

fn validate_url(url: &str) -> Result<(), String> {
    let url = url.trim();
    if url.is_empty() {
        return Err("URL is required".to_string());
    }
    reqwest::Url::parse(url)
        .map(|_| ())
        .map_err(|e| format!("invalid URL: {e}"))
}

fn optional(input: &TextInput) -> Option<String> {
    Some(input.trimmed().to_string()).filter(|v| !v.is_empty())
}

/// Adds a link, optionally pre-filling title and text from a scrape.
///
/// Scrape results only fill fields that are still empty, and a failed or
/// cancelled scrape always ends in the review form so the link can be
/// completed by hand.
#[derive(Debug)]
pub struct AddLinkFlow {
    ids: OpIds,
    scrape: bool,
    settings: Settings,
    step: Step,
    fields: Fields,
    focus: Field,
    scraped_title: bool,
    scraped_text: bool,
    scrape_elapsed: Option<Duration>,
    /// Blocking problem with the input or the save
    error: Option<String>,
    /// Non-blocking notice, e.g. a failed scrape
    warning: Option<String>,
}

impl AddLinkFlow {
    pub fn new(generation: u64, scrape: bool, settings: Settings) -> Self {
        Self {
            ids: OpIds::new(generation),
            scrape,
            settings,
            step: Step::UrlInput,
            fields: Fields::default(),
            focus: Field::Url,
            scraped_title: false,
            scraped_text: false,
            scrape_elapsed: None,
            error: None,
            warning: None,
        }
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    pub fn focus(&self) -> Field {
        self.focus
    }

    pub fn value(&self, field: Field) -> &str {
        self.fields.get(field).value()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn is_scraped(&self, field: Field) -> bool {
        match field {
            Field::Title => self.scraped_title,
            Field::Text => self.scraped_text,
            _ => false,
        }
    }

    /// The create request built from the form: trimmed, empty optionals left
    /// out.
    pub fn payload(&self) -> LinkCreate {
        LinkCreate {
            url: self.fields.url.trimmed().to_string(),
            title: optional(&self.fields.title),
            description: optional(&self.fields.description),
            text: optional(&self.fields.text),
        }
    }

    fn to_review(&mut self) -> Command {
        self.step = Step::Review;
        self.focus = Field::Title;
        Command::FocusInput
    }

    /// Fills empty title and text from the scrape
    fn merge(&mut self, result: &ScrapeResult) {
        if self.fields.title.is_blank() && !result.title.trim().is_empty() {
            self.fields.title.set(result.title.trim());
            self.scraped_title = true;
        }
        if self.fields.text.is_blank() && !result.text.trim().is_empty() {
            self.fields.text.set(result.text.trim());
            self.scraped_text = true;
        }
    }

    fn on_url_input(&mut self, key: Key) -> Command {
        match key {
            Key::Esc => Command::ReturnToMenu,
            Key::Ctrl('s') => {
                self.error = None;
                self.to_review()
            }
            Key::Enter => {
                if let Err(e) = validate_url(self.fields.url.value()) {
                    self.error = Some(e);
                    return Command::None;
                }
                self.error = None;
                if !self.scrape {
                    return self.to_review();
                }
                let op = self.ids.next();
                self.step = Step::Scraping {
                    op,
                    stage: Stage::Idle,
                    text: "Starting scrape...".to_string(),
                };
                Command::RunAsync {
                    op,
                    slot: Slot::Scrape,
                    operation: Operation::Scrape {
                        url: self.fields.url.trimmed().to_string(),
                    },
                    timeout: self.settings.scrape_timeout,
                }
            }
            other => {
                if self.fields.url.handle(other) {
                    self.error = None;
                }
                Command::None
            }
        }
    }

    fn on_scraping(&mut self, op: OpId, msg: Message) -> Command {
        match msg {
            Message::Key(Key::Esc) => {
                self.warning =
                    Some("Scraping cancelled. Fill in the fields manually.".to_string());
                Command::batch([Command::Cancel(op), self.to_review()])
            }
            Message::AsyncProgress {
                op: id,
                stage: new_stage,
                text: new_text,
            } if id == op => {
                if let Step::Scraping { stage, text, .. } = &mut self.step {
                    *stage = new_stage;
                    *text = new_text;
                }
                Command::None
            }
            Message::AsyncResult { op: id, outcome } if id == op => {
                match outcome {
                    Outcome::Ok(Payload::Scraped { result, elapsed }) => {
                        self.merge(&result);
                        self.scrape_elapsed = Some(elapsed);
                        self.warning = None;
                    }
                    Outcome::Ok(_) => {
                        self.warning = Some(
                            "Scraping returned nothing usable (you can still fill fields manually)"
                                .to_string(),
                        );
                    }
                    Outcome::Err(e) => {
                        self.warning = Some(format!(
                            "Scraping failed: {} (you can still fill fields manually)",
                            e.user_message()
                        ));
                    }
                    Outcome::Cancelled => {
                        self.warning =
                            Some("Scraping cancelled. Fill in the fields manually.".to_string());
                    }
                }
                self.to_review()
            }
            _ => Command::None,
        }
    }

    fn on_review(&mut self, key: Key) -> Command {
        match key {
            Key::Esc => Command::ReturnToMenu,
            Key::Tab | Key::Down => {
                self.focus = self.focus.next();
                Command::None
            }
            Key::BackTab | Key::Up => {
                self.focus = self.focus.prev();
                Command::None
            }
            Key::Enter => {
                if let Err(e) = validate_url(self.fields.url.value()) {
                    self.error = Some(e);
                    self.focus = Field::Url;
                    return Command::None;
                }
                self.error = None;
                let op = self.ids.next();
                self.step = Step::Saving { op };
                Command::RunAsync {
                    op,
                    slot: Slot::Save,
                    operation: Operation::CreateLink(self.payload()),
                    timeout: self.settings.request_timeout,
                }
            }
            other => {
                let focus = self.focus;
                if self.fields.get_mut(focus).handle(other) {
                    match focus {
                        Field::Title => self.scraped_title = false,
                        Field::Text => self.scraped_text = false,
                        _ => {}
                    }
                }
                Command::None
            }
        }
    }

    fn on_saving(&mut self, op: OpId, msg: Message) -> Command {
        match msg {
            Message::Key(Key::Esc) => {
                self.error = Some("Save cancelled.".to_string());
                Command::batch([Command::Cancel(op), self.back_to_review()])
            }
            Message::AsyncResult { op: id, outcome } if id == op => match outcome {
                Outcome::Ok(Payload::Link(link)) => {
                    self.error = None;
                    self.step = Step::Success { link };
                    Command::None
                }
                Outcome::Ok(_) => {
                    self.error = Some("Unexpected reply while saving. Please try again.".into());
                    self.back_to_review()
                }
                Outcome::Err(e) => {
                    self.error = Some(format!(
                        "Failed to save link: {}",
                        e.user_message_with_hint("Press Enter to retry.")
                    ));
                    self.back_to_review()
                }
                Outcome::Cancelled => {
                    self.error = Some("Save cancelled.".to_string());
                    self.back_to_review()
                }
            },
            _ => Command::None,
        }
    }

    /// Returns to the form keeping the focused field
    fn back_to_review(&mut self) -> Command {
        self.step = Step::Review;
        Command::FocusInput
    }

    fn field_line(&self, field: Field, ctx: &ViewCtx) -> String {
        let focused = field == self.focus;
        let marker = if focused { "→" } else { " " };
        let value = self.fields.get(field).render(focused && ctx.cursor);
        let value = if value.is_empty() && !focused {
            "-".to_string()
        } else {
            render::truncate(&value, (ctx.width as usize).saturating_sub(30).max(20))
        };
        let scraped = if self.is_scraped(field) { " (scraped)" } else { "" };
        format!("{marker} {:<12} {value}{scraped}", format!("{}:", field.label()))
    }
}

impl Flow for AddLinkFlow {
    fn init(&mut self) -> Command {
        Command::FocusInput
    }

    fn update(&mut self, msg: Message) -> Command {
        match self.step.clone() {
            Step::UrlInput => match msg {
                Message::Key(key) => self.on_url_input(key),
                _ => Command::None,
            },
            Step::Scraping { op, .. } => self.on_scraping(op, msg),
            Step::Review => match msg {
                Message::Key(key) => self.on_review(key),
                _ => Command::None,
            },
            Step::Saving { op } => self.on_saving(op, msg),
            Step::Success { .. } => match msg {
                Message::Key(_) => Command::ReturnToMenu,
                _ => Command::None,
            },
        }
    }

    fn view(&self, ctx: &ViewCtx) -> String {
        let mut lines = Vec::new();
        match &self.step {
            Step::UrlInput => {
                lines.push("Enter the URL of the link to add:".to_string());
                lines.push(String::new());
                lines.push(format!("URL: {}", self.fields.url.render(ctx.cursor)));
                lines.push(String::new());
                if self.scrape {
                    lines.push("Enter: scrape the page  •  Ctrl+S: skip scraping".to_string());
                } else {
                    lines.push("Enter: continue".to_string());
                }
            }
            Step::Scraping { stage, text, .. } => {
                lines.push(format!("Scraping {}", self.fields.url.trimmed()));
                lines.push(String::new());
                lines.push(format!(
                    "{} {}: {text}",
                    render::spinner(ctx.tick),
                    stage.label()
                ));
                lines.push(String::new());
                lines.push("Esc: stop and fill in manually".to_string());
            }
            Step::Review | Step::Saving { .. } => {
                lines.push("Review the link before saving:".to_string());
                lines.push(String::new());
                for field in Field::ALL {
                    lines.push(self.field_line(field, ctx));
                }
                lines.push(String::new());
                if let Step::Saving { .. } = self.step {
                    lines.push(format!("{} Saving link...", render::spinner(ctx.tick)));
                } else {
                    lines.push("Tab: next field  •  Enter: save  •  Esc: cancel".to_string());
                }
            }
            Step::Success { link } => {
                lines.push("✓ Link saved".to_string());
                lines.push(String::new());
                lines.push(render::field("ID", Some(link.id.to_string().as_str())));
                lines.push(render::field("URL", Some(link.url.as_str())));
                lines.push(render::field("Title", link.title.as_deref()));
                lines.push(render::field("Description", link.description.as_deref()));
                if let Some(elapsed) = self.scrape_elapsed {
                    lines.push(format!("Scraped in {:.1}s", elapsed.as_secs_f64()));
                }
                lines.push(String::new());
                lines.push("Press any key to return to the menu".to_string());
            }
        }
        if let Some(warning) = &self.warning {
            if !matches!(self.step, Step::Success { .. }) {
                lines.push(String::new());
                lines.extend(render::wrap(&format!("⚠ {warning}"), ctx.width as usize));
            }
        }
        if let Some(error) = &self.error {
            lines.push(String::new());
            lines.extend(render::wrap(&format!("✗ {error}"), ctx.width as usize));
        }
        lines.join("\n")
    }

    fn captures_text(&self) -> bool {
        matches!(self.step, Step::UrlInput | Step::Review)
    }

    fn title(&self) -> String {
        let mode = if self.scrape { "with scraping" } else { "basic" };
        let step = match self.step {
            Step::UrlInput => "URL",
            Step::Scraping { .. } => "Scraping",
            Step::Review => "Review",
            Step::Saving { .. } => "Saving",
            Step::Success { .. } => "Done",
        };
        format!("Add link ({mode}) › {step}")
    }

    fn help(&self) -> &'static [(&'static str, &'static str)] {
        match self.step {
            Step::UrlInput => URL_HELP,
            Step::Scraping { .. } => SCRAPING_HELP,
            Step::Review => REVIEW_HELP,
            Step::Saving { .. } => SAVING_HELP,
            Step::Success { .. } => SUCCESS_HELP,
        }
    }
}
