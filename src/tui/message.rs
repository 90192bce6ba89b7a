use std::{fmt::Display, time::Duration};

use crate::{
    api::links::{Link, LinkId},
    error::OpError,
    scraper::{ScrapeResult, ScrapeStage},
};

/// Terminal-independent key vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Ctrl(char),
    Enter,
    Esc,
    Tab,
    BackTab,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
}

/// Identity of a background operation.
///
/// `flow` is the generation of the flow instance that issued the operation,
/// `seq` grows monotonically within that instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId {
    pub flow: u64,
    pub seq: u64,
}

impl Display for OpId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.flow, self.seq)
    }
}

/// Hands out [`OpId`]s for one flow instance
#[derive(Debug, Clone)]
pub struct OpIds {
    flow: u64,
    next: u64,
}

impl OpIds {
    pub fn new(flow: u64) -> Self {
        Self { flow, next: 1 }
    }

    pub fn next(&mut self) -> OpId {
        let id = OpId {
            flow: self.flow,
            seq: self.next,
        };
        self.next += 1;
        id
    }
}

/// Lifecycle stage of a background operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Idle,
    HealthCheck,
    Fetching,
    Extracting,
    Done,
    Failed,
    Cancelled,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Idle => "Starting",
            Stage::HealthCheck => "Checking service",
            Stage::Fetching => "Fetching",
            Stage::Extracting => "Extracting",
            Stage::Done => "Done",
            Stage::Failed => "Failed",
            Stage::Cancelled => "Cancelled",
        }
    }
}

impl From<ScrapeStage> for Stage {
    fn from(stage: ScrapeStage) -> Self {
        match stage {
            ScrapeStage::HealthCheck => Stage::HealthCheck,
            ScrapeStage::Fetching => Stage::Fetching,
            ScrapeStage::Extracting => Stage::Extracting,
            ScrapeStage::Complete => Stage::Done,
        }
    }
}

/// Successful result of a background operation
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Links(Vec<Link>),
    Link(Link),
    Scraped {
        result: ScrapeResult,
        elapsed: Duration,
    },
    Deleted(LinkId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ok(Payload),
    Err(OpError),
    Cancelled,
}

/// Everything the active flow reacts to.
///
/// Produced by the terminal input reader, the tick timer and the operation
/// runner; consumed exactly once by the active flow.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Key(Key),
    Resize { width: u16, height: u16 },
    Tick,
    AsyncProgress { op: OpId, stage: Stage, text: String },
    AsyncResult { op: OpId, outcome: Outcome },
}

impl Message {
    /// The operation a message belongs to, if any
    pub fn op(&self) -> Option<OpId> {
        match self {
            Message::AsyncProgress { op, .. } | Message::AsyncResult { op, .. } => Some(*op),
            _ => None,
        }
    }
}
