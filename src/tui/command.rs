use std::time::Duration;

use super::message::OpId;
use crate::api::links::{LinkCreate, LinkId, ScrapeOptions};

/// Logical lane of background work. At most one operation per slot is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Load,
    Scrape,
    Save,
    Mutate,
}

/// The effect a background operation performs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ListLinks,
    CreateLink(LinkCreate),
    Scrape { url: String },
    EnrichLink { id: LinkId, options: ScrapeOptions },
    DeleteLink(LinkId),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ListLinks => "list links",
            Operation::CreateLink(_) => "create link",
            Operation::Scrape { .. } => "scrape",
            Operation::EnrichLink { .. } => "enrich link",
            Operation::DeleteLink(_) => "delete link",
        }
    }
}

/// Flows the runtime knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Menu,
    AddLink { scrape: bool },
    ManageLinks,
}

/// An effect requested by a flow, executed by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    None,
    Batch(Vec<Command>),
    RunAsync {
        op: OpId,
        slot: Slot,
        operation: Operation,
        timeout: Duration,
    },
    Cancel(OpId),
    Quit,
    FocusInput,
    /// Replace the active flow
    Switch(FlowKind),
    ReturnToMenu,
}

impl Command {
    /// Batches `cmds`, dropping `None`s and unwrapping a single survivor.
    pub fn batch(cmds: impl IntoIterator<Item = Command>) -> Command {
        let mut cmds: Vec<_> = cmds
            .into_iter()
            .filter(|c| !matches!(c, Command::None))
            .collect();
        match cmds.len() {
            0 => Command::None,
            1 => cmds.remove(0),
            _ => Command::Batch(cmds),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Command::None)
    }

    /// Flattens batches into the commands in execution order.
    pub fn flatten(self) -> Vec<Command> {
        match self {
            Command::None => Vec::new(),
            Command::Batch(cmds) => cmds.into_iter().flat_map(Command::flatten).collect(),
            other => vec![other],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_drops_nones() {
        assert_eq!(Command::batch([Command::None, Command::None]), Command::None);
        assert_eq!(
            Command::batch([Command::None, Command::Quit]),
            Command::Quit
        );
        assert_eq!(
            Command::batch([Command::FocusInput, Command::None, Command::Quit]),
            Command::Batch(vec![Command::FocusInput, Command::Quit])
        );
    }

    #[test]
    fn test_flatten_keeps_execution_order() {
        let op = OpId { flow: 1, seq: 1 };
        let cmd = Command::Batch(vec![
            Command::Cancel(op),
            Command::Batch(vec![Command::None, Command::ReturnToMenu]),
            Command::FocusInput,
        ]);
        assert_eq!(
            cmd.flatten(),
            vec![Command::Cancel(op), Command::ReturnToMenu, Command::FocusInput]
        );
        assert!(Command::None.flatten().is_empty());
    }
}
