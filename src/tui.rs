//! The interactive flow engine.
//!
//! Terminal input, timer ticks and background operation reports all become
//! [`Message`]s processed one at a time by the [`Runtime`]. Flows answer with
//! [`Command`]s; anything asynchronous is handed to the [`Runner`], whose
//! results re-enter the same queue.

pub mod command;
pub mod flow;
pub mod flows;
pub mod input;
pub mod message;
pub mod render;
pub mod root;
pub mod runner;
pub mod viewport;

pub use command::{Command, FlowKind, Operation, Slot};
pub use flow::{Flow, Selection, Settings, ViewCtx};
pub use message::{Key, Message, OpId, Outcome, Payload, Stage};
pub use root::Runtime;
pub use runner::Runner;
pub use viewport::Viewport;
