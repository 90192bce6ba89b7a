//! The concrete screens of the application.

pub mod add_link;
pub mod manage_links;
pub mod menu;

pub use add_link::AddLinkFlow;
pub use manage_links::ManageLinksFlow;
pub use menu::MenuFlow;

use super::{
    command::FlowKind,
    flow::{Flow, Settings},
};

/// Builds a fresh flow of `kind` for the given generation.
pub fn build(kind: FlowKind, generation: u64, settings: Settings) -> Box<dyn Flow> {
    match kind {
        FlowKind::Menu => Box::new(MenuFlow::new()),
        FlowKind::AddLink { scrape } => Box::new(AddLinkFlow::new(generation, scrape, settings)),
        FlowKind::ManageLinks => Box::new(ManageLinksFlow::new(generation, settings)),
    }
}
