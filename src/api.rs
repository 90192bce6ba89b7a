//! Clients for the external services the application talks to.
//!
//! Each client sits on top of the networking actor and exposes typed,
//! domain-specific calls.

pub mod links;

pub use links::LinkApi;
