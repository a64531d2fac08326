//! Coordinator: the single authority over the worker network
//!
//! The control loop runs inside [`Coordinator::run`]; a spawned
//! [`ResponseHandler`] folds worker replies into the shared state.

pub mod control;
mod core;
mod responses;
mod roster;
mod state;

pub use core::{Coordinator, ShutdownReport};
pub use responses::ResponseHandler;
pub use roster::Roster;
pub use state::{NetworkState, SharedState};
