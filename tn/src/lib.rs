//! TempNet - simulated temperature-control worker network
//!
//! A coordinator drives a fixed set of simulated workers. Each worker heats
//! while active and cools while inactive; the coordinator polls temperatures,
//! switches workers on and off to keep the average inside a band, and honours
//! overheat takeover requests from workers that hit the ceiling.
//!
//! # Modules
//!
//! - [`protocol`] - message variants and the JSON frame codec
//! - [`channel`] - typed channels carrying encoded frames
//! - [`worker`] - the worker task and its state machine
//! - [`coordinator`] - control loop, response loop and shutdown
//! - [`display`] - status table output
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod channel;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod display;
pub mod domain;
pub mod error;
pub mod protocol;
pub mod worker;

// Re-export commonly used types
pub use config::{Config, DisplayConfig, NetworkConfig, StoreConfig};
pub use coordinator::{Coordinator, ShutdownReport};
pub use display::{ConsoleDisplay, NullDisplay, StatusDisplay};
pub use domain::{WorkerId, WorkerStatus, WorkerTemperature, WorkerTemperatureList};
pub use error::{NetworkError, NetworkResult};
pub use protocol::{Message, MessageKind, ProtocolError, decode, encode};
pub use worker::{Worker, WorkerReport};
