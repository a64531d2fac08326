//! Errors raised by the coordination engine

use thiserror::Error;

use crate::domain::WorkerId;
use crate::protocol::ProtocolError;

/// Errors from the worker network
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("Channel closed")]
    ChannelClosed,

    #[error("Inbound channel for worker {worker_id} is full")]
    ChannelFull { worker_id: WorkerId },

    #[error("Cancellation requested")]
    CancellationRequested,

    #[error("Unknown worker id {id} (network has {workers} workers)")]
    UnknownWorkerId { id: WorkerId, workers: usize },

    #[error("Temperature list is empty")]
    EmptyTemperatureList,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias for network operations
pub type NetworkResult<T> = Result<T, NetworkError>;
