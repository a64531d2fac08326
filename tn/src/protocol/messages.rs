//! Message types exchanged between the coordinator and workers

use std::fmt;

use crate::domain::{WorkerId, WorkerStatus};

/// Discriminant identifying a message variant on the wire
///
/// The numeric codes are part of the wire format and must never be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    DataRequest = 0,
    Control = 1,
    DataResponse = 2,
    StatusUpdateResponse = 3,
    StatusUpdate = 4,
    OverheatTakeover = 5,
}

impl MessageKind {
    pub const ALL: [MessageKind; 6] = [
        MessageKind::DataRequest,
        MessageKind::Control,
        MessageKind::DataResponse,
        MessageKind::StatusUpdateResponse,
        MessageKind::StatusUpdate,
        MessageKind::OverheatTakeover,
    ];

    /// Wire code for this kind
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Look up a kind by wire code
    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|k| u64::from(k.code()) == code)
    }

    /// Stable name used in logs
    pub fn name(self) -> &'static str {
        match self {
            MessageKind::DataRequest => "data-request",
            MessageKind::Control => "control",
            MessageKind::DataResponse => "data-response",
            MessageKind::StatusUpdateResponse => "status-update-response",
            MessageKind::StatusUpdate => "status-update",
            MessageKind::OverheatTakeover => "overheat-takeover",
        }
    }

    /// Whether this kind travels worker -> coordinator
    pub fn is_coordinator_bound(self) -> bool {
        matches!(
            self,
            MessageKind::DataResponse | MessageKind::StatusUpdateResponse | MessageKind::OverheatTakeover
        )
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A protocol message
///
/// Messages are plain values: built at the send site, encoded onto a channel,
/// decoded once at the receive site and dropped after handling.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Coordinator asks a worker for its current temperature
    DataRequest { data: String },

    /// Coordinator switches a worker on or off
    Control { worker_id: WorkerId, activate: bool },

    /// Worker reports its temperature
    DataResponse { worker_id: WorkerId, temperature: f64 },

    /// Worker acknowledges a control command with its new state
    StatusUpdateResponse { worker_id: WorkerId, active: bool },

    /// Coordinator broadcasts the full status list
    StatusUpdate { worker_status_list: Vec<WorkerStatus> },

    /// Overheated worker asks to hand its load to an inactive peer
    OverheatTakeover {
        worker_to_deactivate: WorkerId,
        worker_to_activate: WorkerId,
    },
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::DataRequest { .. } => MessageKind::DataRequest,
            Message::Control { .. } => MessageKind::Control,
            Message::DataResponse { .. } => MessageKind::DataResponse,
            Message::StatusUpdateResponse { .. } => MessageKind::StatusUpdateResponse,
            Message::StatusUpdate { .. } => MessageKind::StatusUpdate,
            Message::OverheatTakeover { .. } => MessageKind::OverheatTakeover,
        }
    }

    pub fn control(worker_id: WorkerId, activate: bool) -> Self {
        Message::Control { worker_id, activate }
    }
}
