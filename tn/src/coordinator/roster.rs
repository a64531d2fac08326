//! Shared list of worker inbound senders

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::channel::InboundSender;
use crate::domain::WorkerId;

/// Inbound senders indexed by worker id
///
/// Cloning shares the same list. Closing drops every sender, which closes
/// the worker channels once in-flight sends finish.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    senders: Arc<RwLock<Vec<InboundSender>>>,
}

impl Roster {
    pub fn new(senders: Vec<InboundSender>) -> Self {
        Self {
            senders: Arc::new(RwLock::new(senders)),
        }
    }

    /// Sender for one worker, if the roster is still open
    pub async fn get(&self, id: WorkerId) -> Option<InboundSender> {
        self.senders.read().await.iter().find(|s| s.worker_id() == id).cloned()
    }

    /// Every sender, in id order
    pub async fn all(&self) -> Vec<InboundSender> {
        self.senders.read().await.clone()
    }

    /// Drop every sender
    pub async fn close_all(&self) {
        let mut senders = self.senders.write().await;
        debug!(count = senders.len(), "Roster::close_all: closing inbound channels");
        senders.clear();
    }
}
