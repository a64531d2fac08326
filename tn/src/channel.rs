//! Typed message channels
//!
//! Messages travel as encoded frames over tokio mpsc channels. Senders encode
//! on the way in, [`MessageReceiver`] decodes on the way out and drops frames
//! that fail to decode.
//!
//! Worker inbound channels are bounded. The shared response channel is
//! unbounded so a worker emitting a response never waits on the coordinator.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::domain::WorkerId;
use crate::error::{NetworkError, NetworkResult};
use crate::protocol::{Message, decode, encode};

type Frame = Vec<u8>;

/// Create a bounded inbound channel for one worker
pub fn inbound(worker_id: WorkerId, capacity: usize) -> (InboundSender, MessageReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        InboundSender { worker_id, tx },
        MessageReceiver {
            label: format!("worker-{}", worker_id),
            inner: ReceiverInner::Bounded(rx),
            dropped: 0,
        },
    )
}

/// Create the unbounded response channel shared by all workers
pub fn outbound() -> (OutboundSender, MessageReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        OutboundSender { tx },
        MessageReceiver {
            label: "responses".to_string(),
            inner: ReceiverInner::Unbounded(rx),
            dropped: 0,
        },
    )
}

/// Sending half of a worker's inbound channel
#[derive(Debug, Clone)]
pub struct InboundSender {
    worker_id: WorkerId,
    tx: mpsc::Sender<Frame>,
}

impl InboundSender {
    pub fn worker_id(&self) -> WorkerId {
        self.worker_id
    }

    /// Enqueue without waiting
    pub fn try_send(&self, message: &Message) -> NetworkResult<()> {
        let frame = encode(message)?;
        self.tx.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => NetworkError::ChannelFull {
                worker_id: self.worker_id,
            },
            TrySendError::Closed(_) => NetworkError::ChannelClosed,
        })
    }

    /// Enqueue, waiting for capacity if the channel is full
    pub async fn send(&self, message: &Message) -> NetworkResult<()> {
        let frame = encode(message)?;
        match self.tx.try_send(frame) {
            Ok(()) => Ok(()),
            Err(TrySendError::Closed(_)) => Err(NetworkError::ChannelClosed),
            Err(TrySendError::Full(frame)) => {
                debug!(worker_id = self.worker_id, kind = %message.kind(), "send: inbound full, waiting");
                self.tx.send(frame).await.map_err(|_| NetworkError::ChannelClosed)
            }
        }
    }

    /// Like [`send`](Self::send), but gives up when shutdown is signalled
    /// while waiting for capacity
    pub async fn send_or_cancel(&self, message: &Message, shutdown_rx: &mut mpsc::Receiver<()>) -> NetworkResult<()> {
        let frame = encode(message)?;
        match self.tx.try_send(frame) {
            Ok(()) => Ok(()),
            Err(TrySendError::Closed(_)) => Err(NetworkError::ChannelClosed),
            Err(TrySendError::Full(frame)) => {
                debug!(worker_id = self.worker_id, kind = %message.kind(), "send_or_cancel: inbound full, waiting");
                tokio::select! {
                    result = self.tx.send(frame) => result.map_err(|_| NetworkError::ChannelClosed),
                    _ = shutdown_rx.recv() => Err(NetworkError::CancellationRequested),
                }
            }
        }
    }
}

/// Sending half of the shared response channel
#[derive(Debug, Clone)]
pub struct OutboundSender {
    tx: mpsc::UnboundedSender<Frame>,
}

impl OutboundSender {
    pub fn send(&self, message: &Message) -> NetworkResult<()> {
        let frame = encode(message)?;
        self.tx.send(frame).map_err(|_| NetworkError::ChannelClosed)
    }
}

#[derive(Debug)]
enum ReceiverInner {
    Bounded(mpsc::Receiver<Frame>),
    Unbounded(mpsc::UnboundedReceiver<Frame>),
}

/// Receiving half of either channel kind
#[derive(Debug)]
pub struct MessageReceiver {
    label: String,
    inner: ReceiverInner,
    dropped: u64,
}

impl MessageReceiver {
    /// Receive the next well-formed message
    ///
    /// Malformed frames are logged and skipped. Returns `None` once every
    /// sender is gone and the buffer is drained.
    pub async fn recv(&mut self) -> Option<Message> {
        loop {
            let frame = match &mut self.inner {
                ReceiverInner::Bounded(rx) => rx.recv().await?,
                ReceiverInner::Unbounded(rx) => rx.recv().await?,
            };
            match decode(&frame) {
                Ok(message) => return Some(message),
                Err(e) => {
                    self.dropped += 1;
                    warn!(channel = %self.label, error = %e, "Dropping malformed frame");
                }
            }
        }
    }

    /// Number of malformed frames dropped so far
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
