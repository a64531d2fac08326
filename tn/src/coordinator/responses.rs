//! Response loop: folds worker messages into the coordinator state

use std::sync::Arc;

use tempstore::{TemperatureSample, TemperatureStore};
use tracing::{debug, info, warn};

use super::roster::Roster;
use super::state::SharedState;
use crate::channel::MessageReceiver;
use crate::display::StatusDisplay;
use crate::domain::WorkerId;
use crate::protocol::Message;

/// Handles every message arriving on the shared response channel
pub struct ResponseHandler {
    state: SharedState,
    roster: Roster,
    display: Arc<dyn StatusDisplay>,
    store: Option<Arc<dyn TemperatureStore>>,
}

impl ResponseHandler {
    pub fn new(
        state: SharedState,
        roster: Roster,
        display: Arc<dyn StatusDisplay>,
        store: Option<Arc<dyn TemperatureStore>>,
    ) -> Self {
        Self {
            state,
            roster,
            display,
            store,
        }
    }

    /// Consume the channel until every worker has hung up
    ///
    /// Returns the number of messages handled.
    pub async fn run(self, mut responses: MessageReceiver) -> u64 {
        info!("Response loop started");
        let mut handled = 0;
        let mut misrouted = 0;
        while let Some(message) = responses.recv().await {
            if !message.kind().is_coordinator_bound() {
                warn!(kind = %message.kind(), "Ignoring message not meant for the coordinator");
                misrouted += 1;
                continue;
            }
            self.handle(message).await;
            handled += 1;
        }
        info!(handled, misrouted, dropped = responses.dropped(), "Response loop stopped");
        handled
    }

    pub async fn handle(&self, message: Message) {
        match message {
            Message::DataResponse { worker_id, temperature } => {
                self.on_data_response(worker_id, temperature).await;
            }
            Message::StatusUpdateResponse { worker_id, active } => {
                self.on_status_update_response(worker_id, active).await;
            }
            Message::OverheatTakeover {
                worker_to_deactivate,
                worker_to_activate,
            } => {
                self.on_overheat_takeover(worker_to_deactivate, worker_to_activate).await;
            }
            other => {
                warn!(kind = %other.kind(), "Ignoring message not meant for the coordinator");
            }
        }
    }

    async fn on_data_response(&self, worker_id: WorkerId, temperature: f64) {
        if let Err(e) = self.state.write().await.set_temperature(worker_id, temperature) {
            warn!(error = %e, "Ignoring data response");
            return;
        }
        debug!(worker_id, temperature, "on_data_response: recorded");

        if let Some(store) = &self.store
            && let Err(e) = store.add_sample(TemperatureSample::now(worker_id, temperature)).await
        {
            warn!(worker_id, error = %e, "Failed to store temperature sample");
        }
    }

    async fn on_status_update_response(&self, worker_id: WorkerId, active: bool) {
        let (statuses, temperatures) = {
            let mut state = self.state.write().await;
            if let Err(e) = state.set_active(worker_id, active) {
                warn!(error = %e, "Ignoring status update response");
                return;
            }
            (state.statuses.clone(), state.temperatures.clone())
        };
        info!(worker_id, active, "Worker status changed");

        let update = Message::StatusUpdate {
            worker_status_list: statuses.clone(),
        };
        for sender in self.roster.all().await {
            if let Err(e) = sender.send(&update).await {
                debug!(worker_id = sender.worker_id(), error = %e, "Status broadcast skipped");
            }
        }

        self.display.display_worker_status(&statuses, &temperatures);
    }

    async fn on_overheat_takeover(&self, deactivate: WorkerId, activate: WorkerId) {
        {
            let state = self.state.read().await;
            if let Err(e) = state.check_id(deactivate).and_then(|_| state.check_id(activate)) {
                warn!(error = %e, "Ignoring overheat takeover");
                return;
            }
        }
        info!(deactivate, activate, "Overheat takeover");

        self.send_control(deactivate, false).await;
        self.send_control(activate, true).await;
    }

    async fn send_control(&self, worker_id: WorkerId, activate: bool) {
        match self.roster.get(worker_id).await {
            Some(sender) => {
                if let Err(e) = sender.send(&Message::control(worker_id, activate)).await {
                    warn!(worker_id, error = %e, "Failed to send control");
                }
            }
            None => debug!(worker_id, "send_control: roster closed, skipping"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{inbound, outbound};
    use crate::coordinator::state::NetworkState;
    use crate::domain::{WorkerStatus, WorkerTemperatureList};
    use std::sync::Mutex;
    use tempstore::MemoryStore;
    use tokio::sync::RwLock;

    #[derive(Default)]
    struct RecordingDisplay {
        calls: Mutex<Vec<Vec<WorkerStatus>>>,
    }

    impl StatusDisplay for RecordingDisplay {
        fn display_worker_status(&self, statuses: &[WorkerStatus], _temperatures: &WorkerTemperatureList) {
            self.calls.lock().unwrap().push(statuses.to_vec());
        }
    }

    struct Fixture {
        handler: ResponseHandler,
        state: SharedState,
        display: Arc<RecordingDisplay>,
        receivers: Vec<MessageReceiver>,
        store: Arc<MemoryStore>,
    }

    fn fixture(workers: usize) -> Fixture {
        let state: SharedState = Arc::new(RwLock::new(NetworkState::initial(workers, 20.0)));
        let (senders, receivers): (Vec<_>, Vec<_>) = (0..workers).map(|id| inbound(id, 16)).unzip();
        let display = Arc::new(RecordingDisplay::default());
        let store = Arc::new(MemoryStore::new());
        let handler = ResponseHandler::new(
            state.clone(),
            Roster::new(senders),
            display.clone(),
            Some(store.clone()),
        );
        Fixture {
            handler,
            state,
            display,
            receivers,
            store,
        }
    }

    #[tokio::test]
    async fn test_status_broadcast_reaches_every_worker_and_display() {
        let mut f = fixture(3);
        f.handler
            .handle(Message::StatusUpdateResponse {
                worker_id: 1,
                active: false,
            })
            .await;

        let expected = vec![
            WorkerStatus::new(0, true),
            WorkerStatus::new(1, false),
            WorkerStatus::new(2, true),
        ];
        for rx in f.receivers.iter_mut() {
            assert_eq!(
                rx.recv().await,
                Some(Message::StatusUpdate {
                    worker_status_list: expected.clone()
                })
            );
        }
        assert_eq!(*f.display.calls.lock().unwrap(), vec![expected.clone()]);
        assert_eq!(f.state.read().await.statuses, expected);
    }

    #[tokio::test]
    async fn test_data_response_updates_state_and_store() {
        let f = fixture(2);
        f.handler
            .handle(Message::DataResponse {
                worker_id: 1,
                temperature: 23.75,
            })
            .await;

        assert_eq!(f.state.read().await.temperatures.get(1), Some(23.75));
        let sample = f.store.get_by_worker_id(1).await.unwrap();
        assert_eq!(sample.temperature, 23.75);
        assert!(f.display.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overheat_takeover_sends_two_controls() {
        let mut f = fixture(3);
        f.handler
            .handle(Message::OverheatTakeover {
                worker_to_deactivate: 0,
                worker_to_activate: 2,
            })
            .await;

        assert_eq!(f.receivers[0].recv().await, Some(Message::control(0, false)));
        assert_eq!(f.receivers[2].recv().await, Some(Message::control(2, true)));

        drop(f.handler);
        assert_eq!(f.receivers[1].recv().await, None);
    }

    #[tokio::test]
    async fn test_unknown_worker_id_ignored() {
        let mut f = fixture(2);
        let before = f.state.read().await.clone();

        f.handler
            .handle(Message::DataResponse {
                worker_id: 5,
                temperature: 99.0,
            })
            .await;
        f.handler
            .handle(Message::StatusUpdateResponse {
                worker_id: 2,
                active: false,
            })
            .await;
        f.handler
            .handle(Message::OverheatTakeover {
                worker_to_deactivate: 0,
                worker_to_activate: 7,
            })
            .await;

        assert_eq!(*f.state.read().await, before);
        assert!(f.store.is_empty().await);
        assert!(f.display.calls.lock().unwrap().is_empty());

        drop(f.handler);
        for rx in f.receivers.iter_mut() {
            assert_eq!(rx.recv().await, None);
        }
    }

    #[tokio::test]
    async fn test_worker_bound_messages_ignored() {
        let f = fixture(1);
        let before = f.state.read().await.clone();
        f.handler.handle(Message::control(0, false)).await;
        f.handler
            .handle(Message::DataRequest {
                data: "x".to_string(),
            })
            .await;
        assert_eq!(*f.state.read().await, before);
    }

    #[tokio::test]
    async fn test_broadcast_skipped_after_roster_closed() {
        let mut f = fixture(2);
        f.handler.roster.close_all().await;
        f.handler
            .handle(Message::StatusUpdateResponse {
                worker_id: 0,
                active: false,
            })
            .await;

        assert!(!f.state.read().await.statuses[0].active);
        assert_eq!(f.display.calls.lock().unwrap().len(), 1);
        for rx in f.receivers.iter_mut() {
            assert_eq!(rx.recv().await, None);
        }
    }

    #[tokio::test]
    async fn test_run_counts_only_coordinator_bound_messages() {
        let f = fixture(2);
        let (tx, rx) = outbound();
        tx.send(&Message::DataRequest { data: "x".to_string() }).unwrap();
        tx.send(&Message::DataResponse {
            worker_id: 0,
            temperature: 18.5,
        })
        .unwrap();
        tx.send(&Message::control(1, false)).unwrap();
        drop(tx);

        assert_eq!(f.handler.run(rx).await, 1);
        assert_eq!(f.state.read().await.temperatures.get(0), Some(18.5));
        assert!(f.state.read().await.statuses[1].active);
    }
}
