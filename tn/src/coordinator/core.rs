//! Main Coordinator task implementation

use std::sync::Arc;

use eyre::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tempstore::TemperatureStore;
use tokio::sync::{RwLock, mpsc};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info, warn};

use super::control;
use super::responses::ResponseHandler;
use super::roster::Roster;
use super::state::{NetworkState, SharedState};
use crate::channel::{self, MessageReceiver};
use crate::config::NetworkConfig;
use crate::display::StatusDisplay;
use crate::domain::{WorkerStatus, WorkerTemperatureList};
use crate::error::{NetworkError, NetworkResult};
use crate::protocol::Message;
use crate::worker::{Worker, WorkerReport, worker_rng};

/// Summary returned once the network has shut down
#[derive(Debug, Clone)]
pub struct ShutdownReport {
    /// Final report of every worker that finished cleanly, in id order
    pub workers: Vec<WorkerReport>,
    pub statuses: Vec<WorkerStatus>,
    pub temperatures: WorkerTemperatureList,
    /// Control ticks that ran to completion
    pub ticks: u64,
    /// Messages handled by the response loop
    pub responses_handled: u64,
}

/// The Coordinator owns the workers and drives the control loop
pub struct Coordinator {
    config: NetworkConfig,
    state: SharedState,
    roster: Roster,
    workers: Vec<Worker>,
    responses: Option<MessageReceiver>,
    display: Arc<dyn StatusDisplay>,
    store: Option<Arc<dyn TemperatureStore>>,
    rng: StdRng,
}

impl Coordinator {
    /// Build the network: one inbound channel per worker, one shared
    /// response channel
    pub fn new(
        config: NetworkConfig,
        display: Arc<dyn StatusDisplay>,
        store: Option<Arc<dyn TemperatureStore>>,
    ) -> NetworkResult<Self> {
        debug!(?config, "Coordinator::new: called");
        config.validate()?;

        let (outbound, responses) = channel::outbound();
        let mut senders = Vec::with_capacity(config.number_of_workers);
        let mut workers = Vec::with_capacity(config.number_of_workers);
        for id in 0..config.number_of_workers {
            let (tx, rx) = channel::inbound(id, config.inbound_capacity);
            senders.push(tx);
            workers.push(Worker::new(
                id,
                config.clone(),
                rx,
                outbound.clone(),
                worker_rng(config.seed, id),
            ));
        }
        // Workers hold the only response senders, so the response loop ends
        // when the last worker does
        drop(outbound);

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            state: Arc::new(RwLock::new(NetworkState::initial(
                config.number_of_workers,
                config.starting_temperature,
            ))),
            roster: Roster::new(senders),
            workers,
            responses: Some(responses),
            display,
            store,
            rng,
            config,
        })
    }

    /// Shared view of the coordinator state
    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    /// Run the network until shutdown is signalled
    ///
    /// Consumes the Coordinator. Returns only after every worker and the
    /// response loop have drained and exited.
    pub async fn run(mut self, mut shutdown_rx: mpsc::Receiver<()>) -> Result<ShutdownReport> {
        let responses = self
            .responses
            .take()
            .ok_or_else(|| eyre::eyre!("Response channel already taken"))?;
        let worker_handles: Vec<JoinHandle<WorkerReport>> = std::mem::take(&mut self.workers)
            .into_iter()
            .map(|worker| tokio::spawn(worker.run()))
            .collect();

        let handler = ResponseHandler::new(
            self.state.clone(),
            self.roster.clone(),
            self.display.clone(),
            self.store.clone(),
        );
        let mut response_handle = tokio::spawn(handler.run(responses));

        info!(workers = worker_handles.len(), "Coordinator started");

        let period = self.config.coordinator_tick();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks: u64 = 0;
        let mut response_exit = None;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.control_tick(ticks, &mut shutdown_rx).await {
                        Ok(()) => ticks += 1,
                        Err(NetworkError::CancellationRequested) => {
                            info!("Shutdown requested during control tick");
                            break;
                        }
                        Err(e) => warn!(error = %e, "Control tick failed"),
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown requested");
                    break;
                }
                // Workers are still connected, so any exit here is a failure
                result = &mut response_handle => {
                    error!("Response loop exited early, shutting down");
                    response_exit = Some(result);
                    break;
                }
            }
        }

        self.shutdown(ticks, worker_handles, response_handle, response_exit).await
    }

    /// One pass of the control loop
    async fn control_tick(&mut self, tick: u64, shutdown_rx: &mut mpsc::Receiver<()>) -> NetworkResult<()> {
        let request = Message::DataRequest {
            data: format!("tick {}", tick),
        };
        for sender in self.roster.all().await {
            Self::deliver(&sender, &request, shutdown_rx).await?;
        }

        let (statuses, average) = {
            let state = self.state.read().await;
            (state.statuses.clone(), state.temperatures.average_temperature()?)
        };
        debug!(tick, average, "control_tick: average temperature");

        for command in control::decide(&statuses, average, &self.config, &mut self.rng) {
            let Message::Control { worker_id, .. } = command else {
                continue;
            };
            match self.roster.get(worker_id).await {
                Some(sender) => Self::deliver(&sender, &command, shutdown_rx).await?,
                None => debug!(worker_id, "control_tick: no sender"),
            }
        }
        Ok(())
    }

    /// Send to one worker; a closed channel is logged, cancellation propagates
    async fn deliver(
        sender: &channel::InboundSender,
        message: &Message,
        shutdown_rx: &mut mpsc::Receiver<()>,
    ) -> NetworkResult<()> {
        match sender.send_or_cancel(message, shutdown_rx).await {
            Err(NetworkError::CancellationRequested) => Err(NetworkError::CancellationRequested),
            Err(e) => {
                warn!(worker_id = sender.worker_id(), kind = %message.kind(), error = %e, "Send failed");
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    async fn shutdown(
        self,
        ticks: u64,
        worker_handles: Vec<JoinHandle<WorkerReport>>,
        response_handle: JoinHandle<u64>,
        response_exit: Option<Result<u64, JoinError>>,
    ) -> Result<ShutdownReport> {
        info!(ticks, "Coordinator shutting down");

        let active: Vec<_> = {
            let state = self.state.read().await;
            state.statuses.iter().filter(|s| s.active).map(|s| s.id).collect()
        };
        for id in active {
            if let Some(sender) = self.roster.get(id).await
                && let Err(e) = sender.try_send(&Message::control(id, false))
            {
                debug!(worker_id = id, error = %e, "shutdown: deactivation skipped");
            }
        }

        self.roster.close_all().await;

        let mut workers = Vec::with_capacity(worker_handles.len());
        for handle in worker_handles {
            match handle.await {
                Ok(report) => workers.push(report),
                Err(e) => error!(error = %e, "Worker task failed"),
            }
        }

        let response_result = match response_exit {
            Some(result) => result,
            None => response_handle.await,
        };
        let responses_handled = match response_result {
            Ok(handled) => handled,
            Err(e) => {
                error!(error = %e, "Response loop failed");
                0
            }
        };

        let state = self.state.read().await;
        info!(workers = workers.len(), responses_handled, "Coordinator stopped");
        Ok(ShutdownReport {
            workers,
            statuses: state.statuses.clone(),
            temperatures: state.temperatures.clone(),
            ticks,
            responses_handled,
        })
    }
}
