//! Worker task

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use super::state::WorkerState;
use crate::channel::{MessageReceiver, OutboundSender};
use crate::config::NetworkConfig;
use crate::domain::WorkerId;
use crate::protocol::Message;

/// Final state of a worker after its task ends
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerReport {
    pub id: WorkerId,
    pub active: bool,
    pub temperature: f64,
    pub messages_processed: u64,
    pub takeovers_signalled: u64,
}

/// Random source for one worker
///
/// With a seed every worker gets its own deterministic stream.
pub fn worker_rng(seed: Option<u64>, id: WorkerId) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(id as u64 + 1)),
        None => StdRng::from_os_rng(),
    }
}

/// A simulated worker
///
/// Owns its state outright. The temperature tick and the inbound channel are
/// serviced from one `select!` loop, so no lock is needed.
pub struct Worker {
    state: WorkerState,
    config: NetworkConfig,
    inbound: MessageReceiver,
    outbound: OutboundSender,
    rng: StdRng,
    messages_processed: u64,
    takeovers_signalled: u64,
}

impl Worker {
    pub fn new(
        id: WorkerId,
        config: NetworkConfig,
        inbound: MessageReceiver,
        outbound: OutboundSender,
        rng: StdRng,
    ) -> Self {
        debug!(id, "Worker::new: called");
        Self {
            state: WorkerState::new(id, config.starting_temperature),
            config,
            inbound,
            outbound,
            rng,
            messages_processed: 0,
            takeovers_signalled: 0,
        }
    }

    pub fn id(&self) -> WorkerId {
        self.state.id()
    }

    /// Run until the inbound channel is closed and drained
    pub async fn run(mut self) -> WorkerReport {
        let period = self.config.worker_tick();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(id = self.id(), "Worker started");

        loop {
            tokio::select! {
                message = self.inbound.recv() => {
                    match message {
                        Some(message) => self.handle(message),
                        None => break,
                    }
                }
                _ = ticker.tick() => self.tick(),
            }
        }

        let report = WorkerReport {
            id: self.state.id(),
            active: self.state.is_active(),
            temperature: self.state.temperature(),
            messages_processed: self.messages_processed,
            takeovers_signalled: self.takeovers_signalled,
        };
        info!(
            id = report.id,
            active = report.active,
            temperature = report.temperature,
            messages = report.messages_processed,
            takeovers = report.takeovers_signalled,
            "Worker stopped"
        );
        report
    }

    fn handle(&mut self, message: Message) {
        self.messages_processed += 1;
        if let Some(reply) = self.state.handle_message(message) {
            self.emit(&reply);
        }
    }

    fn tick(&mut self) {
        let step = self.rng.random::<f64>() * self.config.max_adjustment_step;
        self.state.apply_tick(step, self.config.min_temperature, self.config.max_temperature);

        let rng = &mut self.rng;
        if let Some(takeover) = self
            .state
            .overheat_takeover(self.config.max_temperature, |len| rng.random_range(0..len))
        {
            info!(id = self.state.id(), ?takeover, "Overheated, requesting takeover");
            self.takeovers_signalled += 1;
            self.emit(&takeover);
        }
    }

    fn emit(&self, message: &Message) {
        if let Err(e) = self.outbound.send(message) {
            warn!(id = self.state.id(), kind = %message.kind(), error = %e, "Failed to emit message");
        }
    }
}
