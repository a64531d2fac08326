//! Per-tick control decisions

use rand::Rng;
use tracing::debug;

use crate::config::NetworkConfig;
use crate::domain::{WorkerId, WorkerStatus};
use crate::protocol::Message;

/// Decide which control commands to send this tick
///
/// Too hot: switch off a random active worker. Too cold: switch on a random
/// inactive worker. Then, with `chaos_probability`, flip a random worker to a
/// random state if that differs from its current one.
pub fn decide<R: Rng + ?Sized>(
    statuses: &[WorkerStatus],
    average_temperature: f64,
    config: &NetworkConfig,
    rng: &mut R,
) -> Vec<Message> {
    let mut commands = Vec::new();

    if average_temperature > config.high_temperature_threshold {
        if let Some(id) = pick(statuses, true, rng) {
            debug!(average_temperature, id, "decide: too hot, deactivating");
            commands.push(Message::control(id, false));
        }
    } else if average_temperature < config.low_temperature_threshold
        && let Some(id) = pick(statuses, false, rng)
    {
        debug!(average_temperature, id, "decide: too cold, activating");
        commands.push(Message::control(id, true));
    }

    if !statuses.is_empty() && rng.random_bool(config.chaos_probability) {
        let target = &statuses[rng.random_range(0..statuses.len())];
        let activate = rng.random_bool(0.5);
        if target.active != activate {
            debug!(id = target.id, activate, "decide: random flip");
            commands.push(Message::control(target.id, activate));
        }
    }

    commands
}

/// Uniformly random worker with the given activity
fn pick<R: Rng + ?Sized>(statuses: &[WorkerStatus], active: bool, rng: &mut R) -> Option<WorkerId> {
    let candidates: Vec<WorkerId> = statuses.iter().filter(|s| s.active == active).map(|s| s.id).collect();
    if candidates.is_empty() {
        None
    } else {
        Some(candidates[rng.random_range(0..candidates.len())])
    }
}
