//! Worker state and its transitions
//!
//! Everything here is synchronous and deterministic given the random step
//! and peer index, so the async actor stays a thin shell around it.

use tracing::{debug, trace};

use crate::domain::{WorkerId, WorkerStatus};
use crate::protocol::Message;

/// Mutable state owned by a single worker task
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerState {
    id: WorkerId,
    active: bool,
    temperature: f64,
    last_known_status: Vec<WorkerStatus>,
    overheat_signalled: bool,
}

impl WorkerState {
    pub fn new(id: WorkerId, starting_temperature: f64) -> Self {
        Self {
            id,
            active: true,
            temperature: starting_temperature,
            last_known_status: Vec::new(),
            overheat_signalled: false,
        }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn last_known_status(&self) -> &[WorkerStatus] {
        &self.last_known_status
    }

    /// Advance the temperature by one tick
    ///
    /// Active workers heat by `step` up to `max`; inactive ones cool by half
    /// of it down to `min`. Dropping below `max` re-arms the overheat signal.
    pub fn apply_tick(&mut self, step: f64, min: f64, max: f64) -> f64 {
        let before = self.temperature;
        self.temperature = if self.active {
            (self.temperature + step).min(max)
        } else {
            (self.temperature - step / 2.0).max(min)
        };
        if self.temperature < max {
            self.overheat_signalled = false;
        }
        trace!(id = self.id, before, after = self.temperature, active = self.active, "apply_tick");
        self.temperature
    }

    /// Peers last reported inactive
    pub fn inactive_peers(&self) -> Vec<WorkerId> {
        self.last_known_status
            .iter()
            .filter(|s| s.id != self.id && !s.active)
            .map(|s| s.id)
            .collect()
    }

    /// Build an overheat takeover if one is due
    ///
    /// `pick` chooses an index into the inactive peers. At most one takeover
    /// is produced per episode; with no inactive peer the episode stays open
    /// so a later tick can retry.
    pub fn overheat_takeover(&mut self, max: f64, pick: impl FnOnce(usize) -> usize) -> Option<Message> {
        if self.temperature < max || self.overheat_signalled {
            return None;
        }

        let peers = self.inactive_peers();
        if peers.is_empty() {
            debug!(id = self.id, "overheat_takeover: overheated with no inactive peer");
            return None;
        }

        let peer = peers[pick(peers.len()) % peers.len()];
        self.overheat_signalled = true;
        Some(Message::OverheatTakeover {
            worker_to_deactivate: self.id,
            worker_to_activate: peer,
        })
    }

    /// Apply an inbound message, returning the reply to emit, if any
    pub fn handle_message(&mut self, message: Message) -> Option<Message> {
        match message {
            Message::Control { worker_id, activate } if worker_id == self.id => {
                debug!(id = self.id, activate, "handle_message: control");
                self.active = activate;
                Some(Message::StatusUpdateResponse {
                    worker_id: self.id,
                    active: self.active,
                })
            }
            Message::Control { worker_id, .. } => {
                debug!(id = self.id, addressed_to = worker_id, "handle_message: control for another worker ignored");
                None
            }
            Message::DataRequest { .. } => Some(Message::DataResponse {
                worker_id: self.id,
                temperature: self.temperature,
            }),
            Message::StatusUpdate { worker_status_list } => {
                trace!(id = self.id, entries = worker_status_list.len(), "handle_message: status update");
                self.last_known_status = worker_status_list;
                None
            }
            other => {
                debug!(id = self.id, kind = %other.kind(), "handle_message: unexpected message ignored");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: f64 = 10.0;
    const MAX: f64 = 30.0;

    fn statuses(list: &[(WorkerId, bool)]) -> Vec<WorkerStatus> {
        list.iter().map(|&(id, active)| WorkerStatus::new(id, active)).collect()
    }

    #[test]
    fn test_initial_state() {
        let state = WorkerState::new(4, 20.0);
        assert_eq!(state.id(), 4);
        assert!(state.is_active());
        assert_eq!(state.temperature(), 20.0);
        assert!(state.last_known_status().is_empty());
    }

    #[test]
    fn test_heating_and_cooling_asymmetry() {
        let mut state = WorkerState::new(0, 20.0);
        let heated = state.apply_tick(0.4, MIN, MAX);
        assert!((heated - 20.4).abs() < 1e-9);

        state.handle_message(Message::control(0, false));
        let cooled = state.apply_tick(0.4, MIN, MAX);
        assert!((cooled - 20.2).abs() < 1e-9);
        // Cooling moves half as far as heating for the same step
        assert!(((heated - 20.0) - 2.0 * (heated - cooled)).abs() < 1e-9);
    }

    #[test]
    fn test_clamping() {
        let mut state = WorkerState::new(0, 29.9);
        assert_eq!(state.apply_tick(0.5, MIN, MAX), MAX);

        let mut state = WorkerState::new(0, 10.1);
        state.handle_message(Message::control(0, false));
        assert_eq!(state.apply_tick(0.5, MIN, MAX), MIN);
    }

    #[test]
    fn test_overheat_emits_exactly_one_takeover() {
        let mut state = WorkerState::new(1, 29.8);
        state.handle_message(Message::StatusUpdate {
            worker_status_list: statuses(&[(0, true), (1, true), (2, false)]),
        });

        state.apply_tick(0.5, MIN, MAX);
        let takeover = state.overheat_takeover(MAX, |_| 0);
        assert_eq!(
            takeover,
            Some(Message::OverheatTakeover {
                worker_to_deactivate: 1,
                worker_to_activate: 2,
            })
        );

        // Still at max on the next tick: no second signal
        state.apply_tick(0.5, MIN, MAX);
        assert_eq!(state.overheat_takeover(MAX, |_| 0), None);
    }

    #[test]
    fn test_overheat_rearms_after_cooling() {
        let mut state = WorkerState::new(0, MAX);
        state.handle_message(Message::StatusUpdate {
            worker_status_list: statuses(&[(0, true), (1, false)]),
        });
        assert!(state.overheat_takeover(MAX, |_| 0).is_some());

        state.handle_message(Message::control(0, false));
        state.apply_tick(0.2, MIN, MAX);
        state.handle_message(Message::control(0, true));
        state.apply_tick(0.5, MIN, MAX);
        assert!(state.overheat_takeover(MAX, |_| 0).is_some());
    }

    #[test]
    fn test_overheat_without_inactive_peer() {
        let mut state = WorkerState::new(0, MAX);
        assert_eq!(state.overheat_takeover(MAX, |_| 0), None);

        // Only self is inactive in the cached list
        state.handle_message(Message::StatusUpdate {
            worker_status_list: statuses(&[(0, false), (1, true)]),
        });
        assert_eq!(state.overheat_takeover(MAX, |_| 0), None);

        // A peer going inactive later is picked up by the next check
        state.handle_message(Message::StatusUpdate {
            worker_status_list: statuses(&[(0, true), (1, false)]),
        });
        assert!(state.overheat_takeover(MAX, |_| 0).is_some());
    }

    #[test]
    fn test_takeover_picks_among_inactive_peers() {
        let mut state = WorkerState::new(0, MAX);
        state.handle_message(Message::StatusUpdate {
            worker_status_list: statuses(&[(0, true), (1, false), (2, true), (3, false)]),
        });
        assert_eq!(state.inactive_peers(), vec![1, 3]);
        assert_eq!(
            state.overheat_takeover(MAX, |len| len - 1),
            Some(Message::OverheatTakeover {
                worker_to_deactivate: 0,
                worker_to_activate: 3,
            })
        );
    }

    #[test]
    fn test_control_only_acknowledged_when_addressed() {
        let mut state = WorkerState::new(2, 20.0);
        assert_eq!(state.handle_message(Message::control(5, false)), None);
        assert!(state.is_active());

        assert_eq!(
            state.handle_message(Message::control(2, false)),
            Some(Message::StatusUpdateResponse {
                worker_id: 2,
                active: false
            })
        );
        assert!(!state.is_active());
    }

    #[test]
    fn test_data_request_always_answered() {
        let mut state = WorkerState::new(1, 17.25);
        state.handle_message(Message::control(1, false));
        assert_eq!(
            state.handle_message(Message::DataRequest { data: String::new() }),
            Some(Message::DataResponse {
                worker_id: 1,
                temperature: 17.25
            })
        );
    }

    #[test]
    fn test_status_update_replaces_cache() {
        let mut state = WorkerState::new(0, 20.0);
        state.handle_message(Message::StatusUpdate {
            worker_status_list: statuses(&[(0, true), (1, false), (2, false)]),
        });
        state.handle_message(Message::StatusUpdate {
            worker_status_list: statuses(&[(0, true)]),
        });
        assert_eq!(state.last_known_status(), statuses(&[(0, true)]).as_slice());
    }

    #[test]
    fn test_coordinator_bound_messages_ignored() {
        let mut state = WorkerState::new(0, 20.0);
        let before = state.clone();
        assert_eq!(
            state.handle_message(Message::DataResponse {
                worker_id: 0,
                temperature: 1.0
            }),
            None
        );
        assert_eq!(state, before);
    }
}
