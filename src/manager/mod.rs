//! # Manager – hall call dispatch
//!
//! Floors press call buttons through the [Dispatcher] trait. The [CallRouter]
//! implements it for a bank of elevators: it ranks the cars with a
//! [task_allocator::SelectionStrategy] and offers the call to each in turn.
//! A car may reject a call (see [Elevator::add_floor_to_queue]); when every car
//! rejects it, the call is parked and offered again by [CallRouter::retry_pending].

use std::sync::{Mutex, MutexGuard, RwLock};

use serde::{Deserialize, Serialize};

use crate::elevator_logic::{Direction, Elevator};
use crate::print;
use crate::world_view::ElevatorStatus;

pub mod task_allocator;

use task_allocator::SelectionStrategy;

/// Receiver of call-button presses.
pub trait Dispatcher: Send + Sync {
    /// Someone at `floor` wants to travel in `direction`.
    fn notify_call(&self, floor: u32, direction: Direction);
}

/// One hall call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Call {
    /// Floor the button was pressed at
    pub floor: u32,
    /// Up or Down
    pub direction: Direction,
}

/// [Dispatcher] that routes hall calls to a bank of elevators.
pub struct CallRouter {
    elevators: RwLock<Vec<Elevator>>,
    strategy: Box<dyn SelectionStrategy>,
    pending: Mutex<Vec<Call>>,
}

impl CallRouter {
    /// A router with no cars yet, ranking cars with `strategy`.
    pub fn new(strategy: Box<dyn SelectionStrategy>) -> Self {
        Self {
            elevators: RwLock::new(Vec::new()),
            strategy,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Adds a car to the bank.
    pub fn register(&self, elevator: Elevator) {
        self.elevators
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(elevator);
    }

    /// Cars in registration order
    pub fn elevators(&self) -> Vec<Elevator> {
        self.elevators
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn pending(&self) -> MutexGuard<'_, Vec<Call>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Offers `call` to the cars in ranked order.
    ///
    /// Returns the id of the car that will stop at the floor, or `None` if every
    /// car rejected it. A car that already has the floor queued counts as taking it.
    pub fn dispatch(&self, call: Call) -> Option<u32> {
        let cars = self.elevators();
        let statuses: Vec<ElevatorStatus> = cars.iter().map(Elevator::status).collect();

        self.strategy
            .rank(&call, &statuses)
            .into_iter()
            .filter_map(|idx| cars.get(idx))
            .find(|car| car.has_request(call.floor) || car.add_floor_to_queue(call.floor))
            .map(Elevator::id)
    }

    /// Calls no car has taken yet
    pub fn pending_calls(&self) -> Vec<Call> {
        self.pending().clone()
    }

    fn park(&self, call: Call) {
        let mut pending = self.pending();
        if !pending.contains(&call) {
            pending.push(call);
        }
    }

    /// Offers every parked call again. Calls for which `still_waiting` is false
    /// are dropped. Returns how many calls a car took.
    pub fn retry_pending<F>(&self, still_waiting: F) -> usize
    where
        F: Fn(&Call) -> bool,
    {
        let parked = std::mem::take(&mut *self.pending());
        let mut placed = 0;
        for call in parked {
            if !still_waiting(&call) {
                continue;
            }
            match self.dispatch(call) {
                Some(id) => {
                    print::info(format!(
                        "Parked call at floor {} ({:?}) taken by elevator {}",
                        call.floor,
                        call.direction,
                        id + 1
                    ));
                    placed += 1;
                }
                None => self.park(call),
            }
        }
        placed
    }
}

impl Dispatcher for CallRouter {
    fn notify_call(&self, floor: u32, direction: Direction) {
        let call = Call { floor, direction };
        if self.dispatch(call).is_none() {
            print::warn(format!("No elevator can take the call at floor {} ({:?}) yet", floor, direction));
            self.park(call);
        }
    }
}
