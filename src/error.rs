//! Errors reported by elevators to their callers.

use thiserror::Error;

use crate::passenger::PassengerId;

/// Everything an elevator operation can fail with.
///
/// Rejected floor requests are not errors; see
/// [crate::elevator_logic::Elevator::add_floor_to_queue].
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElevatorError {
    /// Invalid construction input. The elevator is not created.
    #[error("cannot construct elevator {id}: {reason}")]
    Construction { id: u32, reason: String },

    /// A passenger reference handed to admission or removal was absent.
    #[error("passenger reference is missing")]
    MissingPassenger,

    /// The passenger to remove is not in the manifest.
    #[error("passenger {0} not found in the elevator")]
    PassengerNotFound(PassengerId),

    /// A timed wait in the operating loop woke without its condition holding.
    #[error("timed wait in elevator {0} was interrupted")]
    InterruptedWait(u32),

    /// A passenger was placed on, or sent to, a floor the building does not have.
    #[error("floor {0} is outside the building")]
    FloorOutOfRange(u32),
}
