//! Passengers riding the simulated building.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_PASSENGER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique passenger identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PassengerId(pub u64);

impl fmt::Display for PassengerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A person with a destination floor.
///
/// Immutable once created. Two passengers are the same passenger iff their ids match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    id: PassengerId,
    destination_floor: u32,
}

impl Passenger {
    /// Creates a passenger heading for `destination_floor` with a fresh id.
    pub fn new(destination_floor: u32) -> Self {
        let id = PassengerId(NEXT_PASSENGER_ID.fetch_add(1, Ordering::Relaxed));
        Self { id, destination_floor }
    }

    #[cfg(test)]
    pub(crate) fn with_id(id: PassengerId, destination_floor: u32) -> Self {
        Self { id, destination_floor }
    }

    #[allow(missing_docs)]
    pub fn id(&self) -> PassengerId {
        self.id
    }

    #[allow(missing_docs)]
    pub fn destination_floor(&self) -> u32 {
        self.destination_floor
    }
}

impl PartialEq for Passenger {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Passenger {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_passengers_get_distinct_ids() {
        let a = Passenger::new(4);
        let b = Passenger::new(4);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn equality_is_by_id() {
        let a = Passenger::with_id(PassengerId(900), 3);
        let b = Passenger::with_id(PassengerId(900), 7);
        assert_eq!(a, b);
    }
}
