//! Snapshot of the whole building, for printing and JSON dumps.
//!
//! Every field is copied out under the owning lock, so a [WorldView] never
//! changes after it is taken. Cars and floors are snapshotted one at a time, so
//! the view is consistent per car and per floor, not across the building.

use serde::Serialize;

use crate::elevator_logic::Direction;

/// State of one car at snapshot time.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ElevatorStatus {
    /// Car id (zero-based)
    pub id: u32,
    /// Floor the car is at or last passed
    pub floor: u32,
    #[allow(missing_docs)]
    pub direction: Direction,
    #[allow(missing_docs)]
    pub doors_open: bool,
    /// Passengers aboard
    pub passengers: usize,
    /// Rated capacity
    pub capacity: u32,
    /// Queued floors, ascending
    pub pending_floors: Vec<u32>,
    /// False after shutdown
    pub running: bool,
}

/// Waiting passengers on one floor at snapshot time.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FloorStatus {
    #[allow(missing_docs)]
    pub floor: u32,
    /// Passengers waiting to go up
    pub waiting_up: usize,
    /// Passengers waiting to go down
    pub waiting_down: usize,
}

/// Snapshot of every car and every floor.
#[derive(Serialize, Debug, Clone, Default)]
pub struct WorldView {
    /// Cars in id order
    pub elevators: Vec<ElevatorStatus>,
    /// Floors from the bottom up
    pub floors: Vec<FloorStatus>,
    /// Passengers that reached their destination so far
    pub delivered: u64,
}

impl WorldView {
    /// Passengers waiting on all floors
    pub fn waiting(&self) -> usize {
        self.floors.iter().map(|f| f.waiting_up + f.waiting_down).sum()
    }

    /// Passengers riding in all cars
    pub fn riding(&self) -> usize {
        self.elevators.iter().map(|e| e.passengers).sum()
    }

    /// Serializes the view as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_and_json() {
        let view = WorldView {
            elevators: vec![ElevatorStatus {
                id: 0,
                floor: 3,
                direction: Direction::Up,
                doors_open: false,
                passengers: 2,
                capacity: 10,
                pending_floors: vec![5, 7],
                running: true,
            }],
            floors: vec![
                FloorStatus { floor: 1, waiting_up: 1, waiting_down: 0 },
                FloorStatus { floor: 2, waiting_up: 2, waiting_down: 3 },
            ],
            delivered: 4,
        };
        assert_eq!(view.waiting(), 6);
        assert_eq!(view.riding(), 2);

        let json = view.to_json().unwrap();
        assert!(json.contains("\"direction\": \"Up\""));
        assert!(json.contains("\"delivered\": 4"));
    }
}
