//! Car selection policies for hall calls.
//!
//! A [SelectionStrategy] only orders the cars; the [super::CallRouter] offers the
//! call to each car in that order until one accepts it.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::{self, StrategyKind};
use crate::elevator_logic::Direction;
use crate::world_view::ElevatorStatus;

use super::Call;

/// Orders the candidate cars for one call.
pub trait SelectionStrategy: Send + Sync {
    /// Indices into `cars`, best candidate first. Stopped cars may be left out.
    fn rank(&self, call: &Call, cars: &[ElevatorStatus]) -> Vec<usize>;
}

/// Builds the strategy named in the config.
pub fn strategy_from(kind: StrategyKind) -> Box<dyn SelectionStrategy> {
    match kind {
        StrategyKind::Nearest => Box::new(NearestCar),
        StrategyKind::RoundRobin => Box::new(RoundRobin::default()),
    }
}

/// Cheapest car first, by [compute_cost].
#[derive(Debug, Default, Clone, Copy)]
pub struct NearestCar;

impl SelectionStrategy for NearestCar {
    fn rank(&self, call: &Call, cars: &[ElevatorStatus]) -> Vec<usize> {
        let mut costs: Vec<(usize, u32)> = cars
            .iter()
            .enumerate()
            .filter(|(_, car)| car.running)
            .map(|(idx, car)| (idx, compute_cost(car, call)))
            .collect();
        // stable sort, ties go to the lower id
        costs.sort_by_key(|&(_, cost)| cost);
        costs.into_iter().map(|(idx, _)| idx).collect()
    }
}

/// Every call starts with the next car in line, then wraps around.
#[derive(Debug, Default)]
pub struct RoundRobin {
    next: AtomicUsize,
}

impl SelectionStrategy for RoundRobin {
    fn rank(&self, _call: &Call, cars: &[ElevatorStatus]) -> Vec<usize> {
        if cars.is_empty() {
            return Vec::new();
        }
        let start = self.next.fetch_add(1, Ordering::Relaxed) % cars.len();
        (0..cars.len())
            .map(|offset| (start + offset) % cars.len())
            .filter(|&idx| cars[idx].running)
            .collect()
    }
}

/// Cost of sending `car` to `call`.
///
/// Distance in floors, plus [config::BUSY_PENALTY] if the car has queued floors,
/// plus [config::WRONG_DIRECTION_PENALTY] if it is moving away from the call or
/// will pass it going the other way, plus [config::FULL_CAR_PENALTY] if nobody
/// more fits in.
pub fn compute_cost(car: &ElevatorStatus, call: &Call) -> u32 {
    let mut cost = car.floor.abs_diff(call.floor);

    if !car.pending_floors.is_empty() {
        cost += config::BUSY_PENALTY;
    }
    if !is_moving_toward(car, call) {
        cost += config::WRONG_DIRECTION_PENALTY;
    }
    if car.passengers >= car.capacity as usize {
        cost += config::FULL_CAR_PENALTY;
    }
    cost
}

/// Will `car` pass `call.floor` travelling the way the caller wants to go?
/// An idle car can go anywhere.
fn is_moving_toward(car: &ElevatorStatus, call: &Call) -> bool {
    match car.direction {
        Direction::Up => call.floor > car.floor && call.direction == Direction::Up,
        Direction::Down => call.floor < car.floor && call.direction == Direction::Down,
        Direction::Idle => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(id: u32, floor: u32, direction: Direction, pending: Vec<u32>) -> ElevatorStatus {
        ElevatorStatus {
            id,
            floor,
            direction,
            doors_open: false,
            passengers: 0,
            capacity: 10,
            pending_floors: pending,
            running: true,
        }
    }

    #[test]
    fn nearest_idle_car_wins() {
        let cars = vec![car(0, 1, Direction::Idle, vec![]), car(1, 6, Direction::Idle, vec![])];
        let call = Call { floor: 5, direction: Direction::Up };
        assert_eq!(NearestCar.rank(&call, &cars), vec![1, 0]);
    }

    #[test]
    fn car_moving_away_is_penalised() {
        let cars = vec![
            car(0, 6, Direction::Up, vec![9]),
            car(1, 1, Direction::Idle, vec![]),
        ];
        let call = Call { floor: 5, direction: Direction::Up };
        assert_eq!(compute_cost(&cars[0], &call), 1 + config::BUSY_PENALTY + config::WRONG_DIRECTION_PENALTY);
        assert_eq!(compute_cost(&cars[1], &call), 4);
        assert_eq!(NearestCar.rank(&call, &cars), vec![1, 0]);
    }

    #[test]
    fn full_car_goes_last() {
        let mut full = car(0, 4, Direction::Idle, vec![]);
        full.passengers = 10;
        let cars = vec![full, car(1, 9, Direction::Idle, vec![])];
        let call = Call { floor: 4, direction: Direction::Down };
        assert_eq!(NearestCar.rank(&call, &cars), vec![1, 0]);
    }

    #[test]
    fn stopped_cars_are_skipped() {
        let mut stopped = car(0, 5, Direction::Idle, vec![]);
        stopped.running = false;
        let cars = vec![stopped, car(1, 1, Direction::Idle, vec![])];
        let call = Call { floor: 5, direction: Direction::Down };
        assert_eq!(NearestCar.rank(&call, &cars), vec![1]);
        assert_eq!(RoundRobin::default().rank(&call, &cars), vec![1]);
    }

    #[test]
    fn round_robin_rotates_the_first_choice() {
        let cars: Vec<_> = (0..3).map(|id| car(id, 1, Direction::Idle, vec![])).collect();
        let call = Call { floor: 2, direction: Direction::Up };
        let rr = RoundRobin::default();
        assert_eq!(rr.rank(&call, &cars), vec![0, 1, 2]);
        assert_eq!(rr.rank(&call, &cars), vec![1, 2, 0]);
        assert_eq!(rr.rank(&call, &cars), vec![2, 0, 1]);
        assert_eq!(rr.rank(&call, &cars), vec![0, 1, 2]);
    }
}
