//! Direction state machine of one elevator.
//!
//! This module owns the sweep (SCAN) policy:
//! - [admit] decides whether a new floor request is accepted and which direction
//!   the car takes if it is.
//! - [settle] picks the direction after the car has served a floor or reached the
//!   end of its range.
//! - [transition] is the only place [CarState::direction] is written, so the
//!   invariant "direction is [Direction::Idle] iff the request queue is empty"
//!   holds after every transition.
//!
//! Every function here is pure apart from the `&mut CarState` it is handed; the
//! caller holds the elevator lock while calling them.

use serde::{Deserialize, Serialize};

use crate::passenger::Passenger;
use super::request::RequestQueue;

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Direction an elevator is servicing requests in.
pub enum Direction {
    Idle,
    Up,
    Down,
}

impl Direction {
    /// The other travel direction. Idle stays Idle.
    pub fn reversed(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Idle => Direction::Idle,
        }
    }
}

/// Inclusive range of floors a car can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorRange {
    /// Bottommost serviceable floor
    pub min: u32,
    /// Topmost serviceable floor
    pub max: u32,
}

impl FloorRange {
    #[allow(missing_docs)]
    pub fn contains(&self, floor: u32) -> bool {
        (self.min..=self.max).contains(&floor)
    }
}

/// Mutable state of one car, guarded by the elevator lock.
#[derive(Debug)]
pub(crate) struct CarState {
    pub current_floor: u32,
    direction: Direction,
    pub doors_open: bool,
    pub manifest: Vec<Passenger>,
}

impl CarState {
    pub fn new(floor: u32) -> Self {
        Self {
            current_floor: floor,
            direction: Direction::Idle,
            doors_open: false,
            manifest: Vec::new(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

/// Something that changes the direction of a car.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    /// A request was just inserted into the queue; travel as [admit] decided.
    Admitted(Direction),
    /// The car served a floor, drained its queue or hit the end of its range.
    Settle,
}

/// Applies `event` to `state`. The single writer of the car's direction.
pub(crate) fn transition(state: &mut CarState, queue: &RequestQueue, event: Event) {
    state.direction = match event {
        Event::Admitted(dirn) if !queue.is_empty() => dirn,
        Event::Admitted(_) | Event::Settle => settle(state.direction, state.current_floor, queue),
    };
}

/// Admission rule for a request for `floor`.
///
/// Returns the direction the car should adopt if the request is accepted, or
/// `None` if it is rejected. Duplicates are filtered by the caller before this runs.
///
/// - Out-of-range floors are rejected.
/// - At the top of the range the car is forced Down, at the bottom forced Up.
/// - Moving Up only accepts floors above the car, moving Down only floors below.
/// - Idle accepts anything, going Up if the floor is above, else Down.
/// - An idle car always accepts its own floor, even at the ends of its range.
pub fn admit(direction: Direction, current: u32, floor: u32, range: FloorRange, queue_empty: bool) -> Option<Direction> {
    if !range.contains(floor) {
        return None;
    }

    let dirn = if current == range.max {
        Direction::Down
    } else if current == range.min {
        Direction::Up
    } else {
        direction
    };

    if floor == current && queue_empty {
        return Some(match dirn {
            Direction::Idle => Direction::Down,
            d => d,
        });
    }

    match dirn {
        Direction::Up => (floor > current).then_some(Direction::Up),
        Direction::Down => (floor < current).then_some(Direction::Down),
        Direction::Idle => {
            if floor > current {
                Some(Direction::Up)
            } else {
                Some(Direction::Down)
            }
        }
    }
}

/// Sweep decision after serving a floor: keep going while there is work ahead,
/// reverse when the work is behind, idle when there is none.
pub fn settle(direction: Direction, current: u32, queue: &RequestQueue) -> Direction {
    if queue.is_empty() {
        return Direction::Idle;
    }
    let above = queue.any_above(current);
    let below = queue.any_below(current);
    match direction {
        Direction::Up if above => Direction::Up,
        Direction::Down if below => Direction::Down,
        _ if above && !below => Direction::Up,
        _ if below && !above => Direction::Down,
        // work on both sides of an idle car, or only the current floor left
        Direction::Idle => Direction::Down,
        d => d.reversed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANGE: FloorRange = FloorRange { min: 1, max: 10 };

    #[test]
    fn up_accepts_only_floors_above() {
        assert_eq!(admit(Direction::Up, 4, 7, RANGE, false), Some(Direction::Up));
        assert_eq!(admit(Direction::Up, 4, 2, RANGE, false), None);
        assert_eq!(admit(Direction::Up, 4, 4, RANGE, false), None);
    }

    #[test]
    fn down_accepts_only_floors_below() {
        assert_eq!(admit(Direction::Down, 6, 2, RANGE, false), Some(Direction::Down));
        assert_eq!(admit(Direction::Down, 6, 9, RANGE, false), None);
    }

    #[test]
    fn idle_accepts_and_picks_direction() {
        assert_eq!(admit(Direction::Idle, 5, 8, RANGE, true), Some(Direction::Up));
        assert_eq!(admit(Direction::Idle, 5, 2, RANGE, true), Some(Direction::Down));
    }

    #[test]
    fn ends_of_range_force_reversal() {
        assert_eq!(admit(Direction::Up, 10, 3, RANGE, false), Some(Direction::Down));
        assert_eq!(admit(Direction::Idle, 10, 3, RANGE, true), Some(Direction::Down));
        assert_eq!(admit(Direction::Down, 1, 3, RANGE, false), Some(Direction::Up));
        assert_eq!(admit(Direction::Up, 10, 11, RANGE, false), None);
    }

    #[test]
    fn idle_car_accepts_its_own_floor() {
        assert_eq!(admit(Direction::Idle, 1, 1, RANGE, true), Some(Direction::Up));
        assert_eq!(admit(Direction::Idle, 10, 10, RANGE, true), Some(Direction::Down));
        assert_eq!(admit(Direction::Idle, 5, 5, RANGE, true), Some(Direction::Down));
        assert_eq!(admit(Direction::Up, 5, 5, RANGE, false), None);
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert_eq!(admit(Direction::Idle, 5, 0, RANGE, true), None);
        assert_eq!(admit(Direction::Idle, 5, 11, RANGE, true), None);
    }

    #[test]
    fn settle_follows_the_sweep() {
        let q = RequestQueue::new();
        assert_eq!(settle(Direction::Up, 5, &q), Direction::Idle);

        q.add(8);
        q.add(2);
        assert_eq!(settle(Direction::Up, 5, &q), Direction::Up);
        assert_eq!(settle(Direction::Down, 5, &q), Direction::Down);

        q.remove(8);
        assert_eq!(settle(Direction::Up, 5, &q), Direction::Down);
        assert_eq!(settle(Direction::Idle, 5, &q), Direction::Down);
    }

    #[test]
    fn transition_keeps_idle_iff_empty() {
        let q = RequestQueue::new();
        let mut s = CarState::new(3);
        transition(&mut s, &q, Event::Settle);
        assert_eq!(s.direction(), Direction::Idle);

        q.add(6);
        transition(&mut s, &q, Event::Admitted(Direction::Up));
        assert_eq!(s.direction(), Direction::Up);

        q.remove(6);
        transition(&mut s, &q, Event::Settle);
        assert_eq!(s.direction(), Direction::Idle);
    }
}
