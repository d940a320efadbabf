//! # Floor – call buttons and boarding
//!
//! A [Floor] keeps two waiting sets, one per travel direction. A passenger who
//! arrives is put in the set matching their destination and the floor summons an
//! elevator through the [Dispatcher]. When a car opens its doors here, the floor
//! hands the matching set over to the car.
//!
//! Both sets sit behind one lock which is held for the whole hand-over, so two
//! cars arriving at once can never both claim the same passenger, and a
//! passenger is always either waiting here or in exactly one car.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::elevator_logic::{Direction, Elevator};
use crate::manager::Dispatcher;
use crate::passenger::Passenger;
use crate::print;
use crate::world_view::FloorStatus;

#[derive(Default)]
struct WaitingSets {
    going_up: Vec<Passenger>,
    going_down: Vec<Passenger>,
}

impl WaitingSets {
    fn for_direction(&mut self, direction: Direction) -> Option<&mut Vec<Passenger>> {
        match direction {
            Direction::Up => Some(&mut self.going_up),
            Direction::Down => Some(&mut self.going_down),
            Direction::Idle => None,
        }
    }

    fn is_waiting(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => !self.going_up.is_empty(),
            Direction::Down => !self.going_down.is_empty(),
            Direction::Idle => false,
        }
    }
}

/// One floor of the building.
pub struct Floor {
    floor_number: u32,
    waiting: Mutex<WaitingSets>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl Floor {
    /// Creates floor `floor_number` (one-based) reporting calls to `dispatcher`.
    pub fn new(floor_number: u32, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            floor_number,
            waiting: Mutex::new(WaitingSets::default()),
            dispatcher,
        }
    }

    fn waiting(&self) -> MutexGuard<'_, WaitingSets> {
        self.waiting.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[allow(missing_docs)]
    pub fn id(&self) -> u32 {
        self.floor_number
    }

    /// Queues a newly arrived passenger and presses the matching call button.
    ///
    /// A passenger whose destination is this floor is ignored.
    pub fn add_person_to_floor(&self, person: Passenger) {
        let direction = if person.destination_floor() > self.floor_number {
            Direction::Up
        } else if person.destination_floor() < self.floor_number {
            Direction::Down
        } else {
            return;
        };

        if let Some(set) = self.waiting().for_direction(direction) {
            set.push(person);
        }
        self.summon_elevator(direction);
    }

    /// Presses the call button for `direction`. [Direction::Idle] is dropped.
    pub fn summon_elevator(&self, direction: Direction) {
        if direction != Direction::Idle {
            self.dispatcher.notify_call(self.floor_number, direction);
        }
    }

    /// Moves waiting passengers into `elevator`, which just opened its doors here
    /// and services `direction` from this floor.
    ///
    /// Moving Up or Down, the matching set boards. An idle car takes the up set
    /// if anyone waits there, otherwise the down set. At most
    /// [Elevator::free_capacity] passengers board. Anyone still waiting afterwards,
    /// in either direction, presses the button again. Returns how many boarded.
    pub fn remove_from_floor(&self, elevator: &Elevator, direction: Direction) -> usize {
        let (boarded, left_behind) = {
            let mut waiting = self.waiting();
            let direction = match direction {
                Direction::Idle if waiting.is_waiting(Direction::Up) => Direction::Up,
                Direction::Idle => Direction::Down,
                d => d,
            };
            let boarded = match waiting.for_direction(direction) {
                Some(set) if !set.is_empty() => self.board(elevator, set),
                _ => 0,
            };
            let left_behind: Vec<Direction> = [Direction::Up, Direction::Down]
                .into_iter()
                .filter(|d| waiting.is_waiting(*d))
                .collect();
            (boarded, left_behind)
        };

        if boarded > 0 {
            print::elevator(
                elevator.id(),
                format!("{} passenger(s) boarded at floor {}", boarded, self.floor_number),
            );
        }
        for direction in left_behind {
            self.summon_elevator(direction);
        }
        boarded
    }

    fn board(&self, elevator: &Elevator, set: &mut Vec<Passenger>) -> usize {
        let take = set.len().min(elevator.free_capacity());
        let boarding: Vec<Passenger> = set.drain(..take).collect();
        if let Err(e) = elevator.add_passengers(boarding.iter().cloned()) {
            // nothing boarded, everyone keeps their place in line
            print::err(format!("Boarding at floor {} failed: {}", self.floor_number, e));
            let mut restored = boarding;
            restored.append(set);
            *set = restored;
            return 0;
        }
        boarding.len()
    }

    /// Does anyone wait here to travel in `direction`?
    pub fn has_waiting(&self, direction: Direction) -> bool {
        self.waiting().is_waiting(direction)
    }

    /// Snapshot of the waiting counts.
    pub fn status(&self) -> FloorStatus {
        let waiting = self.waiting();
        FloorStatus {
            floor: self.floor_number,
            waiting_up: waiting.going_up.len(),
            waiting_down: waiting.going_down.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ElevatorSettings, ElevatorTiming};
    use std::collections::HashSet;
    use std::sync::Barrier;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingDispatcher {
        calls: Mutex<Vec<(u32, Direction)>>,
    }

    impl Dispatcher for RecordingDispatcher {
        fn notify_call(&self, floor: u32, direction: Direction) {
            self.calls.lock().unwrap().push((floor, direction));
        }
    }

    fn floor(n: u32) -> (Floor, Arc<RecordingDispatcher>) {
        let d = Arc::new(RecordingDispatcher::default());
        (Floor::new(n, d.clone()), d)
    }

    fn car(capacity: u32) -> Elevator {
        car_with_id(0, capacity)
    }

    fn car_with_id(id: u32, capacity: u32) -> Elevator {
        let settings = ElevatorSettings { id, capacity, max_floors: 10, min_floors: 1 };
        Elevator::start(settings, ElevatorTiming::from_unit(Duration::from_secs(1)), None).unwrap()
    }

    #[test]
    fn arrivals_sort_by_direction_and_summon() {
        let (f, d) = floor(4);
        f.add_person_to_floor(Passenger::new(7));
        f.add_person_to_floor(Passenger::new(2));
        f.add_person_to_floor(Passenger::new(4));

        assert_eq!(f.status(), FloorStatus { floor: 4, waiting_up: 1, waiting_down: 1 });
        assert_eq!(*d.calls.lock().unwrap(), vec![(4, Direction::Up), (4, Direction::Down)]);
    }

    #[test]
    fn idle_summons_are_dropped() {
        let (f, d) = floor(2);
        f.summon_elevator(Direction::Idle);
        assert!(d.calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn matching_direction_boards() {
        let (f, _d) = floor(1);
        let up = Passenger::new(5);
        f.add_person_to_floor(up.clone());

        let e = car(4);
        assert_eq!(f.remove_from_floor(&e, Direction::Up), 1);
        assert_eq!(e.passengers(), vec![up]);
        assert_eq!(e.pending_floors(), vec![5]);
        assert!(!f.has_waiting(Direction::Up));
        e.shut_down();
    }

    #[tokio::test(start_paused = true)]
    async fn wrong_direction_boards_nobody() {
        let (f, _d) = floor(5);
        f.add_person_to_floor(Passenger::new(8));

        let e = car(4);
        assert_eq!(f.remove_from_floor(&e, Direction::Down), 0);
        assert!(e.passengers().is_empty());
        assert!(f.has_waiting(Direction::Up));
        e.shut_down();
    }

    #[tokio::test(start_paused = true)]
    async fn full_car_leaves_the_rest_waiting() {
        let (f, d) = floor(1);
        for dest in [3, 4, 5] {
            f.add_person_to_floor(Passenger::new(dest));
        }
        d.calls.lock().unwrap().clear();

        let e = car(2);
        assert_eq!(f.remove_from_floor(&e, Direction::Up), 2);
        assert_eq!(e.passengers().len(), 2);
        assert_eq!(f.status().waiting_up, 1);
        assert_eq!(*d.calls.lock().unwrap(), vec![(1, Direction::Up)]);
        e.shut_down();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn two_cars_at_once_never_share_a_passenger() {
        const WAITING: usize = 12;

        for _ in 0..20 {
            let (f, _d) = floor(1);
            for n in 0..WAITING {
                f.add_person_to_floor(Passenger::new(2 + (n as u32 % 8)));
            }
            let (a, b) = (car_with_id(0, 100), car_with_id(1, 100));

            let barrier = Barrier::new(2);
            let (boarded_a, boarded_b) = std::thread::scope(|s| {
                let first = s.spawn(|| {
                    barrier.wait();
                    f.remove_from_floor(&a, Direction::Up)
                });
                let second = s.spawn(|| {
                    barrier.wait();
                    f.remove_from_floor(&b, Direction::Up)
                });
                (first.join().unwrap(), second.join().unwrap())
            });

            assert_eq!(boarded_a + boarded_b, WAITING);
            assert_eq!(f.status().waiting_up, 0);

            let in_a: HashSet<_> = a.passengers().iter().map(Passenger::id).collect();
            let in_b: HashSet<_> = b.passengers().iter().map(Passenger::id).collect();
            assert_eq!(in_a.len(), boarded_a);
            assert_eq!(in_b.len(), boarded_b);
            assert!(in_a.is_disjoint(&in_b));

            a.shut_down();
            b.shut_down();
        }
    }
}
