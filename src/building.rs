//! # Building – composition root
//!
//! Wires one [CallRouter], one [Floor] per storey and a bank of [Elevator]s
//! together from a [SimConfig]:
//! - floors report hall calls to the router,
//! - the router queues them on the cars,
//! - cars report door openings back to the floors, which board passengers.
//!
//! A watchdog task offers parked hall calls to the cars again every
//! [config::DISPATCH_RETRY_PERIOD] until [Building::shut_down].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::{self, SimConfig};
use crate::elevator_logic::{ArrivalListener, Direction, Elevator};
use crate::error::ElevatorError;
use crate::floor::Floor;
use crate::manager::{task_allocator, CallRouter};
use crate::passenger::Passenger;
use crate::print;
use crate::world_view::WorldView;

/// All floors of the building, and the boarding protocol the cars call into.
struct FloorDirectory {
    lowest: u32,
    floors: Vec<Floor>,
    delivered: AtomicU64,
}

impl FloorDirectory {
    fn floor(&self, number: u32) -> Option<&Floor> {
        let idx = number.checked_sub(self.lowest)?;
        self.floors.get(idx as usize)
    }

    fn still_waiting(&self, floor: u32, direction: Direction) -> bool {
        self.floor(floor).map_or(false, |f| f.has_waiting(direction))
    }
}

impl ArrivalListener for FloorDirectory {
    fn doors_opened(&self, elevator: &Elevator, floor: u32, direction: Direction) {
        if let Some(f) = self.floor(floor) {
            f.remove_from_floor(elevator, direction);
        }
    }

    fn passengers_discharged(&self, elevator: &Elevator, floor: u32, passengers: &[Passenger]) {
        self.delivered.fetch_add(passengers.len() as u64, Ordering::SeqCst);
        print::elevator(
            elevator.id(),
            format!("{} passenger(s) arrived at floor {}", passengers.len(), floor),
        );
    }
}

/// A running building: floors, cars and the dispatcher between them.
pub struct Building {
    config: SimConfig,
    router: Arc<CallRouter>,
    directory: Arc<FloorDirectory>,
    elevators: Vec<Elevator>,
    stop_tx: watch::Sender<bool>,
    watchdog: Mutex<Option<JoinHandle<()>>>,
}

impl Building {
    /// Builds and starts every car described by `config`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(config: SimConfig) -> Result<Self, ElevatorError> {
        if config.num_elevators == 0 {
            return Err(ElevatorError::Construction {
                id: 0,
                reason: "a building needs at least one elevator".to_string(),
            });
        }
        if !config.fits_in_floor_range() {
            return Err(ElevatorError::Construction {
                id: 0,
                reason: "floor range overflows".to_string(),
            });
        }

        let router = Arc::new(CallRouter::new(task_allocator::strategy_from(config.strategy)));
        let floors = (config.lowest_floor..=config.top_floor())
            .map(|n| Floor::new(n, router.clone()))
            .collect();
        let directory = Arc::new(FloorDirectory {
            lowest: config.lowest_floor,
            floors,
            delivered: AtomicU64::new(0),
        });

        let weak: Weak<FloorDirectory> = Arc::downgrade(&directory);
        let listener: Weak<dyn ArrivalListener> = weak;
        let mut elevators = Vec::with_capacity(config.num_elevators as usize);
        for id in 0..config.num_elevators {
            let elevator = Elevator::start(config.elevator_settings(id), config.timing(), Some(listener.clone()));
            let elevator = match elevator {
                Ok(elevator) => elevator,
                Err(e) => {
                    elevators.iter().for_each(Elevator::shut_down);
                    return Err(e);
                }
            };
            router.register(elevator.clone());
            elevators.push(elevator);
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let watchdog = tokio::spawn(retry_parked_calls(router.clone(), directory.clone(), stop_rx));

        print::ok(format!(
            "Building with floors {}..={} and {} elevator(s) is running",
            config.lowest_floor,
            config.top_floor(),
            config.num_elevators
        ));

        Ok(Self {
            config,
            router,
            directory,
            elevators,
            stop_tx,
            watchdog: Mutex::new(Some(watchdog)),
        })
    }

    #[allow(missing_docs)]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Cars in id order
    pub fn elevators(&self) -> &[Elevator] {
        &self.elevators
    }

    /// Floor `number`, if the building has it
    pub fn floor(&self, number: u32) -> Option<&Floor> {
        self.directory.floor(number)
    }

    /// The dispatcher the floors report to
    pub fn router(&self) -> &CallRouter {
        &self.router
    }

    /// Passengers that reached their destination so far
    pub fn delivered(&self) -> u64 {
        self.directory.delivered.load(Ordering::SeqCst)
    }

    /// Puts a new passenger on floor `origin`, heading for `destination`.
    ///
    /// Both floors must be in the building. A passenger whose destination is the
    /// floor they are on is counted as delivered at once.
    pub fn spawn_passenger(&self, origin: u32, destination: u32) -> Result<Passenger, ElevatorError> {
        let floor = self.floor(origin).ok_or(ElevatorError::FloorOutOfRange(origin))?;
        if self.floor(destination).is_none() {
            return Err(ElevatorError::FloorOutOfRange(destination));
        }

        let passenger = Passenger::new(destination);
        if origin == destination {
            self.directory.delivered.fetch_add(1, Ordering::SeqCst);
        } else {
            floor.add_person_to_floor(passenger.clone());
        }
        Ok(passenger)
    }

    /// Snapshot of every car and floor.
    pub fn world_view(&self) -> WorldView {
        WorldView {
            elevators: self.elevators.iter().map(Elevator::status).collect(),
            floors: self.directory.floors.iter().map(Floor::status).collect(),
            delivered: self.delivered(),
        }
    }

    /// Nobody waiting on a floor and nobody riding.
    pub fn is_settled(&self) -> bool {
        let view = self.world_view();
        view.waiting() == 0 && view.riding() == 0
    }

    /// Stops every car and the watchdog. Running door cycles and floor passes finish first.
    pub fn shut_down(&self) {
        let _ = self.stop_tx.send(true);
        self.elevators.iter().for_each(Elevator::shut_down);
    }

    /// Waits for every task of the building to finish. Only returns after [Building::shut_down].
    pub async fn join(&self) {
        join_all(self.elevators.iter().map(Elevator::join)).await;

        let watchdog = self.watchdog.lock().unwrap_or_else(|p| p.into_inner()).take();
        if let Some(watchdog) = watchdog {
            if let Err(e) = watchdog.await {
                print::err(format!("Dispatch watchdog failed: {}", e));
            }
        }
    }
}

async fn retry_parked_calls(router: Arc<CallRouter>, directory: Arc<FloorDirectory>, mut stop_rx: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(config::DISPATCH_RETRY_PERIOD);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                router.retry_pending(|call| directory.still_waiting(call.floor, call.direction));
            }
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn small_config() -> SimConfig {
        SimConfig {
            num_floors: 6,
            num_elevators: 2,
            capacity: 4,
            time_unit_ms: 100,
            ..SimConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn builds_floors_and_cars() {
        let b = Building::new(small_config()).unwrap();
        assert_eq!(b.elevators().len(), 2);
        assert!(b.floor(1).is_some());
        assert!(b.floor(6).is_some());
        assert!(b.floor(7).is_none());
        assert!(b.floor(0).is_none());
        assert_eq!(b.world_view().floors.len(), 6);
        b.shut_down();
        b.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn zero_elevators_is_rejected() {
        let cfg = SimConfig { num_elevators: 0, ..small_config() };
        assert!(matches!(Building::new(cfg), Err(ElevatorError::Construction { .. })));
        let cfg = SimConfig { lowest_floor: u32::MAX - 2, ..small_config() };
        assert!(matches!(Building::new(cfg), Err(ElevatorError::Construction { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn passengers_outside_the_building_are_rejected() {
        let b = Building::new(small_config()).unwrap();
        assert_eq!(b.spawn_passenger(9, 2).unwrap_err(), ElevatorError::FloorOutOfRange(9));
        assert_eq!(b.spawn_passenger(2, 0).unwrap_err(), ElevatorError::FloorOutOfRange(0));
        b.shut_down();
        b.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn one_passenger_is_delivered() {
        let b = Building::new(small_config()).unwrap();
        b.spawn_passenger(4, 2).unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(b.delivered(), 1);
        assert!(b.is_settled());
        b.shut_down();
        b.join().await;
    }
}
