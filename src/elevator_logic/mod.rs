//! # Elevator Logic
//!
//! One [Elevator] is a handle to a car running its own operating task. The task
//! is spawned on the tokio runtime when the car is constructed and runs until
//! [Elevator::shut_down] is called:
//!
//! 1. If the current floor is queued: open the doors (discharge and board),
//!    then close them and start over, so a repeat call for this floor reopens
//!    the doors instead of sending the car away.
//! 2. If the queue is empty: go idle and restart the idle timer.
//! 3. Idle: wait for a new request for up to the idle timeout. If none arrives,
//!    and the car is not at its home floor, request the home floor.
//! 4. Up / Down: pass one floor, or settle the direction at the end of the range.
//!
//! All car state sits behind one lock which is never held across an `.await`;
//! every timed wait releases it and state is read again on wake.

pub mod fsm;
pub mod request;
/// Idle timer of the operating loop
pub mod timer;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use crate::config::{self, ElevatorSettings, ElevatorTiming};
use crate::error::ElevatorError;
use crate::passenger::Passenger;
use crate::print;
use crate::world_view::ElevatorStatus;

use fsm::{CarState, Event};
pub use fsm::{Direction, FloorRange};
pub use request::RequestQueue;

/// Boarding protocol hook, told whenever a car opens its doors.
///
/// Called without the car's lock held, so implementations may call back into
/// the [Elevator] (for example [Elevator::add_passengers]).
pub trait ArrivalListener: Send + Sync {
    /// The doors of `elevator` opened at `floor`. `direction` is the direction the
    /// car services from here, [Direction::Idle] if it has nothing left to do.
    fn doors_opened(&self, elevator: &Elevator, floor: u32, direction: Direction);

    /// `passengers` left `elevator` at their destination `floor`.
    fn passengers_discharged(&self, _elevator: &Elevator, _floor: u32, _passengers: &[Passenger]) {}
}

struct Shared {
    id: u32,
    capacity: u32,
    range: FloorRange,
    home_floor: u32,
    timing: ElevatorTiming,
    state: Mutex<CarState>,
    queue: RequestQueue,
    running: AtomicBool,
    listener: Option<Weak<dyn ArrivalListener>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

/// Handle to one simulated car. Cheap to clone; all clones drive the same car.
#[derive(Clone)]
pub struct Elevator {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for Elevator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Elevator")
            .field("id", &self.shared.id)
            .field("floor", &self.current_floor())
            .field("direction", &self.direction())
            .finish()
    }
}

fn validate(settings: &ElevatorSettings) -> Result<FloorRange, ElevatorError> {
    let fail = |reason: &str| ElevatorError::Construction {
        id: settings.id,
        reason: reason.to_string(),
    };
    if settings.capacity == 0 {
        return Err(fail("capacity must be positive"));
    }
    if settings.min_floors < 1 {
        return Err(fail("lowest floor must be at least 1"));
    }
    if settings.max_floors == 0 {
        return Err(fail("must service at least one floor"));
    }
    let max = settings
        .min_floors
        .checked_add(settings.max_floors - 1)
        .ok_or_else(|| fail("floor range overflows"))?;
    Ok(FloorRange { min: settings.min_floors, max })
}

impl Elevator {
    /// Builds car `id` servicing `max_floors` floors from floor `min_floors`, with
    /// default timing and no boarding protocol, and starts its operating task.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(id: u32, capacity: u32, max_floors: u32, min_floors: u32) -> Result<Self, ElevatorError> {
        let settings = ElevatorSettings { id, capacity, max_floors, min_floors };
        Self::start(settings, ElevatorTiming::default(), None)
    }

    /// Builds a car from `settings` and starts its operating task.
    ///
    /// The car starts at its home floor ([config::HOME_FLOOR], clamped into its
    /// range), idle, with closed doors. `listener` is told about every door opening.
    pub fn start(
        settings: ElevatorSettings,
        timing: ElevatorTiming,
        listener: Option<Weak<dyn ArrivalListener>>,
    ) -> Result<Self, ElevatorError> {
        let range = validate(&settings)?;
        let home_floor = config::HOME_FLOOR.clamp(range.min, range.max);

        let elevator = Elevator {
            shared: Arc::new(Shared {
                id: settings.id,
                capacity: settings.capacity,
                range,
                home_floor,
                timing,
                state: Mutex::new(CarState::new(home_floor)),
                queue: RequestQueue::new(),
                running: AtomicBool::new(true),
                listener,
                worker: Mutex::new(None),
            }),
        };

        let worker = tokio::spawn(elevator.clone().operate());
        *elevator.shared.worker.lock().unwrap_or_else(|p| p.into_inner()) = Some(worker);
        Ok(elevator)
    }

    fn state(&self) -> MutexGuard<'_, CarState> {
        self.shared.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /*======================================================================*/
    /*                           Accessors                                  */
    /*======================================================================*/

    #[allow(missing_docs)]
    pub fn id(&self) -> u32 {
        self.shared.id
    }

    #[allow(missing_docs)]
    pub fn capacity(&self) -> u32 {
        self.shared.capacity
    }

    /// Floors this car can reach
    pub fn range(&self) -> FloorRange {
        self.shared.range
    }

    /// Floor the car returns to after idling
    pub fn home_floor(&self) -> u32 {
        self.shared.home_floor
    }

    #[allow(missing_docs)]
    pub fn current_floor(&self) -> u32 {
        self.state().current_floor
    }

    #[allow(missing_docs)]
    pub fn direction(&self) -> Direction {
        self.state().direction()
    }

    /// Are the doors open?
    pub fn is_open(&self) -> bool {
        self.state().doors_open
    }

    /// False once [Elevator::shut_down] has been called. Never turns true again.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Passengers currently in the car
    pub fn passengers(&self) -> Vec<Passenger> {
        self.state().manifest.clone()
    }

    /// Seats left before the car reaches its rated capacity
    pub fn free_capacity(&self) -> usize {
        (self.shared.capacity as usize).saturating_sub(self.state().manifest.len())
    }

    /// Queued floors in ascending order
    pub fn pending_floors(&self) -> Vec<u32> {
        self.shared.queue.snapshot()
    }

    /// Is `floor` in the request queue?
    pub fn has_request(&self, floor: u32) -> bool {
        self.shared.queue.contains(floor)
    }

    /// Consistent snapshot of the car for status output.
    pub fn status(&self) -> ElevatorStatus {
        let st = self.state();
        ElevatorStatus {
            id: self.shared.id,
            floor: st.current_floor,
            direction: st.direction(),
            doors_open: st.doors_open,
            passengers: st.manifest.len(),
            capacity: self.shared.capacity,
            pending_floors: self.shared.queue.snapshot(),
            running: self.is_running(),
        }
    }

    /*======================================================================*/
    /*                           Requests                                   */
    /*======================================================================*/

    /// Asks the car to stop at `floor`.
    ///
    /// Returns `true` if the floor was newly queued. A `false` is a silent
    /// rejection: the floor was already queued, is out of range, lies behind the
    /// car's travel direction, or the car is shut down. Whoever asked should try
    /// another car.
    pub fn add_floor_to_queue(&self, floor: u32) -> bool {
        let mut st = self.state();
        self.admit_locked(&mut st, floor)
    }

    fn admit_locked(&self, st: &mut CarState, floor: u32) -> bool {
        let queue = &self.shared.queue;
        if !self.is_running() || queue.contains(floor) {
            return false;
        }

        match fsm::admit(st.direction(), st.current_floor, floor, self.shared.range, queue.is_empty()) {
            Some(dirn) => {
                queue.add(floor);
                fsm::transition(st, queue, Event::Admitted(dirn));
                print::elevator(self.shared.id, format!("Request for floor {} was added", floor));
                true
            }
            None => {
                print::elevator(self.shared.id, format!("Request for floor {} was rejected", floor));
                false
            }
        }
    }

    /*======================================================================*/
    /*                           Passengers                                 */
    /*======================================================================*/

    /// Puts one passenger in the car and requests their destination floor.
    ///
    /// Fails with [ElevatorError::MissingPassenger] on `None`; nothing changes then.
    pub fn add_passenger<P>(&self, passenger: P) -> Result<(), ElevatorError>
    where
        P: Into<Option<Passenger>>,
    {
        let passenger = passenger.into().ok_or(ElevatorError::MissingPassenger)?;
        self.add_passengers([passenger])
    }

    /// Puts a batch of passengers in the car and requests each destination floor
    /// with the same admission rule as [Elevator::add_floor_to_queue].
    ///
    /// All or nothing: if any entry is `None`, no passenger is added.
    /// Capacity is not checked here; see [Elevator::free_capacity].
    pub fn add_passengers<I>(&self, passengers: I) -> Result<(), ElevatorError>
    where
        I: IntoIterator,
        I::Item: Into<Option<Passenger>>,
    {
        let batch = passengers
            .into_iter()
            .map(Into::<Option<Passenger>>::into)
            .collect::<Option<Vec<Passenger>>>()
            .ok_or(ElevatorError::MissingPassenger)?;

        let mut st = self.state();
        for passenger in batch {
            if st.manifest.contains(&passenger) {
                continue;
            }
            let destination = passenger.destination_floor();
            st.manifest.push(passenger);
            self.admit_locked(&mut st, destination);
        }
        Ok(())
    }

    /// Takes one passenger out of the car and hands it back.
    ///
    /// [ElevatorError::MissingPassenger] on `None`,
    /// [ElevatorError::PassengerNotFound] if the passenger is not aboard.
    pub fn remove_passenger<'a, P>(&self, passenger: P) -> Result<Passenger, ElevatorError>
    where
        P: Into<Option<&'a Passenger>>,
    {
        let passenger = passenger.into().ok_or(ElevatorError::MissingPassenger)?;
        let mut st = self.state();
        let idx = st
            .manifest
            .iter()
            .position(|p| p == passenger)
            .ok_or(ElevatorError::PassengerNotFound(passenger.id()))?;
        Ok(st.manifest.remove(idx))
    }

    /// Takes a batch of passengers out of the car. All or nothing: if any entry
    /// is `None` or not aboard, the manifest is left as it was.
    pub fn remove_passengers<'a, I>(&self, passengers: I) -> Result<Vec<Passenger>, ElevatorError>
    where
        I: IntoIterator,
        I::Item: Into<Option<&'a Passenger>>,
    {
        let batch = passengers
            .into_iter()
            .map(Into::<Option<&Passenger>>::into)
            .collect::<Option<Vec<&Passenger>>>()
            .ok_or(ElevatorError::MissingPassenger)?;

        let mut st = self.state();
        if let Some(missing) = batch.iter().copied().find(|p| !st.manifest.contains(*p)) {
            return Err(ElevatorError::PassengerNotFound(missing.id()));
        }
        let (removed, kept): (Vec<Passenger>, Vec<Passenger>) = std::mem::take(&mut st.manifest)
            .into_iter()
            .partition(|p| batch.contains(&p));
        st.manifest = kept;
        Ok(removed)
    }

    /*======================================================================*/
    /*                           Door cycle                                 */
    /*======================================================================*/

    /// Opens the doors at the current floor and holds them open.
    ///
    /// Under the lock: marks the doors open, clears the floor from the queue,
    /// settles the direction and discharges everyone whose destination this is.
    /// Then, with the lock released, tells the boarding protocol and waits out
    /// the door-open time.
    pub async fn open_doors(&self) {
        let (floor, direction, discharged) = {
            let mut st = self.state();
            st.doors_open = true;
            let floor = st.current_floor;
            self.shared.queue.remove(floor);
            fsm::transition(&mut st, &self.shared.queue, Event::Settle);

            let (leaving, staying): (Vec<Passenger>, Vec<Passenger>) = std::mem::take(&mut st.manifest)
                .into_iter()
                .partition(|p| p.destination_floor() == floor);
            st.manifest = staying;
            (floor, st.direction(), leaving)
        };

        print::elevator(
            self.shared.id,
            format!("Doors open at floor {} ({} leaving)", floor, discharged.len()),
        );

        if let Some(listener) = self.listener() {
            if !discharged.is_empty() {
                listener.passengers_discharged(self, floor, &discharged);
            }
            listener.doors_opened(self, floor, direction);
        }

        sleep(self.shared.timing.door_open).await;
    }

    /// Closes the doors and waits out the door-close time.
    pub async fn close_doors(&self) {
        self.state().doors_open = false;
        sleep(self.shared.timing.door_close).await;
    }

    fn listener(&self) -> Option<Arc<dyn ArrivalListener>> {
        self.shared.listener.as_ref().and_then(Weak::upgrade)
    }

    /*======================================================================*/
    /*                           Lifecycle                                  */
    /*======================================================================*/

    /// Stops the car for good. Seen by the operating task at its next
    /// iteration, so a running door cycle, floor pass or idle wait completes first.
    pub fn shut_down(&self) {
        if self.shared.running.swap(false, Ordering::SeqCst) {
            print::info(format!("Elevator {} is shutting down", self.shared.id + 1));
        }
    }

    /// Waits for the operating task to finish. Only returns after [Elevator::shut_down].
    pub async fn join(&self) {
        let worker = self.shared.worker.lock().unwrap_or_else(|p| p.into_inner()).take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                print::err(format!("Elevator {} task failed: {}", self.shared.id + 1, e));
            }
        }
    }

    /*======================================================================*/
    /*                           Operating loop                             */
    /*======================================================================*/

    async fn operate(self) {
        print::ok(format!("Elevator {} has started", self.shared.id + 1));
        let mut idle_timer = timer::new(self.shared.timing.idle_timeout);

        while self.is_running() {
            if let Err(e) = self.step(&mut idle_timer).await {
                print::warn(format!("{}", e));
            }
        }

        print::info(format!("Elevator {} has stopped at floor {}", self.shared.id + 1, self.current_floor()));
    }

    async fn step(&self, idle_timer: &mut timer::Timer) -> Result<(), ElevatorError> {
        if self.shared.queue.contains(self.current_floor()) {
            self.open_doors().await;
            self.close_doors().await;
            // the floor may have been requested again while the doors were open
            return Ok(());
        }

        let direction = {
            let mut st = self.state();
            if self.shared.queue.is_empty() {
                fsm::transition(&mut st, &self.shared.queue, Event::Settle);
                idle_timer.timer_start();
            } else {
                idle_timer.timer_stop();
            }
            st.direction()
        };

        match direction {
            Direction::Idle => self.wait_idle(idle_timer).await,
            Direction::Up | Direction::Down => {
                self.travel(direction).await;
                Ok(())
            }
        }
    }

    async fn wait_idle(&self, idle_timer: &timer::Timer) -> Result<(), ElevatorError> {
        let queue = &self.shared.queue;
        let notified = queue.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        if !queue.is_empty() {
            return Ok(());
        }

        if timeout(idle_timer.remaining(), notified).await.is_ok() {
            if queue.is_empty() {
                return Err(ElevatorError::InterruptedWait(self.shared.id));
            }
            return Ok(());
        }

        if idle_timer.timer_timeouted() && self.is_running() && self.current_floor() != self.shared.home_floor {
            print::elevator(
                self.shared.id,
                format!(
                    "Idle for {:?}, returning to floor {}",
                    self.shared.timing.idle_timeout, self.shared.home_floor
                ),
            );
            self.add_floor_to_queue(self.shared.home_floor);
        }
        Ok(())
    }

    async fn travel(&self, direction: Direction) {
        sleep(self.shared.timing.floor_travel).await;

        let mut st = self.state();
        let range = self.shared.range;
        match direction {
            Direction::Up if st.current_floor < range.max => st.current_floor += 1,
            Direction::Down if st.current_floor > range.min => st.current_floor -= 1,
            _ => {
                // end of range with no floor to serve here
                fsm::transition(&mut st, &self.shared.queue, Event::Settle);
                print::elevator(
                    self.shared.id,
                    format!("Reached end of range at floor {}, now {:?}", st.current_floor, st.direction()),
                );
                return;
            }
        }
        print::elevator(self.shared.id, format!("Passing floor {}", st.current_floor));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn timing() -> ElevatorTiming {
        ElevatorTiming::from_unit(Duration::from_millis(100))
    }

    fn car(max_floors: u32) -> Elevator {
        let settings = ElevatorSettings { id: 0, capacity: 4, max_floors, min_floors: 1 };
        Elevator::start(settings, timing(), None).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_invalid_construction() {
        assert!(matches!(Elevator::new(0, 0, 10, 1), Err(ElevatorError::Construction { .. })));
        assert!(matches!(Elevator::new(0, 5, 10, 0), Err(ElevatorError::Construction { .. })));
        assert!(matches!(Elevator::new(0, 5, 0, 1), Err(ElevatorError::Construction { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn home_floor_clamps_into_range() {
        let settings = ElevatorSettings { id: 1, capacity: 4, max_floors: 5, min_floors: 3 };
        let e = Elevator::start(settings, timing(), None).unwrap();
        assert_eq!(e.home_floor(), 3);
        assert_eq!(e.current_floor(), 3);
        assert_eq!(e.range(), FloorRange { min: 3, max: 7 });
        e.shut_down();
    }

    #[tokio::test(start_paused = true)]
    async fn travels_floor_by_floor_and_serves() {
        let e = car(6);
        assert!(e.add_floor_to_queue(4));
        assert_eq!(e.direction(), Direction::Up);

        // three floor passes at 50ms each
        sleep(Duration::from_millis(160)).await;
        assert_eq!(e.current_floor(), 4);
        assert!(e.is_open());

        sleep(Duration::from_millis(200)).await;
        assert!(!e.is_open());
        assert_eq!(e.direction(), Direction::Idle);
        assert!(e.pending_floors().is_empty());
        e.shut_down();
    }

    #[tokio::test(start_paused = true)]
    async fn idle_car_returns_home() {
        let e = car(6);
        e.add_floor_to_queue(3);
        sleep(Duration::from_millis(500)).await;
        assert_eq!(e.current_floor(), 3);
        assert_eq!(e.direction(), Direction::Idle);

        // idle since t=200ms, timeout is ten units of 100ms
        sleep(Duration::from_millis(710)).await;
        assert_eq!(e.pending_floors(), vec![1]);
        assert_eq!(e.direction(), Direction::Down);
        sleep(Duration::from_millis(300)).await;
        assert_eq!(e.current_floor(), 1);
        e.shut_down();
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_finishes_direction_before_reversing() {
        let e = car(10);
        e.add_floor_to_queue(5);
        sleep(Duration::from_millis(120)).await;
        assert_eq!(e.current_floor(), 3);

        // behind the car: rejected while going up
        assert!(!e.add_floor_to_queue(2));
        assert!(e.add_floor_to_queue(8));

        sleep(Duration::from_millis(1000)).await;
        assert_eq!(e.current_floor(), 8);
        assert_eq!(e.direction(), Direction::Idle);
        assert!(e.add_floor_to_queue(2));
        assert_eq!(e.direction(), Direction::Down);
        e.shut_down();
    }

    #[tokio::test(start_paused = true)]
    async fn repeat_call_while_doors_close_reopens_them() {
        let e = car(10);
        assert!(e.add_floor_to_queue(1));

        // doors open 0..50ms, closing 50..100ms
        sleep(Duration::from_millis(70)).await;
        assert!(!e.is_open());
        assert_eq!(e.direction(), Direction::Idle);
        assert!(e.add_floor_to_queue(1));

        sleep(Duration::from_millis(50)).await;
        assert_eq!(e.current_floor(), 1);
        assert!(e.is_open());

        sleep(Duration::from_millis(140)).await;
        assert_eq!(e.current_floor(), 1);
        assert_eq!(e.direction(), Direction::Idle);
        assert!(e.pending_floors().is_empty());
        e.shut_down();
    }

    #[tokio::test(start_paused = true)]
    async fn repeat_call_while_doors_open_mid_range() {
        let e = car(10);
        e.add_floor_to_queue(5);
        // four passes of 50ms, doors open at 200ms
        sleep(Duration::from_millis(220)).await;
        assert_eq!(e.current_floor(), 5);
        assert!(e.is_open());
        assert!(e.add_floor_to_queue(5));

        for _ in 0..6 {
            sleep(Duration::from_millis(50)).await;
            assert_eq!(e.current_floor(), 5);
        }
        assert_eq!(e.direction(), Direction::Idle);
        assert!(e.pending_floors().is_empty());
        e.shut_down();
    }

    #[tokio::test(start_paused = true)]
    async fn woken_idle_wait_without_request_is_interrupted() {
        let e = car(6);
        let mut idle_timer = timer::new(e.shared.timing.idle_timeout);
        idle_timer.timer_start();
        let waiter = {
            let e = e.clone();
            tokio::spawn(async move { e.wait_idle(&idle_timer).await })
        };
        sleep(Duration::from_millis(10)).await;

        // wakes both the waiter and the car's own loop, then leaves nothing queued
        e.shared.queue.add(4);
        e.shared.queue.remove(4);
        assert_eq!(waiter.await.unwrap(), Err(ElevatorError::InterruptedWait(0)));

        sleep(Duration::from_millis(200)).await;
        assert!(e.is_running());
        assert_eq!(e.current_floor(), 1);
        assert_eq!(e.direction(), Direction::Idle);

        // the loop still serves requests afterwards
        assert!(e.add_floor_to_queue(3));
        sleep(Duration::from_millis(200)).await;
        assert_eq!(e.current_floor(), 3);
        e.shut_down();
    }

    #[tokio::test(start_paused = true)]
    async fn requests_after_shutdown_are_rejected() {
        let e = car(6);
        e.shut_down();
        assert!(!e.is_running());
        assert!(!e.add_floor_to_queue(3));
        e.join().await;
    }
}
