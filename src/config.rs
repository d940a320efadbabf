//! # config.rs – Centralized Parameter Store
//!
//! This module holds all static program parameters used throughout the simulator,
//! together with the settings structs an elevator or a whole run is built from.
//! Keeping configuration in one place makes tuning, experimentation, and testing easier.

use std::sync::Mutex;
use std::time::Duration;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

//
// ──────────────────────────────────────────────────────────────
//   1. BUILDING & ELEVATOR PARAMETERS
// ──────────────────────────────────────────────────────────────
//

/// The floor an idle elevator returns to after [IDLE_TIMEOUT_UNITS] without requests
pub const HOME_FLOOR: u32 = 1;

/// Default number of floors in the simulated building
pub const DEFAULT_NUM_FLOORS: u32 = 15;

/// Default number of elevators in the simulated building
pub const DEFAULT_NUM_ELEVATORS: u32 = 3;

/// Default passenger capacity of one elevator
pub const DEFAULT_CAPACITY: u32 = 10;

//
// ──────────────────────────────────────────────────────────────
//   2. TIMING (all in simulated time units)
// ──────────────────────────────────────────────────────────────
//

/// Length of one simulated time unit when nothing else is configured
pub const DEFAULT_TIME_UNIT: Duration = Duration::from_secs(1);

/// Number of time units an elevator waits idle before going home
pub const IDLE_TIMEOUT_UNITS: u32 = 10;

/// Time to pass one floor, in thousandths of a time unit
pub const FLOOR_TRAVEL_MILLIUNITS: u32 = 500;

/// Time the doors stay open, in thousandths of a time unit
pub const DOOR_OPEN_MILLIUNITS: u32 = 500;

/// Time the doors take to close, in thousandths of a time unit
pub const DOOR_CLOSE_MILLIUNITS: u32 = 500;

/// Extra dispatch cost for a car that already has queued floors
pub const BUSY_PENALTY: u32 = 5;

/// Extra dispatch cost for a car moving away from the call
pub const WRONG_DIRECTION_PENALTY: u32 = 10;

/// Extra dispatch cost for a car with no free seats
pub const FULL_CAR_PENALTY: u32 = 20;

/// How often parked hall calls are offered to the elevators again
pub const DISPATCH_RETRY_PERIOD: Duration = Duration::from_millis(250);

/// How often the binary prints the world view
pub const STATUS_PRINT_PERIOD: Duration = Duration::from_secs(2);

//
// ──────────────────────────────────────────────────────────────
//   3. SETTINGS STRUCTS
// ──────────────────────────────────────────────────────────────
//

/// Construction inputs for one elevator.
///
/// `max_floors` is the number of serviced floors and `min_floors` the lowest
/// serviced floor, so the car covers `min_floors ..= min_floors + max_floors - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElevatorSettings {
    /// Unique id of the car
    pub id: u32,
    /// Passengers the car is rated for
    pub capacity: u32,
    /// Number of floors the car services
    pub max_floors: u32,
    /// Lowest floor the car services (one-based)
    pub min_floors: u32,
}

impl ElevatorSettings {
    /// Settings for car `id` with the default capacity, servicing `num_floors` floors from floor 1.
    pub fn new(id: u32, num_floors: u32) -> Self {
        Self {
            id,
            capacity: DEFAULT_CAPACITY,
            max_floors: num_floors,
            min_floors: 1,
        }
    }
}

/// Every simulated delay an elevator can block on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElevatorTiming {
    /// Pause for passing one floor
    pub floor_travel: Duration,
    /// How long the doors are held open
    pub door_open: Duration,
    /// How long the doors take to close
    pub door_close: Duration,
    /// How long an idle car waits before returning to [HOME_FLOOR]
    pub idle_timeout: Duration,
}

impl ElevatorTiming {
    /// Scales every delay from one time unit.
    pub fn from_unit(unit: Duration) -> Self {
        Self {
            floor_travel: unit * FLOOR_TRAVEL_MILLIUNITS / 1000,
            door_open: unit * DOOR_OPEN_MILLIUNITS / 1000,
            door_close: unit * DOOR_CLOSE_MILLIUNITS / 1000,
            idle_timeout: unit * IDLE_TIMEOUT_UNITS,
        }
    }
}

impl Default for ElevatorTiming {
    fn default() -> Self {
        Self::from_unit(DEFAULT_TIME_UNIT)
    }
}

/// Which [crate::manager::task_allocator] strategy the dispatcher uses.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Nearest,
    RoundRobin,
}

/// Description of a whole simulation run, read from a JSON file.
///
/// Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Floors in the building
    pub num_floors: u32,
    /// Elevators in the building
    pub num_elevators: u32,
    /// Capacity of every elevator
    pub capacity: u32,
    /// Lowest floor (one-based)
    pub lowest_floor: u32,
    /// Length of one time unit in milliseconds
    pub time_unit_ms: u64,
    /// How many time units the passenger generator runs
    pub run_units: u32,
    /// Milliseconds between generated passengers
    pub arrival_period_ms: u64,
    /// Seed for the passenger generator
    pub seed: u64,
    /// Car selection policy of the dispatcher
    pub strategy: StrategyKind,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_floors: DEFAULT_NUM_FLOORS,
            num_elevators: DEFAULT_NUM_ELEVATORS,
            capacity: DEFAULT_CAPACITY,
            lowest_floor: HOME_FLOOR,
            time_unit_ms: DEFAULT_TIME_UNIT.as_millis() as u64,
            run_units: 60,
            arrival_period_ms: 1500,
            seed: 25,
            strategy: StrategyKind::Nearest,
        }
    }
}

impl SimConfig {
    /// Timing derived from [SimConfig::time_unit_ms]
    pub fn timing(&self) -> ElevatorTiming {
        ElevatorTiming::from_unit(self.time_unit())
    }

    /// One time unit as a [Duration]
    pub fn time_unit(&self) -> Duration {
        Duration::from_millis(self.time_unit_ms)
    }

    /// Settings for elevator number `id`
    pub fn elevator_settings(&self, id: u32) -> ElevatorSettings {
        ElevatorSettings {
            id,
            capacity: self.capacity,
            max_floors: self.num_floors,
            min_floors: self.lowest_floor,
        }
    }

    /// Does `lowest_floor + num_floors` fit in a floor number?
    pub fn fits_in_floor_range(&self) -> bool {
        self.lowest_floor.checked_add(self.num_floors).is_some()
    }

    /// Highest floor in the building, saturating at `u32::MAX`
    pub fn top_floor(&self) -> u32 {
        self.lowest_floor.saturating_add(self.num_floors).saturating_sub(1)
    }
}

//
// ──────────────────────────────────────────────────────────────
//   4. LOGGING CONFIGURATION
// ──────────────────────────────────────────────────────────────
//

/// Enable/disable printing of the periodic world view
pub static PRINT_STATUS_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable printing of errors
pub static PRINT_ERR_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable printing of warnings
pub static PRINT_WARN_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable printing of success messages
pub static PRINT_OK_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable printing of general info
pub static PRINT_INFO_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable per-car movement prints
pub static PRINT_ELSE_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_scales_from_one_unit() {
        let t = ElevatorTiming::from_unit(Duration::from_millis(100));
        assert_eq!(t.floor_travel, Duration::from_millis(50));
        assert_eq!(t.door_open, Duration::from_millis(50));
        assert_eq!(t.idle_timeout, Duration::from_millis(1000));
    }

    #[test]
    fn empty_json_is_default_config() {
        let cfg: SimConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, SimConfig::default());
        assert_eq!(cfg.top_floor(), DEFAULT_NUM_FLOORS);
    }

    #[test]
    fn top_floor_saturates() {
        let cfg = SimConfig { lowest_floor: u32::MAX - 1, num_floors: 5, ..SimConfig::default() };
        assert_eq!(cfg.top_floor(), u32::MAX - 1);
        assert!(!cfg.fits_in_floor_range());
        assert!(SimConfig::default().fits_in_floor_range());
    }

    #[test]
    fn strategy_names_are_snake_case() {
        let cfg: SimConfig = serde_json::from_str(r#"{"strategy": "round_robin", "num_floors": 4}"#).unwrap();
        assert_eq!(cfg.strategy, StrategyKind::RoundRobin);
        assert_eq!(cfg.elevator_settings(2).max_floors, 4);
    }
}
