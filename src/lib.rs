#![warn(missing_docs)]
//! # This projects library
//!
//! This library simulates a bank of elevators serving the floors of one building.
//! Every car runs its own SCAN operating loop as a tokio task; hall calls are
//! routed to the cars by a pluggable dispatcher.
//!
//! ## Overview
//! - **Config**: Constants, elevator settings and the JSON run config.
//! - **Init**: Command line arguments and config loading.
//! - **Elevator Logic**: Request queue, direction state machine and the operating loop of one car.
//! - **Floor**: Waiting passengers and call buttons.
//! - **Manager**: Hall call dispatch and car selection strategies.
//! - **Building**: Wires floors, cars and the dispatcher together.
//! - **World View**: Snapshots of the whole building.
//! - **Simulation**: Seeded passenger traffic.

/// Global variables
pub mod config;

/// Initialize functions
pub mod init;

/// Print functions with color coding
pub mod print;

pub mod error;

pub mod passenger;

pub mod elevator_logic;

pub mod floor;

pub mod manager;

pub mod building;

pub mod world_view;

pub mod simulation;

pub use building::Building;
pub use elevator_logic::{Direction, Elevator};
pub use error::ElevatorError;
pub use passenger::Passenger;
