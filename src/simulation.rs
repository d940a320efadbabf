//! Seeded passenger traffic for a [Building].

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{interval, Instant};

use crate::building::Building;
use crate::config::SimConfig;
use crate::print;

/// Draws random trips between distinct floors. The same seed gives the same trips.
pub struct PassengerGenerator {
    rng: StdRng,
    lowest: u32,
    top: u32,
}

impl PassengerGenerator {
    /// Generator over floors `lowest..=top`.
    pub fn new(seed: u64, lowest: u32, top: u32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            lowest,
            top,
        }
    }

    /// Generator over the floors of `config`, seeded from it.
    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.seed, config.lowest_floor, config.top_floor())
    }

    /// Next `(origin, destination)` pair. `None` if the building has a single floor.
    pub fn next_trip(&mut self) -> Option<(u32, u32)> {
        if self.top <= self.lowest {
            return None;
        }
        let origin = self.rng.gen_range(self.lowest..=self.top);
        // pick among the other floors so origin and destination differ
        let mut destination = self.rng.gen_range(self.lowest..self.top);
        if destination >= origin {
            destination += 1;
        }
        Some((origin, destination))
    }
}

/// Feeds `building` one passenger every [SimConfig::arrival_period_ms] for
/// [SimConfig::run_units] time units. Returns how many passengers were spawned.
pub async fn generate_traffic(building: &Building) -> usize {
    let config = building.config();
    let mut generator = PassengerGenerator::from_config(config);
    let run_for = config.time_unit() * config.run_units;
    let period = Duration::from_millis(config.arrival_period_ms.max(1));

    let started = Instant::now();
    let mut ticker = interval(period);
    let mut spawned = 0;

    while started.elapsed() < run_for {
        ticker.tick().await;
        let Some((origin, destination)) = generator.next_trip() else {
            break;
        };
        match building.spawn_passenger(origin, destination) {
            Ok(passenger) => {
                spawned += 1;
                print::info(format!(
                    "Passenger {} appeared at floor {} heading for floor {}",
                    passenger.id(),
                    origin,
                    destination
                ));
            }
            Err(e) => print::err(format!("{}", e)),
        }
    }
    spawned
}
