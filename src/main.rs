use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::sleep;

use elevatorbank::config::{self, SimConfig};
use elevatorbank::{init, print, simulation, Building};

#[tokio::main]
async fn main() -> Result<()> {
    let args = init::parse_args()?;

    let sim_config = match &args.config_path {
        Some(path) => init::load_config(path)?,
        None => SimConfig::default(),
    };
    print::info(format!("Starting simulation with {:?}", sim_config));

    /* START ----------- Bygg bygningen, heisane startar med ein gong ---------------------- */
    let building = Building::new(sim_config).context("could not build the building")?;
    /* SLUTT ----------- Bygg bygningen ---------------------- */

    /* START ----------- Passasjerar og periodisk status ---------------------- */
    let spawned = {
        let traffic = simulation::generate_traffic(&building);
        tokio::pin!(traffic);
        let mut status = tokio::time::interval(config::STATUS_PRINT_PERIOD);
        loop {
            tokio::select! {
                spawned = &mut traffic => break spawned,
                _ = status.tick() => print::world_view(&building.world_view()),
            }
        }
    };
    print::ok(format!("Traffic generator done after {} passenger(s)", spawned));
    /* SLUTT ----------- Passasjerar og periodisk status ---------------------- */

    // la heisane levere dei siste passasjerane, men ikkje for alltid
    let drain_limit = building.config().time_unit() * building.config().run_units;
    let mut waited = Duration::ZERO;
    while !building.is_settled() && waited < drain_limit {
        sleep(config::STATUS_PRINT_PERIOD).await;
        waited += config::STATUS_PRINT_PERIOD;
        print::world_view(&building.world_view());
    }
    if !building.is_settled() {
        print::warn("Shutting down with passengers still waiting or riding".to_string());
    }

    building.shut_down();
    building.join().await;

    let view = building.world_view();
    print::world_view(&view);
    print::ok(format!("{} of {} passenger(s) delivered", view.delivered, spawned));
    if args.json {
        println!("{}", view.to_json()?);
    }
    Ok(())
}
