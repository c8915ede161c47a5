//! Runs the 2D and 3D presets without a window and logs their energy.
//!
//! `RUST_LOG=debug cargo run --example headless`

use carom::prelude::*;

const TICKS: usize = 600;
const REPORT_EVERY: usize = 60;

fn run(name: &str, config: SimulationConfig, capacity: usize) -> carom::Result<()> {
    let mut simulation = Simulation::random(&config)?;
    let mut history = EnergyHistory::new(capacity);
    let center = Vector::new(config.extents.iter().map(|e| e / 2.0).collect());

    for tick in 1..=TICKS {
        let report = simulation.step()?;
        history.push(simulation.kinetic_energy());

        if tick == TICKS / 2 {
            let pull = Impulse::Pull {
                center: center.clone(),
                scale: 80.0,
                cap: 300.0,
            };
            let affected = simulation.apply_impulse(&pull)?;
            log::info!("{name}: pulled {affected} bodies towards {center}");
        }

        if tick % REPORT_EVERY == 0 {
            let histogram = SpeedHistogram::from_particles(simulation.particles(), 10, 20.0)?;
            log::info!(
                "{name}: tick {tick}, energy {:.1} (max {:.1}), {} contacts, slowest bin {:.0}%",
                history.latest().unwrap_or_default(),
                history.max().unwrap_or_default(),
                report.resolved,
                100.0 * histogram.fraction(0),
            );
        }
    }

    Ok(())
}

fn main() -> carom::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    run("planar", SimulationConfig::planar(), stats::PLANAR_HISTORY)?;
    run("spatial", SimulationConfig::spatial(), stats::SPATIAL_HISTORY)?;

    Ok(())
}
