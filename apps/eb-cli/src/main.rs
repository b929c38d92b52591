use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Timelike, Utc};
use clap::{Parser, Subcommand};
use eb_powerhub::{
    PowerHub, PowerHubControlState, PowerHubController, PowerHubResult, PowerHubSchedules, PowerHubSensors, Setpoints,
    SimulationConfig, control_power_hub, encode_control, initial_control_state, load_config,
};
use eb_sim::run_sim;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Battery state of charge assumed by simulations; the battery is not modelled.
const SIMULATED_BATTERY_SOC: f64 = 0.8;

#[derive(Parser)]
#[command(name = "eb-cli")]
#[command(about = "Energy box CLI - power hub simulation and control", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a closed-loop simulation of the power hub
    Simulate {
        /// Simulation config (YAML, or JSON by extension)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of steps, overrides the config
        #[arg(long)]
        steps: Option<u64>,
        /// Step size in seconds, overrides the config
        #[arg(long)]
        step_size: Option<i64>,
        /// Write recorded states as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show setpoints with their descriptions
    Setpoints {
        /// Setpoints JSON to validate and show instead of the defaults
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Evaluate one control step from a sensor snapshot
    Control {
        /// Sensor snapshot JSON
        #[arg(short, long)]
        sensors: PathBuf,
        /// Setpoints JSON, defaults otherwise
        #[arg(long)]
        setpoints: Option<PathBuf>,
    },
}

fn main() -> PowerHubResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            config,
            steps,
            step_size,
            output,
        } => cmd_simulate(config.as_deref(), steps, step_size, output.as_deref()),
        Commands::Setpoints { file } => cmd_setpoints(file.as_deref()),
        Commands::Control { sensors, setpoints } => cmd_control(&sensors, setpoints.as_deref()),
    }
}

fn read_setpoints(path: Option<&Path>) -> PowerHubResult<Setpoints> {
    match path {
        Some(path) => Setpoints::from_json(&fs::read_to_string(path)?),
        None => Ok(Setpoints::default()),
    }
}

fn cmd_simulate(
    config_path: Option<&Path>,
    steps: Option<u64>,
    step_size: Option<i64>,
    output: Option<&Path>,
) -> PowerHubResult<()> {
    let mut config = match config_path {
        Some(path) => load_config(path)?,
        // start of the current minute
        None => {
            let now = Utc::now();
            SimulationConfig::new(
                now.with_second(0)
                    .and_then(|t| t.with_nanosecond(0))
                    .unwrap_or(now),
            )
        }
    };
    if let Some(steps) = steps {
        config.steps = steps;
    }
    if let Some(step_size) = step_size {
        config.step_size_seconds = step_size;
    }
    config.validate()?;

    println!(
        "Simulating {} steps of {} s from {}",
        config.steps, config.step_size_seconds, config.start
    );

    let hub = PowerHub::power_hub(PowerHubSchedules::const_schedules())?;
    let initial = hub.initial_state(config.simulation_time())?;
    let mut controller =
        PowerHubController::new(&hub, config.setpoints.clone(), SIMULATED_BATTERY_SOC);
    let record = run_sim(hub.network(), initial, &mut controller, &config.sim_options())?;

    println!("✓ Simulation completed");
    println!("  Recorded states: {}", record.states.len());
    if let Some(last) = record.last() {
        let sensors = PowerHubSensors::from_state(&hub, last, SIMULATED_BATTERY_SOC)?;
        println!("  PCM temperature: {:.2} °C", sensors.pcm.temperature);
        println!(
            "  Cold reservoir temperature: {:.2} °C",
            sensors.cold_reservoir.temperature
        );
        println!(
            "  Tanks: fresh {:.3}, technical {:.3}, grey {:.3}",
            sensors.fresh_water_tank.fill_ratio,
            sensors.technical_water_tank.fill_ratio,
            sensors.grey_water_tank.fill_ratio
        );
    }
    println!(
        "  Final modes: {}",
        serde_json::to_string(&controller.control_state().modes())?
    );

    if let Some(path) = output {
        let states: Vec<_> = record
            .states
            .iter()
            .map(|state| hub.network().state_to_json(state))
            .collect();
        fs::write(path, serde_json::to_string_pretty(&states)?)?;
        info!(path = %path.display(), "Wrote recorded states");
        println!("✓ States written to {}", path.display());
    }

    Ok(())
}

fn cmd_setpoints(file: Option<&Path>) -> PowerHubResult<()> {
    let setpoints = read_setpoints(file)?;
    if file.is_some() {
        println!("✓ Setpoints are valid");
    }

    let values = serde_json::to_value(&setpoints)?;
    println!("Setpoints:");
    for (field, description) in Setpoints::descriptions() {
        let value = values.get(*field).cloned().unwrap_or_default();
        println!("  {field} = {value}");
        println!("      {description}");
    }
    Ok(())
}

fn cmd_control(sensors_path: &Path, setpoints_path: Option<&Path>) -> PowerHubResult<()> {
    let sensors = PowerHubSensors::from_json(&fs::read_to_string(sensors_path)?)?;
    let setpoints = read_setpoints(setpoints_path)?;

    let hub = PowerHub::power_hub(PowerHubSchedules::default())?;
    let state = PowerHubControlState {
        setpoints,
        ..initial_control_state()
    };
    let (next, control) = control_power_hub(&hub, &state, &sensors, sensors.time)?;

    let record = encode_control(&hub, &control, sensors.time)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    println!("Modes: {}", serde_json::to_string(&next.modes())?);
    Ok(())
}
