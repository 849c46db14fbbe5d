/* 3rd party libraries */
use clap::{Arg, Command};
use env_logger::Env;
use log::info;

/* Custom libraries */
use elevator::ElevatorRegistry;
use server::AppState;
use service::DriveMode;

/* Modules */
mod config;
mod elevator;
mod server;
mod service;
mod shared;

fn cli() -> Command<'static> {
    Command::new("elevator-bank")
        .about("Simulates a bank of elevators behind an HTTP interface")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .takes_value(true)
                .default_value("config.toml")
                .help("Configuration file"),
        )
        .arg(
            Arg::new("no-simulation")
                .long("no-simulation")
                .help("Run server without simulating elevators"),
        )
}

/* Main */
#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();
    let config_path = matches.value_of("config").unwrap_or("config.toml");

    // Load the configuration
    let config = unwrap_or_exit!(config::load_config(config_path), "Failed to load configuration");

    // Build the elevators
    let mut registry = ElevatorRegistry::new();
    unwrap_or_exit!(
        registry.add_from_config(&config.elevators),
        "Invalid elevator configuration"
    );

    // Pick exactly one driver for the elevators
    let mode = if matches.is_present("no-simulation") {
        DriveMode::PerRequest
    } else {
        DriveMode::Simulation(config.simulation.tick_interval())
    };

    // Start the elevator service
    let service = unwrap_or_exit!(
        service::start(registry, mode),
        "Failed to start elevator service"
    );

    // Serve requests until a shutdown signal arrives
    let state = AppState {
        service: service.handle.clone(),
    };
    let result = server::run(&config.server, state).await;

    service.shutdown();
    unwrap_or_exit!(result, "Web server failed");
    info!("Shutting down the application");
}
