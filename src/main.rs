//! Lockstep Body headless runner
//!
//! Runs a seeded scenario headlessly and prints the final state checksum.
//! Two machines that print different checksums for the same arguments have
//! diverged.
//!
//! Usage: `lockstep-body [seed] [ticks] [bodies] [--json]`

use std::process::ExitCode;

use clap::Parser;
use lockstep_body::consts::{DEFAULT_SCENARIO_BODIES, DEFAULT_SCENARIO_TICKS};
use lockstep_body::sim::Scenario;
use lockstep_body::{BodyError, SimConfig, TransformBuffer};

/// Run a seeded body scenario and print its state checksum
#[derive(Debug, Parser)]
#[command(name = "lockstep-body", version)]
struct Args {
    /// Scenario seed
    #[arg(default_value_t = 1)]
    seed: u64,
    /// Ticks to simulate
    #[arg(default_value_t = DEFAULT_SCENARIO_TICKS)]
    ticks: u64,
    /// Bodies to generate
    #[arg(default_value_t = DEFAULT_SCENARIO_BODIES)]
    bodies: usize,
    /// Also print the final state as JSON
    #[arg(long)]
    json: bool,
}

fn run(args: &Args) -> Result<(), BodyError> {
    let mut scenario = Scenario::generate(args.seed, args.bodies, SimConfig::default())?;
    let mut transforms = TransformBuffer::new();
    for _ in 0..args.ticks {
        scenario.step(&mut transforms)?;
    }

    let ctx = scenario.ctx();
    log::info!(
        "Ran {} ticks over {} bodies ({} position syncs, {} rotation syncs)",
        ctx.tick(),
        ctx.len(),
        transforms.position_syncs(),
        transforms.rotation_syncs()
    );
    println!("{:016x}", ctx.checksum());
    if args.json {
        println!("{}", serde_json::to_string_pretty(&ctx.snapshot())?);
    }
    Ok(())
}

fn main() -> ExitCode {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let args = Args::parse();
    log::info!("Lockstep run starting with seed: {}", args.seed);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
