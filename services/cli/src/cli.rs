use crate::simulate::{run_simulation, SimulateArgs};
use crate::validate::{run_validation, ValidateArgs};
use clap::{Parser, Subcommand};
use screening_gate::config::AppConfig;
use screening_gate::error::AppError;
use screening_gate::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "screening-gate",
    about = "Validate screening run arguments and simulate a screened task run",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pre-launch validation pass against a run arguments file
    Validate(ValidateArgs),
    /// Screen a batch of simulated workers against an in-memory store
    Simulate(SimulateArgs),
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Validate(args) => run_validation(args, &config),
        Command::Simulate(args) => run_simulation(args, &config).await,
    }
}
