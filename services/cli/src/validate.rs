use crate::infra::{shared_state, UnitDataKind};
use clap::Args;
use screening_gate::config::AppConfig;
use screening_gate::error::AppError;
use screening_gate::screening::{RunArgs, ScreeningConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Run arguments JSON file (defaults to SCREENING_ARGS_PATH)
    #[arg(long)]
    pub(crate) args: Option<PathBuf>,
    /// Shape of the screening unit data supplied in shared state
    #[arg(long, value_enum, default_value_t = UnitDataKind::Generator)]
    pub(crate) unit_data: UnitDataKind,
}

pub(crate) fn run_validation(args: ValidateArgs, config: &AppConfig) -> Result<(), AppError> {
    let path = config.run.resolve_args_path(args.args)?;
    let run_args = RunArgs::from_path(&path)?;
    let shared = shared_state(args.unit_data, 1);

    ScreeningConfig::assert_valid(&run_args, &shared)?;

    match ScreeningConfig::from_blueprint(&run_args.blueprint)? {
        Some(screening) => {
            info!(path = %path.display(), %screening, "screening configuration valid");
            println!("screening enabled: {screening}");
        }
        None => {
            info!(path = %path.display(), "screening disabled");
            println!("screening disabled");
        }
    }
    Ok(())
}
