mod cli;
mod infra;
mod simulate;
mod validate;

use screening_gate::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
