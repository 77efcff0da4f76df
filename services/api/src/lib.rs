mod analyze;
mod cli;
mod infra;
mod routes;
mod server;

use affimark::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
