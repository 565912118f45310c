use clap::Parser;
use presentation::cli::{report_config_error, report_error, Cli, CliApp};
use shared::telemetry::init_tracing;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let app = match CliApp::from_env() {
        Ok(app) => app,
        Err(err) => {
            report_config_error(&err);
            return ExitCode::from(2);
        }
    };
    match app.run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}
