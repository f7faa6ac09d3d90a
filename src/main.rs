use std::process::ExitCode;

use clap::Parser;
use log::error;

use distrogate::cmd::App;
use distrogate::logs;

#[tokio::main]
async fn main() -> ExitCode {
    let app = App::parse();

    if let Err(err) = logs::init(&app.log_level) {
        eprintln!("Init logs error: {err:#}");
        return ExitCode::FAILURE;
    }

    match app.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Command error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
