//! Sidekick CLI - turn a fresh VPS into an application host

use std::process::ExitCode;

use clap::Parser;

use sidekick_cli::app;
use sidekick_cli::cli::Cli;
use sidekick_cli::logging;
use sidekick_cli::output::json;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.no_color);
    let json_mode = cli.json;

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json_mode {
                match json::format_error(&format!("{e:#}"), app::error_code(&e)) {
                    Ok(text) => println!("{text}"),
                    Err(_) => eprintln!("Error: {e:#}"),
                }
            } else {
                eprintln!("Error: {e:#}");
            }
            ExitCode::from(app::exit_code(&e))
        }
    }
}
