//! Steward CLI - data-quality and privacy profiling for tabular data.

mod cli;
mod commands;
mod logging;

use std::io::IsTerminal;

use clap::Parser;
use cli::{Cli, Commands};
use logging::{LogConfig, init_logging};

fn main() {
    // A missing .env is fine; credentials may come from the environment.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(
        &LogConfig::from_verbosity(cli.verbose)
            .with_format(cli.log_format)
            .with_ansi(std::io::stderr().is_terminal()),
    );

    let result = commands::load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Quality { file, json } => commands::quality::run(file, json, config),

        Commands::Recommend {
            file,
            judge,
            model,
            batch,
            output,
            json,
        } => commands::recommend::run(
            file,
            commands::recommend::JudgeOptions { judge, model, batch },
            output,
            json,
            config,
        ),

        Commands::Apply {
            file,
            feedback,
            output,
            format,
            report,
        } => commands::apply::run(file, feedback, output, format, report, config),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
