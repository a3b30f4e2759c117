use std::process::ExitCode;

use clap::Parser;

use geocache::config::{Cli, Command, StaticConfig};
use geocache::errors::GeocacheError;
use geocache::runtime::modes::{run_lookup, run_server};
use geocache::system::logging::{RunMode, init_logging};

#[actix_web::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let command = cli.command();

    if command == Command::Config {
        print!("{}", StaticConfig::generate_sample_config());
        return ExitCode::SUCCESS;
    }

    let mut config = match StaticConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return report_fatal(&e),
    };
    config.apply_cli(&cli);

    let mode = match command {
        Command::Lookup { .. } => RunMode::Cli,
        _ => RunMode::Server,
    };
    let _guard = match init_logging(&config.logging, mode) {
        Ok(guard) => guard,
        Err(e) => return report_fatal(&e),
    };

    let result = match command {
        Command::Lookup { addresses } => run_lookup(&config, &addresses).map(|all_ok| {
            if all_ok {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }),
        _ => run_server(config).await.map(|()| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            match e.downcast_ref::<GeocacheError>() {
                Some(inner) => eprintln!("{}", inner.format_colored()),
                None => eprintln!("[ERROR] {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn report_fatal(e: &GeocacheError) -> ExitCode {
    eprintln!("{}", e.format_colored());
    ExitCode::FAILURE
}
