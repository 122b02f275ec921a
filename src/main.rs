use std::env;
use std::process::ExitCode;

use clap::Parser;
use dotenvy::dotenv;

use pushkind_backoffice::commands::{self, AppContext, Cli};
use pushkind_backoffice::models::config::AppConfig;
use pushkind_backoffice::services::FallbackView;

fn main() -> ExitCode {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cli = Cli::parse();

    // Select config profile (defaults to `local`).
    let app_env = cli
        .profile
        .clone()
        .or_else(|| env::var("APP_ENV").ok())
        .unwrap_or_else(|| "local".into());

    let config = match AppConfig::load(&cli.config_dir, &app_env) {
        Ok(config) => config,
        Err(err) => {
            log::error!("Error loading app config: {err}");
            return ExitCode::FAILURE;
        }
    };

    let context = match AppContext::new(config) {
        Ok(context) => context,
        Err(err) => {
            log::error!("Failed to initialise client state: {err}");
            return ExitCode::FAILURE;
        }
    };

    match commands::run(&context, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let view = err.fallback();
            log::debug!("Command failed: {err}");
            eprintln!("{}", view.message());
            if view == FallbackView::Unexpected {
                eprintln!("{err}");
            }
            match view {
                FallbackView::LoginRequired => ExitCode::from(2),
                FallbackView::NotFound => ExitCode::from(3),
                FallbackView::Unexpected => ExitCode::FAILURE,
            }
        }
    }
}
