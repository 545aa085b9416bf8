//! iSENSE CLI - search projects and upload data to iSENSE.

mod cli;
mod commands;
mod logging;

use std::time::Duration;

use clap::Parser;
use cli::{Cli, Commands};
use isense::ClientConfig;

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = client_config(ClientConfig::from_env()?, cli.api_url, cli.timeout);

    match cli.command {
        Commands::Search { term, json } => commands::search::run(config, &term, json),

        Commands::Fields { project, json } => commands::fields::run(config, &project, json),

        Commands::Datasets { project, json } => commands::datasets::run(config, &project, json),

        Commands::Values {
            project,
            dataset,
            field,
            json,
        } => commands::values::run(config, &project, &dataset, &field, json),

        Commands::CheckUser { email, password } => {
            commands::check_user::run(config, &email, &password)
        }

        Commands::Upload(args) => commands::upload::run(config, args),
    }
}

/// Apply command-line overrides on top of the environment configuration.
fn client_config(
    mut config: ClientConfig,
    api_url: Option<String>,
    timeout: Option<u64>,
) -> ClientConfig {
    if let Some(url) = api_url {
        config = config.with_api_url(url);
    }
    if let Some(secs) = timeout {
        config = config.with_timeout((secs > 0).then(|| Duration::from_secs(secs)));
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let config = client_config(
            ClientConfig::default(),
            Some("http://localhost:3000/api/v1/".to_string()),
            Some(5),
        );
        assert_eq!(config.api_url, "http://localhost:3000/api/v1");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));

        let config = client_config(ClientConfig::default(), None, Some(0));
        assert_eq!(config.timeout, None);
        assert_eq!(config.api_url, ClientConfig::default().api_url);
    }

    #[test]
    fn test_no_overrides_keep_defaults() {
        let config = client_config(ClientConfig::default(), None, None);
        assert_eq!(config.timeout, ClientConfig::default().timeout);
    }
}
