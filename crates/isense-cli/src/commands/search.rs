//! Search command - list projects matching a term.

use colored::Colorize;
use isense::{ClientConfig, IsenseClient};

pub fn run(
    config: ClientConfig,
    term: &str,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = IsenseClient::with_config(config)?;
    let names = client.search_projects(term)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&names)?);
        return Ok(());
    }

    if names.is_empty() {
        println!("{} '{}'", "No projects match".yellow(), term);
        return Ok(());
    }

    println!(
        "{} {}",
        names.len().to_string().white().bold(),
        "matching projects, most recently updated first:".cyan()
    );
    for name in &names {
        println!("  {}", name);
    }

    Ok(())
}
