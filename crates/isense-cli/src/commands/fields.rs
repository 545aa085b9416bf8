//! Fields command - show a project's field ids and names.

use colored::Colorize;
use isense::ClientConfig;

use super::project_client;

pub fn run(
    config: ClientConfig,
    project: &str,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = project_client(config, project)?;
    let fields = client.fields();

    if json_output {
        println!("{}", serde_json::to_string_pretty(fields)?);
        return Ok(());
    }

    println!("{} {}", "Fields of project".cyan().bold(), project.white());
    for field in fields {
        println!("  {:>8}  {}", field.id.dimmed(), field.name);
    }

    Ok(())
}
