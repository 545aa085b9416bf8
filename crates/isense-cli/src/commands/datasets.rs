//! Datasets command - list a project's datasets with row counts.

use colored::Colorize;
use isense::ClientConfig;
use serde_json::json;

use super::project_client;

pub fn run(
    config: ClientConfig,
    project: &str,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = project_client(config, project)?;
    let snapshot = client.fetch_datasets_and_media()?;

    if json_output {
        let datasets: Vec<_> = snapshot
            .datasets
            .iter()
            .map(|d| json!({"id": d.id, "name": d.name, "rows": d.row_count()}))
            .collect();
        let out = json!({
            "project": project,
            "datasets": datasets,
            "media_objects": snapshot.media_objects.len(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{} {}", "Datasets of project".cyan().bold(), project.white());
    if snapshot.datasets.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for dataset in &snapshot.datasets {
        let rows = dataset
            .row_count()
            .map(|n| format!("{} rows", n))
            .unwrap_or_else(|| "no rows".to_string());
        println!("  {:>8}  {}  {}", dataset.id.dimmed(), dataset.name, rows.dimmed());
    }
    if !snapshot.media_objects.is_empty() {
        println!();
        println!("Media objects: {}", snapshot.media_objects.len());
    }

    Ok(())
}
