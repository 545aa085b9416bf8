//! Values command - print one field's column from a dataset.

use isense::ClientConfig;

use super::project_client;

pub fn run(
    config: ClientConfig,
    project: &str,
    dataset: &str,
    field: &str,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = project_client(config, project)?;
    let values = client.field_values(dataset, field)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&values)?);
    } else {
        for value in &values {
            println!("{}", value);
        }
    }

    Ok(())
}
