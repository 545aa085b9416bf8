//! CLI command implementations.

pub mod check_user;
pub mod datasets;
pub mod fields;
pub mod search;
pub mod upload;
pub mod values;

use isense::{ClientConfig, IsenseClient};

/// Open a client on `project` with its fields loaded.
pub(crate) fn project_client(
    config: ClientConfig,
    project: &str,
) -> Result<IsenseClient, Box<dyn std::error::Error>> {
    let mut client = IsenseClient::with_config(config)?;
    client.set_project(project);

    if !client.fields_loaded() {
        let reason = client
            .last_diagnostic()
            .map(|d| d.message.clone())
            .unwrap_or_else(|| format!("project {} has no fields", project));
        return Err(reason.into());
    }
    Ok(client)
}
