//! Check-user command - verify an email and password.

use colored::Colorize;
use isense::{ClientConfig, IsenseClient};

pub fn run(
    config: ClientConfig,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = IsenseClient::with_config(config)?;

    if client.authenticate(email, password)? {
        println!("{} {}", "Credentials accepted for".green(), email);
        Ok(())
    } else {
        let hint = client
            .last_diagnostic()
            .map(|d| d.message.clone())
            .unwrap_or_default();
        Err(format!("credentials rejected for {} ({})", email, hint).into())
    }
}
