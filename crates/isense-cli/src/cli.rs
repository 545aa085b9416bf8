//! CLI argument definitions using clap.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// iSENSE: search projects and upload data to the iSENSE repository
#[derive(Parser)]
#[command(name = "isense")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL (overrides ISENSE_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Request timeout in seconds, 0 for none (overrides ISENSE_TIMEOUT_SECS)
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search projects by name
    Search {
        /// Search term
        term: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List a project's fields
    Fields {
        /// Project ID
        project: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List a project's datasets
    Datasets {
        /// Project ID
        project: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print one field's values from a dataset
    Values {
        /// Project ID
        project: String,

        /// Dataset name
        dataset: String,

        /// Field name
        field: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check an email and password against the service
    CheckUser {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long)]
        password: String,
    },

    /// Upload a CSV file as a new dataset or append it to an existing one
    Upload(UploadArgs),
}

#[derive(Args)]
pub struct UploadArgs {
    /// Project ID
    pub project: String,

    /// CSV file whose header row names the project's fields
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Dataset title
    #[arg(short, long)]
    pub title: String,

    /// Contributor key (cannot use with --email)
    #[arg(short, long, conflicts_with = "email", required_unless_present = "email")]
    pub key: Option<String>,

    /// Contributor label shown on the dataset
    #[arg(short, long, default_value = "label")]
    pub label: String,

    /// Account email (requires --password)
    #[arg(long, requires = "password")]
    pub email: Option<String>,

    /// Account password
    #[arg(long)]
    pub password: Option<String>,

    /// Append to the dataset with this ID
    #[arg(long, conflicts_with = "dataset_name")]
    pub dataset_id: Option<String>,

    /// Append to the dataset with this name
    #[arg(long)]
    pub dataset_name: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_with_key() {
        let cli = Cli::try_parse_from([
            "isense", "upload", "1006", "data.csv", "--title", "Run 1", "--key", "123",
        ])
        .unwrap();

        match cli.command {
            Commands::Upload(args) => {
                assert_eq!(args.project, "1006");
                assert_eq!(args.key.as_deref(), Some("123"));
                assert_eq!(args.label, "label");
                assert!(args.dataset_id.is_none());
            }
            _ => panic!("expected upload"),
        }
    }

    #[test]
    fn test_upload_requires_credentials() {
        let result =
            Cli::try_parse_from(["isense", "upload", "1006", "data.csv", "--title", "Run 1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_key_and_email_conflict() {
        let result = Cli::try_parse_from([
            "isense", "upload", "1006", "data.csv", "-t", "T", "--key", "1", "--email", "j@j.j",
            "--password", "j",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "isense", "search", "weather", "-vv", "--api-url", "http://localhost:3000/api/v1",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:3000/api/v1"));
        assert_eq!(cli.timeout, None);
    }

    #[test]
    fn test_timeout_flag() {
        let cli = Cli::try_parse_from(["isense", "fields", "1006", "--timeout", "5"]).unwrap();
        assert_eq!(cli.timeout, Some(5));

        assert!(Cli::try_parse_from(["isense", "fields", "1006", "--timeout", "soon"]).is_err());
    }
}
