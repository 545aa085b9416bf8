//! Upload command - push a CSV file to a project.

use std::path::Path;

use colored::Colorize;
use isense::{ClientConfig, IsenseClient, UploadMode};
use tracing::{debug, info};

use crate::cli::UploadArgs;

/// One CSV column: header name and cell values in row order.
pub type Column = (String, Vec<String>);

pub fn run(config: ClientConfig, args: UploadArgs) -> Result<(), Box<dyn std::error::Error>> {
    let columns = load_columns(&args.file)?;
    let rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
    info!(file = %args.file.display(), columns = columns.len(), rows, "loaded CSV");

    let mut client = IsenseClient::with_config(config)?;
    client.set_title(&args.title);
    client.set_label(&args.label);

    let mode = match (&args.key, &args.email, &args.password) {
        (Some(key), _, _) => {
            client.set_contributor_key(key);
            UploadMode::CreateByKey
        }
        (None, Some(email), Some(password)) => {
            if !client.set_email_password(email, password)? {
                return Err(format!("email/password rejected for {}", email).into());
            }
            UploadMode::CreateByEmail
        }
        _ => return Err("either --key or --email and --password are required".into()),
    };

    client.set_project(&args.project);
    if !client.fields_loaded() {
        let reason = client
            .last_diagnostic()
            .map(|d| d.message.clone())
            .unwrap_or_else(|| format!("project {} has no fields", args.project));
        return Err(reason.into());
    }

    let known: Vec<&str> = client.fields().iter().map(|f| f.name.as_str()).collect();
    let unknown = unknown_columns(&columns, &known);
    if !unknown.is_empty() {
        eprintln!(
            "{} columns not in project {} will be ignored: {}",
            "Warning:".yellow().bold(),
            args.project,
            unknown.join(", ")
        );
    }

    for (name, values) in columns {
        client.push_vector(name, values);
    }

    let receipt = if let Some(id) = &args.dataset_id {
        debug!(dataset_id = %id, "appending by id");
        client.append(mode.as_append(), id)?
    } else if let Some(name) = &args.dataset_name {
        debug!(dataset_name = %name, "appending by name");
        client.append_by_name(mode.as_append(), name)?
    } else {
        client.create(mode)?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
    } else {
        println!("{} {} rows", "Uploaded".green().bold(), rows);
        if let Some(id) = &receipt.dataset_id {
            println!("  Dataset: {}", id);
        }
        println!("  Project: {}", receipt.project_url.cyan());
    }

    Ok(())
}

/// Read a CSV file into columns keyed by header name.
///
/// Short rows are padded with empty cells so every column has one value per row.
pub fn load_columns(path: &Path) -> Result<Vec<Column>, Box<dyn std::error::Error>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let mut columns: Vec<Column> = reader
        .headers()?
        .iter()
        .map(|h| (h.to_string(), Vec::new()))
        .collect();

    if columns.is_empty() {
        return Err(format!("{} has no header row", path.display()).into());
    }

    for record in reader.records() {
        let record = record?;
        for (i, (_, values)) in columns.iter_mut().enumerate() {
            values.push(record.get(i).unwrap_or("").to_string());
        }
    }

    Ok(columns)
}

/// Header names that don't match any project field.
pub fn unknown_columns<'a>(columns: &'a [Column], known: &[&str]) -> Vec<&'a str> {
    columns
        .iter()
        .map(|(name, _)| name.as_str())
        .filter(|name| !known.contains(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_columns() {
        let file = csv_file("Timestamp, Number ,Text\n2015-06-01T10:00:00Z,1,a\n2015-06-01T10:00:05Z,2,b\n");
        let columns = load_columns(file.path()).unwrap();

        assert_eq!(columns.len(), 3);
        assert_eq!(columns[1].0, "Number");
        assert_eq!(columns[1].1, vec!["1", "2"]);
        assert_eq!(columns[2].1, vec!["a", "b"]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let file = csv_file("A,B,C\n1,2,3\n4\n");
        let columns = load_columns(file.path()).unwrap();

        assert_eq!(columns[0].1, vec!["1", "4"]);
        assert_eq!(columns[1].1, vec!["2", ""]);
        assert_eq!(columns[2].1, vec!["3", ""]);
    }

    #[test]
    fn test_header_only() {
        let file = csv_file("A,B\n");
        let columns = load_columns(file.path()).unwrap();

        assert_eq!(columns.len(), 2);
        assert!(columns.iter().all(|(_, v)| v.is_empty()));
    }

    #[test]
    fn test_empty_file_is_error() {
        let file = csv_file("");
        assert!(load_columns(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_columns(Path::new("/nonexistent/data.csv")).is_err());
    }

    #[test]
    fn test_unknown_columns() {
        let columns = vec![
            ("Number".to_string(), vec![]),
            ("Wind".to_string(), vec![]),
        ];
        assert_eq!(unknown_columns(&columns, &["Number", "Text"]), vec!["Wind"]);
    }
}
