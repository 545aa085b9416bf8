//! Project metadata fetched from the service, and name-to-id resolution.
//!
//! Field and dataset names are matched exactly (case-sensitive). When the
//! service reports two entries with the same name, the first one wins; the
//! service does not guarantee uniqueness, so neither do we.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A column definition within a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Service-assigned id; numeric ids are kept in decimal form.
    #[serde(deserialize_with = "id_string")]
    pub id: String,

    /// Display name.
    pub name: String,
}

impl FieldDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A dataset within a project, with the full object the service returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub id: String,
    pub name: String,
    pub raw: Value,
}

impl DatasetSummary {
    /// Values of one field, one per row, in row order.
    ///
    /// Returns `None` when the dataset carries no `data` row array. Cells that
    /// are missing or null come back as empty strings.
    pub fn column(&self, field_id: &str) -> Option<Vec<String>> {
        let rows = self.raw.get("data")?.as_array()?;

        Some(
            rows.iter()
                .map(|row| row.get(field_id).map(cell_to_string).unwrap_or_default())
                .collect(),
        )
    }

    /// Number of rows in the dataset, if rows were included.
    pub fn row_count(&self) -> Option<usize> {
        self.raw.get("data")?.as_array().map(Vec::len)
    }
}

/// Everything returned by a recursive project fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectSnapshot {
    pub fields: Vec<FieldDefinition>,
    pub datasets: Vec<DatasetSummary>,
    pub media_objects: Vec<Value>,
    pub owner: Map<String, Value>,
}

/// Session-scoped cache of fetched metadata.
#[derive(Debug, Clone, Default)]
pub struct MetadataCache {
    fields: Vec<FieldDefinition>,
    snapshot: Option<ProjectSnapshot>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn snapshot(&self) -> Option<&ProjectSnapshot> {
        self.snapshot.as_ref()
    }

    /// Datasets from the last recursive fetch (empty if never fetched).
    pub fn datasets(&self) -> &[DatasetSummary] {
        self.snapshot
            .as_ref()
            .map(|s| s.datasets.as_slice())
            .unwrap_or_default()
    }

    pub fn set_fields(&mut self, fields: Vec<FieldDefinition>) {
        self.fields = fields;
    }

    /// Store a recursive fetch. Its field list replaces the cached one too.
    pub fn set_snapshot(&mut self, snapshot: ProjectSnapshot) {
        self.fields = snapshot.fields.clone();
        self.snapshot = Some(snapshot);
    }

    pub fn clear(&mut self) {
        self.fields.clear();
        self.snapshot = None;
    }

    /// Id of the first field named `name`.
    pub fn resolve_field_id(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.id.as_str())
    }

    /// Id of the first dataset named `name`.
    pub fn resolve_dataset_id(&self, name: &str) -> Option<&str> {
        self.datasets()
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.id.as_str())
    }

    pub fn dataset(&self, id: &str) -> Option<&DatasetSummary> {
        self.datasets().iter().find(|d| d.id == id)
    }
}

#[derive(Deserialize)]
struct ProjectResponse {
    fields: Vec<FieldDefinition>,
}

#[derive(Deserialize)]
struct RecursiveProjectResponse {
    fields: Vec<FieldDefinition>,
    #[serde(default, rename = "dataSets")]
    data_sets: Vec<Value>,
    #[serde(default, rename = "mediaObjects")]
    media_objects: Vec<Value>,
    #[serde(default)]
    owner: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct DatasetHeader {
    #[serde(deserialize_with = "id_string")]
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct ProjectListing {
    name: String,
}

/// Parse the `fields` array of `GET /projects/{id}`.
pub fn parse_fields(body: &[u8]) -> serde_json::Result<Vec<FieldDefinition>> {
    let response: ProjectResponse = serde_json::from_slice(body)?;
    Ok(response.fields)
}

/// Parse `GET /projects/{id}?recur=true`.
pub fn parse_snapshot(body: &[u8]) -> serde_json::Result<ProjectSnapshot> {
    let response: RecursiveProjectResponse = serde_json::from_slice(body)?;

    let datasets = response
        .data_sets
        .into_iter()
        .map(|raw| -> serde_json::Result<DatasetSummary> {
            let header = DatasetHeader::deserialize(&raw)?;
            Ok(DatasetSummary {
                id: header.id,
                name: header.name,
                raw,
            })
        })
        .collect::<serde_json::Result<Vec<_>>>()?;

    Ok(ProjectSnapshot {
        fields: response.fields,
        datasets,
        media_objects: response.media_objects,
        owner: response.owner.unwrap_or_default(),
    })
}

/// Parse the project names out of a search response.
pub fn parse_project_names(body: &[u8]) -> serde_json::Result<Vec<String>> {
    let projects: Vec<ProjectListing> = serde_json::from_slice(body)?;
    Ok(projects.into_iter().map(|p| p.name).collect())
}

/// Accept ids sent either as JSON strings or numbers.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected a string or numeric id, got {}",
            other
        ))),
    }
}

fn cell_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
