//! Session state: project context, credentials, and the data waiting to be uploaded.

use chrono::Utc;
use indexmap::IndexMap;

/// Label used until the caller sets one.
pub const DEFAULT_LABEL: &str = "label";

/// What the default label becomes when an upload is submitted.
pub const SUBMIT_LABEL: &str = "cURL";

/// Mutable per-client state.
///
/// Field data keeps insertion order of field names; value sequences are not
/// required to have equal lengths and are sent as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub(crate) project_id: Option<String>,
    pub(crate) dataset_id: Option<String>,
    pub(crate) title: String,
    pub(crate) contributor_key: Option<String>,
    pub(crate) contributor_label: String,
    pub(crate) email: Option<String>,
    pub(crate) password: Option<String>,
    pub(crate) field_data: IndexMap<String, Vec<String>>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            project_id: None,
            dataset_id: None,
            title: String::new(),
            contributor_key: None,
            contributor_label: DEFAULT_LABEL.to_string(),
            email: None,
            password: None,
            field_data: IndexMap::new(),
        }
    }
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for contributor-key uploads.
    pub fn with_project(
        project_id: impl Into<String>,
        title: impl Into<String>,
        label: impl Into<String>,
        contributor_key: impl Into<String>,
    ) -> Self {
        Self {
            project_id: Some(project_id.into()),
            title: title.into(),
            contributor_label: label.into(),
            contributor_key: Some(contributor_key.into()),
            ..Self::default()
        }
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn dataset_id(&self) -> Option<&str> {
        self.dataset_id.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn contributor_key(&self) -> Option<&str> {
        self.contributor_key.as_deref()
    }

    pub fn contributor_label(&self) -> &str {
        &self.contributor_label
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Pushed data, keyed by field name.
    pub fn field_data(&self) -> &IndexMap<String, Vec<String>> {
        &self.field_data
    }

    /// Values pushed for one field.
    pub fn values(&self, field_name: &str) -> Option<&[String]> {
        self.field_data.get(field_name).map(Vec::as_slice)
    }

    pub(crate) fn set_project_id(&mut self, project_id: impl Into<String>) {
        self.project_id = Some(project_id.into());
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.contributor_label = label.into();
    }

    pub fn set_contributor_key(&mut self, key: impl Into<String>) {
        self.contributor_key = Some(key.into());
    }

    pub fn set_dataset_id(&mut self, dataset_id: impl Into<String>) {
        self.dataset_id = Some(dataset_id.into());
    }

    pub fn set_credentials(&mut self, email: impl Into<String>, password: impl Into<String>) {
        self.email = Some(email.into());
        self.password = Some(password.into());
    }

    /// Append one value to a field.
    pub fn push_back(&mut self, field_name: impl Into<String>, value: impl Into<String>) {
        self.field_data
            .entry(field_name.into())
            .or_default()
            .push(value.into());
    }

    /// Replace all values of a field.
    pub fn push_vector(&mut self, field_name: impl Into<String>, values: Vec<String>) {
        self.field_data.insert(field_name.into(), values);
    }

    /// Reset to the empty state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Replace the default label with the submit label.
    pub(crate) fn normalize_label(&mut self) {
        if self.contributor_label.is_empty() || self.contributor_label == DEFAULT_LABEL {
            self.contributor_label = SUBMIT_LABEL.to_string();
        }
    }
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn generate_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// True when an optional string is present and non-empty.
pub(crate) fn is_set(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_back_preserves_order() {
        let mut session = Session::new();
        session.push_back("Number", "1");
        session.push_back("Text", "a");
        session.push_back("Number", "2");

        let names: Vec<&str> = session.field_data().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Number", "Text"]);
        assert_eq!(session.values("Number").unwrap(), ["1", "2"]);
    }

    #[test]
    fn test_push_vector_replaces() {
        let mut session = Session::new();
        session.push_back("Number", "1");
        session.push_vector("Number", vec!["7".to_string(), "8".to_string()]);
        assert_eq!(session.values("Number").unwrap(), ["7", "8"]);
    }

    #[test]
    fn test_clear_restores_defaults() {
        let mut session = Session::with_project("1006", "Title", "Boost", "123");
        session.set_credentials("j@j.j", "j");
        session.push_back("Number", "1");

        session.clear();

        assert_eq!(session, Session::default());
        assert_eq!(session.contributor_label(), DEFAULT_LABEL);
    }

    #[test]
    fn test_normalize_label() {
        let mut session = Session::new();
        session.normalize_label();
        assert_eq!(session.contributor_label(), SUBMIT_LABEL);

        let mut session = Session::new();
        session.set_label("");
        session.normalize_label();
        assert_eq!(session.contributor_label(), SUBMIT_LABEL);

        let mut session = Session::new();
        session.set_label("Boost");
        session.normalize_label();
        assert_eq!(session.contributor_label(), "Boost");
    }

    #[test]
    fn test_timestamp_format() {
        let ts = generate_timestamp();
        assert_eq!(ts.len(), "2011-10-08T07:07:09Z".len());
        assert!(ts.ends_with('Z'));
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, "%Y-%m-%dT%H:%M:%SZ").is_ok());
    }

    #[test]
    fn test_is_set() {
        assert!(!is_set(None));
        assert!(!is_set(Some("")));
        assert!(is_set(Some("x")));
    }
}
