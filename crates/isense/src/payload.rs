//! Upload payload construction.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::{IsenseError, Result};
use crate::metadata::FieldDefinition;
use crate::session::{DEFAULT_LABEL, SUBMIT_LABEL, Session};

/// The four ways data can be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadMode {
    /// New dataset, authenticated by contributor key.
    CreateByKey,
    /// Append to a dataset, authenticated by contributor key.
    AppendByKey,
    /// New dataset, authenticated by email/password.
    CreateByEmail,
    /// Append to a dataset, authenticated by email/password.
    AppendByEmail,
}

impl UploadMode {
    pub const ALL: [UploadMode; 4] = [
        UploadMode::CreateByKey,
        UploadMode::AppendByKey,
        UploadMode::CreateByEmail,
        UploadMode::AppendByEmail,
    ];

    pub fn uses_key(self) -> bool {
        matches!(self, UploadMode::CreateByKey | UploadMode::AppendByKey)
    }

    pub fn uses_email(self) -> bool {
        matches!(self, UploadMode::CreateByEmail | UploadMode::AppendByEmail)
    }

    pub fn is_append(self) -> bool {
        matches!(self, UploadMode::AppendByKey | UploadMode::AppendByEmail)
    }

    /// The append mode using the same credentials as this one.
    pub fn as_append(self) -> Self {
        match self {
            UploadMode::CreateByKey | UploadMode::AppendByKey => UploadMode::AppendByKey,
            UploadMode::CreateByEmail | UploadMode::AppendByEmail => UploadMode::AppendByEmail,
        }
    }
}

impl fmt::Display for UploadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UploadMode::CreateByKey => "create_by_key",
            UploadMode::AppendByKey => "append_by_key",
            UploadMode::CreateByEmail => "create_by_email",
            UploadMode::AppendByEmail => "append_by_email",
        };
        f.write_str(s)
    }
}

/// Build the JSON body for an upload.
///
/// Every cached field gets an entry under `data`, keyed by field id, holding the
/// values pushed under that field's name (an empty array if none were pushed).
/// Value sequences of different lengths are passed through unchanged.
pub fn build_payload(
    session: &Session,
    fields: &[FieldDefinition],
    mode: UploadMode,
) -> Result<Value> {
    const OP: &str = "build_payload";

    if fields.is_empty() {
        return Err(IsenseError::config(
            OP,
            "project fields have not been fetched",
        ));
    }

    let mut body = Map::new();
    body.insert("title".to_string(), Value::from(session.title()));

    match mode {
        UploadMode::CreateByKey => {
            body.insert("contribution_key".to_string(), opt_value(session.contributor_key()));
            body.insert(
                "contributor_name".to_string(),
                Value::from(submit_label(session.contributor_label())),
            );
        }
        UploadMode::AppendByKey => {
            body.insert("contribution_key".to_string(), opt_value(session.contributor_key()));
            body.insert("id".to_string(), dataset_id(session)?);
        }
        UploadMode::CreateByEmail => {
            body.insert("email".to_string(), opt_value(session.email()));
            body.insert("password".to_string(), opt_value(session.password()));
        }
        UploadMode::AppendByEmail => {
            body.insert("email".to_string(), opt_value(session.email()));
            body.insert("password".to_string(), opt_value(session.password()));
            body.insert("id".to_string(), dataset_id(session)?);
        }
    }

    let data: Map<String, Value> = fields
        .iter()
        .map(|field| {
            let values = session
                .values(&field.name)
                .map(|v| v.iter().cloned().map(Value::String).collect())
                .unwrap_or_default();
            (field.id.clone(), Value::Array(values))
        })
        .collect();

    body.insert("data".to_string(), Value::Object(data));

    Ok(Value::Object(body))
}

fn dataset_id(session: &Session) -> Result<Value> {
    session
        .dataset_id()
        .filter(|id| !id.is_empty())
        .map(Value::from)
        .ok_or_else(|| IsenseError::config("build_payload", "missing dataset id"))
}

fn opt_value(value: Option<&str>) -> Value {
    Value::from(value.unwrap_or_default())
}

fn submit_label(label: &str) -> &str {
    if label.is_empty() || label == DEFAULT_LABEL {
        SUBMIT_LABEL
    } else {
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("4210", "Timestamp"),
            FieldDefinition::new("4211", "Number"),
            FieldDefinition::new("4212", "Text"),
        ]
    }

    fn session() -> Session {
        let mut session = Session::with_project("1006", "TITLE", "label", "123");
        session.push_back("Number", "1");
        session.push_back("Number", "2");
        session.push_back("Text", "ABC");
        session
    }

    #[test]
    fn test_create_by_key_body() {
        let payload = build_payload(&session(), &fields(), UploadMode::CreateByKey).unwrap();

        assert_eq!(
            payload,
            json!({
                "title": "TITLE",
                "contribution_key": "123",
                "contributor_name": "cURL",
                "data": {
                    "4210": [],
                    "4211": ["1", "2"],
                    "4212": ["ABC"]
                }
            })
        );
    }

    #[test]
    fn test_custom_label_kept() {
        let mut session = session();
        session.set_label("Boost");
        let payload = build_payload(&session, &fields(), UploadMode::CreateByKey).unwrap();
        assert_eq!(payload["contributor_name"], "Boost");
    }

    #[test]
    fn test_append_by_key_body() {
        let mut session = session();
        session.set_dataset_id("8715");
        let payload = build_payload(&session, &fields(), UploadMode::AppendByKey).unwrap();

        assert_eq!(payload["id"], "8715");
        assert_eq!(payload["contribution_key"], "123");
        assert!(payload.get("contributor_name").is_none());
        assert!(payload.get("email").is_none());
    }

    #[test]
    fn test_email_modes() {
        let mut session = session();
        session.set_credentials("j@j.j", "j");
        session.set_dataset_id("8715");

        let create = build_payload(&session, &fields(), UploadMode::CreateByEmail).unwrap();
        assert_eq!(create["email"], "j@j.j");
        assert_eq!(create["password"], "j");
        assert!(create.get("id").is_none());
        assert!(create.get("contribution_key").is_none());

        let append = build_payload(&session, &fields(), UploadMode::AppendByEmail).unwrap();
        assert_eq!(append["id"], "8715");
        assert_eq!(append["email"], "j@j.j");
    }

    #[test]
    fn test_append_without_dataset_id() {
        let err = build_payload(&session(), &fields(), UploadMode::AppendByKey).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_requires_fields() {
        let err = build_payload(&session(), &[], UploadMode::CreateByKey).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("fields"));
    }

    #[test]
    fn test_unknown_pushed_names_ignored() {
        let mut session = session();
        session.push_back("Not A Field", "x");
        let payload = build_payload(&session, &fields(), UploadMode::CreateByKey).unwrap();
        assert_eq!(payload["data"].as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_mode_predicates() {
        for mode in UploadMode::ALL {
            assert_ne!(mode.uses_key(), mode.uses_email());
            assert!(mode.as_append().is_append());
            assert_eq!(mode.as_append().uses_key(), mode.uses_key());
        }
        assert_eq!(UploadMode::AppendByEmail.to_string(), "append_by_email");
    }
}
