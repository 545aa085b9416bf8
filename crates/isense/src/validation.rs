//! Pre-flight checks run before an upload payload is built.

use crate::error::{IsenseError, Result};
use crate::payload::UploadMode;
use crate::session::{Session, is_set};

/// Check that `session` has everything `mode` needs.
///
/// Checks run in a fixed order and the first failure is reported: project id,
/// title, pushed data, then the credentials for the mode. Dataset ids for
/// append modes are checked by the caller, which may still need to resolve one
/// by name.
pub fn validate(session: &Session, mode: UploadMode, operation: &'static str) -> Result<()> {
    if !is_set(session.project_id()) {
        return Err(IsenseError::config(operation, "missing project id"));
    }
    if session.title().is_empty() {
        return Err(IsenseError::config(operation, "missing title"));
    }
    if session.field_data().is_empty() {
        return Err(IsenseError::config(operation, "no data pushed"));
    }

    match mode {
        UploadMode::CreateByKey | UploadMode::AppendByKey => {
            if !is_set(session.contributor_key()) {
                return Err(IsenseError::config(operation, "missing contributor key"));
            }
        }
        UploadMode::CreateByEmail | UploadMode::AppendByEmail => {
            if !is_set(session.email()) {
                return Err(IsenseError::config(operation, "missing email"));
            }
            if !is_set(session.password()) {
                return Err(IsenseError::config(operation, "missing password"));
            }
        }
    }

    Ok(())
}

/// Check that a dataset id handed in by the caller is usable.
pub fn validate_dataset_id(dataset_id: &str, operation: &'static str) -> Result<()> {
    if dataset_id.is_empty() {
        return Err(IsenseError::config(operation, "missing dataset id"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<()>) -> String {
        match result {
            Err(IsenseError::Config { message, .. }) => message,
            other => panic!("expected config error, got {:?}", other),
        }
    }

    fn ready() -> Session {
        let mut session = Session::with_project("1006", "T", "label", "123");
        session.set_credentials("j@j.j", "j");
        session.push_back("Number", "1");
        session
    }

    #[test]
    fn test_ready_session_passes_all_modes() {
        for mode in UploadMode::ALL {
            assert!(validate(&ready(), mode, "test").is_ok(), "{mode}");
        }
    }

    #[test]
    fn test_order_of_checks() {
        let empty = Session::new();
        assert_eq!(message(validate(&empty, UploadMode::CreateByKey, "t")), "missing project id");

        let mut session = Session::new();
        session.set_project_id("1006");
        assert_eq!(message(validate(&session, UploadMode::CreateByKey, "t")), "missing title");

        session.set_title("T");
        assert_eq!(message(validate(&session, UploadMode::CreateByKey, "t")), "no data pushed");

        session.push_back("Number", "1");
        assert_eq!(
            message(validate(&session, UploadMode::CreateByKey, "t")),
            "missing contributor key"
        );
        assert_eq!(message(validate(&session, UploadMode::CreateByEmail, "t")), "missing email");
    }

    #[test]
    fn test_email_mode_needs_password() {
        let mut session = ready();
        session.set_credentials("j@j.j", "");
        assert_eq!(
            message(validate(&session, UploadMode::AppendByEmail, "t")),
            "missing password"
        );
        // key modes don't care about email credentials
        assert!(validate(&session, UploadMode::AppendByKey, "t").is_ok());
    }

    #[test]
    fn test_empty_project_id_rejected() {
        let mut session = ready();
        session.set_project_id("");
        assert_eq!(message(validate(&session, UploadMode::CreateByKey, "t")), "missing project id");
    }

    #[test]
    fn test_operation_recorded() {
        let err = validate(&Session::new(), UploadMode::CreateByKey, "create").unwrap_err();
        assert_eq!(err.operation(), "create");
    }

    #[test]
    fn test_dataset_id() {
        assert!(validate_dataset_id("8715", "append").is_ok());
        assert!(validate_dataset_id("", "append").is_err());
    }
}
