//! iSENSE: client library for the iSENSE data repository API.
//!
//! A client holds one session: a project, its credentials, and columns of
//! string data waiting to be uploaded. Field and dataset names are resolved to
//! the ids the service assigned before the upload body is built.
//!
//! # Upload modes
//!
//! - **CreateByKey** / **AppendByKey** - authenticate with a project contributor key
//! - **CreateByEmail** / **AppendByEmail** - authenticate with an account's email and password
//!
//! # Example
//!
//! ```no_run
//! use isense::{IsenseClient, UploadMode};
//!
//! let mut client = IsenseClient::for_project("1006", "Lab 3", "Bench A", "123").unwrap();
//! client.push_back("Timestamp", client.generate_timestamp());
//! client.push_back("Temperature", "21.5");
//!
//! let receipt = client.create(UploadMode::CreateByKey).unwrap();
//! println!("Uploaded to {}", receipt.project_url);
//! ```

pub mod config;
pub mod error;
pub mod metadata;
pub mod payload;
pub mod session;
pub mod transport;
pub mod validation;

mod client;

pub use crate::client::{IsenseClient, UploadReceipt};
pub use config::ClientConfig;
pub use error::{Diagnostic, ErrorKind, IsenseError, LookupKind, Outcome, Result, ServiceErrorKind};
pub use metadata::{DatasetSummary, FieldDefinition, MetadataCache, ProjectSnapshot};
pub use payload::{UploadMode, build_payload};
pub use session::{Session, generate_timestamp};
pub use transport::{HttpClient, HttpResponse, MockTransport, ReqwestClient, TransportError};
