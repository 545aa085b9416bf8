//! The iSENSE client: session state, metadata cache, and the request pipeline.

use reqwest::Url;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{Diagnostic, IsenseError, LookupKind, Result};
use crate::metadata::{
    self, DatasetSummary, FieldDefinition, MetadataCache, ProjectSnapshot,
};
use crate::payload::{UploadMode, build_payload};
use crate::session::{Session, generate_timestamp};
use crate::transport::{HttpClient, HttpResponse, ReqwestClient, with_user_agent};
use crate::validation::{validate, validate_dataset_id};

const GET_HEADERS: &[(&str, &str)] = &[("Accept", "application/json")];

const POST_HEADERS: &[(&str, &str)] = &[
    ("Accept", "application/json"),
    ("Accept-Charset", "utf-8"),
    ("Content-Type", "application/json"),
];

/// Placeholder shown instead of secrets in reports.
const REDACTED: &str = "[REDACTED]";

/// Result of an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    /// HTTP status returned by the service (always 200).
    pub status: u16,

    /// Id of the created or appended dataset, when the service reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,

    /// Link to the project on the website.
    pub project_url: String,
}

/// Blocking client for one project session.
///
/// Every operation takes `&mut self` or `&self` and performs its requests
/// before returning. Share a client across threads only behind a lock.
pub struct IsenseClient<T: HttpClient = ReqwestClient> {
    config: ClientConfig,
    transport: T,
    session: Session,
    metadata: MetadataCache,
    last_status: Option<u16>,
    last_diagnostic: Option<Diagnostic>,
}

impl IsenseClient<ReqwestClient> {
    /// Create a client against the default server.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with custom configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestClient::new(&config).map_err(|source| IsenseError::Transport {
            operation: "with_config",
            source,
        })?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client for contributor-key uploads to a project.
    ///
    /// The project's fields are fetched immediately; check
    /// [`fields_loaded`](Self::fields_loaded) to see whether that worked.
    pub fn for_project(
        project_id: impl Into<String>,
        title: impl Into<String>,
        label: impl Into<String>,
        contributor_key: impl Into<String>,
    ) -> Result<Self> {
        let mut client = Self::new()?;
        client.set_project_all(project_id, title, label, contributor_key);
        Ok(client)
    }
}

impl<T: HttpClient> IsenseClient<T> {
    /// Create a client over any transport.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            session: Session::new(),
            metadata: MetadataCache::new(),
            last_status: None,
            last_diagnostic: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn metadata(&self) -> &MetadataCache {
        &self.metadata
    }

    /// Fields of the current project (empty until fetched).
    pub fn fields(&self) -> &[FieldDefinition] {
        self.metadata.fields()
    }

    pub fn fields_loaded(&self) -> bool {
        !self.metadata.fields().is_empty()
    }

    /// Datasets from the last recursive fetch.
    pub fn datasets(&self) -> &[DatasetSummary] {
        self.metadata.datasets()
    }

    /// Media objects from the last recursive fetch.
    pub fn media_objects(&self) -> &[Value] {
        self.metadata
            .snapshot()
            .map(|s| s.media_objects.as_slice())
            .unwrap_or_default()
    }

    /// Owner info from the last recursive fetch.
    pub fn owner(&self) -> Option<&Map<String, Value>> {
        self.metadata.snapshot().map(|s| &s.owner)
    }

    /// HTTP status of the most recent response.
    pub fn last_status(&self) -> Option<u16> {
        self.last_status
    }

    /// The most recent failure reported by any operation.
    pub fn last_diagnostic(&self) -> Option<&Diagnostic> {
        self.last_diagnostic.as_ref()
    }

    // ------------------------------------------------------------------
    // Session configuration
    // ------------------------------------------------------------------

    /// Switch to a project and fetch its fields.
    ///
    /// Metadata and the dataset id from the previous project are dropped. A
    /// failed fetch is logged and recorded as the last diagnostic; the field
    /// cache is then left empty.
    pub fn set_project(&mut self, project_id: impl Into<String>) {
        self.session.set_project_id(project_id);
        self.session.dataset_id = None;
        self.metadata.clear();

        // failure already logged and recorded
        let _ = self.fetch_fields();
    }

    /// Set project, title, label and contributor key at once.
    pub fn set_project_all(
        &mut self,
        project_id: impl Into<String>,
        title: impl Into<String>,
        label: impl Into<String>,
        contributor_key: impl Into<String>,
    ) {
        self.session.set_title(title);
        self.session.set_label(label);
        self.session.set_contributor_key(contributor_key);
        self.set_project(project_id);
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.session.set_title(title);
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.session.set_label(label);
    }

    pub fn set_contributor_key(&mut self, key: impl Into<String>) {
        self.session.set_contributor_key(key);
    }

    /// Store email/password credentials and check them against the service.
    ///
    /// The credentials are kept even when the check fails.
    pub fn set_email_password(
        &mut self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<bool> {
        let email = email.into();
        let password = password.into();
        self.session.set_credentials(email.clone(), password.clone());
        self.authenticate(&email, &password)
    }

    /// Append one value to a field's pending data.
    pub fn push_back(&mut self, field_name: impl Into<String>, value: impl Into<String>) {
        self.session.push_back(field_name, value);
    }

    /// Replace a field's pending data.
    pub fn push_vector(&mut self, field_name: impl Into<String>, values: Vec<String>) {
        self.session.push_vector(field_name, values);
    }

    /// Current UTC time in the format the service accepts for timestamps.
    pub fn generate_timestamp(&self) -> String {
        generate_timestamp()
    }

    /// Reset the session and drop all fetched metadata.
    pub fn clear(&mut self) {
        debug!("clearing session and metadata");
        self.session.clear();
        self.metadata.clear();
        self.last_status = None;
        self.last_diagnostic = None;
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    /// Fetch the current project's field definitions.
    pub fn fetch_fields(&mut self) -> Result<&[FieldDefinition]> {
        let result = self.fetch_fields_inner();
        self.record(result)?;
        Ok(self.metadata.fields())
    }

    fn fetch_fields_inner(&mut self) -> Result<()> {
        const OP: &str = "fetch_fields";

        let project_id = self.require_project(OP)?;
        let url = self.endpoint(OP, &["projects", project_id.as_str()], &[])?;
        let body = self.get(OP, url)?;

        let fields =
            metadata::parse_fields(&body).map_err(|source| IsenseError::Parse { operation: OP, source })?;
        debug!(project_id = %project_id, field_count = fields.len(), "fetched project fields");
        self.metadata.set_fields(fields);
        Ok(())
    }

    /// Fetch fields, datasets, media objects and owner info in one request.
    pub fn fetch_datasets_and_media(&mut self) -> Result<&ProjectSnapshot> {
        let result = self.fetch_snapshot_inner("fetch_datasets_and_media");
        self.record(result)?;
        self.metadata.snapshot().ok_or_else(|| {
            IsenseError::config("fetch_datasets_and_media", "no project snapshot cached")
        })
    }

    fn fetch_snapshot_inner(&mut self, operation: &'static str) -> Result<()> {
        let project_id = self.require_project(operation)?;
        let url = self.endpoint(operation, &["projects", project_id.as_str()], &[("recur", "true")])?;
        let body = self.get(operation, url)?;

        let snapshot = metadata::parse_snapshot(&body)
            .map_err(|source| IsenseError::Parse { operation, source })?;
        debug!(
            project_id = %project_id,
            field_count = snapshot.fields.len(),
            dataset_count = snapshot.datasets.len(),
            media_count = snapshot.media_objects.len(),
            "fetched project snapshot"
        );
        self.metadata.set_snapshot(snapshot);
        Ok(())
    }

    /// Id of the field named `name` in the cached field list.
    pub fn resolve_field_id(&self, name: &str) -> Result<String> {
        self.metadata
            .resolve_field_id(name)
            .map(str::to_string)
            .ok_or_else(|| {
                warn!(operation = "resolve_field_id", name, "field not found");
                IsenseError::not_resolved("resolve_field_id", LookupKind::Field, name)
            })
    }

    /// Id of the dataset named `name` in the cached dataset list.
    pub fn resolve_dataset_id(&self, name: &str) -> Result<String> {
        self.metadata
            .resolve_dataset_id(name)
            .map(str::to_string)
            .ok_or_else(|| {
                warn!(operation = "resolve_dataset_id", name, "dataset not found");
                IsenseError::not_resolved("resolve_dataset_id", LookupKind::Dataset, name)
            })
    }

    /// Values of one field across the rows of a named dataset.
    ///
    /// Always refetches the project snapshot, since datasets may have been
    /// added on the service since the last fetch.
    pub fn field_values(&mut self, dataset_name: &str, field_name: &str) -> Result<Vec<String>> {
        let result = self.field_values_inner(dataset_name, field_name);
        self.record(result)
    }

    fn field_values_inner(&mut self, dataset_name: &str, field_name: &str) -> Result<Vec<String>> {
        const OP: &str = "field_values";

        self.fetch_snapshot_inner(OP)?;

        let dataset_id = self
            .resolve_dataset_id(dataset_name)
            .map_err(|e| e.in_operation(OP))?;
        let field_id = self
            .resolve_field_id(field_name)
            .map_err(|e| e.in_operation(OP))?;

        self.metadata
            .dataset(&dataset_id)
            .and_then(|dataset| dataset.column(&field_id))
            .ok_or_else(|| IsenseError::not_resolved(OP, LookupKind::Rows, dataset_name))
    }

    // ------------------------------------------------------------------
    // Account and search
    // ------------------------------------------------------------------

    /// Check an email/password pair. Returns `Ok(true)` only on HTTP 200.
    pub fn authenticate(&mut self, email: &str, password: &str) -> Result<bool> {
        let result = self.authenticate_inner(email, password);
        match result {
            Err(IsenseError::Service { status, .. }) => {
                let err = IsenseError::service("authenticate", status);
                self.note_failure(&err);
                Ok(false)
            }
            other => self.record(other),
        }
    }

    fn authenticate_inner(&mut self, email: &str, password: &str) -> Result<bool> {
        const OP: &str = "authenticate";

        if email.is_empty() || password.is_empty() {
            return Err(IsenseError::config(OP, "email and password must both be set"));
        }

        let url = self.endpoint(
            OP,
            &["users", "myInfo"],
            &[("email", email), ("password", password)],
        )?;
        self.get(OP, url)?;
        info!("email and password are valid");
        Ok(true)
    }

    /// Names of projects matching `term`, most recently updated first.
    ///
    /// An empty term returns no projects without contacting the service.
    pub fn search_projects(&mut self, term: &str) -> Result<Vec<String>> {
        let result = self.search_projects_inner(term);
        self.record(result)
    }

    fn search_projects_inner(&mut self, term: &str) -> Result<Vec<String>> {
        const OP: &str = "search_projects";

        if term.is_empty() {
            debug!("empty search term, skipping request");
            return Ok(Vec::new());
        }

        let url = self.endpoint(
            OP,
            &["projects"],
            &[
                ("utf8", "true"),
                ("search", term),
                ("sort", "updated_at"),
                ("order", "DESC"),
            ],
        )?;
        let body = self.get(OP, url)?;

        let names = metadata::parse_project_names(&body)
            .map_err(|source| IsenseError::Parse { operation: OP, source })?;
        if names.is_empty() {
            debug!(term, "no projects matched");
        }
        Ok(names)
    }

    // ------------------------------------------------------------------
    // Uploads
    // ------------------------------------------------------------------

    /// Upload pushed data as a new dataset.
    pub fn create(&mut self, mode: UploadMode) -> Result<UploadReceipt> {
        let result = self.create_inner(mode);
        self.record(result)
    }

    fn create_inner(&mut self, mode: UploadMode) -> Result<UploadReceipt> {
        const OP: &str = "create";

        if mode.is_append() {
            return Err(IsenseError::config(
                OP,
                format!("{} is not a create mode", mode),
            ));
        }
        validate(&self.session, mode, OP)?;
        self.submit(OP, mode, None)
    }

    /// Append pushed data to the dataset with the given id.
    pub fn append(&mut self, mode: UploadMode, dataset_id: &str) -> Result<UploadReceipt> {
        let result = self.append_inner(mode, dataset_id);
        self.record(result)
    }

    fn append_inner(&mut self, mode: UploadMode, dataset_id: &str) -> Result<UploadReceipt> {
        const OP: &str = "append";

        require_append_mode(OP, mode)?;
        validate(&self.session, mode, OP)?;
        validate_dataset_id(dataset_id, OP)?;

        self.submit(OP, mode, Some(dataset_id.to_string()))
    }

    /// Append pushed data to the dataset with the given name.
    ///
    /// The project snapshot is refetched to look the name up; if it cannot be
    /// resolved nothing is uploaded.
    pub fn append_by_name(
        &mut self,
        mode: UploadMode,
        dataset_name: &str,
    ) -> Result<UploadReceipt> {
        let result = self.append_by_name_inner(mode, dataset_name);
        self.record(result)
    }

    fn append_by_name_inner(
        &mut self,
        mode: UploadMode,
        dataset_name: &str,
    ) -> Result<UploadReceipt> {
        const OP: &str = "append_by_name";

        require_append_mode(OP, mode)?;
        validate(&self.session, mode, OP)?;

        self.fetch_snapshot_inner(OP)?;
        let dataset_id = self
            .resolve_dataset_id(dataset_name)
            .map_err(|e| e.in_operation(OP))?;

        self.submit(OP, mode, Some(dataset_id))
    }

    /// Build and POST the payload. Preconditions have already been checked.
    ///
    /// An append target is only stored in the session once the service
    /// accepts the upload.
    fn submit(
        &mut self,
        operation: &'static str,
        mode: UploadMode,
        dataset_id: Option<String>,
    ) -> Result<UploadReceipt> {
        if mode.uses_key() {
            self.session.normalize_label();
        }

        let payload = match &dataset_id {
            Some(id) => {
                let mut staged = self.session.clone();
                staged.set_dataset_id(id.as_str());
                build_payload(&staged, self.metadata.fields(), mode)
            }
            None => build_payload(&self.session, self.metadata.fields(), mode),
        }
        .map_err(|e| e.in_operation(operation))?;
        let body = serde_json::to_vec(&payload)
            .map_err(|source| IsenseError::Parse { operation, source })?;

        let project_id = self.require_project(operation)?;
        let url = if mode.is_append() {
            self.endpoint(operation, &["data_sets", "append"], &[])?
        } else {
            self.endpoint(operation, &["projects", project_id.as_str(), "jsonDataUpload"], &[])?
        };

        debug!(operation, %mode, path = url.path(), bytes = body.len(), "POST");
        let headers = with_user_agent(POST_HEADERS, &self.config.user_agent);
        let response = self
            .transport
            .post(url.as_str(), &headers, &body)
            .map_err(|source| IsenseError::Transport { operation, source })?;
        self.check_status(operation, &response)?;

        if let Some(id) = dataset_id {
            self.session.set_dataset_id(id);
        }

        let receipt = UploadReceipt {
            status: response.status,
            dataset_id: receipt_dataset_id(&response.body),
            project_url: self.config.project_url(&project_id),
        };
        info!(
            operation,
            %mode,
            status = receipt.status,
            project_url = %receipt.project_url,
            "upload accepted"
        );
        Ok(receipt)
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// JSON dump of the session and cached metadata, with secrets redacted.
    pub fn debug_report(&self) -> Value {
        let redact = |value: Option<&str>| value.map(|_| REDACTED);

        json!({
            "session": {
                "project_id": self.session.project_id(),
                "dataset_id": self.session.dataset_id(),
                "title": self.session.title(),
                "contributor_key": redact(self.session.contributor_key()),
                "contributor_label": self.session.contributor_label(),
                "email": self.session.email(),
                "password": redact(self.session.password()),
                "field_data": self.session.field_data(),
            },
            "api_url": self.config.api_url,
            "fields": self.metadata.fields(),
            "snapshot": self.metadata.snapshot(),
            "last_status": self.last_status,
            "last_diagnostic": self.last_diagnostic,
        })
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    fn require_project(&self, operation: &'static str) -> Result<String> {
        self.session
            .project_id()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| IsenseError::config(operation, "missing project id"))
    }

    /// API URL for `segments` below the configured base.
    ///
    /// Each segment is percent-encoded on its own, so ids containing `/`,
    /// `?` or `#` stay inside their segment.
    fn endpoint(
        &self,
        operation: &'static str,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Url> {
        let invalid = |reason: String| {
            IsenseError::config(
                operation,
                format!("invalid API URL '{}': {}", self.config.api_url, reason),
            )
        };

        // the URL parser drops dot segments instead of encoding them
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(IsenseError::config(
                operation,
                format!("invalid path segment '{}'", bad),
            ));
        }

        let mut url = Url::parse(&self.config.api_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("not a base URL".to_string()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// GET a URL and return the body of a 200 response.
    fn get(&mut self, operation: &'static str, url: Url) -> Result<Vec<u8>> {
        // the query may carry credentials, so only the path is logged
        debug!(operation, path = url.path(), "GET");

        let headers = with_user_agent(GET_HEADERS, &self.config.user_agent);
        let response = self
            .transport
            .get(url.as_str(), &headers)
            .map_err(|source| IsenseError::Transport { operation, source })?;
        self.check_status(operation, &response)?;
        Ok(response.body)
    }

    fn check_status(&mut self, operation: &'static str, response: &HttpResponse) -> Result<()> {
        self.last_status = Some(response.status);
        if response.is_ok() {
            Ok(())
        } else {
            Err(IsenseError::service(operation, response.status))
        }
    }

    /// Log and remember a failure, then hand the result back.
    fn record<V>(&mut self, result: Result<V>) -> Result<V> {
        if let Err(err) = &result {
            self.note_failure(err);
        }
        result
    }

    fn note_failure(&mut self, err: &IsenseError) {
        match err {
            IsenseError::Service { kind, status, .. } => warn!(
                operation = err.operation(),
                status,
                kind = %kind,
                hint = kind.hint(),
                "request failed"
            ),
            _ => warn!(
                operation = err.operation(),
                kind = ?err.kind(),
                reason = %err,
                "operation failed"
            ),
        }
        self.last_diagnostic = Some(err.diagnostic());
    }
}

fn require_append_mode(operation: &'static str, mode: UploadMode) -> Result<()> {
    if mode.is_append() {
        Ok(())
    } else {
        Err(IsenseError::config(
            operation,
            format!("{} is not an append mode", mode),
        ))
    }
}

/// Dataset id from an upload response, if the body carries one.
fn receipt_dataset_id(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
