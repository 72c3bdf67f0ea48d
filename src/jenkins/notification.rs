//! Jenkins build notification normalizer.
//!
//! Turns the body posted by the Jenkins notification plugin into a typed
//! [`BuildEvent`].
//!
//! # Mislabeled bodies
//!
//! Some versions of the plugin send a JSON body while labeling it
//! `application/x-www-form-urlencoded`. Form-decoding such a body yields a
//! single key (the JSON text) with an empty value. When that shape is seen,
//! the key is parsed as JSON; if that fails the form fields are used as they
//! are. Properly form-encoded notifications carry several fields and are
//! used directly.
//!
//! # Form fields
//!
//! Form keys address nested fields either with brackets or with dots:
//! `build[parameters][GIT_SHA1]=abc` and `build.parameters.GIT_SHA1=abc` both
//! set `build.parameters.GIT_SHA1`. A value that is itself a JSON object or
//! array is embedded as such.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::types::{BuildNumber, RepoName, Sha};

/// Build parameter naming the repository whose configuration governs the build.
pub const PARAM_BASE_REPO: &str = "GIT_BASE_REPO";
/// Build parameter naming the repository the built commit comes from.
pub const PARAM_HEAD_REPO: &str = "GIT_HEAD_REPO";
/// Build parameter carrying the commit being built.
pub const PARAM_SHA: &str = "GIT_SHA1";
/// Build parameter carrying the pull request page the build was scheduled for.
pub const PARAM_REVIEW_URL: &str = "GITHUB_URL";

/// Errors that make a notification unusable.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The body was labeled JSON but is not valid JSON.
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The body could not be form-decoded.
    #[error("invalid form body: {0}")]
    InvalidForm(#[from] serde_urlencoded::de::Error),

    /// A required field is missing or has the wrong type.
    #[error("malformed build notification: {0}")]
    Malformed(#[source] serde_json::Error),

    /// A field is present but its value is unusable.
    #[error("invalid value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Lifecycle phase reported by the notification plugin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BuildPhase {
    Started,
    Completed,
    /// Any other phase (`QUEUED`, `FINALIZED`, ...). Carried, never acted on.
    Other(String),
}

impl BuildPhase {
    pub fn parse(s: &str) -> Self {
        match s {
            "STARTED" => BuildPhase::Started,
            "COMPLETED" => BuildPhase::Completed,
            other => BuildPhase::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BuildPhase::Started => "STARTED",
            BuildPhase::Completed => "COMPLETED",
            BuildPhase::Other(s) => s,
        }
    }

    /// Only `STARTED` and `COMPLETED` produce a commit status.
    pub fn is_actionable(&self) -> bool {
        matches!(self, BuildPhase::Started | BuildPhase::Completed)
    }
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of a completed build.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BuildStatus {
    Success,
    Failure,
    Unstable,
    Aborted,
    /// A value Jenkins is not known to send, kept verbatim for error reporting.
    Other(String),
}

impl BuildStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "SUCCESS" => BuildStatus::Success,
            "FAILURE" => BuildStatus::Failure,
            "UNSTABLE" => BuildStatus::Unstable,
            "ABORTED" => BuildStatus::Aborted,
            other => BuildStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BuildStatus::Success => "SUCCESS",
            BuildStatus::Failure => "FAILURE",
            BuildStatus::Unstable => "UNSTABLE",
            BuildStatus::Aborted => "ABORTED",
            BuildStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized build lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEvent {
    /// The Jenkins job name.
    pub job_name: String,

    /// The build number within the job.
    pub number: BuildNumber,

    /// Absolute URL of the build page.
    pub url: String,

    pub phase: BuildPhase,

    /// Terminal status; normally only present once the build completed.
    pub status: Option<BuildStatus>,

    /// Build parameters, rendered as strings.
    pub parameters: BTreeMap<String, String>,
}

impl BuildEvent {
    /// The repository whose configuration governs this build.
    pub fn base_repo(&self) -> Option<RepoName> {
        self.parameters.get(PARAM_BASE_REPO).map(RepoName::new)
    }

    /// The commit being built.
    pub fn sha(&self) -> Option<Sha> {
        self.parameters.get(PARAM_SHA).map(Sha::new)
    }
}

/// Normalizes a raw notification body.
///
/// `content_type` is the request's `Content-Type` header. JSON content types
/// are parsed as JSON. Anything else (including a missing header) is first
/// tried as a raw JSON object, since mislabeled bodies are sent unencoded and
/// form decoding would rewrite `+`, `%XX`, `=` and `&` inside them. Only then
/// is the body form-decoded.
pub fn normalize(body: &[u8], content_type: Option<&str>) -> Result<BuildEvent, NormalizeError> {
    let payload = if content_type.is_some_and(is_json_content_type) {
        serde_json::from_slice(body).map_err(NormalizeError::InvalidJson)?
    } else if let Some(json) = raw_json_object(body) {
        debug!("Form-labeled body is a raw JSON object");
        json
    } else {
        let fields: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;
        payload_from_form(fields)
    };

    build_event_from_value(payload)
}

/// Chooses the payload for a form-decoded body.
///
/// A single key with an empty value is the signature of a mislabeled JSON
/// body; it is parsed as JSON when possible. Everything else is treated as
/// ordinary form fields.
pub fn payload_from_form(fields: Vec<(String, String)>) -> Value {
    if let [(key, value)] = fields.as_slice()
        && value.is_empty()
    {
        match serde_json::from_str::<Value>(key) {
            Ok(json @ Value::Object(_)) => return json,
            Ok(_) => debug!("Single form key is JSON but not an object; using form fields"),
            Err(e) => debug!(error = %e, "Single form key is not JSON; using form fields"),
        }
    }

    form_fields_to_value(&fields)
}

/// Builds a nested JSON object from form fields.
pub fn form_fields_to_value(fields: &[(String, String)]) -> Value {
    let mut root = Map::new();
    for (key, value) in fields {
        let path = key_path(key);
        insert_path(&mut root, &path, field_value(value));
    }
    Value::Object(root)
}

/// Extracts a [`BuildEvent`] from a decoded payload.
pub fn build_event_from_value(payload: Value) -> Result<BuildEvent, NormalizeError> {
    let raw: RawNotification = serde_json::from_value(payload).map_err(NormalizeError::Malformed)?;

    let number = match raw.build.number {
        RawNumber::Int(n) => n,
        RawNumber::Text(text) => {
            text.trim()
                .parse()
                .map_err(|_| NormalizeError::InvalidField {
                    field: "build.number",
                    value: text.clone(),
                })?
        }
    };

    let parameters = raw
        .build
        .parameters
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(name, value)| parameter_string(value).map(|v| (name, v)))
        .collect();

    Ok(BuildEvent {
        job_name: raw.name,
        number: BuildNumber(number),
        url: raw.build.full_url,
        phase: BuildPhase::parse(&raw.build.phase),
        status: raw.build.status.as_deref().map(BuildStatus::parse),
        parameters,
    })
}

#[derive(Debug, Deserialize)]
struct RawNotification {
    name: String,
    build: RawBuild,
}

#[derive(Debug, Deserialize)]
struct RawBuild {
    number: RawNumber,
    full_url: String,
    phase: String,
    status: Option<String>,
    parameters: Option<BTreeMap<String, Value>>,
}

/// Form-encoded notifications carry the build number as text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(u64),
    Text(String),
}

/// The body as a JSON object, if it is one. Form-encoded bodies never start
/// with a literal `{`.
fn raw_json_object(body: &[u8]) -> Option<Value> {
    if body.trim_ascii_start().first() != Some(&b'{') {
        return None;
    }
    match serde_json::from_slice(body) {
        Ok(json @ Value::Object(_)) => Some(json),
        _ => None,
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// Splits `a[b][c]` or `a.b.c` into `["a", "b", "c"]`.
fn key_path(key: &str) -> Vec<&str> {
    key.split(['[', ']', '.'])
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn field_value(value: &str) -> Value {
    let trimmed = value.trim_start();
    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && let Ok(json) = serde_json::from_str::<Value>(value)
    {
        return json;
    }
    Value::String(value.to_string())
}

fn insert_path(map: &mut Map<String, Value>, path: &[&str], value: Value) {
    match path {
        [] => {}
        [last] => {
            map.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let entry = map
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                insert_path(child, rest, value);
            }
        }
    }
}

fn parameter_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
