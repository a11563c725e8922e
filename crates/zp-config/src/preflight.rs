//! Preflight validation of archive metadata.
//!
//! Checks `CITATION.cff` (YAML) and `zenodo.json` (JSON) for the fields the
//! deposit needs. Every problem becomes a `[fail]` line; suspicious but legal
//! values become `[warn]` lines.

use serde_json::Value;
use std::path::Path;
use thiserror::Error;
use zp_common::{StatusLine, StatusLog};

pub const CITATION_FILE: &str = "CITATION.cff";
pub const ZENODO_FILE: &str = "zenodo.json";

pub const CITATION_REQUIRED: [&str; 5] =
    ["cff-version", "title", "authors", "date-released", "license"];

pub const ZENODO_REQUIRED: [&str; 6] = [
    "title",
    "upload_type",
    "description",
    "creators",
    "license",
    "access_right",
];

pub const ZENODO_UPLOAD_TYPES: [&str; 10] = [
    "publication",
    "dataset",
    "software",
    "poster",
    "presentation",
    "image",
    "video",
    "lesson",
    "physicalobject",
    "other",
];

pub const STANDARD_LICENSES: [&str; 5] = ["CC0", "CC-BY", "MIT", "BSD-3-CLAUSE", "GPL-3.0"];

/// A metadata problem that fails preflight.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing {0}")]
    MissingFile(String),

    #[error("{file} parse error: {message}")]
    Parse { file: String, message: String },

    #[error("{file} must be a mapping")]
    NotAMapping { file: String },

    #[error("{file} missing field: {field}")]
    MissingField { file: String, field: String },

    #[error("{file} '{field}' must be a non-empty list")]
    EmptyList { file: String, field: String },

    #[error("{file} first {entity} must include {requirement}")]
    IncompleteFirst {
        file: String,
        entity: String,
        requirement: String,
    },

    #[error("{file} {entity} {index} missing affiliation")]
    MissingAffiliation {
        file: String,
        entity: String,
        index: usize,
    },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::MissingFile(_) => 60,
            ValidationError::Parse { .. } => 61,
            ValidationError::NotAMapping { .. } => 62,
            ValidationError::MissingField { .. } => 63,
            ValidationError::EmptyList { .. } => 64,
            ValidationError::IncompleteFirst { .. } => 65,
            ValidationError::MissingAffiliation { .. } => 66,
        }
    }
}

impl From<ValidationError> for StatusLine {
    fn from(err: ValidationError) -> Self {
        StatusLine::fail(err.to_string())
    }
}

/// Outcome of checking both metadata files.
#[derive(Debug, Clone, Default)]
pub struct PreflightReport {
    pub citation: StatusLog,
    pub zenodo: StatusLog,
}

impl PreflightReport {
    pub fn run(citation: &Path, zenodo: &Path) -> Self {
        Self {
            citation: check_citation(citation),
            zenodo: check_zenodo(zenodo),
        }
    }

    pub fn passed(&self) -> bool {
        !self.citation.has_failures() && !self.zenodo.has_failures()
    }

    /// Final `Preflight passed` / `Preflight failed` line.
    pub fn verdict(&self) -> StatusLine {
        if self.passed() {
            StatusLine::ok("Preflight passed")
        } else {
            StatusLine::fail("Preflight failed")
        }
    }

    /// Every line in reporting order, verdict last.
    pub fn lines(&self) -> StatusLog {
        let mut log = self.citation.clone();
        log.extend(self.zenodo.clone());
        log.push(self.verdict());
        log
    }
}

fn read_document(path: &Path, file: &str, log: &mut StatusLog, json: bool) -> Option<Value> {
    if !path.is_file() {
        log.push(ValidationError::MissingFile(path.display().to_string()).into());
        return None;
    }
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|text| {
            if json {
                serde_json::from_str::<Value>(&text).map_err(|e| e.to_string())
            } else {
                serde_yaml::from_str::<Value>(&text).map_err(|e| e.to_string())
            }
        });
    match parsed {
        Ok(Value::Object(map)) => Some(Value::Object(map)),
        Ok(_) => {
            log.push(
                ValidationError::NotAMapping {
                    file: file.to_string(),
                }
                .into(),
            );
            None
        }
        Err(message) => {
            log.push(
                ValidationError::Parse {
                    file: file.to_string(),
                    message,
                }
                .into(),
            );
            None
        }
    }
}

/// Loose truthiness: null, false, zero, and empty strings, lists
/// and maps are all falsy.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

fn check_required(doc: &Value, file: &str, required: &[&str], log: &mut StatusLog) {
    for field in required {
        if doc.get(*field).is_none() {
            log.push(
                ValidationError::MissingField {
                    file: file.to_string(),
                    field: field.to_string(),
                }
                .into(),
            );
        }
    }
}

/// Checks shared by CITATION `authors` and Zenodo `creators`: a non-empty
/// list whose first member has the identifying keys, and whose every member
/// has an affiliation.
fn check_people(
    doc: &Value,
    file: &str,
    field: &str,
    entity: &str,
    first_keys: &[&str],
    requirement: &str,
    log: &mut StatusLog,
) {
    let Some(people) = doc.get(field) else {
        return;
    };
    let list = match people.as_array() {
        Some(list) if !list.is_empty() => list,
        _ => {
            log.push(
                ValidationError::EmptyList {
                    file: file.to_string(),
                    field: field.to_string(),
                }
                .into(),
            );
            return;
        }
    };

    if !first_keys.iter().all(|k| list[0].get(*k).is_some()) {
        log.push(
            ValidationError::IncompleteFirst {
                file: file.to_string(),
                entity: entity.to_string(),
                requirement: requirement.to_string(),
            }
            .into(),
        );
    }

    for (idx, person) in list.iter().enumerate() {
        if !is_truthy(person.get("affiliation")) {
            log.push(
                ValidationError::MissingAffiliation {
                    file: file.to_string(),
                    entity: entity.to_string(),
                    index: idx + 1,
                }
                .into(),
            );
        }
    }
}

/// Validate a `CITATION.cff` file.
pub fn check_citation(path: &Path) -> StatusLog {
    let mut log = StatusLog::new();
    let Some(doc) = read_document(path, CITATION_FILE, &mut log, false) else {
        return log;
    };

    check_required(&doc, CITATION_FILE, &CITATION_REQUIRED, &mut log);
    check_people(
        &doc,
        CITATION_FILE,
        "authors",
        "author",
        &["family-names", "given-names"],
        "family-names and given-names",
        &mut log,
    );

    let doi = match doc.get("doi") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    if doi.ends_with("XXXXXXX") {
        log.warn("CITATION.cff DOI is a placeholder; update after Zenodo assigns DOI");
    }

    log.ok("CITATION.cff parsed");
    log
}

/// Validate a `zenodo.json` deposit metadata file.
pub fn check_zenodo(path: &Path) -> StatusLog {
    let mut log = StatusLog::new();
    let Some(doc) = read_document(path, ZENODO_FILE, &mut log, true) else {
        return log;
    };

    check_required(&doc, ZENODO_FILE, &ZENODO_REQUIRED, &mut log);
    check_people(
        &doc,
        ZENODO_FILE,
        "creators",
        "creator",
        &["name"],
        "'name'",
        &mut log,
    );

    let upload_type = doc.get("upload_type").and_then(Value::as_str);
    if !upload_type.is_some_and(|t| ZENODO_UPLOAD_TYPES.contains(&t)) {
        log.warn("zenodo.json upload_type is unusual; verify with Zenodo docs");
    }

    let license = doc
        .get("license")
        .and_then(Value::as_str)
        .map(str::to_ascii_uppercase);
    if license.is_some_and(|l| STANDARD_LICENSES.contains(&l.as_str())) {
        log.ok("zenodo.json license looks standard");
    }

    log.ok("zenodo.json parsed");
    log
}
