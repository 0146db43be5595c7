//! Input validation
//!
//! Every tool checks its parameters here before a request is built, so a
//! rejected call never reaches the network. Each check returns the normalized
//! value on success or a [`ValidationError`] naming the offending parameter.

use crate::error::ValidationError;
use crate::response::FieldSelection;
use base64::Engine;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// First page when the caller does not ask for one
pub const DEFAULT_PAGE: u32 = 1;
/// Page size when the caller does not ask for one
pub const DEFAULT_PER_PAGE: u32 = 20;
/// GitLab's own page size ceiling
pub const MAX_PER_PAGE: u32 = 100;

/// Project/group visibility levels
pub const VISIBILITY_LEVELS: &[&str] = &["private", "internal", "public"];
/// Member access levels (guest, reporter, developer, maintainer, owner)
pub const ACCESS_LEVELS: &[u8] = &[10, 20, 30, 40, 50];
/// Access level granted when none is given (developer)
pub const DEFAULT_ACCESS_LEVEL: u8 = 30;
/// Pipeline status filters, also used as job scopes
pub const PIPELINE_STATUSES: &[&str] = &[
    "running", "pending", "success", "failed", "canceled", "skipped", "created", "manual",
];

/// Identifier as supplied by the caller: a number or a string.
///
/// Any other JSON value (float, boolean, object, ...) decodes into `Other`
/// and is reported as `InvalidIdentifier` by [`namespace_id`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum IdInput {
    /// Numeric ID
    Number(i64),
    /// Numeric ID as text, or a namespace path such as `group/project`
    Text(String),
    #[schemars(skip)]
    Other(Value),
}

/// Integer as supplied by the caller, used for `page` and `per_page`.
///
/// Digit strings are accepted; anything else that is not an integer decodes
/// into `Other` and is rejected by [`pagination`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum IntInput {
    Number(i64),
    Text(String),
    #[schemars(skip)]
    Other(Value),
}

impl IntInput {
    fn to_i64(&self) -> Option<i64> {
        match self {
            IntInput::Number(n) => Some(*n),
            IntInput::Text(text) => text.trim().parse().ok(),
            IntInput::Other(_) => None,
        }
    }
}

impl fmt::Display for IntInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntInput::Number(n) => write!(f, "{}", n),
            IntInput::Text(text) => write!(f, "{:?}", text),
            IntInput::Other(value) => write!(f, "{}", value),
        }
    }
}

impl From<i64> for IdInput {
    fn from(value: i64) -> Self {
        IdInput::Number(value)
    }
}

impl From<&str> for IdInput {
    fn from(value: &str) -> Self {
        IdInput::Text(value.to_string())
    }
}

/// A validated project or group reference.
///
/// `Display` renders the form used inside an API path: the number, or the
/// URL-encoded path (`group%2Fproject`). Serializes as the bare number or path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathOrId {
    Id(u64),
    Path(String),
}

impl PathOrId {
    /// Human-readable form for messages (the path is not encoded)
    pub fn label(&self) -> String {
        match self {
            PathOrId::Id(id) => id.to_string(),
            PathOrId::Path(path) => path.clone(),
        }
    }
}

impl fmt::Display for PathOrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathOrId::Id(id) => write!(f, "{}", id),
            PathOrId::Path(path) => f.write_str(&urlencoding::encode(path)),
        }
    }
}

/// Validated paging parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Validate a project or group identifier.
///
/// Accepts a positive integer (as a number or digit string) or a non-empty
/// namespace path, either plain (`group/project`) or URL-encoded
/// (`group%2Fproject`).
pub fn namespace_id(param: &str, input: &IdInput) -> Result<PathOrId, ValidationError> {
    match input {
        IdInput::Number(n) if *n > 0 => Ok(PathOrId::Id(*n as u64)),
        IdInput::Number(n) => Err(ValidationError::identifier(
            param,
            format!("must be a positive integer or a namespace path, got {}", n),
        )),
        IdInput::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(ValidationError::identifier(param, "must not be empty"));
            }
            if text.bytes().all(|b| b.is_ascii_digit()) {
                return match text.parse::<u64>() {
                    Ok(0) | Err(_) => Err(ValidationError::identifier(
                        param,
                        format!("'{}' is not a valid positive integer", text),
                    )),
                    Ok(id) => Ok(PathOrId::Id(id)),
                };
            }
            let decoded = urlencoding::decode(text).map_err(|_| {
                ValidationError::identifier(param, "is not valid URL-encoded UTF-8")
            })?;
            namespace_path(param, &decoded).map(PathOrId::Path)
        }
        IdInput::Other(value) => Err(ValidationError::identifier(
            param,
            format!("must be a positive integer or a namespace path, got {}", value),
        )),
    }
}

fn namespace_path(param: &str, path: &str) -> Result<String, ValidationError> {
    let path = path.trim_matches('/');
    if path.is_empty() {
        return Err(ValidationError::identifier(param, "must not be empty"));
    }
    for segment in path.split('/') {
        if segment.is_empty() {
            return Err(ValidationError::identifier(
                param,
                format!("'{}' contains an empty path segment", path),
            ));
        }
        if segment == "." || segment == ".." || segment.starts_with('-') {
            return Err(ValidationError::identifier(
                param,
                format!("'{}' is not a valid path segment", segment),
            ));
        }
        if let Some(c) = segment
            .chars()
            .find(|c| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.')))
        {
            return Err(ValidationError::identifier(
                param,
                format!("path '{}' contains disallowed character {:?}", path, c),
            ));
        }
    }
    Ok(path.to_string())
}

/// Validate a numeric resource ID (issue IID, pipeline ID, user ID, ...).
pub fn positive_id(param: &str, value: i64) -> Result<u64, ValidationError> {
    if value > 0 {
        Ok(value as u64)
    } else {
        Err(ValidationError::identifier(
            param,
            format!("must be a positive integer, got {}", value),
        ))
    }
}

/// Validate paging parameters, applying defaults for absent values.
///
/// Out-of-range values are rejected rather than clamped.
pub fn pagination(
    page: Option<&IntInput>,
    per_page: Option<&IntInput>,
) -> Result<Pagination, ValidationError> {
    let page = match page {
        None => DEFAULT_PAGE,
        Some(input) => match input.to_i64() {
            Some(p) if p >= 1 && p <= u32::MAX as i64 => p as u32,
            _ => {
                return Err(ValidationError::pagination(
                    "page",
                    format!("must be a positive integer, got {}", input),
                ));
            }
        },
    };
    let per_page = match per_page {
        None => DEFAULT_PER_PAGE,
        Some(input) => match input.to_i64() {
            Some(n) if n >= 1 && n <= MAX_PER_PAGE as i64 => n as u32,
            _ => {
                return Err(ValidationError::pagination(
                    "per_page",
                    format!("must be an integer between 1 and {}, got {}", MAX_PER_PAGE, input),
                ));
            }
        },
    };
    Ok(Pagination { page, per_page })
}

/// Validate a branch, tag or other git reference name.
///
/// Applies the rules of `git check-ref-format` that matter for API calls:
/// no control characters, no leading `-`, none of `space ~ ^ : ? * [ \`,
/// no `..` or `@{`, no empty components, and no `.lock` or `.` suffix.
pub fn reference(param: &str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    let reject = |reason: String| Err(ValidationError::reference(param, reason));

    if value.is_empty() {
        return reject("must not be empty".to_string());
    }
    if let Some(c) = value.chars().find(|c| c.is_control()) {
        return reject(format!("contains control character {:?}", c));
    }
    if value.starts_with('-') {
        return reject(format!("'{}' must not start with '-'", value));
    }
    if let Some(c) = value
        .chars()
        .find(|c| matches!(c, ' ' | '~' | '^' | ':' | '?' | '*' | '[' | '\\'))
    {
        return reject(format!("'{}' contains disallowed character {:?}", value, c));
    }
    if value.contains("..") || value.contains("@{") || value == "@" {
        return reject(format!("'{}' is not a valid git reference", value));
    }
    if value.starts_with('/') || value.ends_with('/') || value.contains("//") {
        return reject(format!("'{}' has an empty path component", value));
    }
    if value.ends_with('.') || value.ends_with(".lock") {
        return reject(format!("'{}' must not end with '.' or '.lock'", value));
    }
    if value.split('/').any(|component| component.starts_with('.')) {
        return reject(format!("'{}' has a component starting with '.'", value));
    }
    Ok(value.to_string())
}

/// Validate an optional git reference.
pub fn optional_reference(
    param: &str,
    value: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    value.map(|v| reference(param, v)).transpose()
}

/// Parse the `include_fields` parameter.
///
/// Absent means the resource's default set, `all` disables filtering, and
/// otherwise the value must be a comma-separated list with no empty entries.
pub fn include_fields(value: Option<&str>) -> Result<FieldSelection, ValidationError> {
    let Some(raw) = value else {
        return Ok(FieldSelection::Default);
    };
    if raw.trim().eq_ignore_ascii_case("all") {
        return Ok(FieldSelection::All);
    }

    let mut fields: Vec<String> = Vec::new();
    for (position, entry) in raw.split(',').enumerate() {
        let entry = entry.trim();
        if entry.is_empty() {
            return Err(ValidationError::field_list(
                "include_fields",
                format!("entry {} is empty in '{}'", position + 1, raw),
            ));
        }
        if entry.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ValidationError::field_list(
                "include_fields",
                format!("'{}' is not a field name", entry),
            ));
        }
        if !fields.iter().any(|f| f == entry) {
            fields.push(entry.to_string());
        }
    }
    Ok(FieldSelection::Only(fields))
}

/// Require a non-blank text value, returning it trimmed.
pub fn non_empty(param: &str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::argument(param, "must not be empty"))
    } else {
        Ok(value.to_string())
    }
}

/// Require an optional text value, when present, to be one of `allowed`.
pub fn one_of(
    param: &str,
    value: Option<&str>,
    allowed: &[&str],
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        None => Ok(None),
        Some(v) if allowed.contains(&v) => Ok(Some(v.to_string())),
        Some(v) => Err(ValidationError::argument(
            param,
            format!("'{}' is not one of: {}", v, allowed.join(", ")),
        )),
    }
}

/// Validate a visibility level.
pub fn visibility(value: Option<&str>) -> Result<Option<String>, ValidationError> {
    one_of("visibility", value, VISIBILITY_LEVELS)
}

/// Validate a member access level, defaulting to developer.
pub fn access_level(value: Option<i64>) -> Result<u8, ValidationError> {
    match value {
        None => Ok(DEFAULT_ACCESS_LEVEL),
        Some(level) => ACCESS_LEVELS
            .iter()
            .copied()
            .find(|allowed| i64::from(*allowed) == level)
            .ok_or_else(|| {
                ValidationError::argument(
                    "access_level",
                    format!(
                        "{} is not one of 10 (guest), 20 (reporter), 30 (developer), \
                         40 (maintainer), 50 (owner)",
                        level
                    ),
                )
            }),
    }
}

/// Validate a repository file path, returning it URL-encoded for the API.
pub fn file_path(param: &str, value: &str) -> Result<String, ValidationError> {
    let path = value.trim().trim_start_matches('/');
    if path.is_empty() {
        return Err(ValidationError::argument(param, "must not be empty"));
    }
    if path.chars().any(|c| c.is_control()) {
        return Err(ValidationError::argument(
            param,
            "must not contain control characters",
        ));
    }
    if path.split('/').any(|segment| segment == "..") {
        return Err(ValidationError::argument(
            param,
            format!("'{}' must not contain '..' segments", path),
        ));
    }
    Ok(urlencoding::encode(path).into_owned())
}

/// Validate file content against its declared encoding (`text` or `base64`).
pub fn file_content(encoding: Option<&str>, content: &str) -> Result<Option<String>, ValidationError> {
    let encoding = one_of("encoding", encoding, &["text", "base64"])?;
    if encoding.as_deref() == Some("base64") {
        base64::engine::general_purpose::STANDARD
            .decode(content.trim())
            .map_err(|e| {
                ValidationError::argument("content", format!("is not valid base64: {}", e))
            })?;
    }
    Ok(encoding)
}

/// Validate an optional calendar date in `YYYY-MM-DD` form.
pub fn optional_date(param: &str, value: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(value) = value.map(str::trim) else {
        return Ok(None);
    };
    let parts: Vec<&str> = value.split('-').collect();
    let well_formed = matches!(parts.as_slice(), [y, m, d]
        if y.len() == 4 && m.len() == 2 && d.len() == 2
            && parts.iter().all(|p| p.bytes().all(|b| b.is_ascii_digit())))
        && matches!(parts[1].parse::<u8>(), Ok(1..=12))
        && matches!(parts[2].parse::<u8>(), Ok(1..=31));
    if well_formed {
        Ok(Some(value.to_string()))
    } else {
        Err(ValidationError::argument(
            param,
            format!("'{}' is not a date in YYYY-MM-DD format", value),
        ))
    }
}
