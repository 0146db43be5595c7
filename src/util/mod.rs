//! Utility functions shared across the application.

pub mod redact;
mod secret;

pub use redact::{REDACTED, redact, scrub_secrets};
pub use secret::SecretString;

use crate::validation::Pagination;
use std::fmt::Display;

/// Builder for URL query parameters.
///
/// Provides a fluent API for constructing query strings with proper URL encoding.
///
/// # Example
/// ```ignore
/// let query = QueryBuilder::new()
///     .param("page", 1)
///     .optional("state", Some("opened"))
///     .optional("labels", None::<&str>)
///     .build();
/// // Returns "?page=1&state=opened"
/// ```
#[derive(Default)]
pub struct QueryBuilder {
    params: Vec<(String, String)>,
}

impl QueryBuilder {
    /// Create a new empty query builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required parameter (always included).
    pub fn param(mut self, key: &str, value: impl Display) -> Self {
        self.params.push((
            key.to_string(),
            urlencoding::encode(&value.to_string()).into_owned(),
        ));
        self
    }

    /// Add an optional parameter (only included if Some).
    pub fn optional<T: Display>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    /// Add an optional text parameter, skipping blank values.
    pub fn optional_text<T: AsRef<str>>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(v) if !v.as_ref().trim().is_empty() => self.param(key, v.as_ref().trim()),
            _ => self,
        }
    }

    /// Add validated `page` and `per_page` parameters.
    pub fn page(self, pagination: Pagination) -> Self {
        self.param("page", pagination.page)
            .param("per_page", pagination.per_page)
    }

    /// Build the query string.
    ///
    /// Returns an empty string if no parameters were added,
    /// otherwise returns "?key1=value1&key2=value2...".
    pub fn build(self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .into_iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query() {
        assert_eq!(QueryBuilder::new().build(), "");
    }

    #[test]
    fn test_params_are_encoded() {
        let query = QueryBuilder::new()
            .param("page", 2)
            .param("search", "a b&c")
            .build();
        assert_eq!(query, "?page=2&search=a%20b%26c");
    }

    #[test]
    fn test_optional_skips_none() {
        let query = QueryBuilder::new()
            .optional("state", Some("opened"))
            .optional("labels", None::<&str>)
            .build();
        assert_eq!(query, "?state=opened");
    }

    #[test]
    fn test_optional_text_skips_blank() {
        let query = QueryBuilder::new()
            .optional_text("search", Some("  "))
            .optional_text("ref_name", Some(" main "))
            .build();
        assert_eq!(query, "?ref_name=main");
    }

    #[test]
    fn test_page_params() {
        let query = QueryBuilder::new()
            .page(Pagination {
                page: 3,
                per_page: 50,
            })
            .build();
        assert_eq!(query, "?page=3&per_page=50");
    }
}
