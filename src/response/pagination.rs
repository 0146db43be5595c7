//! Pagination metadata derived from GitLab's response headers

use crate::validation::Pagination;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde_json::Value;

/// Pagination headers of a GitLab list response.
///
/// GitLab omits `X-Total`/`X-Total-Pages` for large collections, and sends an
/// empty `X-Next-Page` on the last page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageHeaders {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Whether `X-Next-Page` was present at all (even if empty)
    pub has_next_header: bool,
    pub next_page: Option<u32>,
    pub total: Option<u64>,
    pub total_pages: Option<u32>,
}

impl PageHeaders {
    /// Read the `X-*` pagination headers
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let text = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
        };
        let number = |name: &str| text(name).and_then(|v| v.parse().ok());

        Self {
            page: number("x-page"),
            per_page: number("x-per-page"),
            has_next_header: text("x-next-page").is_some(),
            next_page: number("x-next-page"),
            total: text("x-total").and_then(|v| v.parse().ok()),
            total_pages: number("x-total-pages"),
        }
    }
}

/// Result envelope of a list tool: the filtered items plus pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEnvelope {
    pub items: Vec<Value>,
    pub page: u32,
    pub per_page: u32,
    pub has_next: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
}

impl ListEnvelope {
    /// Compute the metadata for one page of `items`.
    ///
    /// `X-Next-Page` decides `has_next` when present. Without it, a full page
    /// is taken to mean more items may follow.
    pub fn new(items: Vec<Value>, requested: Pagination, headers: &PageHeaders) -> Self {
        let page = headers.page.unwrap_or(requested.page);
        let per_page = headers.per_page.unwrap_or(requested.per_page);

        let (has_next, next_page) = if headers.has_next_header {
            (headers.next_page.is_some(), headers.next_page)
        } else {
            let full = per_page > 0 && items.len() >= per_page as usize;
            (full, full.then(|| page.saturating_add(1)))
        };

        Self {
            items,
            page,
            per_page,
            has_next,
            next_page,
            total: headers.total,
            total_pages: headers.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_next_page_and_total() {
        let parsed = PageHeaders::from_headers(&headers(&[
            ("x-next-page", "3"),
            ("x-total", "57"),
            ("x-page", "2"),
            ("x-per-page", "20"),
        ]));
        let envelope = ListEnvelope::new(vec![json!({"id": 1})], Pagination::default(), &parsed);

        assert!(envelope.has_next);
        assert_eq!(envelope.next_page, Some(3));
        assert_eq!(envelope.total, Some(57));
        assert_eq!(envelope.page, 2);
    }

    #[test]
    fn test_last_page_has_empty_next_header() {
        let parsed = PageHeaders::from_headers(&headers(&[
            ("x-next-page", ""),
            ("x-total", "2"),
            ("x-total-pages", "1"),
        ]));
        let items = vec![json!({"id": 1}), json!({"id": 2})];
        let requested = Pagination {
            page: 1,
            per_page: 2,
        };
        let envelope = ListEnvelope::new(items, requested, &parsed);

        assert!(!envelope.has_next);
        assert_eq!(envelope.next_page, None);
        assert_eq!(envelope.total_pages, Some(1));
    }

    #[test]
    fn test_fallback_without_headers() {
        let requested = Pagination {
            page: 4,
            per_page: 2,
        };
        let full = ListEnvelope::new(
            vec![json!(1), json!(2)],
            requested,
            &PageHeaders::default(),
        );
        assert!(full.has_next);
        assert_eq!(full.next_page, Some(5));
        assert_eq!(full.total, None);

        let short = ListEnvelope::new(vec![json!(1)], requested, &PageHeaders::default());
        assert!(!short.has_next);
        assert_eq!(short.next_page, None);
    }

    #[test]
    fn test_absent_values_not_serialized() {
        let envelope = ListEnvelope::new(vec![], Pagination::default(), &PageHeaders::default());
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({"items": [], "page": 1, "per_page": 20, "has_next": false})
        );
    }

    #[test]
    fn test_unparseable_headers_ignored() {
        let parsed = PageHeaders::from_headers(&headers(&[("x-total", "lots")]));
        assert_eq!(parsed.total, None);
        assert!(!parsed.has_next_header);
    }
}
