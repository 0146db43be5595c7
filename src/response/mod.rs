//! Response shaping
//!
//! Turns raw GitLab JSON into tool results: field filtering by resource type
//! or caller request, and pagination metadata for list endpoints.

pub mod fields;
pub mod filter;
pub mod pagination;

pub use fields::{FieldSelection, ResourceType};
pub use filter::filter_fields;
pub use pagination::{ListEnvelope, PageHeaders};

use crate::validation::Pagination;
use serde_json::Value;

/// Filter a single-resource body (object) according to `selection`.
pub fn shape(resource: Option<ResourceType>, body: Value, selection: &FieldSelection) -> Value {
    match selection.resolve(resource) {
        Some(fields) => filter_fields(body, &fields),
        None => body,
    }
}

/// Filter every item of a list page and attach pagination metadata.
///
/// The metadata is computed from the unfiltered page and is never filtered itself.
pub fn shape_list(
    resource: Option<ResourceType>,
    items: Vec<Value>,
    selection: &FieldSelection,
    requested: Pagination,
    headers: &PageHeaders,
) -> ListEnvelope {
    let items = match selection.resolve(resource) {
        Some(fields) => items
            .into_iter()
            .map(|item| filter_fields(item, &fields))
            .collect(),
        None => items,
    };
    ListEnvelope::new(items, requested, headers)
}
