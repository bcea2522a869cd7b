//! Response envelopes and list parameters shared by every panel resource.
//!
//! The panel wraps single resources as `{ "object": ..., "attributes": {...} }`
//! and collections as `{ "object": "list", "data": [...], "meta": { "pagination": ... } }`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::query::QueryParams;

/// Single-resource envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item<A> {
    /// Object kind (e.g. "user", "server")
    #[serde(default)]
    pub object: String,
    /// Resource attributes
    pub attributes: A,
}

impl<A> Item<A> {
    /// Unwrap the attributes.
    pub fn into_attributes(self) -> A {
        self.attributes
    }
}

/// Collection envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<A> {
    /// Always "list" for collections
    #[serde(default)]
    pub object: String,
    /// Items on this page
    #[serde(default = "Vec::new")]
    pub data: Vec<Item<A>>,
    /// Pagination metadata, absent on unpaginated collections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ListMeta>,
}

impl<A> ListResponse<A> {
    /// Attributes of every item, in page order.
    pub fn into_attributes(self) -> Vec<A> {
        self.data.into_iter().map(Item::into_attributes).collect()
    }

    /// Pagination block, if the panel sent one.
    pub fn pagination(&self) -> Option<&Pagination> {
        self.meta.as_ref().map(|meta| &meta.pagination)
    }

    /// Whether another page follows this one.
    pub fn has_next_page(&self) -> bool {
        self.pagination()
            .is_some_and(|p| p.current_page < p.total_pages)
    }
}

/// `meta` block of a collection response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMeta {
    /// Paging information
    pub pagination: Pagination,
}

/// Paging information for a collection response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Total items across all pages
    pub total: u64,
    /// Items on this page
    pub count: u64,
    /// Page size
    pub per_page: u64,
    /// One-based page number
    pub current_page: u64,
    /// Number of pages
    pub total_pages: u64,
    /// Navigation links (`next`, `previous`)
    #[serde(default, deserialize_with = "links_or_empty")]
    pub links: HashMap<String, String>,
}

// The panel sends `[]` instead of `{}` when there are no links.
fn links_or_empty<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Links {
        Map(HashMap<String, String>),
        List(Vec<serde_json::Value>),
    }

    Ok(match Links::deserialize(deserializer)? {
        Links::Map(map) => map,
        Links::List(_) => HashMap::new(),
    })
}

/// Sort direction for list queries and in-memory filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending
    #[default]
    Asc,
    /// Descending
    Desc,
}

/// Query parameters accepted by panel list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    /// One-based page number
    pub page: Option<u32>,
    /// Page size
    pub per_page: Option<u32>,
    /// Relationships to include
    pub include: Vec<String>,
    /// `filter[field]=value` pairs
    pub filters: Vec<(String, String)>,
    /// Sort key; prefix with `-` for descending
    pub sort: Option<String>,
}

impl ListParams {
    /// Empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a page.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the page size.
    #[must_use]
    pub const fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Include a relationship.
    #[must_use]
    pub fn include(mut self, relationship: impl Into<String>) -> Self {
        self.include.push(relationship.into());
        self
    }

    /// Filter on a field.
    #[must_use]
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Sort by a field.
    #[must_use]
    pub fn sort(mut self, field: impl AsRef<str>, order: SortOrder) -> Self {
        self.sort = Some(match order {
            SortOrder::Asc => field.as_ref().to_string(),
            SortOrder::Desc => format!("-{}", field.as_ref()),
        });
        self
    }

    /// Render as query pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut params = QueryParams::new();
        params.push_opt("page", self.page);
        params.push_opt("per_page", self.per_page);
        params.push_list("include", &self.include);
        for (field, value) in &self.filters {
            params.push_filter(field, value);
        }
        params.push_opt("sort", self.sort.as_deref());
        params.into_pairs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Attrs {
        id: u64,
    }

    #[test]
    fn parses_list_envelope() {
        let body = json!({
            "object": "list",
            "data": [
                { "object": "user", "attributes": { "id": 1 } },
                { "object": "user", "attributes": { "id": 2 } }
            ],
            "meta": {
                "pagination": {
                    "total": 30, "count": 2, "per_page": 2,
                    "current_page": 1, "total_pages": 15,
                    "links": { "next": "https://panel/api/application/users?page=2" }
                }
            }
        });

        let list: ListResponse<Attrs> = serde_json::from_value(body).unwrap();
        assert!(list.has_next_page());
        assert_eq!(list.pagination().unwrap().total, 30);
        assert_eq!(list.into_attributes(), vec![Attrs { id: 1 }, Attrs { id: 2 }]);
    }

    #[test]
    fn empty_links_array_is_accepted() {
        let pagination: Pagination = serde_json::from_value(json!({
            "total": 1, "count": 1, "per_page": 50,
            "current_page": 1, "total_pages": 1, "links": []
        }))
        .unwrap();
        assert!(pagination.links.is_empty());
    }

    #[test]
    fn list_without_meta() {
        let list: ListResponse<Attrs> =
            serde_json::from_value(json!({ "object": "list", "data": [] })).unwrap();
        assert!(list.meta.is_none());
        assert!(!list.has_next_page());
    }

    #[test]
    fn list_params_render_in_order() {
        let pairs = ListParams::new()
            .page(2)
            .per_page(25)
            .include("allocations")
            .include("location")
            .filter("name", "alpha")
            .sort("id", SortOrder::Desc)
            .to_pairs();

        let expected: Vec<(String, String)> = [
            ("page", "2"),
            ("per_page", "25"),
            ("include", "allocations,location"),
            ("filter[name]", "alpha"),
            ("sort", "-id"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(pairs, expected);
    }
}
