//! In-memory filtering of already fetched users and servers.
//!
//! A [`Filter`] copies the entities it is given, so later changes to the source
//! slice (or to the original wrappers) never show up in its results. Every chain
//! method consumes and returns the builder.

use chrono::{DateTime, Utc};
use ptero_core::types::SortOrder;
use std::cmp::Ordering;
use std::fmt;

/// A comparable attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Missing or null attribute
    Null,
    /// Boolean flag
    Bool(bool),
    /// Integer
    Int(i64),
    /// Text (timestamps are RFC 3339 text)
    Text(String),
}

impl FieldValue {
    /// Text form used by [`Filter::contains`].
    #[must_use]
    pub fn text(&self) -> String {
        self.to_string()
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self.sort_key(), other.sort_key()) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(&b),
            (Self::Int(a), Self::Int(b)) => a.cmp(&b),
            (Self::Text(a), Self::Text(b)) => a.cmp(&b),
            // Values of different kinds are left in place.
            _ => Ordering::Equal,
        }
    }

    // Null sorts as the empty string.
    fn sort_key(&self) -> Self {
        match self {
            Self::Null => Self::Text(String::new()),
            other => other.clone(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Text(value.to_string()), Self::Int)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Text(value.to_rfc3339())
    }
}

impl<T> From<Option<T>> for FieldValue
where
    T: Into<FieldValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Entities that a [`Filter`] can narrow.
pub trait Filterable: Clone {
    /// Field selector for this entity.
    type Field: Copy;

    /// Current value of `field`, or [`FieldValue::Null`] when unloaded.
    fn field(&self, field: Self::Field) -> FieldValue;

    /// Creation time, if loaded.
    fn created_at(&self) -> Option<DateTime<Utc>>;
}

/// Chainable, synchronous view over a snapshot of entities.
#[derive(Debug, Clone)]
pub struct Filter<E> {
    items: Vec<E>,
}

impl<E: Filterable> Filter<E> {
    /// Snapshot `items`.
    #[must_use]
    pub fn new(items: &[E]) -> Self {
        Self {
            items: items.to_vec(),
        }
    }

    /// Keep entities whose `field` equals `value`.
    #[must_use]
    pub fn where_eq(self, field: E::Field, value: impl Into<FieldValue>) -> Self {
        let value = value.into();
        self.retain(|item| item.field(field) == value)
    }

    /// Keep entities whose `field` differs from `value`.
    #[must_use]
    pub fn where_not(self, field: E::Field, value: impl Into<FieldValue>) -> Self {
        let value = value.into();
        self.retain(|item| item.field(field) != value)
    }

    /// Case-insensitive substring match on the text form of `field`.
    #[must_use]
    pub fn contains(self, field: E::Field, needle: &str) -> Self {
        let needle = needle.to_lowercase();
        self.retain(|item| item.field(field).text().to_lowercase().contains(&needle))
    }

    /// Stable sort by `field`.
    #[must_use]
    pub fn sort(mut self, field: E::Field, order: SortOrder) -> Self {
        self.items.sort_by(|a, b| {
            let ordering = a.field(field).compare(&b.field(field));
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        self
    }

    /// Keep at most `count` entities.
    #[must_use]
    pub fn limit(mut self, count: usize) -> Self {
        self.items.truncate(count);
        self
    }

    /// Skip the first `count` entities.
    #[must_use]
    pub fn offset(mut self, count: usize) -> Self {
        let count = count.min(self.items.len());
        self.items.drain(..count);
        self
    }

    /// Keep entities created strictly before `date`.
    #[must_use]
    pub fn created_before(self, date: DateTime<Utc>) -> Self {
        self.retain(|item| item.created_at().is_some_and(|created| created < date))
    }

    /// Keep entities created strictly after `date`.
    #[must_use]
    pub fn created_after(self, date: DateTime<Utc>) -> Self {
        self.retain(|item| item.created_at().is_some_and(|created| created > date))
    }

    /// Current result set.
    #[must_use]
    pub fn get(&self) -> &[E] {
        &self.items
    }

    /// Consume the filter and return the result set.
    #[must_use]
    pub fn into_vec(self) -> Vec<E> {
        self.items
    }

    /// First entity, if any.
    #[must_use]
    pub fn first(&self) -> Option<&E> {
        self.items.first()
    }

    /// Last entity, if any.
    #[must_use]
    pub fn last(&self) -> Option<&E> {
        self.items.last()
    }

    /// Number of entities left.
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    fn retain(mut self, keep: impl Fn(&E) -> bool) -> Self {
        self.items.retain(|item| keep(item));
        self
    }
}
