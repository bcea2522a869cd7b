//! Convenience builder for HTTP query parameters.
//!
//! Panel list endpoints take bracketed keys such as `filter[email]`, so keys
//! are owned strings rather than literals.

use std::fmt::Display;

/// Builder for assembling query parameter pairs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a key/value pair when the value is present.
    pub fn push_opt<T>(&mut self, key: impl Into<String>, value: Option<T>)
    where
        T: Display,
    {
        if let Some(value) = value {
            self.pairs.push((key.into(), value.to_string()));
        }
    }

    /// Append a required key/value pair.
    pub fn push<T>(&mut self, key: impl Into<String>, value: T)
    where
        T: Display,
    {
        self.pairs.push((key.into(), value.to_string()));
    }

    /// Append `values` joined by commas, skipping empty lists.
    pub fn push_list<I, T>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        if !joined.is_empty() {
            self.pairs.push((key.into(), joined));
        }
    }

    /// Append `filter[field]=value`.
    pub fn push_filter<T>(&mut self, field: &str, value: T)
    where
        T: Display,
    {
        self.pairs.push((format!("filter[{field}]"), value.to_string()));
    }

    /// Return the collected key/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }

    /// Returns true if no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::QueryParams;

    #[test]
    fn push_opt_skips_none() {
        let mut params = QueryParams::new();
        params.push_opt("page", Option::<u32>::None);
        assert!(params.is_empty());
    }

    #[test]
    fn push_list_joins_and_skips_empty() {
        let mut params = QueryParams::new();
        params.push_list("include", Vec::<String>::new());
        params.push_list("include", ["allocations", "location"]);
        assert_eq!(
            params.into_pairs(),
            vec![("include".to_string(), "allocations,location".to_string())]
        );
    }

    #[test]
    fn push_filter_brackets_key() {
        let mut params = QueryParams::new();
        params.push_filter("email", "a@b.c");
        assert_eq!(
            params.into_pairs(),
            vec![("filter[email]".to_string(), "a@b.c".to_string())]
        );
    }
}
