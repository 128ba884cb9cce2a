//! Query filter expressions and canonical freshness keys
//!
//! A `QueryFilter` describes a batch query against the remote source. Its
//! canonical key is the identity used by the freshness tracker, so two
//! logically identical filters must encode to the same key no matter the
//! order their clauses were added in.

use crate::EntityType;
use serde::{Deserialize, Serialize};

/// Filter operator for field comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Equal to
    Eq,
    /// Not equal to
    Ne,
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
    /// Contains element (for array fields)
    Contains,
    /// In list of values
    In,
}

impl FilterOperator {
    fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "==",
            FilterOperator::Ne => "!=",
            FilterOperator::Gt => ">",
            FilterOperator::Gte => ">=",
            FilterOperator::Lt => "<",
            FilterOperator::Lte => "<=",
            FilterOperator::Contains => "contains",
            FilterOperator::In => "in",
        }
    }
}

/// A single field comparison within a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterClause {
    /// Field to filter on
    pub field: String,
    /// Operator to apply
    pub operator: FilterOperator,
    /// Value to compare against (JSON value for flexibility)
    pub value: serde_json::Value,
}

impl FilterClause {
    /// Create a new filter clause.
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: serde_json::Value,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Create an equality clause.
    pub fn eq(field: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(field, FilterOperator::Eq, value)
    }

    /// Create a greater-than-or-equal clause.
    pub fn gte(field: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(field, FilterOperator::Gte, value)
    }

    /// Create a less-than-or-equal clause.
    pub fn lte(field: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(field, FilterOperator::Lte, value)
    }

    /// Canonical `field<op>value` fragment used inside query keys.
    fn encode(&self) -> String {
        format!("{}{}{}", self.field, self.operator.as_str(), self.value)
    }
}

/// Sort direction for query ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// A batch query against one remote collection.
///
/// Result ordering is defined by `order_by` and honored by the remote
/// source; the cache layer preserves it and never reorders on merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryFilter {
    pub entity_type: EntityType,
    pub clauses: Vec<FilterClause>,
    pub order_by: Option<(String, SortDirection)>,
    pub limit: Option<u32>,
}

impl QueryFilter {
    /// Create an unconstrained query over a collection.
    pub fn all(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            clauses: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    /// Add a filter clause.
    pub fn with_clause(mut self, clause: FilterClause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Set the result ordering.
    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    /// Cap the number of results.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Canonical string identity for this query, used as its freshness key.
    ///
    /// Clauses are sorted by `(field, operator, value)` before encoding, so
    /// the key is insensitive to the order clauses were added in. Ordering
    /// and limit participate in the key: the same clauses with a different
    /// sort are a different query.
    pub fn canonical_key(&self) -> String {
        let mut fragments: Vec<String> = self.clauses.iter().map(FilterClause::encode).collect();
        fragments.sort();

        let mut key = format!("{}?{}", self.entity_type.as_str(), fragments.join("&"));
        if let Some((field, direction)) = &self.order_by {
            key.push_str(&format!("|order={}.{}", field, direction.as_str()));
        }
        if let Some(limit) = self.limit {
            key.push_str(&format!("|limit={}", limit));
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_key_is_clause_order_insensitive() {
        let a = QueryFilter::all(EntityType::Event)
            .with_clause(FilterClause::eq("host_id", json!("h1")))
            .with_clause(FilterClause::gte("ends_at", json!("2025-06-01T00:00:00Z")));
        let b = QueryFilter::all(EntityType::Event)
            .with_clause(FilterClause::gte("ends_at", json!("2025-06-01T00:00:00Z")))
            .with_clause(FilterClause::eq("host_id", json!("h1")));

        assert_eq!(a.canonical_key(), b.canonical_key());
    }

    #[test]
    fn test_canonical_key_distinguishes_collections() {
        let events = QueryFilter::all(EntityType::Event);
        let hosts = QueryFilter::all(EntityType::Host);
        assert_ne!(events.canonical_key(), hosts.canonical_key());
    }

    #[test]
    fn test_canonical_key_includes_order_and_limit() {
        let base = QueryFilter::all(EntityType::Event)
            .with_clause(FilterClause::eq("host_id", json!("h1")));
        let ordered = base.clone().order_by("starts_at", SortDirection::Asc);
        let limited = ordered.clone().limit(50);

        assert_ne!(base.canonical_key(), ordered.canonical_key());
        assert_ne!(ordered.canonical_key(), limited.canonical_key());
        assert!(limited.canonical_key().ends_with("|limit=50"));
    }

    #[test]
    fn test_canonical_key_distinguishes_operators() {
        let eq = QueryFilter::all(EntityType::Event)
            .with_clause(FilterClause::new("capacity", FilterOperator::Eq, json!(10)));
        let gte = QueryFilter::all(EntityType::Event)
            .with_clause(FilterClause::new("capacity", FilterOperator::Gte, json!(10)));
        assert_ne!(eq.canonical_key(), gte.canonical_key());
    }
}
