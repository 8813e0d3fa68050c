//! Query options for reading revisions
//!
//! `RevisionQuery` is the store-level query. `ListOptions` is what history
//! callers pass; it has no scope field, so a caller can narrow or reorder a
//! history but never widen it past one `(instance_type, instance_id)`.

use crate::model::{InstanceId, RevisionId};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Ordering by creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Oldest first
    #[default]
    Ascending,
    /// Newest first
    Descending,
}

/// Optional columns a projection can select
///
/// `id` and `created_at` are always selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RevisionField {
    InstanceType,
    InstanceId,
    Body,
}

/// Column selection for a query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Projection {
    fields: BTreeSet<RevisionField>,
}

impl Projection {
    /// Only `id` and `created_at`
    pub fn summary() -> Self {
        Self::default()
    }

    /// Every column
    pub fn full() -> Self {
        Self::summary()
            .with(RevisionField::InstanceType)
            .with(RevisionField::InstanceId)
            .with(RevisionField::Body)
    }

    pub fn with(mut self, field: RevisionField) -> Self {
        self.fields.insert(field);
        self
    }

    pub fn includes(&self, field: RevisionField) -> bool {
        self.fields.contains(&field)
    }

    pub fn is_full(&self) -> bool {
        self.fields.len() == 3
    }
}

/// Caller-supplied narrowing of a history
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryFilter {
    /// Inclusive lower bound on `created_at`
    pub created_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `created_at`
    pub created_before: Option<DateTime<Utc>>,
    /// Restrict to these revision ids
    pub ids: Option<Vec<RevisionId>>,
}

/// Options for listing one instance's history
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListOptions {
    pub filter: HistoryFilter,
    pub order: SortOrder,
    pub projection: Projection,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListOptions {
    pub fn full() -> Self {
        Self {
            projection: Projection::full(),
            ..Self::default()
        }
    }

    pub fn newest_first(mut self) -> Self {
        self.order = SortOrder::Descending;
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_filter(mut self, filter: HistoryFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Store-level query
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RevisionQuery {
    /// `(instance_type, instance_id)` the query is confined to
    pub scope: Option<(String, InstanceId)>,
    pub filter: HistoryFilter,
    pub order: SortOrder,
    pub projection: Projection,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl RevisionQuery {
    /// Scope caller options to one instance
    ///
    /// The scope always comes from the arguments; nothing in `options` can
    /// replace it.
    pub fn scoped(instance_type: &str, instance_id: &InstanceId, options: &ListOptions) -> Self {
        Self {
            scope: Some((instance_type.to_string(), instance_id.clone())),
            filter: options.filter.clone(),
            order: options.order,
            projection: options.projection.clone(),
            limit: options.limit,
            offset: options.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_list_options() {
        let options = ListOptions::default();
        assert_eq!(options.order, SortOrder::Ascending);
        assert_eq!(options.projection, Projection::summary());
        assert!(!options.projection.includes(RevisionField::Body));
    }

    #[test]
    fn test_projection_builders() {
        assert!(Projection::full().is_full());
        let body_only = Projection::summary().with(RevisionField::Body);
        assert!(body_only.includes(RevisionField::Body));
        assert!(!body_only.includes(RevisionField::InstanceType));
        assert!(!body_only.is_full());
    }

    #[test]
    fn test_scoped_query_takes_scope_from_arguments() {
        let options = ListOptions::full().newest_first().with_limit(2);
        let query = RevisionQuery::scoped("Post", &InstanceId::Integer(1), &options);
        assert_eq!(
            query.scope,
            Some(("Post".to_string(), InstanceId::Integer(1)))
        );
        assert_eq!(query.order, SortOrder::Descending);
        assert_eq!(query.limit, Some(2));
        assert!(query.projection.is_full());
    }
}
