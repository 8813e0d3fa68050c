//! SQL building and row decoding for revision queries.

use revisor_core::codec::{BodyStorage, StoredBody};
use revisor_core::config::RevisionerConfig;
use revisor_core::errors::{ExError, Result, RevisionError};
use revisor_core::model::{InstanceId, InstanceIdType, PrimaryKeyStrategy, RevisionId};
use revisor_core::query::{RevisionField, RevisionQuery, SortOrder};
use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue};
use chrono::{DateTime, Utc};

/// Binds a stored body as JSON text
///
/// Native bodies are written as their JSON rendering so a top-level `null`
/// lands as the text `null` rather than SQL NULL.
pub(crate) struct SqlBody<'a>(pub &'a StoredBody);

impl ToSql for SqlBody<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self.0 {
            StoredBody::Native(value) => serde_json::to_string(value)
                .map(ToSqlOutput::from)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e))),
            StoredBody::Text(text) => text.to_sql(),
        }
    }
}

pub(crate) fn revision_id_value(id: Option<&RevisionId>) -> SqlValue {
    match id {
        Some(RevisionId::Integer(v)) => SqlValue::Integer(*v),
        Some(RevisionId::Token(v)) => SqlValue::Text(v.clone()),
        None => SqlValue::Null,
    }
}

pub(crate) fn instance_id_value(id: &InstanceId) -> SqlValue {
    match id {
        InstanceId::Integer(v) => SqlValue::Integer(*v),
        InstanceId::Token(v) => SqlValue::Text(v.clone()),
    }
}

pub(crate) fn read_revision_id(
    row: &rusqlite::Row<'_>,
    idx: usize,
    strategy: PrimaryKeyStrategy,
) -> rusqlite::Result<RevisionId> {
    Ok(match strategy {
        PrimaryKeyStrategy::Integer => RevisionId::Integer(row.get(idx)?),
        PrimaryKeyStrategy::Token => RevisionId::Token(row.get(idx)?),
    })
}

pub(crate) fn read_instance_id(
    row: &rusqlite::Row<'_>,
    idx: usize,
    id_type: InstanceIdType,
) -> rusqlite::Result<InstanceId> {
    Ok(match id_type {
        InstanceIdType::Integer => InstanceId::Integer(row.get(idx)?),
        InstanceIdType::Token => InstanceId::Token(row.get(idx)?),
    })
}

pub(crate) fn read_body(
    row: &rusqlite::Row<'_>,
    idx: usize,
    storage: BodyStorage,
) -> rusqlite::Result<StoredBody> {
    Ok(match storage {
        BodyStorage::Native => StoredBody::Native(row.get(idx)?),
        BodyStorage::Serialized => StoredBody::Text(row.get(idx)?),
    })
}

pub(crate) fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        ExError::from(RevisionError::CorruptRow {
            column: "created_at".to_string(),
            reason: format!("{} is out of range", millis),
        })
    })
}

/// A row before its body is decoded
pub(crate) struct RawRow {
    pub id: RevisionId,
    pub created_at: i64,
    pub instance_type: Option<String>,
    pub instance_id: Option<InstanceId>,
    pub body: Option<StoredBody>,
}

/// A SELECT statement with its bound parameters and column layout
pub(crate) struct SelectPlan {
    pub sql: String,
    pub params: Vec<SqlValue>,
    instance_type_col: Option<usize>,
    instance_id_col: Option<usize>,
    body_col: Option<usize>,
}

impl SelectPlan {
    pub fn build(config: &RevisionerConfig, query: &RevisionQuery) -> Self {
        let mut columns = vec!["id", "created_at"];
        let mut take = |name: &'static str, wanted: bool| {
            if wanted {
                columns.push(name);
                Some(columns.len() - 1)
            } else {
                None
            }
        };
        let projection = &query.projection;
        let instance_type_col = take(
            "instance_type",
            projection.includes(RevisionField::InstanceType),
        );
        let instance_id_col = take("instance_id", projection.includes(RevisionField::InstanceId));
        let body_col = take("body", projection.includes(RevisionField::Body));

        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<SqlValue> = Vec::new();

        if let Some((instance_type, instance_id)) = &query.scope {
            clauses.push("instance_type = ?".to_string());
            params.push(SqlValue::Text(instance_type.clone()));
            clauses.push("instance_id = ?".to_string());
            params.push(instance_id_value(instance_id));
        }
        if let Some(from) = query.filter.created_from {
            clauses.push("created_at >= ?".to_string());
            params.push(SqlValue::Integer(from.timestamp_millis()));
        }
        if let Some(before) = query.filter.created_before {
            clauses.push("created_at < ?".to_string());
            params.push(SqlValue::Integer(before.timestamp_millis()));
        }
        if let Some(ids) = &query.filter.ids {
            if ids.is_empty() {
                clauses.push("0".to_string());
            } else {
                let marks = vec!["?"; ids.len()].join(", ");
                clauses.push(format!("id IN ({})", marks));
                params.extend(ids.iter().map(|id| revision_id_value(Some(id))));
            }
        }

        let mut sql = format!("SELECT {} FROM {}", columns.join(", "), config.table_name);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        // rowid breaks ties between revisions created in the same millisecond
        let direction = match query.order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };
        sql.push_str(&format!(
            " ORDER BY created_at {dir}, rowid {dir}",
            dir = direction
        ));

        match (query.limit, query.offset) {
            (Some(limit), offset) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                params.push(SqlValue::Integer(i64::from(limit)));
                params.push(SqlValue::Integer(i64::from(offset.unwrap_or(0))));
            }
            (None, Some(offset)) => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                params.push(SqlValue::Integer(i64::from(offset)));
            }
            (None, None) => {}
        }

        Self {
            sql,
            params,
            instance_type_col,
            instance_id_col,
            body_col,
        }
    }

    pub fn read_row(
        &self,
        row: &rusqlite::Row<'_>,
        config: &RevisionerConfig,
    ) -> rusqlite::Result<RawRow> {
        Ok(RawRow {
            id: read_revision_id(row, 0, config.primary_key)?,
            created_at: row.get(1)?,
            instance_type: self.instance_type_col.map(|i| row.get(i)).transpose()?,
            instance_id: self
                .instance_id_col
                .map(|i| read_instance_id(row, i, config.instance_id_type))
                .transpose()?,
            body: self
                .body_col
                .map(|i| read_body(row, i, config.body_storage))
                .transpose()?,
        })
    }
}
