//! In-memory implementation of the [`RecordStore`] port.

use async_trait::async_trait;
use leadflow_application::{BatchOutcome, Filter, RecordStore, Row, StoreError, WriteOp};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// Tables held in memory behind a single lock.
///
/// Every batch is applied to a staged copy of the tables and swapped in only
/// when all of its ops succeed, so readers never observe half a batch.
/// Operations on a table that was never registered fail with
/// [`StoreError::UnknownTable`].
pub struct InMemoryRecordStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
}

impl InMemoryRecordStore {
    /// Create a store with the given (empty) tables
    pub fn new<'a>(tables: impl IntoIterator<Item = &'a str>) -> Self {
        Self::from_tables(
            tables
                .into_iter()
                .map(|t| (t.to_string(), Vec::new()))
                .collect(),
        )
    }

    pub fn from_tables(tables: HashMap<String, Vec<Row>>) -> Self {
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Copy of every table, for persistence
    pub async fn dump(&self) -> HashMap<String, Vec<Row>> {
        self.tables.read().await.clone()
    }

    fn apply(
        tables: &mut HashMap<String, Vec<Row>>,
        op: WriteOp,
        outcome: &mut BatchOutcome,
    ) -> Result<(), StoreError> {
        match op {
            WriteOp::Insert { table, rows } => {
                let target = rows_mut(tables, &table)?;
                outcome.inserted += rows.len();
                target.extend(rows);
            }
            WriteOp::Update {
                table,
                patch,
                filter,
            } => {
                for row in rows_mut(tables, &table)?.iter_mut() {
                    if filter.matches(row) {
                        for (column, value) in &patch {
                            row.insert(column.clone(), value.clone());
                        }
                        outcome.updated += 1;
                    }
                }
            }
            WriteOp::Delete { table, filter } => {
                let target = rows_mut(tables, &table)?;
                let before = target.len();
                target.retain(|row| !filter.matches(row));
                outcome.deleted += before - target.len();
            }
            WriteOp::ExpectNone { table, filter } => {
                let matched = rows_mut(tables, &table)?
                    .iter()
                    .filter(|row| filter.matches(row))
                    .count();
                if matched > 0 {
                    return Err(StoreError::Conflict {
                        table,
                        message: format!("{} rows already match the precondition", matched),
                    });
                }
            }
        }
        Ok(())
    }
}

fn rows_mut<'a>(
    tables: &'a mut HashMap<String, Vec<Row>>,
    table: &str,
) -> Result<&'a mut Vec<Row>, StoreError> {
    tables
        .get_mut(table)
        .ok_or_else(|| StoreError::UnknownTable(table.to_string()))
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        let tables = self.tables.read().await;
        let rows = tables
            .get(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
        let mut selected: Vec<Row> = rows.iter().filter(|r| filter.matches(r)).cloned().collect();
        filter.sort(&mut selected);
        trace!(table, matched = selected.len(), "select");
        Ok(selected)
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        self.batch(vec![WriteOp::Insert {
            table: table.to_string(),
            rows: rows.clone(),
        }])
        .await?;
        Ok(rows)
    }

    async fn update(
        &self,
        table: &str,
        patch: Row,
        filter: &Filter,
    ) -> Result<Vec<Row>, StoreError> {
        let mut tables = self.tables.write().await;
        let target = rows_mut(&mut tables, table)?;
        let mut updated = Vec::new();
        for row in target.iter_mut() {
            if filter.matches(row) {
                for (column, value) in &patch {
                    row.insert(column.clone(), value.clone());
                }
                updated.push(row.clone());
            }
        }
        debug!(table, updated = updated.len(), "update");
        Ok(updated)
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<(), StoreError> {
        self.batch(vec![WriteOp::Delete {
            table: table.to_string(),
            filter: filter.clone(),
        }])
        .await
        .map(|_| ())
    }

    async fn batch(&self, ops: Vec<WriteOp>) -> Result<BatchOutcome, StoreError> {
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();
        let mut outcome = BatchOutcome::default();
        let count = ops.len();

        for op in ops {
            Self::apply(&mut staged, op, &mut outcome)?;
        }

        *tables = staged;
        debug!(
            ops = count,
            inserted = outcome.inserted,
            updated = outcome.updated,
            deleted = outcome.deleted,
            "batch committed"
        );
        Ok(outcome)
    }
}
