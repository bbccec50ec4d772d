//! Test doubles shared by the use case tests.

use crate::config::TableNames;
use crate::ports::audit_log::{AuditEvent, AuditLog};
use crate::ports::record_store::{BatchOutcome, Filter, RecordStore, Row, StoreError, WriteOp};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

type TableMap = HashMap<String, Vec<Row>>;
type WriteHook = Box<dyn FnOnce(&mut TableMap) + Send>;

/// In-memory store that counts calls and can be told to fail writes.
#[derive(Default)]
pub(crate) struct MockStore {
    tables: Mutex<TableMap>,
    calls: AtomicUsize,
    writes: AtomicUsize,
    fail_writes_to: Mutex<Option<String>>,
    before_next_write: Mutex<Option<WriteHook>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, table: &str, rows: Vec<Value>) -> Self {
        let rows = rows
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect();
        self.tables.lock().unwrap().insert(table.to_string(), rows);
        self
    }

    /// Make every write touching `table` fail with a backend error
    pub fn fail_writes_to(&self, table: &str) {
        *self.fail_writes_to.lock().unwrap() = Some(table.to_string());
    }

    /// Run `hook` against the tables right before the next batch applies,
    /// standing in for another writer that got there first
    pub fn before_next_write(&self, hook: impl FnOnce(&mut TableMap) + Send + 'static) {
        *self.before_next_write.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Direct write that bypasses counters, for simulating a concurrent writer
    pub fn push_row(&self, table: &str, row: Value) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row.as_object().cloned().unwrap());
    }

    fn check_failure(&self, table: &str) -> Result<(), StoreError> {
        if self.fail_writes_to.lock().unwrap().as_deref() == Some(table) {
            return Err(StoreError::Backend(format!("write to {} failed", table)));
        }
        Ok(())
    }

    fn apply(
        tables: &mut HashMap<String, Vec<Row>>,
        op: WriteOp,
        outcome: &mut BatchOutcome,
    ) -> Result<(), StoreError> {
        match op {
            WriteOp::Insert { table, rows } => {
                outcome.inserted += rows.len();
                tables.entry(table).or_default().extend(rows);
            }
            WriteOp::Update {
                table,
                patch,
                filter,
            } => {
                for row in tables.entry(table).or_default().iter_mut() {
                    if filter.matches(row) {
                        for (k, v) in &patch {
                            row.insert(k.clone(), v.clone());
                        }
                        outcome.updated += 1;
                    }
                }
            }
            WriteOp::Delete { table, filter } => {
                let rows = tables.entry(table).or_default();
                let before = rows.len();
                rows.retain(|r| !filter.matches(r));
                outcome.deleted += before - rows.len();
            }
            WriteOp::ExpectNone { table, filter } => {
                let hit = tables
                    .get(&table)
                    .is_some_and(|rows| rows.iter().any(|r| filter.matches(r)));
                if hit {
                    return Err(StoreError::Conflict {
                        table,
                        message: "precondition matched existing rows".to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MockStore {
    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut rows: Vec<Row> = self
            .rows(table)
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        filter.sort(&mut rows);
        Ok(rows)
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
        self.batch(vec![WriteOp::Update {
            table: table.to_string(),
            patch,
            filter: filter.clone(),
        }])
        .await?;
        self.select(table, filter).await
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
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.writes.fetch_add(1, Ordering::SeqCst);
        for op in &ops {
            if !matches!(op, WriteOp::ExpectNone { .. }) {
                self.check_failure(op.table())?;
            }
        }

        let hook = self.before_next_write.lock().unwrap().take();
        if let Some(hook) = hook {
            hook(&mut *self.tables.lock().unwrap());
        }

        let mut tables = self.tables.lock().unwrap();
        let mut staged = tables.clone();
        let mut outcome = BatchOutcome::default();
        for op in ops {
            Self::apply(&mut staged, op, &mut outcome)?;
        }
        *tables = staged;
        Ok(outcome)
    }
}

/// Audit log that keeps every event in memory
#[derive(Default)]
pub(crate) struct RecordingAudit {
    events: Mutex<Vec<(String, Value)>>,
}

impl RecordingAudit {
    pub fn event_types(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(t, _)| t.clone())
            .collect()
    }

    /// Payload of the last event of `event_type`
    pub fn payload(&self, event_type: &str) -> Option<Value> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(t, _)| t == event_type)
            .map(|(_, p)| p.clone())
    }
}

impl AuditLog for RecordingAudit {
    fn record(&self, event: AuditEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event.event_type.to_string(), event.payload));
    }
}

/// Three agents (Ana, Ben active; Cal inactive) and ten unassigned leads.
pub(crate) fn seeded_store(tables: &TableNames) -> MockStore {
    let leads = (1..=10)
        .map(|i| {
            json!({
                "id": format!("L{}", i),
                "name": format!("Lead {}", i),
                "course_id": if i <= 6 { "rust-101" } else { "go-201" },
                "value": (i * 100) as f64,
            })
        })
        .collect();

    MockStore::new()
        .with_rows(
            &tables.agents,
            vec![
                json!({"id": 1, "name": "Ana", "is_active": true}),
                json!({"id": 2, "name": "Ben", "is_active": true}),
                json!({"id": 3, "name": "Cal", "is_active": false}),
            ],
        )
        .with_rows(&tables.leads, leads)
        .with_rows(
            &tables.pipeline_stages,
            vec![
                json!({"id": "won", "pipeline_id": "sales", "name": "Won", "stage_order": 3}),
                json!({"id": "new", "pipeline_id": "sales", "name": "New", "stage_order": 1}),
                json!({"id": "call", "pipeline_id": "sales", "name": "Call", "stage_order": 2}),
            ],
        )
}

/// An assignment row as the use cases write it
pub(crate) fn assignment_row(lead: &str, agent: i64) -> Value {
    json!({
        "lead_id": lead,
        "agent_id": agent,
        "assigned_by": "seed",
        "assignment_type": "manual",
        "status": "active",
        "assigned_at": "2026-01-05T09:00:00Z",
    })
}
