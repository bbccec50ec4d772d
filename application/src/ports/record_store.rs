//! Record Store port
//!
//! The hosted relational store the use cases read from and write to. Tables
//! are addressed by name and rows are JSON objects, so the port carries no
//! knowledge of the schema beyond the column names the use cases filter on.

use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use thiserror::Error;

/// A single table row.
pub type Row = serde_json::Map<String, Value>;

/// Errors that can occur when talking to the store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// An `ExpectNone` precondition matched rows; nothing was written.
    #[error("Conflict on {table}: {message}")]
    Conflict { table: String, message: String },

    #[error("Could not decode row from {table}: {message}")]
    Decode { table: String, message: String },

    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// One condition of a [`Filter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(String, Value),
    In(String, Vec<Value>),
    IsNull(String),
    NotNull(String),
}

impl Condition {
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Condition::Eq(column, value) => row.get(column) == Some(value),
            Condition::In(column, values) => {
                row.get(column).is_some_and(|v| values.contains(v))
            }
            Condition::IsNull(column) => row.get(column).is_none_or(Value::is_null),
            Condition::NotNull(column) => row.get(column).is_some_and(|v| !v.is_null()),
        }
    }
}

/// Sort order for `select`
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

/// Conjunction of conditions plus an optional ordering.
///
/// An empty filter matches every row.
///
/// # Example
///
/// ```
/// use leadflow_application::Filter;
/// use serde_json::json;
///
/// let filter = Filter::new()
///     .eq("agent_id", json!(3))
///     .in_list("lead_id", vec![json!("L1"), json!("L2")]);
///
/// let row = json!({"agent_id": 3, "lead_id": "L2"});
/// assert!(filter.matches(row.as_object().unwrap()));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
    order: Option<OrderBy>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Eq(column.into(), value.into()));
        self
    }

    pub fn in_list(mut self, column: impl Into<String>, values: Vec<Value>) -> Self {
        self.conditions.push(Condition::In(column.into(), values));
        self
    }

    pub fn is_null(mut self, column: impl Into<String>) -> Self {
        self.conditions.push(Condition::IsNull(column.into()));
        self
    }

    pub fn not_null(mut self, column: impl Into<String>) -> Self {
        self.conditions.push(Condition::NotNull(column.into()));
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(OrderBy {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn order(&self) -> Option<&OrderBy> {
        self.order.as_ref()
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.conditions.iter().all(|c| c.matches(row))
    }

    /// Sort `rows` in place according to this filter's ordering, if any.
    ///
    /// Numbers compare numerically, strings lexically; nulls sort first.
    pub fn sort(&self, rows: &mut [Row]) {
        let Some(order) = &self.order else {
            return;
        };
        rows.sort_by(|a, b| {
            let ord = compare_values(a.get(&order.column), b.get(&order.column));
            if order.ascending { ord } else { ord.reverse() }
        });
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

/// One step of an all-or-nothing [`RecordStore::batch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Insert {
        table: String,
        rows: Vec<Row>,
    },
    /// Merge `patch` into every matching row
    Update {
        table: String,
        patch: Row,
        filter: Filter,
    },
    Delete {
        table: String,
        filter: Filter,
    },
    /// Optimistic precondition: abort the batch if any row matches
    ExpectNone {
        table: String,
        filter: Filter,
    },
}

impl WriteOp {
    pub fn table(&self) -> &str {
        match self {
            WriteOp::Insert { table, .. }
            | WriteOp::Update { table, .. }
            | WriteOp::Delete { table, .. }
            | WriteOp::ExpectNone { table, .. } => table,
        }
    }
}

/// Row counts touched by a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

/// Port for the relational store.
///
/// `batch` is the only multi-step write: either every op in it takes
/// effect or none does. Use cases use it for every replacement so a failure
/// never leaves a lead half reassigned.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Rows of `table` matching `filter`, in the filter's order
    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError>;

    /// Insert rows, returning them as stored
    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError>;

    /// Merge `patch` into matching rows, returning the updated rows
    async fn update(&self, table: &str, patch: Row, filter: &Filter)
    -> Result<Vec<Row>, StoreError>;

    async fn delete(&self, table: &str, filter: &Filter) -> Result<(), StoreError>;

    /// Apply `ops` in order as a single all-or-nothing unit
    async fn batch(&self, ops: Vec<WriteOp>) -> Result<BatchOutcome, StoreError>;
}
