//! JSON snapshot persistence for [`InMemoryRecordStore`].
//!
//! A snapshot is one JSON object mapping table names to arrays of rows:
//!
//! ```json
//! { "agents": [{ "id": 1, "name": "Ana", "is_active": true }], "leads": [] }
//! ```

use super::InMemoryRecordStore;
use leadflow_application::Row;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while reading or writing a snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid snapshot {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid snapshot {path}: {message}")]
    Shape { path: PathBuf, message: String },
}

impl InMemoryRecordStore {
    /// Load a store from `path`, registering `tables` even when the file
    /// lacks them. A missing file yields a store with empty tables.
    pub async fn load_snapshot<'a>(
        path: &Path,
        tables: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, SnapshotError> {
        let mut data: HashMap<String, Vec<Row>> = HashMap::new();

        match tokio::fs::read_to_string(path).await {
            Ok(contents) => {
                data = parse_snapshot(path, &contents)?;
                info!(path = %path.display(), tables = data.len(), "Loaded snapshot");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No snapshot found, starting empty");
            }
            Err(source) => {
                return Err(SnapshotError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }

        for table in tables {
            data.entry(table.to_string()).or_default();
        }
        Ok(Self::from_tables(data))
    }

    /// Write every table to `path`.
    ///
    /// The snapshot is written to a sibling temp file first and renamed into
    /// place, so an interrupted save leaves the previous file intact.
    pub async fn save_snapshot(&self, path: &Path) -> Result<(), SnapshotError> {
        let tables = self.dump().await;
        let ordered: std::collections::BTreeMap<_, _> = tables.into_iter().collect();
        let json = serde_json::to_string_pretty(&ordered).map_err(|source| SnapshotError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        let io_err = |source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(io_err)?;

        info!(path = %path.display(), "Saved snapshot");
        Ok(())
    }
}

fn parse_snapshot(path: &Path, contents: &str) -> Result<HashMap<String, Vec<Row>>, SnapshotError> {
    let shape = |message: String| SnapshotError::Shape {
        path: path.to_path_buf(),
        message,
    };

    let value: Value = serde_json::from_str(contents).map_err(|source| SnapshotError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let Value::Object(tables) = value else {
        return Err(shape("top level must be an object of tables".to_string()));
    };

    let mut data = HashMap::with_capacity(tables.len());
    for (table, rows) in tables {
        let Value::Array(rows) = rows else {
            return Err(shape(format!("table '{}' must be an array", table)));
        };
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| match row {
                Value::Object(row) => Ok(row),
                _ => Err(shape(format!("row {} of '{}' is not an object", i, table))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        data.insert(table, rows);
    }
    Ok(data)
}
