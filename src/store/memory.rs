use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::Value;

use crate::error::RemoteError;
use crate::model::{Blob, Id, Row};
use crate::store::traits::{BlobStore, RowStore};

#[derive(Default)]
struct MemoryInner {
    tables: HashMap<String, Vec<Row>>,
    blobs: Vec<(Blob, Vec<u8>)>,
    fail_next: Option<String>,
}

/// In-memory stand-in for the hosted store. Backs the integration tests and
/// local dry runs; `fail_next` lets a test inject one `RemoteError` into the
/// next matching call.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call against `op` ("create_row:menu", "delete_blob", ...)
    /// fail with a synthetic status error.
    pub fn fail_next(&self, op: &str) {
        self.inner.lock().fail_next = Some(op.to_string());
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.inner
            .lock()
            .tables
            .get(table)
            .map(|rows| rows.len())
            .unwrap_or(0)
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.inner
            .lock()
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn blob_count(&self) -> usize {
        self.inner.lock().blobs.len()
    }

    /// Pre-populate a table, as if left over from an earlier run.
    pub fn insert_row(&self, table: &str, row: Row) {
        self.inner
            .lock()
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    pub fn insert_blob(&self, blob: Blob, bytes: Vec<u8>) {
        self.inner.lock().blobs.push((blob, bytes));
    }

    fn check_fault(inner: &mut MemoryInner, op: &str) -> Result<(), RemoteError> {
        if inner.fail_next.as_deref() == Some(op) {
            inner.fail_next = None;
            return Err(RemoteError::Status {
                status: 503,
                url: format!("memory://{op}"),
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RowStore for MemoryStore {
    async fn list_rows(&self, table: &str) -> Result<Vec<Row>, RemoteError> {
        let mut inner = self.inner.lock();
        Self::check_fault(&mut inner, &format!("list_rows:{table}"))?;
        Ok(inner.tables.get(table).cloned().unwrap_or_default())
    }

    async fn create_row(&self, table: &str, id: &Id, fields: Value) -> Result<Row, RemoteError> {
        let mut inner = self.inner.lock();
        Self::check_fault(&mut inner, &format!("create_row:{table}"))?;
        let fields = match fields {
            Value::Object(map) => map,
            other => {
                return Err(RemoteError::Status {
                    status: 400,
                    url: format!("memory://{table}"),
                    message: format!("row payload must be an object, got {other}"),
                })
            }
        };
        let row = Row {
            id: id.clone(),
            fields,
        };
        inner
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn delete_row(&self, table: &str, id: &Id) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        Self::check_fault(&mut inner, &format!("delete_row:{table}"))?;
        if let Some(rows) = inner.tables.get_mut(table) {
            rows.retain(|row| &row.id != id);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryStore {
    async fn list_blobs(&self) -> Result<Vec<Blob>, RemoteError> {
        let mut inner = self.inner.lock();
        Self::check_fault(&mut inner, "list_blobs")?;
        Ok(inner.blobs.iter().map(|(blob, _)| blob.clone()).collect())
    }

    async fn create_blob(
        &self,
        id: &Id,
        file_name: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<Blob, RemoteError> {
        let mut inner = self.inner.lock();
        Self::check_fault(&mut inner, "create_blob")?;
        let blob = Blob {
            id: id.clone(),
            name: file_name.to_string(),
        };
        inner.blobs.push((blob.clone(), bytes));
        Ok(blob)
    }

    async fn delete_blob(&self, id: &Id) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        Self::check_fault(&mut inner, "delete_blob")?;
        inner.blobs.retain(|(blob, _)| &blob.id != id);
        Ok(())
    }

    fn view_url(&self, id: &Id) -> String {
        format!("memory://blobs/{id}/view")
    }
}
