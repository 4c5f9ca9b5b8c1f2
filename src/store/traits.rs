use serde_json::Value;

use crate::error::RemoteError;
use crate::model::{Blob, Id, Row};

/// Row operations against the hosted structured store. Tables are addressed
/// by name; which database they live in is the implementation's concern.
///
/// No retries happen at this layer. A failed call surfaces as a
/// `RemoteError` and the caller decides what to do with it.
#[async_trait::async_trait]
pub trait RowStore: Send + Sync {
    async fn list_rows(&self, table: &str) -> Result<Vec<Row>, RemoteError>;
    async fn create_row(&self, table: &str, id: &Id, fields: Value) -> Result<Row, RemoteError>;
    async fn delete_row(&self, table: &str, id: &Id) -> Result<(), RemoteError>;
}

/// Binary object operations against the hosted bucket.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    async fn list_blobs(&self) -> Result<Vec<Blob>, RemoteError>;
    async fn create_blob(
        &self,
        id: &Id,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Blob, RemoteError>;
    async fn delete_blob(&self, id: &Id) -> Result<(), RemoteError>;
    /// Durable view URL for an already uploaded object.
    fn view_url(&self, id: &Id) -> String;
}
