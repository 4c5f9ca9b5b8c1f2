use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde_json::{json, Value};

use crate::config::AppwriteConfig;
use crate::error::RemoteError;
use crate::model::{Blob, BlobList, Id, Row, RowList};
use crate::store::traits::{BlobStore, RowStore};

/// Client for the hosted Appwrite project: row tables under one database,
/// binary objects under one bucket. Construct once and share via `Arc`.
pub struct AppwriteStore {
    http: Client,
    config: AppwriteConfig,
}

impl AppwriteStore {
    pub fn new(config: AppwriteConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Appwrite-Project",
            HeaderValue::from_str(&config.project_id)?,
        );
        headers.insert("X-Appwrite-Key", HeaderValue::from_str(&config.api_key)?);

        let http = Client::builder().default_headers(headers).build()?;
        Ok(Self { http, config })
    }

    fn rows_url(&self, table: &str) -> String {
        format!(
            "{}/tablesdb/{}/tables/{}/rows",
            self.config.endpoint, self.config.database_id, table
        )
    }

    fn files_url(&self) -> String {
        format!(
            "{}/storage/buckets/{}/files",
            self.config.endpoint, self.config.bucket_id
        )
    }

    /// Turn a non-2xx response into `RemoteError::Status`, keeping the
    /// store's message body where one is readable.
    async fn check(response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().to_string();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(RemoteError::Status {
            status: status.as_u16(),
            url,
            message,
        })
    }
}

#[async_trait::async_trait]
impl RowStore for AppwriteStore {
    async fn list_rows(&self, table: &str) -> Result<Vec<Row>, RemoteError> {
        let response = self.http.get(self.rows_url(table)).send().await?;
        let list: RowList = Self::check(response).await?.json().await?;
        Ok(list.rows)
    }

    async fn create_row(&self, table: &str, id: &Id, fields: Value) -> Result<Row, RemoteError> {
        let body = json!({ "rowId": id, "data": fields });
        let response = self
            .http
            .post(self.rows_url(table))
            .json(&body)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete_row(&self, table: &str, id: &Id) -> Result<(), RemoteError> {
        let url = format!("{}/{}", self.rows_url(table), id);
        let response = self.http.delete(url).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl BlobStore for AppwriteStore {
    async fn list_blobs(&self) -> Result<Vec<Blob>, RemoteError> {
        let response = self.http.get(self.files_url()).send().await?;
        let list: BlobList = Self::check(response).await?.json().await?;
        Ok(list.files)
    }

    async fn create_blob(
        &self,
        id: &Id,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Blob, RemoteError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        let form = Form::new().text("fileId", id.clone()).part("file", part);

        let response = self
            .http
            .post(self.files_url())
            .multipart(form)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete_blob(&self, id: &Id) -> Result<(), RemoteError> {
        let url = format!("{}/{}", self.files_url(), id);
        let response = self.http.delete(url).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    fn view_url(&self, id: &Id) -> String {
        format!(
            "{}/{}/view?project={}",
            self.files_url(),
            id,
            self.config.project_id
        )
    }
}
