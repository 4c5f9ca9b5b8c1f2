use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Id;

/// A record in the hosted row store. The store returns the generated id as
/// `$id` alongside the row's own fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    #[serde(rename = "$id")]
    pub id: Id,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RowList {
    pub total: u64,
    pub rows: Vec<Row>,
}

/// A binary object in the hosted bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blob {
    #[serde(rename = "$id")]
    pub id: Id,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlobList {
    pub total: u64,
    pub files: Vec<Blob>,
}
