use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::Resource;
use crate::models::wire;

/// Types offered by the upload form. Listed documents may carry others.
pub const DOCUMENT_TYPES: [&str; 3] = ["Invoice", "Contract", "Receipt"];

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Document {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub doc_type: String,
    /// Project name; the documents backend does not store project ids.
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_date")]
    pub upload_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentDraft {
    pub file_url: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub project: String,
}

impl Resource for Document {
    type Id = i64;
    type Draft = DocumentDraft;
    const NAME: &'static str = "document";

    fn id(&self) -> i64 {
        self.id
    }
}
