use crate::config::FirebaseConfig;
use crate::core::query::StructuredQuery;
use crate::domain::model::{FieldMap, Record};
use crate::firebase::api_error_from_response;
use crate::firebase::value::{decode_fields, doc_id_from_name, encode_fields};
use crate::utils::error::{BridgeError, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// Firestore REST client. One handle per database; collection and document
/// paths are built per call.
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    http: Client,
    documents_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    name: String,
    fields: Option<serde_json::Value>,
}

impl Document {
    fn into_record(self) -> Record {
        Record {
            id: doc_id_from_name(&self.name),
            fields: decode_fields(self.fields.as_ref()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    documents: Option<Vec<Document>>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryRow {
    document: Option<Document>,
}

impl FirestoreClient {
    pub fn new(config: &FirebaseConfig) -> Self {
        let documents_url = format!(
            "{}/v1/projects/{}/databases/{}/documents",
            config.firestore_url.trim_end_matches('/'),
            config.project_id,
            config.database_id,
        );
        Self {
            http: Client::new(),
            documents_url,
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.documents_url, collection)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_url, collection, id)
    }

    /// Fetches the whole collection, following pagination. Cost is
    /// O(collection size) by construction.
    pub async fn list_documents(&self, collection: &str) -> Result<Vec<Record>> {
        tracing::debug!(collection, "listing all documents");
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.http.get(self.collection_url(collection));
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                return Err(api_error_from_response(response).await);
            }

            let page: ListDocumentsResponse = response.json().await?;
            records.extend(
                page.documents
                    .unwrap_or_default()
                    .into_iter()
                    .map(Document::into_record),
            );

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(records)
    }

    pub async fn get_document(&self, collection: &str, id: &str) -> Result<Record> {
        tracing::debug!(collection, id, "fetching document");
        let response = self
            .http
            .get(self.document_url(collection, id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(BridgeError::NotFound {
                resource: collection.to_string(),
                id: id.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(api_error_from_response(response).await);
        }

        let document: Document = response.json().await?;
        Ok(document.into_record())
    }

    /// Appends a document with a backend-assigned id.
    pub async fn create_document(&self, collection: &str, fields: FieldMap) -> Result<Record> {
        tracing::debug!(collection, "creating document");
        let response = self
            .http
            .post(self.collection_url(collection))
            .json(&encode_fields(&fields))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error_from_response(response).await);
        }

        let document: Document = response.json().await?;
        Ok(document.into_record())
    }

    /// Merges `fields` into an existing document. The update mask restricts
    /// the write to the submitted field paths; the existence precondition
    /// keeps the call from creating a document that was never there.
    pub async fn patch_document(&self, collection: &str, id: &str, fields: &FieldMap) -> Result<()> {
        tracing::debug!(collection, id, "patching document");
        let mut request = self
            .http
            .patch(self.document_url(collection, id))
            .query(&[("currentDocument.exists", "true")]);
        for field in fields.keys() {
            request = request.query(&[("updateMask.fieldPaths", field.as_str())]);
        }

        let response = request.json(&encode_fields(fields)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(BridgeError::NotFound {
                resource: collection.to_string(),
                id: id.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(api_error_from_response(response).await);
        }
        Ok(())
    }

    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<()> {
        tracing::debug!(collection, id, "deleting document");
        let response = self
            .http
            .delete(self.document_url(collection, id))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error_from_response(response).await);
        }
        Ok(())
    }

    /// Runs a structured query rooted at the database's documents node.
    pub async fn run_query(&self, query: &StructuredQuery) -> Result<Vec<Record>> {
        tracing::debug!(collection = query.collection(), "running structured query");
        let response = self
            .http
            .post(format!("{}:runQuery", self.documents_url))
            .json(&query.to_body())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error_from_response(response).await);
        }

        // the stream arrives as one row per matched document; rows carrying
        // only a readTime are skipped
        let rows: Vec<QueryRow> = response.json().await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.document)
            .map(Document::into_record)
            .collect())
    }
}
