use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::{ApiErrorBody, AppwriteError};

/// Result of a keyed document lookup.
///
/// A missing document is an expected outcome for the flows built on top of
/// this client, so it is a variant rather than an error to unwrap.
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

/// Page of documents as returned by the list endpoint.
#[derive(Debug, Deserialize)]
pub struct DocumentList<T> {
    pub total: u64,
    pub documents: Vec<T>,
}

/// Collection metadata, reduced to what the maintenance commands read.
#[derive(Debug, Deserialize)]
pub struct Collection {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<CollectionAttribute>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionAttribute {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub required: bool,
}

/// Appwrite Databases service client.
///
/// The endpoint is the full API base including the version segment, e.g.
/// `https://cloud.appwrite.io/v1`.
pub struct Databases {
    http: Client,
    endpoint: String,
    project_id: String,
    api_key: String,
}

impl Databases {
    pub fn new(endpoint: &str, project_id: &str, api_key: &str) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, AppwriteError> {
        let response = request
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body: ApiErrorBody = response.json().await.unwrap_or_default();
            Err(AppwriteError::from_response(status, body))
        }
    }

    /// Fetch a document by id, distinguishing "missing" from real failures.
    pub async fn get_document<T: DeserializeOwned>(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Lookup<T>, AppwriteError> {
        let url = self.url(&format!(
            "/databases/{database_id}/collections/{collection_id}/documents/{document_id}"
        ));
        match self.send(self.http.get(url)).await {
            Ok(document) => Ok(Lookup::Found(document)),
            Err(AppwriteError::NotFound { .. }) => Ok(Lookup::NotFound),
            Err(e) => Err(e),
        }
    }

    /// Create a document at an explicit id.
    pub async fn create_document<T: DeserializeOwned>(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: &impl Serialize,
    ) -> Result<T, AppwriteError> {
        let url = self.url(&format!("/databases/{database_id}/collections/{collection_id}/documents"));
        let body = json!({ "documentId": document_id, "data": data });
        self.send(self.http.post(url).json(&body)).await
    }

    /// Update an existing document. Fails with `AppwriteError::NotFound` when
    /// no document exists at the id.
    pub async fn update_document<T: DeserializeOwned>(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: &impl Serialize,
    ) -> Result<T, AppwriteError> {
        let url = self.url(&format!(
            "/databases/{database_id}/collections/{collection_id}/documents/{document_id}"
        ));
        let body = json!({ "data": data });
        self.send(self.http.patch(url).json(&body)).await
    }

    pub async fn list_documents<T: DeserializeOwned>(
        &self,
        database_id: &str,
        collection_id: &str,
    ) -> Result<DocumentList<T>, AppwriteError> {
        let url = self.url(&format!("/databases/{database_id}/collections/{collection_id}/documents"));
        self.send(self.http.get(url)).await
    }

    pub async fn get_collection(&self, database_id: &str, collection_id: &str) -> Result<Collection, AppwriteError> {
        let url = self.url(&format!("/databases/{database_id}/collections/{collection_id}"));
        self.send(self.http.get(url)).await
    }

    pub async fn create_string_attribute(
        &self,
        database_id: &str,
        collection_id: &str,
        key: &str,
        size: u32,
        required: bool,
        default: Option<&str>,
    ) -> Result<(), AppwriteError> {
        let url = self.url(&format!(
            "/databases/{database_id}/collections/{collection_id}/attributes/string"
        ));
        let body = json!({
            "key": key,
            "size": size,
            "required": required,
            "default": default,
            "array": false,
        });
        let _: Value = self.send(self.http.post(url).json(&body)).await?;
        Ok(())
    }

    pub async fn create_boolean_attribute(
        &self,
        database_id: &str,
        collection_id: &str,
        key: &str,
        required: bool,
        default: Option<bool>,
    ) -> Result<(), AppwriteError> {
        let url = self.url(&format!(
            "/databases/{database_id}/collections/{collection_id}/attributes/boolean"
        ));
        let body = json!({
            "key": key,
            "required": required,
            "default": default,
            "array": false,
        });
        let _: Value = self.send(self.http.post(url).json(&body)).await?;
        Ok(())
    }

    pub async fn create_integer_attribute(
        &self,
        database_id: &str,
        collection_id: &str,
        key: &str,
        required: bool,
    ) -> Result<(), AppwriteError> {
        let url = self.url(&format!(
            "/databases/{database_id}/collections/{collection_id}/attributes/integer"
        ));
        let body = json!({
            "key": key,
            "required": required,
            "array": false,
        });
        let _: Value = self.send(self.http.post(url).json(&body)).await?;
        Ok(())
    }
}
