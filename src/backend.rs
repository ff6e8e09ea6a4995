//! Remote backend abstraction and HTTP implementation.
//!
//! Defines the [`RetrievalBackend`] trait — the seam between the engine and
//! the cloud language-model service — and one concrete implementation,
//! [`HttpBackend`], which talks to a Gemini-style file-search API over
//! HTTPS.
//!
//! Error classification: every non-success HTTP status is mapped into the
//! closed [`EngineError`] taxonomy by [`classify_status`]. No call here
//! retries on its own; rate limits and outages are surfaced so the caller
//! decides (the bulk uploader counts them per item, the query path reports
//! them directly).

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::BackendConfig;
use crate::error::{EngineError, Result};
use crate::models::IndexHandle;

/// Handle for a long-running upload operation on the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle(pub String);

/// Poll result for an upload operation.
#[derive(Debug, Clone)]
pub struct OperationStatus {
    pub done: bool,
    /// Definitive remote failure message, if the operation ended in error.
    pub error: Option<String>,
}

/// Response from an indexed-retrieval query.
#[derive(Debug, Clone)]
pub struct RetrievalResponse {
    pub text: String,
    /// Raw grounding metadata, handed to the citation extractor as-is.
    pub grounding: Option<Value>,
}

/// The remote language-model service, as consumed by the engine.
///
/// One implementation talks HTTP ([`HttpBackend`]); tests substitute an
/// in-process mock.
#[async_trait]
pub trait RetrievalBackend: Send + Sync {
    /// Create a new remote retrieval index with the given display name.
    async fn create_index(&self, display_name: &str) -> Result<IndexHandle>;

    /// Enumerate existing indexes. Never mutates remote state.
    async fn list_indexes(&self) -> Result<Vec<IndexHandle>>;

    /// Delete an index. With `force`, removal succeeds even if non-empty.
    async fn delete_index(&self, handle: &IndexHandle, force: bool) -> Result<()>;

    /// Start uploading one document into the index. Returns an operation
    /// handle to poll until the backend finishes processing.
    async fn upload_document(
        &self,
        handle: &IndexHandle,
        display_name: &str,
        content: &str,
    ) -> Result<OperationHandle>;

    /// Check whether an upload operation has completed.
    async fn poll_operation(&self, op: &OperationHandle) -> Result<OperationStatus>;

    /// Ask a question grounded in the index; returns the answer text plus
    /// raw grounding metadata.
    async fn query_with_retrieval(
        &self,
        text: &str,
        handle: &IndexHandle,
    ) -> Result<RetrievalResponse>;

    /// Plain conversational completion; the index is not consulted.
    async fn complete(&self, text: &str) -> Result<String>;
}

/// Map an HTTP error status into the engine taxonomy.
pub fn classify_status(status: u16, message: &str) -> EngineError {
    match status {
        429 => EngineError::RateLimited,
        401 | 403 => EngineError::AuthFailed,
        s if s >= 500 => EngineError::BackendUnavailable {
            status: s,
            message: message.to_string(),
        },
        _ => EngineError::UploadRejected {
            id: String::new(),
            reason: format!("HTTP {}: {}", status, message),
        },
    }
}

/// HTTPS implementation against a Gemini-style file-search API.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl HttpBackend {
    /// Build a backend from config. The credential comes from the
    /// `GEMINI_API_KEY` environment variable.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| EngineError::AuthFailed)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        let resp = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;
        Self::into_json(resp).await
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let resp = self
            .client
            .get(url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;
        Self::into_json(resp).await
    }

    async fn into_json(resp: reqwest::Response) -> Result<Value> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &body));
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl RetrievalBackend for HttpBackend {
    async fn create_index(&self, display_name: &str) -> Result<IndexHandle> {
        let url = format!("{}/fileSearchStores", self.base_url);
        let body = json!({ "displayName": display_name });
        let resp = self.post_json(&url, &body).await?;

        let name = resp
            .get("name")
            .and_then(|n| n.as_str())
            .ok_or_else(|| EngineError::UnexpectedResponse("create: missing name".to_string()))?;
        Ok(IndexHandle(name.to_string()))
    }

    async fn list_indexes(&self) -> Result<Vec<IndexHandle>> {
        let url = format!("{}/fileSearchStores", self.base_url);
        let resp = self.get_json(&url).await?;

        let stores = resp
            .get("fileSearchStores")
            .and_then(|s| s.as_array())
            .cloned()
            .unwrap_or_default();

        Ok(stores
            .iter()
            .filter_map(|s| s.get("name").and_then(|n| n.as_str()))
            .map(|n| IndexHandle(n.to_string()))
            .collect())
    }

    async fn delete_index(&self, handle: &IndexHandle, force: bool) -> Result<()> {
        let url = format!("{}/{}?force={}", self.base_url, handle.as_str(), force);
        let resp = self
            .client
            .delete(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &body));
        }
        Ok(())
    }

    async fn upload_document(
        &self,
        handle: &IndexHandle,
        display_name: &str,
        content: &str,
    ) -> Result<OperationHandle> {
        let url = format!(
            "{}/{}:uploadToFileSearchStore",
            self.base_url,
            handle.as_str()
        );
        let body = json!({
            "displayName": display_name,
            "mimeType": "text/markdown",
            "content": content,
        });
        let resp = self.post_json(&url, &body).await?;

        let name = resp
            .get("name")
            .and_then(|n| n.as_str())
            .ok_or_else(|| {
                EngineError::UnexpectedResponse("upload: missing operation name".to_string())
            })?;
        Ok(OperationHandle(name.to_string()))
    }

    async fn poll_operation(&self, op: &OperationHandle) -> Result<OperationStatus> {
        let url = format!("{}/{}", self.base_url, op.0);
        let resp = self.get_json(&url).await?;

        let done = resp.get("done").and_then(|d| d.as_bool()).unwrap_or(false);
        let error = resp
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .map(|m| m.to_string());

        Ok(OperationStatus { done, error })
    }

    async fn query_with_retrieval(
        &self,
        text: &str,
        handle: &IndexHandle,
    ) -> Result<RetrievalResponse> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": text }] }],
            "tools": [{
                "fileSearch": { "fileSearchStoreNames": [handle.as_str()] }
            }],
        });
        let resp = self.post_json(&url, &body).await?;

        let answer = extract_answer_text(&resp)?;
        let grounding = resp
            .pointer("/candidates/0/groundingMetadata")
            .cloned();

        Ok(RetrievalResponse {
            text: answer,
            grounding,
        })
    }

    async fn complete(&self, text: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": text }] }],
        });
        let resp = self.post_json(&url, &body).await?;
        extract_answer_text(&resp)
    }
}

/// Pull the answer text out of a `generateContent` response, detecting
/// safety blocks along the way.
fn extract_answer_text(resp: &Value) -> Result<String> {
    if resp
        .pointer("/promptFeedback/blockReason")
        .and_then(|b| b.as_str())
        .is_some()
    {
        return Err(EngineError::ContentBlocked);
    }

    if let Some("SAFETY") = resp
        .pointer("/candidates/0/finishReason")
        .and_then(|f| f.as_str())
    {
        return Err(EngineError::ContentBlocked);
    }

    let parts = resp
        .pointer("/candidates/0/content/parts")
        .and_then(|p| p.as_array())
        .ok_or_else(|| EngineError::UnexpectedResponse("missing candidate parts".to_string()))?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect::<Vec<_>>()
        .join("");

    if text.is_empty() {
        return Err(EngineError::UnexpectedResponse(
            "empty candidate text".to_string(),
        ));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(classify_status(429, ""), EngineError::RateLimited));
        assert!(matches!(classify_status(401, ""), EngineError::AuthFailed));
        assert!(matches!(classify_status(403, ""), EngineError::AuthFailed));
        assert!(matches!(
            classify_status(500, "boom"),
            EngineError::BackendUnavailable { status: 500, .. }
        ));
        assert!(matches!(
            classify_status(503, ""),
            EngineError::BackendUnavailable { status: 503, .. }
        ));
        assert!(matches!(
            classify_status(400, "size limit"),
            EngineError::UploadRejected { .. }
        ));
    }

    #[test]
    fn answer_text_joined_from_parts() {
        let resp = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello " }, { "text": "world" }] }
            }]
        });
        assert_eq!(extract_answer_text(&resp).unwrap(), "Hello world");
    }

    #[test]
    fn prompt_block_is_content_blocked() {
        let resp = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert!(matches!(
            extract_answer_text(&resp),
            Err(EngineError::ContentBlocked)
        ));
    }

    #[test]
    fn safety_finish_is_content_blocked() {
        let resp = json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        });
        assert!(matches!(
            extract_answer_text(&resp),
            Err(EngineError::ContentBlocked)
        ));
    }

    #[test]
    fn missing_candidates_is_unexpected_response() {
        let resp = json!({ "something": "else" });
        assert!(matches!(
            extract_answer_text(&resp),
            Err(EngineError::UnexpectedResponse(_))
        ));
    }
}
