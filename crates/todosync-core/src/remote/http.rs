//! HTTP implementation of the remote collection

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::RemoteCollection;
use crate::error::{RemoteError, RemoteResult};
use crate::models::{Category, Todo, TodoDraft, TodoId};

/// Request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// REST client for the todo collection
#[derive(Clone)]
pub struct HttpRemote {
    client: Client,
    base_url: String,
}

impl HttpRemote {
    /// Create a client with the default timeout
    pub fn new(base_url: &str) -> RemoteResult<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with an explicit request timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("todosync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request, mapping transport failures and non-2xx statuses
    async fn send(&self, request: RequestBuilder) -> RemoteResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RemoteCollection for HttpRemote {
    async fn list_todos(&self) -> RemoteResult<Vec<Todo>> {
        let response = self.send(self.client.get(self.url("/todos"))).await?;
        Self::decode(response).await
    }

    async fn create_todo(&self, draft: &TodoDraft) -> RemoteResult<Todo> {
        let response = self
            .send(self.client.post(self.url("/todos")).json(draft))
            .await?;
        Self::decode(response).await
    }

    async fn update_todo(&self, id: TodoId, body: &Value) -> RemoteResult<Option<Todo>> {
        let response = self
            .send(
                self.client
                    .put(self.url(&format!("/todos/{}", id)))
                    .json(body),
            )
            .await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let text = response
            .text()
            .await
            .map_err(|e| RemoteError::Request(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        let value: Value =
            serde_json::from_str(&text).map_err(|e| RemoteError::Decode(e.to_string()))?;
        match serde_json::from_value::<Todo>(value) {
            Ok(todo) => Ok(Some(todo)),
            Err(e) => {
                debug!(id, "Update response is not a full record: {}", e);
                Ok(None)
            }
        }
    }

    async fn delete_todo(&self, id: TodoId) -> RemoteResult<()> {
        self.send(self.client.delete(self.url(&format!("/todos/{}", id))))
            .await?;
        Ok(())
    }

    async fn list_categories(&self) -> RemoteResult<Vec<Category>> {
        let response = self.send(self.client.get(self.url("/categories"))).await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let remote = HttpRemote::new("http://localhost:5000/").unwrap();
        assert_eq!(remote.base_url(), "http://localhost:5000");
        assert_eq!(remote.url("/todos"), "http://localhost:5000/todos");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_request_error() {
        // Port 9 (discard) is not expected to accept HTTP connections
        let remote =
            HttpRemote::with_timeout("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = remote.list_todos().await.unwrap_err();
        assert!(matches!(err, RemoteError::Request(_)));
    }
}
