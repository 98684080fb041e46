use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde_json::Value;

use super::{display_path, Backend, BackendError};

/// [`Backend`] over HTTP, talking to a json-server style REST API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(HttpBackend { client, base_url })
    }

    /// Appends `segments` to the base URL path, percent-encoding each one so an
    /// id can never add a query, a fragment or another path level.
    fn url(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                BackendError::Transport(format!("{} cannot be a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn read_json(path: String, response: Response) -> Result<Value, BackendError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(BackendError::NotFound(path));
    }
    if !status.is_success() {
        return Err(BackendError::Status {
            path,
            status: status.as_u16(),
        });
    }
    response
        .json::<Value>()
        .await
        .map_err(|e| BackendError::Decode(e.to_string()))
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get(&self, segments: &[&str]) -> Result<Value, BackendError> {
        let path = display_path(segments);
        log::debug!("GET {}", path);
        let response = self
            .client
            .get(self.url(segments)?)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        read_json(path, response).await
    }

    async fn patch(&self, segments: &[&str], body: Value) -> Result<Value, BackendError> {
        let path = display_path(segments);
        log::debug!("PATCH {}", path);
        let response = self
            .client
            .patch(self.url(segments)?)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        read_json(path, response).await
    }
}
