use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::config::LauncherConfig;
use crate::error::ClientError;
use crate::models::{ApplicationEntry, ApplicationRecord, EntryId, NewApplication, SystemMetrics};

/// Operations the dashboard needs from the control server.
#[async_trait]
pub trait LauncherApi: Send + Sync {
    async fn list_applications(&self) -> Result<Vec<ApplicationEntry>, ClientError>;
    /// Returns the id the server assigned, when its reply names one.
    async fn create_application(&self, new: &NewApplication) -> Result<Option<EntryId>, ClientError>;
    async fn update_application(&self, id: &EntryId, entry: &ApplicationEntry) -> Result<(), ClientError>;
    async fn delete_application(&self, id: &EntryId) -> Result<(), ClientError>;
    async fn launch(&self, path: &str, parameters: &str) -> Result<(), ClientError>;
    async fn quit(&self, path: &str) -> Result<(), ClientError>;
    async fn system_info(&self) -> Result<SystemMetrics, ClientError>;
}

/// HTTP/JSON client for the control server. Cloning shares the connection pool.
#[derive(Clone)]
pub struct RemoteClient {
    base_url: String,
    client: Client,
}

impl RemoteClient {
    pub fn new(config: &LauncherConfig) -> Self {
        Self::with_base_url(config.base_url())
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `applications/{id}` with the id as a single escaped path segment.
    fn entry_url(&self, id: &EntryId) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.url("applications"))
            .map_err(|e| ClientError::RequestFailed(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::RequestFailed(format!("{} cannot be a base URL", self.base_url)))?
            .push(&id.to_string());
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        log::debug!("GET {}", path);
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let response = ensure_success(response, ClientError::Network)?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Entry fields as sent in a PUT body; the id travels in the URL.
#[derive(Serialize)]
struct EntryBody<'a> {
    name: &'a str,
    path: &'a str,
    parameter: &'a str,
    icon: &'a str,
}

impl<'a> From<&'a ApplicationEntry> for EntryBody<'a> {
    fn from(entry: &'a ApplicationEntry) -> Self {
        Self {
            name: &entry.name,
            path: &entry.path,
            parameter: &entry.parameter,
            icon: &entry.icon,
        }
    }
}

/// The id in a create reply, if the reply is an entry that carries one.
fn assigned_id(body: &[u8]) -> Option<EntryId> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice::<ApplicationRecord>(body) {
        Ok(record) => record.id,
        Err(e) => {
            log::debug!("Create reply is not an entry: {}", e);
            None
        }
    }
}

/// Maps a non-success status to the caller's error kind.
fn ensure_success(response: Response, kind: fn(String) -> ClientError) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(kind(format!("{} returned {}", response.url().path(), status)))
    }
}

#[async_trait]
impl LauncherApi for RemoteClient {
    async fn list_applications(&self) -> Result<Vec<ApplicationEntry>, ClientError> {
        let records: Vec<ApplicationRecord> = self.get_json("applications").await?;
        Ok(records
            .into_iter()
            .enumerate()
            .map(|(position, record)| record.into_entry(position))
            .collect())
    }

    async fn create_application(&self, new: &NewApplication) -> Result<Option<EntryId>, ClientError> {
        log::debug!("POST applications");
        let response = self
            .client
            .post(self.url("applications"))
            .json(new)
            .send()
            .await
            .map_err(|e| ClientError::RequestFailed(e.to_string()))?;
        let response = ensure_success(response, ClientError::RequestFailed)?;
        // The entry exists once the status says so; the body is optional.
        match response.bytes().await {
            Ok(body) => Ok(assigned_id(&body)),
            Err(e) => {
                log::warn!("Could not read create reply: {}", e);
                Ok(None)
            }
        }
    }

    async fn update_application(&self, id: &EntryId, entry: &ApplicationEntry) -> Result<(), ClientError> {
        let url = self.entry_url(id)?;
        log::debug!("PUT {}", url.path());
        let response = self
            .client
            .put(url)
            .json(&EntryBody::from(entry))
            .send()
            .await
            .map_err(|e| ClientError::RequestFailed(e.to_string()))?;
        ensure_success(response, ClientError::RequestFailed)?;
        Ok(())
    }

    async fn delete_application(&self, id: &EntryId) -> Result<(), ClientError> {
        let url = self.entry_url(id)?;
        log::debug!("DELETE {}", url.path());
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|e| ClientError::RequestFailed(e.to_string()))?;
        ensure_success(response, ClientError::RequestFailed)?;
        Ok(())
    }

    async fn launch(&self, path: &str, parameters: &str) -> Result<(), ClientError> {
        log::debug!("POST launch ({})", path);
        let response = self
            .client
            .post(self.url("launch"))
            .json(&json!({ "path": path, "parameters": parameters }))
            .send()
            .await
            .map_err(|e| ClientError::LaunchFailed(e.to_string()))?;
        ensure_success(response, ClientError::LaunchFailed)?;
        Ok(())
    }

    async fn quit(&self, path: &str) -> Result<(), ClientError> {
        log::debug!("POST launch/quit ({})", path);
        let response = self
            .client
            .post(self.url("launch/quit"))
            .json(&json!({ "application": path }))
            .send()
            .await
            .map_err(|e| ClientError::QuitFailed(e.to_string()))?;
        ensure_success(response, ClientError::QuitFailed)?;
        Ok(())
    }

    async fn system_info(&self) -> Result<SystemMetrics, ClientError> {
        self.get_json("systemInfo").await
    }
}
