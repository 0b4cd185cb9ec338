use serde::Serialize;

use crate::client::LauncherApi;
use crate::error::ClientError;
use crate::models::{ApplicationEntry, EntryId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum StoreStatus {
    Loading,
    Ready,
    Failed(String),
}

/// Cached application list with explicit invalidation.
#[derive(Debug, Default)]
pub struct ApplicationStore {
    data: Option<Vec<ApplicationEntry>>,
    stale: bool,
    error: Option<String>,
}

impl ApplicationStore {
    pub fn read(&self) -> Option<&[ApplicationEntry]> {
        self.data.as_deref()
    }

    pub fn find(&self, id: &EntryId) -> Option<&ApplicationEntry> {
        self.data.as_ref()?.iter().find(|e| &e.id == id)
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub fn status(&self) -> StoreStatus {
        match (&self.data, &self.error) {
            (_, Some(err)) => StoreStatus::Failed(err.clone()),
            (Some(_), None) => StoreStatus::Ready,
            (None, None) => StoreStatus::Loading,
        }
    }

    /// Nothing cached yet, or the cache was invalidated.
    pub fn needs_fetch(&self) -> bool {
        self.data.is_none() || self.stale
    }

    /// Fetches only when `needs_fetch`.
    pub async fn load(&mut self, api: &dyn LauncherApi) -> Result<&[ApplicationEntry], ClientError> {
        if self.needs_fetch() {
            self.refetch(api).await?;
        }
        Ok(self.data.as_deref().unwrap_or_default())
    }

    /// Always fetches.
    pub async fn refetch(&mut self, api: &dyn LauncherApi) -> Result<&[ApplicationEntry], ClientError> {
        let result = api.list_applications().await;
        self.finish_fetch(result)
    }

    /// Applies a list response. A failure keeps the previous list.
    pub fn finish_fetch(
        &mut self,
        result: Result<Vec<ApplicationEntry>, ClientError>,
    ) -> Result<&[ApplicationEntry], ClientError> {
        match result {
            Ok(apps) => {
                log::info!("Loaded {} applications", apps.len());
                self.data = Some(apps);
                self.stale = false;
                self.error = None;
                Ok(self.data.as_deref().unwrap_or_default())
            }
            Err(e) => {
                log::error!("Error loading applications: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{entry, FakeApi};

    #[tokio::test]
    async fn load_fetches_once_until_invalidated() {
        let api = FakeApi::with_apps(vec![entry("1", "Steam")]);
        let mut store = ApplicationStore::default();
        assert_eq!(store.status(), StoreStatus::Loading);

        store.load(&api).await.unwrap();
        store.load(&api).await.unwrap();
        assert_eq!(api.calls("list"), 1);
        assert_eq!(store.status(), StoreStatus::Ready);

        store.invalidate();
        assert!(store.is_stale());
        assert!(store.needs_fetch());
        store.load(&api).await.unwrap();
        assert_eq!(api.calls("list"), 2);
        assert!(!store.is_stale());
    }

    #[tokio::test]
    async fn failed_refetch_keeps_previous_list() {
        let api = FakeApi::with_apps(vec![entry("1", "Steam"), entry("2", "Kodi")]);
        let mut store = ApplicationStore::default();
        store.load(&api).await.unwrap();

        api.fail("list");
        assert!(store.refetch(&api).await.is_err());
        assert_eq!(store.read().map(|a| a.len()), Some(2));
        assert!(matches!(store.status(), StoreStatus::Failed(_)));

        api.succeed("list");
        store.refetch(&api).await.unwrap();
        assert_eq!(store.status(), StoreStatus::Ready);
    }

    #[tokio::test]
    async fn find_looks_up_by_id() {
        let api = FakeApi::with_apps(vec![entry("1", "Steam"), entry("2", "Kodi")]);
        let mut store = ApplicationStore::default();
        store.load(&api).await.unwrap();

        assert_eq!(store.find(&EntryId::new("2")).map(|e| e.name.as_str()), Some("Kodi"));
        assert!(store.find(&EntryId::new("9")).is_none());
    }
}
