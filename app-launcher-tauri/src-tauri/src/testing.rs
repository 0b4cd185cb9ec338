//! In-memory control server used by the unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::client::LauncherApi;
use crate::error::ClientError;
use crate::models::{ApplicationEntry, EntryId, NewApplication, SystemMetrics};

pub fn entry(id: &str, name: &str) -> ApplicationEntry {
    ApplicationEntry {
        id: EntryId::new(id),
        name: name.to_string(),
        path: format!("/usr/bin/{}", name.to_lowercase()),
        parameter: String::new(),
        icon: format!("{}.png", name.to_lowercase()),
    }
}

#[derive(Default)]
struct FakeState {
    apps: Vec<ApplicationEntry>,
    next_id: u64,
    positional: bool,
    metrics: Option<SystemMetrics>,
    failing_ops: HashSet<&'static str>,
    failing_ids: HashSet<EntryId>,
    calls: HashMap<&'static str, usize>,
    launched: Vec<(String, String)>,
    quit: Vec<String>,
}

#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn with_apps(apps: Vec<ApplicationEntry>) -> Self {
        let api = Self::default();
        {
            let mut state = api.state.lock().unwrap();
            state.next_id = 100;
            state.apps = apps;
        }
        api
    }

    /// A server that sends bare entries and addresses them by list position.
    pub fn positional(apps: Vec<ApplicationEntry>) -> Self {
        let api = Self::with_apps(apps);
        api.state.lock().unwrap().positional = true;
        api
    }

    pub fn set_metrics(&self, metrics: SystemMetrics) {
        self.state.lock().unwrap().metrics = Some(metrics);
    }

    /// Makes every call of `op` fail until `succeed` is called.
    pub fn fail(&self, op: &'static str) {
        self.state.lock().unwrap().failing_ops.insert(op);
    }

    pub fn succeed(&self, op: &'static str) {
        self.state.lock().unwrap().failing_ops.remove(op);
    }

    /// Makes updates and deletes of one entry fail.
    pub fn fail_id(&self, id: &str) {
        self.state.lock().unwrap().failing_ids.insert(EntryId::new(id));
    }

    pub fn calls(&self, op: &'static str) -> usize {
        self.state.lock().unwrap().calls.get(op).copied().unwrap_or(0)
    }

    pub fn apps(&self) -> Vec<ApplicationEntry> {
        self.state.lock().unwrap().apps.clone()
    }

    pub fn launched(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().launched.clone()
    }

    pub fn quit_paths(&self) -> Vec<String> {
        self.state.lock().unwrap().quit.clone()
    }

    fn index_of(state: &FakeState, id: &EntryId) -> Option<usize> {
        match id {
            EntryId::Position(index) if state.positional => (*index < state.apps.len()).then_some(*index),
            _ => state.apps.iter().position(|e| &e.id == id),
        }
    }

    fn record(&self, op: &'static str, id: Option<&EntryId>) -> Result<(), String> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(op).or_default() += 1;
        let id_fails = id.map(|id| state.failing_ids.contains(id)).unwrap_or(false);
        if state.failing_ops.contains(op) || id_fails {
            Err(format!("{} rejected by fake server", op))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LauncherApi for FakeApi {
    async fn list_applications(&self) -> Result<Vec<ApplicationEntry>, ClientError> {
        self.record("list", None).map_err(ClientError::Network)?;
        let state = self.state.lock().unwrap();
        let mut apps = state.apps.clone();
        if state.positional {
            for (index, app) in apps.iter_mut().enumerate() {
                app.id = EntryId::Position(index);
            }
        }
        Ok(apps)
    }

    async fn create_application(&self, new: &NewApplication) -> Result<Option<EntryId>, ClientError> {
        self.record("create", None).map_err(ClientError::RequestFailed)?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = EntryId::new(state.next_id.to_string());
        state.apps.push(new.clone().into_entry(id.clone()));
        Ok((!state.positional).then_some(id))
    }

    async fn update_application(&self, id: &EntryId, entry: &ApplicationEntry) -> Result<(), ClientError> {
        self.record("update", Some(id)).map_err(ClientError::RequestFailed)?;
        let mut state = self.state.lock().unwrap();
        let index = Self::index_of(&state, id).ok_or_else(|| ClientError::RequestFailed(format!("no entry {}", id)))?;
        let stored_id = state.apps[index].id.clone();
        state.apps[index] = ApplicationEntry { id: stored_id, ..entry.clone() };
        Ok(())
    }

    async fn delete_application(&self, id: &EntryId) -> Result<(), ClientError> {
        self.record("delete", Some(id)).map_err(ClientError::RequestFailed)?;
        let mut state = self.state.lock().unwrap();
        let index = Self::index_of(&state, id).ok_or_else(|| ClientError::RequestFailed(format!("no entry {}", id)))?;
        state.apps.remove(index);
        Ok(())
    }

    async fn launch(&self, path: &str, parameters: &str) -> Result<(), ClientError> {
        self.record("launch", None).map_err(ClientError::LaunchFailed)?;
        self.state
            .lock()
            .unwrap()
            .launched
            .push((path.to_string(), parameters.to_string()));
        Ok(())
    }

    async fn quit(&self, path: &str) -> Result<(), ClientError> {
        self.record("quit", None).map_err(ClientError::QuitFailed)?;
        self.state.lock().unwrap().quit.push(path.to_string());
        Ok(())
    }

    async fn system_info(&self) -> Result<SystemMetrics, ClientError> {
        self.record("system_info", None).map_err(ClientError::Network)?;
        self.state
            .lock()
            .unwrap()
            .metrics
            .clone()
            .ok_or_else(|| ClientError::Network("no metrics configured".into()))
    }
}
