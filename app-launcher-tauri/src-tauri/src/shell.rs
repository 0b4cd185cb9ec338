use serde::Serialize;

use crate::client::LauncherApi;
use crate::error::{ClientError, LauncherError, Result};
use crate::models::{ApplicationEntry, EntryField, EntryId, NewApplication};
use crate::notify::Notifications;
use crate::settings::{self, SaveReport, SettingsPanel, SettingsView};
use crate::store::{ApplicationStore, StoreStatus};
use crate::tile::{ApplicationTile, LaunchRequest};

/// Lifecycle of the one application the dashboard may be running.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "application", rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Launching(ApplicationEntry),
    Running(ApplicationEntry),
    Quitting(ApplicationEntry),
}

impl RunState {
    pub fn application(&self) -> Option<&ApplicationEntry> {
        match self {
            RunState::Idle => None,
            RunState::Launching(app) | RunState::Running(app) | RunState::Quitting(app) => Some(app),
        }
    }
}

/// What the window shows; exactly one at a time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum View {
    Grid {
        status: StoreStatus,
        tiles: Vec<ApplicationTile>,
    },
    Running {
        run_state: RunState,
    },
    Settings(SettingsView),
}

/// Root of the dashboard: application list, run state, settings and toasts.
#[derive(Debug)]
pub struct Shell {
    store: ApplicationStore,
    run_state: RunState,
    settings: Option<SettingsPanel>,
    notifications: Notifications,
}

impl Default for Shell {
    fn default() -> Self {
        Self {
            store: ApplicationStore::default(),
            run_state: RunState::Idle,
            settings: None,
            notifications: Notifications::default(),
        }
    }
}

impl Shell {
    pub fn run_state(&self) -> &RunState {
        &self.run_state
    }

    pub fn running_application(&self) -> Option<&ApplicationEntry> {
        self.run_state.application()
    }

    pub fn show_settings(&self) -> bool {
        self.settings.is_some()
    }

    pub fn store(&self) -> &ApplicationStore {
        &self.store
    }

    pub fn notifications(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn tiles(&self) -> Vec<ApplicationTile> {
        self.store
            .read()
            .unwrap_or_default()
            .iter()
            .map(ApplicationTile::from)
            .collect()
    }

    pub fn view(&self) -> View {
        if let Some(settings) = &self.settings {
            return View::Settings(settings.view());
        }
        match &self.run_state {
            RunState::Idle => View::Grid {
                status: self.store.status(),
                tiles: self.tiles(),
            },
            state => View::Running { run_state: state.clone() },
        }
    }

    // ── Application list ─────────────────────────────────────────

    pub async fn load_applications(&mut self, api: &dyn LauncherApi) -> Result<Vec<ApplicationEntry>> {
        Ok(self.store.load(api).await?.to_vec())
    }

    pub async fn refresh_applications(&mut self, api: &dyn LauncherApi) -> Result<Vec<ApplicationEntry>> {
        Ok(self.store.refetch(api).await?.to_vec())
    }

    /// Applies a list response fetched without holding the shell.
    pub fn finish_load(&mut self, result: std::result::Result<Vec<ApplicationEntry>, ClientError>) -> Result<Vec<ApplicationEntry>> {
        Ok(self.store.finish_fetch(result)?.to_vec())
    }

    // ── Launch / quit ────────────────────────────────────────────

    /// Shows `entry` as launching before the server has answered.
    pub fn begin_launch(&mut self, entry: ApplicationEntry) -> Result<()> {
        if self.run_state != RunState::Idle {
            log::warn!("Ignoring launch of {} while {:?}", entry.name, self.run_state);
            return Err(LauncherError::Busy("another application is active"));
        }
        log::info!("Launching {}", entry.name);
        self.run_state = RunState::Launching(entry);
        Ok(())
    }

    pub fn finish_launch(&mut self, result: std::result::Result<(), ClientError>) -> Result<()> {
        let entry = match &self.run_state {
            RunState::Launching(entry) => entry.clone(),
            _ => return Ok(()),
        };
        match result {
            Ok(()) => {
                self.run_state = RunState::Running(entry);
                Ok(())
            }
            Err(e) => {
                self.run_state = RunState::Idle;
                log::error!("Error launching application {}: {}", entry.name, e);
                self.notifications.error("Failed to launch application");
                Err(e.into())
            }
        }
    }

    pub async fn launch(&mut self, api: &dyn LauncherApi, entry: ApplicationEntry) -> Result<()> {
        self.begin_launch(entry.clone())?;
        let result = api.launch(&entry.path, &entry.parameter).await;
        self.finish_launch(result)
    }

    /// Resolves a tile activation against the cached list.
    pub fn resolve(&self, request: &LaunchRequest) -> Result<ApplicationEntry> {
        self.store
            .find(&request.id)
            .cloned()
            .ok_or_else(|| LauncherError::NotFound(format!("application {}", request.id)))
    }

    pub async fn launch_request(&mut self, api: &dyn LauncherApi, request: &LaunchRequest) -> Result<()> {
        let entry = self.resolve(request)?;
        self.launch(api, entry).await
    }

    /// Returns the entry to stop, or `None` when nothing is running.
    pub fn begin_quit(&mut self) -> Option<ApplicationEntry> {
        match &self.run_state {
            RunState::Running(entry) => {
                let entry = entry.clone();
                self.run_state = RunState::Quitting(entry.clone());
                Some(entry)
            }
            _ => None,
        }
    }

    /// Always ends `Idle`, whether or not the server stopped the process.
    pub fn finish_quit(&mut self, result: std::result::Result<(), ClientError>) -> Result<()> {
        let previous = std::mem::replace(&mut self.run_state, RunState::Idle);
        let name = previous.application().map(|a| a.name.clone()).unwrap_or_default();
        match result {
            Ok(()) => {
                log::info!("Quit {}", name);
                self.notifications.success("Application quit successfully");
                Ok(())
            }
            Err(e) => {
                log::error!("Error quitting application {}: {}", name, e);
                self.notifications.error("Failed to quit application");
                Err(e.into())
            }
        }
    }

    /// Returns `false` when there was nothing to quit.
    pub async fn quit(&mut self, api: &dyn LauncherApi) -> Result<bool> {
        let Some(entry) = self.begin_quit() else {
            return Ok(false);
        };
        let result = api.quit(&entry.path).await;
        self.finish_quit(result).map(|_| true)
    }

    // ── Settings ─────────────────────────────────────────────────

    // Each settings request is split in three: copy what the request needs,
    // send it, then apply the reply. Callers that share the shell release it
    // while the request is out.

    /// Opens settings on a snapshot of the list; an unavailable list gives an empty panel.
    pub async fn open_settings(&mut self, api: &dyn LauncherApi) -> SettingsView {
        if let Err(e) = self.store.load(api).await {
            log::warn!("Opening settings without application list: {}", e);
        }
        self.open_settings_panel()
    }

    /// Opens settings on whatever the store currently holds.
    pub fn open_settings_panel(&mut self) -> SettingsView {
        let panel = SettingsPanel::new(self.store.read());
        let view = panel.view();
        self.settings = Some(panel);
        view
    }

    /// Drops the panel along with any unsent add-form input.
    pub fn close_settings(&mut self) {
        self.settings = None;
    }

    fn settings(&self) -> Result<&SettingsPanel> {
        self.settings
            .as_ref()
            .ok_or_else(|| LauncherError::NotFound("settings panel is not open".into()))
    }

    fn settings_mut(&mut self) -> Result<&mut SettingsPanel> {
        self.settings
            .as_mut()
            .ok_or_else(|| LauncherError::NotFound("settings panel is not open".into()))
    }

    pub fn settings_view(&self) -> Option<SettingsView> {
        self.settings.as_ref().map(SettingsPanel::view)
    }

    pub fn settings_draft(&self) -> Result<NewApplication> {
        Ok(self.settings()?.draft().clone())
    }

    pub fn settings_row(&self, index: usize) -> Result<ApplicationEntry> {
        self.settings()?.row(index).cloned()
    }

    pub fn settings_rows(&self) -> Result<Vec<ApplicationEntry>> {
        Ok(self.settings()?.rows().to_vec())
    }

    pub fn edit_setting(&mut self, index: usize, field: EntryField, value: String) -> Result<()> {
        self.settings_mut()?.edit_row(index, field, value)
    }

    pub fn edit_new_application(&mut self, field: EntryField, value: String) -> Result<()> {
        self.settings_mut()?.edit_draft(field, value);
        Ok(())
    }

    /// The entry exists on the server even if the panel was closed meanwhile,
    /// so the store is invalidated either way.
    pub fn finish_add(
        &mut self,
        submitted: NewApplication,
        result: std::result::Result<Option<EntryId>, ClientError>,
    ) -> Result<()> {
        let assigned = settings::record_add(&submitted, result, &mut self.store, &mut self.notifications)?;
        if let Some(panel) = self.settings.as_mut() {
            panel.apply_add(submitted, assigned);
        }
        Ok(())
    }

    pub fn finish_update(
        &mut self,
        row: &ApplicationEntry,
        result: std::result::Result<(), ClientError>,
    ) -> Result<()> {
        settings::record_update(row, result, &mut self.store, &mut self.notifications)?;
        Ok(())
    }

    pub fn finish_remove(&mut self, id: &EntryId, result: std::result::Result<(), ClientError>) -> Result<()> {
        settings::record_removal(id, result, &mut self.store, &mut self.notifications)?;
        if let Some(panel) = self.settings.as_mut() {
            panel.apply_removal(id);
        }
        Ok(())
    }

    /// Closes settings regardless of individual failures.
    pub fn finish_save_all(
        &mut self,
        results: Vec<(ApplicationEntry, std::result::Result<(), ClientError>)>,
    ) -> SaveReport {
        let report = settings::record_saves(results, &mut self.store, &mut self.notifications);
        self.close_settings();
        report
    }

    pub async fn add_application(&mut self, api: &dyn LauncherApi) -> Result<()> {
        let draft = self.settings_draft()?;
        let result = api.create_application(&draft).await;
        self.finish_add(draft, result)
    }

    pub async fn update_application(&mut self, api: &dyn LauncherApi, index: usize) -> Result<()> {
        let row = self.settings_row(index)?;
        let result = api.update_application(&row.id, &row).await;
        self.finish_update(&row, result)
    }

    /// Removing by position shifts the server's list, so the grid's copy is
    /// refetched right away.
    pub async fn remove_application(&mut self, api: &dyn LauncherApi, index: usize) -> Result<()> {
        let id = self.settings_row(index)?.id;
        let result = api.delete_application(&id).await;
        self.finish_remove(&id, result)?;
        if id.is_positional() {
            if let Err(e) = self.store.refetch(api).await {
                log::warn!("Application list not realigned after removal: {}", e);
            }
        }
        Ok(())
    }

    pub async fn save_all_settings(&mut self, api: &dyn LauncherApi) -> Result<SaveReport> {
        let rows = self.settings_rows()?;
        let results = settings::update_all(api, rows).await;
        Ok(self.finish_save_all(results))
    }
}
