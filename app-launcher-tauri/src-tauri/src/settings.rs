use futures::future::join_all;
use serde::Serialize;

use crate::client::LauncherApi;
use crate::error::{ClientError, LauncherError, Result};
use crate::models::{ApplicationEntry, EntryField, EntryId, NewApplication};
use crate::notify::Notifications;
use crate::store::ApplicationStore;

type ClientResult<T> = std::result::Result<T, ClientError>;

/// Outcome of "Save Changes".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub attempted: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsView {
    pub rows: Vec<ApplicationEntry>,
    pub draft: NewApplication,
}

/// Editable snapshot of the application list.
///
/// Rows are addressed by their position in the panel; the server is addressed
/// by each row's id. Positional ids are renumbered here when an earlier row is
/// removed, the same way the server's list closes up.
#[derive(Debug, Default)]
pub struct SettingsPanel {
    rows: Vec<ApplicationEntry>,
    draft: NewApplication,
}

impl SettingsPanel {
    pub fn new(snapshot: Option<&[ApplicationEntry]>) -> Self {
        Self {
            rows: snapshot.map(|s| s.to_vec()).unwrap_or_default(),
            draft: NewApplication::default(),
        }
    }

    pub fn rows(&self) -> &[ApplicationEntry] {
        &self.rows
    }

    pub fn draft(&self) -> &NewApplication {
        &self.draft
    }

    pub fn view(&self) -> SettingsView {
        SettingsView {
            rows: self.rows.clone(),
            draft: self.draft.clone(),
        }
    }

    pub fn row(&self, index: usize) -> Result<&ApplicationEntry> {
        self.rows
            .get(index)
            .ok_or_else(|| LauncherError::NotFound(format!("settings row {}", index)))
    }

    pub fn edit_row(&mut self, index: usize, field: EntryField, value: String) -> Result<()> {
        let row = self
            .rows
            .get_mut(index)
            .ok_or_else(|| LauncherError::NotFound(format!("settings row {}", index)))?;
        row.set_field(field, value);
        Ok(())
    }

    pub fn edit_draft(&mut self, field: EntryField, value: String) {
        self.draft.set_field(field, value);
    }

    /// Appends an accepted draft. Without an assigned id the row takes the
    /// next position. The form is cleared unless it changed while the request
    /// was out.
    pub fn apply_add(&mut self, submitted: NewApplication, assigned: Option<EntryId>) {
        let id = assigned.unwrap_or(EntryId::Position(self.rows.len()));
        if self.draft == submitted {
            self.draft = NewApplication::default();
        }
        self.rows.push(submitted.into_entry(id));
    }

    pub fn apply_removal(&mut self, id: &EntryId) {
        self.rows.retain(|r| &r.id != id);
        if let EntryId::Position(removed) = id {
            for row in &mut self.rows {
                if let EntryId::Position(position) = &mut row.id {
                    if *position > *removed {
                        *position -= 1;
                    }
                }
            }
        }
    }
}

/// Sends every row concurrently and waits for all of them to settle.
pub async fn update_all(
    api: &dyn LauncherApi,
    rows: Vec<ApplicationEntry>,
) -> Vec<(ApplicationEntry, ClientResult<()>)> {
    join_all(rows.into_iter().map(|row| async move {
        let result = api.update_application(&row.id, &row).await;
        (row, result)
    }))
    .await
}

/// Yields the server-assigned id, if the server named one.
pub fn record_add(
    submitted: &NewApplication,
    result: ClientResult<Option<EntryId>>,
    store: &mut ApplicationStore,
    notes: &mut Notifications,
) -> ClientResult<Option<EntryId>> {
    match result {
        Ok(assigned) => {
            log::info!("Added application {}", submitted.name);
            store.invalidate();
            notes.success("Application added successfully");
            Ok(assigned)
        }
        Err(e) => {
            log::error!("Error adding application: {}", e);
            notes.error("Failed to add application");
            Err(e)
        }
    }
}

pub fn record_update(
    row: &ApplicationEntry,
    result: ClientResult<()>,
    store: &mut ApplicationStore,
    notes: &mut Notifications,
) -> ClientResult<()> {
    match result {
        Ok(()) => {
            log::info!("Updated application {} ({})", row.name, row.id);
            store.invalidate();
            notes.success("Application updated successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Error updating application {}: {}", row.id, e);
            notes.error("Failed to update application");
            Err(e)
        }
    }
}

/// A refused delete leaves the store untouched.
pub fn record_removal(
    id: &EntryId,
    result: ClientResult<()>,
    store: &mut ApplicationStore,
    notes: &mut Notifications,
) -> ClientResult<()> {
    match result {
        Ok(()) => {
            log::info!("Removed application {}", id);
            store.invalidate();
            notes.success("Application removed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Error removing application {}: {}", id, e);
            notes.error("Failed to remove application");
            Err(e)
        }
    }
}

pub fn record_saves(
    results: Vec<(ApplicationEntry, ClientResult<()>)>,
    store: &mut ApplicationStore,
    notes: &mut Notifications,
) -> SaveReport {
    let mut report = SaveReport { attempted: results.len(), failed: 0 };
    for (row, result) in results {
        if record_update(&row, result, store, notes).is_err() {
            report.failed += 1;
        }
    }
    if report.failed > 0 {
        log::warn!("Saved settings with {} of {} updates failing", report.failed, report.attempted);
    }
    report
}
