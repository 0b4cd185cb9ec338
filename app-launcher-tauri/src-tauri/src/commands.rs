use tauri::State;
use tokio::sync::Mutex;

use crate::client::{LauncherApi, RemoteClient};
use crate::config::LauncherConfig;
use crate::models::{ApplicationEntry, EntryField, EntryId};
use crate::notify::Notification;
use crate::settings::{self, SaveReport, SettingsView};
use crate::shell::{Shell, View};
use crate::system::{SystemInfoPanel, SystemInfoView};
use crate::tile::LaunchRequest;

struct AppState {
    api: RemoteClient,
    shell: Mutex<Shell>,
    system: Mutex<SystemInfoPanel>,
}

// The shell is never held across a request to the control server: commands
// copy what they send, unlock, await the reply, then lock again to apply it.

// ── Applications ────────────────────────────────────────────────────────────

async fn fetch_applications(state: &AppState, force: bool) -> Result<Vec<ApplicationEntry>, String> {
    {
        let shell = state.shell.lock().await;
        if !force && !shell.store().needs_fetch() {
            return Ok(shell.store().read().unwrap_or_default().to_vec());
        }
    }
    let result = state.api.list_applications().await;
    state
        .shell
        .lock()
        .await
        .finish_load(result)
        .map_err(|e| e.to_string())
}

#[tauri::command]
async fn list_applications(state: State<'_, AppState>) -> Result<Vec<ApplicationEntry>, String> {
    fetch_applications(&state, false).await
}

#[tauri::command]
async fn refresh_applications(state: State<'_, AppState>) -> Result<Vec<ApplicationEntry>, String> {
    fetch_applications(&state, true).await
}

#[tauri::command]
async fn current_view(state: State<'_, AppState>) -> Result<View, String> {
    Ok(state.shell.lock().await.view())
}

#[tauri::command]
async fn launch_application(state: State<'_, AppState>, id: EntryId) -> Result<(), String> {
    let entry = {
        let mut shell = state.shell.lock().await;
        let entry = shell
            .resolve(&LaunchRequest { id })
            .map_err(|e| e.to_string())?;
        shell.begin_launch(entry.clone()).map_err(|e| e.to_string())?;
        entry
    };
    let result = state.api.launch(&entry.path, &entry.parameter).await;
    state
        .shell
        .lock()
        .await
        .finish_launch(result)
        .map_err(|e| e.to_string())
}

#[tauri::command]
async fn quit_application(state: State<'_, AppState>) -> Result<bool, String> {
    let Some(entry) = state.shell.lock().await.begin_quit() else {
        return Ok(false);
    };
    let result = state.api.quit(&entry.path).await;
    state
        .shell
        .lock()
        .await
        .finish_quit(result)
        .map(|_| true)
        .map_err(|e| e.to_string())
}

// ── Settings ────────────────────────────────────────────────────────────────

#[tauri::command]
async fn open_settings(state: State<'_, AppState>) -> Result<SettingsView, String> {
    if let Err(e) = fetch_applications(&state, false).await {
        log::warn!("Opening settings without application list: {}", e);
    }
    Ok(state.shell.lock().await.open_settings_panel())
}

#[tauri::command]
async fn close_settings(state: State<'_, AppState>) -> Result<(), String> {
    state.shell.lock().await.close_settings();
    Ok(())
}

#[tauri::command]
async fn settings_state(state: State<'_, AppState>) -> Result<Option<SettingsView>, String> {
    Ok(state.shell.lock().await.settings_view())
}

#[tauri::command]
async fn edit_setting(
    state: State<'_, AppState>,
    index: usize,
    field: EntryField,
    value: String,
) -> Result<(), String> {
    state
        .shell
        .lock()
        .await
        .edit_setting(index, field, value)
        .map_err(|e| e.to_string())
}

#[tauri::command]
async fn edit_new_application(
    state: State<'_, AppState>,
    field: EntryField,
    value: String,
) -> Result<(), String> {
    state
        .shell
        .lock()
        .await
        .edit_new_application(field, value)
        .map_err(|e| e.to_string())
}

#[tauri::command]
async fn add_application(state: State<'_, AppState>) -> Result<(), String> {
    let draft = state.shell.lock().await.settings_draft().map_err(|e| e.to_string())?;
    let result = state.api.create_application(&draft).await;
    state
        .shell
        .lock()
        .await
        .finish_add(draft, result)
        .map_err(|e| e.to_string())
}

#[tauri::command]
async fn update_application(state: State<'_, AppState>, index: usize) -> Result<(), String> {
    let row = state.shell.lock().await.settings_row(index).map_err(|e| e.to_string())?;
    let result = state.api.update_application(&row.id, &row).await;
    state
        .shell
        .lock()
        .await
        .finish_update(&row, result)
        .map_err(|e| e.to_string())
}

#[tauri::command]
async fn remove_application(state: State<'_, AppState>, index: usize) -> Result<(), String> {
    let id = state.shell.lock().await.settings_row(index).map_err(|e| e.to_string())?.id;
    let result = state.api.delete_application(&id).await;
    state
        .shell
        .lock()
        .await
        .finish_remove(&id, result)
        .map_err(|e| e.to_string())?;
    // Positions on the server just shifted.
    if id.is_positional() {
        if let Err(e) = fetch_applications(&state, true).await {
            log::warn!("Application list not realigned after removal: {}", e);
        }
    }
    Ok(())
}

#[tauri::command]
async fn save_all_settings(state: State<'_, AppState>) -> Result<SaveReport, String> {
    let rows = state.shell.lock().await.settings_rows().map_err(|e| e.to_string())?;
    let results = settings::update_all(&state.api, rows).await;
    Ok(state.shell.lock().await.finish_save_all(results))
}

// ── System info ─────────────────────────────────────────────────────────────

async fn fetch_system_info(state: &AppState) -> Result<SystemInfoView, String> {
    state.system.lock().await.begin_refresh().map_err(|e| e.to_string())?;
    let result = state.api.system_info().await;
    let mut panel = state.system.lock().await;
    panel.finish_refresh(result);
    Ok(panel.view())
}

/// Current panel; the first call performs the initial fetch.
#[tauri::command]
async fn system_info(state: State<'_, AppState>) -> Result<SystemInfoView, String> {
    {
        let panel = state.system.lock().await;
        if panel.has_loaded() || panel.is_fetching() {
            return Ok(panel.view());
        }
    }
    fetch_system_info(&state).await
}

#[tauri::command]
async fn refresh_system_info(state: State<'_, AppState>) -> Result<SystemInfoView, String> {
    fetch_system_info(&state).await
}

#[tauri::command]
async fn take_notifications(state: State<'_, AppState>) -> Result<Vec<Notification>, String> {
    Ok(state.shell.lock().await.notifications().take())
}

// ── App ─────────────────────────────────────────────────────────────────────

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let (config, config_error) = LauncherConfig::from_env_or_default();
    let base_url = config.base_url();

    tauri::Builder::default()
        .setup(move |app| {
            let level = if cfg!(debug_assertions) {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            };
            app.handle()
                .plugin(tauri_plugin_log::Builder::default().level(level).build())?;
            if let Some(e) = &config_error {
                log::warn!("Ignoring launcher configuration, using defaults: {}", e);
            }
            log::info!("Using control server at {}", base_url);
            Ok(())
        })
        .manage(AppState {
            api: RemoteClient::new(&config),
            shell: Mutex::new(Shell::default()),
            system: Mutex::new(SystemInfoPanel::default()),
        })
        .invoke_handler(tauri::generate_handler![
            list_applications,
            refresh_applications,
            current_view,
            launch_application,
            quit_application,
            open_settings,
            close_settings,
            settings_state,
            edit_setting,
            edit_new_application,
            add_application,
            update_application,
            remove_application,
            save_all_settings,
            system_info,
            refresh_system_info,
            take_notifications,
        ])
        .run(tauri::generate_context!())
        .expect("error while running CORE App Launcher");
}
