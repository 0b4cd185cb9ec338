use serde::Serialize;

use crate::client::LauncherApi;
use crate::error::{ClientError, LauncherError, Result};
use crate::models::SystemMetrics;

// ── Formatting ───────────────────────────────────────────────────

const SIZES: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Human-readable byte count using the largest unit that keeps the value at or above 1.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Byte".to_string();
    }
    let mut i = 0;
    let mut scale: u64 = 1;
    while i < SIZES.len() - 1 && bytes / scale >= 1024 {
        scale *= 1024;
        i += 1;
    }
    let value = (bytes as f64 / scale as f64).round();
    format!("{} {}", value, SIZES[i])
}

/// `"{days}d {hours}h {minutes}m"`, floored, seconds dropped.
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    format!("{}d {}h {}m", days, hours, minutes)
}

pub fn memory_usage_percent(total_memory: u64, free_memory: u64) -> f64 {
    if total_memory > 0 {
        (total_memory.saturating_sub(free_memory) as f64 / total_memory as f64) * 100.0
    } else {
        0.0
    }
}

// ── View model ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SystemInfoView {
    Loading,
    Failed {
        message: String,
    },
    Ready {
        memory_usage_percent: f64,
        gauge_label: String,
        rows: Vec<MetricRow>,
        fetching: bool,
        refresh_error: Option<String>,
    },
}

// ── Panel ────────────────────────────────────────────────────────

/// Host metrics card with a manual refresh button.
#[derive(Debug, Default)]
pub struct SystemInfoPanel {
    metrics: Option<SystemMetrics>,
    error: Option<String>,
    fetching: bool,
}

impl SystemInfoPanel {
    /// Creates the panel and performs the initial fetch.
    pub async fn mount(api: &dyn LauncherApi) -> Self {
        let mut panel = Self::default();
        if let Err(e) = panel.refresh(api).await {
            log::warn!("Initial system info fetch skipped: {}", e);
        }
        panel
    }

    pub fn metrics(&self) -> Option<&SystemMetrics> {
        self.metrics.as_ref()
    }

    /// True once a fetch has completed, successfully or not.
    pub fn has_loaded(&self) -> bool {
        self.metrics.is_some() || self.error.is_some()
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    /// Marks a fetch as in flight; rejected while another one is outstanding.
    pub fn begin_refresh(&mut self) -> Result<()> {
        if self.fetching {
            return Err(LauncherError::Busy("system info refresh already in progress"));
        }
        self.fetching = true;
        Ok(())
    }

    pub fn finish_refresh(&mut self, result: std::result::Result<SystemMetrics, ClientError>) {
        self.fetching = false;
        match result {
            Ok(metrics) => {
                log::debug!("System info refreshed for {}", metrics.hostname);
                self.metrics = Some(metrics);
                self.error = None;
            }
            Err(e) => {
                log::error!("Error loading system information: {}", e);
                self.error = Some(e.to_string());
            }
        }
    }

    pub async fn refresh(&mut self, api: &dyn LauncherApi) -> Result<()> {
        self.begin_refresh()?;
        let result = api.system_info().await;
        self.finish_refresh(result);
        Ok(())
    }

    pub fn view(&self) -> SystemInfoView {
        let Some(metrics) = &self.metrics else {
            return match &self.error {
                Some(_) if !self.fetching => SystemInfoView::Failed {
                    message: "Error loading system information".to_string(),
                },
                _ => SystemInfoView::Loading,
            };
        };

        let usage = memory_usage_percent(metrics.total_memory, metrics.free_memory);
        SystemInfoView::Ready {
            memory_usage_percent: usage,
            gauge_label: format!("{}%", usage.round()),
            rows: vec![
                MetricRow { label: "Architecture", value: metrics.architecture.clone() },
                MetricRow { label: "Platform", value: metrics.platform.clone() },
                MetricRow { label: "Hostname", value: metrics.hostname.clone() },
                MetricRow { label: "Total Memory", value: format_bytes(metrics.total_memory) },
                MetricRow { label: "Uptime", value: format_uptime(metrics.uptime) },
                MetricRow { label: "CPUs", value: metrics.cpu_count().to_string() },
            ],
            fetching: self.fetching,
            refresh_error: self.error.clone(),
        }
    }
}
