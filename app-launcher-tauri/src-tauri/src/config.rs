use crate::error::{LauncherError, Result};

pub const HOST_VAR: &str = "APP_LAUNCHER_SERVER_HOST";
pub const PORT_VAR: &str = "APP_LAUNCHER_SERVER_PORT";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3000;

/// Where the control server lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    pub server_host: String,
    pub server_port: u16,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            server_host: DEFAULT_HOST.to_string(),
            server_port: DEFAULT_PORT,
        }
    }
}

impl LauncherConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env`, but an invalid setting yields the defaults along with
    /// the error so startup can report it.
    pub fn from_env_or_default() -> (Self, Option<LauncherError>) {
        Self::from_lookup_or_default(|key| std::env::var(key).ok())
    }

    pub fn from_lookup_or_default<F>(lookup: F) -> (Self, Option<LauncherError>)
    where
        F: Fn(&str) -> Option<String>,
    {
        match Self::from_lookup(lookup) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Builds a config from any key lookup; unset or blank values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup(HOST_VAR).filter(|h| !h.trim().is_empty()) {
            config.server_host = host.trim().to_string();
        }

        if let Some(port) = lookup(PORT_VAR).filter(|p| !p.trim().is_empty()) {
            config.server_port = port
                .trim()
                .parse()
                .map_err(|_| LauncherError::Config(format!("{} is not a valid port: {}", PORT_VAR, port)))?;
        }

        Ok(config)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
