use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RigupError};
use crate::host::HostAdapter;
use crate::worker::WorkerSettings;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Overrides the adapter's conventional install prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_prefix: Option<String>,

    /// Catalog tool ids to leave out of provisioning.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skip: Vec<String>,

    /// License-acceptance cookies, keyed by tool id. Sent as the `Cookie`
    /// header when fetching that tool's installer.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cookies: BTreeMap<String, String>,

    /// CI worker registration, used by `rigup worker`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker: Option<WorkerSettings>,
}

impl AppConfig {
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("rigup"))
            .ok_or_else(|| RigupError::Config("cannot resolve config directory".to_string()))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.yaml"))
    }

    /// Load the config file, falling back to defaults when it does not
    /// exist. Provisioning works out of the box; `rigup init` is optional.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            tracing::debug!("no config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| RigupError::Config(format!("Invalid config: {}", e)))
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| RigupError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(&path, content)?;

        // The file may hold a worker password.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// Cookie for a tool's download, from the config file or from
    /// `RIGUP_COOKIE_<TOOL>` in the environment.
    pub fn cookie_for(&self, tool_id: &str) -> Option<String> {
        if let Some(cookie) = self.cookies.get(tool_id) {
            return Some(cookie.clone());
        }
        let var = format!(
            "RIGUP_COOKIE_{}",
            tool_id.to_ascii_uppercase().replace('-', "_")
        );
        std::env::var(var).ok()
    }

    /// Where archives get unpacked on this host.
    pub fn install_prefix_for(&self, adapter: &dyn HostAdapter) -> PathBuf {
        match &self.install_prefix {
            Some(prefix) => PathBuf::from(shellexpand::tilde(prefix).into_owned()),
            None => adapter.install_prefix(),
        }
    }
}
