//! Infrastructure implementation of the `ConfigStore` port.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::ports::ConfigStore;
use crate::domain::SidekickConfig;

/// Overrides the configuration file location for every profile.
pub const CONFIG_ENV: &str = "SIDEKICK_CONFIG";

pub const DEFAULT_PROFILE: &str = "default";

/// Production implementation of `ConfigStore` that uses a YAML file on disk.
#[derive(Debug, Clone)]
pub struct YamlConfigStore {
    path: PathBuf,
}

impl YamlConfigStore {
    /// Store for `profile`, honouring `SIDEKICK_CONFIG`.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile name is not a plain file stem or the
    /// home directory cannot be determined.
    pub fn for_profile(profile: &str) -> Result<Self> {
        let path = resolve_path(profile, std::env::var_os(CONFIG_ENV), dirs::home_dir())?;
        Ok(Self { path })
    }

    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }
}

fn resolve_path(
    profile: &str,
    env_override: Option<OsString>,
    home: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(val) = env_override.filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(val));
    }
    anyhow::ensure!(
        !profile.is_empty()
            && profile
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !profile.starts_with('.'),
        "invalid profile name {profile:?} (use letters, digits, '-', '_' or '.')"
    );
    let home = home.ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home
        .join(".config")
        .join("sidekick")
        .join(format!("{profile}.yaml")))
}

fn write_private(path: &Path, content: &str) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)
        .with_context(|| format!("cannot create {}", parent.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("cannot write {}", path.display()))?;
    tmp.write_all(content.as_bytes())
        .with_context(|| format!("cannot write {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("cannot set permissions on {}", path.display()))?;
    }

    tmp.persist(path)
        .with_context(|| format!("cannot write {}", path.display()))?;
    Ok(())
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<SidekickConfig> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no config file yet");
            return Ok(SidekickConfig::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(SidekickConfig::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", self.path.display()))
    }

    fn persist(&self, config: &SidekickConfig) -> Result<()> {
        let content = serde_yaml::to_string(config).context("cannot serialize config")?;
        write_private(&self.path, &content)?;
        debug!(path = %self.path.display(), "config written");
        Ok(())
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }
}
