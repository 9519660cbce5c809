// Global settings: defaults, config files and environment, applied in order

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const ADVANCED_MODE_ENV: &str = "PITIVI_ADVANCED_MODE";
pub const FILE_SUPPORT_ENV: &str = "PITIVI_FILE_SUPPORT";

const GLOBAL_CONFIG_PATH: &str = "/etc/pitivi/settings.toml";
const SETTINGS_DIR: &str = ".pitivi";
const SETTINGS_FILE: &str = "settings.toml";

/// Partial settings contributed by one source; `None` leaves a flag alone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced_mode_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_support_enabled: Option<bool>,
}

impl SettingsPatch {
    /// Overlay `other` on top of `self`
    pub fn merge(self, other: SettingsPatch) -> SettingsPatch {
        SettingsPatch {
            advanced_mode_enabled: other.advanced_mode_enabled.or(self.advanced_mode_enabled),
            file_support_enabled: other.file_support_enabled.or(self.file_support_enabled),
        }
    }
}

/// Environment variable lookup, injectable for tests
pub type EnvLookup = Box<dyn Fn(&str) -> Option<String>>;

/// One layer of global settings
pub enum SettingsSource {
    /// Built-in defaults
    Defaults,
    /// System-wide TOML file
    GlobalConfig(PathBuf),
    /// Per-user TOML file
    UserConfigFile(PathBuf),
    /// Environment variables
    Environment(EnvLookup),
}

impl SettingsSource {
    /// Environment source backed by the process environment
    pub fn process_environment() -> Self {
        SettingsSource::Environment(Box::new(|var| std::env::var(var).ok()))
    }

    /// Environment source backed by a fixed list of variables
    pub fn environment_from<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: Vec<(String, String)> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        SettingsSource::Environment(Box::new(move |var| {
            vars.iter().find(|(k, _)| k == var).map(|(_, v)| v.clone())
        }))
    }

    pub fn name(&self) -> &'static str {
        match self {
            SettingsSource::Defaults => "defaults",
            SettingsSource::GlobalConfig(_) => "global config",
            SettingsSource::UserConfigFile(_) => "user config",
            SettingsSource::Environment(_) => "environment",
        }
    }

    /// Produce this layer's patch
    pub fn patch(&self) -> Result<SettingsPatch> {
        match self {
            SettingsSource::Defaults => Ok(SettingsPatch {
                advanced_mode_enabled: Some(true),
                file_support_enabled: Some(false),
            }),
            SettingsSource::GlobalConfig(path) | SettingsSource::UserConfigFile(path) => {
                read_patch(path)
            }
            SettingsSource::Environment(lookup) => Ok(environment_patch(lookup.as_ref())),
        }
    }
}

impl fmt::Debug for SettingsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsSource::GlobalConfig(path) | SettingsSource::UserConfigFile(path) => {
                write!(f, "{}({})", self.name(), path.display())
            }
            _ => f.write_str(self.name()),
        }
    }
}

/// Missing file is an empty patch
fn read_patch(path: &Path) -> Result<SettingsPatch> {
    if !path.exists() {
        debug!(path = %path.display(), "Settings file not found, skipping");
        return Ok(SettingsPatch::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
    let patch: SettingsPatch = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;
    Ok(patch)
}

/// Unset, empty or "0" is false; anything else is true
pub fn get_bool_env(lookup: &dyn Fn(&str) -> Option<String>, var: &str) -> bool {
    match lookup(var) {
        None => false,
        Some(value) => !(value.is_empty() || value == "0"),
    }
}

fn environment_patch(lookup: &dyn Fn(&str) -> Option<String>) -> SettingsPatch {
    let advanced_mode_enabled = lookup(ADVANCED_MODE_ENV)
        .is_some()
        .then(|| get_bool_env(lookup, ADVANCED_MODE_ENV));
    // File support stays on unless the variable is explicitly set to a false value
    let file_support_enabled = match lookup(FILE_SUPPORT_ENV) {
        None => true,
        Some(_) => get_bool_env(lookup, FILE_SUPPORT_ENV),
    };

    SettingsPatch {
        advanced_mode_enabled,
        file_support_enabled: Some(file_support_enabled),
    }
}

/// Resolved global settings plus the home directory used for per-user paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalSettings {
    pub advanced_mode_enabled: bool,
    /// With the standard sources the environment layer always decides this
    /// flag, so config files only affect it in custom source lists
    pub file_support_enabled: bool,
    home: PathBuf,
}

impl GlobalSettings {
    /// Load from the standard sources for the current user
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Self::with_home(home)
    }

    /// Load from the standard sources, using `home` for the per-user file
    pub fn with_home(home: impl Into<PathBuf>) -> Result<Self> {
        let home = home.into();
        let sources = Self::standard_sources(&home);
        Self::from_sources(home, &sources)
    }

    /// Defaults, global config, user config, process environment
    pub fn standard_sources(home: &Path) -> Vec<SettingsSource> {
        vec![
            SettingsSource::Defaults,
            SettingsSource::GlobalConfig(PathBuf::from(GLOBAL_CONFIG_PATH)),
            SettingsSource::UserConfigFile(user_config_path(home)),
            SettingsSource::process_environment(),
        ]
    }

    /// Fold `sources` left to right; later sources win
    pub fn from_sources(home: impl Into<PathBuf>, sources: &[SettingsSource]) -> Result<Self> {
        let mut merged = SettingsPatch::default();
        for source in sources {
            let patch = source
                .patch()
                .with_context(|| format!("Failed to load settings from {:?}", source))?;
            debug!(source = source.name(), ?patch, "Applying settings layer");
            merged = merged.merge(patch);
        }

        Ok(Self {
            advanced_mode_enabled: merged.advanced_mode_enabled.unwrap_or(true),
            file_support_enabled: merged.file_support_enabled.unwrap_or(false),
            home: home.into(),
        })
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// `~/.pitivi`
    pub fn settings_dir(&self) -> PathBuf {
        self.home.join(SETTINGS_DIR)
    }

    /// `~/.pitivi/settings.toml`
    pub fn user_config_path(&self) -> PathBuf {
        user_config_path(&self.home)
    }

    pub fn global_config_path() -> PathBuf {
        PathBuf::from(GLOBAL_CONFIG_PATH)
    }

    /// Directory for user-installed plugins
    pub fn local_plugin_path(&self, autocreate: bool) -> Result<PathBuf> {
        self.settings_subdir("plugins", autocreate)
    }

    /// Directory for per-plugin settings files
    pub fn plugin_settings_path(&self, autocreate: bool) -> Result<PathBuf> {
        self.settings_subdir("plugins-settings", autocreate)
    }

    fn settings_subdir(&self, name: &str, autocreate: bool) -> Result<PathBuf> {
        let path = self.settings_dir().join(name);
        if autocreate && !path.exists() {
            fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            info!(path = %path.display(), "Created directory");
        }
        Ok(path)
    }

    /// Write advanced mode to the user config file.
    ///
    /// File support is left out because the environment layer of the
    /// standard sources would override any saved value.
    pub fn save_user_config(&self) -> Result<PathBuf> {
        let path = self.user_config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let patch = SettingsPatch {
            advanced_mode_enabled: Some(self.advanced_mode_enabled),
            file_support_enabled: None,
        };
        let contents = toml::to_string_pretty(&patch).context("Failed to serialize settings")?;
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;

        info!(path = %path.display(), "Saved user settings");
        Ok(path)
    }
}

fn user_config_path(home: &Path) -> PathBuf {
    home.join(SETTINGS_DIR).join(SETTINGS_FILE)
}
