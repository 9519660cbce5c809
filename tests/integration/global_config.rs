// Integration tests for global settings resolution
//
// Sources are layered against a temporary home directory; the environment is
// injected so tests never touch the process environment.

use expset::config::{
    ADVANCED_MODE_ENV, FILE_SUPPORT_ENV, GlobalSettings, SettingsPatch, SettingsSource,
};
use std::fs;
use tempfile::TempDir;

fn sources(home: &TempDir, env: &[(&str, &str)]) -> Vec<SettingsSource> {
    vec![
        SettingsSource::Defaults,
        SettingsSource::GlobalConfig(home.path().join("etc-settings.toml")),
        SettingsSource::UserConfigFile(home.path().join(".pitivi").join("settings.toml")),
        SettingsSource::environment_from(env.iter().copied()),
    ]
}

#[test]
fn test_environment_beats_config_files() {
    let home = TempDir::new().unwrap();
    fs::write(
        home.path().join("etc-settings.toml"),
        "advanced_mode_enabled = false\n",
    )
    .unwrap();

    let settings = GlobalSettings::from_sources(home.path(), &sources(&home, &[])).unwrap();
    assert!(!settings.advanced_mode_enabled);
    assert!(settings.file_support_enabled);

    let settings = GlobalSettings::from_sources(
        home.path(),
        &sources(&home, &[(ADVANCED_MODE_ENV, "1"), (FILE_SUPPORT_ENV, "0")]),
    )
    .unwrap();
    assert!(settings.advanced_mode_enabled);
    assert!(!settings.file_support_enabled);
}

#[test]
fn test_saved_user_config_is_picked_up() -> anyhow::Result<()> {
    let home = TempDir::new()?;
    let mut settings = GlobalSettings::from_sources(home.path(), &[SettingsSource::Defaults])?;
    settings.advanced_mode_enabled = false;
    settings.save_user_config()?;

    let contents = fs::read_to_string(settings.user_config_path())?;
    let patch: SettingsPatch = toml::from_str(&contents)?;
    assert_eq!(patch.advanced_mode_enabled, Some(false));
    assert_eq!(patch.file_support_enabled, None);

    let reloaded = GlobalSettings::from_sources(home.path(), &sources(&home, &[]))?;
    assert!(!reloaded.advanced_mode_enabled);
    assert!(reloaded.file_support_enabled);
    Ok(())
}

#[test]
fn test_saving_keeps_file_support_under_environment_control() -> anyhow::Result<()> {
    let home = TempDir::new()?;
    let with_env = |vars: &[(&'static str, &'static str)]| {
        GlobalSettings::from_sources(home.path(), &sources(&home, vars))
    };

    let disabled = with_env(&[(FILE_SUPPORT_ENV, "0")])?;
    assert!(!disabled.file_support_enabled);
    disabled.save_user_config()?;

    // The saved file does not pin the flag either way
    assert!(with_env(&[])?.file_support_enabled);
    assert!(!with_env(&[(FILE_SUPPORT_ENV, "")])?.file_support_enabled);
    Ok(())
}

#[test]
fn test_plugin_directories_created_on_demand() {
    let home = TempDir::new().unwrap();
    let settings = GlobalSettings::from_sources(home.path(), &[SettingsSource::Defaults]).unwrap();

    assert!(!settings.settings_dir().exists());
    let plugins = settings.local_plugin_path(true).unwrap();
    assert!(plugins.starts_with(settings.settings_dir()));
    assert!(plugins.is_dir());

    // Already present: no error the second time
    assert_eq!(settings.local_plugin_path(true).unwrap(), plugins);
}

#[test]
fn test_plugin_directory_creation_failure_propagates() {
    let home = TempDir::new().unwrap();
    // A file where the settings directory should be
    fs::write(home.path().join(".pitivi"), "not a directory").unwrap();
    let settings = GlobalSettings::from_sources(home.path(), &[SettingsSource::Defaults]).unwrap();

    assert!(settings.plugin_settings_path(true).is_err());
    assert!(settings.plugin_settings_path(false).is_ok());
}
