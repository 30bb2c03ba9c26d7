use std::fs;
use std::path::{Path, PathBuf};

use artwork_core::{Config, ConfigError, ConfigStore};
use artwork_engine::write_atomic;
use artwork_logging::{artwork_info, artwork_warn};

pub(crate) const CONFIG_FILENAME: &str = "artwork_picker.ron";

/// Stores the settings record as RON in a single file.
pub(crate) struct RonConfigStore {
    dir: PathBuf,
}

impl RonConfigStore {
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub(crate) fn path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILENAME)
    }
}

impl ConfigStore for RonConfigStore {
    /// A missing file yields the defaults, which are written back immediately.
    fn load(&self) -> Result<Config, ConfigError> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                artwork_info!("No settings at {:?}; writing defaults", path);
                let config = Config::default();
                self.save(&config)?;
                return Ok(config);
            }
            Err(err) => return Err(ConfigError::Read(format!("{}: {err}", path.display()))),
        };

        ron::from_str(&content)
            .map_err(|err| ConfigError::Parse(format!("{}: {err}", path.display())))
    }

    fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(config, pretty)
            .map_err(|err| ConfigError::Write(err.to_string()))?;
        write_atomic(&self.dir, CONFIG_FILENAME, content.as_bytes())
            .map_err(|err| ConfigError::Write(err.to_string()))?;
        artwork_info!("Saved settings to {:?}", self.path());
        Ok(())
    }
}

/// Loads settings, falling back to defaults when the stored record is unreadable.
pub(crate) fn load_or_default(store: &dyn ConfigStore, dir: &Path) -> Config {
    match store.load() {
        Ok(config) => config,
        Err(err) => {
            artwork_warn!("Using default settings; {:?} is unusable: {}", dir, err);
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artwork_core::Theme;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_file_writes_defaults() {
        let temp = TempDir::new().unwrap();
        let store = RonConfigStore::new(temp.path());

        let config = store.load().unwrap();
        assert_eq!(config, Config::default());
        assert!(store.path().exists());
    }

    #[test]
    fn saved_settings_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = RonConfigStore::new(temp.path());
        let config = Config {
            theme: Theme::Light,
            resolution: 1000,
            sources: vec!["Bandcamp".into(), "Apple Music".into()],
            country: "jp".into(),
            debug: true,
            ..Config::default()
        };

        store.save(&config).unwrap();
        assert_eq!(store.load().unwrap(), config);
    }

    #[test]
    fn partial_record_keeps_defaults_for_missing_fields() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILENAME), "(country: \"fr\")").unwrap();
        let config = RonConfigStore::new(temp.path()).load().unwrap();
        assert_eq!(config.country, "fr");
        assert_eq!(config.sources, Config::default().sources);
    }

    #[test]
    fn corrupt_record_is_a_parse_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILENAME), "(country: ").unwrap();
        let store = RonConfigStore::new(temp.path());
        assert!(matches!(store.load(), Err(ConfigError::Parse(_))));
        assert_eq!(load_or_default(&store, temp.path()), Config::default());
    }
}
