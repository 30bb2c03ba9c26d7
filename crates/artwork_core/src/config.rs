use serde::{Deserialize, Serialize};

/// Origin of the artwork search engine that hosts the picker window.
pub const DEFAULT_SEARCH_ORIGIN: &str = "https://covers.musichoarders.xyz";
/// Origin of the host page that owns the upload form.
pub const DEFAULT_HOST_ORIGIN: &str = "https://www.last.fm";
pub const DEFAULT_REMOTE_AGENT: &str = "artwork-upload-helper/1.0";

/// Every source the search engine knows about; the persisted selection is a subset.
pub const ALL_SOURCES: &[&str] = &[
    "Amazon",
    "Amazon Music",
    "Apple Music",
    "Bandcamp",
    "Beatport",
    "Bugs",
    "BOOTH",
    "Deezer",
    "Discogs",
    "Fanart.tv",
    "FLO",
    "Gaana",
    "iTunes",
    "KKBOX",
    "KuGou",
    "Last.fm",
    "LINE MUSIC",
    "Melon",
    "Metal Archives",
    "MusicBrainz",
    "NetEase",
    "OTOTOY",
    "Qobuz",
    "RecoChoku",
    "Soulseek",
    "SoundCloud",
    "Spotify",
    "THWiki",
    "TIDAL",
    "VGMdb",
];

const DEFAULT_SOURCES: &[&str] = &["Bandcamp", "Deezer", "Discogs", "Spotify", "Qobuz", "Tidal"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

/// The persisted settings record, read once when a session opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: Theme,
    /// Minimum artwork resolution in pixels; 0 means no minimum.
    pub resolution: u32,
    pub sources: Vec<String>,
    pub country: String,
    pub remote_agent: String,
    /// Diagnostic logging.
    pub debug: bool,
    pub search_origin: String,
    pub host_origin: String,
    pub image_wait_timeout_ms: u64,
    pub input_wait_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            resolution: 0,
            sources: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
            country: "us".to_string(),
            remote_agent: DEFAULT_REMOTE_AGENT.to_string(),
            debug: false,
            search_origin: DEFAULT_SEARCH_ORIGIN.to_string(),
            host_origin: DEFAULT_HOST_ORIGIN.to_string(),
            image_wait_timeout_ms: 10_000,
            input_wait_timeout_ms: 10_000,
            poll_interval_ms: 500,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Read(String),
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("failed to write configuration: {0}")]
    Write(String),
}

/// Storage capability for the single configuration record.
pub trait ConfigStore: Send + Sync {
    /// Returns the stored record merged over defaults; a missing record yields defaults.
    fn load(&self) -> Result<Config, ConfigError>;
    fn save(&self, config: &Config) -> Result<(), ConfigError>;
}

/// Lower-cases each source, drops everything but ASCII letters and digits, joins with commas.
pub fn normalize_sources<I, S>(sources: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    sources
        .into_iter()
        .map(|source| {
            source
                .as_ref()
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .map(|c| c.to_ascii_lowercase())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::{normalize_sources, Config};

    #[test]
    fn sources_are_lowercased_and_stripped() {
        let joined = normalize_sources(["Apple Music", "Fanart.tv", "LINE MUSIC"]);
        assert_eq!(joined, "applemusic,fanarttv,linemusic");
    }

    #[test]
    fn partial_record_is_merged_over_defaults() {
        let config: Config = serde_json::from_str(r#"{"country":"de","debug":true}"#).unwrap();
        assert_eq!(config.country, "de");
        assert!(config.debug);
        assert_eq!(config.sources, Config::default().sources);
        assert_eq!(config.input_wait_timeout_ms, 10_000);
    }
}
