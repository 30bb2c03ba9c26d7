use std::collections::BTreeSet;

use url::Url;

use crate::config::{normalize_sources, Config, Theme};

/// Marker value the picker window looks for in its own URL to know it was opened by us.
pub const PICKER_IDENTIFIER: &str = "artwork-picker-session";
pub const IDENTIFIER_PARAM: &str = "identifier";
/// Query parameter carrying the per-session token echoed back by the agent.
pub const SESSION_PARAM: &str = "session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub theme: Theme,
    pub min_resolution: u32,
    pub sources: BTreeSet<String>,
    pub country: String,
    pub search_text: Option<String>,
}

/// What the user wants artwork for. Fixed once the picker window opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRequest {
    artist: String,
    album: String,
    search_options: SearchOptions,
}

impl SelectionRequest {
    pub fn new(artist: impl Into<String>, album: impl Into<String>, config: &Config) -> Self {
        let artist = artist.into();
        let album = album.into();
        let search_text = Some(format!("Pick cover for {artist} — {album}"));
        Self {
            search_options: SearchOptions {
                theme: config.theme,
                min_resolution: config.resolution,
                sources: config.sources.iter().cloned().collect(),
                country: config.country.clone(),
                search_text,
            },
            artist,
            album,
        }
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn album(&self) -> &str {
        &self.album
    }

    pub fn search_options(&self) -> &SearchOptions {
        &self.search_options
    }
}

/// Builds the picker URL on the search origin.
///
/// `remote_agent` is appended when non-empty; `session` is the token the agent echoes back.
pub fn build_search_url(
    search_origin: &str,
    remote_agent: &str,
    request: &SelectionRequest,
    session: Option<&str>,
) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(search_origin)?;
    url.set_path("/");
    {
        let options = request.search_options();
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("theme", options.theme.as_str());
        pairs.append_pair("resolution", &options.min_resolution.to_string());
        if !options.sources.is_empty() {
            pairs.append_pair("sources", &normalize_sources(&options.sources));
        }
        if !options.country.is_empty() {
            pairs.append_pair("country", &options.country.to_lowercase());
        }
        if !request.artist().is_empty() {
            pairs.append_pair("artist", request.artist());
        }
        if !request.album().is_empty() {
            pairs.append_pair("album", request.album());
        }
        pairs.append_pair(IDENTIFIER_PARAM, PICKER_IDENTIFIER);
        if !remote_agent.is_empty() {
            pairs.append_pair("remote.agent", remote_agent);
        }
        if let Some(text) = options.search_text.as_deref() {
            pairs.append_pair("remote.text", text);
        }
        if let Some(token) = session {
            pairs.append_pair(SESSION_PARAM, token);
        }
    }
    Ok(url)
}
