use artwork_core::{
    authenticate, build_search_url, ArtworkMessage, Config, Envelope, FormFields,
    SelectionRequest, TransportIgnored, DEFAULT_SEARCH_ORIGIN,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;

fn envelope(origin: &str, data: serde_json::Value) -> Envelope {
    Envelope {
        origin: origin.to_string(),
        data,
    }
}

#[test]
fn agent_message_round_trips_through_authentication() {
    let message = ArtworkMessage {
        url: "https://cdn.example/cover.png".to_string(),
        release_date: Some("1999".to_string()),
        session: Some("tok".to_string()),
    };
    let accepted = authenticate(
        &envelope(DEFAULT_SEARCH_ORIGIN, message.to_value()),
        DEFAULT_SEARCH_ORIGIN,
        Some("tok"),
    )
    .unwrap();
    assert_eq!(accepted, message);
}

#[test]
fn wire_shape_uses_kind_and_camel_case() {
    let message = ArtworkMessage {
        url: "https://cdn.example/cover.png".to_string(),
        release_date: Some("2001-02-03".to_string()),
        session: None,
    };
    assert_eq!(
        message.to_value(),
        json!({
            "kind": "artworkSelected",
            "data": { "url": "https://cdn.example/cover.png", "releaseDate": "2001-02-03" }
        })
    );
}

#[test]
fn rejections_are_classified() {
    let cases = [
        (
            envelope("https://other.example", json!({"kind": "artworkSelected", "data": {"url": "https://x/y.jpg"}})),
            TransportIgnored::ForeignOrigin,
        ),
        (envelope(DEFAULT_SEARCH_ORIGIN, json!("hello")), TransportIgnored::Malformed),
        (
            envelope(DEFAULT_SEARCH_ORIGIN, json!({"kind": "resize", "data": {"url": "https://x/y.jpg"}})),
            TransportIgnored::WrongKind,
        ),
        (
            envelope(DEFAULT_SEARCH_ORIGIN, json!({"kind": "artworkSelected", "data": {"url": ""}})),
            TransportIgnored::MissingUrl,
        ),
        (
            envelope(DEFAULT_SEARCH_ORIGIN, json!({"kind": "artworkSelected", "data": {}})),
            TransportIgnored::MissingUrl,
        ),
        (
            envelope(DEFAULT_SEARCH_ORIGIN, json!({"kind": "artworkSelected", "data": {"url": "/relative.jpg"}})),
            TransportIgnored::RelativeUrl,
        ),
    ];

    for (env, expected) in cases {
        assert_eq!(authenticate(&env, DEFAULT_SEARCH_ORIGIN, None), Err(expected));
    }
}

#[test]
fn missing_token_is_rejected_when_session_expects_one() {
    let env = envelope(
        DEFAULT_SEARCH_ORIGIN,
        json!({"kind": "artworkSelected", "data": {"url": "https://x/y.jpg"}}),
    );
    assert_eq!(
        authenticate(&env, DEFAULT_SEARCH_ORIGIN, Some("tok")),
        Err(TransportIgnored::SessionMismatch)
    );
}

#[test]
fn null_release_date_is_absent() {
    let env = envelope(
        "https://covers.musichoarders.xyz/",
        json!({"kind": "artworkSelected", "data": {"url": "https://x/y.jpg", "releaseDate": null}}),
    );
    let accepted = authenticate(&env, DEFAULT_SEARCH_ORIGIN, None).unwrap();
    assert_eq!(accepted.release_date, None);
}

#[test]
fn search_url_carries_required_parameters() {
    let config = Config {
        sources: vec!["Apple Music".to_string(), "Bandcamp".to_string()],
        country: "GB".to_string(),
        ..Config::default()
    };
    let request = SelectionRequest::new("Boards of Canada", "Geogaddi", &config);
    let url = build_search_url(&config.search_origin, &config.remote_agent, &request, Some("s1"))
        .unwrap();

    let parsed = Url::parse(url.as_str()).unwrap();
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let get = |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };

    assert_eq!(parsed.origin().ascii_serialization(), DEFAULT_SEARCH_ORIGIN);
    assert_eq!(get("theme"), Some("dark"));
    assert_eq!(get("resolution"), Some("0"));
    assert_eq!(get("sources"), Some("applemusic,bandcamp"));
    assert_eq!(get("country"), Some("gb"));
    assert_eq!(get("artist"), Some("Boards of Canada"));
    assert_eq!(get("album"), Some("Geogaddi"));
    assert_eq!(get("identifier"), Some(artwork_core::PICKER_IDENTIFIER));
    assert_eq!(get("remote.agent"), Some(config.remote_agent.as_str()));
    assert_eq!(
        get("remote.text"),
        Some("Pick cover for Boards of Canada — Geogaddi")
    );
    assert_eq!(get("session"), Some("s1"));
}

#[test]
fn description_falls_back_without_release_date() {
    let request = SelectionRequest::new("A", "B", &Config::default());
    assert_eq!(
        FormFields::compose(&request, None),
        FormFields {
            title: "A - B".to_string(),
            description: "Album artwork for B by A".to_string(),
        }
    );
    assert_eq!(
        FormFields::compose(&request, Some("  ")).description,
        "Album artwork for B by A"
    );
}
