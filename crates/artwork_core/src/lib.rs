//! Artwork core: configuration, wire protocol and the pure session state machine.
mod config;
mod effect;
mod fields;
mod message;
mod msg;
mod request;
mod state;
mod update;
mod view_model;

pub use config::{
    normalize_sources, Config, ConfigError, ConfigStore, Theme, ALL_SOURCES,
    DEFAULT_HOST_ORIGIN, DEFAULT_REMOTE_AGENT, DEFAULT_SEARCH_ORIGIN,
};
pub use effect::Effect;
pub use fields::FormFields;
pub use message::{
    authenticate, ArtworkMessage, Envelope, TransportIgnored, WireMessage, WirePayload,
    ARTWORK_SELECTED,
};
pub use msg::{InjectFailure, Msg};
pub use request::{
    build_search_url, SearchOptions, SelectionRequest, IDENTIFIER_PARAM, PICKER_IDENTIFIER,
    SESSION_PARAM,
};
pub use state::{ControllerState, FailureReason, SessionId, SessionState, STATUS_READY};
pub use update::update;
pub use view_model::ControllerView;
