//! Artwork engine: picker agent, transport and the download/injection pipeline.
mod agent;
mod album_info;
mod artifact;
mod decode;
mod engine;
mod fetch;
mod form;
mod inject;
mod persist;
mod poll;
mod release_date;
mod resolve;
mod transport;
mod types;

pub use agent::{
    Agent, AgentSettings, AgentState, ClickDisposition, PickerPage, PickerSession,
    ARTWORK_IMAGE_SELECTORS,
};
pub use album_info::{extract_album_info, AlbumInfo};
pub use artifact::{
    acquire, extension_from_mime, extension_from_url, infer_extension, Blob, FileArtifact,
    ARTIFACT_BASE_NAME, DEFAULT_EXTENSION, DEFAULT_MIME_TYPE,
};
pub use decode::{decode_page, DecodeError, DecodedPage};
pub use engine::EngineHandle;
pub use fetch::{ArtworkFetcher, FetchSettings, ReqwestFetcher};
pub use form::FormDocument;
pub use inject::{
    fill_metadata, inject, FormControl, FormError, FormEvent, FormEventKind, HostForm,
    InjectError, InjectSettings, MetadataReport,
};
pub use persist::{write_atomic, PersistError};
pub use poll::{await_condition, TimeoutError};
pub use release_date::{extract_release_date, match_date};
pub use resolve::{largest_srcset_candidate, strip_thumbnail_markers, ImageResolver};
pub use transport::{channel, ChannelPickerWindow, MessageListener, PickerWindow, TransportError};
pub use types::{DownloadError, DownloadFailureKind, EngineEvent, FetchMetadata, FetchOutput};
