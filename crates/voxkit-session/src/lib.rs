//! Voice-synthesis session core for VoxKit
//!
//! This crate orchestrates the path from a (text, settings) pair to a
//! tracked, playable artifact: abstract voice identities and their
//! resolution against runtime engine voices, the single-flight generation
//! flow, a bounded history owning artifact resources, and a playback
//! controller mirroring an injected audio primitive.

pub mod artifact;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod generation;
pub mod history;
pub mod playback;
pub mod resolver;
pub mod session;
pub mod settings;

pub use artifact::Artifact;
pub use catalog::{VoiceCatalog, VoiceIdentity};
pub use config::Settings;
pub use error::{SessionError, SessionResult};
pub use events::SessionEvent;
pub use generation::{GenerationConfig, GenerationOrchestrator};
pub use history::{HistoryStore, DEFAULT_HISTORY_CAPACITY};
pub use playback::{PlaybackController, PlaybackState, PlaybackStatus};
pub use session::{DownloadRequest, Session, SessionOptions};
pub use settings::VoiceSettings;
