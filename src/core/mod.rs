//! Core application logic and state
//!
//! This module contains:
//! - Application-wide settings
//! - The document registry that owns every open track document
//! - Selection descriptors and editor view kinds
//! - Folder scanning into track documents
//! - The metadata editor panel state machine

mod documents;
mod panel;
mod scanning;
mod selection;
mod state;

pub use documents::{
    DocumentEvent, DocumentId, DocumentRegistry, SubscriptionId, TrackDocument, TrackInfo,
};
pub use panel::{EditorMount, PanelCore, ViewSelector};
pub use scanning::scan_music_folder;
pub use selection::{EditorViewKind, SelectionDescriptor};
pub use state::AppSettings;

/// Format a duration in seconds as m:ss
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
