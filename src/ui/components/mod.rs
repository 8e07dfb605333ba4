//! Reusable UI components

mod about;
mod metadata_panel;
mod track_list;

pub use about::AboutBox;
pub use metadata_panel::{MetadataPanel, MetadataPanelController};
pub use track_list::TrackListView;
