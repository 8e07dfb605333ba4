//! Selection descriptors and editor view kinds
//!
//! A selection descriptor is a small summary of which tracks are currently
//! selected in a document: how many, and whether they all share one codec.
//! The editor view kind shown in the metadata panel is a pure function of it.

use serde::{Deserialize, Serialize};

/// Summary of a document's current track selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionDescriptor {
    /// Number of selected tracks
    pub count: usize,
    /// Whether all selected tracks share the same codec
    pub homogeneous: bool,
}

impl SelectionDescriptor {
    pub fn empty() -> Self {
        Self {
            count: 0,
            homogeneous: true,
        }
    }

    /// Build a descriptor from the codecs of the selected tracks
    pub fn from_codecs<'a, I>(codecs: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut count = 0;
        let mut first: Option<&str> = None;
        let mut homogeneous = true;

        for codec in codecs {
            count += 1;
            match first {
                None => first = Some(codec),
                Some(f) if f != codec => homogeneous = false,
                Some(_) => {}
            }
        }

        Self { count, homogeneous }
    }
}

/// Identity of the sub-view mounted in the panel's content region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorViewKind {
    /// Nothing actionable - no tracks selected or no descriptor available
    #[default]
    Empty,
    /// Field editor for exactly one track
    SingleTrackEditor,
    /// Batch editor applying fields to several tracks at once
    MultiTrackBatchEditor,
}

impl EditorViewKind {
    /// Target view kind for a selection descriptor
    ///
    /// A missing descriptor (document gone, selection unavailable) resolves
    /// to Empty rather than an error.
    pub fn for_selection(descriptor: Option<SelectionDescriptor>) -> Self {
        match descriptor {
            None => EditorViewKind::Empty,
            Some(d) if d.count == 0 => EditorViewKind::Empty,
            Some(d) if d.count == 1 => EditorViewKind::SingleTrackEditor,
            Some(_) => EditorViewKind::MultiTrackBatchEditor,
        }
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            EditorViewKind::Empty => "No Selection",
            EditorViewKind::SingleTrackEditor => "Edit Track",
            EditorViewKind::MultiTrackBatchEditor => "Edit Multiple Tracks",
        }
    }
}
