//! Track documents and the owning document registry
//!
//! Every opened folder becomes a TrackDocument owned by the DocumentRegistry.
//! Other components never hold references into the registry; they hold a
//! DocumentId and look the document up on each access, so a closed document
//! can never be dereferenced through a stale handle.
//!
//! Selection-change and close notifications are delivered as values over
//! per-subscription mpsc channels. Unsubscribing drops the sender side
//! synchronously, so no event for a dropped subscription is ever observed
//! after `unsubscribe` returns.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::mpsc::Sender;

use super::selection::SelectionDescriptor;

/// A single audio track inside a document
#[derive(Debug, Clone)]
pub struct TrackInfo {
    pub path: PathBuf,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<String>,
    /// Duration in seconds
    pub duration: f64,
    pub codec: String,
    pub is_lossy: bool,
}

impl TrackInfo {
    /// Display name: tag title, or the file stem as a fallback
    pub fn display_name(&self) -> String {
        if let Some(title) = &self.title {
            if !title.is_empty() {
                return title.clone();
            }
        }
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// Stable handle for a document owned by the registry
///
/// Ids are allocated from a monotonic counter and never reused, so a handle
/// to a closed document simply fails the registry lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(u64);

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "doc-{}", self.0)
    }
}

/// Handle for a selection-change subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Notifications delivered to document subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// The document's track selection changed
    SelectionChanged {
        document: DocumentId,
        descriptor: SelectionDescriptor,
    },
    /// The document was closed; the id is now invalid
    Closed { document: DocumentId },
}

/// One opened music folder and its track selection
#[derive(Debug, Clone)]
pub struct TrackDocument {
    pub title: String,
    pub tracks: Vec<TrackInfo>,
    selected: BTreeSet<usize>,
}

impl TrackDocument {
    pub fn new(title: String, tracks: Vec<TrackInfo>) -> Self {
        Self {
            title,
            tracks,
            selected: BTreeSet::new(),
        }
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn selected_tracks(&self) -> Vec<&TrackInfo> {
        self.selected
            .iter()
            .filter_map(|&i| self.tracks.get(i))
            .collect()
    }

    /// Summary of the current selection for the editor panel
    pub fn selection_descriptor(&self) -> SelectionDescriptor {
        SelectionDescriptor::from_codecs(
            self.selected
                .iter()
                .filter_map(|&i| self.tracks.get(i))
                .map(|t| t.codec.as_str()),
        )
    }

    fn set_selection(&mut self, indices: &[usize]) {
        self.selected = indices
            .iter()
            .copied()
            .filter(|&i| i < self.tracks.len())
            .collect();
    }
}

struct Subscriber {
    id: SubscriptionId,
    document: DocumentId,
    sender: Sender<DocumentEvent>,
}

/// Owns every open TrackDocument and tracks which one is front-most
#[derive(Default)]
pub struct DocumentRegistry {
    documents: HashMap<DocumentId, TrackDocument>,
    subscribers: Vec<Subscriber>,
    active: Option<DocumentId>,
    next_document: u64,
    next_subscription: u64,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new document and make it the active one
    pub fn open(&mut self, document: TrackDocument) -> DocumentId {
        self.next_document += 1;
        let id = DocumentId(self.next_document);
        log::debug!("Opened {} ({})", id, document.title);
        self.documents.insert(id, document);
        self.active = Some(id);
        id
    }

    /// Close a document: notify its subscribers, then drop them and it
    pub fn close(&mut self, id: DocumentId) {
        if self.documents.remove(&id).is_none() {
            return;
        }
        log::debug!("Closed {}", id);
        for sub in self.subscribers.iter().filter(|s| s.document == id) {
            let _ = sub.sender.send(DocumentEvent::Closed { document: id });
        }
        self.subscribers.retain(|s| s.document != id);
        if self.active == Some(id) {
            self.active = None;
        }
    }

    /// Mark a document as front-most; unknown ids are ignored
    pub fn activate(&mut self, id: DocumentId) {
        if self.documents.contains_key(&id) {
            self.active = Some(id);
        }
    }

    pub fn active_document(&self) -> Option<DocumentId> {
        self.active
    }

    pub fn contains(&self, id: DocumentId) -> bool {
        self.documents.contains_key(&id)
    }

    pub fn get(&self, id: DocumentId) -> Option<&TrackDocument> {
        self.documents.get(&id)
    }

    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut TrackDocument> {
        self.documents.get_mut(&id)
    }

    /// Selection descriptor of a document, or None if it no longer exists
    pub fn selection_descriptor(&self, id: DocumentId) -> Option<SelectionDescriptor> {
        self.documents.get(&id).map(|d| d.selection_descriptor())
    }

    /// Replace a document's selection and notify its subscribers
    pub fn set_selection(&mut self, id: DocumentId, indices: &[usize]) {
        let Some(document) = self.documents.get_mut(&id) else {
            return;
        };
        document.set_selection(indices);
        let descriptor = document.selection_descriptor();
        for sub in self.subscribers.iter().filter(|s| s.document == id) {
            let _ = sub.sender.send(DocumentEvent::SelectionChanged {
                document: id,
                descriptor,
            });
        }
    }

    /// Subscribe to a document's events
    ///
    /// Returns None when the document does not exist (no track-selection
    /// capability to observe).
    pub fn subscribe(
        &mut self,
        id: DocumentId,
        sender: Sender<DocumentEvent>,
    ) -> Option<SubscriptionId> {
        if !self.documents.contains_key(&id) {
            return None;
        }
        self.next_subscription += 1;
        let sub_id = SubscriptionId(self.next_subscription);
        self.subscribers.push(Subscriber {
            id: sub_id,
            document: id,
            sender,
        });
        Some(sub_id)
    }

    /// Remove a subscription; no events for it are delivered afterwards
    pub fn unsubscribe(&mut self, sub_id: SubscriptionId) {
        self.subscribers.retain(|s| s.id != sub_id);
    }
}
