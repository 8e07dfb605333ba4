//! Metadata editor panel core
//!
//! PanelCore coordinates the floating metadata editor: panel visibility, the
//! binding to whichever document is currently front-most, and the ViewSelector
//! that decides which editor sub-view is mounted for the bound document's
//! selection.
//!
//! All operations run on the single UI context. Document notifications arrive
//! over the panel's mpsc channel and are applied by `pump_events`; unbinding
//! removes the registry subscription synchronously and drains the channel, so
//! no event for a no-longer-bound document can reach the view afterwards.

use std::sync::mpsc::{self, Receiver, Sender};

use super::documents::{DocumentEvent, DocumentId, DocumentRegistry, SubscriptionId};
use super::selection::{EditorViewKind, SelectionDescriptor};

/// Mount point for editor sub-views, implemented by the panel window
pub trait EditorMount: Send {
    fn mount(&mut self, kind: EditorViewKind, document: DocumentId);
    fn unmount(&mut self);
}

/// Chooses and mounts the editor sub-view for the current selection
pub struct ViewSelector {
    mounted: EditorViewKind,
    mount: Box<dyn EditorMount>,
}

impl ViewSelector {
    pub fn new(mount: Box<dyn EditorMount>) -> Self {
        Self {
            mounted: EditorViewKind::Empty,
            mount,
        }
    }

    pub fn mounted_kind(&self) -> EditorViewKind {
        self.mounted
    }

    /// Mount the view kind matching `descriptor`, unmounting the old one
    ///
    /// Idempotent: an unchanged target kind causes no mount/unmount cycle.
    pub fn refresh(&mut self, descriptor: Option<SelectionDescriptor>, document: DocumentId) {
        let target = EditorViewKind::for_selection(descriptor);
        if target == self.mounted {
            return;
        }
        if self.mounted != EditorViewKind::Empty {
            self.mount.unmount();
        }
        if target != EditorViewKind::Empty {
            self.mount.mount(target, document);
        }
        self.mounted = target;
    }

    /// Unmount whatever is mounted; used when the panel loses its document
    pub fn reset(&mut self) {
        if self.mounted != EditorViewKind::Empty {
            self.mount.unmount();
            self.mounted = EditorViewKind::Empty;
        }
    }
}

struct Binding {
    document: DocumentId,
    subscription: SubscriptionId,
}

/// Panel lifecycle and document-binding state machine
pub struct PanelCore {
    visible: bool,
    binding: Option<Binding>,
    view_selector: ViewSelector,
    events_tx: Sender<DocumentEvent>,
    events_rx: Receiver<DocumentEvent>,
}

impl PanelCore {
    pub fn new(mount: Box<dyn EditorMount>) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            visible: false,
            binding: None,
            view_selector: ViewSelector::new(mount),
            events_tx,
            events_rx,
        }
    }

    /// The document currently driving the panel, if any
    pub fn inspected_document(&self) -> Option<DocumentId> {
        self.binding.as_ref().map(|b| b.document)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn mounted_kind(&self) -> EditorViewKind {
        self.view_selector.mounted_kind()
    }

    /// Show the panel bound to the active document, or hide it
    ///
    /// With no active document a hidden panel stays hidden; toggling simply
    /// has no visible effect. Returns whether the panel is visible afterwards.
    pub fn toggle(&mut self, registry: &mut DocumentRegistry) -> bool {
        if self.visible {
            self.hide(registry);
        } else if let Some(id) = registry.active_document() {
            if self.bind(registry, id) {
                self.visible = true;
                log::debug!("Metadata editor shown, inspecting {}", id);
            }
        }
        self.visible
    }

    /// Unbind and hide; unbinding happens before the panel goes away
    pub fn hide(&mut self, registry: &mut DocumentRegistry) {
        self.unbind(registry);
        self.visible = false;
    }

    /// Re-evaluate the binding after the front-most document changed
    pub fn handle_active_document_changed(&mut self, registry: &mut DocumentRegistry) {
        if !self.visible {
            return;
        }
        match registry.active_document() {
            Some(id) if self.inspected_document() == Some(id) => {}
            Some(id) => {
                self.bind(registry, id);
            }
            None => self.unbind(registry),
        }
    }

    /// Apply queued document events; returns true if panel state changed
    pub fn pump_events(&mut self, registry: &mut DocumentRegistry) -> bool {
        let mut changed = false;
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                DocumentEvent::SelectionChanged {
                    document,
                    descriptor,
                } if self.inspected_document() == Some(document) => {
                    self.view_selector.refresh(Some(descriptor), document);
                    changed = true;
                }
                DocumentEvent::Closed { document }
                    if self.inspected_document() == Some(document) =>
                {
                    // Registry already dropped the subscription with the document
                    self.binding = None;
                    self.view_selector.reset();
                    changed = true;
                }
                // Stale event for a document no longer bound
                _ => {}
            }
        }
        changed
    }

    /// Bind to `id`, releasing any previous binding first
    ///
    /// A document without a selection capability to subscribe to is treated
    /// as "no document available": the panel ends up unbound, not in error.
    fn bind(&mut self, registry: &mut DocumentRegistry, id: DocumentId) -> bool {
        self.unbind(registry);
        let Some(subscription) = registry.subscribe(id, self.events_tx.clone()) else {
            return false;
        };
        self.binding = Some(Binding {
            document: id,
            subscription,
        });
        self.view_selector
            .refresh(registry.selection_descriptor(id), id);
        true
    }

    /// Synchronously remove the subscription and tear down the mounted view
    fn unbind(&mut self, registry: &mut DocumentRegistry) {
        if let Some(binding) = self.binding.take() {
            registry.unsubscribe(binding.subscription);
        }
        // Discard anything already queued for the old binding
        while self.events_rx.try_recv().is_ok() {}
        self.view_selector.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::documents::{TrackDocument, TrackInfo};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum MountCall {
        Mount(EditorViewKind),
        Unmount,
    }

    /// Records every mount/unmount so tests can assert on cycles
    #[derive(Clone, Default)]
    struct RecordingMount {
        calls: Arc<Mutex<Vec<MountCall>>>,
    }

    impl RecordingMount {
        fn calls(&self) -> Vec<MountCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl EditorMount for RecordingMount {
        fn mount(&mut self, kind: EditorViewKind, _document: DocumentId) {
            self.calls.lock().unwrap().push(MountCall::Mount(kind));
        }

        fn unmount(&mut self) {
            self.calls.lock().unwrap().push(MountCall::Unmount);
        }
    }

    fn panel() -> (PanelCore, RecordingMount) {
        let mount = RecordingMount::default();
        (PanelCore::new(Box::new(mount.clone())), mount)
    }

    fn track(codec: &str) -> TrackInfo {
        TrackInfo {
            path: PathBuf::from(format!("/music/track.{codec}")),
            title: None,
            artist: None,
            album: None,
            year: None,
            duration: 1.0,
            codec: codec.to_string(),
            is_lossy: true,
        }
    }

    fn open_document(registry: &mut DocumentRegistry, track_count: usize) -> DocumentId {
        let tracks = (0..track_count).map(|_| track("mp3")).collect();
        registry.open(TrackDocument::new("Album".to_string(), tracks))
    }

    #[test]
    fn test_toggle_without_active_document_is_a_noop() {
        let mut registry = DocumentRegistry::new();
        let (mut panel, mount) = panel();

        for _ in 0..3 {
            assert!(!panel.toggle(&mut registry));
            assert!(!panel.is_visible());
            assert_eq!(panel.inspected_document(), None);
        }
        assert!(mount.calls().is_empty());
    }

    #[test]
    fn test_toggle_with_empty_selection_shows_empty_view() {
        let mut registry = DocumentRegistry::new();
        let id = open_document(&mut registry, 4);
        let (mut panel, _mount) = panel();

        assert!(panel.toggle(&mut registry));
        assert!(panel.is_visible());
        assert_eq!(panel.inspected_document(), Some(id));
        assert_eq!(panel.mounted_kind(), EditorViewKind::Empty);
    }

    #[test]
    fn test_toggle_with_one_selected_track_mounts_single_editor() {
        let mut registry = DocumentRegistry::new();
        let id = open_document(&mut registry, 4);
        registry.set_selection(id, &[1]);
        let (mut panel, mount) = panel();

        panel.toggle(&mut registry);
        assert_eq!(panel.mounted_kind(), EditorViewKind::SingleTrackEditor);
        assert_eq!(
            mount.calls(),
            vec![MountCall::Mount(EditorViewKind::SingleTrackEditor)]
        );
    }

    #[test]
    fn test_toggle_with_three_selected_tracks_mounts_batch_editor() {
        let mut registry = DocumentRegistry::new();
        let id = open_document(&mut registry, 4);
        registry.set_selection(id, &[0, 1, 2]);
        let (mut panel, _mount) = panel();

        panel.toggle(&mut registry);
        assert_eq!(panel.mounted_kind(), EditorViewKind::MultiTrackBatchEditor);
    }

    #[test]
    fn test_refresh_is_idempotent_for_unchanged_descriptor() {
        let mut registry = DocumentRegistry::new();
        let id = open_document(&mut registry, 4);
        registry.set_selection(id, &[1]);
        let (mut panel, mount) = panel();
        panel.toggle(&mut registry);

        // Re-assert the same selection twice; kind stays put and the mount
        // sees no second cycle.
        registry.set_selection(id, &[1]);
        registry.set_selection(id, &[1]);
        panel.pump_events(&mut registry);

        assert_eq!(panel.mounted_kind(), EditorViewKind::SingleTrackEditor);
        assert_eq!(
            mount.calls(),
            vec![MountCall::Mount(EditorViewKind::SingleTrackEditor)]
        );
    }

    #[test]
    fn test_selection_change_remounts_view() {
        let mut registry = DocumentRegistry::new();
        let id = open_document(&mut registry, 4);
        registry.set_selection(id, &[1]);
        let (mut panel, mount) = panel();
        panel.toggle(&mut registry);

        registry.set_selection(id, &[0, 1, 2]);
        assert!(panel.pump_events(&mut registry));
        assert_eq!(panel.mounted_kind(), EditorViewKind::MultiTrackBatchEditor);

        registry.set_selection(id, &[]);
        assert!(panel.pump_events(&mut registry));
        assert_eq!(panel.mounted_kind(), EditorViewKind::Empty);

        assert_eq!(
            mount.calls(),
            vec![
                MountCall::Mount(EditorViewKind::SingleTrackEditor),
                MountCall::Unmount,
                MountCall::Mount(EditorViewKind::MultiTrackBatchEditor),
                MountCall::Unmount,
            ]
        );
    }

    #[test]
    fn test_closing_bound_document_unbinds_panel() {
        let mut registry = DocumentRegistry::new();
        let id = open_document(&mut registry, 2);
        registry.set_selection(id, &[0]);
        let (mut panel, mount) = panel();
        panel.toggle(&mut registry);

        registry.close(id);
        assert!(panel.pump_events(&mut registry));

        assert_eq!(panel.inspected_document(), None);
        assert_eq!(panel.mounted_kind(), EditorViewKind::Empty);
        // Still visible, just showing nothing actionable
        assert!(panel.is_visible());

        let calls_after_close = mount.calls();
        assert!(!panel.pump_events(&mut registry));
        assert_eq!(mount.calls(), calls_after_close);
    }

    #[test]
    fn test_hide_unsubscribes_before_hiding() {
        let mut registry = DocumentRegistry::new();
        let id = open_document(&mut registry, 2);
        registry.set_selection(id, &[0]);
        let (mut panel, mount) = panel();
        panel.toggle(&mut registry);

        // Hide, then fire selection changes on the old document
        assert!(!panel.toggle(&mut registry));
        assert_eq!(panel.inspected_document(), None);
        let calls_after_hide = mount.calls();

        registry.set_selection(id, &[0, 1]);
        assert!(!panel.pump_events(&mut registry));
        assert_eq!(mount.calls(), calls_after_hide);
    }

    #[test]
    fn test_active_document_switch_rebinds() {
        let mut registry = DocumentRegistry::new();
        let first = open_document(&mut registry, 3);
        registry.set_selection(first, &[0]);
        let (mut panel, mount) = panel();
        panel.toggle(&mut registry);
        assert_eq!(panel.inspected_document(), Some(first));

        let second = open_document(&mut registry, 3);
        registry.set_selection(second, &[0, 1]);
        panel.handle_active_document_changed(&mut registry);

        assert_eq!(panel.inspected_document(), Some(second));
        assert_eq!(panel.mounted_kind(), EditorViewKind::MultiTrackBatchEditor);

        // The old document's subscription is gone: its changes no longer
        // reach the panel.
        let calls_after_switch = mount.calls();
        registry.set_selection(first, &[0, 1, 2]);
        assert!(!panel.pump_events(&mut registry));
        assert_eq!(mount.calls(), calls_after_switch);
    }

    #[test]
    fn test_active_switch_while_hidden_does_nothing() {
        let mut registry = DocumentRegistry::new();
        open_document(&mut registry, 1);
        let (mut panel, mount) = panel();

        panel.handle_active_document_changed(&mut registry);
        assert!(!panel.is_visible());
        assert_eq!(panel.inspected_document(), None);
        assert!(mount.calls().is_empty());
    }

    #[test]
    fn test_second_toggle_hides_and_unbinds() {
        let mut registry = DocumentRegistry::new();
        let id = open_document(&mut registry, 1);
        registry.set_selection(id, &[0]);
        let (mut panel, _mount) = panel();

        assert!(panel.toggle(&mut registry));
        assert!(!panel.toggle(&mut registry));
        assert!(!panel.is_visible());
        assert_eq!(panel.inspected_document(), None);
        assert_eq!(panel.mounted_kind(), EditorViewKind::Empty);

        // Toggling again rebinds to the still-active document
        assert!(panel.toggle(&mut registry));
        assert_eq!(panel.inspected_document(), Some(id));
        assert_eq!(panel.mounted_kind(), EditorViewKind::SingleTrackEditor);
    }

    #[test]
    fn test_view_selector_reset_unmounts_once() {
        let mount = RecordingMount::default();
        let mut selector = ViewSelector::new(Box::new(mount.clone()));
        let mut registry = DocumentRegistry::new();
        let id = open_document(&mut registry, 1);

        selector.refresh(
            Some(SelectionDescriptor {
                count: 1,
                homogeneous: true,
            }),
            id,
        );
        selector.reset();
        selector.reset();

        assert_eq!(
            mount.calls(),
            vec![
                MountCall::Mount(EditorViewKind::SingleTrackEditor),
                MountCall::Unmount,
            ]
        );
        assert_eq!(selector.mounted_kind(), EditorViewKind::Empty);
    }
}
