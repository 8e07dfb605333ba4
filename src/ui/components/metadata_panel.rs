//! Metadata Editor Panel
//!
//! The floating editor window for the tracks selected in the front-most
//! document. The panel state machine itself lives in `core::PanelCore`; this
//! module owns the window, implements the editor mount point, and renders
//! whichever sub-view is currently mounted:
//! - Empty: nothing actionable
//! - SingleTrackEditor: title/artist/album/year of one track
//! - MultiTrackBatchEditor: artist/album/year applied to every selected track

use gpui::{
    App, Bounds, Context, FocusHandle, Global, KeyDownEvent, Render, SharedString, Window,
    WindowBounds, WindowHandle, WindowOptions, div, prelude::*, px, size,
};
use std::sync::{Arc, Mutex};

use crate::audio::{TagFields, write_track_tags};
use crate::core::{
    AppSettings, DocumentId, DocumentRegistry, EditorMount, EditorViewKind, PanelCore,
    format_duration,
};
use crate::ui::Theme;

/// What the view selector currently has mounted in the panel
#[derive(Debug, Clone, Copy, Default)]
pub struct MountedEditor {
    pub kind: EditorViewKind,
    pub document: Option<DocumentId>,
}

/// Editor mount point backed by shared state the panel window renders from
struct PanelMount {
    mounted: Arc<Mutex<MountedEditor>>,
}

impl EditorMount for PanelMount {
    fn mount(&mut self, kind: EditorViewKind, document: DocumentId) {
        *self.mounted.lock().unwrap() = MountedEditor {
            kind,
            document: Some(document),
        };
    }

    fn unmount(&mut self) {
        *self.mounted.lock().unwrap() = MountedEditor::default();
    }
}

/// App-level owner of the panel: the core state machine, the mount state,
/// the document registry, and the window handle once the panel has been
/// opened for the first time.
pub struct MetadataPanelController {
    registry: Arc<Mutex<DocumentRegistry>>,
    core: Arc<Mutex<PanelCore>>,
    mounted: Arc<Mutex<MountedEditor>>,
    window: Option<WindowHandle<MetadataPanel>>,
}

impl Global for MetadataPanelController {}

impl MetadataPanelController {
    pub fn new() -> Self {
        let mounted = Arc::new(Mutex::new(MountedEditor::default()));
        let core = PanelCore::new(Box::new(PanelMount {
            mounted: mounted.clone(),
        }));
        Self {
            registry: Arc::new(Mutex::new(DocumentRegistry::new())),
            core: Arc::new(Mutex::new(core)),
            mounted,
            window: None,
        }
    }

    pub fn registry(&self) -> Arc<Mutex<DocumentRegistry>> {
        self.registry.clone()
    }

    pub fn core(&self) -> Arc<Mutex<PanelCore>> {
        self.core.clone()
    }

    /// Toggle the metadata editor panel (menu item / cmd-i)
    ///
    /// With no active document this is a silent no-op. The window itself is
    /// created lazily on the first successful toggle and re-opened if the
    /// user closed it directly.
    pub fn toggle(cx: &mut App) {
        let (registry, core, mounted, window) = {
            let controller = cx.global::<Self>();
            (
                controller.registry.clone(),
                controller.core.clone(),
                controller.mounted.clone(),
                controller.window,
            )
        };

        let visible = {
            let mut registry = registry.lock().unwrap();
            core.lock().unwrap().toggle(&mut registry)
        };

        if visible {
            // Reuse the existing window unless the user closed it
            let reopen = match window {
                Some(handle) => handle
                    .update(cx, |_, window, _| window.activate_window())
                    .is_err(),
                None => true,
            };
            if reopen {
                let handle = MetadataPanel::open(cx, registry, core, mounted);
                cx.global_mut::<Self>().window = Some(handle);
            }
        } else if let Some(handle) = window {
            let _ = handle.update(cx, |_, window, _| window.remove_window());
            cx.global_mut::<Self>().window = None;
        }
    }

    /// Rebind a visible panel after the front-most document changed
    pub fn active_document_changed(registry: &Arc<Mutex<DocumentRegistry>>, core: &Arc<Mutex<PanelCore>>) {
        let mut registry = registry.lock().unwrap();
        core.lock().unwrap().handle_active_document_changed(&mut registry);
    }
}

impl Default for MetadataPanelController {
    fn default() -> Self {
        Self::new()
    }
}

/// Fields of the editor sub-view currently accepting input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditorField {
    Title,
    Artist,
    Album,
    Year,
}

impl EditorField {
    fn label(&self) -> &'static str {
        match self {
            EditorField::Title => "Title",
            EditorField::Artist => "Artist",
            EditorField::Album => "Album",
            EditorField::Year => "Year",
        }
    }
}

/// Text buffers backing the editor fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FieldBuffers {
    title: String,
    artist: String,
    album: String,
    year: String,
}

impl FieldBuffers {
    fn get_mut(&mut self, field: EditorField) -> &mut String {
        match field {
            EditorField::Title => &mut self.title,
            EditorField::Artist => &mut self.artist,
            EditorField::Album => &mut self.album,
            EditorField::Year => &mut self.year,
        }
    }

    fn get(&self, field: EditorField) -> &str {
        match field {
            EditorField::Title => &self.title,
            EditorField::Artist => &self.artist,
            EditorField::Album => &self.album,
            EditorField::Year => &self.year,
        }
    }
}

/// Snapshot of the panel state the buffers were last loaded from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct PanelSnapshot {
    document: Option<DocumentId>,
    kind: EditorViewKind,
    selected: Vec<usize>,
}

/// The metadata editor panel window
pub struct MetadataPanel {
    registry: Arc<Mutex<DocumentRegistry>>,
    core: Arc<Mutex<PanelCore>>,
    mounted: Arc<Mutex<MountedEditor>>,
    buffers: FieldBuffers,
    focused_field: Option<EditorField>,
    focus_handle: FocusHandle,
    last_state: PanelSnapshot,
    status: Option<String>,
}

impl MetadataPanel {
    fn new(
        cx: &mut Context<Self>,
        registry: Arc<Mutex<DocumentRegistry>>,
        core: Arc<Mutex<PanelCore>>,
        mounted: Arc<Mutex<MountedEditor>>,
    ) -> Self {
        Self {
            registry,
            core,
            mounted,
            buffers: FieldBuffers::default(),
            focused_field: None,
            focus_handle: cx.focus_handle(),
            last_state: PanelSnapshot::default(),
            status: None,
        }
    }

    /// Open the panel window
    pub fn open(
        cx: &mut App,
        registry: Arc<Mutex<DocumentRegistry>>,
        core: Arc<Mutex<PanelCore>>,
        mounted: Arc<Mutex<MountedEditor>>,
    ) -> WindowHandle<Self> {
        let bounds = Bounds::centered(None, size(px(360.), px(420.)), cx);

        cx.open_window(
            WindowOptions {
                window_bounds: Some(WindowBounds::Windowed(bounds)),
                window_min_size: Some(size(px(320.), px(320.))),
                titlebar: Some(gpui::TitlebarOptions {
                    title: Some("Metadata Editor".into()),
                    appears_transparent: false,
                    traffic_light_position: None,
                }),
                ..Default::default()
            },
            |_window, cx| {
                cx.new(|cx| {
                    let panel = MetadataPanel::new(cx, registry, core, mounted);
                    Self::start_event_polling(cx);
                    panel
                })
            },
        )
        .unwrap()
    }

    /// Drain document events and refresh the panel on the UI context
    ///
    /// Same shape as the background polling loops elsewhere in the app: a
    /// detached task that ticks until the panel entity is dropped.
    fn start_event_polling(cx: &mut Context<Self>) {
        use gpui::{AsyncApp, Timer, WeakEntity};
        use std::time::Duration;

        cx.spawn(|this: WeakEntity<Self>, cx: &mut AsyncApp| {
            let mut async_cx = cx.clone();
            async move {
                loop {
                    Timer::after(Duration::from_millis(50)).await;

                    let alive = this
                        .update(&mut async_cx, |this, cx| {
                            let pumped = {
                                let mut registry = this.registry.lock().unwrap();
                                let mut core = this.core.lock().unwrap();
                                core.pump_events(&mut registry)
                            };
                            let refreshed = this.refresh_from_state();
                            if pumped || refreshed {
                                cx.notify();
                            }
                        })
                        .is_ok();

                    if !alive {
                        break;
                    }
                }
            }
        })
        .detach();
    }

    /// Reload field buffers when the binding, mounted view, or selection changed
    fn refresh_from_state(&mut self) -> bool {
        let kind = self.mounted.lock().unwrap().kind;
        let (document, selected) = {
            let registry = self.registry.lock().unwrap();
            let document = self.core.lock().unwrap().inspected_document();
            let selected = document
                .and_then(|id| registry.get(id).map(|d| d.selected_indices()))
                .unwrap_or_default();
            (document, selected)
        };
        let snapshot = PanelSnapshot {
            document,
            kind,
            selected,
        };

        if snapshot == self.last_state {
            return false;
        }

        self.load_buffers(&snapshot);
        self.focused_field = None;
        self.status = None;
        self.last_state = snapshot;
        true
    }

    fn load_buffers(&mut self, snapshot: &PanelSnapshot) {
        self.buffers = FieldBuffers::default();
        let Some(id) = snapshot.document else {
            return;
        };
        let registry = self.registry.lock().unwrap();
        let Some(document) = registry.get(id) else {
            return;
        };
        let tracks = document.selected_tracks();

        match snapshot.kind {
            EditorViewKind::SingleTrackEditor => {
                if let Some(track) = tracks.first() {
                    self.buffers.title = track.title.clone().unwrap_or_default();
                    self.buffers.artist = track.artist.clone().unwrap_or_default();
                    self.buffers.album = track.album.clone().unwrap_or_default();
                    self.buffers.year = track.year.clone().unwrap_or_default();
                }
            }
            EditorViewKind::MultiTrackBatchEditor => {
                // Preload only values every selected track agrees on
                self.buffers.artist = common_value(tracks.iter().map(|t| t.artist.as_deref()));
                self.buffers.album = common_value(tracks.iter().map(|t| t.album.as_deref()));
                self.buffers.year = common_value(tracks.iter().map(|t| t.year.as_deref()));
            }
            EditorViewKind::Empty => {}
        }
    }

    /// Fields shown for the mounted view kind
    fn visible_fields(&self) -> &'static [EditorField] {
        match self.last_state.kind {
            EditorViewKind::SingleTrackEditor => &[
                EditorField::Title,
                EditorField::Artist,
                EditorField::Album,
                EditorField::Year,
            ],
            EditorViewKind::MultiTrackBatchEditor => {
                &[EditorField::Artist, EditorField::Album, EditorField::Year]
            }
            EditorViewKind::Empty => &[],
        }
    }

    fn focus_next_field(&mut self) {
        let fields = self.visible_fields();
        if fields.is_empty() {
            return;
        }
        let next = match self.focused_field {
            Some(current) => {
                let pos = fields.iter().position(|f| *f == current).unwrap_or(0);
                fields[(pos + 1) % fields.len()]
            }
            None => fields[0],
        };
        self.focused_field = Some(next);
    }

    /// Handle key press for field editing
    fn handle_key(&mut self, event: &KeyDownEvent, cx: &mut Context<Self>) -> bool {
        let keystroke = &event.keystroke;

        if keystroke.key == "escape" {
            if self.focused_field.is_some() {
                self.focused_field = None;
                cx.notify();
                return true;
            }
            return false;
        }

        if keystroke.key == "tab" {
            self.focus_next_field();
            cx.notify();
            return true;
        }

        if keystroke.key == "enter" {
            if self.focused_field.take().is_some() {
                self.save(cx);
                cx.notify();
                return true;
            }
            return false;
        }

        let Some(field) = self.focused_field else {
            return false;
        };

        if keystroke.key == "backspace" {
            self.buffers.get_mut(field).pop();
            cx.notify();
            return true;
        }

        if let Some(ref key_char) = keystroke.key_char {
            let buffer = self.buffers.get_mut(field);
            for c in key_char.chars() {
                if !c.is_control() {
                    buffer.push(c);
                }
            }
            cx.notify();
            return true;
        }

        false
    }

    /// Write the edited fields back to the selected track files
    fn save(&mut self, cx: &mut Context<Self>) {
        let Some(id) = self.last_state.document else {
            return;
        };
        let kind = self.last_state.kind;
        let fields = match kind {
            EditorViewKind::SingleTrackEditor => TagFields {
                title: non_empty(&self.buffers.title),
                artist: non_empty(&self.buffers.artist),
                album: non_empty(&self.buffers.album),
                year: non_empty(&self.buffers.year),
            },
            EditorViewKind::MultiTrackBatchEditor => TagFields {
                title: None,
                artist: non_empty(&self.buffers.artist),
                album: non_empty(&self.buffers.album),
                year: non_empty(&self.buffers.year),
            },
            EditorViewKind::Empty => return,
        };

        if fields.is_empty() {
            self.status = Some("Nothing to save".to_string());
            cx.notify();
            return;
        }

        let mut registry = self.registry.lock().unwrap();
        let Some(document) = registry.get_mut(id) else {
            self.status = Some("Document is gone".to_string());
            cx.notify();
            return;
        };

        let indices = document.selected_indices();
        let mut saved = 0;
        let mut failed = 0;
        for index in indices {
            let Some(track) = document.tracks.get_mut(index) else {
                continue;
            };
            match write_track_tags(&track.path, &fields) {
                Ok(()) => {
                    if let Some(title) = &fields.title {
                        track.title = Some(title.clone());
                    }
                    if let Some(artist) = &fields.artist {
                        track.artist = Some(artist.clone());
                    }
                    if let Some(album) = &fields.album {
                        track.album = Some(album.clone());
                    }
                    if let Some(year) = &fields.year {
                        track.year = Some(year.clone());
                    }
                    saved += 1;
                }
                Err(e) => {
                    log::error!("Failed to write tags to {:?}: {}", track.path, e);
                    failed += 1;
                }
            }
        }

        self.status = Some(if failed == 0 {
            if saved == 1 {
                "Saved".to_string()
            } else {
                format!("Saved {} tracks", saved)
            }
        } else {
            format!("Saved {}, failed {}", saved, failed)
        });
        cx.notify();
    }

    fn render_field_row(
        &self,
        field: EditorField,
        theme: &Theme,
        cx: &mut Context<Self>,
    ) -> impl IntoElement {
        let focused = self.focused_field == Some(field);
        let value = self.buffers.get(field).to_string();
        let is_placeholder = value.is_empty();

        div()
            .w_full()
            .flex()
            .flex_col()
            .gap_1()
            .child(
                div()
                    .text_xs()
                    .text_color(theme.text_muted)
                    .child(field.label()),
            )
            .child(
                div()
                    .id(SharedString::from(format!("field-{}", field.label())))
                    .w_full()
                    .h_8()
                    .px_3()
                    .flex()
                    .items_center()
                    .bg(theme.bg_card)
                    .border_1()
                    .border_color(if focused { theme.accent } else { theme.border })
                    .rounded_md()
                    .cursor_pointer()
                    .on_click(cx.listener(move |this, _, _window, cx| {
                        this.focused_field = Some(field);
                        cx.notify();
                    }))
                    .child(
                        div()
                            .text_sm()
                            .text_color(if is_placeholder {
                                theme.text_muted
                            } else {
                                theme.text
                            })
                            .overflow_hidden()
                            .text_ellipsis()
                            .child(if is_placeholder {
                                "—".to_string()
                            } else {
                                value
                            }),
                    )
                    .when(focused, |el| {
                        el.child(div().w(px(2.)).h(px(14.)).bg(theme.accent).ml_px())
                    }),
            )
    }

    fn render_editor_body(&self, theme: &Theme, cx: &mut Context<Self>) -> gpui::AnyElement {
        let kind = self.last_state.kind;
        if kind == EditorViewKind::Empty {
            let message = if self.last_state.document.is_some() {
                "Select tracks to edit their metadata"
            } else {
                "No document"
            };
            return div()
                .flex_1()
                .flex()
                .items_center()
                .justify_center()
                .child(
                    div()
                        .text_sm()
                        .text_color(theme.text_muted)
                        .child(message),
                )
                .into_any_element();
        }

        let mut body = div().flex_1().w_full().p_4().flex().flex_col().gap_3();

        if kind == EditorViewKind::MultiTrackBatchEditor {
            body = body.child(
                div()
                    .text_xs()
                    .text_color(theme.text_muted)
                    .child(format!("Editing {} tracks", self.last_state.selected.len())),
            );
        }

        for field in self.visible_fields() {
            body = body.child(self.render_field_row(*field, theme, cx));
        }

        // Technical row for the single-track editor
        if kind == EditorViewKind::SingleTrackEditor
            && cx.global::<AppSettings>().show_technical_fields
        {
            if let Some(info) = self.selected_track_summary() {
                body = body.child(
                    div()
                        .text_xs()
                        .text_color(theme.text_muted)
                        .child(info),
                );
            }
        }

        body.into_any_element()
    }

    fn selected_track_summary(&self) -> Option<String> {
        let id = self.last_state.document?;
        let index = *self.last_state.selected.first()?;
        let registry = self.registry.lock().unwrap();
        let track = registry.get(id)?.tracks.get(index)?.clone();
        Some(format!(
            "{} · {}",
            track.codec.to_uppercase(),
            format_duration(track.duration)
        ))
    }

    fn inspected_title(&self) -> Option<String> {
        let id = self.last_state.document?;
        let registry = self.registry.lock().unwrap();
        registry.get(id).map(|d| d.title.clone())
    }
}

impl Drop for MetadataPanel {
    fn drop(&mut self) {
        // The window can be closed directly; make sure the core unbinds
        // before the view goes away.
        let mut registry = self.registry.lock().unwrap();
        let mut core = self.core.lock().unwrap();
        if core.is_visible() {
            core.hide(&mut registry);
        }
    }
}

impl Render for MetadataPanel {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = Theme::from_appearance(window.appearance());
        let kind = self.last_state.kind;
        let status = self.status.clone();
        let document_title = self.inspected_title();

        if !self.focus_handle.is_focused(window) {
            self.focus_handle.focus(window);
        }

        div()
            .key_context("MetadataPanel")
            .track_focus(&self.focus_handle)
            .on_key_down(cx.listener(|this, event: &KeyDownEvent, _window, cx| {
                this.handle_key(event, cx);
            }))
            .size_full()
            .flex()
            .flex_col()
            .bg(theme.bg)
            // Header
            .child(
                div()
                    .w_full()
                    .px_4()
                    .py_3()
                    .flex()
                    .items_center()
                    .justify_between()
                    .border_b_1()
                    .border_color(theme.border)
                    .child(
                        div()
                            .text_sm()
                            .font_weight(gpui::FontWeight::SEMIBOLD)
                            .text_color(theme.text)
                            .child(kind.display_text()),
                    )
                    .when_some(document_title, |el, title| {
                        el.child(
                            div()
                                .text_xs()
                                .text_color(theme.text_muted)
                                .overflow_hidden()
                                .text_ellipsis()
                                .child(title),
                        )
                    }),
            )
            // Editor body
            .child(self.render_editor_body(&theme, cx))
            // Footer
            .when(kind != EditorViewKind::Empty, |el| {
                el.child(
                    div()
                        .w_full()
                        .p_4()
                        .flex()
                        .items_center()
                        .justify_between()
                        .border_t_1()
                        .border_color(theme.border)
                        .child(
                            div()
                                .text_xs()
                                .text_color(theme.text_muted)
                                .child(status.unwrap_or_default()),
                        )
                        .child(
                            div()
                                .id(SharedString::from("save-btn"))
                                .px_4()
                                .py_2()
                                .text_sm()
                                .text_color(gpui::white())
                                .bg(theme.success)
                                .rounded_md()
                                .cursor_pointer()
                                .hover(|s| s.bg(theme.success_hover))
                                .on_click(cx.listener(|this, _, _window, cx| {
                                    this.save(cx);
                                }))
                                .child("Save"),
                        ),
                )
            })
    }
}

/// The value shared by all tracks, or empty when they disagree
fn common_value<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut common: Option<&str> = None;
    for value in values {
        match (common, value) {
            (None, Some(v)) => common = Some(v),
            (Some(c), Some(v)) if c == v => {}
            _ => return String::new(),
        }
    }
    common.unwrap_or_default().to_string()
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_value_agreement() {
        assert_eq!(
            common_value([Some("Artist"), Some("Artist")]),
            "Artist".to_string()
        );
    }

    #[test]
    fn test_common_value_disagreement_is_empty() {
        assert_eq!(common_value([Some("A"), Some("B")]), String::new());
        assert_eq!(common_value([Some("A"), None]), String::new());
    }

    #[test]
    fn test_common_value_empty_input() {
        assert_eq!(
            common_value(std::iter::empty::<Option<&str>>()),
            String::new()
        );
    }

    #[test]
    fn test_non_empty_trims() {
        assert_eq!(non_empty("  "), None);
        assert_eq!(non_empty(" x "), Some("x".to_string()));
    }

    #[test]
    fn test_field_buffers_access() {
        let mut buffers = FieldBuffers::default();
        buffers.get_mut(EditorField::Album).push_str("Blue");
        assert_eq!(buffers.get(EditorField::Album), "Blue");
        assert_eq!(buffers.get(EditorField::Title), "");
    }
}
