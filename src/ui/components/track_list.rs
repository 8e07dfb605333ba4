//! Track List Window
//!
//! One window per opened music folder (a "document"). Shows the folder's
//! tracks and owns their selection: click selects a single track, cmd-click
//! extends the selection. Selection changes and window activation are routed
//! through the document registry so the metadata editor panel can follow.

use gpui::{
    App, Bounds, Context, IntoElement, MouseButton, MouseDownEvent, Render, SharedString, Window,
    WindowBounds, WindowHandle, WindowOptions, div, prelude::*, px, size,
};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use crate::core::{DocumentId, DocumentRegistry, PanelCore, TrackInfo, format_duration};
use crate::ui::Theme;
use crate::ui::components::MetadataPanelController;

/// A document window listing the tracks of one music folder
pub struct TrackListView {
    document_id: DocumentId,
    registry: Arc<Mutex<DocumentRegistry>>,
    panel_core: Arc<Mutex<PanelCore>>,
    appearance_subscription_set: bool,
    activation_subscription_set: bool,
}

impl TrackListView {
    /// Open a window for an already-registered document
    pub fn open(cx: &mut App, document_id: DocumentId, title: String) -> WindowHandle<Self> {
        let (registry, panel_core) = {
            let controller = cx.global::<MetadataPanelController>();
            (controller.registry(), controller.core())
        };

        let bounds = Bounds::centered(None, size(px(520.), px(600.)), cx);

        cx.open_window(
            WindowOptions {
                window_bounds: Some(WindowBounds::Windowed(bounds)),
                window_min_size: Some(size(px(400.), px(300.))),
                titlebar: Some(gpui::TitlebarOptions {
                    title: Some(title.into()),
                    appears_transparent: false,
                    traffic_light_position: None,
                }),
                ..Default::default()
            },
            |_window, cx| {
                cx.new(|_cx| TrackListView {
                    document_id,
                    registry,
                    panel_core,
                    appearance_subscription_set: false,
                    activation_subscription_set: false,
                })
            },
        )
        .unwrap()
    }

    /// Apply a row click to the selection
    fn handle_row_click(&mut self, index: usize, extend: bool, cx: &mut Context<Self>) {
        let mut registry = self.registry.lock().unwrap();
        let Some(document) = registry.get(self.document_id) else {
            return;
        };

        let mut selected: BTreeSet<usize> = document.selected_indices().into_iter().collect();
        if extend {
            if !selected.remove(&index) {
                selected.insert(index);
            }
        } else {
            selected.clear();
            selected.insert(index);
        }
        let indices: Vec<usize> = selected.into_iter().collect();
        registry.set_selection(self.document_id, &indices);
        cx.notify();
    }

    fn render_track_row(
        &self,
        index: usize,
        track: &TrackInfo,
        selected: bool,
        theme: &Theme,
        cx: &mut Context<Self>,
    ) -> impl IntoElement {
        let name = track.display_name();
        let artist = track.artist.clone().unwrap_or_default();
        let duration = format_duration(track.duration);
        let codec_badge = track.codec.to_uppercase();
        let is_lossy = track.is_lossy;

        div()
            .id(SharedString::from(format!("track-{}", index)))
            .w_full()
            .h_10()
            .flex()
            .items_center()
            .gap_2()
            .px_3()
            .bg(if selected {
                theme.bg_selected
            } else {
                theme.bg_card
            })
            .border_1()
            .border_color(if selected { theme.accent } else { theme.border })
            .rounded_md()
            .cursor_pointer()
            .hover(move |s| {
                if selected {
                    s
                } else {
                    s.bg(theme.bg_card_hover)
                }
            })
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(move |this, event: &MouseDownEvent, _window, cx| {
                    this.handle_row_click(index, event.modifiers.platform, cx);
                }),
            )
            // Track number
            .child(
                div()
                    .w_6()
                    .text_xs()
                    .text_color(theme.text_muted)
                    .text_center()
                    .child(format!("{}", index + 1)),
            )
            // Title
            .child(
                div()
                    .flex_1()
                    .text_sm()
                    .text_color(theme.text)
                    .overflow_hidden()
                    .text_ellipsis()
                    .child(name),
            )
            // Artist
            .child(
                div()
                    .w_32()
                    .text_xs()
                    .text_color(theme.text_muted)
                    .overflow_hidden()
                    .text_ellipsis()
                    .child(artist),
            )
            // Format badge
            .child(
                div()
                    .px_2()
                    .py_px()
                    .text_xs()
                    .rounded_sm()
                    .bg(if is_lossy {
                        theme.danger.opacity(0.2)
                    } else {
                        theme.success.opacity(0.2)
                    })
                    .text_color(if is_lossy { theme.danger } else { theme.success })
                    .child(codec_badge),
            )
            // Duration
            .child(
                div()
                    .w_12()
                    .text_xs()
                    .text_color(theme.text_muted)
                    .text_right()
                    .child(duration),
            )
    }
}

impl Drop for TrackListView {
    fn drop(&mut self) {
        // Closing the window closes the document; subscribers (the panel)
        // get a Closed event and unbind on their next pump.
        self.registry.lock().unwrap().close(self.document_id);
    }
}

impl Render for TrackListView {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        // Subscribe to appearance changes (once)
        if !self.appearance_subscription_set {
            self.appearance_subscription_set = true;
            cx.observe_window_appearance(window, |_this, _window, cx| {
                cx.notify();
            })
            .detach();
        }

        // Follow window activation so the panel tracks the front-most
        // document (once)
        if !self.activation_subscription_set {
            self.activation_subscription_set = true;
            cx.observe_window_activation(window, |this, window, cx| {
                if window.is_window_active() {
                    let mut registry = this.registry.lock().unwrap();
                    registry.activate(this.document_id);
                    this.panel_core
                        .lock()
                        .unwrap()
                        .handle_active_document_changed(&mut registry);
                    cx.notify();
                }
            })
            .detach();
        }

        let theme = Theme::from_appearance(window.appearance());

        let (title, tracks, selected): (String, Vec<TrackInfo>, BTreeSet<usize>) = {
            let registry = self.registry.lock().unwrap();
            match registry.get(self.document_id) {
                Some(document) => (
                    document.title.clone(),
                    document.tracks.clone(),
                    document.selected_indices().into_iter().collect(),
                ),
                None => (String::new(), Vec::new(), BTreeSet::new()),
            }
        };

        let summary = if selected.is_empty() {
            format!("{} tracks", tracks.len())
        } else {
            format!("{} of {} tracks selected", selected.len(), tracks.len())
        };

        div()
            .size_full()
            .flex()
            .flex_col()
            .bg(theme.bg)
            // Header
            .child(
                div()
                    .w_full()
                    .p_4()
                    .flex()
                    .items_center()
                    .justify_between()
                    .border_b_1()
                    .border_color(theme.border)
                    .child(
                        div()
                            .text_lg()
                            .font_weight(gpui::FontWeight::SEMIBOLD)
                            .text_color(theme.text)
                            .overflow_hidden()
                            .text_ellipsis()
                            .child(title),
                    )
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.text_muted)
                            .child(summary),
                    ),
            )
            // Track list (scrollable)
            .child(
                div()
                    .id("track-list-scroll")
                    .flex_1()
                    .w_full()
                    .overflow_scroll()
                    .p_4()
                    .gap_2()
                    .flex()
                    .flex_col()
                    .children(tracks.iter().enumerate().map(|(index, track)| {
                        self.render_track_row(
                            index,
                            track,
                            selected.contains(&index),
                            &theme,
                            cx,
                        )
                        .into_any_element()
                    })),
            )
    }
}
