//! TagDeck - GPUI Application
//!
//! A desktop application for editing the metadata of audio tracks. Each
//! opened music folder becomes a document window; a floating metadata editor
//! panel follows the front-most document's track selection.

mod actions;
mod audio;
mod core;
mod logging;
mod ui;

use gpui::{App, Application, AsyncApp, KeyBinding, Menu, MenuItem, PathPromptOptions};

use actions::{About, OpenFolder, Quit, ToggleMetadataEditor, ToggleTechnicalFields};
use core::{AppSettings, scan_music_folder};
use ui::components::{AboutBox, MetadataPanelController, TrackListView};

/// Build the application menus with current settings state
fn build_menus(settings: &AppSettings) -> Vec<Menu> {
    // Use checkmark prefix when enabled
    let technical_fields_label = if settings.show_technical_fields {
        "✓ Show Technical Info"
    } else {
        "Show Technical Info"
    };

    vec![
        Menu {
            name: "TagDeck".into(),
            items: vec![
                MenuItem::action("About TagDeck", About),
                MenuItem::separator(),
                MenuItem::action("Quit", Quit),
            ],
        },
        Menu {
            name: "File".into(),
            items: vec![MenuItem::action("Open Folder...", OpenFolder)],
        },
        Menu {
            name: "View".into(),
            items: vec![
                MenuItem::action("Metadata Editor", ToggleMetadataEditor),
                MenuItem::separator(),
                MenuItem::action(technical_fields_label, ToggleTechnicalFields),
            ],
        },
    ]
}

/// Prompt for music folders and open a document window for each
fn open_folders(cx: &mut App) {
    let options = PathPromptOptions {
        files: false,
        directories: true,
        multiple: true,
        prompt: None,
    };
    let receiver = cx.prompt_for_paths(options);
    cx.spawn(|cx: &mut AsyncApp| {
        let mut async_cx = cx.clone();
        async move {
            if let Ok(Ok(Some(paths))) = receiver.await {
                let _ = async_cx.update(|cx| {
                    for path in paths {
                        match scan_music_folder(&path) {
                            Ok(document) => {
                                let title = document.title.clone();
                                let (registry, panel_core) = {
                                    let controller = cx.global::<MetadataPanelController>();
                                    (controller.registry(), controller.core())
                                };
                                let id = registry.lock().unwrap().open(document);
                                TrackListView::open(cx, id, title);
                                // A visible panel follows the new front-most
                                // document immediately
                                MetadataPanelController::active_document_changed(
                                    &registry,
                                    &panel_core,
                                );
                            }
                            Err(e) => {
                                log::error!("Failed to open {:?}: {}", path, e);
                            }
                        }
                    }
                });
            }
        }
    })
    .detach();
}

fn main() {
    logging::init_logging();

    Application::new().run(|cx: &mut App| {
        // Load settings from disk (or use defaults)
        cx.set_global(AppSettings::load());
        // The panel controller exists for the whole session; its window is
        // created lazily on the first toggle.
        cx.set_global(MetadataPanelController::new());

        // Register action handlers
        cx.on_action(|_: &Quit, cx| cx.quit());
        cx.on_action(|_: &About, cx| {
            AboutBox::open(cx);
        });
        cx.on_action(|_: &OpenFolder, cx| {
            open_folders(cx);
        });
        cx.on_action(|_: &ToggleMetadataEditor, cx| {
            MetadataPanelController::toggle(cx);
        });
        cx.on_action(|_: &ToggleTechnicalFields, cx| {
            // Toggle the setting and persist it
            let settings = cx.global_mut::<AppSettings>();
            settings.show_technical_fields = !settings.show_technical_fields;
            if let Err(e) = settings.save() {
                log::warn!("Failed to save settings: {}", e);
            }

            // Rebuild menus to show updated checkmark
            let menus = build_menus(settings);
            cx.set_menus(menus);
        });

        // Bind keyboard shortcuts
        cx.bind_keys([
            KeyBinding::new("cmd-q", Quit, None),
            KeyBinding::new("cmd-o", OpenFolder, None),
            KeyBinding::new("cmd-i", ToggleMetadataEditor, None),
        ]);

        // Set up the initial application menu
        let settings = cx.global::<AppSettings>();
        cx.set_menus(build_menus(settings));

        // Quit once the last window is gone
        cx.on_window_closed(|cx| {
            if cx.windows().is_empty() {
                cx.quit();
            }
        })
        .detach();

        cx.activate(true);
    });
}
