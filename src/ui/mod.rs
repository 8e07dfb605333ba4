//! UI module - GPUI views and components
//!
//! This module contains all UI-related code:
//! - `components/` - Windows and views (track lists, the metadata panel)
//! - `theme` - OS-aware light and dark mode color schemes

pub mod components;
pub mod theme;

pub use theme::Theme;
