//! UI layer for desktop GUI: app shell, preview textures, and theme.

pub mod app;
pub mod preview;
pub mod theme;

pub use app::{DesktopGuiApp, StartupConfig};
