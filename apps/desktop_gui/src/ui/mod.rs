//! UI layer for the desktop form: app shell, form panel and preview.

pub mod app;

pub use app::QrStudioApp;
