//! Browser that renders the page for the element picker
//!
//! Clipping itself never uses the browser; only the picker needs the live page.

pub mod config;
pub mod session;

pub use config::LaunchOptions;
pub use session::BrowserSession;
