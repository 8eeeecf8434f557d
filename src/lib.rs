//! # url-clipper
//!
//! Clip the main content of a web page into a markdown note.
//!
//! ## Features
//!
//! - **Content detection**: `<article>`, then `<main>`, then the largest non-boilerplate text block
//! - **Explicit selection**: CSS selector or XPath for pages the heuristic gets wrong
//! - **Image localization**: images are downloaded next to the note and references rewritten
//! - **Code-safe conversion**: `<pre>` blocks become fenced code with their text untouched
//! - **Element picker**: an injected script that turns a hover/click in a live page into a locator pair
//!
//! ## Clipping
//!
//! The host application supplies the collaborators: a [`Transport`] for HTTP,
//! a [`Destination`] document and a [`Notifier`] for user messages.
//!
//! ```rust,no_run
//! use url_clipper::{ClipRequest, Clipper, ClipperSettings, HttpTransport, NoteFile};
//! use url_clipper::host::LogNotifier;
//!
//! # async fn run() -> url_clipper::Result<()> {
//! let clipper = Clipper::new(HttpTransport::new()?, ClipperSettings::default());
//! let mut note = NoteFile::open("notes/reading.md");
//!
//! let summary = clipper
//!     .clip(&ClipRequest::new("https://example.com/post"), &mut note, &LogNotifier)
//!     .await?;
//! println!("{} images stored", summary.images.localized_count());
//! # Ok(())
//! # }
//! ```
//!
//! ### Explicit selection
//!
//! ```rust,no_run
//! # use url_clipper::{ClipRequest, ExtractMode};
//! let request = ClipRequest::new("https://example.com/post")
//!     .with_locator(ExtractMode::Xpath, "//*[@id=\"content\"]");
//! ```
//!
//! ## Picking an element
//!
//! ```rust,no_run
//! use url_clipper::{BrowserSession, LaunchOptions};
//! use std::time::Duration;
//!
//! # fn main() -> url_clipper::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default())?;
//! session.open("https://example.com/post")?;
//!
//! let picker = session.start_picker()?;
//! if let Some(pick) = picker.wait_for_confirmation(Duration::from_secs(120))? {
//!     println!("css: {}  xpath: {}", pick.css, pick.xpath);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`dom`]: parsed page model, CSS path / XPath generation and resolution
//! - [`extract`]: content root selection
//! - [`images`]: image download and reference rewriting
//! - [`markdown`]: HTML to markdown conversion
//! - [`clipper`]: the clip sequence
//! - [`picker`]: injected picker script and host-side polling
//! - [`browser`]: the Chrome instance the picker runs in
//! - [`host`]: collaborator traits and in-memory implementations
//! - [`config`]: persisted settings
//! - [`error`]: error types and result aliases

pub mod browser;
pub mod clipper;
pub mod config;
pub mod dom;
pub mod error;
pub mod extract;
pub mod host;
pub mod images;
pub mod markdown;
pub mod note;
pub mod picker;
pub mod transport;
pub mod utils;

pub use browser::{BrowserSession, LaunchOptions};
pub use clipper::{ClipRequest, ClipSummary, Clipper};
pub use config::{ClipperSettings, ExtractMode};
pub use dom::{Locator, ParsedDocument};
pub use error::{ClipError, Result};
pub use host::{Destination, Notifier, Transport};
pub use images::LocalizationReport;
pub use note::NoteFile;
pub use picker::{PickState, PickerSession};
pub use transport::HttpTransport;
