//! Clip orchestration
//!
//! One clip runs start to finish as a single sequence:
//! validate → fetch → parse → extract → localize images → convert → insert.
//! Every fatal condition is reported once through the notifier and returned
//! to the caller; per-image failures only show up in the summary.

use crate::config::{ClipperSettings, ExtractMode};
use crate::dom::ParsedDocument;
use crate::dom::element::{outer_html, tag_name};
use crate::error::{ClipError, Result};
use crate::extract::extract;
use crate::host::{Destination, FetchRequest, Notifier, Transport};
use crate::images::{ImageLocalizer, LocalizationReport};
use crate::markdown;
use url::Url;

pub const SUCCESS_MESSAGE: &str = "Clip complete: inserted at the cursor position.";

/// What to clip and how to find the content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipRequest {
    pub url: String,
    pub mode: ExtractMode,
    /// CSS selector or XPath for the explicit modes
    pub content_path: String,
}

impl ClipRequest {
    /// An `auto` mode request
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: ExtractMode::Auto,
            content_path: String::new(),
        }
    }

    /// A request using the configured default mode and content path
    pub fn from_settings(url: impl Into<String>, settings: &ClipperSettings) -> Self {
        Self {
            url: url.into(),
            mode: settings.default_mode,
            content_path: settings.content_path.clone(),
        }
    }

    /// Builder method: select the content explicitly
    pub fn with_locator(mut self, mode: ExtractMode, content_path: impl Into<String>) -> Self {
        self.mode = mode;
        self.content_path = content_path.into();
        self
    }

    /// Check the request before doing any work, returning the parsed URL
    pub fn validate(&self) -> Result<Url> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(ClipError::InvalidRequest("Enter a URL to clip".to_string()));
        }
        if self.mode.needs_path() && self.content_path.trim().is_empty() {
            return Err(ClipError::InvalidRequest(format!(
                "Select a content region first: {} mode needs a selector",
                self.mode
            )));
        }

        Url::parse(url).map_err(|e| ClipError::InvalidRequest(format!("Invalid URL '{}': {}", url, e)))
    }
}

/// Result of a completed clip
///
/// The inserted text itself is owned by the destination after insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipSummary {
    pub title: String,
    pub url: String,
    /// Length in bytes of the inserted text
    pub inserted_len: usize,
    pub images: LocalizationReport,
}

/// Provenance line put above every clip, as a blockquote
pub fn provenance_header(title: &str, url: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        format!("\n> Source: {}\n\n", url)
    } else {
        format!("\n> Source: {} - {}\n\n", title, url)
    }
}

/// Header plus converted body, ending in exactly one blank line
pub fn render_clip(title: &str, url: &str, body: &str) -> String {
    format!(
        "{}{}\n\n",
        provenance_header(title, url),
        body.trim_start_matches('\n').trim_end()
    )
}

/// Runs clips against a transport with fixed settings
pub struct Clipper<T: Transport> {
    transport: T,
    settings: ClipperSettings,
}

impl<T: Transport> Clipper<T> {
    pub fn new(transport: T, settings: ClipperSettings) -> Self {
        Self { transport, settings }
    }

    pub fn settings(&self) -> &ClipperSettings {
        &self.settings
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Clip `request` into `destination` at its cursor
    ///
    /// The notifier receives the success message or the error's message;
    /// the error is also returned.
    pub async fn clip<D: Destination + ?Sized>(
        &self,
        request: &ClipRequest,
        destination: &mut D,
        notifier: &dyn Notifier,
    ) -> Result<ClipSummary> {
        match self.run(request, destination).await {
            Ok(summary) => {
                log::info!(
                    "Clipped {} ({} bytes, {} images stored, {} failed)",
                    summary.url,
                    summary.inserted_len,
                    summary.images.localized_count(),
                    summary.images.failed_count()
                );
                notifier.notify(SUCCESS_MESSAGE);
                Ok(summary)
            }
            Err(e) => {
                log::debug!("Clip of {} failed: {:?}", request.url.trim(), e);
                notifier.notify(&e.to_string());
                Err(e)
            }
        }
    }

    async fn run<D: Destination + ?Sized>(&self, request: &ClipRequest, destination: &mut D) -> Result<ClipSummary> {
        let page_url = request.validate()?;
        let url = request.url.trim();

        if !destination.is_persisted() {
            return Err(ClipError::UnsavedDestination);
        }

        let html = self.fetch_page(url).await?;
        let document = ParsedDocument::with_base(&html, page_url);

        let content_path = request.content_path.trim();
        let root = extract(&document, request.mode, Some(content_path)).ok_or(ClipError::NoContentFound)?;

        let images = if self.settings.download_images {
            ImageLocalizer::new(&self.transport, self.settings.image_prefix.as_str())
                .localize(&root, document.base_url(), &*destination)
                .await
        } else {
            LocalizationReport::default()
        };

        log::debug!(
            "Converting <{}> ({} images skipped)",
            tag_name(&root).unwrap_or_default(),
            images.skipped_count()
        );
        let body = markdown::convert(&outer_html(&root));
        let title = document.title();
        let text = render_clip(&title, url, &body);

        destination.insert_at_cursor(&text)?;

        Ok(ClipSummary {
            title,
            url: url.to_string(),
            inserted_len: text.len(),
            images,
        })
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.transport.fetch(FetchRequest::get(url)).await?;
        log::info!("Fetched {} -> HTTP {}", url, response.status);

        if response.is_failure() {
            return Err(ClipError::HttpStatus {
                url: url.to_string(),
                status: response.status,
            });
        }
        Ok(response.text())
    }
}
