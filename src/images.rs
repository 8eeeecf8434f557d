//! Image localization
//!
//! Images inside the content root are downloaded into the destination's
//! attachment area and their `src` is pointed at the stored copy. The work is
//! split into three phases so the tree is only touched once per image:
//!
//! 1. [`plan_images`] walks the subtree and classifies every `<img>`.
//! 2. [`ImageLocalizer::localize`] fetches and stores each planned image in
//!    document order.
//! 3. Only an image whose bytes were stored gets its `src` rewritten.
//!
//! A failed image keeps its original `src` and never aborts the clip.

use crate::dom::NodeRef;
use crate::dom::element::{attr, is_tag, self_and_descendants};
use crate::error::{ClipError, Result};
use crate::host::{Destination, FetchRequest, Transport, parent_container};
use chrono::{DateTime, Local};
use dom_query::Selection;
use url::Url;

/// File extensions kept from the image URL; anything else is stored as png
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "webp", "gif", "svg"];

const USER_AGENT: &str = "url-clipper";

/// A remote image found in the content root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// `src` as authored
    pub raw: String,
    /// Absolute URL with the fragment removed
    pub resolved: Url,
}

/// Why an image was left alone without a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Missing or blank `src`
    Empty,
    /// `data:` URI, already inline
    Embedded,
    /// `blob:` URI, only valid inside the page that created it
    Ephemeral,
    /// Could not be resolved against the page URL
    Unresolvable,
}

/// What happened to one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    Localized { reference: ImageReference, path: String },
    Skipped { raw: String, reason: SkipReason },
    Failed { reference: ImageReference, reason: String },
}

/// Per-image outcomes in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizationReport {
    pub outcomes: Vec<ImageOutcome>,
}

impl LocalizationReport {
    pub fn localized_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ImageOutcome::Localized { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ImageOutcome::Failed { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ImageOutcome::Skipped { .. }))
            .count()
    }
}

/// Planned handling of one image: fetch it, or skip it with the raw `src`
pub type ImageAction = std::result::Result<ImageReference, (String, SkipReason)>;

/// An `<img>` element and what to do with it
pub struct PlannedImage<'a> {
    pub node: NodeRef<'a>,
    pub action: ImageAction,
}

/// Classify every `<img>` at or below `root`, in document order
pub fn plan_images<'a>(root: &NodeRef<'a>, page_url: &Url) -> Vec<PlannedImage<'a>> {
    self_and_descendants(root)
        .into_iter()
        .filter(|node| is_tag(node, "img"))
        .map(|node| {
            let raw = attr(&node, "src").unwrap_or_default();
            let action = classify(&raw, page_url);
            PlannedImage { node, action }
        })
        .collect()
}

fn classify(raw: &str, page_url: &Url) -> ImageAction {
    let trimmed = raw.trim();
    let skip = |reason: SkipReason| -> ImageAction { Err((raw.to_string(), reason)) };

    if trimmed.is_empty() {
        return skip(SkipReason::Empty);
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("data:") {
        return skip(SkipReason::Embedded);
    }
    if lower.starts_with("blob:") {
        return skip(SkipReason::Ephemeral);
    }

    match page_url.join(trimmed) {
        Ok(mut resolved) => {
            resolved.set_fragment(None);
            Ok(ImageReference {
                raw: raw.to_string(),
                resolved,
            })
        }
        Err(e) => {
            log::debug!("Skipping unresolvable image {}: {}", trimmed, e);
            skip(SkipReason::Unresolvable)
        }
    }
}

/// Extension for a stored image, from the URL path's suffix
pub fn guess_image_extension(url: &Url) -> &'static str {
    let path = url.path().to_ascii_lowercase();
    let suffix = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();

    match IMAGE_EXTENSIONS.iter().find(|ext| **ext == suffix) {
        Some(&"jpeg") => "jpg",
        Some(ext) => *ext,
        None => "png",
    }
}

/// Millisecond timestamp used in image file names: `yyyyMMdd-HHmmss-SSS`
pub fn timestamp(now: DateTime<Local>) -> String {
    now.format("%Y%m%d-%H%M%S-%3f").to_string()
}

/// `{prefix}-{timestamp}.{ext}`, or `{timestamp}.{ext}` without a prefix
pub fn image_file_name(prefix: &str, extension: &str, now: DateTime<Local>) -> String {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        format!("{}.{}", timestamp(now), extension)
    } else {
        format!("{}-{}.{}", prefix, timestamp(now), extension)
    }
}

/// Downloads images and stores them through the destination
pub struct ImageLocalizer<'t, T: Transport + ?Sized> {
    transport: &'t T,
    prefix: String,
}

impl<'t, T: Transport + ?Sized> ImageLocalizer<'t, T> {
    pub fn new(transport: &'t T, prefix: impl Into<String>) -> Self {
        Self {
            transport,
            prefix: prefix.into(),
        }
    }

    /// Localize every image under `root`, one at a time in document order
    pub async fn localize<D: Destination + ?Sized>(
        &self,
        root: &NodeRef<'_>,
        page_url: &Url,
        destination: &D,
    ) -> LocalizationReport {
        let mut report = LocalizationReport::default();

        for planned in plan_images(root, page_url) {
            let reference = match planned.action {
                Ok(reference) => reference,
                Err((raw, reason)) => {
                    report.outcomes.push(ImageOutcome::Skipped { raw, reason });
                    continue;
                }
            };

            match self.store(&reference, destination).await {
                Ok(path) => {
                    Selection::from(planned.node.clone()).set_attr("src", &path);
                    log::debug!("Image saved to {} from {}", path, reference.resolved);
                    report.outcomes.push(ImageOutcome::Localized { reference, path });
                }
                Err(e) => {
                    log::warn!("Image download failed for {}: {}", reference.resolved, e);
                    report.outcomes.push(ImageOutcome::Failed {
                        reference,
                        reason: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Fetch one image and store it, returning its storage path
    async fn store<D: Destination + ?Sized>(
        &self,
        reference: &ImageReference,
        destination: &D,
    ) -> Result<String> {
        let extension = guess_image_extension(&reference.resolved);
        let filename = image_file_name(&self.prefix, extension, Local::now());

        let path = destination.available_attachment_path(&filename)?;
        if let Some(container) = parent_container(&path) {
            if let Err(e) = destination.ensure_container(container) {
                log::debug!("Ignoring container error for {}: {}", container, e);
            }
        }

        let request = FetchRequest::get(reference.resolved.as_str())
            .with_header("User-Agent", USER_AGENT)
            .with_header("Accept", "*/*");
        let response = self.transport.fetch(request).await?;

        if response.is_failure() {
            return Err(ClipError::HttpStatus {
                url: reference.resolved.to_string(),
                status: response.status,
            });
        }

        destination.create_binary(&path, &response.body)?;
        Ok(path)
    }
}
