//! Script text injected into the page
//!
//! The page keeps its own copy of the locator builders (in `picker.js`)
//! because it shares nothing with this process. Both copies are checked
//! against `tests/fixtures/locator_vectors.json`.

use serde::Deserialize;

const PICKER_TEMPLATE: &str = include_str!("picker.js");
const ENABLE_PLACEHOLDER: &str = "__URL_CLIPPER_ENABLE__";

/// Set once the listeners are registered
pub const INSTALLED_FLAG: &str = "__URL_CLIPPER_PICKER_INSTALLED__";
/// Whether hover and click events are currently handled
pub const ENABLED_FLAG: &str = "__URL_CLIPPER_PICKER_ENABLED__";
/// `{css, xpath, ts}` of the element under the pointer
pub const LAST_HOVER_SLOT: &str = "__URL_CLIPPER_LAST_HOVER__";
/// `{css, xpath, ts, reason}` of the last click or double click
pub const LAST_PICK_SLOT: &str = "__URL_CLIPPER_LAST_PICK__";
/// `{injectedAt, enabled, location}` written on first install
pub const TEST_SLOT: &str = "__URL_CLIPPER_TEST__";
/// The page-side locator builders
pub const LOCATE_EXPORT: &str = "__URL_CLIPPER_LOCATE__";
pub const OVERLAY_ID: &str = "__url_clipper_overlay__";

/// Installer script. Running it again only flips the enabled flag.
pub fn picker_script(enable: bool) -> String {
    PICKER_TEMPLATE.replace(ENABLE_PLACEHOLDER, if enable { "true" } else { "false" })
}

/// Expression reading both output slots and the enabled flag as one JSON string
pub fn poll_script() -> String {
    format!(
        "JSON.stringify({{hover: window.{hover} || null, pick: window.{pick} || null, enabled: !!window.{enabled}}})",
        hover = LAST_HOVER_SLOT,
        pick = LAST_PICK_SLOT,
        enabled = ENABLED_FLAG,
    )
}

/// Expression computing the page-side locator pair of the first element
/// matching `selector`, as a JSON string (`null` when nothing matches)
pub fn locate_script(selector: &str) -> String {
    let selector = serde_json::Value::String(selector.to_string());
    format!(
        "JSON.stringify((function () {{ var el = document.querySelector({selector}); return el ? window.{export}.locate(el) : null; }})())",
        selector = selector,
        export = LOCATE_EXPORT,
    )
}

/// What the installer reports back
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct InstallStatus {
    pub ok: bool,
    /// False when the script was already present and only toggled
    pub installed: bool,
    pub enabled: bool,
}
