//! Host side of the picker output channel
//!
//! Each slot in the page holds only the latest value. The poller remembers
//! the highest timestamp it consumed per slot and ignores anything not
//! strictly newer, so a slow hover update can never overwrite a pick.

use crate::dom::Locator;
use crate::error::{ClipError, Result};
use crate::picker::script::poll_script;
use crate::picker::PageContext;
use serde::{Deserialize, Serialize};

/// Why a pick record was written
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PickReason {
    /// Single click: a candidate, picking continues
    Pick,
    /// Double click: the final selection, picking stops
    DblclickConfirm,
}

/// One record read from a page slot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PickState {
    pub css: String,
    pub xpath: String,
    /// Milliseconds since the epoch, page clock
    pub ts: u64,
    /// Absent on hover records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<PickReason>,
}

impl PickState {
    pub fn locator(&self) -> Locator {
        Locator::new(self.css.clone(), self.xpath.clone())
    }

    pub fn is_confirmed(&self) -> bool {
        self.reason == Some(PickReason::DblclickConfirm)
    }
}

/// Raw contents of the page slots at one poll
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct PollSnapshot {
    pub hover: Option<PickState>,
    pub pick: Option<PickState>,
    #[serde(default)]
    pub enabled: bool,
}

/// A fresh record accepted by the poller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEvent {
    Hover(PickState),
    Pick(PickState),
    Confirmed(PickState),
}

/// Deduplicates slot records by timestamp
#[derive(Debug, Clone, Default)]
pub struct PickerPoller {
    last_hover_ts: u64,
    last_pick_ts: u64,
}

impl PickerPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events for the records in `snapshot` that are newer than anything
    /// consumed so far (hover first, then pick)
    pub fn accept(&mut self, snapshot: PollSnapshot) -> Vec<PickerEvent> {
        let mut events = Vec::new();

        if let Some(hover) = snapshot.hover {
            if hover.ts > self.last_hover_ts {
                self.last_hover_ts = hover.ts;
                events.push(PickerEvent::Hover(hover));
            }
        }

        if let Some(pick) = snapshot.pick {
            if pick.ts > self.last_pick_ts {
                self.last_pick_ts = pick.ts;
                if pick.is_confirmed() {
                    events.push(PickerEvent::Confirmed(pick));
                } else {
                    events.push(PickerEvent::Pick(pick));
                }
            }
        }

        events
    }
}

/// Read the slots once
pub fn poll_once<P: PageContext + ?Sized>(page: &P) -> Result<PollSnapshot> {
    let value = page.evaluate_json(&poll_script())?;
    serde_json::from_value(value).map_err(|e| ClipError::Browser(format!("Malformed picker state: {}", e)))
}
