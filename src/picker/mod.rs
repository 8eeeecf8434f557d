//! Interactive element picker
//!
//! The picker runs in two places:
//! - script: the JavaScript injected into the page, which highlights the
//!   element under the pointer and publishes locators into page globals
//! - poller: the host side, reading those globals on a fixed interval
//!
//! [`PickerSession`] ties the two together on a background thread.

pub mod poller;
pub mod script;

pub use poller::{PickReason, PickState, PickerEvent, PickerPoller, PollSnapshot};
pub use script::{InstallStatus, picker_script, poll_script};

use crate::error::{ClipError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How often the page slots are read
pub const POLL_INTERVAL: Duration = Duration::from_millis(120);

/// A page the host can run scripts in
///
/// Scripts given to [`evaluate_json`](PageContext::evaluate_json) return a
/// JSON string, which is parsed on the host side.
pub trait PageContext {
    fn evaluate_json(&self, script: &str) -> Result<serde_json::Value>;
}

/// Inject (or re-toggle) the picker in `page`
pub fn install<P: PageContext + ?Sized>(page: &P, enable: bool) -> Result<InstallStatus> {
    let value = page.evaluate_json(&picker_script(enable))?;
    let status: InstallStatus = serde_json::from_value(value)
        .map_err(|e| ClipError::Browser(format!("Unexpected picker install result: {}", e)))?;

    if !status.ok {
        return Err(ClipError::Browser("Picker script failed to install".to_string()));
    }
    log::debug!(
        "Picker {} (enabled: {})",
        if status.installed { "installed" } else { "toggled" },
        status.enabled
    );
    Ok(status)
}

/// Latest accepted picker output
///
/// Owns the poller, so consumed timestamps survive pausing and resuming.
#[derive(Debug, Clone, Default)]
struct PickerShared {
    poller: PickerPoller,
    hover: Option<PickState>,
    pick: Option<PickState>,
    confirmed: Option<PickState>,
    last_error: Option<String>,
}

impl PickerShared {
    fn accept(&mut self, snapshot: PollSnapshot) {
        for event in self.poller.accept(snapshot) {
            match event {
                PickerEvent::Hover(hover) => self.hover = Some(hover),
                PickerEvent::Pick(pick) => self.pick = Some(pick),
                PickerEvent::Confirmed(pick) => {
                    log::info!("Pick confirmed: {}", pick.css);
                    self.pick = Some(pick.clone());
                    self.confirmed = Some(pick);
                }
            }
        }
    }
}

/// A picker installed in a page plus the thread polling it
pub struct PickerSession<P: PageContext + Send + Sync + 'static> {
    page: Arc<P>,
    shared: Arc<Mutex<PickerShared>>,
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl<P: PageContext + Send + Sync + 'static> PickerSession<P> {
    /// Install the picker enabled and start polling
    pub fn start(page: Arc<P>) -> Result<Self> {
        install(page.as_ref(), true)?;

        let mut session = Self {
            page,
            shared: Arc::new(Mutex::new(PickerShared::default())),
            stop_flag: Arc::new(AtomicBool::new(false)),
            handle: None,
        };
        session.spawn_polling();
        Ok(session)
    }

    fn spawn_polling(&mut self) {
        if self.is_polling() {
            return;
        }
        self.stop_flag = Arc::new(AtomicBool::new(false));

        let page = Arc::clone(&self.page);
        let shared = Arc::clone(&self.shared);
        let stop = Arc::clone(&self.stop_flag);

        self.handle = Some(thread::spawn(move || {
            while !stop.load(Ordering::SeqCst) {
                match poller::poll_once(page.as_ref()) {
                    Ok(snapshot) => {
                        let enabled = snapshot.enabled;
                        lock(&shared).accept(snapshot);
                        if !enabled {
                            log::debug!("Picker disabled in page, polling stopped");
                            break;
                        }
                    }
                    Err(e) => {
                        log::debug!("Picker poll failed: {}", e);
                        lock(&shared).last_error = Some(e.to_string());
                    }
                }
                thread::sleep(POLL_INTERVAL);
            }
        }));
    }

    /// Whether the polling thread is still running
    pub fn is_polling(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Pause or resume picking. Polling follows the enabled state.
    ///
    /// Resuming drops the previous confirmation; records already consumed
    /// stay consumed.
    pub fn toggle(&mut self, enable: bool) -> Result<()> {
        install(self.page.as_ref(), enable)?;
        if enable {
            self.stop();
            lock(&self.shared).confirmed = None;
            self.spawn_polling();
        } else {
            self.stop();
        }
        Ok(())
    }

    /// Element currently under the pointer
    pub fn hovered(&self) -> Option<PickState> {
        lock(&self.shared).hover.clone()
    }

    /// Last single- or double-click pick
    pub fn picked(&self) -> Option<PickState> {
        lock(&self.shared).pick.clone()
    }

    /// The double-click confirmed pick, once there is one
    pub fn confirmed(&self) -> Option<PickState> {
        lock(&self.shared).confirmed.clone()
    }

    /// Block until the user confirms a pick or `timeout` passes
    pub fn wait_for_confirmation(&self, timeout: Duration) -> Result<Option<PickState>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(confirmed) = self.confirmed() {
                return Ok(Some(confirmed));
            }
            if !self.is_polling() {
                return match lock(&self.shared).last_error.clone() {
                    Some(e) => Err(ClipError::Browser(e)),
                    None => Ok(None),
                };
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Stop polling. Calling it again is a no-op.
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Picker polling thread panicked");
            }
        }
    }
}

impl<P: PageContext + Send + Sync + 'static> Drop for PickerSession<P> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock(shared: &Mutex<PickerShared>) -> std::sync::MutexGuard<'_, PickerShared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;

    /// Answers install scripts and plays back poll snapshots; the last
    /// snapshot repeats once the queue is drained
    struct FakePage {
        snapshots: Mutex<VecDeque<serde_json::Value>>,
        last: Mutex<serde_json::Value>,
        installs: Mutex<Vec<bool>>,
        polls: Mutex<usize>,
    }

    impl FakePage {
        fn new(snapshots: Vec<serde_json::Value>) -> Self {
            Self {
                snapshots: Mutex::new(snapshots.into()),
                last: Mutex::new(json!({"hover": null, "pick": null, "enabled": true})),
                installs: Mutex::new(Vec::new()),
                polls: Mutex::new(0),
            }
        }
    }

    impl PageContext for FakePage {
        fn evaluate_json(&self, script: &str) -> Result<serde_json::Value> {
            if script.contains("addEventListener") {
                let enable = script.trim_end().ends_with("(true)");
                self.installs.lock().unwrap().push(enable);
                return Ok(json!({"ok": true, "installed": self.installs.lock().unwrap().len() == 1, "enabled": enable}));
            }

            *self.polls.lock().unwrap() += 1;
            let mut last = self.last.lock().unwrap();
            if let Some(next) = self.snapshots.lock().unwrap().pop_front() {
                *last = next;
            }
            Ok(last.clone())
        }
    }

    struct BrokenPage;

    impl PageContext for BrokenPage {
        fn evaluate_json(&self, script: &str) -> Result<serde_json::Value> {
            if script.contains("addEventListener") {
                return Ok(json!({"ok": true, "installed": true, "enabled": true}));
            }
            Ok(json!("not a snapshot"))
        }
    }

    #[test]
    fn test_install_reports_status() {
        let page = FakePage::new(vec![]);
        let status = install(&page, true).unwrap();
        assert!(status.installed && status.enabled);

        let status = install(&page, false).unwrap();
        assert!(!status.installed && !status.enabled);
        assert_eq!(*page.installs.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn test_session_waits_for_confirmation() {
        let page = Arc::new(FakePage::new(vec![
            json!({"hover": {"css": "p", "xpath": "/html[1]/body[1]/p[1]", "ts": 1}, "pick": null, "enabled": true}),
            json!({"hover": {"css": "p", "xpath": "/html[1]/body[1]/p[1]", "ts": 1},
                   "pick": {"css": "p", "xpath": "/html[1]/body[1]/p[1]", "ts": 2, "reason": "pick"}, "enabled": true}),
            json!({"hover": {"css": "p", "xpath": "/html[1]/body[1]/p[1]", "ts": 1},
                   "pick": {"css": "#main", "xpath": "//*[@id=\"main\"]", "ts": 3, "reason": "dblclick-confirm"}, "enabled": false}),
        ]));

        let mut session = PickerSession::start(Arc::clone(&page)).unwrap();
        let confirmed = session.wait_for_confirmation(Duration::from_secs(5)).unwrap().unwrap();

        assert_eq!(confirmed.css, "#main");
        assert_eq!(confirmed.reason, Some(PickReason::DblclickConfirm));
        assert_eq!(session.hovered().unwrap().css, "p");
        assert_eq!(session.picked().unwrap().css, "#main");

        // disabled page ends polling on its own
        let polls = *page.polls.lock().unwrap();
        thread::sleep(POLL_INTERVAL * 3);
        assert_eq!(*page.polls.lock().unwrap(), polls);

        session.stop();
        session.stop();
        assert!(!session.is_polling());
    }

    #[test]
    fn test_timeout_without_confirmation() {
        let page = Arc::new(FakePage::new(vec![]));
        let session = PickerSession::start(page).unwrap();

        let result = session.wait_for_confirmation(Duration::from_millis(300)).unwrap();
        assert!(result.is_none());
        assert!(session.is_polling());
    }

    #[test]
    fn test_toggle_pauses_and_resumes_polling() {
        let page = Arc::new(FakePage::new(vec![]));
        let mut session = PickerSession::start(Arc::clone(&page)).unwrap();

        session.toggle(false).unwrap();
        assert!(!session.is_polling());
        let polls = *page.polls.lock().unwrap();
        thread::sleep(POLL_INTERVAL * 2);
        assert_eq!(*page.polls.lock().unwrap(), polls);

        session.toggle(true).unwrap();
        assert!(session.is_polling());
        assert_eq!(*page.installs.lock().unwrap(), vec![true, false, true]);
    }

    #[test]
    fn test_resume_ignores_consumed_confirmation() {
        let confirm = |css: &str, ts: u64, enabled: bool| {
            json!({"hover": null,
                   "pick": {"css": css, "xpath": "/html[1]/body[1]/p[1]", "ts": ts, "reason": "dblclick-confirm"},
                   "enabled": enabled})
        };
        let page = Arc::new(FakePage::new(vec![confirm("#old", 3, false)]));
        let mut session = PickerSession::start(Arc::clone(&page)).unwrap();

        let first = session.wait_for_confirmation(Duration::from_secs(5)).unwrap().unwrap();
        assert_eq!((first.css.as_str(), first.ts), ("#old", 3));

        // page re-enabled with the old record still in its slot
        page.snapshots.lock().unwrap().push_back(confirm("#old", 3, true));
        session.toggle(true).unwrap();
        assert!(session.confirmed().is_none());

        let stale = session.wait_for_confirmation(POLL_INTERVAL * 4).unwrap();
        assert!(stale.is_none(), "consumed confirmation returned again: {:?}", stale);
        assert!(session.is_polling());

        page.snapshots.lock().unwrap().push_back(confirm("#new", 4, false));
        let next = session.wait_for_confirmation(Duration::from_secs(5)).unwrap().unwrap();
        assert_eq!((next.css.as_str(), next.ts), ("#new", 4));
    }

    #[test]
    fn test_malformed_state_recorded_as_error() {
        let session = PickerSession::start(Arc::new(BrokenPage)).unwrap();
        thread::sleep(POLL_INTERVAL * 2);

        let state = lock(&session.shared);
        assert!(state.last_error.as_deref().unwrap_or_default().contains("Malformed picker state"));
    }
}
