//! Collaborator interfaces supplied by the host application
//!
//! The clipping core never talks to the network, the file system or the
//! user directly. It goes through these traits so that a desktop editor,
//! the bundled CLI, or a test can each provide their own implementation.

use crate::error::{ClipError, Result};
use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

/// An outgoing HTTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub method: String,
    pub headers: Vec<(String, String)>,
}

impl FetchRequest {
    /// A GET request without extra headers
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            headers: Vec::new(),
        }
    }

    /// Builder method: add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Status and raw body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Statuses of 400 and above are failures
    pub fn is_failure(&self) -> bool {
        self.status >= 400
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Network transport
///
/// Implementations return `Ok` for any response that arrived, whatever its
/// status; `Err` is reserved for transport-level failures.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse>;
}

/// Transport serving canned responses, recording every request it receives
///
/// URLs without a canned response fail at the transport level, like an
/// unreachable host.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    responses: HashMap<String, FetchResponse>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: answer `url` with `status` and `body`
    pub fn with_response(mut self, url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(url.into(), FetchResponse::new(status, body));
        self
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|request| request.url).collect()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
        let response = self.responses.get(&request.url).cloned();
        let url = request.url.clone();
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        response.ok_or_else(|| ClipError::Transport(format!("connection refused: {}", url)))
    }
}

/// The document that receives a clip
pub trait Destination {
    /// Whether the document has backing storage (required for attachments)
    fn is_persisted(&self) -> bool;

    /// A free storage path for an attachment named `filename`
    fn available_attachment_path(&self, filename: &str) -> Result<String>;

    /// Create a container (folder) at `path`; an existing one is fine
    fn ensure_container(&self, path: &str) -> Result<()>;

    /// Store binary data at `path`
    fn create_binary(&self, path: &str, bytes: &[u8]) -> Result<()>;

    /// Insert text at the current cursor position
    fn insert_at_cursor(&mut self, text: &str) -> Result<()>;
}

/// Fire-and-forget user notification
pub trait Notifier {
    fn notify(&self, message: &str);
}

impl<F> Notifier for F
where
    F: Fn(&str),
{
    fn notify(&self, message: &str) {
        self(message)
    }
}

/// Notifier that forwards messages to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        log::info!("{}", message);
    }
}

/// Directory part of a storage path, `None` when the path sits at the root
pub fn parent_container(path: &str) -> Option<&str> {
    match path.rfind('/') {
        Some(idx) if idx > 0 => Some(&path[..idx]),
        _ => None,
    }
}

/// `dir/filename`, or `dir/stem N.ext` with the smallest `N` for which
/// `taken` returns false
pub fn first_free_path(dir: &str, filename: &str, taken: impl Fn(&str) -> bool) -> String {
    let join = |name: &str| {
        if dir.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", dir.trim_end_matches('/'), name)
        }
    };

    let candidate = join(filename);
    if !taken(&candidate) {
        return candidate;
    }

    let (stem, ext) = match filename.rfind('.') {
        Some(idx) if idx > 0 => (&filename[..idx], &filename[idx..]),
        _ => (filename, ""),
    };

    let mut n = 1;
    loop {
        let candidate = join(&format!("{} {}{}", stem, n, ext));
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// In-memory destination document
///
/// Attachments go to `attachments/` and the cursor starts at the end of
/// the initial text.
#[derive(Debug, Default)]
pub struct MemoryDestination {
    persisted: bool,
    text: String,
    cursor: usize,
    files: RefCell<BTreeMap<String, Vec<u8>>>,
    containers: RefCell<Vec<String>>,
}

impl MemoryDestination {
    /// A saved document with the given content
    pub fn saved(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            persisted: true,
            cursor: text.len(),
            text,
            ..Default::default()
        }
    }

    /// A document with no backing storage
    pub fn unsaved() -> Self {
        Self::default()
    }

    /// Builder method: move the cursor to a byte offset (clamped to a char boundary)
    pub fn with_cursor(mut self, offset: usize) -> Self {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        self.cursor = offset;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.borrow().get(path).cloned()
    }

    pub fn file_paths(&self) -> Vec<String> {
        self.files.borrow().keys().cloned().collect()
    }

    pub fn containers(&self) -> Vec<String> {
        self.containers.borrow().clone()
    }
}

impl Destination for MemoryDestination {
    fn is_persisted(&self) -> bool {
        self.persisted
    }

    fn available_attachment_path(&self, filename: &str) -> Result<String> {
        let files = self.files.borrow();
        Ok(first_free_path("attachments", filename, |path| files.contains_key(path)))
    }

    fn ensure_container(&self, path: &str) -> Result<()> {
        let mut containers = self.containers.borrow_mut();
        if !containers.iter().any(|existing| existing == path) {
            containers.push(path.to_string());
        }
        Ok(())
    }

    fn create_binary(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let mut files = self.files.borrow_mut();
        if files.contains_key(path) {
            return Err(ClipError::Storage(format!("{} already exists", path)));
        }
        files.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    fn insert_at_cursor(&mut self, text: &str) -> Result<()> {
        self.text.insert_str(self.cursor, text);
        self.cursor += text.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_request_builder() {
        let request = FetchRequest::get("https://example.com/a.png")
            .with_header("Accept", "*/*");

        assert_eq!(request.method, "GET");
        assert_eq!(request.headers, vec![("Accept".to_string(), "*/*".to_string())]);
    }

    #[test]
    fn test_fetch_response_status() {
        assert!(FetchResponse::new(404, "").is_failure());
        assert!(FetchResponse::new(500, "").is_failure());
        assert!(!FetchResponse::new(200, "ok").is_failure());
        assert!(!FetchResponse::new(304, "").is_failure());
        assert_eq!(FetchResponse::new(200, "héllo").text(), "héllo");
    }

    #[test]
    fn test_parent_container() {
        assert_eq!(parent_container("attachments/a.png"), Some("attachments"));
        assert_eq!(parent_container("a/b/c.png"), Some("a/b"));
        assert_eq!(parent_container("a.png"), None);
        assert_eq!(parent_container("/a.png"), None);
    }

    #[test]
    fn test_first_free_path() {
        let taken = ["img/a.png", "img/a 1.png"];
        assert_eq!(
            first_free_path("img", "a.png", |p| taken.contains(&p)),
            "img/a 2.png"
        );
        assert_eq!(first_free_path("img/", "b.png", |_| false), "img/b.png");
        assert_eq!(first_free_path("", "c", |p| p == "c"), "c 1");
    }

    #[test]
    fn test_memory_destination_insertion() {
        let mut dest = MemoryDestination::saved("before|after").with_cursor(7);
        dest.insert_at_cursor("X").unwrap();
        dest.insert_at_cursor("Y").unwrap();
        assert_eq!(dest.text(), "before|XYafter");
    }

    #[test]
    fn test_memory_destination_files() {
        let dest = MemoryDestination::saved("");
        let path = dest.available_attachment_path("a.png").unwrap();
        assert_eq!(path, "attachments/a.png");

        dest.create_binary(&path, b"png").unwrap();
        assert_eq!(dest.available_attachment_path("a.png").unwrap(), "attachments/a 1.png");
        assert!(dest.create_binary(&path, b"again").is_err());
        assert_eq!(dest.file(&path), Some(b"png".to_vec()));

        dest.ensure_container("attachments").unwrap();
        dest.ensure_container("attachments").unwrap();
        assert_eq!(dest.containers(), vec!["attachments"]);
    }

    #[test]
    fn test_closure_notifier() {
        let seen = RefCell::new(Vec::new());
        let notifier = |msg: &str| seen.borrow_mut().push(msg.to_string());
        notifier.notify("hello");
        assert_eq!(seen.into_inner(), vec!["hello"]);
    }

    #[tokio::test]
    async fn test_memory_transport() {
        let transport = MemoryTransport::new().with_response("https://a.test/", 404, "gone");

        let response = transport.fetch(FetchRequest::get("https://a.test/")).await.unwrap();
        assert!(response.is_failure());
        assert_eq!(response.text(), "gone");

        let err = transport.fetch(FetchRequest::get("https://b.test/")).await.unwrap_err();
        assert!(err.is_transport_failure());
        assert_eq!(transport.requested_urls(), vec!["https://a.test/", "https://b.test/"]);
    }

    #[test]
    fn test_unsaved() {
        assert!(!MemoryDestination::unsaved().is_persisted());
        assert!(MemoryDestination::saved("x").is_persisted());
    }
}
