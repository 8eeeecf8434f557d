//! Markdown note on disk used as the clip destination by the CLI

use crate::error::{ClipError, Result};
use crate::host::{Destination, first_free_path};
use std::fs;
use std::path::{Path, PathBuf};

/// Folder, next to the note, that receives downloaded images
pub const ATTACHMENT_DIR: &str = "attachments";

/// Where clipped text goes in the note
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsertPosition {
    /// Append to the end of the file
    #[default]
    End,
    /// Before the given 0-based line, clamped to the end of the file
    Line(usize),
}

/// A note file
///
/// Attachment paths handed out are relative to the note's directory, so the
/// rewritten image references resolve from the note itself. Every insertion
/// is written through to disk.
#[derive(Debug)]
pub struct NoteFile {
    path: PathBuf,
    position: InsertPosition,
    cursor: Option<usize>,
}

impl NoteFile {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            position: InsertPosition::End,
            cursor: None,
        }
    }

    /// Builder method: set where the first insertion lands
    pub fn at(mut self, position: InsertPosition) -> Self {
        self.position = position;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn base_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        self.base_dir().join(relative)
    }

    /// Byte offset for the configured position in `content`
    fn initial_cursor(&self, content: &str) -> usize {
        match self.position {
            InsertPosition::End => content.len(),
            InsertPosition::Line(line) => line_offset(content, line),
        }
    }
}

/// Byte offset of the start of 0-based `line`, or the end of `content`
pub fn line_offset(content: &str, line: usize) -> usize {
    if line == 0 {
        return 0;
    }
    content
        .match_indices('\n')
        .nth(line - 1)
        .map(|(idx, _)| idx + 1)
        .unwrap_or(content.len())
}

impl Destination for NoteFile {
    fn is_persisted(&self) -> bool {
        self.path.is_file()
    }

    fn available_attachment_path(&self, filename: &str) -> Result<String> {
        Ok(first_free_path(ATTACHMENT_DIR, filename, |candidate| {
            self.resolve(candidate).exists()
        }))
    }

    fn ensure_container(&self, path: &str) -> Result<()> {
        fs::create_dir_all(self.resolve(path))?;
        Ok(())
    }

    fn create_binary(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let target = self.resolve(path);
        if target.exists() {
            return Err(ClipError::Storage(format!("{} already exists", target.display())));
        }
        fs::write(&target, bytes)
            .map_err(|e| ClipError::Storage(format!("Failed to write {}: {}", target.display(), e)))
    }

    fn insert_at_cursor(&mut self, text: &str) -> Result<()> {
        let mut content = fs::read_to_string(&self.path)?;
        let cursor = self
            .cursor
            .unwrap_or_else(|| self.initial_cursor(&content))
            .min(content.len());

        content.insert_str(cursor, text);
        fs::write(&self.path, &content)?;

        self.cursor = Some(cursor + text.len());
        log::debug!("Inserted {} bytes into {} at offset {}", text.len(), self.path.display(), cursor);
        Ok(())
    }
}
