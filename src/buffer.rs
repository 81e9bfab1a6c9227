//! Bounded per-source line buffers.
//!
//! Each followed file owns one [`LineBuffer`]. The ingest task for that file is
//! the only writer; the render tick and the command layer read copies. Lines
//! and bookmarks sit behind the same mutex so a snapshot and its bookmarks are
//! always taken at one instant.

use std::collections::{BTreeMap, VecDeque};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{LogwallError, Result};

/// Bookmarks are keyed by absolute line sequence number (lines ever appended
/// before it), so eviction never makes one point at a different line.
struct Inner {
    lines: VecDeque<String>,
    /// Sequence number of `lines[0]`, i.e. how many lines have been evicted
    first_seq: u64,
    bookmarks: BTreeMap<u64, String>,
    /// Last error reported by the source feeding this buffer
    source_error: Option<String>,
}

/// A point-in-time copy of a buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BufferSnapshot {
    pub lines: Vec<String>,
    /// Sequence number of `lines[0]`
    pub first_seq: u64,
    /// Bookmarks whose line is still held, keyed by index into `lines`
    pub bookmarks: BTreeMap<usize, String>,
}

/// One bookmark as shown in the bookmark list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookmarkEntry {
    /// Absolute sequence number of the bookmarked line
    pub seq: u64,
    /// Index in the current contents, `None` once the line has been evicted
    pub index: Option<usize>,
    pub content: String,
}

pub struct LineBuffer {
    name: String,
    capacity: usize,
    inner: Mutex<Inner>,
}

impl LineBuffer {
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name: name.into(),
            capacity,
            inner: Mutex::new(Inner {
                lines: VecDeque::with_capacity(capacity),
                first_seq: 0,
                bookmarks: BTreeMap::new(),
                source_error: None,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.inner.lock().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a line, evicting from the head by exactly the overflow.
    pub fn append(&self, line: String) {
        let mut inner = self.inner.lock();
        inner.lines.push_back(line);
        let overflow = inner.lines.len().saturating_sub(self.capacity);
        if overflow > 0 {
            inner.lines.drain(..overflow);
            inner.first_seq += overflow as u64;
        }
    }

    /// Copy of the current lines.
    pub fn snapshot(&self) -> Vec<String> {
        self.inner.lock().lines.iter().cloned().collect()
    }

    /// Lines and live bookmarks, taken under one lock.
    pub fn snapshot_with_bookmarks(&self) -> BufferSnapshot {
        let inner = self.inner.lock();
        BufferSnapshot {
            lines: inner.lines.iter().cloned().collect(),
            first_seq: inner.first_seq,
            bookmarks: live_bookmarks(&inner),
        }
    }

    /// Record a bookmark at `index` in the current contents. Re-adding the same
    /// index replaces the content.
    pub fn add_bookmark(&self, index: usize, content: impl Into<String>) {
        let mut inner = self.inner.lock();
        let seq = inner.first_seq + index as u64;
        inner.bookmarks.insert(seq, content.into());
    }

    /// Bookmark the most recent line. Returns its index, or `None` when the
    /// buffer is still empty.
    pub fn bookmark_latest(&self) -> Option<usize> {
        let mut inner = self.inner.lock();
        let index = inner.lines.len().checked_sub(1)?;
        let content = inner.lines[index].clone();
        let seq = inner.first_seq + index as u64;
        inner.bookmarks.insert(seq, content);
        Some(index)
    }

    /// Bookmarks whose line is still held, keyed by current index.
    pub fn bookmarks(&self) -> BTreeMap<usize, String> {
        live_bookmarks(&self.inner.lock())
    }

    /// Every bookmark in the order it was placed in the stream, including
    /// those whose line has since been evicted.
    pub fn bookmark_entries(&self) -> Vec<BookmarkEntry> {
        let inner = self.inner.lock();
        inner
            .bookmarks
            .iter()
            .map(|(&seq, content)| BookmarkEntry {
                seq,
                index: seq
                    .checked_sub(inner.first_seq)
                    .map(|i| i as usize),
                content: content.clone(),
            })
            .collect()
    }

    /// Snapshot lines that satisfy `predicate`, in buffer order. `None` keeps
    /// every line.
    pub fn export_filtered(&self, predicate: Option<&dyn Fn(&str) -> bool>) -> Vec<String> {
        let lines = self.snapshot();
        match predicate {
            None => lines,
            Some(keep) => lines.into_iter().filter(|line| keep(line)).collect(),
        }
    }

    /// Write every bookmark's content to `path`, one escaped line each.
    /// Returns the number of bookmarks written.
    pub fn save_bookmarks(&self, path: &Path) -> Result<usize> {
        // Copy out first so the lock is not held while writing
        let contents: Vec<String> = self.inner.lock().bookmarks.values().cloned().collect();

        let io_err = |source| LogwallError::ExportIo {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        for content in &contents {
            writeln!(writer, "{}", escape_bookmark(content)).map_err(io_err)?;
        }
        writer.flush().map_err(io_err)?;

        debug!(source = %self.name, path = %path.display(), count = contents.len(), "saved bookmarks");
        Ok(contents.len())
    }

    pub fn set_source_error(&self, message: impl Into<String>) {
        self.inner.lock().source_error = Some(message.into());
    }

    pub fn source_error(&self) -> Option<String> {
        self.inner.lock().source_error.clone()
    }
}

fn live_bookmarks(inner: &Inner) -> BTreeMap<usize, String> {
    inner
        .bookmarks
        .range(inner.first_seq..)
        .map(|(&seq, content)| ((seq - inner.first_seq) as usize, content.clone()))
        .collect()
}

/// Escape a bookmark for the export file. Regex meta-characters are escaped
/// so each exported line can be pasted straight back in as a filter; newlines
/// and tabs are written as `\n`/`\t` to keep one bookmark per line.
pub fn escape_bookmark(content: &str) -> String {
    regex::escape(content)
        .replace('\r', "\\r")
        .replace('\n', "\\n")
        .replace('\t', "\\t")
}

/// The ordered, fixed set of buffers. Index = panel.
#[derive(Clone, Default)]
pub struct BufferRegistry {
    buffers: Vec<Arc<LineBuffer>>,
}

impl BufferRegistry {
    pub fn new(buffers: Vec<Arc<LineBuffer>>) -> Self {
        Self { buffers }
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<LineBuffer>> {
        self.buffers.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<LineBuffer>> {
        self.buffers.iter()
    }
}
