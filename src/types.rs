use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::fs::{self, DirEntry};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
    /// Anything else, e.g. a dangling symlink or a socket.
    Other,
}

/// One child of a directory listing, with metadata resolved once.
///
/// Symlinks are followed, so a link to a directory is a directory.
#[derive(Debug, Clone)]
pub struct FsEntry {
    pub path: PathBuf,
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
    /// Lower-cased extension including the leading dot, e.g. `.cpp`.
    pub extension: Option<String>,
    lower_name: String,
}

impl FsEntry {
    pub fn from_path(path: PathBuf) -> Self {
        let (kind, size) = match fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => (EntryKind::Dir, 0),
            Ok(meta) if meta.is_file() => (EntryKind::File, meta.len()),
            _ => (EntryKind::Other, 0),
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()));
        Self {
            lower_name: name.to_lowercase(),
            path,
            name,
            kind,
            size,
            extension,
        }
    }

    pub(crate) fn from_dir_entry(entry: DirEntry) -> Self {
        Self::from_path(entry.path())
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Listing order shared by the tree and the content walk: the key is
    /// `(is_file, lower-cased name)`, so every non-file sorts before every
    /// file. The raw name breaks ties between names differing only in case.
    pub fn listing_order(&self, other: &Self) -> Ordering {
        self.is_file()
            .cmp(&other.is_file())
            .then_with(|| self.lower_name.cmp(&other.lower_name))
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// A single line of the rendered directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    /// Indentation inherited from the ancestors.
    pub prefix: String,
    pub depth: usize,
    pub is_last: bool,
    pub label: String,
}

impl TreeLine {
    pub const BRANCH: &'static str = "├── ";
    pub const LAST: &'static str = "└── ";
    pub const PIPE: &'static str = "│   ";
    pub const EMPTY: &'static str = "    ";

    pub fn connector(&self) -> &'static str {
        if self.is_last { Self::LAST } else { Self::BRANCH }
    }

    /// Prefix handed to the children of this line.
    pub fn child_prefix(&self) -> String {
        let continuation = if self.is_last { Self::EMPTY } else { Self::PIPE };
        format!("{}{}", self.prefix, continuation)
    }
}

impl fmt::Display for TreeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix, self.connector(), self.label)
    }
}

/// The dumped content of one includable file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// The full path to the file.
    pub path: PathBuf,
    /// Root-relative path with `/` separators and no leading slash.
    pub relative: String,
    /// Decoded text, or an inline diagnostic if the file could not be read.
    pub content: String,
    /// Set when `content` is a diagnostic rather than the file's text.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_failed: bool,
}

impl ContentRecord {
    /// The path as shown in the record header, e.g. `/src/main.cpp`.
    pub fn header_path(&self) -> String {
        format!("/{}", self.relative)
    }
}

/// A per-file error that replaced a record in the dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    /// Number of records that precede the failure in traversal order.
    pub position: usize,
    /// The inline diagnostic block, as written into the text document.
    pub message: String,
}

/// Everything a run produced, collected in memory.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Rendered tree lines, starting with the root line.
    pub tree: Vec<String>,
    /// Content records in traversal order.
    pub files: Vec<ContentRecord>,
    /// Per-file errors, rendered inline between records in text output.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FileFailure>,
    /// Per-entry problems that did not stop the run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Counters returned by [`write_document`](crate::output::write_document).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DumpSummary {
    pub records: usize,
    pub failed_records: usize,
    pub skipped_dirs: usize,
}
