use crate::classify::Classifier;
use crate::error::{FlatcatError, Result};
use crate::options::RuleSet;
use crate::output::failure_block;
use crate::tree::render_tree;
use crate::types::{ContentRecord, FileFailure, FsEntry, Snapshot};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Lists `dir`, drops excluded children and sorts the survivors.
///
/// Both the tree renderer and the content stream go through here, so they
/// always see the same children in the same order.
pub(crate) fn list_children(dir: &Path, classifier: &Classifier) -> io::Result<Vec<FsEntry>> {
    let mut children = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = FsEntry::from_dir_entry(entry?);
        if !classifier.is_excluded(&entry) {
            children.push(entry);
        }
    }
    children.sort_by(|a, b| a.listing_order(b));
    Ok(children)
}

/// Expands a leading `~`, canonicalises the path and checks it is a directory.
pub fn resolve_root(root: impl AsRef<Path>) -> Result<PathBuf> {
    let raw = root.as_ref().to_string_lossy();
    let expanded = PathBuf::from(shellexpand::tilde(&raw).as_ref());
    let resolved = fs::canonicalize(&expanded).unwrap_or(expanded);
    if !resolved.is_dir() {
        return Err(FlatcatError::NotADirectory(resolved));
    }
    Ok(resolved)
}

/// Decodes file bytes as UTF-8, falling back to Latin-1, which cannot fail.
/// Line endings are normalised to `\n`.
pub(crate) fn decode_text(bytes: Vec<u8>) -> String {
    let text = String::from_utf8(bytes)
        .unwrap_or_else(|e| e.into_bytes().iter().map(|&b| char::from(b)).collect());
    if text.contains('\r') {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text
    }
}

fn read_record(entry: FsEntry, classifier: &Classifier) -> Result<ContentRecord> {
    let relative = classifier.relative_path(&entry.path)?;
    let (content, read_failed) = match fs::read(&entry.path) {
        Ok(bytes) => (decode_text(bytes), false),
        Err(e) => {
            tracing::warn!("could not read {}: {}", entry.path.display(), e);
            (
                format!("[flatcat: I/O error reading file {}: {}]\n", entry.name, e),
                true,
            )
        }
    };
    Ok(ContentRecord {
        path: entry.path,
        relative,
        content,
        read_failed,
    })
}

/// Depth-first iterator over every includable file, in tree order.
///
/// Only metadata and the sniffed head of each file are read. A directory that
/// cannot be listed yields one `Err` and its subtree is skipped; iteration
/// then carries on with the next sibling.
pub struct IncludedFiles<'a> {
    classifier: &'a Classifier,
    stack: Vec<std::vec::IntoIter<FsEntry>>,
    pending: Option<FlatcatError>,
}

impl<'a> IncludedFiles<'a> {
    pub fn new(classifier: &'a Classifier) -> Self {
        let root = classifier.root();
        let (stack, pending) = match list_children(root, classifier) {
            Ok(children) => (vec![children.into_iter()], None),
            Err(e) => (Vec::new(), Some(FlatcatError::read_dir(root, e))),
        };
        Self {
            classifier,
            stack,
            pending,
        }
    }
}

impl Iterator for IncludedFiles<'_> {
    type Item = Result<FsEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending.take() {
            return Some(Err(err));
        }
        loop {
            let level = self.stack.last_mut()?;
            let Some(entry) = level.next() else {
                self.stack.pop();
                continue;
            };
            if entry.is_dir() {
                match list_children(&entry.path, self.classifier) {
                    Ok(children) => self.stack.push(children.into_iter()),
                    Err(e) => return Some(Err(FlatcatError::read_dir(entry.path, e))),
                }
            } else if self.classifier.is_includable_file(&entry) {
                return Some(Ok(entry));
            }
        }
    }
}

/// Depth-first iterator over the content records of every includable file.
///
/// Errors are passed through from [`IncludedFiles`].
pub struct ContentStream<'a> {
    classifier: &'a Classifier,
    files: IncludedFiles<'a>,
}

impl<'a> ContentStream<'a> {
    pub fn new(classifier: &'a Classifier) -> Self {
        Self {
            classifier,
            files: IncludedFiles::new(classifier),
        }
    }
}

impl Iterator for ContentStream<'_> {
    type Item = Result<ContentRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.files.next()?;
        Some(entry.and_then(|entry| read_record(entry, self.classifier)))
    }
}

/// Renders the tree and drains the content stream into a [`Snapshot`].
///
/// Directory errors land in [`Snapshot::warnings`]. Per-file errors are kept
/// as [`FileFailure`]s at their traversal position, so the text rendering of
/// the snapshot matches [`write_document`](crate::output::write_document).
pub fn collect(classifier: &Classifier) -> Snapshot {
    let tree = render_tree(classifier)
        .iter()
        .map(ToString::to_string)
        .collect();
    let mut snapshot = Snapshot {
        tree,
        ..Default::default()
    };
    for item in ContentStream::new(classifier) {
        match item {
            Ok(record) => snapshot.files.push(record),
            Err(e) if e.is_directory_error() => {
                tracing::warn!("{}", e);
                snapshot.warnings.push(e.to_string());
            }
            Err(e) => {
                tracing::error!("{}", e);
                snapshot.failures.push(FileFailure {
                    position: snapshot.files.len(),
                    message: failure_block(&e),
                });
                snapshot.warnings.push(e.to_string());
            }
        }
    }
    snapshot
}

/// Walks `root` with `rules` and collects the tree and every content record.
///
/// Fails only before traversal: the root is not a directory, or the rules
/// do not compile. Per-entry problems end up in [`Snapshot::warnings`] and,
/// for single files, [`Snapshot::failures`].
pub fn flatcat(root: impl AsRef<Path>, rules: &RuleSet) -> Result<Snapshot> {
    let root = resolve_root(root)?;
    tracing::debug!("Starting flatcat with root: {}", root.display());
    let classifier = Classifier::new(root, rules)?;
    Ok(collect(&classifier))
}
