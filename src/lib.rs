//! # Flatcat
//!
//! `flatcat` flattens a source tree into a single text document: a visual tree
//! of the relevant directory structure followed by the contents of every
//! relevant text file, each under a `File: /relative/path` header.
//!
//! Relevance is decided by a [`RuleSet`] compiled into a [`Classifier`]:
//!
//! - directory names skipped at any depth (`.git`, `node_modules`, ...);
//! - root-relative directory paths skipped with their subtrees (`src/3rdparty`);
//! - glob patterns matched against the root-relative path (`*.user`);
//! - binary extensions, an extension/file-name allowlist, a size ceiling and a
//!   content sniff for NUL bytes.
//!
//! Excluded directories are pruned, never listed. The tree and the content
//! stream share one classifier and one listing order, so every file whose
//! content is dumped also appears in the tree.
//!
//! # Example
//!
//! ```no_run
//! use flatcat::{Classifier, RuleSetBuilder, output, resolve_root};
//!
//! let rules = RuleSetBuilder::new()
//!     .skip_dir_name("target")
//!     .skip_pattern("*.generated.h")
//!     .build();
//! let root = resolve_root(".").expect("not a directory");
//! let classifier = Classifier::new(root, &rules).expect("invalid rules");
//!
//! let stdout = std::io::stdout();
//! let summary = output::write_document(&classifier, &mut stdout.lock()).expect("write failed");
//! eprintln!("{} files dumped", summary.records);
//! ```

mod classify;
mod engine;
mod error;
mod options;
pub mod output;
pub mod sniff;
mod tree;
mod types;

pub use classify::Classifier;
pub use engine::{ContentStream, IncludedFiles, collect, flatcat, resolve_root};
pub use error::{FlatcatError, Result};
pub use options::{BinaryDetection, DEFAULT_MAX_FILE_SIZE, RuleSet, RuleSetBuilder};
pub use sniff::BinarySniffer;
pub use types::{
    ContentRecord, DumpSummary, EntryKind, FileFailure, FsEntry, Snapshot, TreeLine,
};

/// Renders the pruned tree for `classifier`, one [`TreeLine`] per entry.
pub fn render_tree(classifier: &Classifier) -> Vec<TreeLine> {
    tree::render_tree(classifier)
}
