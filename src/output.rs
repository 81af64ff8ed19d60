//! Output composition for flatcat.
//!
//! The text document is written straight to any [`Write`] sink while the
//! content stream runs, so memory use stays bounded by the largest file.
//! A collected [`Snapshot`] can also be formatted as the same text or as JSON.

use crate::classify::Classifier;
use crate::engine::ContentStream;
use crate::error::{FlatcatError, Result};
use crate::tree::render_tree;
use crate::types::{ContentRecord, DumpSummary, Snapshot};
use std::borrow::Cow;
use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub const DOCUMENT_HEADER: &str = "Directory Structure:\n\n";

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Appends a newline unless `content` already ends with one.
pub fn ensure_trailing_newline(content: &str) -> Cow<'_, str> {
    if content.ends_with('\n') {
        Cow::Borrowed(content)
    } else {
        Cow::Owned(format!("{content}\n"))
    }
}

/// Writes the document header and the tree, followed by a blank line.
pub fn write_tree<W, L>(out: &mut W, lines: &[L]) -> Result<()>
where
    W: Write + ?Sized,
    L: Display,
{
    out.write_all(DOCUMENT_HEADER.as_bytes())
        .map_err(FlatcatError::Write)?;
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.write_all(b"\n").map_err(FlatcatError::Write)?;
        }
        write!(out, "{line}").map_err(FlatcatError::Write)?;
    }
    out.write_all(b"\n\n").map_err(FlatcatError::Write)
}

/// Writes one `---`/`File:`/`---` record.
pub fn write_record<W: Write + ?Sized>(out: &mut W, record: &ContentRecord) -> Result<()> {
    write!(
        out,
        "---\nFile: {}\n---\n\n{}\n",
        record.header_path(),
        ensure_trailing_newline(&record.content)
    )
    .map_err(FlatcatError::Write)
}

/// The inline block that stands in for a file that could not be processed.
pub(crate) fn failure_block(err: &FlatcatError) -> String {
    let path = match err {
        FlatcatError::InvalidPath(path) | FlatcatError::Io { path, .. } => {
            path.display().to_string()
        }
        _ => "<unknown>".to_string(),
    };
    format!("[flatcat: Unexpected error processing file {path}: {err}]\n\n")
}

/// Renders the tree and streams every content record into `out`.
///
/// Problems with single directories or files never abort the dump: a file
/// error becomes an inline diagnostic block, a directory error is logged and
/// its subtree skipped. Only failures to write to `out` are returned.
pub fn write_document<W: Write + ?Sized>(
    classifier: &Classifier,
    out: &mut W,
) -> Result<DumpSummary> {
    let tree = render_tree(classifier);
    write_tree(out, &tree)?;

    let mut summary = DumpSummary::default();
    for item in ContentStream::new(classifier) {
        match item {
            Ok(record) => {
                write_record(out, &record)?;
                summary.records += 1;
                if record.read_failed {
                    summary.failed_records += 1;
                }
            }
            Err(e) if e.is_directory_error() => {
                tracing::warn!("[Warning: {}]", e);
                summary.skipped_dirs += 1;
            }
            Err(e) => {
                tracing::error!("{}", e);
                out.write_all(failure_block(&e).as_bytes())
                    .map_err(FlatcatError::Write)?;
                summary.failed_records += 1;
            }
        }
    }
    out.flush().map_err(FlatcatError::Write)?;
    tracing::debug!(
        "wrote {} records ({} failed), skipped {} directories",
        summary.records,
        summary.failed_records,
        summary.skipped_dirs
    );
    Ok(summary)
}

/// Formats a collected snapshot into a string.
///
/// Text output is the same document [`write_document`] produces for the
/// same run, failure blocks included.
pub fn format_snapshot(
    snapshot: &Snapshot,
    format: OutputFormat,
    pretty: bool,
) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut buf = Vec::with_capacity(1024);
            write_tree(&mut buf, &snapshot.tree)?;
            let mut failures = snapshot.failures.iter().peekable();
            for (i, record) in snapshot.files.iter().enumerate() {
                while let Some(failure) = failures.next_if(|f| f.position <= i) {
                    buf.extend_from_slice(failure.message.as_bytes());
                }
                write_record(&mut buf, record)?;
            }
            for failure in failures {
                buf.extend_from_slice(failure.message.as_bytes());
            }
            Ok(String::from_utf8_lossy(&buf).into_owned())
        }
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(snapshot)?),
        OutputFormat::Json => Ok(serde_json::to_string(snapshot)?),
    }
}

/// Opens `path` for writing, creating missing parent directories.
pub fn open_output(path: impl AsRef<Path>) -> Result<BufWriter<File>> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| FlatcatError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| FlatcatError::io(path, e))?;
    Ok(BufWriter::new(file))
}
