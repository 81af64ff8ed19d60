//! Compiled form of a [`RuleSet`].
//!
//! A [`Classifier`] answers the two questions both traversals ask about every
//! entry: is it excluded (for a directory, the whole subtree), and is it a
//! file whose text belongs in the dump. The tree renderer and the content
//! streamer hold the same classifier, so they cannot disagree about which
//! entries exist.

use crate::error::{FlatcatError, Result};
use crate::options::RuleSet;
use crate::sniff::{self, BinarySniffer};
use crate::types::FsEntry;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub struct Classifier {
    root: PathBuf,
    skip_dir_names: HashSet<String>,
    skip_dir_paths: Vec<String>,
    /// Patterns matched against every trailing run of path segments.
    floating: GlobSet,
    /// Patterns written with a leading `/`, matched against the whole path.
    anchored: GlobSet,
    gitignore: Option<Gitignore>,
    binary_extensions: HashSet<String>,
    text_extensions: HashSet<String>,
    text_names: HashSet<String>,
    max_file_size: u64,
    sniffer: Box<dyn BinarySniffer>,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("root", &self.root)
            .field("skip_dir_names", &self.skip_dir_names)
            .field("skip_dir_paths", &self.skip_dir_paths)
            .field("max_file_size", &self.max_file_size)
            .finish_non_exhaustive()
    }
}

fn normalize_dir_path(path: &str) -> String {
    path.replace('\\', "/").trim_matches('/').to_string()
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.to_lowercase();
    if ext.starts_with('.') { ext } else { format!(".{ext}") }
}

/// `cpp` or `h`: something that was almost certainly meant as `.cpp` or `.h`.
/// File names such as `Makefile` or `CMakeLists.txt` do not qualify.
fn looks_like_bare_extension(entry: &str) -> bool {
    !entry.is_empty()
        && entry
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

fn build_globs<'a>(patterns: impl Iterator<Item = &'a str>) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|source| FlatcatError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| FlatcatError::Pattern {
        pattern: "<set>".to_string(),
        source,
    })
}

fn load_gitignore(root: &Path) -> Result<Gitignore> {
    let mut builder = GitignoreBuilder::new(root);
    let file = root.join(".gitignore");
    if file.is_file() {
        if let Some(err) = builder.add(&file) {
            return Err(err.into());
        }
    }
    Ok(builder.build()?)
}

impl Classifier {
    /// Compiles `rules` for a walk rooted at `root`.
    ///
    /// Fails if a glob pattern is malformed or the root `.gitignore` cannot be
    /// parsed.
    pub fn new(root: impl Into<PathBuf>, rules: &RuleSet) -> Result<Self> {
        let root = root.into();
        let (anchored, floating): (Vec<&str>, Vec<&str>) = rules
            .skip_patterns
            .iter()
            .map(String::as_str)
            .partition(|p| p.starts_with('/'));
        let gitignore = if rules.respect_gitignore {
            Some(load_gitignore(&root)?)
        } else {
            None
        };
        let mut text_extensions = HashSet::new();
        let mut text_names = HashSet::new();
        for entry in &rules.text_extensions {
            if entry.starts_with('.') {
                text_extensions.insert(entry.to_lowercase());
            } else if looks_like_bare_extension(entry) {
                tracing::warn!(
                    "text entry '{}' has no leading dot; treating it as '.{}' and as a file name",
                    entry,
                    entry
                );
                text_extensions.insert(format!(".{entry}"));
                text_names.insert(entry.clone());
            } else {
                text_names.insert(entry.clone());
            }
        }

        Ok(Self {
            skip_dir_names: rules.skip_dir_names.iter().cloned().collect(),
            skip_dir_paths: rules
                .skip_dir_paths
                .iter()
                .map(|p| normalize_dir_path(p))
                .filter(|p| !p.is_empty())
                .collect(),
            floating: build_globs(floating.into_iter())?,
            anchored: build_globs(anchored.into_iter().map(|p| p.trim_start_matches('/')))?,
            gitignore,
            binary_extensions: rules
                .binary_extensions
                .iter()
                .map(|e| normalize_extension(e))
                .collect(),
            text_extensions,
            text_names,
            max_file_size: rules.max_file_size,
            sniffer: sniff::sniffer_for(rules.binary_detection),
            root,
        })
    }

    /// Replaces the content sniffer chosen by the rule set.
    pub fn with_sniffer(mut self, sniffer: Box<dyn BinarySniffer>) -> Self {
        self.sniffer = sniffer;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Root-relative path of `path` using `/` separators, without a leading slash.
    pub fn relative_path(&self, path: &Path) -> Result<String> {
        let rel = path
            .strip_prefix(&self.root)
            .map_err(|_| FlatcatError::InvalidPath(path.to_path_buf()))?;
        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect();
        Ok(parts.join("/"))
    }

    /// Whether `entry` is excluded by any rule. For a directory this prunes
    /// the whole subtree.
    pub fn is_excluded(&self, entry: &FsEntry) -> bool {
        let Ok(rel) = self.relative_path(&entry.path) else {
            return false;
        };
        if rel.is_empty() {
            return false;
        }
        let excluded = self.matches_dir_name(&rel)
            || self.matches_dir_path(&rel)
            || self.matches_pattern(&rel)
            || self.matches_gitignore(entry);
        if excluded {
            tracing::trace!("excluded: {}", rel);
        }
        excluded
    }

    fn matches_dir_name(&self, rel: &str) -> bool {
        rel.split('/').any(|seg| self.skip_dir_names.contains(seg))
    }

    fn matches_dir_path(&self, rel: &str) -> bool {
        self.skip_dir_paths.iter().any(|p| {
            rel == p
                || rel
                    .strip_prefix(p.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    fn matches_pattern(&self, rel: &str) -> bool {
        if self.anchored.is_match(rel) || self.floating.is_match(rel) {
            return true;
        }
        rel.match_indices('/')
            .any(|(i, _)| self.floating.is_match(&rel[i + 1..]))
    }

    fn matches_gitignore(&self, entry: &FsEntry) -> bool {
        self.gitignore
            .as_ref()
            .is_some_and(|gi| gi.matched(&entry.path, entry.is_dir()).is_ignore())
    }

    /// Whether the file's text belongs in the dump: within the size ceiling,
    /// an allowed extension or name, not a binary extension, and no binary
    /// content in its head. An unreadable head counts as "no".
    pub fn is_includable_file(&self, entry: &FsEntry) -> bool {
        if !entry.is_file() || entry.size > self.max_file_size {
            return false;
        }
        let ext = entry.extension.as_deref();
        if ext.is_some_and(|e| self.binary_extensions.contains(e)) {
            return false;
        }
        let allowed = ext.is_some_and(|e| self.text_extensions.contains(e))
            || self.text_names.contains(&entry.name);
        if !allowed {
            return false;
        }
        match sniff::sniff_file(&entry.path, self.sniffer.as_ref()) {
            Ok(is_binary) => !is_binary,
            Err(e) => {
                tracing::debug!("could not sniff {}: {}", entry.path.display(), e);
                false
            }
        }
    }
}
