use crate::error::{FlatcatError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Default ceiling for includable files: 5 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

const TEXT_EXTENSIONS: &[&str] = &[
    ".c", ".cpp", ".h", ".hpp", // C/C++
    ".ui", ".qrc", ".pro", ".pri", // Qt
    ".cmake", "CMakeLists.txt", ".sh", ".bat", ".py", // build and scripts
    ".md", ".txt", ".json", ".xml", ".yml", ".yaml", ".iss", // docs and config
    ".vert", ".frag", ".geom", // shaders
];

const SKIP_DIR_NAMES: &[&str] = &[
    ".git", ".idea", ".vs", ".claude", "build", "out", "Output", "__pycache__", "node_modules",
    "images",
];

const SKIP_DIR_PATHS: &[&str] = &["src/3rdparty", "installer", "doc", "requirements", "tests"];

const SKIP_PATTERNS: &[&str] = &[
    "*.user", "*.log", "*.sln", "slnx.sqlite", "*.suo", "*.backup", "*.bak", "*.in",
];

const BINARY_EXTENSIONS: &[&str] = &[
    ".exe", ".dll", ".so", ".a", ".lib", ".o", ".obj", // objects
    ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".ico", ".svg", ".odg", // images
    ".ttf", ".otf", ".woff", ".woff2", // fonts
    ".zip", ".7z", ".rar", ".jar", ".pdf", // archives
    ".db", ".sqlite", ".vsidx", ".ipch", ".bin", ".qm",
];

/// How the first block of a candidate file is inspected for binary content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryDetection {
    /// A single NUL byte marks the file as binary.
    #[default]
    Simple,
    /// Delegate to `content_inspector`, which also recognises UTF-16 BOMs.
    Accurate,
    /// Never treat content as binary.
    None,
}

/// Static configuration of every inclusion and exclusion rule.
///
/// A `RuleSet` is plain data. Compile it into a [`Classifier`](crate::Classifier)
/// before walking a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleSet {
    /// Directory names skipped wherever they occur below the root.
    pub skip_dir_names: BTreeSet<String>,
    /// Root-relative directory paths skipped together with their descendants.
    pub skip_dir_paths: BTreeSet<String>,
    /// Glob patterns matched against the root-relative path.
    pub skip_patterns: Vec<String>,
    /// Extensions (with leading dot) that are never read as text.
    pub binary_extensions: BTreeSet<String>,
    /// Extensions (with leading dot) or exact file names eligible for content.
    pub text_extensions: BTreeSet<String>,
    /// Files larger than this many bytes are listed but not dumped.
    pub max_file_size: u64,
    pub binary_detection: BinaryDetection,
    /// Also honour the `.gitignore` at the traversal root.
    pub respect_gitignore: bool,
}

fn owned_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            skip_dir_names: owned_set(SKIP_DIR_NAMES),
            skip_dir_paths: owned_set(SKIP_DIR_PATHS),
            skip_patterns: SKIP_PATTERNS.iter().map(|s| s.to_string()).collect(),
            binary_extensions: owned_set(BINARY_EXTENSIONS),
            text_extensions: owned_set(TEXT_EXTENSIONS),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            binary_detection: BinaryDetection::Simple,
            respect_gitignore: false,
        }
    }
}

impl RuleSet {
    /// A rule set that excludes nothing and includes nothing as text.
    pub fn empty() -> Self {
        Self {
            skip_dir_names: BTreeSet::new(),
            skip_dir_paths: BTreeSet::new(),
            skip_patterns: Vec::new(),
            binary_extensions: BTreeSet::new(),
            text_extensions: BTreeSet::new(),
            ..Default::default()
        }
    }

    /// Parses a TOML document. Missing keys fall back to the built-in defaults.
    pub fn from_toml_str(source: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Loads a rule set from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| FlatcatError::io(path, e))?;
        Self::from_toml_str(&text).map_err(|e| FlatcatError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    rules: RuleSet,
}

impl RuleSetBuilder {
    /// Starts from the built-in defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a rule set with every list empty.
    pub fn empty() -> Self {
        Self {
            rules: RuleSet::empty(),
        }
    }

    pub fn from_rules(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn skip_dir_name(mut self, name: impl Into<String>) -> Self {
        self.rules.skip_dir_names.insert(name.into());
        self
    }

    pub fn skip_dir_path(mut self, path: impl Into<String>) -> Self {
        self.rules.skip_dir_paths.insert(path.into());
        self
    }

    pub fn skip_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.rules.skip_patterns.push(pattern.into());
        self
    }

    pub fn binary_extension(mut self, ext: impl Into<String>) -> Self {
        self.rules.binary_extensions.insert(ext.into());
        self
    }

    /// Allows an extension (`.cpp`) or an exact file name (`CMakeLists.txt`).
    /// A dotless lower-case entry such as `cpp` is read as both.
    pub fn text_extension(mut self, ext_or_name: impl Into<String>) -> Self {
        self.rules.text_extensions.insert(ext_or_name.into());
        self
    }

    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.rules.max_file_size = bytes;
        self
    }

    pub fn binary_detection(mut self, method: BinaryDetection) -> Self {
        self.rules.binary_detection = method;
        self
    }

    pub fn respect_gitignore(mut self, yes: bool) -> Self {
        self.rules.respect_gitignore = yes;
        self
    }

    pub fn build(self) -> RuleSet {
        self.rules
    }
}
