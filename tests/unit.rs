use flatcat::{BinaryDetection, Classifier, FsEntry, RuleSet, RuleSetBuilder, flatcat};
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

fn rel_paths(result: &flatcat::Snapshot) -> Vec<&str> {
    result.files.iter().map(|f| f.relative.as_str()).collect()
}

#[test]
fn test_basic_scan() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("hello.txt"), "hello world").unwrap();
    let result = flatcat(dir.path(), &RuleSet::default()).unwrap();
    assert_eq!(result.files.len(), 1);
    assert_eq!(result.files[0].content, "hello world");
    assert_eq!(result.files[0].header_path(), "/hello.txt");
}

#[test]
fn test_skip_patterns() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "a").unwrap();
    fs::write(dir.path().join("b.txt"), "b").unwrap();
    let rules = RuleSetBuilder::new().skip_pattern("b.*").build();
    let result = flatcat(dir.path(), &rules).unwrap();
    assert_eq!(rel_paths(&result), vec!["a.txt"]);
    assert!(!result.tree.iter().any(|l| l.ends_with("b.txt")));
}

#[test]
fn test_file_size_limit() {
    let dir = tempdir().unwrap();
    let mut f = File::create(dir.path().join("big.txt")).unwrap();
    write!(f, "{}", "A".repeat(5000)).unwrap();
    let rules = RuleSetBuilder::new().max_file_size(100).build();
    let result = flatcat(dir.path(), &rules).unwrap();
    assert!(result.files.is_empty());
    assert!(result.tree.iter().any(|l| l.ends_with("big.txt")));
}

#[test]
fn test_binary_detection_simple() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bin.txt"), vec![b'a', 0, 1, 2, 3]).unwrap();
    let rules = RuleSetBuilder::new()
        .binary_detection(BinaryDetection::Simple)
        .build();
    let result = flatcat(dir.path(), &rules).unwrap();
    assert!(result.files.is_empty());

    let rules = RuleSetBuilder::new()
        .binary_detection(BinaryDetection::None)
        .build();
    let result = flatcat(dir.path(), &rules).unwrap();
    assert_eq!(result.files.len(), 1);
}

#[test]
fn skip_dir_name_matches_at_any_depth() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let rules = RuleSetBuilder::empty()
        .skip_dir_name("node_modules")
        .skip_pattern("*.never")
        .build();
    let c = Classifier::new(root, &rules).unwrap();
    for rel in [
        "node_modules",
        "node_modules/pkg/index.js",
        "a/b/node_modules",
        "a/b/node_modules/c/x.txt",
    ] {
        assert!(c.is_excluded(&FsEntry::from_path(root.join(rel))), "{rel}");
    }
    assert!(!c.is_excluded(&FsEntry::from_path(root.join("a/node_modules_old/x.txt"))));
}

#[test]
fn exclusion_is_a_union_of_rules() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let rules = RuleSetBuilder::empty()
        .skip_dir_name("build")
        .skip_dir_path("build")
        .skip_pattern("build")
        .build();
    let only_name = RuleSetBuilder::empty().skip_dir_name("build").build();
    let all = Classifier::new(root, &rules).unwrap();
    let one = Classifier::new(root, &only_name).unwrap();
    let entry = FsEntry::from_path(root.join("build/x.o"));
    assert!(all.is_excluded(&entry));
    assert!(one.is_excluded(&entry));
}

#[test]
fn png_is_rejected_by_binary_rule() {
    let dir = tempdir().unwrap();
    let png = dir.path().join("logo.png");
    fs::write(&png, "not really a png\n").unwrap();
    let c = Classifier::new(dir.path(), &RuleSet::default()).unwrap();
    let entry = FsEntry::from_path(png);
    assert!(!c.is_excluded(&entry));
    assert!(!c.is_includable_file(&entry));
}

#[test]
fn directories_are_never_includable() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("src.txt")).unwrap();
    let c = Classifier::new(dir.path(), &RuleSet::default()).unwrap();
    assert!(!c.is_includable_file(&FsEntry::from_path(dir.path().join("src.txt"))));
}

#[test]
fn accurate_detection_accepts_utf16_with_bom() {
    let dir = tempdir().unwrap();
    let mut bytes = vec![0xff, 0xfe];
    for ch in "hello".encode_utf16() {
        bytes.extend_from_slice(&ch.to_le_bytes());
    }
    fs::write(dir.path().join("wide.txt"), bytes).unwrap();
    let rules = RuleSetBuilder::new()
        .binary_detection(BinaryDetection::Accurate)
        .build();
    let c = Classifier::new(dir.path(), &rules).unwrap();
    let entry = FsEntry::from_path(dir.path().join("wide.txt"));
    // content_inspector honours the UTF-16 BOM; the NUL check does not.
    assert!(c.is_includable_file(&entry));
    let simple = Classifier::new(dir.path(), &RuleSet::default()).unwrap();
    assert!(!simple.is_includable_file(&entry));
}
