//! Internal module for rendering the pruned directory tree.

use crate::classify::Classifier;
use crate::engine::list_children;
use crate::types::TreeLine;
use std::path::Path;

/// Label of the synthetic line that stands for the traversal root.
pub const ROOT_LABEL: &str = "./";

/// Renders the tree below the classifier's root.
///
/// The first line is the root itself; top-level entries follow with an empty
/// prefix. Excluded directories are never listed. A directory that cannot be
/// read gets a single error line in place of its children.
pub(crate) fn render_tree(classifier: &Classifier) -> Vec<TreeLine> {
    let mut lines = vec![TreeLine {
        prefix: String::new(),
        depth: 0,
        is_last: true,
        label: ROOT_LABEL.to_string(),
    }];
    walk(classifier.root(), "", 1, classifier, &mut lines);
    lines
}

fn walk(
    dir: &Path,
    prefix: &str,
    depth: usize,
    classifier: &Classifier,
    lines: &mut Vec<TreeLine>,
) {
    let children = match list_children(dir, classifier) {
        Ok(children) => children,
        Err(e) => {
            lines.push(TreeLine {
                prefix: prefix.to_string(),
                depth,
                is_last: true,
                label: format!("[Error reading directory: {e}]"),
            });
            return;
        }
    };

    let count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        let line = TreeLine {
            prefix: prefix.to_string(),
            depth,
            is_last: i + 1 == count,
            label: child.name.clone(),
        };
        let child_prefix = line.child_prefix();
        lines.push(line);
        if child.is_dir() {
            walk(&child.path, &child_prefix, depth + 1, classifier, lines);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RuleSet;
    use std::fs;

    fn rendered(classifier: &Classifier) -> Vec<String> {
        render_tree(classifier).iter().map(ToString::to_string).collect()
    }

    #[test]
    fn connectors_and_continuations() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/inner")).unwrap();
        fs::write(dir.path().join("a/inner/x.h"), "").unwrap();
        fs::write(dir.path().join("a/y.h"), "").unwrap();
        fs::write(dir.path().join("z.h"), "").unwrap();
        let c = Classifier::new(dir.path(), &RuleSet::empty()).unwrap();
        assert_eq!(
            rendered(&c),
            vec![
                "└── ./",
                "├── a",
                "│   ├── inner",
                "│   │   └── x.h",
                "│   └── y.h",
                "└── z.h",
            ]
        );
    }

    #[test]
    fn last_directory_children_use_blank_continuation() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("only")).unwrap();
        fs::write(dir.path().join("only/f.c"), "").unwrap();
        let c = Classifier::new(dir.path(), &RuleSet::empty()).unwrap();
        assert_eq!(rendered(&c), vec!["└── ./", "└── only", "    └── f.c"]);
    }

    #[test]
    fn directories_sort_before_files_then_by_lowercase_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        fs::create_dir(dir.path().join("Docs")).unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        fs::write(dir.path().join("C.txt"), "").unwrap();
        let c = Classifier::new(dir.path(), &RuleSet::empty()).unwrap();
        assert_eq!(
            rendered(&c),
            vec!["└── ./", "├── b", "├── Docs", "├── a.txt", "└── C.txt"]
        );
    }

    #[test]
    fn file_sorts_after_directory_with_same_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Readme")).unwrap();
        fs::write(dir.path().join("README"), "").unwrap();
        let c = Classifier::new(dir.path(), &RuleSet::empty()).unwrap();
        assert_eq!(rendered(&c), vec!["└── ./", "├── Readme", "└── README"]);
    }
}
