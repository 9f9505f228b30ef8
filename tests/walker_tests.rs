use ctxpack::walker::is_vanished_entry;
use ctxpack::{Formatter, PackError, RuleScope, Walker};
use std::fs;
use std::io;
use std::path::Path;
use tempfile::tempdir;

fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn walk_paths(root: &Path, extra: &[&str], scope: RuleScope) -> Vec<String> {
    let extra: Vec<String> = extra.iter().map(|s| s.to_string()).collect();
    Walker::new(root, &extra)
        .unwrap()
        .with_scope(scope)
        .walk()
        .unwrap()
        .iter()
        .map(|f| f.relative_path().to_string())
        .collect()
}

fn paths(root: &Path) -> Vec<String> {
    walk_paths(root, &[], RuleScope::Nested)
}

#[test]
fn test_binary_pattern_scenario() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("a.txt"), b"hello");
    write_file(&root.join("b.bin"), &[0xFF, 0x00, 0xFE, 0x01, 0x02]);
    write_file(&root.join(".gitignore"), b"*.bin\n");
    write_file(&root.join("sub/c.txt"), b"world");

    let expected = vec![".gitignore", "a.txt", "sub/c.txt"];
    assert_eq!(walk_paths(root, &[], RuleScope::Nested), expected);
    assert_eq!(walk_paths(root, &[], RuleScope::RootOnly), expected);
}

#[test]
fn test_extra_patterns_behave_like_root_rules() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("a.txt"), b"hello");
    write_file(&root.join("b.bin"), b"not really binary");
    write_file(&root.join("sub/c.txt"), b"world");
    write_file(&root.join("sub/d.bin"), b"also text");

    let files = Walker::new(root, &["*.bin".to_string()])
        .unwrap()
        .walk()
        .unwrap();
    let formatter = Formatter::new(files);
    assert_eq!(
        formatter.render(),
        b"File: a.txt\nhello\n\nFile: sub/c.txt\nworld".to_vec()
    );
}

#[test]
fn test_extra_patterns_skip_blanks_and_comments() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("a.txt"), b"a");
    write_file(&root.join("b.tmp"), b"b");

    assert_eq!(
        walk_paths(root, &["", "# *.txt", "  *.tmp  "], RuleScope::Nested),
        vec!["a.txt"]
    );
}

#[test]
fn test_git_directory_is_skipped() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join(".git/config"), b"[core]");
    write_file(&root.join("nested/.git/HEAD"), b"ref: refs/heads/main");
    write_file(&root.join("main.rs"), b"fn main() {}");

    assert_eq!(paths(root), vec!["main.rs"]);
}

#[test]
fn test_directory_marker_excludes_directories_at_any_depth() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join(".gitignore"), b"build/\n");
    write_file(&root.join("build/out.txt"), b"out");
    write_file(&root.join("src/build/gen.txt"), b"gen");
    write_file(&root.join("src/main.rs"), b"fn main() {}");

    assert_eq!(paths(root), vec![".gitignore", "src/main.rs"]);
}

#[test]
fn test_ignored_directory_hides_its_own_rules_and_files() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join(".gitignore"), b"vendor\n");
    write_file(&root.join("vendor/.gitignore"), b"!keep.txt\n");
    write_file(&root.join("vendor/keep.txt"), b"keep");
    write_file(&root.join("lib.rs"), b"pub fn f() {}");

    assert_eq!(paths(root), vec![".gitignore", "lib.rs"]);
}

#[test]
fn test_anchored_pattern_matches_only_at_root() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join(".gitignore"), b"/only_root.txt\n");
    write_file(&root.join("only_root.txt"), b"root");
    write_file(&root.join("sub/only_root.txt"), b"nested");

    assert_eq!(paths(root), vec![".gitignore", "sub/only_root.txt"]);
}

#[test]
fn test_path_pattern_matches_full_relative_path() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join(".gitignore"), b"docs/*.md\n");
    write_file(&root.join("docs/a.md"), b"a");
    write_file(&root.join("docs/deep/b.md"), b"b");
    write_file(&root.join("other/docs/c.md"), b"c");

    assert_eq!(
        paths(root),
        vec![".gitignore", "docs/deep/b.md", "other/docs/c.md"]
    );
}

#[test]
fn test_question_mark_and_literal_brackets() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join(".gitignore"), b"file?.txt\n[ab].txt\n");
    write_file(&root.join("file1.txt"), b"1");
    write_file(&root.join("file10.txt"), b"10");
    write_file(&root.join("a.txt"), b"a");
    write_file(&root.join("[ab].txt"), b"literal");

    assert_eq!(paths(root), vec![".gitignore", "a.txt", "file10.txt"]);
}

#[test]
fn test_gitignore_comments_and_blank_lines() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join(".gitignore"), b"# *.txt\n\n   \n  *.tmp  \n");
    write_file(&root.join("a.txt"), b"a");
    write_file(&root.join("b.tmp"), b"b");

    assert_eq!(paths(root), vec![".gitignore", "a.txt"]);
}

#[test]
fn test_empty_and_binary_files_are_excluded() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("empty.txt"), b"");
    write_file(&root.join("image.png"), b"\x89PNG\x0D\x0A\x1A\x0A\x00\x00\x00\x0DIHDR");
    write_file(&root.join("doc.pdf"), b"%PDF-1.4\n%...");
    write_file(&root.join("notes.txt"), b"notes");

    let files = Walker::new(root, &[]).unwrap().walk().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].relative_path(), "notes.txt");

    // notes.txt: (9 + 7 + 5) / 4
    assert_eq!(Formatter::new(files).estimate_tokens(), 5);
}

#[test]
fn test_nested_rules_apply_to_their_subtree_only() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("x.log"), b"root log");
    write_file(&root.join("sub/.gitignore"), b"*.log\n/local.txt\n");
    write_file(&root.join("sub/x.log"), b"sub log");
    write_file(&root.join("sub/local.txt"), b"local");
    write_file(&root.join("sub/deeper/local.txt"), b"deeper");
    write_file(&root.join("sub/deeper/y.log"), b"deeper log");
    write_file(&root.join("sibling/z.log"), b"sibling log");

    assert_eq!(
        paths(root),
        vec![
            "sibling/z.log",
            "sub/.gitignore",
            "sub/deeper/local.txt",
            "x.log"
        ]
    );
}

#[test]
fn test_nested_path_rules_are_relative_to_their_directory() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("sub/.gitignore"), b"deeper/*.txt\n");
    write_file(&root.join("sub/deeper/a.txt"), b"excluded");
    write_file(&root.join("sub/deeper/b.md"), b"kept");
    write_file(&root.join("sub/keep.txt"), b"kept");
    write_file(&root.join("deeper/a.txt"), b"outside sub");

    assert_eq!(
        paths(root),
        vec![
            "deeper/a.txt",
            "sub/.gitignore",
            "sub/deeper/b.md",
            "sub/keep.txt"
        ]
    );
}

#[test]
fn test_root_only_scope_ignores_nested_rules() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join(".gitignore"), b"*.tmp\n");
    write_file(&root.join("sub/.gitignore"), b"*.log\n");
    write_file(&root.join("sub/x.log"), b"sub log");
    write_file(&root.join("sub/y.tmp"), b"tmp");

    assert_eq!(
        walk_paths(root, &[], RuleScope::RootOnly),
        vec![".gitignore", "sub/.gitignore", "sub/x.log"]
    );
    assert_eq!(
        walk_paths(root, &[], RuleScope::Nested),
        vec![".gitignore", "sub/.gitignore"]
    );
}

#[test]
fn test_walk_is_deterministic() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    for name in ["zeta.txt", "alpha.txt", "mid/b.txt", "mid/a.txt", "Upper.txt"] {
        write_file(&root.join(name), name.as_bytes());
    }

    let first = Walker::new(root, &[]).unwrap().walk().unwrap();
    let second = Walker::new(root, &[]).unwrap().walk().unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.iter().map(|f| f.relative_path()).collect::<Vec<_>>(),
        vec!["Upper.txt", "alpha.txt", "mid/a.txt", "mid/b.txt", "zeta.txt"]
    );
    assert_eq!(
        Formatter::new(first).render(),
        Formatter::new(second).render()
    );
}

#[test]
fn test_file_contents_are_read_verbatim() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let content = "line one\r\nlíne twö\n\ttabbed\n".as_bytes();
    write_file(&root.join("mixed.txt"), content);

    let files = Walker::new(root, &[]).unwrap().walk().unwrap();
    assert_eq!(files[0].content(), content);
}

#[test]
fn test_missing_root_is_a_traversal_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    let result = Walker::new(&missing, &[]).unwrap().walk();
    assert!(
        matches!(result, Err(PackError::Traversal { .. })),
        "Expected traversal error, got {:?}",
        result
    );
}

#[test]
fn test_parent_components_are_not_cleaned() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.txt"), b"a");
    let through_missing = dir.path().join("missing").join("..");

    let walker = Walker::new(&through_missing, &[]).unwrap();
    assert!(walker.root().ends_with("missing/.."));
    assert!(matches!(walker.walk(), Err(PackError::Traversal { .. })));
}

#[test]
fn test_only_missing_entries_below_root_count_as_vanished() {
    let not_found = io::Error::from(io::ErrorKind::NotFound);
    let denied = io::Error::from(io::ErrorKind::PermissionDenied);

    assert!(is_vanished_entry(1, Some(&not_found)));
    assert!(is_vanished_entry(3, Some(&not_found)));
    assert!(!is_vanished_entry(0, Some(&not_found)));
    assert!(!is_vanished_entry(1, Some(&denied)));
    assert!(!is_vanished_entry(1, None));
}

#[test]
fn test_root_is_resolved_to_absolute() {
    let walker = Walker::new("", &[]).unwrap();
    assert!(walker.root().is_absolute());
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_followed() {
    use std::os::unix::fs::symlink;

    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("real/file.txt"), b"real");
    symlink(root, root.join("real/loop")).unwrap();
    symlink(root.join("real/file.txt"), root.join("link.txt")).unwrap();

    assert_eq!(paths(root), vec!["real/file.txt"]);
}

#[cfg(unix)]
fn lock_dir(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o000)).unwrap();
    // Privileged users can still list the directory.
    fs::read_dir(path).is_err()
}

#[cfg(unix)]
fn unlock_dir(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_aborts_walk_after_earlier_files() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join("a.txt"), b"collected first");
    write_file(&root.join("locked/secret.txt"), b"secret");
    let locked = root.join("locked");

    if !lock_dir(&locked) {
        unlock_dir(&locked);
        return;
    }
    let result = Walker::new(root, &[]).unwrap().walk();
    unlock_dir(&locked);

    match result {
        Err(PackError::Traversal { path, source }) => {
            assert!(path.ends_with("locked"), "unexpected path {}", path.display());
            assert_eq!(
                source.io_error().map(|e| e.kind()),
                Some(io::ErrorKind::PermissionDenied)
            );
        }
        other => panic!("Expected traversal error, got {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn test_ignored_unreadable_directory_is_never_listed() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write_file(&root.join(".gitignore"), b"locked/\n");
    write_file(&root.join("a.txt"), b"a");
    write_file(&root.join("locked/secret.txt"), b"secret");
    let locked = root.join("locked");

    if !lock_dir(&locked) {
        unlock_dir(&locked);
        return;
    }
    let result = Walker::new(root, &[]).unwrap().walk();
    unlock_dir(&locked);

    let files = result.unwrap();
    let paths: Vec<&str> = files.iter().map(|f| f.relative_path()).collect();
    assert_eq!(paths, vec![".gitignore", "a.txt"]);
}
