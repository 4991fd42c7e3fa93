use pathclip::errors::PathClipError;
use pathclip::validator::{
    check_readable, check_size, classify_input, stat_path, validate_glob_syntax,
    validate_path_syntax, InputKind, DEFAULT_MAX_FILE_SIZE,
};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_classify_input_detects_wildcards() {
    for pattern in ["src/*.rs", "file?.txt", "[ab].md", "src/{lib,main}.rs", "**/x"] {
        assert_eq!(
            classify_input(pattern),
            InputKind::GlobPattern,
            "{} should be a pattern",
            pattern
        );
    }
    for literal in ["src/main.rs", "~/notes.txt", "/tmp/a b.txt", "."] {
        assert_eq!(classify_input(literal), InputKind::Literal, "{}", literal);
    }
}

#[test]
fn test_validate_path_syntax_rejects_empty_and_illegal_characters() {
    assert!(matches!(
        validate_path_syntax(""),
        Err(PathClipError::InvalidPath(_))
    ));
    assert!(matches!(
        validate_path_syntax("   "),
        Err(PathClipError::InvalidPath(_))
    ));
    for bad in ["a|b.txt", "a<b", "x>y", "say\"hi\".txt", "dir/na:me"] {
        assert!(
            matches!(validate_path_syntax(bad), Err(PathClipError::InvalidPath(_))),
            "{} should be rejected",
            bad
        );
    }
}

#[test]
fn test_validate_path_syntax_accepts_normal_paths() {
    for good in ["/tmp/a.txt", "relative/file.rs", "~/notes.md", "C:\\Users\\me\\a.txt", "with space.txt"] {
        assert!(validate_path_syntax(good).is_ok(), "{} should be accepted", good);
    }
}

#[test]
fn test_validate_glob_syntax_rejects_traversal_and_triple_wildcards() {
    for bad in ["../*.rs", "src/../*.rs", "src/..", "src/***/x.rs", "***"] {
        assert!(
            matches!(validate_glob_syntax(bad), Err(PathClipError::InvalidPattern(_))),
            "{} should be rejected",
            bad
        );
    }
}

#[test]
fn test_validate_glob_syntax_rejects_malformed_patterns() {
    assert!(matches!(
        validate_glob_syntax("src/{a,b.rs"),
        Err(PathClipError::InvalidPattern(_))
    ));
    assert!(matches!(
        validate_glob_syntax("a**b"),
        Err(PathClipError::InvalidPattern(_))
    ));
    assert!(matches!(
        validate_glob_syntax("[abc"),
        Err(PathClipError::InvalidPattern(_))
    ));
}

#[test]
fn test_validate_glob_syntax_accepts_common_patterns() {
    for good in ["**/*.rs", "src/*.{rs,toml}", "docs/?.md", "./src/**", "~/notes/*.txt"] {
        assert!(validate_glob_syntax(good).is_ok(), "{} should be accepted", good);
    }
}

#[test]
fn test_stat_path_reports_missing_without_error() {
    let dir = tempdir().unwrap();
    let stats = stat_path(&dir.path().join("nope.txt")).unwrap();
    assert!(!stats.exists);
    assert!(!stats.is_file);
    assert!(!stats.is_directory);
    assert_eq!(stats.size, 0);
    assert_eq!(stats.last_modified.timestamp(), 0);
}

#[test]
fn test_stat_path_describes_files_and_directories() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("a.txt");
    fs::write(&file, "hello").unwrap();

    let stats = stat_path(&file).unwrap();
    assert!(stats.exists && stats.is_file && !stats.is_directory);
    assert_eq!(stats.size, 5);
    assert!(stats.last_modified.timestamp() > 0);

    let stats = stat_path(dir.path()).unwrap();
    assert!(stats.exists && stats.is_directory && !stats.is_file);
}

#[test]
fn test_check_size_enforces_limit() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("big.txt");
    fs::write(&file, "0123456789").unwrap();

    assert!(check_size(&file, 10).is_ok());
    assert!(check_size(&file, DEFAULT_MAX_FILE_SIZE).is_ok());
    match check_size(&file, 9) {
        Err(PathClipError::SizeExceeded { size, max, .. }) => {
            assert_eq!(size, 10);
            assert_eq!(max, 9);
        }
        other => panic!("expected SizeExceeded, got {:?}", other),
    }
    assert!(matches!(
        check_size(&dir.path().join("missing"), 9),
        Err(PathClipError::NotFound(_))
    ));
}

#[test]
fn test_check_readable() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("r.txt");
    fs::write(&file, "x").unwrap();
    assert!(check_readable(&file).is_ok());
    assert!(matches!(
        check_readable(&dir.path().join("missing.txt")),
        Err(PathClipError::NotFound(_))
    ));
}

#[cfg(unix)]
#[test]
fn test_check_readable_reports_permission_error() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let file = dir.path().join("secret.txt");
    fs::write(&file, "x").unwrap();
    fs::set_permissions(&file, fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores file modes.
    if fs::File::open(&file).is_ok() {
        return;
    }
    assert!(matches!(
        check_readable(&file),
        Err(PathClipError::PermissionError(_))
    ));
}
