use pathclip::clipboard::ClipboardSink;
use pathclip::config::Config;
use pathclip::copy::{BasicClipboardCopier, ClipboardCopier, CopyOptions};
use pathclip::errors::PathClipError;
use pathclip::formatter::OutputFormat;
use pathclip::reporting::{collect_stats, render_stats, summarize};
use pathclip::resolver::PathResolver;
use std::path::Path;
use tempfile::tempdir;
use tokio::fs;

#[derive(Default)]
struct MemoryClipboard {
    writes: Vec<String>,
}

impl ClipboardSink for MemoryClipboard {
    fn write(&mut self, text: &str) -> Result<(), PathClipError> {
        self.writes.push(text.to_owned());
        Ok(())
    }
}

struct BrokenClipboard;

impl ClipboardSink for BrokenClipboard {
    fn write(&mut self, _text: &str) -> Result<(), PathClipError> {
        Err(PathClipError::ClipboardWriteError("no display".to_owned()))
    }
}

fn options(format: OutputFormat, include_headers: bool) -> CopyOptions {
    CopyOptions {
        format,
        include_headers,
        tokenizer_model: None,
        ..CopyOptions::default()
    }
}

fn copier(base: &Path, options: CopyOptions) -> BasicClipboardCopier {
    BasicClipboardCopier::with_resolver(options, PathResolver::with_base_dir(base))
}

#[tokio::test]
async fn test_copy_delivers_formatted_content_in_order() -> Result<(), PathClipError> {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.txt"), "second").await.unwrap();
    fs::write(dir.path().join("a.txt"), "first").await.unwrap();

    let mut sink = MemoryClipboard::default();
    let outcome = copier(dir.path(), options(OutputFormat::Plain, false))
        .copy_files_to_clipboard(vec!["b.txt".into(), "a.txt".into(), "b.txt".into()], &mut sink)
        .await?;

    assert!(outcome.delivered);
    assert!(outcome.aggregation.result.success);
    assert_eq!(sink.writes, vec!["second\n\nfirst".to_owned()]);
    assert_eq!(outcome.output, "second\n\nfirst");
    assert!(outcome.stats.is_none());
    Ok(())
}

#[tokio::test]
async fn test_copy_with_partial_failures_still_delivers() -> Result<(), PathClipError> {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("good.rs"), "fn ok() {}").await.unwrap();
    fs::write(dir.path().join("bad.bin"), [0xffu8, 0x00, 0xfe]).await.unwrap();

    let mut sink = MemoryClipboard::default();
    let outcome = copier(dir.path(), options(OutputFormat::Markdown, false))
        .copy_files_to_clipboard(vec!["*".into(), "absent.txt".into()], &mut sink)
        .await?;

    assert!(outcome.delivered);
    assert!(!outcome.aggregation.result.success);
    assert_eq!(outcome.aggregation.result.errors.len(), 1);
    assert_eq!(outcome.resolution.unresolved.len(), 1);
    assert_eq!(sink.writes, vec!["```rs\nfn ok() {}\n```".to_owned()]);

    let summary = summarize(&outcome.aggregation.result, &outcome.resolution.unresolved);
    assert!(summary.starts_with("Read 1 file (10 bytes)\n"));
    assert!(summary.contains("1 input could not be resolved:"));
    assert!(summary.contains("absent.txt"));
    assert!(summary.contains("1 file failed:"));
    assert!(summary.contains("[DECODE_ERROR]"));
    Ok(())
}

#[tokio::test]
async fn test_nothing_readable_leaves_clipboard_untouched() -> Result<(), PathClipError> {
    let dir = tempdir().unwrap();

    let mut sink = MemoryClipboard::default();
    let outcome = copier(dir.path(), options(OutputFormat::Xml, true))
        .copy_files_to_clipboard(vec!["missing.txt".into()], &mut sink)
        .await?;

    assert!(!outcome.delivered);
    assert!(outcome.output.is_empty());
    assert!(sink.writes.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_clipboard_failure_is_fatal() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "x").await.unwrap();

    let result = copier(dir.path(), options(OutputFormat::Plain, true))
        .copy_files_to_clipboard(vec!["a.txt".into()], &mut BrokenClipboard)
        .await;

    assert!(matches!(result, Err(PathClipError::ClipboardWriteError(_))));
}

#[tokio::test]
async fn test_size_limit_from_options_applies() -> Result<(), PathClipError> {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("small.txt"), "tiny").await.unwrap();
    fs::write(dir.path().join("large.txt"), "x".repeat(64)).await.unwrap();

    let mut opts = options(OutputFormat::Plain, false);
    opts.max_file_size = 16;
    let mut sink = MemoryClipboard::default();
    let outcome = copier(dir.path(), opts)
        .copy_files_to_clipboard(vec!["large.txt".into(), "small.txt".into()], &mut sink)
        .await?;

    assert_eq!(sink.writes, vec!["tiny".to_owned()]);
    assert_eq!(outcome.aggregation.result.errors.len(), 1);
    assert_eq!(outcome.aggregation.result.errors[0].code.as_str(), "SIZE_EXCEEDED");
    Ok(())
}

#[tokio::test]
async fn test_exclude_patterns_from_options() -> Result<(), PathClipError> {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src")).await.unwrap();
    fs::write(dir.path().join("src/lib.rs"), "lib").await.unwrap();
    fs::write(dir.path().join("src/generated.rs"), "gen").await.unwrap();

    let mut opts = options(OutputFormat::Plain, false);
    opts.exclude_patterns = vec!["generated.rs".to_owned()];
    let mut sink = MemoryClipboard::default();
    copier(dir.path(), opts)
        .copy_files_to_clipboard(vec!["src".into()], &mut sink)
        .await?;

    assert_eq!(sink.writes, vec!["lib".to_owned()]);
    Ok(())
}

#[tokio::test]
async fn test_stored_entries_are_read_without_pattern_expansion() -> Result<(), PathClipError> {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("notes[1].txt"), "stored").await.unwrap();

    let resolver = PathResolver::with_base_dir(dir.path());
    let mut config = Config::default();
    config.add_paths(&resolver.resolve_inputs(&["notes[1].txt".to_owned()]).paths);
    assert_eq!(config.file_paths, vec![dir.path().join("notes[1].txt")]);

    // Would match the stored name if it were treated as a pattern.
    fs::write(dir.path().join("notes1.txt"), "impostor").await.unwrap();

    let mut sink = MemoryClipboard::default();
    let outcome = copier(dir.path(), options(OutputFormat::Plain, false))
        .copy_entries(&config.file_paths, &mut sink)
        .await?;

    assert!(outcome.delivered);
    assert_eq!(sink.writes, vec!["stored".to_owned()]);
    Ok(())
}

#[tokio::test]
async fn test_stored_entries_ignore_excludes_and_report_vanished_files() -> Result<(), PathClipError> {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("generated.rs"), "gen").await.unwrap();
    let entries = vec![
        dir.path().join("generated.rs"),
        dir.path().join("deleted.rs"),
        dir.path().join("generated.rs"),
    ];

    let mut opts = options(OutputFormat::Plain, false);
    opts.exclude_patterns = vec!["generated.rs".to_owned()];
    let mut sink = MemoryClipboard::default();
    let outcome = copier(dir.path(), opts)
        .copy_entries(&entries, &mut sink)
        .await?;

    assert_eq!(sink.writes, vec!["gen".to_owned()]);
    assert!(outcome.resolution.unresolved.is_empty());
    assert_eq!(outcome.aggregation.result.errors.len(), 1);
    assert_eq!(outcome.aggregation.result.errors[0].code.as_str(), "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn test_stats_tree_lists_files_under_common_root() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src/util")).await.unwrap();
    fs::write(dir.path().join("src/main.rs"), "12345").await.unwrap();
    fs::write(dir.path().join("src/util/mod.rs"), "123").await.unwrap();

    let outcome = copier(dir.path(), options(OutputFormat::Plain, false))
        .prepare(&["src".to_owned()])
        .await;
    let trie = collect_stats(&outcome.aggregation.records, None).unwrap();
    let rendered = render_stats(&trie, "src");

    assert_eq!(
        rendered,
        "src (8 bytes)\n┣━━ main.rs (5 bytes)\n┗━━ util/ (3 bytes)\n    ┗━━ mod.rs (3 bytes)\n"
    );
}
