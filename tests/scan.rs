// End-to-end scans over archives and folders built on the fly.
//
// Documents are DOCX packages generated in memory; PDFs are deliberately
// corrupt so the skip path is exercised without shipping binary fixtures.

mod common;

use std::fs;

use resumatch::report::{render_text, NONE_MARKER};
use resumatch::{parse_keywords, scan_blocking, ScanOptions, Source};

fn options() -> ScanOptions {
    ScanOptions {
        jobs: 2,
        show_progress: false,
        pattern: None,
    }
}

// ============================================================
// Archive sources
// ============================================================

#[test]
fn archive_scan_builds_all_three_reports() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resumes.zip");
    fs::write(
        &path,
        common::zip_bytes(&[
            ("resumes/alice.docx", common::docx("Rust engineer\nPython and SQL")),
            ("resumes/bob.docx", common::docx("Experienced Java and Python developer")),
            ("resumes/carol.docx", common::docx("Graphic designer")),
            ("resumes/readme.txt", b"rust python java".to_vec()),
        ]),
    )
    .unwrap();

    let source = Source::detect(&path, false).unwrap();
    let summary = scan_blocking(&source, parse_keywords("python,rust").unwrap(), &options()).unwrap();
    let report = summary.report();

    assert_eq!(report.documents_scanned, 3);
    assert!(report.skipped.is_empty());
    assert_eq!(report.all_keywords, vec!["resumes/alice.docx"]);

    let python = &report.by_keyword[0];
    assert_eq!(python.keyword, "python");
    assert_eq!(python.files, vec!["resumes/alice.docx", "resumes/bob.docx"]);
    let rust = &report.by_keyword[1];
    assert_eq!(rust.keyword, "rust");
    assert_eq!(rust.files, vec!["resumes/alice.docx"]);

    let ranking: Vec<(&str, usize)> = report
        .ranking
        .iter()
        .map(|r| (r.file.as_str(), r.matches))
        .collect();
    assert_eq!(ranking, vec![("resumes/alice.docx", 2), ("resumes/bob.docx", 1)]);
}

#[test]
fn keyword_sections_follow_archive_order_of_first_match() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resumes.zip");
    fs::write(
        &path,
        common::zip_bytes(&[
            ("alice.docx", common::docx("Rust engineer")),
            ("bob.docx", common::docx("Java and Rust")),
        ]),
    )
    .unwrap();

    let source = Source::detect(&path, false).unwrap();
    let summary = scan_blocking(&source, parse_keywords("java,rust").unwrap(), &options()).unwrap();
    let report = summary.report();

    let sections: Vec<&str> = report.by_keyword.iter().map(|s| s.keyword.as_str()).collect();
    assert_eq!(sections, vec!["rust", "java"]);
    assert_eq!(report.by_keyword[0].files, vec!["alice.docx", "bob.docx"]);
}

#[test]
fn archive_scan_skips_documents_that_fail_to_extract() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mixed.zip");
    fs::write(
        &path,
        common::zip_bytes(&[
            ("broken.pdf", b"%PDF-garbage".to_vec()),
            ("broken.docx", b"not a package".to_vec()),
            ("good.docx", common::docx("Kubernetes and Go")),
        ]),
    )
    .unwrap();

    let source = Source::detect(&path, false).unwrap();
    let summary = scan_blocking(&source, parse_keywords("go").unwrap(), &options()).unwrap();
    let report = summary.report();

    assert_eq!(report.documents_scanned, 1);
    assert_eq!(report.all_keywords, vec!["good.docx"]);
    let skipped: Vec<&str> = report.skipped.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(skipped, vec!["broken.pdf", "broken.docx"]);
}

#[test]
fn corrupt_archive_aborts_the_scan() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.zip");
    fs::write(&path, b"PK but not really").unwrap();

    let source = Source::detect(&path, false).unwrap();
    let err = scan_blocking(&source, parse_keywords("java").unwrap(), &options()).unwrap_err();
    assert!(err.to_string().contains("Error reading zip file"));
}

// ============================================================
// Folder and single-document sources
// ============================================================

#[test]
fn folder_scan_is_not_recursive_by_default() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("archive")).unwrap();
    fs::write(dir.path().join("b.docx"), common::docx("SQL")).unwrap();
    fs::write(dir.path().join("a.docx"), common::docx("sql and docker")).unwrap();
    fs::write(dir.path().join("archive/old.docx"), common::docx("sql docker")).unwrap();

    let source = Source::detect(dir.path(), false).unwrap();
    let summary = scan_blocking(&source, parse_keywords("sql,docker").unwrap(), &options()).unwrap();
    let report = summary.report();
    assert_eq!(report.documents_scanned, 2);
    assert_eq!(report.by_keyword[0].files, vec!["a.docx", "b.docx"]);

    let source = Source::detect(dir.path(), true).unwrap();
    let summary = scan_blocking(&source, parse_keywords("sql,docker").unwrap(), &options()).unwrap();
    let report = summary.report();
    assert_eq!(report.documents_scanned, 3);
    assert_eq!(report.all_keywords, vec!["a.docx", "archive/old.docx"]);
}

#[test]
fn single_document_scan() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jane.docx");
    fs::write(&path, common::docx("Experienced Java and Python developer")).unwrap();

    let source = Source::detect(&path, false).unwrap();
    let summary =
        scan_blocking(&source, parse_keywords("java,python,rust").unwrap(), &options()).unwrap();

    assert!(summary.aggregator.matched_all_keywords().is_empty());
    assert_eq!(summary.aggregator.file_keyword_matches().get("jane.docx"), Some(&2));
    assert_eq!(summary.aggregator.matched_files("java"), &["jane.docx"]);
    assert_eq!(summary.aggregator.matched_files("python"), &["jane.docx"]);
}

#[test]
fn no_matches_renders_none_marker_and_empty_ranking() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.docx"), common::docx("Accountant")).unwrap();

    let source = Source::detect(dir.path(), false).unwrap();
    let summary = scan_blocking(&source, parse_keywords("cobol").unwrap(), &options()).unwrap();
    let report = summary.report();

    assert!(report.ranking.is_empty());
    let text = render_text(&report, false);
    assert!(text.contains(&format!("Files containing all keywords:\n  {}\n", NONE_MARKER)));
    assert!(text.ends_with("File ranking according to matches (1 keywords entered):\n"));
}

#[test]
fn pattern_limits_scanned_documents() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("senior-dev.docx"), common::docx("rust")).unwrap();
    fs::write(dir.path().join("intern.docx"), common::docx("rust")).unwrap();

    let source = Source::detect(dir.path(), false).unwrap();
    let options = ScanOptions {
        pattern: Some(glob::Pattern::new("senior-*").unwrap()),
        ..options()
    };
    let summary = scan_blocking(&source, parse_keywords("rust").unwrap(), &options).unwrap();
    assert_eq!(summary.aggregator.matched_all_keywords(), &["senior-dev.docx"]);
}
