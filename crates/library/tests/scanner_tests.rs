//! Integration tests for upload-directory scanning

use bookden_library::UploadScanner;
use tempfile::TempDir;

#[test]
fn test_scan_mixed_tree() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("new arrivals")).unwrap();
    std::fs::write(dir.path().join("one.pdf"), b"x").unwrap();
    std::fs::write(dir.path().join("two.EPUB"), b"x").unwrap();
    std::fs::write(dir.path().join("skip.txt"), b"x").unwrap();
    std::fs::write(dir.path().join("new arrivals/three.docx"), b"x").unwrap();
    std::fs::write(dir.path().join("new arrivals/skip.jpg"), b"x").unwrap();

    let files = UploadScanner::new(dir.path()).scan().unwrap();
    assert_eq!(files.len(), 3);
    assert!(files.iter().all(|p| p.is_file()));
}

#[test]
fn test_scan_results_are_sorted() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("b.pdf"), b"x").unwrap();
    std::fs::write(dir.path().join("a.pdf"), b"x").unwrap();
    std::fs::write(dir.path().join("c.pdf"), b"x").unwrap();

    let files = UploadScanner::new(dir.path()).scan().unwrap();
    let names: Vec<_> = files
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .collect();
    assert_eq!(names, vec!["a.pdf", "b.pdf", "c.pdf"]);
}

#[test]
fn test_scan_missing_root_is_an_error() {
    let dir = TempDir::new().unwrap();
    let gone = dir.path().join("never-created");
    assert!(UploadScanner::new(&gone).scan().is_err());
}
