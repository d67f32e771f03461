use ctxsim::error::ZipScanErrorKind;
use ctxsim::ingest::{scan_zip, ScanOptions};
use ctxsim::models::ContentStatus;
use pretty_assertions::assert_eq;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in files {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(body).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[test]
fn test_round_trip_paths_and_content() {
    let bytes = zip_bytes(&[("AGENTS.md", b"Run npm test"), ("README.md", b"readme")]);
    let result = scan_zip(&bytes, &ScanOptions::with_content()).unwrap();
    let mut paths = result.tree.paths();
    paths.sort();
    assert_eq!(paths, vec!["AGENTS.md", "README.md"]);
    assert_eq!(result.total_files, 2);
    let agents = result.tree.files.iter().find(|f| f.path == "AGENTS.md").unwrap();
    assert_eq!(agents.content, "Run npm test");
    assert_eq!(agents.content_status, Some(ContentStatus::Ok));
    let readme = result.tree.files.iter().find(|f| f.path == "README.md").unwrap();
    assert!(readme.content.is_empty());
}

#[test]
fn test_ignored_directories_are_dropped() {
    let bytes = zip_bytes(&[
        ("AGENTS.md", b"x"),
        ("node_modules/pkg/AGENTS.md", b"y"),
        (".git/config", b"z"),
    ]);
    let result = scan_zip(&bytes, &ScanOptions::default()).unwrap();
    assert_eq!(result.tree.paths(), vec!["AGENTS.md"]);
}

#[test]
fn test_compressed_size_cap_is_oversize() {
    let bytes = zip_bytes(&[("AGENTS.md", b"x")]);
    let options = ScanOptions {
        max_compressed_bytes: 10,
        ..ScanOptions::default()
    };
    let err = scan_zip(&bytes, &options).unwrap_err();
    assert_eq!(err.kind, ZipScanErrorKind::Oversize);
}

#[test]
fn test_uncompressed_size_cap_is_oversize() {
    let body = vec![b'a'; 4096];
    let bytes = zip_bytes(&[("AGENTS.md", &body)]);
    let options = ScanOptions {
        max_uncompressed_bytes: 1024,
        ..ScanOptions::default()
    };
    let err = scan_zip(&bytes, &options).unwrap_err();
    assert_eq!(err.kind, ZipScanErrorKind::Oversize);
}

#[test]
fn test_file_count_cap_is_oversize() {
    let bytes = zip_bytes(&[("a.md", b"a"), ("b.md", b"b"), ("c.md", b"c")]);
    let options = ScanOptions {
        max_files: Some(2),
        ..ScanOptions::default()
    };
    let err = scan_zip(&bytes, &options).unwrap_err();
    assert_eq!(err.kind, ZipScanErrorKind::Oversize);
}

#[test]
fn test_garbage_is_corrupt() {
    let err = scan_zip(b"PK\x03\x04 definitely not a zip", &ScanOptions::default()).unwrap_err();
    assert_eq!(err.kind, ZipScanErrorKind::Corrupt);
}
