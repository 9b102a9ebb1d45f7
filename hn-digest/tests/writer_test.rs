use chrono::NaiveDate;
use hn_digest::DigestWriter;

#[tokio::test]
async fn writes_dated_document_to_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let output_dir = dir.path().join("digests");
    let writer = DigestWriter::new(&output_dir);
    let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();

    let path = writer
        .persist_on(date, "## Storia\n\nTesto.", None)
        .await
        .unwrap();

    assert_eq!(path, output_dir.join("hackernews_daily_2025-03-07.md"));
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, "# HackerNews Daily - 07 March 2025\n\n## Storia\n\nTesto.");
}

#[tokio::test]
async fn explicit_file_name_is_used_as_given() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("custom.md");
    let writer = DigestWriter::new(dir.path().join("unused"));

    let path = writer.persist("body", Some(target.as_path())).await.unwrap();

    assert_eq!(path, target);
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("# HackerNews Daily - "));
    assert!(content.ends_with("\n\nbody"));
    assert!(!dir.path().join("unused").exists());
}

#[tokio::test]
async fn unwritable_target_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("missing").join("digest.md");
    let writer = DigestWriter::new(dir.path());

    assert!(writer.persist("body", Some(target.as_path())).await.is_err());
}
