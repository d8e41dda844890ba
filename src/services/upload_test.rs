use super::*;

#[test]
fn file_extension_lowercases() {
    assert_eq!(file_extension("Party.JPG"), Some("jpg".to_owned()));
    assert_eq!(file_extension("photo.png"), Some("png".to_owned()));
    assert_eq!(file_extension("noext"), None);
    assert_eq!(file_extension(".hidden"), None);
}

#[test]
fn ext_for_content_type_maps_images_only() {
    assert_eq!(ext_for_content_type("image/png"), Some("png"));
    assert_eq!(ext_for_content_type("image/jpeg; charset=binary"), Some("jpg"));
    assert_eq!(ext_for_content_type("text/html"), None);
    assert_eq!(ext_for_content_type(""), None);
}

#[tokio::test]
async fn save_bytes_rejects_unsupported_types() {
    let dir = std::env::temp_dir().join(format!("party2book-test-{}", Uuid::new_v4()));
    let err = save_bytes(&dir, "malware.exe", b"MZ").await.unwrap_err();
    assert!(matches!(err, UploadError::UnsupportedType(_)));
}

#[tokio::test]
async fn save_bytes_stores_under_uuid_name() {
    let dir = std::env::temp_dir().join(format!("party2book-test-{}", Uuid::new_v4()));
    let stored = save_bytes(&dir, "venue photo.png", b"fake-png").await.unwrap();

    assert!(stored.file_name.ends_with(".png"));
    assert!(stored.url_path.starts_with("/uploads/"));
    // Original filename must not leak into the stored name.
    assert!(!stored.file_name.contains("venue"));

    let on_disk = tokio::fs::read(dir.join(&stored.file_name)).await.unwrap();
    assert_eq!(on_disk, b"fake-png");

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}
