mod common;

use common::TempRoot;
use framecast::http::mime;
use framecast::http::resolver::{BUSY_BODY, FileResolver, NOT_FOUND_BODY};

#[test]
fn test_mime_known_extensions() {
    assert_eq!(mime::from_path("/index.html"), "text/html");
    assert_eq!(mime::from_path("/style.css"), "text/css");
    assert_eq!(mime::from_path("/photo.jpeg"), "image/jpeg");
    assert_eq!(mime::from_path("/photo.JPG"), "image/jpeg");
    assert_eq!(mime::from_path("/a/b/c.png"), "image/png");
    assert_eq!(mime::from_path("/notes.txt"), "text/plain");
}

#[test]
fn test_mime_defaults_to_html() {
    assert_eq!(mime::from_path("/README"), "text/html");
    assert_eq!(mime::from_path("/archive.unknownext"), "text/html");
    assert_eq!(mime::from_path("/.hidden"), "text/html");
    assert_eq!(mime::from_path("/dir.d/file"), "text/html");
}

#[test]
fn test_target_path_rewrites_root_only() {
    assert_eq!(FileResolver::target_path("/"), "/index.html");
    assert_eq!(FileResolver::target_path("/a/"), "/a/");
    assert_eq!(FileResolver::target_path("/x.txt"), "/x.txt");
}

#[test]
fn test_file_path_is_under_root() {
    let resolver = FileResolver::new("/srv/www");

    assert_eq!(
        resolver.file_path("/img/cat.png"),
        std::path::Path::new("/srv/www/img/cat.png")
    );
}

#[tokio::test]
async fn test_resolve_existing_file() {
    let root = TempRoot::new();
    root.write("img/frame.jpg", [0xFFu8, 0xD8, 0xFF, 0xD9]);

    let content = FileResolver::new(root.path())
        .resolve("/img/frame.jpg")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(content.mime_type, "image/jpeg");
    assert_eq!(content.len(), 4);
    assert_eq!(&content.bytes[..], &[0xFFu8, 0xD8, 0xFF, 0xD9]);
}

#[tokio::test]
async fn test_resolve_missing_file() {
    let root = TempRoot::new();
    let resolver = FileResolver::new(root.path());

    assert!(resolver.resolve("/missing.txt").await.unwrap().is_none());
    assert!(resolver.resolve("/").await.unwrap().is_none());
    assert!(resolver.resolve("/missing/deeper.txt").await.unwrap().is_none());
}

#[tokio::test]
async fn test_resolve_empty_file() {
    let root = TempRoot::new();
    root.write("empty.txt", "");

    let content = FileResolver::new(root.path())
        .resolve("/empty.txt")
        .await
        .unwrap()
        .unwrap();

    assert!(content.is_empty());
}

#[tokio::test]
async fn test_builtin_bodies_without_overrides() {
    let root = TempRoot::new();
    let resolver = FileResolver::new(root.path());

    assert_eq!(&resolver.not_found_body().await[..], NOT_FOUND_BODY.as_bytes());
    assert_eq!(&resolver.busy_body().await[..], BUSY_BODY.as_bytes());
}

#[tokio::test]
async fn test_override_bodies() {
    let root = TempRoot::new();
    root.write("404.html", "missing!");
    root.write("503.html", "busy!");
    let resolver = FileResolver::new(root.path());

    assert_eq!(&resolver.not_found_body().await[..], b"missing!");
    assert_eq!(&resolver.busy_body().await[..], b"busy!");
}
