use std::time::Duration;

use super::*;

#[test]
fn missing_root_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    assert!(list_videos(&dir.path().join("nope")).unwrap().is_empty());
}

#[test]
fn lists_only_mp4_files_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("old.mp4"), b"12345").unwrap();
    std::thread::sleep(Duration::from_millis(20));
    std::fs::write(dir.path().join("new.MP4"), b"1").unwrap();
    std::fs::write(dir.path().join("new_thumbnail.jpg"), b"j").unwrap();
    std::fs::create_dir(dir.path().join("dir.mp4")).unwrap();

    let videos = list_videos(dir.path()).unwrap();
    let names: Vec<_> = videos.iter().map(|v| v.filename.as_str()).collect();
    assert_eq!(names, vec!["new.MP4", "old.mp4"]);
    assert_eq!(videos[1].id, "old");
    assert_eq!(videos[1].size, 5);
    assert_eq!(videos[1].path, dir.path().join("old.mp4"));
    assert!(videos[0].created_at >= videos[1].created_at);
}

#[test]
fn listing_serializes_camel_case() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.mp4"), b"").unwrap();
    let v = serde_json::to_value(&list_videos(dir.path()).unwrap()[0]).unwrap();
    assert!(v.get("createdAt").is_some());
    assert_eq!(v["filename"], "a.mp4");
}
