use super::*;

fn fresh_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_scan").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"").unwrap();
}

#[test]
fn renamed_clip_wins_over_timestamp_clip() {
    let dir = fresh_dir("renamed");
    let folder = dir.join("20250610233650_A_steps_10");
    touch(&folder.join("20250610233650.mp4"));
    touch(&folder.join("20250610233650_A_steps_10.mp4"));
    touch(&folder.join("aaa.mp4"));

    let clips = scan_batch(&dir).unwrap();
    assert_eq!(clips.len(), 1);
    assert_eq!(clips[0].folder_name, "20250610233650_A_steps_10");
    assert_eq!(
        clips[0].path.file_name().unwrap(),
        "20250610233650_A_steps_10.mp4"
    );
}

#[test]
fn timestamp_clip_wins_over_other_names() {
    let dir = fresh_dir("stamped");
    let folder = dir.join("steps_20");
    touch(&folder.join("aaa.mp4"));
    touch(&folder.join("20250610233650.mp4"));

    let clips = scan_batch(&dir).unwrap();
    assert_eq!(clips[0].path.file_name().unwrap(), "20250610233650.mp4");
}

#[test]
fn folders_are_visited_in_name_order_and_empty_ones_skipped() {
    let dir = fresh_dir("order");
    touch(&dir.join("b_2").join("x.mp4"));
    touch(&dir.join("a_1").join("y.MP4"));
    touch(&dir.join("c_3").join("notes.txt"));
    touch(&dir.join("loose.mp4"));

    let clips = scan_batch(&dir).unwrap();
    let names: Vec<&str> = clips.iter().map(|c| c.folder_name.as_str()).collect();
    assert_eq!(names, vec!["a_1", "b_2"]);
}

#[test]
fn missing_or_empty_batch_is_an_input_error() {
    let missing = PathBuf::from("target").join("unit_scan").join("does_not_exist");
    assert!(matches!(scan_batch(&missing), Err(SweepError::Input(_))));

    let empty = fresh_dir("empty");
    std::fs::create_dir_all(empty.join("no_videos")).unwrap();
    assert!(matches!(scan_batch(&empty), Err(SweepError::Input(_))));
}

#[test]
fn timestamp_check_requires_exact_digit_run() {
    assert!(is_timestamp("20250610233650"));
    assert!(!is_timestamp("2025061023365"));
    assert!(!is_timestamp("2025061023365a"));
}
