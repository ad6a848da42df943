use super::*;

#[test]
fn ffprobe_replaces_only_the_file_name() {
    assert_eq!(
        derive_ffprobe(Path::new("/opt/ffmpeg/bin/ffmpeg")),
        PathBuf::from("/opt/ffmpeg/bin/ffprobe")
    );
    assert_eq!(
        derive_ffprobe(Path::new("C:/ffmpeg/bin/ffmpeg.exe")),
        PathBuf::from("C:/ffmpeg/bin/ffprobe.exe")
    );
    assert_eq!(derive_ffprobe(Path::new("ffmpeg")), PathBuf::from("ffprobe"));
}

#[test]
fn ffprobe_for_unusual_name_is_a_sibling() {
    let probe = derive_ffprobe(Path::new("/tools/encoder"));
    assert_eq!(probe.parent(), Some(Path::new("/tools")));
    assert!(probe.file_name().unwrap().to_string_lossy().starts_with("ffprobe"));
}

#[test]
fn adjacent_search_climbs_five_levels() {
    let cwd = Path::new("/a/b/c/d/e/f/g");
    let found = adjacent_candidates(cwd);
    assert_eq!(found.len(), 6);
    assert_eq!(found[0], cwd.join(WEBUI_DIR).join(exe_name()));
    assert_eq!(
        found[5],
        Path::new("/a/b").join(WEBUI_DIR).join(exe_name())
    );
}

#[test]
fn adjacent_search_checks_webui_root_itself() {
    let cwd = Path::new("/apps").join(WEBUI_DIR).join("outputs");
    let found = adjacent_candidates(&cwd);
    assert!(found.contains(&Path::new("/apps").join(WEBUI_DIR).join(exe_name())));
}

#[test]
fn home_locations_are_included() {
    let home = Path::new("/home/someone");
    let paths = common_install_paths(Some(home));
    assert!(paths.iter().any(|p| p.starts_with(home)));
    assert!(common_install_paths(None).iter().all(|p| !p.starts_with(home)));
}

#[test]
fn broken_override_is_a_config_error() {
    let missing = PathBuf::from("target").join("unit_locate").join("no-ffmpeg-here");
    let err = locate_engine(Some(&missing), Duration::from_secs(1)).unwrap_err();
    assert!(matches!(err, SweepError::Config(_)));
}

#[test]
fn from_ffmpeg_pairs_tools() {
    let tools = EngineTools::from_ffmpeg("/usr/bin/ffmpeg");
    assert_eq!(tools.ffprobe, PathBuf::from("/usr/bin/ffprobe"));
}
