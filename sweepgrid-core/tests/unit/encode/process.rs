use super::*;

#[cfg(unix)]
#[test]
fn captures_both_streams_and_status() {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", "echo out; echo err 1>&2; exit 3"]);
    let out = run_with_timeout(&mut cmd, Duration::from_secs(10)).unwrap();
    assert!(!out.success());
    assert_eq!(out.status.code(), Some(3));
    assert_eq!(out.stdout_text(), "out\n");
    assert_eq!(out.stderr_text(), "err");
}

#[cfg(unix)]
#[test]
fn slow_child_is_killed_at_deadline() {
    let mut cmd = Command::new("sleep");
    cmd.arg("5");
    let started = Instant::now();
    let err = run_with_timeout(&mut cmd, Duration::from_millis(100)).unwrap_err();
    assert!(matches!(err, ProcessError::TimedOut { .. }));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[test]
fn missing_program_is_a_spawn_error() {
    let mut cmd = Command::new("sweepgrid-no-such-program-xyz");
    let err = run_with_timeout(&mut cmd, Duration::from_secs(1)).unwrap_err();
    assert!(matches!(err, ProcessError::Spawn { .. }));
    assert!(err.to_string().contains("sweepgrid-no-such-program-xyz"));
}

#[cfg(unix)]
#[test]
fn reaped_child_has_an_exit_status() {
    let mut child = Command::new("sleep").arg("5").spawn().unwrap();
    reap(&mut child);
    assert!(matches!(child.try_wait(), Ok(Some(_))));
}
