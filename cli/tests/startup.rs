//! Startup validation of the `torrent-handler` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn handler(cwd: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("torrent-handler").unwrap();
    cmd.env_clear().current_dir(cwd.path()).env("RUST_LOG", "info");
    cmd
}

#[test]
fn test_missing_configuration_exits_with_one() {
    let cwd = TempDir::new().unwrap();

    handler(&cwd)
        .env("TRANSMISSION_HOST", "localhost")
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("DOWNLOAD_FOLDER")
                .and(predicate::str::contains("PROCESSED_FOLDER"))
                .and(predicate::str::contains("TRANSMISSION_PORT"))
                .and(predicate::str::contains("TRANSMISSION_DOWNLOAD_DIR")),
        );
}

#[test]
fn test_missing_watch_directory_exits_with_one() {
    let cwd = TempDir::new().unwrap();

    handler(&cwd)
        .env("DOWNLOAD_FOLDER", cwd.path().join("absent"))
        .env("PROCESSED_FOLDER", cwd.path().join("processed"))
        .env("TRANSMISSION_HOST", "localhost")
        .env("TRANSMISSION_PORT", "9091")
        .env("TRANSMISSION_DOWNLOAD_DIR", "/downloads")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("watch directory does not exist"));
}

#[test]
fn test_env_file_is_loaded() {
    let cwd = TempDir::new().unwrap();
    let env_file = cwd.path().join("handler.env");
    std::fs::write(&env_file, "TRANSMISSION_PORT=not-a-port\n").unwrap();

    handler(&cwd)
        .arg("--env-file")
        .arg(&env_file)
        .env("DOWNLOAD_FOLDER", cwd.path())
        .env("PROCESSED_FOLDER", cwd.path().join("processed"))
        .env("TRANSMISSION_HOST", "localhost")
        .env("TRANSMISSION_DOWNLOAD_DIR", "/downloads")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid value for TRANSMISSION_PORT"));
}

#[test]
fn test_unreadable_env_file_exits_with_one() {
    let cwd = TempDir::new().unwrap();

    handler(&cwd)
        .arg("--env-file")
        .arg(cwd.path().join("missing.env"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to load env file"));
}

#[cfg(unix)]
fn wait_for_log(log_file: &std::path::Path, needle: &str) {
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(20);
    loop {
        let contents = std::fs::read_to_string(log_file).unwrap_or_default();
        if contents.contains(needle) {
            return;
        }
        assert!(
            std::time::Instant::now() < deadline,
            "log never contained {needle:?}:\n{contents}"
        );
        std::thread::sleep(std::time::Duration::from_millis(50));
    }
}

#[cfg(unix)]
#[test]
fn test_unreachable_daemon_archives_and_interrupt_exits_cleanly() {
    use assert_cmd::assert::OutputAssertExt;
    use std::process::Stdio;

    let cwd = TempDir::new().unwrap();
    let watch = cwd.path().join("watch");
    let done = cwd.path().join("done");
    let log_file = cwd.path().join("handler.log");
    std::fs::create_dir(&watch).unwrap();

    // Nothing listens on a port that was just released.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let child = std::process::Command::new(assert_cmd::cargo::cargo_bin("torrent-handler"))
        .env_clear()
        .current_dir(cwd.path())
        .env("RUST_LOG", "info")
        .env("DOWNLOAD_FOLDER", &watch)
        .env("PROCESSED_FOLDER", &done)
        .env("TRANSMISSION_HOST", "127.0.0.1")
        .env("TRANSMISSION_PORT", port.to_string())
        .env("TRANSMISSION_DOWNLOAD_DIR", "/downloads")
        .env("TORRENT_HANDLER_LOG_FILE", &log_file)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    wait_for_log(&log_file, "Started watching");
    std::fs::write(watch.join("n.txt"), b"notes").unwrap();
    std::fs::write(watch.join("b.torrent"), b"d4:infod4:name1:bee").unwrap();
    wait_for_log(&log_file, "WITHOUT submitting it");

    let interrupted = std::process::Command::new("kill")
        .arg("-INT")
        .arg(child.id().to_string())
        .status()
        .unwrap();
    assert!(interrupted.success());

    child.wait_with_output().unwrap().assert().code(0).stderr(
        predicate::str::contains("Failed to connect to Transmission")
            .and(predicate::str::contains("WITHOUT submitting it")),
    );
    assert_eq!(
        std::fs::read(done.join("b.torrent")).unwrap(),
        b"d4:infod4:name1:bee"
    );
    assert!(watch.join("n.txt").is_file());
    assert!(!watch.join("b.torrent").exists());
}
