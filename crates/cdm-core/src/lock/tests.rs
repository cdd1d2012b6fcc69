use super::{LOCK_DIR, LockError, acquire_stage_lock, stage_lock_path};
use cdm_testkit::temp_dir_in_workspace;
use std::fs;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

const DIR: &str = "linux114.0.5735.90";

#[test]
fn test_lock_file_lives_under_lock_dir() {
    let temp = temp_dir_in_workspace();

    let lock = acquire_stage_lock(temp.path(), DIR, Duration::from_secs(5)).unwrap();

    let expected = temp.path().join(".locks").join("linux114.0.5735.90.lock");
    assert_eq!(lock.path(), expected.as_path());
    assert_eq!(stage_lock_path(temp.path(), DIR), expected);
    assert_eq!(lock.dir_name(), DIR);
    assert!(expected.is_file());
}

#[test]
fn test_creates_missing_cache_root() {
    let temp = temp_dir_in_workspace();
    let root = temp.path().join("not-yet").join("created");

    let lock = acquire_stage_lock(&root, DIR, Duration::from_secs(5)).unwrap();

    assert!(root.join(LOCK_DIR).is_dir());
    assert!(lock.path().starts_with(&root));
}

#[test]
fn test_held_lock_times_out() {
    let temp = temp_dir_in_workspace();
    let root = temp.path().to_path_buf();
    let barrier = Arc::new(Barrier::new(2));

    let holder = {
        let root = root.clone();
        let barrier = barrier.clone();
        thread::spawn(move || {
            let _lock = acquire_stage_lock(&root, DIR, Duration::from_secs(5)).unwrap();
            barrier.wait();
            thread::sleep(Duration::from_millis(300));
        })
    };

    barrier.wait();
    let start = Instant::now();
    let result = acquire_stage_lock(&root, DIR, Duration::from_millis(200));

    match result {
        Err(LockError::Timeout {
            dir_name, waited, ..
        }) => {
            assert_eq!(dir_name, DIR);
            assert!(waited >= Duration::from_millis(200));
        }
        other => panic!("Expected Timeout, got: {:?}", other),
    }
    assert!(start.elapsed() >= Duration::from_millis(200));

    holder.join().unwrap();
}

#[test]
fn test_waiter_gets_lock_after_release() {
    let temp = temp_dir_in_workspace();
    let root = temp.path().to_path_buf();
    let barrier = Arc::new(Barrier::new(2));

    let holder = {
        let root = root.clone();
        let barrier = barrier.clone();
        thread::spawn(move || {
            let _lock = acquire_stage_lock(&root, DIR, Duration::from_secs(5)).unwrap();
            barrier.wait();
            thread::sleep(Duration::from_millis(150));
        })
    };

    barrier.wait();
    let start = Instant::now();
    let result = acquire_stage_lock(&root, DIR, Duration::from_secs(2));

    assert!(result.is_ok(), "Should acquire once the holder drops");
    assert!(
        start.elapsed() >= Duration::from_millis(100),
        "Should have waited for the holder, elapsed: {:?}",
        start.elapsed()
    );

    holder.join().unwrap();
}

#[test]
fn test_drop_releases_lock() {
    let temp = temp_dir_in_workspace();

    drop(acquire_stage_lock(temp.path(), DIR, Duration::from_secs(5)).unwrap());

    let again = acquire_stage_lock(temp.path(), DIR, Duration::from_millis(50));
    assert!(again.is_ok(), "Lock should be free after drop, got {:?}", again);
}

#[test]
fn test_different_directories_do_not_contend() {
    let temp = temp_dir_in_workspace();

    let _legacy = acquire_stage_lock(temp.path(), "linux89.0.4389.23", Duration::from_secs(5)).unwrap();
    let modern = acquire_stage_lock(temp.path(), DIR, Duration::from_millis(50));

    assert!(modern.is_ok());
}

#[test]
fn test_timeout_message_names_directory_and_lock_file() {
    let temp = temp_dir_in_workspace();
    let _held = acquire_stage_lock(temp.path(), DIR, Duration::from_secs(5)).unwrap();

    let message = acquire_stage_lock(temp.path(), DIR, Duration::from_millis(30))
        .unwrap_err()
        .to_string();

    assert!(message.starts_with("LOCK_TIMEOUT:"), "{}", message);
    assert!(message.contains(DIR));
    assert!(message.contains(&stage_lock_path(temp.path(), DIR).display().to_string()));
}

#[test]
fn test_unwritable_lock_dir_is_io_error() {
    let temp = temp_dir_in_workspace();
    // A plain file where the lock directory should be
    fs::write(temp.path().join(LOCK_DIR), b"").unwrap();

    let err = acquire_stage_lock(temp.path(), DIR, Duration::from_millis(50)).unwrap_err();

    assert!(err.to_string().starts_with("LOCK_IO:"), "{}", err);
    match err {
        LockError::Io {
            operation, path, ..
        } => {
            assert_eq!(operation, "create lock directory");
            assert_eq!(path, temp.path().join(LOCK_DIR));
        }
        other => panic!("Expected Io, got: {:?}", other),
    }
}
