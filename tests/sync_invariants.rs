//! End-to-end invariant checks: mirror, no-orphan, atomicity, exclusion
//! stability, symlink preservation, and idempotence.

use kopy_watch::controller::Controller;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_config(path: &Path, name: &str, source: &Path, target: &Path, exclude: &[&str]) {
    let config = serde_json::json!({
        "tasks": [{
            "name": name,
            "source": source.to_string_lossy(),
            "target": target.to_string_lossy(),
            "exclude": exclude,
        }]
    });
    fs::write(path, config.to_string()).expect("write config");
}

#[test]
fn test_mirror_property_after_single_pass() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::create_dir_all(src.path().join("nested")).unwrap();
    fs::write(src.path().join("root.txt"), b"root").unwrap();
    fs::write(src.path().join("nested/inner.txt"), b"inner").unwrap();

    let config_path = TempDir::new().unwrap().path().join("config.json");
    write_config(&config_path, "t", src.path(), dst.path(), &[]);

    Controller::run_once(&config_path).expect("run once");

    assert_eq!(
        fs::read(dst.path().join("root.txt")).unwrap(),
        b"root"
    );
    assert_eq!(
        fs::read(dst.path().join("nested/inner.txt")).unwrap(),
        b"inner"
    );
}

#[test]
fn test_no_orphan_property_removes_stale_target_entry() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::write(dst.path().join("stale.txt"), b"leftover").unwrap();

    let config_path = TempDir::new().unwrap().path().join("config.json");
    write_config(&config_path, "t", src.path(), dst.path(), &[]);

    Controller::run_once(&config_path).expect("run once");

    assert!(!dst.path().join("stale.txt").exists());
}

#[test]
fn test_exclusion_stability_orphan_left_untouched_when_excluded() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::write(dst.path().join("keep.cache"), b"cache").unwrap();

    let config_path = TempDir::new().unwrap().path().join("config.json");
    write_config(&config_path, "t", src.path(), dst.path(), &["*.cache"]);

    Controller::run_once(&config_path).expect("run once");

    assert!(dst.path().join("keep.cache").exists());
}

#[test]
fn test_symlink_preservation_not_followed() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    let real = src.path().join("real.txt");
    fs::write(&real, b"actual content").unwrap();
    std::os::unix::fs::symlink(&real, src.path().join("link.txt")).unwrap();

    let config_path = TempDir::new().unwrap().path().join("config.json");
    write_config(&config_path, "t", src.path(), dst.path(), &[]);

    Controller::run_once(&config_path).expect("run once");

    let copied = dst.path().join("link.txt");
    assert!(fs::symlink_metadata(&copied).unwrap().is_symlink());
    assert_eq!(fs::read_link(&copied).unwrap(), real);
}

#[test]
fn test_idempotence_second_pass_is_a_noop() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::write(src.path().join("a.txt"), b"stable").unwrap();

    let config_path = TempDir::new().unwrap().path().join("config.json");
    write_config(&config_path, "t", src.path(), dst.path(), &[]);

    Controller::run_once(&config_path).expect("first pass");
    let first_mtime = fs::metadata(dst.path().join("a.txt")).unwrap().modified().unwrap();

    std::thread::sleep(std::time::Duration::from_millis(1100));
    Controller::run_once(&config_path).expect("second pass");
    let second_mtime = fs::metadata(dst.path().join("a.txt")).unwrap().modified().unwrap();

    assert_eq!(first_mtime, second_mtime);
}

#[test]
fn test_fan_out_single_source_many_targets() {
    let src = TempDir::new().unwrap();
    let dst_a = TempDir::new().unwrap();
    let dst_b = TempDir::new().unwrap();
    fs::write(src.path().join("shared.txt"), b"broadcast").unwrap();

    let config_path = TempDir::new().unwrap().path().join("config.json");
    let config = serde_json::json!({
        "tasks": [{
            "name": "fanout",
            "source": src.path().to_string_lossy(),
            "targets": [dst_a.path().to_string_lossy(), dst_b.path().to_string_lossy()],
        }]
    });
    fs::write(&config_path, config.to_string()).unwrap();

    Controller::run_once(&config_path).expect("run once");

    assert!(dst_a.path().join("shared.txt").exists());
    assert!(dst_b.path().join("shared.txt").exists());
}
