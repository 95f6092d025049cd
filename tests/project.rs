use std::fs;
use std::path::Path;

use atalaia::error::OpsError;
use atalaia::project::{ProjectLayout, REQUIRED_FILES};

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, "").unwrap();
}

#[test]
fn discover_from_walks_up_to_the_ansible_root() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("ansible")).unwrap();
    let nested = dir.path().join("scripts").join("utilities");
    fs::create_dir_all(&nested).unwrap();

    let layout = ProjectLayout::discover_from(&nested).unwrap();

    assert_eq!(layout.root(), dir.path());
    assert_eq!(layout.ansible_dir(), dir.path().join("ansible"));
}

#[test]
fn missing_files_lists_absent_paths_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(dir.path());
    touch(&dir.path().join("ansible/playbooks/site.yml"));
    touch(&dir.path().join("ansible/roles/docker/tasks/main.yml"));

    let missing = layout.missing_files(REQUIRED_FILES);

    assert_eq!(
        missing,
        vec![
            "ansible/inventories/hosts.yml".to_string(),
            "ansible/roles/caddy/tasks/main.yml".to_string(),
            "ansible/roles/monitoring/tasks/main.yml".to_string(),
            "ansible/roles/caddy/templates/Caddyfile.j2".to_string(),
        ]
    );
}

#[test]
fn require_files_passes_when_everything_exists() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(dir.path());
    for path in REQUIRED_FILES {
        touch(&dir.path().join(path));
    }

    assert!(layout.require_files(REQUIRED_FILES).is_ok());
}

#[test]
fn require_files_names_the_first_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(dir.path());

    let err = layout.require_files(REQUIRED_FILES).unwrap_err();

    match err {
        OpsError::FileNotFound(path) => {
            assert_eq!(path, "ansible/playbooks/site.yml");
        }
        other => panic!("expected FileNotFound, got {other}"),
    }
}

#[test]
fn test_env_dir_is_under_docker() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(dir.path());

    assert_eq!(
        layout.test_env_dir(),
        dir.path().join("docker").join("test-environment")
    );
}
