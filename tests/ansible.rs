use std::fs;

use atalaia::ansible::Ansible;
use atalaia::error::OpsError;

#[test]
fn inventory_selector_follows_the_environment() {
    let dir = tempfile::tempdir().unwrap();

    let production = Ansible::new(dir.path(), "production");
    let test = Ansible::new(dir.path(), "test");

    assert_eq!(production.inventory(), "inventories/production.yml");
    assert_eq!(test.inventory(), "inventories/test.yml");
    assert_eq!(
        production.inventory_path(),
        dir.path().join("inventories/production.yml")
    );
}

#[test]
fn require_inventory_fails_for_a_missing_environment() {
    let dir = tempfile::tempdir().unwrap();
    let ansible = Ansible::new(dir.path(), "staging");

    let err = ansible.require_inventory().unwrap_err();

    match err {
        OpsError::FileNotFound(path) => {
            assert!(path.ends_with("inventories/staging.yml"));
        }
        other => panic!("expected FileNotFound, got {other}"),
    }
}

#[test]
fn require_inventory_passes_when_the_file_exists() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("inventories")).unwrap();
    fs::write(dir.path().join("inventories/dev.yml"), "all: {}\n").unwrap();

    let ansible = Ansible::new(dir.path(), "dev");

    assert!(ansible.require_inventory().is_ok());
}

#[test]
fn has_playbook_checks_relative_to_the_ansible_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("playbooks")).unwrap();
    fs::write(dir.path().join("playbooks/cleanup.yml"), "---\n").unwrap();

    let ansible = Ansible::new(dir.path(), "production");

    assert!(ansible.has_playbook("playbooks/cleanup.yml"));
    assert!(!ansible.has_playbook("playbooks/other.yml"));
}
