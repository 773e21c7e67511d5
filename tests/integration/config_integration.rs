//! Integration tests for layered configuration

use super::test_utils::{with_env, with_home};
use examwise::config::{ConfigLoader, ExamwiseConfig, DEFAULT_IMAGE_URL};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_workspace_file(root: &std::path::Path, name: &str, body: &str) {
    let dir = root.join("config");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), body).unwrap();
}

#[test]
fn test_environment_file_overrides_base_file() {
    let temp_dir = TempDir::new().unwrap();
    let home = temp_dir.path().join("home");
    fs::create_dir_all(&home).unwrap();
    let workspace = temp_dir.path().join("ws");
    write_workspace_file(
        &workspace,
        "config.toml",
        "[session]\nuser = \"base-user\"\n\n[storage]\nstore_path = \"data/base\"\n",
    );
    write_workspace_file(&workspace, "staging.toml", "[storage]\nstore_path = \"data/staging\"\n");

    let config = with_env(
        &[
            ("HOME", Some(home.to_string_lossy().as_ref())),
            ("EXAMWISE_ENV", Some("staging")),
        ],
        || ConfigLoader::load(&workspace),
    )
    .unwrap();

    assert_eq!(config.session.user.as_deref(), Some("base-user"));
    assert_eq!(config.storage.store_path, PathBuf::from("data/staging"));
    assert_eq!(
        config.storage.resolve_path(&workspace),
        workspace.join("data/staging")
    );
}

#[test]
fn test_development_file_is_the_default_environment() {
    let temp_dir = TempDir::new().unwrap();
    let home = temp_dir.path().join("home");
    fs::create_dir_all(&home).unwrap();
    let workspace = temp_dir.path().join("ws");
    write_workspace_file(&workspace, "development.toml", "[logging]\nlevel = \"debug\"\n");

    let config = with_env(
        &[
            ("HOME", Some(home.to_string_lossy().as_ref())),
            ("EXAMWISE_ENV", None),
        ],
        || ConfigLoader::load(&workspace),
    )
    .unwrap();
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_global_file_fills_gaps_left_by_workspace() {
    let temp_dir = TempDir::new().unwrap();
    let home = temp_dir.path().join("home");
    let global_dir = home.join(".config").join("examwise");
    fs::create_dir_all(&global_dir).unwrap();
    fs::write(
        global_dir.join("config.toml"),
        "[session]\ndisplay_name = \"Ada\"\n",
    )
    .unwrap();
    let workspace = temp_dir.path().join("ws");
    write_workspace_file(&workspace, "config.toml", "[session]\nuser = \"ada\"\n");

    let config = with_home(&home, || ConfigLoader::load(&workspace)).unwrap();
    assert_eq!(config.session.user.as_deref(), Some("ada"));
    assert_eq!(config.session.display_name.as_deref(), Some("Ada"));
    assert_eq!(config.defaults.image_url, DEFAULT_IMAGE_URL);
}

#[test]
fn test_starter_file_loads_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("starter.toml");
    fs::write(&path, ConfigLoader::starter_toml().unwrap()).unwrap();

    let config = ConfigLoader::load_from_file(&path).unwrap();
    assert_eq!(config, ExamwiseConfig::default());
}

#[test]
fn test_invalid_values_fail_validation() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.toml");
    fs::write(
        &path,
        "[defaults]\nimage_url = \"cover.png\"\n\n[logging]\nformat = \"xml\"\n",
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&path).unwrap();
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 2);
}
