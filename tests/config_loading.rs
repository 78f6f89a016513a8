// tests/config_loading.rs
//
// Config resolution: env path > config/motor_match.toml > built-in defaults.
// Serialized because the tests mutate process env and CWD.

use std::{env, fs};

use motor_match::config::{AppConfig, ENV_CONFIG_PATH};
use motor_match::requirements::UnknownFieldPolicy;

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD in a temp dir so the repo's own config/ does not interfere.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var(ENV_CONFIG_PATH);

    // No files → built-in defaults.
    let cfg = AppConfig::load_default().unwrap();
    assert_eq!(cfg, AppConfig::default());

    // Default path is picked up.
    fs::create_dir_all("config").unwrap();
    fs::write("config/motor_match.toml", "[ranking]\nsummary_rows = 3\n").unwrap();
    let cfg = AppConfig::load_default().unwrap();
    assert_eq!(cfg.ranking.summary_rows, 3);

    // Env has precedence over the default path.
    let p = tmp.path().join("custom.toml");
    fs::write(&p, "[consolidation]\nunknown_fields = \"reject\"\n").unwrap();
    env::set_var(ENV_CONFIG_PATH, p.display().to_string());
    let cfg = AppConfig::load_default().unwrap();
    assert_eq!(cfg.consolidation.unknown_fields, UnknownFieldPolicy::Reject);
    assert_eq!(cfg.ranking.summary_rows, 5);
    env::remove_var(ENV_CONFIG_PATH);

    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn env_path_must_exist() {
    env::set_var(ENV_CONFIG_PATH, "/definitely/not/here/motor_match.toml");
    let err = AppConfig::load_default().unwrap_err();
    assert!(err.to_string().contains(ENV_CONFIG_PATH));
    env::remove_var(ENV_CONFIG_PATH);
}

#[serial_test::serial]
#[test]
fn malformed_file_reports_its_path() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("broken.toml");
    fs::write(&p, "[ranking\nparallel = true").unwrap();
    let err = AppConfig::load_from(&p).unwrap_err();
    assert!(format!("{err:#}").contains("broken.toml"));
}
