use assert_cmd::Command;
use std::fs;
use std::path::Path;

pub fn new_command_with_temp_home() -> (Command, tempfile::TempDir) {
    let temp_home = tempfile::tempdir().expect("temp home");
    let binary = assert_cmd::cargo::cargo_bin!("gangway");
    let mut command = Command::new(binary);
    command.env("HOME", temp_home.path());
    command.env("XDG_CONFIG_HOME", temp_home.path().join(".config"));
    command.env("TERM", "xterm-256color");
    command.env_remove("GANGWAY_LOG");
    (command, temp_home)
}

pub fn write_progress(home: &Path, current_step: &str) {
    let state_dir = home.join(".config").join("gangway");
    fs::create_dir_all(&state_dir).expect("create state dir");
    fs::write(
        state_dir.join("onboarding.toml"),
        format!("version = 1\n\n[values]\n\"current-step\" = \"{current_step}\"\n"),
    )
    .expect("write progress");
}

pub fn write_invalid_config(home: &Path) {
    let config_dir = home.join(".config").join("gangway");
    fs::create_dir_all(&config_dir).expect("create config dir");
    fs::write(config_dir.join("config.toml"), "version = 9\n").expect("write config");
}
