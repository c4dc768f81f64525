use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::config::{load_config, resolve_config_path};
use crate::progress::resolve_progress_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Pass,
    Fail,
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorCheck {
    pub name: String,
    pub state: CheckState,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    pub checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    pub fn has_failures(&self) -> bool {
        self.checks
            .iter()
            .any(|check| check.state == CheckState::Fail)
    }

    pub fn summary(&self) -> String {
        let passed = self
            .checks
            .iter()
            .filter(|check| check.state == CheckState::Pass)
            .count();
        let failed = self.checks.len().saturating_sub(passed);
        format!("{passed} passed, {failed} failed")
    }
}

pub fn run_doctor() -> DoctorReport {
    let config_path = resolve_config_path().ok();
    let progress_path = resolve_progress_path().ok();
    run_doctor_with_paths(config_path.as_deref(), progress_path.as_deref())
}

pub fn run_doctor_with_paths(
    config_path: Option<&Path>,
    progress_path: Option<&Path>,
) -> DoctorReport {
    let mut checks = Vec::new();

    match config_path {
        None => {
            checks.push(fail_check(
                "config path resolves",
                "could not resolve home directory",
            ));
        }
        Some(path) => {
            checks.push(pass_check(
                "config path resolves",
                path.display().to_string(),
            ));

            if path.exists() {
                checks.push(match load_config(path) {
                    Ok(_) => pass_check("config parses and validates", "config is valid"),
                    Err(error) => fail_check("config parses and validates", error.to_string()),
                });
            } else {
                checks.push(pass_check(
                    "config parses and validates",
                    "no config file, using defaults",
                ));
            }
        }
    }

    match progress_path {
        None => {
            checks.push(fail_check(
                "progress storage is writable",
                "could not resolve home directory",
            ));
        }
        Some(path) => {
            checks.push(check_progress_writable(path));
            checks.push(check_progress_readable(path));
        }
    }

    checks.push(match env::var("TERM") {
        Ok(term) if !term.trim().is_empty() => {
            pass_check("terminal type is set", format!("TERM={term}"))
        }
        _ => fail_check(
            "terminal type is set",
            "TERM is unset; the wizard cannot draw",
        ),
    });

    DoctorReport { checks }
}

fn check_progress_writable(path: &Path) -> DoctorCheck {
    let Some(parent) = path.parent() else {
        return fail_check(
            "progress storage is writable",
            "progress path has no parent directory",
        );
    };

    if let Err(error) = fs::create_dir_all(parent) {
        return fail_check(
            "progress storage is writable",
            format!("cannot create {}: {error}", parent.display()),
        );
    }

    let probe = parent.join(".gangway-doctor-probe");
    match fs::write(&probe, b"probe") {
        Ok(()) => {
            let _ = fs::remove_file(&probe);
            pass_check(
                "progress storage is writable",
                parent.display().to_string(),
            )
        }
        Err(error) => fail_check(
            "progress storage is writable",
            format!("cannot write in {}: {error}", parent.display()),
        ),
    }
}

fn check_progress_readable(path: &Path) -> DoctorCheck {
    if !path.exists() {
        return pass_check("progress file parses", "no saved progress");
    }

    match fs::read_to_string(path) {
        Err(error) => fail_check(
            "progress file parses",
            format!("cannot read {}: {error}", path.display()),
        ),
        Ok(raw) => match raw.parse::<toml::Table>() {
            Ok(_) => pass_check("progress file parses", path.display().to_string()),
            Err(error) => fail_check("progress file parses", error.to_string()),
        },
    }
}

fn pass_check(name: impl Into<String>, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck {
        name: name.into(),
        state: CheckState::Pass,
        details: details.into(),
    }
}

fn fail_check(name: impl Into<String>, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck {
        name: name.into(),
        state: CheckState::Fail,
        details: details.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_paths_report_failures() {
        let report = run_doctor_with_paths(None, None);
        assert!(report.has_failures());
        assert!(report.checks.iter().any(|check| {
            check.name == "config path resolves" && check.state == CheckState::Fail
        }));
    }

    #[test]
    fn defaults_pass_when_no_files_exist() {
        let temp = tempfile::tempdir().expect("temp dir");
        let config = temp.path().join("config.toml");
        let progress = temp.path().join("state").join("onboarding.toml");

        let report = run_doctor_with_paths(Some(&config), Some(&progress));

        let by_name = |name: &str| {
            report
                .checks
                .iter()
                .find(|check| check.name == name)
                .expect("check present")
        };
        assert_eq!(by_name("config parses and validates").state, CheckState::Pass);
        assert_eq!(by_name("progress storage is writable").state, CheckState::Pass);
        assert_eq!(by_name("progress file parses").state, CheckState::Pass);
    }

    #[test]
    fn invalid_config_fails_the_report() {
        let temp = tempfile::tempdir().expect("temp dir");
        let config = temp.path().join("config.toml");
        std::fs::write(&config, "version = 9").expect("write config");
        let progress = temp.path().join("onboarding.toml");

        let report = run_doctor_with_paths(Some(&config), Some(&progress));
        assert!(report.has_failures());
    }

    #[test]
    fn corrupt_progress_file_is_reported() {
        let temp = tempfile::tempdir().expect("temp dir");
        let progress = temp.path().join("onboarding.toml");
        std::fs::write(&progress, "definitely [not toml").expect("write progress");

        let report = run_doctor_with_paths(None, Some(&progress));
        assert!(report.checks.iter().any(|check| {
            check.name == "progress file parses" && check.state == CheckState::Fail
        }));
    }

    #[test]
    fn summary_counts_passes_and_failures() {
        let report = DoctorReport {
            checks: vec![
                DoctorCheck {
                    name: "a".to_string(),
                    state: CheckState::Pass,
                    details: String::new(),
                },
                DoctorCheck {
                    name: "b".to_string(),
                    state: CheckState::Fail,
                    details: String::new(),
                },
            ],
        };
        assert_eq!(report.summary(), "1 passed, 1 failed");
        assert!(report.has_failures());
    }
}
