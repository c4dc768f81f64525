use anyhow::Result;
use comfy_table::{Cell, ContentArrangement, Table};
use gangway_app::App;
use gangway_core::doctor::{CheckState, DoctorReport, run_doctor};
use gangway_core::step::{STEPS, step_index};
use gangway_tui::UiExit;

use crate::cli::{Cli, Command};

pub fn run_with_deps(cli: Cli, app: &mut App) -> Result<()> {
    match cli.command {
        Some(Command::Status) => run_status_command(app),
        Some(Command::Reset) => run_reset_command(app),
        Some(Command::Doctor) => run_doctor_command(),
        None => run_wizard_command(app),
    }
}

fn run_wizard_command(app: &mut App) -> Result<()> {
    match gangway_tui::run_onboarding(app)? {
        UiExit::Completed => {
            println!("Onboarding complete. Pushes to your repository now deploy automatically.");
        }
        UiExit::LeftForBrowser => {
            println!(
                "Continuing in your browser. Run `gangway` again once the GitHub App is installed."
            );
        }
        UiExit::Canceled => {
            println!("Exited. Progress is saved; run `gangway` to resume.");
        }
    }
    Ok(())
}

fn run_status_command(app: &mut App) -> Result<()> {
    let current = app.progress().current_step();

    let Some(current) = current else {
        println!("Onboarding not started. Run `gangway` to begin.");
        return Ok(());
    };

    let current_index = step_index(current);
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Step", "Status", "Description"]);

    for (index, step) in STEPS.iter().enumerate() {
        let status = if index < current_index {
            "done"
        } else if index == current_index {
            "current"
        } else {
            "pending"
        };
        table.add_row(vec![
            Cell::new(step.title),
            Cell::new(status),
            Cell::new(step.description),
        ]);
    }

    println!("{table}");
    Ok(())
}

fn run_reset_command(app: &mut App) -> Result<()> {
    app.reset_progress();
    println!("Onboarding progress cleared.");
    Ok(())
}

fn run_doctor_command() -> Result<()> {
    let report = run_doctor();
    print_doctor_report(&report);
    Ok(())
}

fn print_doctor_report(report: &DoctorReport) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Check", "Status", "Details"]);

    for check in &report.checks {
        let status = match check.state {
            CheckState::Pass => "PASS",
            CheckState::Fail => "FAIL",
        };

        table.add_row(vec![
            Cell::new(check.name.as_str()),
            Cell::new(status),
            Cell::new(check.details.as_str()),
        ]);
    }

    println!("{table}");
    println!("{}", report.summary());
}
