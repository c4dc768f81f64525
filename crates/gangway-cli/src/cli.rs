use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "gangway")]
#[command(bin_name = "gangway")]
#[command(version)]
#[command(about = "Onboarding wizard for the gangway deployment platform")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Show saved onboarding progress")]
    Status,
    #[command(about = "Clear saved onboarding progress")]
    Reset,
    #[command(about = "Run environment and configuration checks")]
    Doctor,
}
