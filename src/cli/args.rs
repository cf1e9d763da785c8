//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueHint};

/// Rewrite a Cougaar society XML file for XML-based node initialization
#[derive(Parser, Debug)]
#[command(name = "socedit")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("mode").args(["dry_run", "check"])))]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Settings file (overrides the global socedit.toml)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Remote X display host; adds DISPLAY=<host>:0.0 to every node
    #[arg(long, env = "SOCEDIT_DISPLAY")]
    pub display: Option<String>,

    /// Print the edited XML to stdout instead of writing the file
    #[arg(long)]
    pub dry_run: bool,

    /// Report what would change without writing anything
    #[arg(long)]
    pub check: bool,

    /// Print the effective settings and exit
    #[arg(long)]
    pub show_config: bool,

    /// Generate shell completions and exit
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,

    /// Society XML file, edited in place
    #[arg(value_hint = ValueHint::FilePath, required_unless_present_any = ["completion", "show_config"])]
    pub file: Option<PathBuf>,
}
