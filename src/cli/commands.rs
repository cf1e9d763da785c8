//! Command dispatch

use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::cli::args::Cli;
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::Settings;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Load settings and run the command line.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref())?.with_display(cli.display.as_deref());
    debug!("settings: {:?}", settings);

    if cli.show_config {
        output::info(&settings.to_toml()?);
        return Ok(());
    }

    let file = cli
        .file
        .as_deref()
        .ok_or_else(|| CliError::Usage("society file required".into()))?;

    let container = ServiceContainer::new(settings);
    if cli.dry_run {
        dry_run(&container, file)
    } else if cli.check {
        check(&container, file)
    } else {
        edit(&container, file)
    }
}

#[instrument(skip(container))]
fn edit(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let outcome = container
        .editor
        .edit_file_with_progress(file, |stage| output::stage(stage, &file.display()))?;
    output::success(&outcome.report);
    Ok(())
}

#[instrument(skip(container))]
fn dry_run(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let outcome = container.editor.edit(file)?;
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(outcome.xml.as_bytes())
        .and_then(|_| stdout.flush())
        .map_err(|e| InfraError::io("write edited XML to stdout", e))?;
    Ok(())
}

#[instrument(skip(container))]
fn check(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let outcome = container.editor.edit(file)?;
    let plan = container.editor.plan_for(file);

    output::header(&format!("{} (not written)", file.display()));
    match &plan.display {
        Some(display) => output::detail(&format!("DISPLAY={}:0.0", display)),
        None => output::detail(&"no DISPLAY entry (display unset)"),
    }
    for name in &plan.removed_parameters {
        output::removed(name);
    }
    for (name, value) in &plan.overrides {
        output::added(&format!("{}={}", name, value));
    }
    for classname in &plan.removed_components {
        output::removed(classname);
    }
    for patch in &plan.argument_patches {
        output::detail(&format!(
            "{} argument[{}] = {}",
            patch.classname, patch.index, patch.value
        ));
    }
    output::success(&outcome.report);
    Ok(())
}
