//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::InputNotFound(_) => exitcode::NOINPUT,
        ApplicationError::Parse { .. } => exitcode::DATAERR,
        ApplicationError::Domain(DomainError::StructuralViolation { .. })
        | ApplicationError::Domain(DomainError::MissingArgument { .. }) => exitcode::DATAERR,
        ApplicationError::Write { .. } => exitcode::CANTCREAT,
        ApplicationError::Config { .. } => exitcode::CONFIG,
        ApplicationError::OperationFailed { .. } => exitcode::SOFTWARE,
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => exitcode::IOERR,
                InfraError::Application(e) => application_exit_code(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn given_missing_input_when_mapping_then_noinput() {
        let err: CliError = ApplicationError::InputNotFound(PathBuf::from("x.xml")).into();
        assert_eq!(err.exit_code(), exitcode::NOINPUT);
    }

    #[test]
    fn given_structural_violation_when_mapping_then_dataerr() {
        let err: CliError =
            ApplicationError::from(DomainError::structural("agent A", "no arguments")).into();
        assert_eq!(err.exit_code(), exitcode::DATAERR);
    }

    #[test]
    fn given_write_failure_when_mapping_then_cantcreat() {
        let err: CliError = ApplicationError::Write {
            path: PathBuf::from("x.xml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert_eq!(err.exit_code(), exitcode::CANTCREAT);
    }
}
