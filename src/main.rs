use std::io;
use std::process::ExitCode;

use clap::Parser;
use issue_store::StoreError;
use lodestar::cli::Cli;
use lodestar::{commands, render};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse();
    let wants_json = cli.command.wants_json();

    if let Err(error) = commands::run(cli.command) {
        let code = exit_code(&error);
        let message = format!("{error:#}");
        let mut stderr = io::stderr();
        if wants_json {
            render::json_error(&mut stderr, &message, i32::from(code));
        } else {
            render::text_error(&mut stderr, &message);
        }
        return ExitCode::from(code);
    }
    ExitCode::SUCCESS
}

/// Validation failures are 2, missing things are 3, conflicts are 4,
/// everything else is 1.
fn exit_code(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<StoreError>() {
        Some(
            StoreError::InvalidId { .. }
            | StoreError::InvalidStatus { .. }
            | StoreError::InvalidPriority { .. }
            | StoreError::EmptyTitle,
        ) => 2,
        Some(StoreError::ProjectNotFound | StoreError::IssueNotFound { .. }) => 3,
        Some(StoreError::ProjectExists { .. }) => 4,
        _ => 1,
    }
}

/// Logging is opt-in via `RUST_LOG`; with no filter set nothing is written,
/// which keeps the alternate screen clean during TUI use.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use issue_store::StoreError;

    use super::exit_code;

    #[test]
    fn validation_failures_exit_2() {
        let error = anyhow::Error::from(StoreError::InvalidStatus {
            status: "archived".to_string(),
            allowed: vec!["todo".to_string(), "done".to_string()],
        });
        assert_eq!(exit_code(&error), 2);
        assert_eq!(exit_code(&anyhow::Error::from(StoreError::EmptyTitle)), 2);
    }

    #[test]
    fn missing_things_exit_3() {
        assert_eq!(
            exit_code(&anyhow::Error::from(StoreError::ProjectNotFound)),
            3
        );
        let error = anyhow::Error::from(StoreError::IssueNotFound {
            id: "LDS-9".to_string(),
        });
        assert_eq!(exit_code(&error), 3);
    }

    #[test]
    fn conflicts_exit_4_and_everything_else_1() {
        let error = anyhow::Error::from(StoreError::ProjectExists {
            path: "/tmp/x/.lodestar".into(),
        });
        assert_eq!(exit_code(&error), 4);
        assert_eq!(exit_code(&anyhow::anyhow!("editor failed")), 1);
    }
}
