// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod backup_files;
mod commands;
mod error;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::process::ExitCode;

use acerto_domain::SnapshotReport;
use acerto_persistence::Persistence;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::commands::ExportTarget;
use crate::error::CliError;

/// Acerto - settlement consistency checks and backups for the sales store
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. Required by every command that
    /// reads or writes the store.
    #[arg(short, long, global = true, env = "ACERTO_DATABASE")]
    database: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Check CPF/CNPJ documents and print their canonical form
    ValidateTaxId {
        /// Documents to check, punctuated or digits only
        #[arg(required = true)]
        documents: Vec<String>,
    },
    /// Bring the lines of one settlement batch into agreement with it
    Reconcile {
        /// Settlement batch id
        batch_id: String,
    },
    /// Reconcile every settlement batch
    ReconcileAll,
    /// Report settlement inconsistencies without repairing them
    Check,
    /// List paid lines waiting for a settlement
    Pending,
    /// Settlement batch workflow
    #[command(subcommand)]
    Settlement(SettlementCommand),
    /// Backup export, import and verification
    #[command(subcommand)]
    Backup(BackupCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum SettlementCommand {
    /// Open a settlement batch over paid, unassigned lines
    Create {
        /// Batch title
        #[arg(long)]
        title: String,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
        /// Sale line ids to include
        #[arg(required = true)]
        line_ids: Vec<String>,
    },
    /// Close an open batch and settle its lines
    Close {
        /// Settlement batch id
        batch_id: String,
    },
    /// Cancel an open batch and release its lines
    Cancel {
        /// Settlement batch id
        batch_id: String,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum BackupCommand {
    /// Export every table. Prints the snapshot when no destination is given.
    Export {
        /// Write the snapshot to this file
        #[arg(short, long, conflicts_with = "backup_dir")]
        output: Option<PathBuf>,
        /// Write a timestamped backup into this directory and rotate old ones
        #[arg(long)]
        backup_dir: Option<PathBuf>,
        /// Number of backups to keep in the directory (defaults to the
        /// `backup.max_backups` setting)
        #[arg(long, requires = "backup_dir", value_parser = clap::value_parser!(u64).range(1..))]
        max_backups: Option<u64>,
    },
    /// Restore a snapshot file into the store
    Import {
        /// Snapshot file
        file: PathBuf,
        /// Import even when the snapshot fails validation
        #[arg(long)]
        force: bool,
    },
    /// Check a snapshot file without importing it
    Verify {
        /// Snapshot file
        file: PathBuf,
    },
}

impl Command {
    /// Returns whether the command reads or writes the store.
    const fn requires_store(&self) -> bool {
        !matches!(
            self,
            Self::ValidateTaxId { .. } | Self::Backup(BackupCommand::Verify { .. })
        )
    }
}

/// Response for `backup verify`.
#[derive(Debug, Clone, Serialize)]
struct VerifyResponse {
    file: String,
    valid: bool,
    #[serde(flatten)]
    report: SnapshotReport,
}

/// JSON printed for a command, and whether the command succeeded.
#[derive(Debug, Clone)]
struct CommandOutput {
    body: Value,
    success: bool,
}

impl CommandOutput {
    fn ok<T: Serialize>(body: &T) -> Result<Self, CliError> {
        Ok(Self {
            body: serde_json::to_value(body)?,
            success: true,
        })
    }
}

/// Picks the export destination from the `backup export` flags.
fn export_target(
    output: Option<PathBuf>,
    backup_dir: Option<PathBuf>,
    max_backups: Option<u64>,
) -> ExportTarget {
    match (output, backup_dir) {
        (Some(path), _) => ExportTarget::File(path),
        (None, Some(dir)) => ExportTarget::Directory {
            dir,
            max_backups: max_backups.map(|n| usize::try_from(n).unwrap_or(usize::MAX)),
        },
        (None, None) => ExportTarget::Stdout,
    }
}

/// Opens the store named by `--database`.
///
/// Commands that never touch the store get a scratch in-memory one when no
/// database is given. Every other command needs `--database`.
fn open_persistence(command: &Command, database: Option<&str>) -> Result<Persistence, CliError> {
    match database {
        Some(db_path) => {
            info!("Using file-based database at: {}", db_path);
            Ok(Persistence::new_with_file(db_path)?)
        }
        None if command.requires_store() => Err(CliError::DatabaseRequired),
        None => {
            debug!("No database given, command does not use the store");
            Ok(Persistence::new_in_memory()?)
        }
    }
}

/// Runs one command against `persistence`.
fn execute(command: Command, persistence: &mut Persistence) -> Result<CommandOutput, CliError> {
    match command {
        Command::ValidateTaxId { documents } => {
            CommandOutput::ok(&commands::handle_validate_tax_id(&documents))
        }
        Command::Reconcile { batch_id } => {
            CommandOutput::ok(&commands::handle_reconcile(persistence, &batch_id)?)
        }
        Command::ReconcileAll => CommandOutput::ok(&commands::handle_reconcile_all(persistence)?),
        Command::Check => {
            let response: commands::CheckResponse = commands::handle_check(persistence)?;
            Ok(CommandOutput {
                success: response.consistent,
                body: serde_json::to_value(&response)?,
            })
        }
        Command::Pending => CommandOutput::ok(&commands::handle_pending(persistence)?),
        Command::Settlement(SettlementCommand::Create {
            title,
            notes,
            line_ids,
        }) => CommandOutput::ok(&commands::handle_create_settlement(
            persistence,
            &title,
            notes,
            &line_ids,
        )?),
        Command::Settlement(SettlementCommand::Close { batch_id }) => {
            CommandOutput::ok(&commands::handle_close_settlement(persistence, &batch_id)?)
        }
        Command::Settlement(SettlementCommand::Cancel { batch_id }) => {
            CommandOutput::ok(&commands::handle_cancel_settlement(persistence, &batch_id)?)
        }
        Command::Backup(BackupCommand::Export {
            output,
            backup_dir,
            max_backups,
        }) => {
            let target: ExportTarget = export_target(output, backup_dir, max_backups);
            CommandOutput::ok(&commands::handle_export(persistence, target)?)
        }
        Command::Backup(BackupCommand::Import { file, force }) => {
            CommandOutput::ok(&commands::handle_import(persistence, &file, force)?)
        }
        Command::Backup(BackupCommand::Verify { file }) => {
            let report: SnapshotReport = commands::handle_verify(&file)?;
            let response: VerifyResponse = VerifyResponse {
                file: file.display().to_string(),
                valid: report.is_valid(),
                report,
            };
            Ok(CommandOutput {
                success: response.valid,
                body: serde_json::to_value(&response)?,
            })
        }
    }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let output: CommandOutput = match open_persistence(&args.command, args.database.as_deref())
        .and_then(|mut persistence| execute(args.command, &mut persistence))
    {
        Ok(output) => output,
        Err(err) => {
            error!(error = %err, "Command failed");
            return Err(err.into());
        }
    };

    println!("{}", serde_json::to_string_pretty(&output.body)?);

    if output.success {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
