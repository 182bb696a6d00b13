// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry command handlers

use anyhow::{bail, Result};
use clap::Subcommand;
use ot_core::{OperationKey, OperationStatus, SystemClock};
use ot_engine::CANCELLED_MESSAGE;
use ot_storage::{FileStore, OperationStore, Registry};

use crate::color;
use crate::config::Settings;
use crate::output::{format_operation_detail, format_operation_table, now_ms, print_json, OutputFormat};

#[derive(Subcommand)]
pub enum OperationCommand {
    /// List tracked operations
    List {
        /// Only operations of this type
        #[arg(long = "type", value_name = "TYPE")]
        kind: Option<String>,
        /// Only operations that are still running
        #[arg(long)]
        active: bool,
    },
    /// Show one tracked operation
    Show {
        #[arg(value_name = "TYPE")]
        kind: String,
        id: String,
    },
    /// Forget a tracked operation
    Remove {
        #[arg(value_name = "TYPE")]
        kind: String,
        id: String,
    },
    /// Drop records untouched for a day
    Cleanup {
        /// Also drop finished operations past the removal grace period
        #[arg(long)]
        settled: bool,
    },
    /// Mark an active operation as cancelled
    Cancel {
        #[arg(value_name = "TYPE")]
        kind: String,
        id: String,
    },
}

pub fn open_registry(settings: &Settings) -> Registry<FileStore> {
    Registry::open(FileStore::in_dir(&settings.state_dir), SystemClock)
}

pub fn handle(command: OperationCommand, settings: &Settings, format: OutputFormat) -> Result<()> {
    match command {
        OperationCommand::List { kind, active } => {
            let registry = open_registry(settings);
            let ops: Vec<_> = registry
                .operations()
                .into_iter()
                .filter(|op| kind.as_deref().is_none_or(|k| op.kind == k))
                .filter(|op| !active || op.is_active())
                .collect();
            match format {
                OutputFormat::Json => print_json(&ops)?,
                OutputFormat::Text if ops.is_empty() => println!("No tracked operations"),
                OutputFormat::Text => {
                    let mut lines = format_operation_table(&ops, now_ms()).into_iter();
                    if let Some(header) = lines.next() {
                        println!("{}", color::header(&header));
                    }
                    for (line, op) in lines.zip(&ops) {
                        println!("{}", color::status(&op.status, &line));
                    }
                }
            }
        }
        OperationCommand::Show { kind, id } => {
            let registry = open_registry(settings);
            let key = OperationKey::new(kind, id);
            let Some(op) = registry.get_operation(&key) else {
                bail!("no tracked operation {key}");
            };
            match format {
                OutputFormat::Json => print_json(&op)?,
                OutputFormat::Text => {
                    for line in format_operation_detail(&op) {
                        println!("{line}");
                    }
                }
            }
        }
        OperationCommand::Remove { kind, id } => {
            let registry = open_registry(settings);
            let key = OperationKey::new(kind, id);
            let Some(op) = registry.remove_operation(&key) else {
                bail!("no tracked operation {key}");
            };
            match format {
                OutputFormat::Json => print_json(&op)?,
                OutputFormat::Text => println!("Removed {key}"),
            }
        }
        OperationCommand::Cleanup { settled } => {
            let store = FileStore::in_dir(&settings.state_dir);
            let before = store.load().ok().flatten().map_or(0, |table| table.len());
            let registry = Registry::open(store, SystemClock);
            let expired = before.saturating_sub(registry.operations().len());
            let finished =
                if settled { registry.cleanup_settled_operations(settings.removal_grace) } else { 0 };
            match format {
                OutputFormat::Json => {
                    print_json(&serde_json::json!({ "expired": expired, "settled": finished }))?
                }
                OutputFormat::Text => {
                    println!("Removed {expired} expired and {finished} settled operation(s)")
                }
            }
        }
        OperationCommand::Cancel { kind, id } => {
            let registry = open_registry(settings);
            let key = OperationKey::new(kind, id);
            let Some(op) = registry.get_operation(&key) else {
                bail!("no tracked operation {key}");
            };
            if !op.is_active() {
                bail!("{key} is not active (status: {})", op.status);
            }
            registry.update_progress(&key, 0, OperationStatus::Cancelled, CANCELLED_MESSAGE);
            tracing::info!(operation_type = %key.kind, id = %key.id, "operation cancelled from cli");
            match format {
                OutputFormat::Json => print_json(&registry.get_operation(&key))?,
                OutputFormat::Text => println!("Cancelled {key}"),
            }
        }
    }
    Ok(())
}
